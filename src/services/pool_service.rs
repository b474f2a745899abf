use std::sync::Arc;

use rand::Rng;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    dao::pool_store::{CreatePoolOutcome, PoolStore},
    dto::{
        admin::PoolListItem,
        pool::{
            ClaimLimitOutcome, CreatePoolRequest, JoinPoolRequest, JoinedPool, LockOutcome,
            PoolCount, PoolCreated, PoolSummary, UpdateClaimLimitRequest,
        },
    },
    error::ServiceError,
    services::sse_events,
    state::{DEFAULT_CLAIM_LIMIT, JoinOutcome, PoolSession, SharedState},
};

const SLUG_LENGTH: usize = 8;
const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Redraw attempts before pool creation gives up on finding a free slug.
const MAX_SLUG_ATTEMPTS: usize = 16;

/// Upper bound on the operator pool listing.
const LIST_LIMIT: usize = 100;

/// Open a new pool, drawing slugs until the store accepts one as unique.
///
/// The store decides creation atomically: the creation cap is charged in the
/// same step that inserts the pool, so racing creates cannot both claim the
/// last capacity slot.
pub async fn create_pool(
    state: &SharedState,
    request: CreatePoolRequest,
) -> Result<PoolCreated, ServiceError> {
    let CreatePoolRequest { name, claim_limit } = request;
    let claim_limit = claim_limit.unwrap_or(DEFAULT_CLAIM_LIMIT);

    for _ in 0..MAX_SLUG_ATTEMPTS {
        let slug = generate_slug(&mut rand::rng());
        let session = PoolSession::new(name.clone(), slug.clone(), claim_limit);
        match state.store().create_pool(session.to_entity()).await? {
            CreatePoolOutcome::Created => {
                let created = PoolCreated {
                    id: session.id,
                    slug: slug.clone(),
                };
                info!(pool = %slug, "pool created");
                sse_events::broadcast_pool_created(state, &session);
                state
                    .sessions()
                    .insert(slug, Arc::new(Mutex::new(session)));
                return Ok(created);
            }
            CreatePoolOutcome::RateLimited { created, cap } => {
                warn!(created, cap, "pool creation rejected by the global cap");
                return Err(ServiceError::RateLimited(
                    "Pool creation limit reached. Try again later.".into(),
                ));
            }
            CreatePoolOutcome::SlugTaken => continue,
        }
    }

    Err(ServiceError::Internal(
        "could not draw an unused pool slug".into(),
    ))
}

/// Full pool view: settings, numbers, all 100 cells and every participant.
pub async fn get_pool(state: &SharedState, slug: &str) -> Result<PoolSummary, ServiceError> {
    let session = ensure_session(state, slug).await?;
    let guard = session.lock().await;
    Ok(PoolSummary::from(&*guard))
}

/// Join a pool under a display name.
///
/// Joining is idempotent per name: submitting a name that is already on the
/// roster resolves to the existing participant instead of failing.
pub async fn join_pool(
    state: &SharedState,
    slug: &str,
    request: JoinPoolRequest,
) -> Result<JoinedPool, ServiceError> {
    let display_name = request.display_name.trim().to_owned();

    let session = ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let outcome = guard.join(&display_name);
    if let JoinOutcome::Joined(id) = outcome {
        state.store().save_pool(guard.to_entity()).await?;
        info!(pool = %guard.slug, participant = %id, "participant joined");
        sse_events::broadcast_pool_updated(state, &guard);
    }

    Ok(JoinedPool {
        participant_id: outcome.participant_id(),
        display_name,
    })
}

/// Close the pool for claiming. Locking an already locked pool succeeds
/// without rewriting anything.
pub async fn lock_pool(state: &SharedState, slug: &str) -> Result<LockOutcome, ServiceError> {
    let session = ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    if guard.lock() {
        state.store().save_pool(guard.to_entity()).await?;
        info!(pool = %guard.slug, "pool locked");
        sse_events::broadcast_pool_updated(state, &guard);
    }
    Ok(LockOutcome {
        status: guard.status.into(),
    })
}

/// Change the per-participant claim limit.
///
/// Raising always succeeds; lowering is refused while any participant already
/// holds more cells than the new limit would allow.
pub async fn update_claim_limit(
    state: &SharedState,
    slug: &str,
    request: UpdateClaimLimitRequest,
) -> Result<ClaimLimitOutcome, ServiceError> {
    let session = ensure_session(state, slug).await?;
    let mut guard = session.lock().await;
    let claim_limit = guard.set_claim_limit(request.claim_limit)?;
    state.store().save_pool(guard.to_entity()).await?;
    sse_events::broadcast_pool_updated(state, &guard);
    Ok(ClaimLimitOutcome { claim_limit })
}

/// Number of pools created so far, across all time.
pub async fn pool_count(state: &SharedState) -> Result<PoolCount, ServiceError> {
    let count = state.store().pool_count().await?;
    Ok(PoolCount { count })
}

/// Newest-first pool listing for the operator dashboard.
pub async fn list_pools(state: &SharedState) -> Result<Vec<PoolListItem>, ServiceError> {
    let pools = state.store().list_pools(LIST_LIMIT).await?;
    Ok(pools.into_iter().map(Into::into).collect())
}

/// Resolve the live session for `slug`, hydrating it from storage on first
/// touch.
///
/// Every caller funnels through the one `Arc<Mutex<_>>` registered per slug,
/// so operations against the same pool serialize. When two requests race to
/// hydrate, the registry keeps whichever entry lands first and the loser's
/// copy is dropped.
pub(crate) async fn ensure_session(
    state: &SharedState,
    slug: &str,
) -> Result<Arc<Mutex<PoolSession>>, ServiceError> {
    if let Some(session) = state.sessions().get(slug) {
        return Ok(Arc::clone(&session));
    }

    let Some(entity) = state.store().find_pool_by_slug(slug.to_owned()).await? else {
        return Err(ServiceError::NotFound(format!("pool `{slug}` not found")));
    };
    let session = PoolSession::from_entity(entity)?;

    let entry = state
        .sessions()
        .entry(slug.to_owned())
        .or_insert_with(|| Arc::new(Mutex::new(session)));
    Ok(Arc::clone(&entry))
}

fn generate_slug<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SLUG_LENGTH)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::pool_store::BASE_CREATION_CAP, services::testing::test_state};

    fn create_request(name: &str) -> CreatePoolRequest {
        CreatePoolRequest {
            name: name.to_string(),
            claim_limit: None,
        }
    }

    #[test]
    fn test_generated_slugs_are_well_formed() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let slug = generate_slug(&mut rng);
            assert_eq!(slug.len(), SLUG_LENGTH);
            assert!(
                slug.bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            );
        }
    }

    #[tokio::test]
    async fn test_create_registers_a_live_session_and_persists() {
        let state = test_state();

        let created = create_pool(&state, create_request("office pool"))
            .await
            .unwrap();

        assert!(state.sessions().contains_key(&created.slug));
        let stored = state
            .store()
            .find_pool(created.id)
            .await
            .unwrap()
            .expect("pool persisted");
        assert_eq!(stored.slug, created.slug);
        assert_eq!(stored.name, "office pool");
    }

    #[tokio::test]
    async fn test_create_reports_rate_limit_once_cap_is_spent() {
        let state = test_state();
        for i in 0..BASE_CREATION_CAP {
            create_pool(&state, create_request(&format!("pool {i}")))
                .await
                .unwrap();
        }

        let err = create_pool(&state, create_request("one too many"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RateLimited(_)));

        state.store().add_bonus_capacity(1).await.unwrap();
        create_pool(&state, create_request("bonus pool"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_join_is_idempotent_per_display_name() {
        let state = test_state();
        let created = create_pool(&state, create_request("pool")).await.unwrap();

        let first = join_pool(
            &state,
            &created.slug,
            JoinPoolRequest {
                display_name: "Sam".into(),
            },
        )
        .await
        .unwrap();
        let second = join_pool(
            &state,
            &created.slug,
            JoinPoolRequest {
                display_name: "  Sam  ".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(first.participant_id, second.participant_id);
        let summary = get_pool(&state, &created.slug).await.unwrap();
        assert_eq!(summary.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_get_pool_hydrates_from_storage_after_restart() {
        let state = test_state();
        let created = create_pool(&state, create_request("pool")).await.unwrap();
        join_pool(
            &state,
            &created.slug,
            JoinPoolRequest {
                display_name: "Ana".into(),
            },
        )
        .await
        .unwrap();

        // Drop the live session to simulate a fresh process over the same store.
        state.sessions().remove(&created.slug);

        let summary = get_pool(&state, &created.slug).await.unwrap();
        assert_eq!(summary.slug, created.slug);
        assert_eq!(summary.participants.len(), 1);
        assert_eq!(summary.cells.len(), 100);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let state = test_state();
        let err = get_pool(&state, "zzzzzzzz").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lock_is_idempotent_and_persisted() {
        let state = test_state();
        let created = create_pool(&state, create_request("pool")).await.unwrap();

        let first = lock_pool(&state, &created.slug).await.unwrap();
        let second = lock_pool(&state, &created.slug).await.unwrap();
        assert_eq!(first.status, crate::dto::pool::PoolStatusDto::Locked);
        assert_eq!(second.status, crate::dto::pool::PoolStatusDto::Locked);

        let stored = state
            .store()
            .find_pool(created.id)
            .await
            .unwrap()
            .expect("pool persisted");
        assert_eq!(stored.status, crate::dao::models::PoolStatus::Locked);
    }

    #[tokio::test]
    async fn test_claim_limit_updates_are_clamped() {
        let state = test_state();
        let created = create_pool(&state, create_request("pool")).await.unwrap();

        let raised = update_claim_limit(
            &state,
            &created.slug,
            UpdateClaimLimitRequest { claim_limit: 250 },
        )
        .await
        .unwrap();
        assert_eq!(raised.claim_limit, 100);

        let floored = update_claim_limit(
            &state,
            &created.slug,
            UpdateClaimLimitRequest { claim_limit: 0 },
        )
        .await
        .unwrap();
        assert_eq!(floored.claim_limit, 1);
    }
}
