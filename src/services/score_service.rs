use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{Possession, ScoreSnapshotEntity, ScoreSource},
        pool_store::PoolStore,
    },
    dto::{
        pool::{PeriodWinner, WinnersView},
        scores::{CurrentScoreResponse, ManualScoresRequest, ScoreSnapshotView, TickOutcome},
    },
    error::ServiceError,
    feed::{
        ScoreFeed,
        normalize::{normalize, should_write},
    },
    services::{pool_service, sse_events},
    state::{SharedState, session::PoolSession, winning_cell},
};

const MAX_PERIOD_SCORE: u32 = 99;

/// Latest known score state, or `None` when nothing has been recorded yet.
pub async fn current_score(state: &SharedState) -> Result<CurrentScoreResponse, ServiceError> {
    let latest = state.store().latest_snapshot().await?;
    Ok(CurrentScoreResponse {
        game: latest.map(Into::into),
    })
}

/// Record an operator-entered score snapshot, bypassing the feed pipeline.
///
/// Manual entries skip normalization and deduplication but still have to
/// respect the per-period score range.
pub async fn set_manual_scores(
    state: &SharedState,
    request: ManualScoresRequest,
) -> Result<ScoreSnapshotView, ServiceError> {
    let ManualScoresRequest {
        name,
        periods,
        game_complete,
    } = request;

    for period in &periods {
        if period.row > MAX_PERIOD_SCORE {
            return Err(ServiceError::InvalidInput(format!(
                "{} row score must be 0-99 (got {}).",
                period.label, period.row
            )));
        }
        if period.col > MAX_PERIOD_SCORE {
            return Err(ServiceError::InvalidInput(format!(
                "{} column score must be 0-99 (got {}).",
                period.label, period.col
            )));
        }
    }

    let snapshot = ScoreSnapshotEntity {
        id: Uuid::new_v4(),
        source: ScoreSource::Manual,
        name,
        periods: periods.into_iter().map(Into::into).collect(),
        game_complete,
        possession: Possession::None,
        situation: None,
        high_leverage: false,
        updated_at: SystemTime::now(),
    };
    state.store().append_snapshot(snapshot.clone()).await?;
    info!(periods = snapshot.periods.len(), "manual scores recorded");
    sse_events::broadcast_scores_updated(state, snapshot.clone());

    Ok(snapshot.into())
}

/// Run one feed tick: fetch, normalize, and append the snapshot when it
/// differs from the latest one on record.
///
/// The scheduled poller and the operator's forced fetch both come through
/// here; the tick gate keeps at most one tick in flight.
pub async fn run_tick(state: &SharedState) -> Result<TickOutcome, ServiceError> {
    let _gate = state.tick_gate().lock().await;

    let Some(raw) = state.feed().fetch().await? else {
        return Ok(TickOutcome::skipped("no game found"));
    };
    let Some(next) = normalize(&raw) else {
        return Ok(TickOutcome::skipped("game has not started"));
    };

    let latest = state.store().latest_snapshot().await?;
    if !should_write(&next, latest.as_ref()) {
        return Ok(TickOutcome::skipped("scores unchanged"));
    }

    let periods = next.periods.len();
    state.store().append_snapshot(next.clone()).await?;
    info!(periods, game = %next.name, "score snapshot written");
    sse_events::broadcast_scores_updated(state, next);

    Ok(TickOutcome::written(periods))
}

/// Resolve the winning cell of every known period against a pool's board.
pub async fn winners(state: &SharedState, slug: &str) -> Result<WinnersView, ServiceError> {
    let session = pool_service::ensure_session(state, slug).await?;
    let latest = state.store().latest_snapshot().await?;
    let guard = session.lock().await;
    Ok(resolve_winners(&guard, latest.as_ref()))
}

/// Pure winner resolution: pair each period's cumulative scores with the
/// pool's digits and look up the owner of the resulting cell.
///
/// Without assigned numbers the period scores are still reported, just with
/// no cell or owner attached.
fn resolve_winners(session: &PoolSession, snapshot: Option<&ScoreSnapshotEntity>) -> WinnersView {
    let assigned = session.numbers.is_some();
    let Some(snapshot) = snapshot else {
        return WinnersView {
            assigned,
            game_complete: false,
            game_name: None,
            periods: Vec::new(),
        };
    };

    let periods = snapshot
        .periods
        .iter()
        .map(|period| {
            let cell_index = session
                .numbers
                .as_ref()
                .map(|numbers| winning_cell(period.row, period.col, numbers));
            let owner_id = cell_index.and_then(|index| session.board.owner_of(index));
            let owner_name = owner_id
                .and_then(|id| session.participants.get(&id))
                .map(|participant| participant.display_name.clone());
            PeriodWinner {
                label: period.label.clone(),
                row: period.row,
                col: period.col,
                complete: period.complete,
                cell_index,
                owner_id,
                owner_name,
            }
        })
        .collect();

    WinnersView {
        assigned,
        game_complete: snapshot.game_complete,
        game_name: Some(snapshot.name.clone()),
        periods,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dto::{
            pool::{ClaimRequest, CreatePoolRequest, JoinPoolRequest},
            scores::{PeriodScoreDto, ScoreSourceDto},
        },
        feed::{FeedError, FeedGameState, RawGameSnapshot, ScoreFeed},
        services::{
            board_service,
            testing::{test_state, test_state_with_feed},
        },
    };

    /// Replays a queue of canned fetch results, then reports no game.
    struct ScriptedFeed {
        responses: Mutex<VecDeque<RawGameSnapshot>>,
    }

    impl ScriptedFeed {
        fn new(responses: Vec<RawGameSnapshot>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    impl ScoreFeed for ScriptedFeed {
        fn fetch(&self) -> BoxFuture<'static, Result<Option<RawGameSnapshot>, FeedError>> {
            let next = self.responses.lock().unwrap().pop_front();
            Box::pin(async move { Ok(next) })
        }
    }

    fn in_progress(period: u32, row_points: &[u32], col_points: &[u32]) -> RawGameSnapshot {
        RawGameSnapshot {
            external_id: "401".into(),
            name: "Sharks vs Jets".into(),
            state: FeedGameState::InProgress,
            completed: false,
            period,
            row_total: row_points.iter().sum(),
            col_total: col_points.iter().sum(),
            row_period_points: row_points.to_vec(),
            col_period_points: col_points.to_vec(),
            possession: Possession::None,
            situation: None,
            high_leverage: false,
        }
    }

    fn manual_request(periods: Vec<PeriodScoreDto>) -> ManualScoresRequest {
        ManualScoresRequest {
            name: "Sharks vs Jets".into(),
            periods,
            game_complete: false,
        }
    }

    fn quarter(label: &str, row: u32, col: u32) -> PeriodScoreDto {
        PeriodScoreDto {
            label: label.into(),
            row,
            col,
            complete: true,
        }
    }

    #[tokio::test]
    async fn test_tick_skips_when_no_game_is_found() {
        let state = test_state();
        let outcome = run_tick(&state).await.unwrap();
        assert!(!outcome.updated);
        assert_eq!(outcome.reason.as_deref(), Some("no game found"));
    }

    #[tokio::test]
    async fn test_tick_skips_before_kickoff() {
        let mut pregame = in_progress(0, &[], &[]);
        pregame.state = FeedGameState::NotStarted;
        let state = test_state_with_feed(ScriptedFeed::new(vec![pregame]));

        let outcome = run_tick(&state).await.unwrap();
        assert!(!outcome.updated);
        assert_eq!(outcome.reason.as_deref(), Some("game has not started"));
        assert!(current_score(&state).await.unwrap().game.is_none());
    }

    #[tokio::test]
    async fn test_tick_writes_once_then_dedups() {
        let snapshot = in_progress(2, &[7, 3], &[0, 10]);
        let state = test_state_with_feed(ScriptedFeed::new(vec![snapshot.clone(), snapshot]));

        let first = run_tick(&state).await.unwrap();
        assert!(first.updated);
        assert_eq!(first.periods, Some(2));

        let second = run_tick(&state).await.unwrap();
        assert!(!second.updated);
        assert_eq!(second.reason.as_deref(), Some("scores unchanged"));

        assert_eq!(state.store().snapshot_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tick_appends_when_scores_move() {
        let state = test_state_with_feed(ScriptedFeed::new(vec![
            in_progress(1, &[7], &[0]),
            in_progress(1, &[14], &[0]),
        ]));

        assert!(run_tick(&state).await.unwrap().updated);
        assert!(run_tick(&state).await.unwrap().updated);
        assert_eq!(state.store().snapshot_count().await.unwrap(), 2);

        let current = current_score(&state).await.unwrap().game.unwrap();
        assert_eq!(current.periods[0].row, 14);
    }

    #[tokio::test]
    async fn test_manual_scores_become_current() {
        let state = test_state();
        let mut events = state.events().subscribe();

        let view = set_manual_scores(
            &state,
            manual_request(vec![quarter("Q1", 7, 3), quarter("Q2", 14, 10)]),
        )
        .await
        .unwrap();
        assert_eq!(view.source, ScoreSourceDto::Manual);

        let current = current_score(&state).await.unwrap().game.unwrap();
        assert_eq!(current.periods.len(), 2);
        assert_eq!(current.periods[1].row, 14);

        let event = events.try_recv().expect("manual entry should broadcast");
        assert_eq!(event.event.as_deref(), Some("scores.updated"));
    }

    #[tokio::test]
    async fn test_manual_scores_reject_out_of_range_values() {
        let state = test_state();

        let err = set_manual_scores(&state, manual_request(vec![quarter("Q1", 120, 3)]))
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidInput(message) => {
                assert_eq!(message, "Q1 row score must be 0-99 (got 120).");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = set_manual_scores(&state, manual_request(vec![quarter("Q3", 0, 100)]))
            .await
            .unwrap_err();
        match err {
            ServiceError::InvalidInput(message) => {
                assert_eq!(message, "Q3 column score must be 0-99 (got 100).");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(current_score(&state).await.unwrap().game.is_none());
    }

    #[tokio::test]
    async fn test_winners_resolve_against_assigned_numbers() {
        let state = test_state();
        let created = pool_service::create_pool(
            &state,
            CreatePoolRequest {
                name: "pool".into(),
                claim_limit: Some(100),
            },
        )
        .await
        .unwrap();
        let joined = pool_service::join_pool(
            &state,
            &created.slug,
            JoinPoolRequest {
                display_name: "Ana".into(),
            },
        )
        .await
        .unwrap();
        board_service::claim_squares(
            &state,
            &created.slug,
            ClaimRequest {
                participant_id: joined.participant_id,
                indexes: (0..100).collect(),
            },
        )
        .await
        .unwrap();
        let numbers = board_service::assign_numbers(&state, &created.slug)
            .await
            .unwrap();

        set_manual_scores(&state, manual_request(vec![quarter("Q1", 17, 3)]))
            .await
            .unwrap();

        let view = winners(&state, &created.slug).await.unwrap();
        assert!(view.assigned);
        assert_eq!(view.game_name.as_deref(), Some("Sharks vs Jets"));

        let row_pos = numbers.row_numbers.iter().position(|d| *d == 7).unwrap();
        let col_pos = numbers.col_numbers.iter().position(|d| *d == 3).unwrap();
        let winner = &view.periods[0];
        assert_eq!(winner.cell_index, Some(row_pos * 10 + col_pos));
        assert_eq!(winner.owner_id, Some(joined.participant_id));
        assert_eq!(winner.owner_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_winners_without_numbers_report_scores_only() {
        let state = test_state();
        let created = pool_service::create_pool(
            &state,
            CreatePoolRequest {
                name: "pool".into(),
                claim_limit: None,
            },
        )
        .await
        .unwrap();
        set_manual_scores(&state, manual_request(vec![quarter("Q1", 7, 0)]))
            .await
            .unwrap();

        let view = winners(&state, &created.slug).await.unwrap();
        assert!(!view.assigned);
        assert_eq!(view.periods.len(), 1);
        assert_eq!(view.periods[0].row, 7);
        assert!(view.periods[0].cell_index.is_none());
        assert!(view.periods[0].owner_id.is_none());
    }
}
