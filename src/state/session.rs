use std::time::SystemTime;

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use uuid::Uuid;

use crate::dao::models::{CellEntity, ParticipantEntity, PoolEntity, PoolStatus};
use crate::state::board::{Board, BoardError, CELL_COUNT};
use crate::state::digits::{AxisNumbers, Digits, InvalidDigits};

/// Per-participant claim limit applied when a pool does not specify one.
pub const DEFAULT_CLAIM_LIMIT: usize = 10;

/// A named player registered inside one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Display name chosen at join time (trimmed, unique within the pool).
    pub display_name: String,
    /// When the participant first joined.
    pub joined_at: SystemTime,
}

/// Result of resolving a display name inside a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The name matched an already-registered participant.
    Existing(Uuid),
    /// A new participant was registered under the name.
    Joined(Uuid),
}

impl JoinOutcome {
    /// Identifier of the participant, whether new or pre-existing.
    pub fn participant_id(&self) -> Uuid {
        match self {
            Self::Existing(id) | Self::Joined(id) => *id,
        }
    }
}

/// Error raised when a persisted pool record cannot be rebuilt into a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPoolRecord {
    /// The record does not carry exactly one row per cell.
    #[error("expected {CELL_COUNT} cells, got {got}")]
    WrongCellCount {
        /// Number of cell rows actually present.
        got: usize,
    },
    /// A cell index is repeated or outside the board.
    #[error("cell index {index} is duplicated or out of range")]
    BadCellIndex {
        /// The offending index.
        index: usize,
    },
    /// A cell is owned by someone not registered in the pool.
    #[error("cell {index} is owned by an unknown participant")]
    UnknownOwner {
        /// Index of the orphaned cell.
        index: usize,
    },
    /// Only one of the two digit axes is present.
    #[error("pool has digits assigned on only one axis")]
    HalfAssignedNumbers,
    /// A digit axis is not a valid permutation.
    #[error(transparent)]
    BadDigits(#[from] InvalidDigits),
}

/// Live aggregate for one pool: metadata, participants, and the cell board.
///
/// All mutating methods are transactions in the all-or-nothing sense: they
/// validate first and only then touch state, so a returned error means the
/// session is unchanged. Callers serialize access per pool, so each method
/// runs as one atomic step.
#[derive(Debug, Clone)]
pub struct PoolSession {
    /// Primary key of the pool.
    pub id: Uuid,
    /// URL-safe shareable identifier.
    pub slug: String,
    /// Human readable pool name.
    pub name: String,
    /// Whether claiming is still open.
    pub status: PoolStatus,
    /// Maximum number of squares a single participant may claim.
    pub claim_limit: usize,
    /// Axis digit permutations, absent until explicitly assigned.
    pub numbers: Option<AxisNumbers>,
    /// Participants keyed by id, preserving join order.
    pub participants: IndexMap<Uuid, Participant>,
    /// Ownership state of the 100 cells.
    pub board: Board,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time any part of the pool changed.
    pub updated_at: SystemTime,
}

impl PoolSession {
    /// Build a fresh open pool with an empty board.
    pub fn new(name: String, slug: String, claim_limit: usize) -> Self {
        let timestamp = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            slug,
            name,
            status: PoolStatus::Open,
            claim_limit: claim_limit.clamp(1, CELL_COUNT),
            numbers: None,
            participants: IndexMap::new(),
            board: Board::empty(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Register a participant under `display_name`, or return the existing one
    /// when the exact name is already taken. Joining is idempotent per name.
    pub fn join(&mut self, display_name: &str) -> JoinOutcome {
        let existing = self
            .participants
            .iter()
            .find(|(_, participant)| participant.display_name == display_name)
            .map(|(id, _)| *id);
        if let Some(id) = existing {
            return JoinOutcome::Existing(id);
        }

        let id = Uuid::new_v4();
        self.participants.insert(
            id,
            Participant {
                display_name: display_name.to_owned(),
                joined_at: SystemTime::now(),
            },
        );
        self.touch();
        JoinOutcome::Joined(id)
    }

    /// Claim cells for a participant, in request order, until the request is
    /// exhausted or the per-participant limit is reached.
    ///
    /// Already-claimed and out-of-range indexes are skipped rather than
    /// failing the whole request. Returns the indexes that were actually
    /// claimed, possibly empty. Fails without changing anything when the pool
    /// is locked, the participant is unknown, or the participant has no
    /// remaining quota at all.
    pub fn claim(
        &mut self,
        participant_id: Uuid,
        indexes: &[usize],
    ) -> Result<Vec<usize>, BoardError> {
        if self.status == PoolStatus::Locked {
            return Err(BoardError::PoolLocked);
        }
        if !self.participants.contains_key(&participant_id) {
            return Err(BoardError::UnknownParticipant);
        }

        let held = self.board.owner_count(participant_id);
        let quota = self.claim_limit.saturating_sub(held);
        if quota == 0 {
            return Err(BoardError::LimitReached {
                limit: self.claim_limit,
            });
        }

        let mut claimed = Vec::new();
        for &index in indexes {
            if claimed.len() >= quota {
                break;
            }
            if index >= CELL_COUNT {
                continue;
            }
            if self.board.owner_of(index).is_some() {
                continue;
            }
            self.board.set_owner(index, participant_id);
            claimed.push(index);
        }

        if !claimed.is_empty() {
            self.touch();
        }
        Ok(claimed)
    }

    /// Release cells at the given indexes, whoever owns them. Unclaimed
    /// cells and out-of-range indexes are skipped. Returns the indexes
    /// actually released, in request order. Works on locked pools too.
    pub fn release(&mut self, indexes: &[usize]) -> Vec<usize> {
        let mut released = Vec::new();
        for &index in indexes {
            if self.board.clear_owner(index).is_some() {
                released.push(index);
            }
        }
        if !released.is_empty() {
            self.touch();
        }
        released
    }

    /// Spread every unclaimed cell across the registered participants.
    ///
    /// Unclaimed cells are shuffled and dealt round-robin in join order, so
    /// participant counts differ by at most one. The per-participant claim
    /// limit is deliberately not applied here. Returns the number of cells
    /// assigned.
    pub fn distribute<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, BoardError> {
        if self.participants.is_empty() {
            return Err(BoardError::NoParticipants);
        }
        let mut unclaimed = self.board.unclaimed_indexes();
        if unclaimed.is_empty() {
            return Err(BoardError::AllClaimed);
        }
        unclaimed.shuffle(rng);

        let ids: Vec<Uuid> = self.participants.keys().copied().collect();
        for (position, index) in unclaimed.iter().enumerate() {
            self.board.set_owner(*index, ids[position % ids.len()]);
        }

        self.touch();
        Ok(unclaimed.len())
    }

    /// Draw fresh digit permutations for both axes, replacing any previous
    /// assignment.
    pub fn assign_numbers<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AxisNumbers {
        let numbers = AxisNumbers::drawn(rng);
        self.numbers = Some(numbers);
        self.touch();
        numbers
    }

    /// Close the pool for claiming. Returns `false` when it was already
    /// locked; locking is one-way and idempotent.
    pub fn lock(&mut self) -> bool {
        if self.status == PoolStatus::Locked {
            return false;
        }
        self.status = PoolStatus::Locked;
        self.touch();
        true
    }

    /// Change the per-participant claim limit, clamping the request into
    /// `1..=100`. Lowering the limit fails while any participant holds more
    /// cells than the new value would allow. Returns the limit in force.
    pub fn set_claim_limit(&mut self, requested: usize) -> Result<usize, BoardError> {
        let clamped = requested.clamp(1, CELL_COUNT);
        if clamped < self.claim_limit {
            let busiest = self.board.highest_owner_count();
            if busiest > clamped {
                return Err(BoardError::LimitConflict { count: busiest });
            }
        }
        self.claim_limit = clamped;
        self.touch();
        Ok(clamped)
    }

    /// Rebuild a session from its persisted record, verifying the structural
    /// invariants the storage layer cannot express.
    pub fn from_entity(entity: PoolEntity) -> Result<Self, InvalidPoolRecord> {
        if entity.cells.len() != CELL_COUNT {
            return Err(InvalidPoolRecord::WrongCellCount {
                got: entity.cells.len(),
            });
        }

        let participants: IndexMap<Uuid, Participant> = entity
            .participants
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    Participant {
                        display_name: p.display_name,
                        joined_at: p.joined_at,
                    },
                )
            })
            .collect();

        let mut board = Board::empty();
        let mut seen = [false; CELL_COUNT];
        for cell in entity.cells {
            let Some(slot) = seen.get_mut(cell.index) else {
                return Err(InvalidPoolRecord::BadCellIndex { index: cell.index });
            };
            if *slot {
                return Err(InvalidPoolRecord::BadCellIndex { index: cell.index });
            }
            *slot = true;

            if let Some(owner) = cell.owner_id {
                if !participants.contains_key(&owner) {
                    return Err(InvalidPoolRecord::UnknownOwner { index: cell.index });
                }
                board.set_owner(cell.index, owner);
            }
        }

        let numbers = match (entity.row_numbers, entity.col_numbers) {
            (Some(rows), Some(cols)) => Some(AxisNumbers {
                rows: Digits::try_from(rows)?,
                cols: Digits::try_from(cols)?,
            }),
            (None, None) => None,
            _ => return Err(InvalidPoolRecord::HalfAssignedNumbers),
        };

        Ok(Self {
            id: entity.id,
            slug: entity.slug,
            name: entity.name,
            status: entity.status,
            claim_limit: entity.claim_limit,
            numbers,
            participants,
            board,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }

    /// Snapshot the session into its persisted record shape.
    pub fn to_entity(&self) -> PoolEntity {
        PoolEntity {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
            status: self.status,
            claim_limit: self.claim_limit,
            row_numbers: self.numbers.map(|n| n.rows.into()),
            col_numbers: self.numbers.map(|n| n.cols.into()),
            participants: self
                .participants
                .iter()
                .map(|(id, participant)| ParticipantEntity {
                    id: *id,
                    display_name: participant.display_name.clone(),
                    joined_at: participant.joined_at,
                })
                .collect(),
            cells: self
                .board
                .entries()
                .map(|(index, owner_id)| CellEntity { index, owner_id })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_pool(claim_limit: usize) -> PoolSession {
        PoolSession::new("Test Pool".into(), "testpool".into(), claim_limit)
    }

    fn joined(session: &mut PoolSession, name: &str) -> Uuid {
        session.join(name).participant_id()
    }

    #[test]
    fn join_is_idempotent_per_exact_name() {
        let mut session = open_pool(10);
        let first = session.join("Ada");
        let second = session.join("Ada");
        let other = session.join("ada");

        assert!(matches!(first, JoinOutcome::Joined(_)));
        assert_eq!(
            second,
            JoinOutcome::Existing(first.participant_id()),
            "same name must resolve to the same participant"
        );
        assert!(matches!(other, JoinOutcome::Joined(_)));
        assert_eq!(session.participants.len(), 2);
    }

    #[test]
    fn claim_takes_requested_order_until_quota() {
        let mut session = open_pool(2);
        let ada = joined(&mut session, "Ada");

        let claimed = session.claim(ada, &[0, 1, 2]).unwrap();
        assert_eq!(claimed, vec![0, 1]);
        assert_eq!(session.board.owner_of(2), None);

        let err = session.claim(ada, &[5]).unwrap_err();
        assert_eq!(err, BoardError::LimitReached { limit: 2 });
    }

    #[test]
    fn claim_skips_taken_and_out_of_range_cells() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        let bob = joined(&mut session, "Bob");

        session.claim(ada, &[7]).unwrap();
        let claimed = session.claim(bob, &[7, 300, 8]).unwrap();

        assert_eq!(claimed, vec![8]);
        assert_eq!(session.board.owner_of(7), Some(ada));
    }

    #[test]
    fn claim_with_no_free_cells_in_request_changes_nothing() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        let bob = joined(&mut session, "Bob");
        session.claim(ada, &[3]).unwrap();

        let claimed = session.claim(bob, &[3]).unwrap();
        assert!(claimed.is_empty());
        assert_eq!(session.board.claimed_count(), 1);
    }

    #[test]
    fn claim_rejected_when_locked_or_unknown() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");

        assert_eq!(
            session.claim(Uuid::new_v4(), &[0]).unwrap_err(),
            BoardError::UnknownParticipant
        );

        session.lock();
        assert_eq!(session.claim(ada, &[0]).unwrap_err(), BoardError::PoolLocked);
    }

    #[test]
    fn release_clears_cells_regardless_of_owner() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        let bob = joined(&mut session, "Bob");
        session.claim(ada, &[1, 2]).unwrap();
        session.claim(bob, &[3]).unwrap();

        let released = session.release(&[1, 3, 42, 500]);
        assert_eq!(released, vec![1, 3]);
        assert_eq!(session.board.owner_of(1), None);
        assert_eq!(session.board.owner_of(3), None);
        assert_eq!(session.board.owner_of(2), Some(ada));
    }

    #[test]
    fn release_still_works_on_locked_pools() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        session.claim(ada, &[0]).unwrap();
        session.lock();

        assert_eq!(session.release(&[0]), vec![0]);
    }

    #[test]
    fn distribute_covers_every_free_cell_evenly() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        let bob = joined(&mut session, "Bob");
        let eve = joined(&mut session, "Eve");
        session.claim(ada, &[0]).unwrap();

        let mut rng = rand::rng();
        let assigned = session.distribute(&mut rng).unwrap();

        assert_eq!(assigned, 99);
        assert_eq!(session.board.unclaimed_indexes().len(), 0);
        // 99 cells over three players, dealt round-robin: 33 each on top of
        // whatever was already held.
        assert_eq!(session.board.owner_count(ada), 34);
        assert_eq!(session.board.owner_count(bob), 33);
        assert_eq!(session.board.owner_count(eve), 33);
    }

    #[test]
    fn distribute_ignores_the_per_participant_limit() {
        let mut session = open_pool(1);
        joined(&mut session, "Solo");

        let mut rng = rand::rng();
        assert_eq!(session.distribute(&mut rng).unwrap(), 100);
    }

    #[test]
    fn distribute_requires_players_and_free_cells() {
        let mut session = open_pool(10);
        let mut rng = rand::rng();
        assert_eq!(
            session.distribute(&mut rng).unwrap_err(),
            BoardError::NoParticipants
        );

        joined(&mut session, "Ada");
        session.distribute(&mut rng).unwrap();
        assert_eq!(
            session.distribute(&mut rng).unwrap_err(),
            BoardError::AllClaimed
        );
    }

    #[test]
    fn assign_numbers_overwrites_previous_draw() {
        let mut session = open_pool(10);
        let mut rng = rand::rng();

        let first = session.assign_numbers(&mut rng);
        assert_eq!(session.numbers, Some(first));
        // Redrawing replaces the permutations outright.
        session.assign_numbers(&mut rng);
        assert!(session.numbers.is_some());
    }

    #[test]
    fn lock_is_one_way_and_idempotent() {
        let mut session = open_pool(10);
        assert!(session.lock());
        assert!(!session.lock());
        assert_eq!(session.status, PoolStatus::Locked);
    }

    #[test]
    fn claim_limit_is_clamped_into_board_range() {
        let mut session = open_pool(10);
        assert_eq!(session.set_claim_limit(0).unwrap(), 1);
        assert_eq!(session.set_claim_limit(250).unwrap(), 100);
    }

    #[test]
    fn lowering_the_limit_below_held_counts_is_rejected() {
        let mut session = open_pool(5);
        let ada = joined(&mut session, "Ada");
        session.claim(ada, &[0, 1, 2]).unwrap();

        let err = session.set_claim_limit(2).unwrap_err();
        assert_eq!(err, BoardError::LimitConflict { count: 3 });
        assert_eq!(session.claim_limit, 5, "failed change must not apply");

        assert_eq!(session.set_claim_limit(3).unwrap(), 3);
    }

    #[test]
    fn entity_round_trip_preserves_the_session() {
        let mut session = open_pool(7);
        let ada = joined(&mut session, "Ada");
        session.claim(ada, &[12, 34]).unwrap();
        let mut rng = rand::rng();
        session.assign_numbers(&mut rng);

        let rebuilt = PoolSession::from_entity(session.to_entity()).unwrap();

        assert_eq!(rebuilt.id, session.id);
        assert_eq!(rebuilt.slug, session.slug);
        assert_eq!(rebuilt.claim_limit, 7);
        assert_eq!(rebuilt.numbers, session.numbers);
        assert_eq!(rebuilt.board, session.board);
        assert_eq!(rebuilt.participants, session.participants);
    }

    #[test]
    fn hydration_rejects_corrupt_records() {
        let mut session = open_pool(10);
        let ada = joined(&mut session, "Ada");
        session.claim(ada, &[0]).unwrap();

        let mut missing_cell = session.to_entity();
        missing_cell.cells.pop();
        assert!(matches!(
            PoolSession::from_entity(missing_cell),
            Err(InvalidPoolRecord::WrongCellCount { got: 99 })
        ));

        let mut orphan_owner = session.to_entity();
        orphan_owner.participants.clear();
        assert!(matches!(
            PoolSession::from_entity(orphan_owner),
            Err(InvalidPoolRecord::UnknownOwner { index: 0 })
        ));

        let mut half_numbers = session.to_entity();
        half_numbers.row_numbers = Some((0..10).collect());
        half_numbers.col_numbers = None;
        assert!(matches!(
            PoolSession::from_entity(half_numbers),
            Err(InvalidPoolRecord::HalfAssignedNumbers)
        ));

        let mut bad_digits = session.to_entity();
        bad_digits.row_numbers = Some(vec![0; 10]);
        bad_digits.col_numbers = Some((0..10).collect());
        assert!(matches!(
            PoolSession::from_entity(bad_digits),
            Err(InvalidPoolRecord::BadDigits(_))
        ));
    }
}
