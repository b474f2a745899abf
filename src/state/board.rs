use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

/// Number of cells on a pool board.
pub const CELL_COUNT: usize = 100;

/// Rule violations raised by board transactions.
///
/// These map onto conflict-style HTTP responses in the service layer; the
/// messages are what participants see, so they stay in player terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The pool is locked, so claiming is disabled.
    #[error("pool is locked, squares can no longer be claimed")]
    PoolLocked,
    /// The acting participant does not belong to this pool.
    #[error("participant not found in this pool")]
    UnknownParticipant,
    /// The participant already holds the per-player maximum.
    #[error("you've already claimed the maximum of {limit} squares")]
    LimitReached {
        /// The per-participant limit in force.
        limit: usize,
    },
    /// A lower per-player limit conflicts with squares already held.
    #[error("a player already has {count} squares, they must release some first")]
    LimitConflict {
        /// The largest number of squares any single participant holds.
        count: usize,
    },
    /// Distribution requires at least one participant.
    #[error("no players have joined yet")]
    NoParticipants,
    /// Every square is already claimed.
    #[error("all squares are already claimed")]
    AllClaimed,
}

/// Ownership state of the 100 cells of one pool.
///
/// This is pure state with structural guarantees only (exactly 100 cells,
/// at most one owner per cell). All rule checks live in
/// [`PoolSession`](crate::state::session::PoolSession) transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Uuid>; CELL_COUNT],
}

impl Board {
    /// A board with every cell unclaimed.
    pub fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
        }
    }

    /// Owner of the cell at `index`, or `None` when unclaimed or out of range.
    pub fn owner_of(&self, index: usize) -> Option<Uuid> {
        self.cells.get(index).copied().flatten()
    }

    /// Assign `owner` to the cell at `index`. Out-of-range indexes are ignored.
    pub fn set_owner(&mut self, index: usize, owner: Uuid) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = Some(owner);
        }
    }

    /// Clear the cell at `index`, returning the previous owner if any.
    pub fn clear_owner(&mut self, index: usize) -> Option<Uuid> {
        self.cells.get_mut(index).and_then(|cell| cell.take())
    }

    /// Number of cells currently held by `owner`.
    pub fn owner_count(&self, owner: Uuid) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(owner))
            .count()
    }

    /// Number of claimed cells across the whole board.
    pub fn claimed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Indexes of all unclaimed cells, in ascending order.
    pub fn unclaimed_indexes(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.is_none().then_some(index))
            .collect()
    }

    /// The largest number of cells held by any single owner.
    pub fn highest_owner_count(&self) -> usize {
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for owner in self.cells.iter().flatten() {
            *counts.entry(*owner).or_default() += 1;
        }
        counts.values().copied().max().unwrap_or(0)
    }

    /// Cells in index order, paired with their owner slot.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Option<Uuid>)> + '_ {
        self.cells.iter().enumerate().map(|(i, cell)| (i, *cell))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}
