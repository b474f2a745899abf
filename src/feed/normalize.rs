use std::time::SystemTime;

use uuid::Uuid;

use crate::dao::models::{PeriodScoreEntity, ScoreSnapshotEntity, ScoreSource};
use crate::feed::{FeedGameState, RawGameSnapshot};

/// Period labels tracked on the grid. Overtime scoring folds into the last
/// period's cumulative totals.
pub const PERIOD_LABELS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// Turn a raw feed snapshot into cumulative end-of-period scores.
///
/// Feeds report the points scored *within* each period; winning cells are
/// determined by the last digit of the *cumulative* score, so each tracked
/// period gets a running total. A period with deltas recorded for both sides
/// is historically fixed; the in-progress period (or any period missing a
/// delta) carries the side's current total instead. A period counts as
/// complete once the game is over or play has moved strictly past it.
///
/// Returns `None` before kickoff (`not started`, or no period underway yet):
/// there is nothing to show, and the caller should skip the tick.
pub fn normalize(raw: &RawGameSnapshot) -> Option<ScoreSnapshotEntity> {
    if raw.state == FeedGameState::NotStarted || raw.period == 0 {
        return None;
    }

    let finished = raw.completed || raw.state == FeedGameState::Finished;
    let tracked = (raw.period as usize).min(PERIOD_LABELS.len());

    let mut periods = Vec::with_capacity(tracked);
    let mut row_cumulative = 0u32;
    let mut col_cumulative = 0u32;
    for index in 0..tracked {
        match (
            raw.row_period_points.get(index),
            raw.col_period_points.get(index),
        ) {
            (Some(row), Some(col)) => {
                row_cumulative += row;
                col_cumulative += col;
            }
            _ => {
                row_cumulative = raw.row_total;
                col_cumulative = raw.col_total;
            }
        }

        periods.push(PeriodScoreEntity {
            label: PERIOD_LABELS[index].to_owned(),
            row: row_cumulative,
            col: col_cumulative,
            complete: finished || raw.period as usize > index + 1,
        });
    }

    Some(ScoreSnapshotEntity {
        id: Uuid::new_v4(),
        source: ScoreSource::Scrape,
        name: raw.name.clone(),
        periods,
        game_complete: finished,
        possession: raw.possession,
        situation: raw.situation.clone(),
        high_leverage: raw.high_leverage,
        updated_at: SystemTime::now(),
    })
}

/// Decide whether a freshly normalized snapshot needs persisting.
///
/// Skips the write only when the ordered period list, the game-complete
/// flag, possession, and the situation text are all identical to the latest
/// persisted snapshot; a missing situation compares equal to an empty one.
/// The high-leverage flag is display-only noise and never forces a write on
/// its own. With no persisted snapshot yet, always write.
pub fn should_write(next: &ScoreSnapshotEntity, latest: Option<&ScoreSnapshotEntity>) -> bool {
    let Some(latest) = latest else {
        return true;
    };

    !(next.periods == latest.periods
        && next.game_complete == latest.game_complete
        && next.possession == latest.possession
        && situation_text(next) == situation_text(latest))
}

fn situation_text(snapshot: &ScoreSnapshotEntity) -> &str {
    snapshot.situation.as_deref().unwrap_or("")
}
