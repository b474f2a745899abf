use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::{
    dao::models::{PeriodScoreEntity, Possession, ScoreSnapshotEntity, ScoreSource},
    dto::format_system_time,
};

/// Cumulative score line for one period, as rendered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PeriodScoreDto {
    /// Period label, `Q1` through `Q4`.
    pub label: String,
    pub row: u32,
    pub col: u32,
    #[serde(default)]
    pub complete: bool,
}

impl From<PeriodScoreEntity> for PeriodScoreDto {
    fn from(value: PeriodScoreEntity) -> Self {
        Self {
            label: value.label,
            row: value.row,
            col: value.col,
            complete: value.complete,
        }
    }
}

impl From<PeriodScoreDto> for PeriodScoreEntity {
    fn from(value: PeriodScoreDto) -> Self {
        Self {
            label: value.label,
            row: value.row,
            col: value.col,
            complete: value.complete,
        }
    }
}

/// Side with the ball, as rendered to clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PossessionDto {
    Row,
    Col,
    None,
}

impl From<Possession> for PossessionDto {
    fn from(value: Possession) -> Self {
        match value {
            Possession::Row => PossessionDto::Row,
            Possession::Col => PossessionDto::Col,
            Possession::None => PossessionDto::None,
        }
    }
}

/// Origin of a score snapshot, as rendered to clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSourceDto {
    Manual,
    Scrape,
}

impl From<ScoreSource> for ScoreSourceDto {
    fn from(value: ScoreSource) -> Self {
        match value {
            ScoreSource::Manual => ScoreSourceDto::Manual,
            ScoreSource::Scrape => ScoreSourceDto::Scrape,
        }
    }
}

/// Current score snapshot rendered for display.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreSnapshotView {
    pub name: String,
    pub source: ScoreSourceDto,
    pub periods: Vec<PeriodScoreDto>,
    pub game_complete: bool,
    pub possession: PossessionDto,
    pub situation: Option<String>,
    pub high_leverage: bool,
    pub updated_at: String,
}

impl From<ScoreSnapshotEntity> for ScoreSnapshotView {
    fn from(value: ScoreSnapshotEntity) -> Self {
        Self {
            name: value.name,
            source: value.source.into(),
            periods: value.periods.into_iter().map(Into::into).collect(),
            game_complete: value.game_complete,
            possession: value.possession.into(),
            situation: value.situation,
            high_leverage: value.high_leverage,
            updated_at: format_system_time(value.updated_at),
        }
    }
}

/// Envelope for the current snapshot; `game` is `null` before any score has
/// been recorded.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentScoreResponse {
    pub game: Option<ScoreSnapshotView>,
}

/// Operator-entered score sheet, bypassing the feed pipeline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualScoresRequest {
    /// Display name for the matchup.
    pub name: String,
    /// Cumulative per-period scores, each side in `0..=99`.
    pub periods: Vec<PeriodScoreDto>,
    #[serde(default)]
    pub game_complete: bool,
}

/// Result of one score tick, scheduled or forced.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whether a new snapshot was written.
    pub updated: bool,
    /// Number of periods in the written snapshot.
    pub periods: Option<usize>,
    /// Why nothing was written, when `updated` is false.
    pub reason: Option<String>,
}

impl TickOutcome {
    /// A tick that persisted a snapshot covering `periods` periods.
    pub fn written(periods: usize) -> Self {
        Self {
            updated: true,
            periods: Some(periods),
            reason: None,
        }
    }

    /// A tick that decided not to write.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            updated: false,
            periods: None,
            reason: Some(reason.into()),
        }
    }
}
