use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{services::score_service, state::SharedState};

/// Poll the score feed forever at a fixed cadence.
///
/// A tick that overruns the interval delays the next one instead of stacking
/// up, and the tick gate inside [`score_service::run_tick`] keeps a manually
/// forced fetch from overlapping with a scheduled one.
pub async fn run(state: SharedState, interval: Duration) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = interval.as_secs(), "score poller started");

    loop {
        ticker.tick().await;
        match score_service::run_tick(&state).await {
            Ok(outcome) if outcome.updated => {
                info!(
                    periods = outcome.periods.unwrap_or(0),
                    "score poll stored a new snapshot"
                );
            }
            Ok(outcome) => {
                debug!(
                    reason = outcome.reason.as_deref().unwrap_or("unknown"),
                    "score poll made no change"
                );
            }
            Err(err) => warn!(error = %err, "score poll failed"),
        }
    }
}
