//! Application-level configuration pulled from the environment at startup.

use std::{env, str::FromStr, time::Duration};

use tracing::{info, warn};

/// Port the HTTP server binds when [`PORT_ENV`] is unset.
const DEFAULT_PORT: u16 = 8080;
/// Seconds between scheduled score polls when [`POLL_INTERVAL_ENV`] is unset.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;

/// Environment variable naming the listen port.
const PORT_ENV: &str = "PORT";
/// Environment variable carrying the operator secret.
const ADMIN_SECRET_ENV: &str = "SQUARES_ADMIN_SECRET";
/// Environment variable overriding the scoreboard endpoint.
const SCOREBOARD_URL_ENV: &str = "SQUARES_SCOREBOARD_URL";
/// Environment variable overriding the poll cadence, in seconds.
const POLL_INTERVAL_ENV: &str = "SQUARES_POLL_INTERVAL_SECS";
/// Environment variable that can switch the background poller off.
const POLL_ENABLED_ENV: &str = "SQUARES_POLL_ENABLED";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Shared secret gating operator endpoints; unset leaves them closed.
    pub admin_secret: Option<String>,
    /// Scoreboard endpoint override; `None` selects the built-in default.
    pub scoreboard_url: Option<String>,
    /// Time between scheduled feed ticks.
    pub poll_interval: Duration,
    /// Whether the background poller runs at all.
    pub poll_enabled: bool,
}

impl AppConfig {
    /// Read the configuration from the environment, falling back to defaults
    /// and warning about values that fail to parse.
    pub fn load() -> Self {
        let port = parsed_var(PORT_ENV).unwrap_or(DEFAULT_PORT);
        let admin_secret = nonempty_var(ADMIN_SECRET_ENV);
        let scoreboard_url = nonempty_var(SCOREBOARD_URL_ENV);
        let poll_interval =
            Duration::from_secs(parsed_var(POLL_INTERVAL_ENV).unwrap_or(DEFAULT_POLL_INTERVAL_SECS));
        let poll_enabled = parsed_var(POLL_ENABLED_ENV).unwrap_or(true);

        let config = Self {
            port,
            admin_secret,
            scoreboard_url,
            poll_interval,
            poll_enabled,
        };
        info!(
            port = config.port,
            poll_interval_secs = config.poll_interval.as_secs(),
            poll_enabled = config.poll_enabled,
            admin_secret_set = config.admin_secret.is_some(),
            scoreboard_override = config.scoreboard_url.is_some(),
            "configuration loaded"
        );
        config
    }
}

/// Read and parse an environment variable, warning when the value is present
/// but malformed.
fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

/// Read an environment variable, treating empty strings as unset.
fn nonempty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
