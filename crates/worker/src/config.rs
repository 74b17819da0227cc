use std::time::Duration;

use leetboard_core::period::{parse_period_kind, parse_timezone, PeriodRule};
use leetboard_core::scoring::{
    ScoringPolicy, DEFAULT_WEIGHT_EASY, DEFAULT_WEIGHT_HARD, DEFAULT_WEIGHT_MEDIUM,
};
use leetboard_db::models::user::DeletionPolicy;
use leetboard_leetcode::client::DEFAULT_ENDPOINT;

/// Configuration errors. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults suitable for local use; a variable that is set
/// but malformed is an error rather than silently replaced by its default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// SQLite connection string.
    pub database_url: String,
    /// Point weights per difficulty.
    pub scoring: ScoringPolicy,
    /// Delay between poll sweeps.
    pub poll_interval: Duration,
    /// Upper bound on a single user's fetch.
    pub fetch_timeout: Duration,
    /// Delay between period boundary checks.
    pub rollover_check_interval: Duration,
    /// Period boundary rule.
    pub period: PeriodRule,
    /// Snapshot retention on user removal.
    pub deletion: DeletionPolicy,
    /// GraphQL endpoint queried by the poller.
    pub leetcode_endpoint: String,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                          |
    /// |-----------------------------|----------------------------------|
    /// | `DATABASE_URL`              | `sqlite://leetboard.db?mode=rwc` |
    /// | `POINTS_EASY`               | `1`                              |
    /// | `POINTS_MEDIUM`             | `3`                              |
    /// | `POINTS_HARD`               | `5`                              |
    /// | `POLL_INTERVAL_SECS`        | `300`                            |
    /// | `FETCH_TIMEOUT_SECS`        | `10`                             |
    /// | `ROLLOVER_CHECK_SECS`       | `60`                             |
    /// | `PERIOD`                    | `monthly`                        |
    /// | `PERIOD_WEEK_START`         | `sunday`                         |
    /// | `PERIOD_TIMEZONE`           | `UTC`                            |
    /// | `PURGE_SNAPSHOTS_ON_DELETE` | `false`                          |
    /// | `LEETCODE_GRAPHQL_URL`      | `https://leetcode.com/graphql`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL", "sqlite://leetboard.db?mode=rwc");

        let scoring = ScoringPolicy::new(
            parse_weight("POINTS_EASY", lookup("POINTS_EASY"), DEFAULT_WEIGHT_EASY)?,
            parse_weight("POINTS_MEDIUM", lookup("POINTS_MEDIUM"), DEFAULT_WEIGHT_MEDIUM)?,
            parse_weight("POINTS_HARD", lookup("POINTS_HARD"), DEFAULT_WEIGHT_HARD)?,
        );

        let poll_interval = parse_secs("POLL_INTERVAL_SECS", get("POLL_INTERVAL_SECS", "300"))?;
        let fetch_timeout = parse_secs("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS", "10"))?;
        let rollover_check_interval =
            parse_secs("ROLLOVER_CHECK_SECS", get("ROLLOVER_CHECK_SECS", "60"))?;

        let period_value = get("PERIOD", "monthly");
        let kind = parse_period_kind(&period_value, &get("PERIOD_WEEK_START", "sunday"))
            .map_err(|e| invalid("PERIOD", &period_value, e))?;
        let tz_value = get("PERIOD_TIMEZONE", "UTC");
        let tz = parse_timezone(&tz_value).map_err(|e| invalid("PERIOD_TIMEZONE", &tz_value, e))?;

        let purge_value = get("PURGE_SNAPSHOTS_ON_DELETE", "false");
        let deletion = match purge_value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => DeletionPolicy::PurgeSnapshots,
            "false" | "0" | "no" => DeletionPolicy::RetainSnapshots,
            _ => {
                return Err(invalid(
                    "PURGE_SNAPSHOTS_ON_DELETE",
                    &purge_value,
                    "expected true or false",
                ))
            }
        };

        let leetcode_endpoint = get("LEETCODE_GRAPHQL_URL", DEFAULT_ENDPOINT);

        Ok(Self {
            database_url,
            scoring,
            poll_interval,
            fetch_timeout,
            rollover_check_interval,
            period: PeriodRule::new(kind, tz),
            deletion,
            leetcode_endpoint,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a non-negative integer weight.
fn parse_weight(
    key: &'static str,
    value: Option<String>,
    default: u32,
) -> Result<u32, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(key, &v, "expected a non-negative integer")),
    }
}

/// Parse a positive number of seconds.
fn parse_secs(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(invalid(key, &value, "must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(invalid(key, &value, "expected a whole number of seconds")),
    }
}
