//! Application-level configuration loading: backend location, lifecycle thresholds and timers.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use time::{OffsetDateTime, Weekday};
use tracing::{info, warn};

use crate::{
    dao::backend::rest::RestConfig,
    state::lifecycle::ReadinessRules,
    time_utils::{next_weekly_window, offset_window},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "HACKATHON_LIFECYCLE_CONFIG_PATH";
/// Environment variable that overrides the backend base URL.
const API_URL_ENV: &str = "HACKATHON_API_URL";
/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Longest accepted duration for any configured interval, delay or offset.
const MAX_SPAN_MS: u64 = 366 * 24 * 60 * 60 * 1_000;
const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// How the window of a newly prepared period is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodWindow {
    /// Start and end relative to the moment preparation is triggered.
    Offsets {
        /// Delay before the period starts.
        start: Duration,
        /// Delay before the period ends.
        end: Duration,
    },
    /// Next weekly slot, e.g. Wednesday 15:00 for two days.
    Weekly {
        /// Day the period starts on.
        weekday: Weekday,
        /// UTC hour the period starts at.
        start_hour: u8,
        /// Length of the period in days.
        duration_days: u8,
    },
}

impl PeriodWindow {
    /// Compute the `(start, end)` pair of the next period from `now`.
    pub fn next_window(&self, now: OffsetDateTime) -> Option<(OffsetDateTime, OffsetDateTime)> {
        match *self {
            PeriodWindow::Offsets { start, end } => Some(offset_window(now, start, end)),
            PeriodWindow::Weekly {
                weekday,
                start_hour,
                duration_days,
            } => next_weekly_window(now, weekday, start_hour, duration_days),
        }
    }
}

impl Default for PeriodWindow {
    fn default() -> Self {
        PeriodWindow::Offsets {
            start: Duration::from_secs(5 * 60),
            end: Duration::from_secs(10 * 60),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Base URL of the REST backend, without trailing slash.
    pub api_url: String,
    /// Identifier of the single status record.
    pub status_id: u64,
    /// Identifier of the single period record.
    pub period_id: u64,
    /// Thresholds for leaving WAITING.
    pub readiness: ReadinessRules,
    /// WAITING poll cadence.
    pub status_check_interval: Duration,
    /// How often the cleanup time is checked once FINISHED.
    pub cleanup_check_interval: Duration,
    /// Delay between FINISHED and the data wipe.
    pub cleanup_delay: Duration,
    /// Pause before the full reload following a cleanup.
    pub data_reload_delay: Duration,
    /// How the next period is placed.
    pub period_window: PeriodWindow,
    /// Upper bound for every backend request.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        if let Some(api_url) = env::var(API_URL_ENV).ok().filter(|url| !url.trim().is_empty()) {
            info!(api_url = %api_url, "backend URL overridden from environment");
            config.api_url = api_url;
        }
        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        api_url = %app_config.api_url,
                        "loaded lifecycle configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, filling every missing key with its default.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        raw.try_into()
    }

    /// Connection settings for the REST client.
    pub fn rest_config(&self) -> RestConfig {
        RestConfig::new(self.api_url.clone()).with_timeout(self.request_timeout)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            status_id: 1,
            period_id: 1,
            readiness: ReadinessRules::default(),
            status_check_interval: Duration::from_secs(5),
            cleanup_check_interval: Duration::from_secs(1),
            cleanup_delay: Duration::from_secs(5 * 60),
            data_reload_delay: Duration::from_secs(1),
            period_window: PeriodWindow::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Reasons a configuration document is refused.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Weekly mode with a weekday outside `1..=7`.
    #[error("weekday must be between 1 (Monday) and 7 (Sunday), got {0}")]
    Weekday(u8),
    /// Weekly mode with an hour of 24 or more.
    #[error("start hour must be below 24, got {0}")]
    StartHour(u8),
    /// Offsets mode whose end does not follow its start.
    #[error("period end offset ({end} min) must come after its start ({start} min)")]
    OffsetOrder {
        /// Configured start offset in minutes.
        start: u64,
        /// Configured end offset in minutes.
        end: u64,
    },
    /// A duration key above one year or overflowing.
    #[error("`{key}` is out of range (at most one year), got {value}")]
    OutOfRange {
        /// Offending configuration key.
        key: &'static str,
        /// Rejected value.
        value: u64,
    },
}

/// Convert `value` units of `ms_per_unit` milliseconds, refusing anything above a year.
fn span(key: &'static str, value: u64, ms_per_unit: u64) -> Result<Duration, ConfigError> {
    value
        .checked_mul(ms_per_unit)
        .filter(|millis| *millis <= MAX_SPAN_MS)
        .map(Duration::from_millis)
        .ok_or(ConfigError::OutOfRange { key, value })
}

fn optional_span(
    key: &'static str,
    value: Option<u64>,
    ms_per_unit: u64,
    default: Duration,
) -> Result<Duration, ConfigError> {
    Ok(value
        .map(|value| span(key, value, ms_per_unit))
        .transpose()?
        .unwrap_or(default))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    api_url: Option<String>,
    status_id: Option<u64>,
    period_id: Option<u64>,
    min_participants: Option<usize>,
    min_jury: Option<usize>,
    min_days_between_periods: Option<f64>,
    status_check_interval_ms: Option<u64>,
    cleanup_check_interval_ms: Option<u64>,
    cleanup_delay_minutes: Option<u64>,
    data_reload_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    period_window: Option<RawPeriodWindow>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
/// JSON representation of the `period_window` object.
enum RawPeriodWindow {
    Offsets {
        start_offset_minutes: u64,
        end_offset_minutes: u64,
    },
    Weekly {
        /// ISO weekday number, 1 for Monday.
        weekday: u8,
        /// UTC hour the period starts at.
        start_hour: u8,
        /// Length of the period in days.
        duration_days: u8,
    },
}

impl TryFrom<RawPeriodWindow> for PeriodWindow {
    type Error = ConfigError;

    fn try_from(value: RawPeriodWindow) -> Result<Self, Self::Error> {
        match value {
            RawPeriodWindow::Offsets {
                start_offset_minutes,
                end_offset_minutes,
            } => {
                if end_offset_minutes <= start_offset_minutes {
                    return Err(ConfigError::OffsetOrder {
                        start: start_offset_minutes,
                        end: end_offset_minutes,
                    });
                }
                Ok(PeriodWindow::Offsets {
                    start: span("start_offset_minutes", start_offset_minutes, MS_PER_MINUTE)?,
                    end: span("end_offset_minutes", end_offset_minutes, MS_PER_MINUTE)?,
                })
            }
            RawPeriodWindow::Weekly {
                weekday,
                start_hour,
                duration_days,
            } => {
                if !(1..=7).contains(&weekday) {
                    return Err(ConfigError::Weekday(weekday));
                }
                if start_hour >= 24 {
                    return Err(ConfigError::StartHour(start_hour));
                }
                Ok(PeriodWindow::Weekly {
                    weekday: Weekday::Sunday.nth_next(weekday),
                    start_hour,
                    duration_days,
                })
            }
        }
    }
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(value: RawConfig) -> Result<Self, Self::Error> {
        let defaults = AppConfig::default();
        let rules = defaults.readiness;

        Ok(Self {
            api_url: value
                .api_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            status_id: value.status_id.unwrap_or(defaults.status_id),
            period_id: value.period_id.unwrap_or(defaults.period_id),
            readiness: ReadinessRules {
                min_participants: value.min_participants.unwrap_or(rules.min_participants),
                min_jury: value.min_jury.unwrap_or(rules.min_jury),
                min_days_between_periods: value
                    .min_days_between_periods
                    .unwrap_or(rules.min_days_between_periods),
            },
            status_check_interval: optional_span(
                "status_check_interval_ms",
                value.status_check_interval_ms,
                1,
                defaults.status_check_interval,
            )?,
            cleanup_check_interval: optional_span(
                "cleanup_check_interval_ms",
                value.cleanup_check_interval_ms,
                1,
                defaults.cleanup_check_interval,
            )?,
            cleanup_delay: optional_span(
                "cleanup_delay_minutes",
                value.cleanup_delay_minutes,
                MS_PER_MINUTE,
                defaults.cleanup_delay,
            )?,
            data_reload_delay: optional_span(
                "data_reload_delay_ms",
                value.data_reload_delay_ms,
                1,
                defaults.data_reload_delay,
            )?,
            period_window: value
                .period_window
                .map(PeriodWindow::try_from)
                .transpose()?
                .unwrap_or(defaults.period_window),
            request_timeout: optional_span(
                "request_timeout_secs",
                value.request_timeout_secs,
                MS_PER_SECOND,
                defaults.request_timeout,
            )?,
        })
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
