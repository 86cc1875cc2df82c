use std::{path::PathBuf, str::FromStr, time::Duration};

use log::LevelFilter;

use crate::store::notifications::DEFAULT_TIMEOUT;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";
pub const DEFAULT_DB_PATH: &str = "./gatehouse.sqlite3";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid duration: {source}")]
    Duration {
        var: &'static str,
        source: humantime::DurationError,
    },
    #[error("{var} is not a valid log level: {value}")]
    LogLevel { var: &'static str, value: String },
    #[error("{var} is not valid unicode")]
    NotUnicode { var: &'static str },
}

/// Processor price ids for each plan tier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanIds {
    pub basic: String,
    pub standard: String,
    pub premium: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Every relative endpoint is joined onto this. Always ends with `/`.
    pub api_url: String,
    pub db_path: PathBuf,
    pub notification_timeout: Duration,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
    pub plans: PlanIds,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            notification_timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_level: LevelFilter::Debug,
            plans: PlanIds::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|var| std::env::var(var))
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, std::env::VarError>,
    ) -> Result<Config, ConfigError> {
        let var = |name: &'static str| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var: name }),
        };
        let duration = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match var(name)? {
                Some(value) => humantime::parse_duration(value.trim())
                    .map_err(|source| ConfigError::Duration { var: name, source }),
                None => Ok(default),
            }
        };

        let defaults = Config::default();

        let api_url = var("GATEHOUSE_API_URL")?
            .map(|url| with_trailing_slash(url.trim()))
            .unwrap_or(defaults.api_url);

        let db_path = var("GATEHOUSE_DB_PATH")?
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let log_level = match var("GATEHOUSE_LOG")? {
            Some(value) => LevelFilter::from_str(value.trim()).map_err(|_| ConfigError::LogLevel {
                var: "GATEHOUSE_LOG",
                value,
            })?,
            None => defaults.log_level,
        };

        Ok(Config {
            api_url,
            db_path,
            notification_timeout: duration(
                "GATEHOUSE_NOTIFICATION_TIMEOUT",
                defaults.notification_timeout,
            )?,
            request_timeout: duration("GATEHOUSE_REQUEST_TIMEOUT", defaults.request_timeout)?,
            log_level,
            plans: PlanIds {
                basic: var("GATEHOUSE_PLAN_BASIC")?.unwrap_or_default(),
                standard: var("GATEHOUSE_PLAN_STANDARD")?.unwrap_or_default(),
                premium: var("GATEHOUSE_PLAN_PREMIUM")?.unwrap_or_default(),
            },
        })
    }

    pub fn with_api_url(mut self, url: impl AsRef<str>) -> Config {
        self.api_url = with_trailing_slash(url.as_ref());
        self
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
