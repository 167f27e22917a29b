//! Configuration management for the forecast assistant.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::Deadlines;
use crate::{Error, Result};

/// Default backend URL when `FORECAST_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Forecast backend base URL
    pub api_url: String,
    /// Static bearer token (if applicable)
    pub session_token: Option<String>,
    /// File holding the bearer token, re-read when the token expires
    pub session_token_file: Option<PathBuf>,
    /// Deadline classes for dispatched requests
    pub deadlines: Deadlines,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Deadlines::default();

        Ok(Self {
            api_url: env::var("FORECAST_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            session_token: env::var("SESSION_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            session_token_file: env::var("SESSION_TOKEN_FILE").ok().map(PathBuf::from),
            deadlines: Deadlines {
                short: deadline_from_env("SHORT_DEADLINE_SECS", defaults.short)?,
                long: deadline_from_env("LONG_DEADLINE_SECS", defaults.long)?,
            },
        })
    }
}

fn deadline_from_env(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => parse_deadline(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_deadline(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{} must be a whole number of seconds: {}", name, e)))?;

    if secs == 0 {
        return Err(Error::Config(format!("{} must be greater than zero", name)));
    }

    Ok(Duration::from_secs(secs))
}
