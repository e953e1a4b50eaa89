//! Worker configuration from environment variables.
//!
//! The only fatal startup condition lives here: a missing `DATABASE_URL`.
//! Everything else has a default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 8;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_INTERVAL_SECONDS: &str = "INTERVAL_SECONDS";
pub const ENV_SEEDS_PATH: &str = "SEEDS_PATH";
pub const ENV_MAX_CONCURRENT_SOURCES: &str = "MAX_CONCURRENT_SOURCES";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub interval: Duration,
    pub seeds_path: Option<PathBuf>,
    pub max_concurrent_sources: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var(ENV_DATABASE_URL).context("DATABASE_URL must be set")?,
            interval: Duration::from_secs(parse_interval(env::var(ENV_INTERVAL_SECONDS).ok())),
            seeds_path: env::var(ENV_SEEDS_PATH).ok().map(PathBuf::from),
            max_concurrent_sources: parse_concurrency(
                env::var(ENV_MAX_CONCURRENT_SOURCES).ok(),
            ),
        })
    }
}

fn parse_interval(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_INTERVAL_SECS)
}

fn parse_concurrency(raw: Option<String>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_CONCURRENT_SOURCES)
}
