// ⚙️ Runtime configuration
//
// Read from the process environment. `.env.local` is loaded first when it
// exists (dev convenience); production injects the variables directly.

use crate::reconciliation::DEFAULT_CONCURRENCY;
use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DB_PATH_VAR: &str = "INSTALLMENTS_DB_PATH";
pub const SERVER_ADDR_VAR: &str = "INSTALLMENTS_SERVER_ADDR";
pub const STORE_TIMEOUT_VAR: &str = "INSTALLMENTS_STORE_TIMEOUT_SECS";
pub const RECONCILE_INTERVAL_VAR: &str = "INSTALLMENTS_RECONCILE_INTERVAL_SECS";
pub const RECONCILE_CONCURRENCY_VAR: &str = "INSTALLMENTS_RECONCILE_CONCURRENCY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub server_addr: SocketAddr,

    /// Deadline for a single store call
    pub store_timeout: Duration,

    /// Period of the bulk reconciler
    pub reconcile_interval: Duration,

    /// Rows evaluated at once within a reconciliation pass
    pub reconcile_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("data/installments.db"),
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            store_timeout: Duration::from_secs(10),
            reconcile_interval: Duration::from_secs(24 * 60 * 60),
            reconcile_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load `.env.local` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(addr) = parse_var(&lookup, SERVER_ADDR_VAR)? {
            config.server_addr = addr;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, STORE_TIMEOUT_VAR)? {
            config.store_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, RECONCILE_INTERVAL_VAR)? {
            if secs == 0 {
                bail!("{} must be greater than zero", RECONCILE_INTERVAL_VAR);
            }
            config.reconcile_interval = Duration::from_secs(secs);
        }
        if let Some(workers) = parse_var::<usize, _>(&lookup, RECONCILE_CONCURRENCY_VAR)? {
            if workers == 0 {
                bail!("{} must be at least 1", RECONCILE_CONCURRENCY_VAR);
            }
            config.reconcile_concurrency = workers;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
    }
}
