//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! first) and fall back to the defaults below. CLI flags override them per
//! invocation.

use std::path::PathBuf;
use tracing::warn;

use crate::recent::{DEFAULT_MAX_RECENT, DEFAULT_RECENT_FILE};

/// Default number of rows shown by preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum upload size accepted by the API (in bytes).
///
/// 50 MB limit.
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

pub const ENV_RECENT_FILE: &str = "SAMPLEPROC_RECENT_FILE";
pub const ENV_MAX_RECENT: &str = "SAMPLEPROC_MAX_RECENT";
pub const ENV_PREVIEW_ROWS: &str = "SAMPLEPROC_PREVIEW_ROWS";
pub const ENV_PORT: &str = "SAMPLEPROC_PORT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Recent-files sidecar.
    pub recent_file: PathBuf,
    /// Recent-files capacity.
    pub max_recent: usize,
    /// Rows shown by preview.
    pub preview_rows: usize,
    /// HTTP port for `serve`.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_file: PathBuf::from(DEFAULT_RECENT_FILE),
            max_recent: DEFAULT_MAX_RECENT,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Build from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            recent_file: lookup(ENV_RECENT_FILE)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.recent_file),
            max_recent: parse_or(&lookup, ENV_MAX_RECENT, defaults.max_recent),
            preview_rows: parse_or(&lookup, ENV_PREVIEW_ROWS, defaults.preview_rows),
            port: parse_or(&lookup, ENV_PORT, defaults.port),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
