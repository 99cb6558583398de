use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::http_client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const MIN_REFRESH_SECS: u64 = 5;
pub const DEFAULT_COMPACT_WIDTH: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    Demo,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    pub refresh_interval: Duration,
    pub compact_width: u16,
    pub http_timeout: Duration,
    pub source: SourceKind,
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            compact_width: DEFAULT_COMPACT_WIDTH,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            source: SourceKind::Http,
            log_file: None,
        }
    }
}

impl DashboardConfig {
    /// Reads `DASHBOARD_*` variables. Call after the `.env` files are loaded.
    pub fn from_env() -> Self {
        let base_url = opt_env("DASHBOARD_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let refresh_secs = env::var("DASHBOARD_REFRESH_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(MIN_REFRESH_SECS);
        let compact_width = env::var("DASHBOARD_COMPACT_WIDTH")
            .ok()
            .and_then(|val| val.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_COMPACT_WIDTH);
        let timeout_secs = env::var("DASHBOARD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let source = match opt_env("DASHBOARD_SOURCE")
            .unwrap_or_else(|| "http".to_string())
            .to_lowercase()
            .as_str()
        {
            "demo" | "fake" => SourceKind::Demo,
            _ => SourceKind::Http,
        };

        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            refresh_interval: Duration::from_secs(refresh_secs),
            compact_width,
            http_timeout: Duration::from_secs(timeout_secs),
            source,
            log_file: opt_env("DASHBOARD_LOG_FILE").map(PathBuf::from),
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
