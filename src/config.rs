use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://gridscape-backend.internal.enernetglobal.com:8100";

#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Results service root, without the trailing `/jobs`.
    pub base_url: String,
    /// Directory holding `job-<job>-results/` bundles.
    pub cache_root: PathBuf,
    pub timeout_secs: u64,
    /// Inventory index of the solar array named in the run log.
    pub solar_index: u32,
    /// Inventory index of the battery named in the run log.
    pub battery_index: u32,
    /// Skip the remote service and read from the local cache only.
    pub local_only: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_root: default_cache_root(),
            timeout_secs: 30,
            solar_index: 1,
            battery_index: 3,
            local_only: false,
        }
    }
}

impl ReaderConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GRIDSCAPE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            cache_root: std::env::var("GRIDSCAPE_CACHE_DIR").map(PathBuf::from).unwrap_or_else(|_| default_cache_root()),
            timeout_secs: std::env::var("GRIDSCAPE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(30),
            solar_index: std::env::var("GRIDSCAPE_SOLAR_INDEX").ok().and_then(|v| v.parse().ok()).unwrap_or(1),
            battery_index: std::env::var("GRIDSCAPE_BATTERY_INDEX").ok().and_then(|v| v.parse().ok()).unwrap_or(3),
            local_only: std::env::var("GRIDSCAPE_LOCAL_ONLY").map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")).unwrap_or(false),
        }
    }
}

fn default_cache_root() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join("Downloads")
}
