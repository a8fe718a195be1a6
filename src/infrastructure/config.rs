use std::{env, fmt::{Debug, Display}, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2500;

const APP_DIR: &str = "captui";

/// Client settings, read from `CAPTUI_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub redirect_delay: Duration,
    pub storage_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            storage_path: data_dir().join("storage.json"),
            log_path: data_dir().join("captui.log"),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source; missing or invalid
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_url: String = try_load(&lookup, "CAPTUI_API_URL", defaults.api_url);
        let delay_ms = try_load(&lookup, "CAPTUI_REDIRECT_DELAY_MS", DEFAULT_REDIRECT_DELAY_MS);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            redirect_delay: Duration::from_millis(delay_ms),
            storage_path: try_load(&lookup, "CAPTUI_STORAGE_PATH", defaults.storage_path),
            log_path: try_load(&lookup, "CAPTUI_LOG_PATH", defaults.log_path),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Debug,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
        default
    })
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
