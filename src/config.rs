use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "HealthConnect";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when `HEALTHCONNECT_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Public landing page visitors are sent to after logout.
pub const DEFAULT_ENTRY_URL: &str = "https://medical-webpage-front.vercel.app/";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Patient search waits this long after the last keystroke.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Credential file name inside the data directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Default tracing filter; `RUST_LOG` takes precedence.
pub fn default_log_filter() -> &'static str {
    "healthconnect_lib=info,healthconnect=info,warn"
}

/// Get the application data directory.
/// Platform data dir (e.g. ~/.local/share) joined with `HealthConnect`.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Runtime configuration for the portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Origin of the REST backend, without trailing slash.
    pub api_base_url: String,
    /// Where `logout` redirects to.
    pub public_entry_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    /// Directory holding the persisted token/user pair.
    pub data_dir: PathBuf,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            public_entry_url: DEFAULT_ENTRY_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            data_dir: app_data_dir(),
        }
    }
}

impl PortalConfig {
    /// Defaults overridden by `HEALTHCONNECT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("HEALTHCONNECT_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("HEALTHCONNECT_ENTRY_URL").filter(|v| !v.trim().is_empty()) {
            config.public_entry_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("HEALTHCONNECT_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "Ignoring invalid HEALTHCONNECT_TIMEOUT_SECS"),
            }
        }
        if let Some(raw) = lookup("HEALTHCONNECT_DEBOUNCE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.search_debounce = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid HEALTHCONNECT_DEBOUNCE_MS"),
            }
        }
        if let Some(dir) = lookup("HEALTHCONNECT_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }

    /// Full path of the credential file.
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("HealthConnect"));
    }

    #[test]
    fn defaults_without_env() {
        let config = PortalConfig::from_lookup(|_| None);
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.public_entry_url, DEFAULT_ENTRY_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.search_debounce, Duration::from_millis(500));
    }

    #[test]
    fn env_overrides_apply() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("HEALTHCONNECT_API_URL", "https://api.example.org/"),
            ("HEALTHCONNECT_TIMEOUT_SECS", "5"),
            ("HEALTHCONNECT_DEBOUNCE_MS", "20"),
            ("HEALTHCONNECT_DATA_DIR", "/tmp/hc"),
        ]));
        assert_eq!(config.api_base_url, "https://api.example.org");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.search_debounce, Duration::from_millis(20));
        assert_eq!(config.credentials_path(), PathBuf::from("/tmp/hc/credentials.json"));
    }

    #[test]
    fn invalid_numbers_keep_defaults() {
        let config = PortalConfig::from_lookup(lookup_from(&[
            ("HEALTHCONNECT_TIMEOUT_SECS", "0"),
            ("HEALTHCONNECT_DEBOUNCE_MS", "soon"),
        ]));
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.search_debounce, Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
