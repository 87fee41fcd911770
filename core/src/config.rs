//! Overlay configuration
//!
//! Loaded from the platform config directory (`actnotes/default-config.toml`)
//! with `confy`; a missing or unreadable file falls back to defaults.

use std::path::Path;
use std::time::Duration;

use actnotes_types::DEFAULT_CLIENT;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub const APP_NAME: &str = "actnotes";

/// Delay between polls when only zone/level are shown
pub const DATA_ONLY_POLL_MS: u64 = 500;
/// Delay between polls once note matching is active
pub const MATCHING_POLL_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backend
    pub server_url: String,
    /// Backend client whose state is polled
    pub client: String,
    /// Index resource listing gated note files
    pub note_index: String,
    /// Index resource listing legacy helper files. Off by default; the
    /// stock backend serves no helper index.
    pub helper_index: Option<String>,
    /// Fixed poll delay, overriding the data-only/matching defaults
    pub poll_interval_ms: Option<u64>,
    /// How far in the future a countdown starts
    pub countdown_lead_ms: i64,
    /// Timer display refresh interval
    pub timer_tick_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3232".to_string(),
            client: DEFAULT_CLIENT.to_string(),
            note_index: "/note".to_string(),
            helper_index: None,
            poll_interval_ms: None,
            countdown_lead_ms: 4_999,
            timer_tick_ms: 100,
            request_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// Load the user config, falling back to defaults.
    pub fn load() -> Self {
        confy::load(APP_NAME, None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Load a config from an explicit path. Missing files are created with defaults.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    /// Delay between poll cycles
    pub fn poll_interval(&self, matching: bool) -> Duration {
        let ms = self.poll_interval_ms.unwrap_or(if matching {
            MATCHING_POLL_MS
        } else {
            DATA_ONLY_POLL_MS
        });
        Duration::from_millis(ms)
    }

    pub fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Pick the client to poll.
///
/// Precedence: explicit flag, then the `client` query parameter of the page
/// URL, then the configured client, then [`DEFAULT_CLIENT`].
pub fn resolve_client(
    flag: Option<&str>,
    page_url: Option<&str>,
    configured: &str,
) -> Result<String, ConfigError> {
    if let Some(client) = flag.filter(|c| !c.is_empty()) {
        return Ok(client.to_string());
    }

    if let Some(raw) = page_url {
        let url = Url::parse(raw).map_err(|e| ConfigError::PageUrl {
            url: raw.to_string(),
            message: e.to_string(),
        })?;
        let from_query = url
            .query_pairs()
            .find(|(key, value)| key == "client" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        if let Some(client) = from_query {
            return Ok(client);
        }
    }

    if !configured.is_empty() {
        return Ok(configured.to_string());
    }
    Ok(DEFAULT_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.client, "stand_alone");
        assert_eq!(config.countdown_lead_ms, 4_999);
        assert_eq!(config.poll_interval(false), Duration::from_millis(500));
        assert_eq!(config.poll_interval(true), Duration::from_millis(2_000));
        assert_eq!(config.timer_tick(), Duration::from_millis(100));
        assert_eq!(config.helper_index, None);
    }

    #[test]
    fn test_poll_interval_override() {
        let config = AppConfig {
            poll_interval_ms: Some(750),
            ..AppConfig::default()
        };
        assert_eq!(config.poll_interval(false), Duration::from_millis(750));
        assert_eq!(config.poll_interval(true), Duration::from_millis(750));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
server_url = "http://127.0.0.1:9000"
client = "steam"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:9000");
        assert_eq!(config.client, "steam");
        assert_eq!(config.note_index, "/note");
        assert_eq!(config.helper_index, None);
        assert_eq!(config.timer_tick_ms, 100);
    }

    #[test]
    fn test_resolve_client_precedence() {
        let page = Some("http://localhost:3232/?client=steam");
        assert_eq!(resolve_client(Some("other"), page, "cfg").unwrap(), "other");
        assert_eq!(resolve_client(None, page, "cfg").unwrap(), "steam");
        assert_eq!(
            resolve_client(None, Some("http://localhost:3232/"), "cfg").unwrap(),
            "cfg"
        );
        assert_eq!(resolve_client(None, None, "").unwrap(), "stand_alone");
    }

    #[test]
    fn test_resolve_client_ignores_empty_values() {
        let page = Some("http://localhost:3232/?client=");
        assert_eq!(resolve_client(Some(""), page, "").unwrap(), "stand_alone");
    }

    #[test]
    fn test_resolve_client_bad_url() {
        let err = resolve_client(None, Some("not a url"), "cfg").unwrap_err();
        assert!(matches!(err, ConfigError::PageUrl { .. }));
    }
}
