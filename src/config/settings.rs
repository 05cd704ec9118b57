//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable that replaces `service.base_url` when set and
/// non-empty.
pub const API_URL_ENV: &str = "VIDEO_DIGEST_API_URL";

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is appended to, including the `/api`
    /// prefix (e.g. `http://localhost:5000/api`).
    pub base_url: String,
    /// Maximum seconds to wait for a single response.  Formatting and
    /// analysis of long videos are slow, so this is generous.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".into(),
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Terminal front end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Maximum characters printed per pane; `0` prints everything.
    pub preview_chars: usize,
    /// Print a summary line once every started stage has finished.
    pub announce_completion: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            preview_chars: 2000,
            announce_completion: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use video_digest::config::AppConfig;
///
/// // Load (falls back to Default when the file is missing or unreadable)
/// // and apply the env override.
/// let config = AppConfig::load();
/// println!("{}", config.service.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote service connection settings.
    pub service: ServiceConfig,
    /// Terminal front end settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`,
    /// then apply the [`API_URL_ENV`] override.
    ///
    /// Never fails; see [`AppConfig::resolve`].
    pub fn load() -> Self {
        Self::resolve(
            &AppPaths::new().settings_file,
            std::env::var(API_URL_ENV).ok().as_deref(),
        )
    }

    /// Load `path`, falling back to defaults with a warning when it cannot
    /// be read or parsed, then apply `base_url_override`.  The override is
    /// applied on both paths.
    pub fn resolve(path: &std::path::Path, base_url_override: Option<&str>) -> Self {
        let mut config = Self::load_from(path).unwrap_or_else(|e| {
            log::warn!("Failed to load config from {} ({e:#}); using defaults", path.display());
            Self::default()
        });
        config.override_base_url(base_url_override);
        config
    }

    /// Load from an explicit path without consulting the environment.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace `service.base_url` with `url` when it is non-blank.  A
    /// trailing slash is stripped so endpoint paths join cleanly.
    pub fn override_base_url(&mut self, url: Option<&str>) {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            log::debug!("config: service base URL overridden to {url}");
            self.service.base_url = url.trim_end_matches('/').to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.service.base_url = "https://digest.example.com/api".into();
        cfg.service.timeout_secs = 30;
        cfg.ui.preview_chars = 0;
        cfg.ui.announce_completion = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.service.base_url, "https://digest.example.com/api");
        assert_eq!(loaded.service.timeout_secs, 30);
        assert_eq!(loaded.ui.preview_chars, 0);
        assert!(!loaded.ui.announce_completion);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.service.base_url, "http://localhost:5000/api");
        assert_eq!(config.service.timeout_secs, 120);
        assert_eq!(config.ui.preview_chars, 2000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service]\nbase_url = \"http://10.0.0.2:8080/api\"\n")
            .expect("write");

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.service.base_url, "http://10.0.0.2:8080/api");
        assert_eq!(config.service.timeout_secs, 120);
        assert!(config.ui.announce_completion);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service\nbase_url = ").expect("write");

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn malformed_file_still_honours_override() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service\n").expect("write");

        let config = AppConfig::resolve(&path, Some("https://prod.example.com/api"));
        assert_eq!(config.service.base_url, "https://prod.example.com/api");
        assert_eq!(config.service.timeout_secs, 120);

        let config = AppConfig::resolve(&path, None);
        assert_eq!(config.service.base_url, ServiceConfig::default().base_url);
    }

    #[test]
    fn resolve_applies_override_over_file_value() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[service]\nbase_url = \"http://10.0.0.2:8080/api\"\n")
            .expect("write");

        let config = AppConfig::resolve(&path, Some("https://prod.example.com/api/"));
        assert_eq!(config.service.base_url, "https://prod.example.com/api");
    }

    // The only test in the crate that touches the process environment.
    #[cfg(target_os = "linux")]
    #[test]
    fn load_keeps_env_override_when_settings_file_is_malformed() {
        let dir = tempdir().expect("temp dir");
        let app_dir = dir.path().join("video-digest");
        std::fs::create_dir_all(&app_dir).expect("mkdir");
        std::fs::write(app_dir.join("settings.toml"), "[service\n").expect("write");

        std::env::set_var("XDG_CONFIG_HOME", dir.path());
        std::env::set_var(API_URL_ENV, "https://prod.example.com/api");
        let config = AppConfig::load();
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var("XDG_CONFIG_HOME");

        assert_eq!(config.service.base_url, "https://prod.example.com/api");
    }

    #[test]
    fn override_replaces_base_url_and_strips_slash() {
        let mut cfg = AppConfig::default();
        cfg.override_base_url(Some("https://prod.example.com/api/"));
        assert_eq!(cfg.service.base_url, "https://prod.example.com/api");
    }

    #[test]
    fn blank_or_missing_override_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.override_base_url(Some("   "));
        cfg.override_base_url(None);
        assert_eq!(cfg.service.base_url, ServiceConfig::default().base_url);
    }
}
