use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CleanCityError, Result};

/// Upper bound for `decorators.new_post_hours` (one year).
pub const MAX_NEW_POST_HOURS: i64 = 24 * 365;

/// Top-level configuration for CleanCity.
///
/// Loaded from `~/.cleancity/config.toml` by default. Every section falls
/// back to its defaults when missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanCityConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub decorators: DecoratorConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub badges: BadgeConfig,
}

impl CleanCityConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CleanCityConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would make the pipeline misbehave silently.
    pub fn validate(&self) -> Result<()> {
        if self.notify.server_url.trim().is_empty() {
            return Err(CleanCityError::Config(
                "notify.server_url must not be empty".to_string(),
            ));
        }
        if self.notify.timeout_ms == 0 {
            return Err(CleanCityError::Config(
                "notify.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if !(0..=MAX_NEW_POST_HOURS).contains(&self.decorators.new_post_hours) {
            return Err(CleanCityError::Config(format!(
                "decorators.new_post_hours must be between 0 and {}, got {}",
                MAX_NEW_POST_HOURS, self.decorators.new_post_hours
            )));
        }
        if !(0.0..=5.0).contains(&self.decorators.popular_rating) {
            return Err(CleanCityError::Config(format!(
                "decorators.popular_rating must be between 0 and 5, got {}",
                self.decorators.popular_rating
            )));
        }
        if !matches!(self.validation.preset.as_str(), "basic" | "strict") {
            return Err(CleanCityError::Config(format!(
                "validation.preset must be \"basic\" or \"strict\", got {:?}",
                self.validation.preset
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Push relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Turn outbound pushes on or off.
    pub enabled: bool,
    /// Base URL of the relay server.
    pub server_url: String,
    /// Optional bearer token sent with every publish.
    pub token: Option<String>,
    /// Namespace prepended to every per-user topic.
    pub topic_prefix: String,
    /// Public URL of the web app, used for click-through links.
    pub app_url: String,
    /// HTTP timeout for a single publish.
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: "https://ntfy.sh".to_string(),
            token: None,
            topic_prefix: "pi-clean-city-".to_string(),
            app_url: "http://localhost:5173".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// Thresholds for the feed decorators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoratorConfig {
    /// A post younger than this many hours gets the "new" badge.
    pub new_post_hours: i64,
    /// Minimum average rating for the "popular" badge.
    pub popular_rating: f64,
    /// Authors whose posts get the "verified" badge.
    pub verified_authors: Vec<Uuid>,
}

impl Default for DecoratorConfig {
    fn default() -> Self {
        Self {
            new_post_hours: 24,
            popular_rating: 4.0,
            verified_authors: Vec::new(),
        }
    }
}

/// Draft validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// "basic" or "strict".
    pub preset: String,
    /// Keywords the spam rule rejects. Empty means the built-in list.
    pub spam_keywords: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            preset: "basic".to_string(),
            spam_keywords: Vec::new(),
        }
    }
}

/// Extra badge variants, merged over the built-in tables.
///
/// Keys are status or priority names, values are variant names such as
/// `"success"` or `"destructive"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub status: BTreeMap<String, String>,
    pub priority: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CleanCityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.notify.topic_prefix, "pi-clean-city-");
        assert_eq!(config.decorators.new_post_hours, 24);
        assert_eq!(config.validation.preset, "basic");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [notify]
            server_url = "https://push.example.org"

            [decorators]
            popular_rating = 4.5
        "#;
        let config: CleanCityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.notify.server_url, "https://push.example.org");
        assert_eq!(config.notify.timeout_ms, 5_000);
        assert_eq!(config.decorators.popular_rating, 4.5);
        assert_eq!(config.decorators.new_post_hours, 24);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_badge_overrides_parse() {
        let toml_str = r#"
            [badges.status]
            "awaiting parts" = "warning"
        "#;
        let config: CleanCityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.badges.status.get("awaiting parts").map(String::as_str),
            Some("warning")
        );
    }

    #[test]
    fn test_validate_rejects_unknown_preset() {
        let mut config = CleanCityConfig::default();
        config.validation.preset = "paranoid".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("validation.preset"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = CleanCityConfig::default();
        config.notify.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(CleanCityError::Config(_))));
    }

    #[test]
    fn test_validate_bounds_new_post_hours() {
        let mut config = CleanCityConfig::default();
        config.decorators.new_post_hours = i64::MAX;
        assert!(matches!(config.validate(), Err(CleanCityError::Config(_))));

        config.decorators.new_post_hours = -1;
        assert!(config.validate().is_err());

        config.decorators.new_post_hours = MAX_NEW_POST_HOURS;
        assert!(config.validate().is_ok());
        config.decorators.new_post_hours = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CleanCityConfig::default();
        config.notify.token = Some("tk_secret".to_string());
        config.decorators.verified_authors = vec![Uuid::new_v4()];
        config.save(&path).unwrap();

        let loaded = CleanCityConfig::load(&path).unwrap();
        assert_eq!(loaded.notify.token.as_deref(), Some("tk_secret"));
        assert_eq!(
            loaded.decorators.verified_authors,
            config.decorators.verified_authors
        );
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CleanCityConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config.notify.server_url, "https://ntfy.sh");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[decorators]\npopular_rating = 9.0\n").unwrap();
        assert!(CleanCityConfig::load(&path).is_err());
    }
}
