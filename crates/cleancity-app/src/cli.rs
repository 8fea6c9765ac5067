//! CLI argument definitions for the `cleancity` tool.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cleancity_display::FormatStyle;

/// CleanCity: report notifications, feed decoration and draft checks.
#[derive(Parser, Debug)]
#[command(name = "cleancity", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Push relay base URL.
    #[arg(long = "ntfy-url", global = true)]
    pub ntfy_url: Option<String>,

    /// Bearer token for the push relay.
    #[arg(long = "ntfy-token", global = true)]
    pub ntfy_token: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the push topic a user should subscribe to.
    Topic {
        username: String,
    },
    /// Check a post draft against the configured rules.
    Validate {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Override the configured preset (basic or strict).
        #[arg(long)]
        preset: Option<String>,
    },
    /// Decorate and render posts from a JSON array file.
    Decorate {
        file: PathBuf,
        #[arg(short = 'f', long = "format", default_value_t = FormatStyle::Standard)]
        format: FormatStyle,
        /// Print decorated posts as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Decorate notifications from a JSON array file.
    DecorateNotifications {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Publish a one-off push to a user.
    Send {
        username: String,
        message: String,
        #[arg(long)]
        title: Option<String>,
        /// 1 (min) to 5 (urgent).
        #[arg(long)]
        priority: Option<u8>,
        /// Comma-separated relay tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Send metadata as headers with a plain-text body.
        #[arg(long)]
        headers: bool,
    },
    /// Emit report events from a JSON file through the event bus.
    Emit {
        file: PathBuf,
    },
    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved configuration file path.
    Path,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CLEANCITY_CONFIG env var > ~/.cleancity/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CLEANCITY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the relay URL.
    ///
    /// Priority: --ntfy-url flag > CLEANCITY_NTFY_URL env var > config file value.
    pub fn resolve_ntfy_url(&self, config_url: &str) -> String {
        first_set(
            self.ntfy_url.clone(),
            std::env::var("CLEANCITY_NTFY_URL").ok(),
        )
        .unwrap_or_else(|| config_url.to_string())
    }

    /// Resolve the relay token.
    ///
    /// Priority: --ntfy-token flag > CLEANCITY_NTFY_TOKEN env var > config file value.
    pub fn resolve_ntfy_token(&self, config_token: Option<&str>) -> Option<String> {
        first_set(
            self.ntfy_token.clone(),
            std::env::var("CLEANCITY_NTFY_TOKEN").ok(),
        )
        .or_else(|| config_token.map(str::to_string))
    }

    /// Level used before the config file is read: --log-level flag, else info.
    pub fn bootstrap_log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| "info".to_string())
    }

    /// Whether the config file's `general.log_level` should replace the
    /// bootstrap level. RUST_LOG and --log-level both take precedence.
    pub fn uses_config_log_level(&self, rust_log_set: bool) -> bool {
        !rust_log_set && self.log_level.is_none()
    }
}

/// First non-blank value, flag before env.
fn first_set(flag: Option<String>, env: Option<String>) -> Option<String> {
    flag.into_iter()
        .chain(env)
        .find(|value| !value.trim().is_empty())
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".cleancity").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".cleancity").join("config.toml");
    }
    PathBuf::from("config.toml")
}
