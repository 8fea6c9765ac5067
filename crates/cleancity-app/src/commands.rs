//! Subcommand implementations.
//!
//! Each command returns what it would print so `main` stays a thin
//! dispatcher and the logic can be exercised without a terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cleancity_core::bus::EventBus;
use cleancity_core::config::{CleanCityConfig, ValidationConfig};
use cleancity_core::events::DomainEvent;
use cleancity_core::types::{Clock, Draft, Notification, Post};
use cleancity_core::{CleanCityError, Result};
use cleancity_display::decorator::{DecoratedNotification, DecoratedPost};
use cleancity_display::{
    formatter_for, ContentItem, FormatStyle, NotificationPipeline, PostDecoratorChain,
    ValidationResult, Validator,
};
use cleancity_notify::{
    NotificationDispatcher, NotificationRelay, NtfyClient, NtfyMessage, Priority, RelayHandle,
    TemplateContext,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

/// A JSON file holding either one record or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    let records: OneOrMany<T> = serde_json::from_str(&content)?;
    Ok(records.into())
}

pub fn template_context(config: &CleanCityConfig) -> TemplateContext {
    TemplateContext::new(&config.notify.topic_prefix, &config.notify.app_url)
}

pub fn topic(config: &CleanCityConfig, username: &str) -> String {
    template_context(config).topic_for(username)
}

pub fn validate(
    config: &CleanCityConfig,
    title: &str,
    content: &str,
    preset: Option<&str>,
) -> Result<ValidationResult> {
    let mut validation: ValidationConfig = config.validation.clone();
    if let Some(preset) = preset {
        if !matches!(preset, "basic" | "strict") {
            return Err(CleanCityError::InvalidInput(format!(
                "unknown validation preset {:?}",
                preset
            )));
        }
        validation.preset = preset.to_string();
    }
    let validator = Validator::from_config(&validation);
    Ok(validator.validate(&Draft::new(title, content)))
}

pub fn render_validation(result: &ValidationResult) -> String {
    if result.is_valid {
        return "Draft is valid".to_string();
    }
    let mut out = format!("Draft has {} problem(s):", result.errors.len());
    for error in &result.errors {
        out.push_str(&format!("\n  - {}", error));
    }
    out
}

pub fn decorate_posts(
    config: &CleanCityConfig,
    clock: Arc<dyn Clock>,
    path: &Path,
    style: FormatStyle,
    json: bool,
) -> Result<String> {
    let posts: Vec<Post> = read_records(path)?;
    let now = clock.now();
    let chain = PostDecoratorChain::from_config(&config.decorators, clock);
    let decorated = chain.decorate_many(&posts);
    info!(posts = decorated.len(), "Posts decorated");

    if json {
        return Ok(serde_json::to_string_pretty(&decorated)?);
    }
    let formatter = formatter_for(style);
    let lines: Vec<String> = decorated
        .iter()
        .map(|item| {
            let line = formatter.format(&ContentItem::from(&item.post), now);
            format!("{}{}{}", highlight_marker(item), line, badge_suffix(item))
        })
        .collect();
    Ok(lines.join("\n"))
}

fn highlight_marker(item: &DecoratedPost) -> &'static str {
    if item.decoration.is_highlighted {
        "* "
    } else {
        "  "
    }
}

fn badge_suffix(item: &DecoratedPost) -> String {
    if item.decoration.badges.is_empty() {
        return String::new();
    }
    let labels: Vec<&str> = item
        .decoration
        .badges
        .iter()
        .map(|b| b.label.as_str())
        .collect();
    format!("  [{}]", labels.join(", "))
}

pub fn decorate_notifications(clock: Arc<dyn Clock>, path: &Path, json: bool) -> Result<String> {
    let notifications: Vec<Notification> = read_records(path)?;
    let decorated = NotificationPipeline::standard(clock).decorate_many(&notifications);
    info!(notifications = decorated.len(), "Notifications decorated");

    if json {
        return Ok(serde_json::to_string_pretty(&decorated)?);
    }
    Ok(decorated
        .iter()
        .map(render_notification)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_notification(item: &DecoratedNotification) -> String {
    let mut line = format!(
        "{} [{}] {}: {}",
        item.icon().unwrap_or("-"),
        item.urgency(),
        item.notification().title,
        item.notification().message
    );
    if let Some(when) = item.relative_time() {
        line.push_str(&format!(" ({})", when));
    }
    line
}

pub struct SendRequest {
    pub username: String,
    pub message: String,
    pub title: Option<String>,
    pub priority: Option<u8>,
    pub tags: Vec<String>,
    pub headers: bool,
}

/// Publish a one-off push. Returns the topic it went to, or `None` when
/// delivery is disabled.
///
/// Unlike relayed events, an explicit send reports failures to the caller.
pub async fn send(config: &CleanCityConfig, request: SendRequest) -> Result<Option<String>> {
    if !config.notify.enabled {
        warn!("Push delivery is disabled in config; nothing sent");
        return Ok(None);
    }

    let topic = topic(config, &request.username);
    let mut message = NtfyMessage::new(&topic, request.message).tags(request.tags);
    if let Some(title) = request.title {
        message = message.title(title);
    }
    if let Some(priority) = request.priority {
        message = message.priority(Priority::new(priority));
    }

    let client = NtfyClient::new(&config.notify).map_err(|e| CleanCityError::upstream("relay", e))?;
    let outcome = if request.headers {
        client.publish_with_headers(&message).await
    } else {
        NotificationDispatcher::new(Arc::new(client))
            .deliver(&message)
            .await
    };
    outcome.map_err(|e| CleanCityError::upstream("publish", e))?;
    Ok(Some(topic))
}

/// Attach the push relay for `config` to `bus`.
pub fn wire_relay(config: &CleanCityConfig, bus: &EventBus<DomainEvent>) -> Result<RelayHandle> {
    let dispatcher = NotificationDispatcher::from_config(&config.notify)
        .map_err(|e| CleanCityError::upstream("relay", e))?;
    Ok(NotificationRelay::attach(bus, dispatcher, template_context(config)))
}

/// Emit each event from `path` on `bus`, then wait for relayed pushes.
///
/// Returns how many events were emitted. Delivery failures are logged by
/// the relay and do not fail the command.
pub async fn emit(bus: &EventBus<DomainEvent>, relay: &RelayHandle, path: &Path) -> Result<usize> {
    let events: Vec<DomainEvent> = read_records(path)?;
    for event in &events {
        let report = bus.emit(event);
        info!(
            event = %event.event_type(),
            report_id = %event.report_id(),
            handlers = report.invoked,
            "Event emitted"
        );
    }
    relay.flush().await;
    Ok(events.len())
}

pub fn config_show(config: &CleanCityConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Write the default configuration to `path`. Refuses to overwrite unless
/// `force` is set.
pub fn config_init(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(CleanCityError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    CleanCityConfig::default().save(path)?;
    Ok(path.to_path_buf())
}
