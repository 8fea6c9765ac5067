use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current time.
///
/// Decorators and formatters read the clock instead of calling `Utc::now()`
/// directly so that tests can pin "now" to a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// Records (owned by the hosted backend; read-only here)
// =============================================================================

/// A community feed post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub author_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub comment_count: u32,
}

impl Post {
    /// Age of the post relative to `now`, or `None` without a timestamp.
    ///
    /// Posts dated in the future count as zero age.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at
            .map(|created| (now - created).max(Duration::zero()))
    }
}

/// An in-app notification as stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// 1 (min) to 5 (max). Values outside the range are accepted as-is.
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}

/// A user profile. Either contact field may be missing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A report status row (`pending`, `in progress`, `resolved`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatus {
    pub id: i64,
    pub name: String,
}

/// Title and body of a post or report that has not been submitted yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Draft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

// =============================================================================
// Notification categories
// =============================================================================

/// What a notification is about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    #[default]
    Comment,
    Status,
    Assignment,
    Resolution,
    Mention,
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationCategory::Comment => write!(f, "comment"),
            NotificationCategory::Status => write!(f, "status"),
            NotificationCategory::Assignment => write!(f, "assignment"),
            NotificationCategory::Resolution => write!(f, "resolution"),
            NotificationCategory::Mention => write!(f, "mention"),
        }
    }
}

// =============================================================================
// Text helpers
// =============================================================================

/// Human-relative rendering of `then` as seen from `now`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    if elapsed < Duration::seconds(60) {
        return "just now".to_string();
    }
    if elapsed < Duration::hours(1) {
        return format!("{}m ago", elapsed.num_minutes());
    }
    if elapsed < Duration::days(1) {
        return format!("{}h ago", elapsed.num_hours());
    }
    if elapsed < Duration::days(7) {
        return format!("{}d ago", elapsed.num_days());
    }
    then.format("%Y-%m-%d").to_string()
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
