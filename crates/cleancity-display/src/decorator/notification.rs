//! Staged decoration for notifications.
//!
//! [`BaseNotificationDecorator`] is the only way to build a
//! [`DecoratedNotification`], and every later [`NotificationStage`] takes one
//! as input. A stage that reads the category or timestamp therefore cannot
//! run before the base decoration exists.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cleancity_core::types::{
    relative_time, Clock, Notification, NotificationCategory, SystemClock,
};
use serde::Serialize;

use super::Decoration;
use crate::badge::{Badge, BadgeKind, BadgeVariant};

/// How loudly a notification should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    /// >=5 critical, >=4 high, >=3 medium, otherwise low.
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            p if p >= 5 => UrgencyLevel::Critical,
            4 => UrgencyLevel::High,
            3 => UrgencyLevel::Medium,
            _ => UrgencyLevel::Low,
        }
    }

    fn variant(&self) -> BadgeVariant {
        match self {
            UrgencyLevel::Low => BadgeVariant::Secondary,
            UrgencyLevel::Medium => BadgeVariant::Info,
            UrgencyLevel::High => BadgeVariant::Warning,
            UrgencyLevel::Critical => BadgeVariant::Destructive,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "Low"),
            UrgencyLevel::Medium => write!(f, "Medium"),
            UrgencyLevel::High => write!(f, "High"),
            UrgencyLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// Keyword table for guessing a notification's category, checked top to
/// bottom. This is a heuristic over free text, not a classifier.
const CATEGORY_KEYWORDS: &[(&[&str], NotificationCategory)] = &[
    (&["comment"], NotificationCategory::Comment),
    (&["status"], NotificationCategory::Status),
    (&["assign"], NotificationCategory::Assignment),
    (&["resolv"], NotificationCategory::Resolution),
    (&["mention"], NotificationCategory::Mention),
];

/// Guess the category from the title and message, defaulting to comment.
pub fn infer_category(title: &str, message: &str) -> NotificationCategory {
    let text = format!("{} {}", title, message).to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

pub fn category_icon(category: NotificationCategory) -> &'static str {
    match category {
        NotificationCategory::Comment => "💬",
        NotificationCategory::Status => "🔄",
        NotificationCategory::Assignment => "👷",
        NotificationCategory::Resolution => "✅",
        NotificationCategory::Mention => "📣",
    }
}

/// A notification plus everything the stages computed for it.
///
/// Fields are private so a value can only come out of
/// [`BaseNotificationDecorator::decorate`]; stages never see a hand-built one.
///
/// ```compile_fail
/// use cleancity_core::types::{Notification, NotificationCategory};
/// use cleancity_display::decorator::{DecoratedNotification, Decoration, UrgencyLevel};
///
/// let forged = DecoratedNotification {
///     notification: Notification {
///         id: uuid::Uuid::nil(),
///         title: String::new(),
///         message: String::new(),
///         priority: 1,
///         created_at: None,
///         read: false,
///     },
///     decoration: Decoration::none(),
///     urgency: UrgencyLevel::Critical,
///     category: NotificationCategory::Mention,
///     timestamp: None,
///     relative_time: None,
///     icon: None,
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecoratedNotification {
    notification: Notification,
    #[serde(flatten)]
    decoration: Decoration,
    urgency: UrgencyLevel,
    category: NotificationCategory,
    timestamp: Option<DateTime<Utc>>,
    relative_time: Option<String>,
    icon: Option<&'static str>,
}

impl DecoratedNotification {
    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    pub fn urgency(&self) -> UrgencyLevel {
        self.urgency
    }

    pub fn category(&self) -> NotificationCategory {
        self.category
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Set by [`RelativeTimeStage`].
    pub fn relative_time(&self) -> Option<&str> {
        self.relative_time.as_deref()
    }

    /// Set by [`CategoryIconStage`].
    pub fn icon(&self) -> Option<&'static str> {
        self.icon
    }
}

/// First stage: urgency, category and timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseNotificationDecorator;

impl BaseNotificationDecorator {
    pub fn decorate(&self, notification: &Notification) -> DecoratedNotification {
        let urgency = UrgencyLevel::from_priority(notification.priority);
        let decoration = Decoration::badge(
            Badge::new(BadgeKind::Urgency, urgency.to_string(), urgency.variant()),
            notification.priority,
            urgency >= UrgencyLevel::High,
        );
        DecoratedNotification {
            notification: notification.clone(),
            decoration,
            urgency,
            category: infer_category(&notification.title, &notification.message),
            timestamp: notification.created_at,
            relative_time: None,
            icon: None,
        }
    }
}

/// A step that runs after the base decoration.
pub trait NotificationStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, item: DecoratedNotification, now: DateTime<Utc>) -> DecoratedNotification;
}

/// Fills in "3h ago" style text from the base timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelativeTimeStage;

impl NotificationStage for RelativeTimeStage {
    fn name(&self) -> &'static str {
        "relative_time"
    }

    fn apply(&self, mut item: DecoratedNotification, now: DateTime<Utc>) -> DecoratedNotification {
        item.relative_time = item.timestamp.map(|ts| relative_time(ts, now));
        item
    }
}

/// Picks the glyph for the base category.
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryIconStage;

impl NotificationStage for CategoryIconStage {
    fn name(&self) -> &'static str {
        "category_icon"
    }

    fn apply(&self, mut item: DecoratedNotification, _now: DateTime<Utc>) -> DecoratedNotification {
        item.icon = Some(category_icon(item.category));
        item
    }
}

/// Base decoration followed by ordered stages.
pub struct NotificationPipeline {
    base: BaseNotificationDecorator,
    stages: Vec<Box<dyn NotificationStage>>,
    clock: Arc<dyn Clock>,
}

impl NotificationPipeline {
    pub fn new(base: BaseNotificationDecorator, clock: Arc<dyn Clock>) -> Self {
        Self {
            base,
            stages: Vec::new(),
            clock,
        }
    }

    pub fn then(mut self, stage: impl NotificationStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Base, relative time, category icon.
    pub fn standard(clock: Arc<dyn Clock>) -> Self {
        Self::new(BaseNotificationDecorator, clock)
            .then(RelativeTimeStage)
            .then(CategoryIconStage)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn decorate(&self, notification: &Notification) -> DecoratedNotification {
        let now = self.clock.now();
        self.stages
            .iter()
            .fold(self.base.decorate(notification), |item, stage| {
                stage.apply(item, now)
            })
    }

    pub fn decorate_many(&self, notifications: &[Notification]) -> Vec<DecoratedNotification> {
        notifications.iter().map(|n| self.decorate(n)).collect()
    }
}

impl Default for NotificationPipeline {
    fn default() -> Self {
        Self::standard(Arc::new(SystemClock))
    }
}
