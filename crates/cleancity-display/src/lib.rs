//! Read-path presentation for CleanCity.
//!
//! Validates drafts before they are submitted, and computes badges,
//! priorities and display strings for posts, reports and notifications.
//! Nothing here writes to the source records.

pub mod badge;
pub mod decorator;
pub mod format;
pub mod validation;

pub use badge::{Badge, BadgeFactory, BadgeKind, BadgeRenderer, BadgeVariant};
pub use decorator::{
    DecoratedNotification, DecoratedPost, Decoration, NotificationPipeline, PostDecoratorChain,
};
pub use format::{formatter_for, ContentFormatter, ContentItem, FormatStyle};
pub use validation::{ValidationResult, ValidationRule, Validator};
