//! Presentation metadata computed on read paths.
//!
//! Decorators never touch the source record: each returns its own partial
//! [`Decoration`], and the chain folds them together with one reducer per
//! field.

pub mod notification;
pub mod post;

use serde::Serialize;

use crate::badge::Badge;

pub use notification::{
    BaseNotificationDecorator, CategoryIconStage, DecoratedNotification, NotificationPipeline,
    NotificationStage, RelativeTimeStage, UrgencyLevel,
};
pub use post::{
    DecoratedPost, NewPostDecorator, PopularDecorator, PostDecorator, PostDecoratorChain,
    TrendingDecorator, VerifiedAuthorDecorator,
};

/// Badges, priority and highlight computed for one item.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Decoration {
    pub badges: Vec<Badge>,
    pub priority: u8,
    pub is_highlighted: bool,
}

impl Decoration {
    /// Nothing to add.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn badge(badge: Badge, priority: u8, is_highlighted: bool) -> Self {
        Self {
            badges: vec![badge],
            priority,
            is_highlighted,
        }
    }

    /// Fold `other` into `self`.
    pub fn merge(self, other: Decoration) -> Decoration {
        Decoration {
            badges: concat_badges(self.badges, other.badges),
            priority: max_priority(self.priority, other.priority),
            is_highlighted: any_highlighted(self.is_highlighted, other.is_highlighted),
        }
    }
}

/// Badge lists append; duplicates are kept.
pub fn concat_badges(mut acc: Vec<Badge>, next: Vec<Badge>) -> Vec<Badge> {
    acc.extend(next);
    acc
}

/// The strongest decorator wins; priorities never add up.
pub fn max_priority(acc: u8, next: u8) -> u8 {
    acc.max(next)
}

pub fn any_highlighted(acc: bool, next: bool) -> bool {
    acc || next
}
