use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use cleancity_core::config::DecoratorConfig;
use cleancity_core::types::{Clock, Post, SystemClock};
use serde::Serialize;
use uuid::Uuid;

use super::Decoration;
use crate::badge::{Badge, BadgeKind, BadgeVariant};

const TRENDING_WINDOW_HOURS: i64 = 48;
const TRENDING_MIN_RATING: f64 = 3.5;

/// Computes one piece of presentation metadata for a post.
pub trait PostDecorator: Send + Sync {
    fn name(&self) -> &'static str;

    fn decorate(&self, post: &Post, now: DateTime<Utc>) -> Decoration;
}

/// "New" for posts younger than a threshold.
#[derive(Clone, Copy, Debug)]
pub struct NewPostDecorator {
    pub max_age_hours: i64,
}

impl Default for NewPostDecorator {
    fn default() -> Self {
        Self { max_age_hours: 24 }
    }
}

impl PostDecorator for NewPostDecorator {
    fn name(&self) -> &'static str {
        "new"
    }

    fn decorate(&self, post: &Post, now: DateTime<Utc>) -> Decoration {
        let Some(max_age) = Duration::try_hours(self.max_age_hours) else {
            return Decoration::none();
        };
        match post.age(now) {
            Some(age) if age <= max_age => Decoration::badge(
                Badge::new(BadgeKind::New, "New", BadgeVariant::Info).with_icon("🆕"),
                1,
                false,
            ),
            _ => Decoration::none(),
        }
    }
}

/// "Popular" for well-rated posts.
#[derive(Clone, Copy, Debug)]
pub struct PopularDecorator {
    pub min_rating: f64,
}

impl Default for PopularDecorator {
    fn default() -> Self {
        Self { min_rating: 4.0 }
    }
}

impl PostDecorator for PopularDecorator {
    fn name(&self) -> &'static str {
        "popular"
    }

    fn decorate(&self, post: &Post, _now: DateTime<Utc>) -> Decoration {
        match post.average_rating {
            Some(rating) if rating >= self.min_rating => Decoration::badge(
                Badge::new(BadgeKind::Popular, "Popular", BadgeVariant::Warning).with_icon("⭐"),
                2,
                true,
            ),
            _ => Decoration::none(),
        }
    }
}

/// "Trending": recent and well rated. Carries the highest priority.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrendingDecorator;

impl PostDecorator for TrendingDecorator {
    fn name(&self) -> &'static str {
        "trending"
    }

    fn decorate(&self, post: &Post, now: DateTime<Utc>) -> Decoration {
        let recent = post
            .age(now)
            .is_some_and(|age| age <= Duration::hours(TRENDING_WINDOW_HOURS));
        let rated = post
            .average_rating
            .is_some_and(|r| r >= TRENDING_MIN_RATING);
        if recent && rated {
            Decoration::badge(
                Badge::new(BadgeKind::Trending, "Trending", BadgeVariant::Destructive)
                    .with_icon("🔥"),
                3,
                true,
            )
        } else {
            Decoration::none()
        }
    }
}

/// "Verified" for posts by authors on an allow-list.
#[derive(Clone, Debug, Default)]
pub struct VerifiedAuthorDecorator {
    authors: HashSet<Uuid>,
}

impl VerifiedAuthorDecorator {
    pub fn new(authors: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            authors: authors.into_iter().collect(),
        }
    }
}

impl PostDecorator for VerifiedAuthorDecorator {
    fn name(&self) -> &'static str {
        "verified"
    }

    fn decorate(&self, post: &Post, _now: DateTime<Utc>) -> Decoration {
        match post.author_id {
            Some(author) if self.authors.contains(&author) => Decoration::badge(
                Badge::new(BadgeKind::Verified, "Verified", BadgeVariant::Success).with_icon("✔"),
                1,
                false,
            ),
            _ => Decoration::none(),
        }
    }
}

/// A post together with its computed decoration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecoratedPost {
    pub post: Post,
    #[serde(flatten)]
    pub decoration: Decoration,
}

/// Ordered list of post decorators sharing one clock.
pub struct PostDecoratorChain {
    decorators: Vec<Box<dyn PostDecorator>>,
    clock: Arc<dyn Clock>,
}

impl PostDecoratorChain {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            decorators: Vec::new(),
            clock,
        }
    }

    pub fn with(mut self, decorator: impl PostDecorator + 'static) -> Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    /// New, Popular, Trending, Verified with configured thresholds.
    pub fn from_config(config: &DecoratorConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock)
            .with(NewPostDecorator {
                max_age_hours: config.new_post_hours,
            })
            .with(PopularDecorator {
                min_rating: config.popular_rating,
            })
            .with(TrendingDecorator)
            .with(VerifiedAuthorDecorator::new(
                config.verified_authors.iter().copied(),
            ))
    }

    /// Default chain on the system clock.
    pub fn standard() -> Self {
        Self::from_config(&DecoratorConfig::default(), Arc::new(SystemClock))
    }

    pub fn decorator_names(&self) -> Vec<&'static str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }

    pub fn decorate(&self, post: &Post) -> DecoratedPost {
        let now = self.clock.now();
        let decoration = self
            .decorators
            .iter()
            .map(|d| d.decorate(post, now))
            .fold(Decoration::none(), Decoration::merge);
        DecoratedPost {
            post: post.clone(),
            decoration,
        }
    }

    pub fn decorate_many(&self, posts: &[Post]) -> Vec<DecoratedPost> {
        posts.iter().map(|p| self.decorate(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cleancity_core::types::FixedClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn post(hours_ago: Option<i64>, rating: Option<f64>) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id: None,
            author_name: Some("Ana".to_string()),
            title: "Graffiti cleaned on Av. Central".to_string(),
            content: "Thanks to the crew!".to_string(),
            created_at: hours_ago.map(|h| now() - Duration::hours(h)),
            average_rating: rating,
            comment_count: 4,
        }
    }

    fn chain() -> PostDecoratorChain {
        PostDecoratorChain::new(Arc::new(FixedClock(now())))
            .with(NewPostDecorator::default())
            .with(PopularDecorator::default())
            .with(TrendingDecorator)
    }

    fn kinds(decorated: &DecoratedPost) -> Vec<BadgeKind> {
        decorated.decoration.badges.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_priority_is_max_not_sum() {
        let decorated = chain().decorate(&post(Some(2), Some(4.5)));
        assert_eq!(
            kinds(&decorated),
            vec![BadgeKind::New, BadgeKind::Popular, BadgeKind::Trending]
        );
        assert_eq!(decorated.decoration.priority, 3);
        assert!(decorated.decoration.is_highlighted);
    }

    #[test]
    fn test_priority_independent_of_order() {
        let reversed = PostDecoratorChain::new(Arc::new(FixedClock(now())))
            .with(TrendingDecorator)
            .with(PopularDecorator::default())
            .with(NewPostDecorator::default());
        assert_eq!(reversed.decorate(&post(Some(2), Some(4.5))).decoration.priority, 3);
    }

    #[test]
    fn test_null_rating_never_popular_or_trending() {
        for hours in [Some(1), Some(30), Some(100), None] {
            let decorated = chain().decorate(&post(hours, None));
            let k = kinds(&decorated);
            assert!(!k.contains(&BadgeKind::Popular));
            assert!(!k.contains(&BadgeKind::Trending));
        }
    }

    #[test]
    fn test_null_timestamp_never_new_or_trending() {
        let decorated = chain().decorate(&post(None, Some(4.8)));
        assert_eq!(kinds(&decorated), vec![BadgeKind::Popular]);
        assert_eq!(decorated.decoration.priority, 2);
    }

    #[test]
    fn test_new_threshold_is_inclusive_and_configurable() {
        let d = NewPostDecorator { max_age_hours: 6 };
        assert_eq!(d.decorate(&post(Some(6), None), now()).badges.len(), 1);
        assert!(d.decorate(&post(Some(7), None), now()).badges.is_empty());
    }

    #[test]
    fn test_out_of_range_threshold_gives_no_badge() {
        let d = NewPostDecorator {
            max_age_hours: i64::MAX,
        };
        assert!(d.decorate(&post(Some(1), None), now()).badges.is_empty());

        let negative = NewPostDecorator { max_age_hours: -5 };
        assert!(negative.decorate(&post(Some(0), None), now()).badges.is_empty());
    }

    #[test]
    fn test_trending_window() {
        let decorated = chain().decorate(&post(Some(40), Some(3.6)));
        assert_eq!(kinds(&decorated), vec![BadgeKind::Trending]);

        let stale = chain().decorate(&post(Some(49), Some(5.0)));
        assert_eq!(kinds(&stale), vec![BadgeKind::Popular]);
    }

    #[test]
    fn test_plain_post_has_zero_decoration() {
        let decorated = chain().decorate(&post(Some(100), Some(2.0)));
        assert_eq!(decorated.decoration, Decoration::none());
    }

    #[test]
    fn test_verified_author() {
        let author = Uuid::new_v4();
        let d = VerifiedAuthorDecorator::new([author]);

        let mut p = post(Some(100), None);
        assert!(d.decorate(&p, now()).badges.is_empty());

        p.author_id = Some(Uuid::new_v4());
        assert!(d.decorate(&p, now()).badges.is_empty());

        p.author_id = Some(author);
        let decoration = d.decorate(&p, now());
        assert_eq!(decoration.badges[0].kind, BadgeKind::Verified);
    }

    #[test]
    fn test_source_post_is_not_mutated() {
        let p = post(Some(2), Some(4.5));
        let before = p.clone();
        let decorated = chain().decorate(&p);
        assert_eq!(p, before);
        assert_eq!(decorated.post, before);
    }

    #[test]
    fn test_running_a_decorator_twice_duplicates_its_badge() {
        let doubled = PostDecoratorChain::new(Arc::new(FixedClock(now())))
            .with(NewPostDecorator::default())
            .with(NewPostDecorator::default());
        assert_eq!(doubled.decorate(&post(Some(1), None)).decoration.badges.len(), 2);
    }

    #[test]
    fn test_decorate_many() {
        assert!(chain().decorate_many(&[]).is_empty());
        let out = chain().decorate_many(&[post(Some(1), None), post(Some(100), None)]);
        assert_eq!(out.len(), 2);
        assert_eq!(kinds(&out[0]), vec![BadgeKind::New]);
        assert!(kinds(&out[1]).is_empty());
    }

    #[test]
    fn test_from_config_chain() {
        let author = Uuid::new_v4();
        let config = DecoratorConfig {
            new_post_hours: 12,
            popular_rating: 4.5,
            verified_authors: vec![author],
        };
        let chain = PostDecoratorChain::from_config(&config, Arc::new(FixedClock(now())));
        assert_eq!(
            chain.decorator_names(),
            vec!["new", "popular", "trending", "verified"]
        );

        let mut p = post(Some(20), Some(4.2));
        p.author_id = Some(author);
        let decorated = chain.decorate(&p);
        assert_eq!(kinds(&decorated), vec![BadgeKind::Trending, BadgeKind::Verified]);
    }

    #[test]
    fn test_decorated_post_serializes_flat() {
        let json = serde_json::to_value(chain().decorate(&post(Some(1), None))).unwrap();
        assert_eq!(json["priority"], 1);
        assert_eq!(json["is_highlighted"], false);
        assert!(json["post"]["title"].is_string());
    }
}
