//! Interchangeable one-line renderings of feed content.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cleancity_core::types::{relative_time, truncate_with_ellipsis, Post};
use serde::{Deserialize, Serialize};

const COMPACT_TITLE_CHARS: usize = 30;

/// The fields a formatter needs, borrowed from a post or report.
#[derive(Clone, Copy, Debug)]
pub struct ContentItem<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub created_at: Option<DateTime<Utc>>,
    pub comment_count: u32,
}

impl<'a> From<&'a Post> for ContentItem<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            author: post.author_name.as_deref(),
            created_at: post.created_at,
            comment_count: post.comment_count,
        }
    }
}

pub trait ContentFormatter: Send + Sync {
    fn format(&self, item: &ContentItem<'_>, now: DateTime<Utc>) -> String;
}

/// `"{title} by {author} on {YYYY-MM-DD HH:MM}"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFormatter;

impl ContentFormatter for StandardFormatter {
    fn format(&self, item: &ContentItem<'_>, _now: DateTime<Utc>) -> String {
        let author = item
            .author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("Anonymous");
        let date = item
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        format!("{} by {} on {}", item.title, author, date)
    }
}

/// `"{title} · 3h ago"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelativeFormatter;

impl ContentFormatter for RelativeFormatter {
    fn format(&self, item: &ContentItem<'_>, now: DateTime<Utc>) -> String {
        let when = item
            .created_at
            .map(|ts| relative_time(ts, now))
            .unwrap_or_else(|| "unknown date".to_string());
        format!("{} · {}", item.title, when)
    }
}

/// Truncated title plus comment count.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompactFormatter;

impl ContentFormatter for CompactFormatter {
    fn format(&self, item: &ContentItem<'_>, _now: DateTime<Utc>) -> String {
        let title = truncate_with_ellipsis(item.title, COMPACT_TITLE_CHARS);
        match item.comment_count {
            0 => title,
            1 => format!("{} (1 comment)", title),
            n => format!("{} ({} comments)", title, n),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatStyle {
    #[default]
    Standard,
    Relative,
    Compact,
}

impl fmt::Display for FormatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatStyle::Standard => write!(f, "standard"),
            FormatStyle::Relative => write!(f, "relative"),
            FormatStyle::Compact => write!(f, "compact"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown format style: {0} (expected standard, relative or compact)")]
pub struct UnknownStyle(pub String);

impl FromStr for FormatStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(FormatStyle::Standard),
            "relative" => Ok(FormatStyle::Relative),
            "compact" => Ok(FormatStyle::Compact),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

pub fn formatter_for(style: FormatStyle) -> Box<dyn ContentFormatter> {
    match style {
        FormatStyle::Standard => Box::new(StandardFormatter),
        FormatStyle::Relative => Box::new(RelativeFormatter),
        FormatStyle::Compact => Box::new(CompactFormatter),
    }
}
