//! Badges: small labelled value objects rendered next to reports and posts.
//!
//! The status and priority colours come from editable [`VariantTable`]s so a
//! new status only needs a table entry, not a new branch.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use cleancity_core::config::BadgeConfig;
use cleancity_core::types::{Profile, ReportStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a badge describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    New,
    Popular,
    Trending,
    Verified,
    Urgency,
    Status,
    Priority,
    Assignment,
    Category,
}

/// Visual style of a badge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Success,
    Warning,
    Destructive,
    Info,
    #[default]
    Outline,
}

impl fmt::Display for BadgeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeVariant::Default => write!(f, "default"),
            BadgeVariant::Secondary => write!(f, "secondary"),
            BadgeVariant::Success => write!(f, "success"),
            BadgeVariant::Warning => write!(f, "warning"),
            BadgeVariant::Destructive => write!(f, "destructive"),
            BadgeVariant::Info => write!(f, "info"),
            BadgeVariant::Outline => write!(f, "outline"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown badge variant: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for BadgeVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(BadgeVariant::Default),
            "secondary" => Ok(BadgeVariant::Secondary),
            "success" => Ok(BadgeVariant::Success),
            "warning" => Ok(BadgeVariant::Warning),
            "destructive" => Ok(BadgeVariant::Destructive),
            "info" => Ok(BadgeVariant::Info),
            "outline" => Ok(BadgeVariant::Outline),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A rendered badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub label: String,
    pub variant: BadgeVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Badge {
    pub fn new(kind: BadgeKind, label: impl Into<String>, variant: BadgeVariant) -> Self {
        Self {
            kind,
            label: label.into(),
            variant,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Something that knows how to present itself as a badge.
pub trait BadgeRenderer {
    fn render(&self) -> Badge;

    /// Plain-text label, used for accessibility and in tests.
    fn label(&self) -> String;
}

/// Name → variant lookup, keyed by lower-cased trimmed name.
#[derive(Clone, Debug, Default)]
pub struct VariantTable {
    entries: HashMap<String, BadgeVariant>,
}

impl VariantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, variant: BadgeVariant) -> Self {
        self.insert(name, variant);
        self
    }

    pub fn insert(&mut self, name: &str, variant: BadgeVariant) {
        self.entries.insert(normalize(name), variant);
    }

    /// Variant for `name`, or [`BadgeVariant::Outline`] when unknown.
    pub fn lookup(&self, name: &str) -> BadgeVariant {
        self.entries
            .get(&normalize(name))
            .copied()
            .unwrap_or_default()
    }

    fn default_status() -> Self {
        Self::new()
            .with("pending", BadgeVariant::Warning)
            .with("open", BadgeVariant::Info)
            .with("in progress", BadgeVariant::Info)
            .with("in_progress", BadgeVariant::Info)
            .with("resolved", BadgeVariant::Success)
            .with("closed", BadgeVariant::Secondary)
            .with("rejected", BadgeVariant::Destructive)
    }

    fn default_priority() -> Self {
        Self::new()
            .with("low", BadgeVariant::Secondary)
            .with("medium", BadgeVariant::Info)
            .with("high", BadgeVariant::Warning)
            .with("urgent", BadgeVariant::Destructive)
    }

    fn merge_overrides(&mut self, overrides: &std::collections::BTreeMap<String, String>) {
        for (name, variant) in overrides {
            match variant.parse::<BadgeVariant>() {
                Ok(v) => self.insert(name, v),
                Err(e) => warn!(name = %name, error = %e, "Ignoring badge override"),
            }
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Concrete badges
// =============================================================================

pub struct StatusBadge {
    name: Option<String>,
    variant: BadgeVariant,
}

impl BadgeRenderer for StatusBadge {
    fn render(&self) -> Badge {
        Badge::new(BadgeKind::Status, self.label(), self.variant)
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| "Unknown".to_string())
    }
}

pub struct PriorityBadge {
    name: Option<String>,
    variant: BadgeVariant,
}

impl BadgeRenderer for PriorityBadge {
    fn render(&self) -> Badge {
        Badge::new(BadgeKind::Priority, self.label(), self.variant)
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| "N/A".to_string())
    }
}

pub struct AssignmentBadge {
    assignee: Option<String>,
}

impl BadgeRenderer for AssignmentBadge {
    fn render(&self) -> Badge {
        let variant = if self.assignee.is_some() {
            BadgeVariant::Default
        } else {
            BadgeVariant::Outline
        };
        Badge::new(BadgeKind::Assignment, self.label(), variant).with_icon("👷")
    }

    fn label(&self) -> String {
        self.assignee
            .clone()
            .unwrap_or_else(|| "Unassigned".to_string())
    }
}

pub struct CategoryBadge {
    name: Option<String>,
}

impl BadgeRenderer for CategoryBadge {
    fn render(&self) -> Badge {
        Badge::new(BadgeKind::Category, self.label(), BadgeVariant::Secondary)
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| "N/A".to_string())
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Builds badges for report tables and lists.
#[derive(Clone, Debug)]
pub struct BadgeFactory {
    status_variants: VariantTable,
    priority_variants: VariantTable,
}

impl Default for BadgeFactory {
    fn default() -> Self {
        Self {
            status_variants: VariantTable::default_status(),
            priority_variants: VariantTable::default_priority(),
        }
    }
}

impl BadgeFactory {
    /// Built-in tables with the configured overrides applied on top.
    pub fn from_config(config: &BadgeConfig) -> Self {
        let mut factory = Self::default();
        factory.status_variants.merge_overrides(&config.status);
        factory.priority_variants.merge_overrides(&config.priority);
        factory
    }

    pub fn with_status_variant(mut self, name: &str, variant: BadgeVariant) -> Self {
        self.status_variants.insert(name, variant);
        self
    }

    pub fn with_priority_variant(mut self, name: &str, variant: BadgeVariant) -> Self {
        self.priority_variants.insert(name, variant);
        self
    }

    pub fn status_badge(&self, status: Option<&ReportStatus>) -> StatusBadge {
        let name = non_blank(status.map(|s| s.name.as_str()));
        StatusBadge {
            variant: name.map_or(BadgeVariant::Outline, |n| self.status_variants.lookup(n)),
            name: name.map(str::to_string),
        }
    }

    pub fn priority_badge(&self, priority: Option<&str>) -> PriorityBadge {
        let name = non_blank(priority);
        PriorityBadge {
            variant: name.map_or(BadgeVariant::Outline, |n| self.priority_variants.lookup(n)),
            name: name.map(str::to_string),
        }
    }

    /// Labelled by username, then email, then "Unassigned".
    pub fn assignment_badge(&self, worker: Option<&Profile>) -> AssignmentBadge {
        let assignee = worker.and_then(|p| {
            non_blank(p.username.as_deref()).or_else(|| non_blank(p.email.as_deref()))
        });
        AssignmentBadge {
            assignee: assignee.map(str::to_string),
        }
    }

    pub fn category_badge(&self, category: Option<&str>) -> CategoryBadge {
        CategoryBadge {
            name: non_blank(category).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn status(name: &str) -> ReportStatus {
        ReportStatus {
            id: 1,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_missing_values_fall_back() {
        let f = BadgeFactory::default();
        assert_eq!(f.status_badge(None).label(), "Unknown");
        assert_eq!(f.priority_badge(None).label(), "N/A");
        assert_eq!(f.assignment_badge(None).label(), "Unassigned");
        assert_eq!(f.category_badge(None).label(), "N/A");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let f = BadgeFactory::default();
        assert_eq!(f.status_badge(Some(&status("  "))).label(), "Unknown");
        assert_eq!(f.category_badge(Some("")).label(), "N/A");
    }

    #[test]
    fn test_status_variant_lookup_is_case_insensitive() {
        let f = BadgeFactory::default();
        let badge = f.status_badge(Some(&status("  Resolved "))).render();
        assert_eq!(badge.variant, BadgeVariant::Success);
        assert_eq!(badge.label, "Resolved");
        assert_eq!(badge.kind, BadgeKind::Status);
    }

    #[test]
    fn test_unknown_status_uses_neutral_variant() {
        let f = BadgeFactory::default();
        let badge = f.status_badge(Some(&status("Escalated"))).render();
        assert_eq!(badge.variant, BadgeVariant::Outline);
        assert_eq!(badge.label, "Escalated");
    }

    #[test]
    fn test_priority_variants() {
        let f = BadgeFactory::default();
        assert_eq!(f.priority_badge(Some("HIGH")).render().variant, BadgeVariant::Warning);
        assert_eq!(
            f.priority_badge(Some("urgent")).render().variant,
            BadgeVariant::Destructive
        );
        assert_eq!(f.priority_badge(Some("whenever")).render().variant, BadgeVariant::Outline);
    }

    #[test]
    fn test_table_extension_without_new_logic() {
        let f = BadgeFactory::default()
            .with_status_variant("Awaiting Parts", BadgeVariant::Warning);
        let badge = f.status_badge(Some(&status("awaiting parts"))).render();
        assert_eq!(badge.variant, BadgeVariant::Warning);
    }

    #[test]
    fn test_config_overrides_and_bad_variant_is_ignored() {
        let mut status_overrides = BTreeMap::new();
        status_overrides.insert("resolved".to_string(), "info".to_string());
        status_overrides.insert("weird".to_string(), "sparkly".to_string());
        let config = BadgeConfig {
            status: status_overrides,
            priority: BTreeMap::new(),
        };
        let f = BadgeFactory::from_config(&config);
        assert_eq!(
            f.status_badge(Some(&status("resolved"))).render().variant,
            BadgeVariant::Info
        );
        assert_eq!(
            f.status_badge(Some(&status("weird"))).render().variant,
            BadgeVariant::Outline
        );
    }

    #[test]
    fn test_assignment_prefers_username_then_email() {
        let f = BadgeFactory::default();
        let mut worker = Profile {
            id: Uuid::new_v4(),
            username: Some("crew-7".to_string()),
            email: Some("crew7@city.gov".to_string()),
        };
        assert_eq!(f.assignment_badge(Some(&worker)).label(), "crew-7");

        worker.username = None;
        assert_eq!(f.assignment_badge(Some(&worker)).label(), "crew7@city.gov");

        worker.email = None;
        let badge = f.assignment_badge(Some(&worker)).render();
        assert_eq!(badge.label, "Unassigned");
        assert_eq!(badge.variant, BadgeVariant::Outline);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("Warning".parse::<BadgeVariant>().unwrap(), BadgeVariant::Warning);
        assert!("neon".parse::<BadgeVariant>().is_err());
    }

    #[test]
    fn test_badge_serialization_skips_missing_icon() {
        let json = serde_json::to_string(&Badge::new(
            BadgeKind::New,
            "New",
            BadgeVariant::Info,
        ))
        .unwrap();
        assert!(!json.contains("icon"));
        assert!(json.contains("\"kind\":\"new\""));
    }
}
