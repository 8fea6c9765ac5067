//! Rule-based validation of post and report drafts.
//!
//! A [`Validator`] runs every rule it holds, with no short-circuit, and
//! concatenates their errors in rule order.

use cleancity_core::config::ValidationConfig;
use cleancity_core::types::Draft;
use serde::Serialize;

/// Keywords rejected by [`NoSpam`] when no custom list is configured.
pub const DEFAULT_SPAM_KEYWORDS: &[&str] = &[
    "spam",
    "buy now",
    "click here",
    "free money",
    "casino",
    "lottery",
];

/// Outcome of validating a draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// A single named check against a draft.
pub trait ValidationRule: Send + Sync {
    fn rule_name(&self) -> &'static str;

    fn validate(&self, draft: &Draft) -> ValidationResult;
}

/// Title and content must not be blank.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequiredFields;

impl ValidationRule for RequiredFields {
    fn rule_name(&self) -> &'static str {
        "required_fields"
    }

    fn validate(&self, draft: &Draft) -> ValidationResult {
        let mut errors = Vec::new();
        if draft.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        if draft.content.trim().is_empty() {
            errors.push("Content is required".to_string());
        }
        ValidationResult::from_errors(errors)
    }
}

/// Minimum trimmed length, in characters, for title and content.
///
/// Blank fields are left to [`RequiredFields`].
#[derive(Clone, Copy, Debug)]
pub struct MinLength {
    pub title_min: usize,
    pub content_min: usize,
}

impl MinLength {
    pub fn new(title_min: usize, content_min: usize) -> Self {
        Self {
            title_min,
            content_min,
        }
    }
}

impl Default for MinLength {
    fn default() -> Self {
        Self::new(3, 10)
    }
}

impl ValidationRule for MinLength {
    fn rule_name(&self) -> &'static str {
        "min_length"
    }

    fn validate(&self, draft: &Draft) -> ValidationResult {
        let mut errors = Vec::new();
        let title = draft.title.trim();
        if !title.is_empty() && title.chars().count() < self.title_min {
            errors.push(format!(
                "Title must be at least {} characters",
                self.title_min
            ));
        }
        let content = draft.content.trim();
        if !content.is_empty() && content.chars().count() < self.content_min {
            errors.push(format!(
                "Content must be at least {} characters",
                self.content_min
            ));
        }
        ValidationResult::from_errors(errors)
    }
}

/// Case-insensitive keyword blocklist over title and content.
///
/// Each matched keyword is reported once, even when it appears in both.
#[derive(Clone, Debug)]
pub struct NoSpam {
    keywords: Vec<String>,
}

impl NoSpam {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

impl Default for NoSpam {
    fn default() -> Self {
        Self::new(DEFAULT_SPAM_KEYWORDS)
    }
}

impl ValidationRule for NoSpam {
    fn rule_name(&self) -> &'static str {
        "no_spam"
    }

    fn validate(&self, draft: &Draft) -> ValidationResult {
        let title = draft.title.to_lowercase();
        let content = draft.content.to_lowercase();
        let errors = self
            .keywords
            .iter()
            .filter(|k| title.contains(k.as_str()) || content.contains(k.as_str()))
            .map(|k| format!("Prohibited keyword found: {}", k))
            .collect();
        ValidationResult::from_errors(errors)
    }
}

/// Ordered collection of rules.
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Returns `self` so calls can be chained.
    pub fn add_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// RequiredFields + MinLength(3, 10).
    pub fn basic() -> Self {
        Self::new()
            .add_rule(RequiredFields)
            .add_rule(MinLength::default())
    }

    /// RequiredFields + MinLength(5, 50) + NoSpam.
    pub fn strict() -> Self {
        Self::strict_with_keywords(NoSpam::default())
    }

    fn strict_with_keywords(no_spam: NoSpam) -> Self {
        Self::new()
            .add_rule(RequiredFields)
            .add_rule(MinLength::new(5, 50))
            .add_rule(no_spam)
    }

    /// Build the configured preset. Unknown presets fall back to basic.
    pub fn from_config(config: &ValidationConfig) -> Self {
        match config.preset.as_str() {
            "strict" if config.spam_keywords.is_empty() => Self::strict(),
            "strict" => Self::strict_with_keywords(NoSpam::new(&config.spam_keywords)),
            _ => Self::basic(),
        }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.rule_name()).collect()
    }

    /// Run every rule and merge their errors.
    pub fn validate(&self, draft: &Draft) -> ValidationResult {
        let errors = self
            .rules
            .iter()
            .flat_map(|rule| {
                let result = rule.validate(draft);
                if !result.is_valid {
                    tracing::debug!(
                        rule = rule.rule_name(),
                        errors = result.errors.len(),
                        "Validation rule failed"
                    );
                }
                result.errors
            })
            .collect();
        ValidationResult::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_validator_is_always_valid() {
        let result = Validator::new().validate(&Draft::new("", ""));
        assert_eq!(result, ValidationResult::ok());
    }

    #[test]
    fn test_rules_do_not_short_circuit() {
        let validator = Validator::new()
            .add_rule(RequiredFields)
            .add_rule(MinLength::new(5, 10));
        let result = validator.validate(&Draft::new("", ""));

        assert!(!result.is_valid);
        assert!(result.errors.contains(&"Title is required".to_string()));
        assert!(result.errors.contains(&"Content is required".to_string()));
    }

    #[test]
    fn test_errors_from_several_rules_are_concatenated_in_order() {
        let validator = Validator::new()
            .add_rule(MinLength::new(5, 10))
            .add_rule(NoSpam::default());
        let result = validator.validate(&Draft::new("Spam", "buy now"));

        assert_eq!(
            result.errors,
            vec![
                "Title must be at least 5 characters",
                "Content must be at least 10 characters",
                "Prohibited keyword found: spam",
                "Prohibited keyword found: buy now",
            ]
        );
    }

    #[test]
    fn test_required_fields_trims_whitespace() {
        let result = RequiredFields.validate(&Draft::new("   ", "\n\t"));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_min_length_counts_trimmed_chars() {
        let rule = MinLength::new(3, 10);
        assert!(rule.validate(&Draft::new("  Rua  ", "Buraco na via")).is_valid);
        assert!(!rule.validate(&Draft::new("  Ru  ", "Buraco na via")).is_valid);
    }

    #[test]
    fn test_min_length_skips_blank_fields() {
        let result = MinLength::new(5, 10).validate(&Draft::new("", ""));
        assert!(result.is_valid);
    }

    #[test]
    fn test_no_spam_is_case_insensitive_and_reports_each_keyword() {
        let result = NoSpam::default().validate(&Draft::new(
            "CLICK HERE for info",
            "Win the Lottery, buy now",
        ));
        assert_eq!(
            result.errors,
            vec![
                "Prohibited keyword found: buy now",
                "Prohibited keyword found: click here",
                "Prohibited keyword found: lottery",
            ]
        );
    }

    #[test]
    fn test_no_spam_reports_keyword_once_when_in_both_fields() {
        let result = NoSpam::new(["casino"]).validate(&Draft::new("casino", "casino again"));
        assert_eq!(result.errors, vec!["Prohibited keyword found: casino"]);
    }

    #[test]
    fn test_basic_preset_accepts_reasonable_report() {
        let draft = Draft::new(
            "Broken streetlight",
            "The lamp at the corner has been out for days.",
        );
        assert!(Validator::basic().validate(&draft).is_valid);
    }

    #[test]
    fn test_strict_preset_requires_longer_content() {
        let draft = Draft::new("Broken streetlight", "Lamp is out.");
        let result = Validator::strict().validate(&draft);
        assert_eq!(result.errors, vec!["Content must be at least 50 characters"]);
    }

    #[test]
    fn test_preset_rule_names() {
        assert_eq!(
            Validator::basic().rule_names(),
            vec!["required_fields", "min_length"]
        );
        assert_eq!(
            Validator::strict().rule_names(),
            vec!["required_fields", "min_length", "no_spam"]
        );
    }

    #[test]
    fn test_from_config_uses_custom_keywords() {
        let config = ValidationConfig {
            preset: "strict".to_string(),
            spam_keywords: vec!["Crypto".to_string()],
        };
        let validator = Validator::from_config(&config);
        let result = validator.validate(&Draft::new(
            "Cheap crypto offer",
            "This body is long enough to pass the strict minimum length rule.",
        ));
        assert_eq!(result.errors, vec!["Prohibited keyword found: crypto"]);
    }
}
