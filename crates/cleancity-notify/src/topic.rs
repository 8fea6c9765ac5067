//! Per-user push topics.

use std::sync::LazyLock;

use regex::Regex;

/// Namespace shared by every CleanCity topic on the relay.
pub const DEFAULT_TOPIC_PREFIX: &str = "pi-clean-city-";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9._-]").expect("Invalid topic regex"));

/// Reduce a username to relay-safe topic characters.
///
/// Lower-cases, turns whitespace runs into single hyphens, then drops
/// anything outside `[a-z0-9._-]`. Never fails; unicode is simply removed.
pub fn sanitize_topic_segment(username: &str) -> String {
    let lowered = username.to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    DISALLOWED.replace_all(&hyphenated, "").into_owned()
}

/// Topic a user subscribes to, under `prefix`.
pub fn user_topic(prefix: &str, username: &str) -> String {
    format!("{}{}", prefix, sanitize_topic_segment(username))
}

/// [`user_topic`] with [`DEFAULT_TOPIC_PREFIX`].
pub fn default_user_topic(username: &str) -> String {
    user_topic(DEFAULT_TOPIC_PREFIX, username)
}
