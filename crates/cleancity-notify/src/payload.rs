//! Relay payloads.
//!
//! Mirrors the JSON publish body accepted by the push relay. Optional fields
//! are omitted from the wire when unset so the relay applies its own defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Relay priority, 1 (min) through 5 (urgent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(1);
    pub const LOW: Priority = Priority(2);
    pub const DEFAULT: Priority = Priority(3);
    pub const HIGH: Priority = Priority(4);
    pub const URGENT: Priority = Priority(5);

    /// Out-of-range values are clamped into 1..=5.
    pub fn new(value: u8) -> Self {
        Priority(value.clamp(1, 5))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A button attached to a push.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NtfyAction {
    /// Opens a URL on the device.
    View {
        label: String,
        url: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        clear: bool,
    },
    /// Fires an HTTP request from the device.
    Http {
        label: String,
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        clear: bool,
    },
}

impl NtfyAction {
    pub fn view(label: impl Into<String>, url: impl Into<String>) -> Self {
        NtfyAction::View {
            label: label.into(),
            url: url.into(),
            clear: false,
        }
    }

    pub fn http(label: impl Into<String>, url: impl Into<String>) -> Self {
        NtfyAction::Http {
            label: label.into(),
            url: url.into(),
            method: None,
            headers: BTreeMap::new(),
            body: None,
            clear: false,
        }
    }

    /// Short form used by the `Actions` header, e.g.
    /// `view, Open, https://x/1` or `http, Close, https://x/close, method=PUT`.
    pub fn header_value(&self) -> String {
        match self {
            NtfyAction::View { label, url, clear } => {
                let mut out = format!("view, {}, {}", label, url);
                if *clear {
                    out.push_str(", clear=true");
                }
                out
            }
            NtfyAction::Http {
                label,
                url,
                method,
                headers,
                body,
                clear,
            } => {
                let mut out = format!("http, {}, {}", label, url);
                if let Some(method) = method {
                    out.push_str(&format!(", method={}", method));
                }
                for (name, value) in headers {
                    out.push_str(&format!(", headers.{}={}", name, value));
                }
                if let Some(body) = body {
                    out.push_str(&format!(", body={}", body));
                }
                if *clear {
                    out.push_str(", clear=true");
                }
                out
            }
        }
    }
}

/// One push, addressed to a topic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NtfyMessage {
    pub topic: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NtfyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach: Option<String>,
}

impl NtfyMessage {
    pub fn new(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn click(mut self, url: impl Into<String>) -> Self {
        self.click = Some(url.into());
        self
    }

    pub fn action(mut self, action: NtfyAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn markdown(mut self, enabled: bool) -> Self {
        self.markdown = Some(enabled);
        self
    }

    pub fn icon(mut self, url: impl Into<String>) -> Self {
        self.icon = Some(url.into());
        self
    }

    /// Relay-side delivery delay, e.g. `30m` or `tomorrow, 10am`.
    pub fn delay(mut self, delay: impl Into<String>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    pub fn email(mut self, address: impl Into<String>) -> Self {
        self.email = Some(address.into());
        self
    }

    pub fn attach(mut self, url: impl Into<String>) -> Self {
        self.attach = Some(url.into());
        self
    }

    /// Metadata as `(header, value)` pairs for the header-encoded publish.
    pub fn header_pairs(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some(title) = &self.title {
            headers.push(("Title", title.clone()));
        }
        if let Some(priority) = self.priority {
            headers.push(("Priority", priority.to_string()));
        }
        if !self.tags.is_empty() {
            headers.push(("Tags", self.tags.join(",")));
        }
        if let Some(click) = &self.click {
            headers.push(("Click", click.clone()));
        }
        if let Some(markdown) = self.markdown {
            headers.push(("Markdown", if markdown { "yes" } else { "no" }.to_string()));
        }
        if let Some(icon) = &self.icon {
            headers.push(("Icon", icon.clone()));
        }
        if let Some(delay) = &self.delay {
            headers.push(("Delay", delay.clone()));
        }
        if let Some(email) = &self.email {
            headers.push(("Email", email.clone()));
        }
        if let Some(attach) = &self.attach {
            headers.push(("Attach", attach.clone()));
        }
        if !self.actions.is_empty() {
            let actions: Vec<String> = self.actions.iter().map(NtfyAction::header_value).collect();
            headers.push(("Actions", actions.join("; ")));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_clamps() {
        assert_eq!(Priority::new(0).value(), 1);
        assert_eq!(Priority::new(3).value(), 3);
        assert_eq!(Priority::new(9).value(), 5);
        assert_eq!(Priority::default(), Priority::DEFAULT);
    }

    #[test]
    fn test_priority_deserialize_clamps() {
        let p: Priority = serde_json::from_str("7").unwrap();
        assert_eq!(p, Priority::URGENT);
    }

    #[test]
    fn test_minimal_message_omits_optional_fields() {
        let json = serde_json::to_value(NtfyMessage::new("pi-clean-city-ana", "hello")).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["topic"], "pi-clean-city-ana");
        assert_eq!(json["message"], "hello");
    }

    #[test]
    fn test_full_message_wire_shape() {
        let msg = NtfyMessage::new("t", "body")
            .title("Title")
            .priority(Priority::HIGH)
            .tags(["wastebasket", "speech_balloon"])
            .click("http://localhost:5173/reports/7")
            .action(NtfyAction::view("Open", "http://localhost:5173/reports/7"))
            .markdown(true);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["priority"], 4);
        assert_eq!(json["tags"][1], "speech_balloon");
        assert_eq!(json["actions"][0]["action"], "view");
        assert_eq!(json["actions"][0]["label"], "Open");
        assert!(json["actions"][0].get("clear").is_none());
        assert_eq!(json["markdown"], true);
        assert!(json.get("delay").is_none());
    }

    #[test]
    fn test_action_header_values() {
        assert_eq!(
            NtfyAction::view("Open", "https://x/1").header_value(),
            "view, Open, https://x/1"
        );

        let close = NtfyAction::http("Close", "https://x/close");
        let NtfyAction::Http { label, url, .. } = close else {
            panic!("expected http action");
        };
        let action = NtfyAction::Http {
            label,
            url,
            method: Some("PUT".to_string()),
            headers: BTreeMap::from([("Authorization".to_string(), "Bearer t".to_string())]),
            body: None,
            clear: true,
        };
        assert_eq!(
            action.header_value(),
            "http, Close, https://x/close, method=PUT, headers.Authorization=Bearer t, clear=true"
        );
    }

    #[test]
    fn test_header_pairs() {
        let msg = NtfyMessage::new("t", "body")
            .title("Status changed")
            .priority(Priority::DEFAULT)
            .tags(["arrows_counterclockwise"])
            .markdown(false)
            .delay("30m")
            .action(NtfyAction::view("Open", "https://x/1"))
            .action(NtfyAction::view("Feed", "https://x"));
        let pairs = msg.header_pairs();
        let names: Vec<_> = pairs.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["Title", "Priority", "Tags", "Markdown", "Delay", "Actions"]
        );
        assert_eq!(pairs[3].1, "no");
        assert_eq!(pairs[5].1, "view, Open, https://x/1; view, Feed, https://x");
    }
}
