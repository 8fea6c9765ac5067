//! Push notifications for report events.
//!
//! Typed templates turn [`cleancity_core::DomainEvent`]s into relay
//! messages, [`NtfyClient`] publishes them over HTTP, and
//! [`NotificationRelay`] wires the whole thing onto an event bus.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod payload;
pub mod relay;
pub mod templates;
pub mod topic;

pub use client::{NotificationSink, NtfyClient};
pub use dispatcher::NotificationDispatcher;
pub use error::DeliveryError;
pub use payload::{NtfyAction, NtfyMessage, Priority};
pub use relay::{NotificationRelay, RelayHandle};
pub use templates::{for_event, TemplateContext};
pub use topic::{default_user_topic, user_topic, DEFAULT_TOPIC_PREFIX};
