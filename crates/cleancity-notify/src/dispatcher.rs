//! Best-effort delivery on top of a [`NotificationSink`].

use std::sync::Arc;

use cleancity_core::config::NotifyConfig;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{NotificationSink, NtfyClient};
use crate::error::DeliveryError;
use crate::payload::NtfyMessage;

/// Hands messages to a sink and swallows the consequences.
///
/// A failed push is logged and reported back once. It is never retried and
/// never turned into a user-facing error.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
    enabled: bool,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            enabled: true,
        }
    }

    /// Dispatcher backed by an [`NtfyClient`] built from `config`.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, DeliveryError> {
        let client = NtfyClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_enabled(config.enabled))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Publish `message`, logging any failure.
    ///
    /// The error is returned for callers that want to report it; ignoring it
    /// is always safe.
    pub async fn deliver(&self, message: &NtfyMessage) -> Result<(), DeliveryError> {
        if !self.enabled {
            debug!(topic = %message.topic, "Push delivery disabled, dropping message");
            return Ok(());
        }

        match self.sink.publish(message).await {
            Ok(()) => {
                debug!(topic = %message.topic, "Push delivered");
                Ok(())
            }
            Err(e) => {
                warn!(topic = %message.topic, error = %e, "Push delivery failed");
                Err(e)
            }
        }
    }

    /// Deliver in the background on the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime; the message is dropped
    /// and a warning is logged.
    pub fn deliver_detached(&self, message: NtfyMessage) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    topic = %message.topic,
                    error = %DeliveryError::NoRuntime,
                    "Push dropped"
                );
                return None;
            }
        };
        let dispatcher = self.clone();
        Some(handle.spawn(async move {
            let _ = dispatcher.deliver(&message).await;
        }))
    }
}
