//! Bridges report events on the bus to push delivery.

use std::sync::{Arc, Mutex};

use cleancity_core::bus::{EventBus, Subscription};
use cleancity_core::events::{DomainEvent, EventType};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dispatcher::NotificationDispatcher;
use crate::templates::{for_event, TemplateContext};

type Pending = Arc<Mutex<Vec<JoinHandle<()>>>>;

/// Subscribes a dispatcher to every report event type.
pub struct NotificationRelay;

impl NotificationRelay {
    /// Subscribe to all report events on `bus`.
    ///
    /// Each event becomes one templated push, delivered in the background so
    /// the emitting write path never waits on the relay.
    pub fn attach(
        bus: &EventBus<DomainEvent>,
        dispatcher: NotificationDispatcher,
        ctx: TemplateContext,
    ) -> RelayHandle {
        let ctx = Arc::new(ctx);
        let pending: Pending = Arc::new(Mutex::new(Vec::new()));

        let subscriptions = EventType::ALL
            .iter()
            .map(|&kind| {
                let dispatcher = dispatcher.clone();
                let ctx = Arc::clone(&ctx);
                let pending = Arc::clone(&pending);
                bus.subscribe(kind, move |event| {
                    let message = for_event(event, &ctx);
                    debug!(event = %kind, topic = %message.topic, "Relaying report event");
                    if let Some(task) = dispatcher.deliver_detached(message) {
                        let mut pending = pending.lock().unwrap_or_else(|e| e.into_inner());
                        pending.retain(|t| !t.is_finished());
                        pending.push(task);
                    }
                    Ok(())
                })
            })
            .collect();

        info!(events = EventType::ALL.len(), "Notification relay attached");
        RelayHandle {
            subscriptions,
            pending,
        }
    }
}

/// Keeps the relay's subscriptions; detach to stop relaying.
#[must_use = "the relay stays attached until detach() is called"]
pub struct RelayHandle {
    subscriptions: Vec<Subscription>,
    pending: Pending,
}

impl RelayHandle {
    /// Unsubscribe from every event type. Calling it again is a no-op.
    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
        debug!("Notification relay detached");
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Wait for background deliveries started so far.
    pub async fn flush(&self) {
        let tasks: Vec<_> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain(..).collect()
        };
        for task in tasks {
            let _ = task.await;
        }
    }
}
