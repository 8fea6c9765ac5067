//! In-process publish/subscribe bus.
//!
//! One bus instance is built in the composition root and cloned into
//! whoever needs to publish or listen. Handlers run synchronously inside
//! [`EventBus::emit`], in subscription order, and a failing handler never
//! stops its siblings.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use crate::events::BusEvent;

/// Error a handler may return. It is logged and otherwise ignored.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler<E> = Arc<dyn Fn(&E) -> Result<(), HandlerError> + Send + Sync>;

struct Entry<E> {
    id: u64,
    handler: Handler<E>,
    active: Arc<AtomicBool>,
    once: bool,
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
            active: Arc::clone(&self.active),
            once: self.once,
        }
    }
}

struct Registry<E: BusEvent> {
    next_id: u64,
    listeners: HashMap<E::Kind, Vec<Entry<E>>>,
}

impl<E: BusEvent> Registry<E> {
    fn remove(&mut self, kind: E::Kind, id: u64) {
        if let Some(entries) = self.listeners.get_mut(&kind) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                self.listeners.remove(&kind);
            }
        }
    }
}

/// Outcome of a single [`EventBus::emit`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers that were called.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Typed event bus keyed by [`BusEvent::Kind`].
///
/// Cloning yields another handle to the same subscriber registry.
pub struct EventBus<E: BusEvent> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<E: BusEvent>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for `kind`.
    ///
    /// The handler stays registered until [`Subscription::unsubscribe`] is
    /// called or the listeners are cleared. Dropping the subscription does
    /// not remove it.
    pub fn subscribe<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(handler), false)
    }

    /// Register `handler` for `kind`, removing it after its first call.
    pub fn subscribe_once<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(handler), true)
    }

    fn register(&self, kind: E::Kind, handler: Handler<E>, once: bool) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.entry(kind).or_default().push(Entry {
                id,
                handler,
                active: Arc::clone(&active),
                once,
            });
            id
        };
        debug!(event = %kind, handler_id = id, once, "Handler subscribed");

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            active,
            detach: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).remove(kind, id);
                    debug!(event = %kind, handler_id = id, "Handler unsubscribed");
                }
            }),
        }
    }

    /// Call every live handler for the event's kind, in subscription order.
    ///
    /// Errors and panics are logged per handler and never reach the caller.
    /// Handlers may subscribe or unsubscribe while the emit is running; a
    /// handler removed by an earlier sibling is skipped.
    pub fn emit(&self, event: &E) -> EmitReport {
        let kind = event.kind();
        let snapshot: Vec<Entry<E>> = lock(&self.inner)
            .listeners
            .get(&kind)
            .map(|entries| entries.to_vec())
            .unwrap_or_default();

        let mut report = EmitReport::default();
        let mut fired_once = Vec::new();

        for entry in &snapshot {
            if entry.once {
                // Claim the single invocation; a concurrent emit may have won.
                if !entry.active.swap(false, Ordering::AcqRel) {
                    continue;
                }
                fired_once.push(entry.id);
            } else if !entry.active.load(Ordering::Acquire) {
                continue;
            }

            report.invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| (entry.handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(event = %kind, handler_id = entry.id, error = %e, "Event handler failed");
                }
                Err(_) => {
                    report.failed += 1;
                    warn!(event = %kind, handler_id = entry.id, "Event handler panicked");
                }
            }
        }

        if !fired_once.is_empty() {
            let mut registry = lock(&self.inner);
            for id in fired_once {
                registry.remove(kind, id);
            }
        }

        report
    }

    /// Remove every handler of every kind.
    pub fn clear_all(&self) {
        let mut registry = lock(&self.inner);
        for entry in registry.listeners.values().flatten() {
            entry.active.store(false, Ordering::Release);
        }
        registry.listeners.clear();
    }

    /// Remove the handlers of one kind, or of all kinds when `kind` is `None`.
    pub fn clear_listeners(&self, kind: Option<E::Kind>) {
        match kind {
            None => self.clear_all(),
            Some(kind) => {
                if let Some(entries) = lock(&self.inner).listeners.remove(&kind) {
                    for entry in entries {
                        entry.active.store(false, Ordering::Release);
                    }
                }
            }
        }
    }

    /// Number of handlers currently registered for `kind`.
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        lock(&self.inner)
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

/// Handle to one registered handler.
///
/// The caller that subscribed owns it and is responsible for calling
/// [`unsubscribe`](Subscription::unsubscribe) on teardown.
#[must_use = "a dropped Subscription cannot be unsubscribed"]
pub struct Subscription {
    active: Arc<AtomicBool>,
    detach: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Remove the handler. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            (self.detach)();
        }
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
