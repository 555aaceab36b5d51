//! In-process event hub: the host-side implementation of [`EventSource`].
//!
//! The engine (or a test) emits `copy` / `skip` payloads; every registered
//! handler runs synchronously on the emitting task. Handler failures are
//! caught here, which makes `emit` the top-level error boundary for protocol
//! violations.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    error::ProtocolError,
    protocol::{CountPayload, ProgressChannel},
};
use tracing::{debug, error};

use crate::{EventHandler, EventSource, Unlisten};

type ListenerId = u64;

#[derive(Default)]
struct Listeners {
    next_id: ListenerId,
    by_event: HashMap<String, Vec<(ListenerId, EventHandler)>>,
}

/// Outcome of a single [`EventBus::emit`].
#[derive(Debug, Default)]
pub struct Delivery {
    pub delivered: usize,
    pub failures: Vec<ProtocolError>,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every listener on `event`, in registration order.
    pub fn emit(&self, event: &str, payload: serde_json::Value) -> Delivery {
        // Handlers run outside the lock so they may register or unlisten.
        let handlers: Vec<EventHandler> = lock(&self.listeners)
            .by_event
            .get(event)
            .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        let mut delivery = Delivery::default();
        for handler in handlers {
            delivery.delivered += 1;
            if let Err(err) = handler(&payload) {
                error!(event, error = %err, "event handler rejected payload");
                delivery.failures.push(err);
            }
        }
        debug!(event, delivered = delivery.delivered, "event emitted");
        delivery
    }

    pub fn emit_count(&self, channel: ProgressChannel, count: u64) -> Delivery {
        self.emit(channel.event_name(), CountPayload::new(count).to_value())
    }

    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners)
            .by_event
            .get(event)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl EventSource for EventBus {
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<Unlisten> {
        let id = {
            let mut listeners = lock(&self.listeners);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners
                .by_event
                .entry(event.to_string())
                .or_default()
                .push((id, handler));
            id
        };
        debug!(event, listener = id, "listener registered");

        let listeners = Arc::clone(&self.listeners);
        let event = event.to_string();
        Ok(Box::new(move || {
            let mut guard = lock(&listeners);
            let entries = guard.by_event.entry(event.clone()).or_default();
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            if entries.len() == before {
                return Err(anyhow!("listener {id} for '{event}' is not registered"));
            }
            Ok(())
        }))
    }
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/bus_tests.rs"]
mod tests;
