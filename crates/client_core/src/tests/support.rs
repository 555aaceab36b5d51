//! Test doubles shared by the unit tests in this crate.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::watch;

use crate::{EventBus, EventHandler, EventSource, Unlisten};

/// [`EventBus`] wrapper that records unlisten calls and can be told to fail
/// or stall registrations.
pub struct RecordingSource {
    pub bus: EventBus,
    gate: Option<watch::Receiver<bool>>,
    fail_listen_for: Option<&'static str>,
    fail_unlisten_for: Option<&'static str>,
    unlistens: Arc<Mutex<HashMap<String, usize>>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
            gate: None,
            fail_listen_for: None,
            fail_unlisten_for: None,
            unlistens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registrations block until `true` is sent on the returned gate.
    pub fn gated() -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let mut source = Self::new();
        source.gate = Some(rx);
        (source, tx)
    }

    pub fn failing_listen(mut self, event: &'static str) -> Self {
        self.fail_listen_for = Some(event);
        self
    }

    pub fn failing_unlisten(mut self, event: &'static str) -> Self {
        self.fail_unlisten_for = Some(event);
        self
    }

    pub fn unlisten_calls(&self, event: &str) -> usize {
        self.unlistens
            .lock()
            .expect("unlisten counts")
            .get(event)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventSource for RecordingSource {
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<Unlisten> {
        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            gate.wait_for(|open| *open)
                .await
                .map_err(|_| anyhow!("gate closed"))?;
        }
        if self.fail_listen_for == Some(event) {
            return Err(anyhow!("host refused {event} listener"));
        }

        let inner = self.bus.listen(event, handler).await?;
        let counts = Arc::clone(&self.unlistens);
        let event = event.to_string();
        let fail = self.fail_unlisten_for == Some(event.as_str());
        Ok(Box::new(move || {
            *counts
                .lock()
                .expect("unlisten counts")
                .entry(event.clone())
                .or_default() += 1;
            inner()?;
            if fail {
                return Err(anyhow!("host failed to unlisten {event}"));
            }
            Ok(())
        }))
    }
}

/// Yields to the runtime until `done` holds or the attempts run out.
pub async fn settle(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    done()
}
