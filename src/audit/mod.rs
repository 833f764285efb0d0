//! Audit sinks
//!
//! The gate records every decision through [`AuditSink`]. Delivery is
//! best-effort and never blocks the caller; a sink that cannot accept an
//! event drops it and the gate neither notices nor cares.

use crate::domain::{AuditCategory, AuditEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fire-and-forget decision record contract.
///
/// `record` must return without blocking; ordering of accepted events is
/// not guaranteed.
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink: Send + Sync {
    fn record(
        &self,
        category: AuditCategory,
        tenant_id: Option<String>,
        message: String,
        metadata: HashMap<String, String>,
    );
}

/// Audit sink backed by a bounded channel drained by a background worker.
///
/// A full queue drops the event and bumps a counter instead of blocking
/// or failing the caller. The worker exits once every sink clone has been
/// dropped; awaiting the returned handle flushes what was accepted.
#[derive(Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::Sender<AuditEvent>,
    dropped: Arc<AtomicU64>,
}

impl ChannelAuditSink {
    /// Spawn a worker that writes accepted events as structured log lines.
    pub fn new(capacity: usize) -> (Self, JoinHandle<()>) {
        Self::spawn_with_writer(capacity, log_event)
    }

    /// Spawn a worker that hands each accepted event to `writer`.
    pub fn spawn_with_writer<F>(capacity: usize, writer: F) -> (Self, JoinHandle<()>)
    where
        F: Fn(AuditEvent) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                writer(event);
            }
        });
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            handle,
        )
    }

    /// How many events have been dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(
        &self,
        category: AuditCategory,
        tenant_id: Option<String>,
        message: String,
        metadata: HashMap<String, String>,
    ) {
        let event = AuditEvent::new(category, tenant_id, message, metadata);
        if let Err(err) = self.tx.try_send(event) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Dropped audit event: {}", err);
        }
    }
}

fn log_event(event: AuditEvent) {
    tracing::info!(
        target: "audit",
        category = %event.category,
        tenant_id = event.tenant_id.as_deref().unwrap_or("-"),
        metadata = %serde_json::to_string(&event.metadata).unwrap_or_default(),
        "{}",
        event.message
    );
}

/// In-memory audit sink, mainly for tests and local inspection.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit event lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("audit event lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(
        &self,
        category: AuditCategory,
        tenant_id: Option<String>,
        message: String,
        metadata: HashMap<String, String>,
    ) {
        let event = AuditEvent::new(category, tenant_id, message, metadata);
        self.events
            .lock()
            .expect("audit event lock poisoned")
            .push(event);
    }
}
