//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`BookingEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use navalha_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

/// Dot-separated event names, one per appointment transition.
pub mod tipos {
    pub const AGENDAMENTO_CRIADO: &str = "agendamento.criado";
    pub const AGENDAMENTO_CONFIRMADO: &str = "agendamento.confirmado";
    pub const AGENDAMENTO_REAGENDADO: &str = "agendamento.reagendado";
    pub const AGENDAMENTO_CANCELADO: &str = "agendamento.cancelado";
    pub const AGENDAMENTO_CONCLUIDO: &str = "agendamento.concluido";
}

// ---------------------------------------------------------------------------
// BookingEvent
// ---------------------------------------------------------------------------

/// A booking event emitted after a committed appointment transition.
///
/// Constructed via [`BookingEvent::new`] and enriched with
/// [`with_payload`](BookingEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Dot-separated event name from [`tipos`].
    pub event_type: String,

    /// The appointment the transition happened on.
    pub agendamento_id: DbId,

    /// The owning tenant unit.
    pub unidade_id: DbId,

    /// Free-form JSON payload carrying template context for delivery
    /// (client name, service, old/new times, ...).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BookingEvent {
    /// Create a new event for an appointment transition.
    pub fn new(event_type: impl Into<String>, agendamento_id: DbId, unidade_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            agendamento_id,
            unidade_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`BookingEvent`].
pub struct EventBus {
    sender: broadcast::Sender<BookingEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// publishing never blocks or fails the transition that produced it.
    pub fn publish(&self, event: BookingEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
