//! Navalha event bus and notification delivery infrastructure.
//!
//! This crate provides the building blocks for fire-and-forget booking
//! notifications:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BookingEvent`] — the canonical booking event envelope, published
//!   after every committed appointment transition.
//! - [`delivery`] — external delivery channels (WhatsApp gateway, email).
//!
//! Dispatch is decoupled from the transaction that commits a transition:
//! publishing never blocks, and delivery failures are settled into the
//! notification log by the dispatcher, never propagated to the caller.

pub mod bus;
pub mod delivery;

pub use bus::{BookingEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};
