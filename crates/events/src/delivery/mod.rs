//! External delivery channels for booking notifications.
//!
//! Each channel takes a recipient and a rendered message and returns the
//! raw provider response (recorded verbatim in `logs_notificacao`). No
//! retry lives here; failed attempts are settled as `falha` and left for
//! the external retry process.

pub mod email;
pub mod whatsapp;
