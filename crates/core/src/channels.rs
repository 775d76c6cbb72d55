//! Well-known notification channel name constants.
//!
//! These must match the channel values stored in the `logs_notificacao.canal`
//! column and referenced by the notification dispatcher and API handlers.

/// WhatsApp message delivered through the configured HTTP gateway.
pub const CANAL_WHATSAPP: &str = "whatsapp";

/// Email notification delivered via SMTP.
pub const CANAL_EMAIL: &str = "email";

/// SMS message. No delivery backend is wired in yet; log rows with this
/// channel are picked up by the external retry process.
pub const CANAL_SMS: &str = "sms";
