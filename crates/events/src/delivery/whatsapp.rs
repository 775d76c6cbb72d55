//! WhatsApp message delivery via an HTTP gateway.
//!
//! [`WhatsAppDelivery`] posts `(destinatario, mensagem, contexto)` to the
//! configured gateway URL and returns the gateway's immediate accept/reject
//! response body. Actual delivery status arrives asynchronously on the
//! provider side; this crate only records the synchronous outcome.
//! Configuration is loaded from environment variables; if `WHATSAPP_API_URL`
//! is not set, [`WhatsAppConfig::from_env`] returns `None` and the channel
//! is skipped.

use std::time::Duration;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for WhatsApp delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WhatsAppError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway rejected the message with a non-2xx status code.
    #[error("WhatsApp gateway returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// WhatsAppConfig
// ---------------------------------------------------------------------------

/// Configuration for the WhatsApp HTTP gateway.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Gateway endpoint that accepts message POSTs.
    pub api_url: String,
    /// Optional bearer token sent on every request.
    pub api_token: Option<String>,
}

impl WhatsAppConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `WHATSAPP_API_URL` is not set, signalling that the
    /// WhatsApp channel is not configured and should be skipped.
    ///
    /// | Variable            | Required |
    /// |---------------------|----------|
    /// | `WHATSAPP_API_URL`  | yes      |
    /// | `WHATSAPP_API_TOKEN`| no       |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("WHATSAPP_API_URL").ok()?;
        Some(Self {
            api_url,
            api_token: std::env::var("WHATSAPP_API_TOKEN").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// WhatsAppDelivery
// ---------------------------------------------------------------------------

/// Sends booking notification messages through the WhatsApp gateway.
pub struct WhatsAppDelivery {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppDelivery {
    /// Create a new delivery service with the given configuration.
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Send one message. Returns the gateway's raw response body, which the
    /// caller records in the notification log.
    pub async fn deliver(
        &self,
        destinatario: &str,
        mensagem: &str,
        contexto: &serde_json::Value,
    ) -> Result<String, WhatsAppError> {
        let payload = serde_json::json!({
            "to": destinatario,
            "message": mensagem,
            "context": contexto,
        });

        let mut request = self.client.post(&self.config.api_url).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(WhatsAppError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = destinatario, "WhatsApp message accepted by gateway");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
