//! Notification dispatch log models.

use navalha_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `logs_notificacao` table: one per dispatch attempt.
///
/// Used for retry accounting by an external process; never consulted by
/// the booking guards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogNotificacao {
    pub id: DbId,
    pub agendamento_id: DbId,
    pub canal: String,
    pub destinatario: String,
    pub status_id: StatusId,
    pub tentativas: i32,
    pub resposta_provedor: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
