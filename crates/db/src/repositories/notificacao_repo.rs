//! Repository for the `logs_notificacao` table.
//!
//! One row per dispatch attempt. The dispatcher creates the row as
//! `pendente`, then settles it to `enviado` or `falha` with the raw
//! provider response. Retry/backoff is an external process's concern;
//! this table only keeps the accounting.

use navalha_core::types::DbId;
use sqlx::PgPool;

use crate::models::notificacao::LogNotificacao;
use crate::models::status::EntregaStatus;

/// Column list for `logs_notificacao` queries.
const COLUMNS: &str = "\
    id, agendamento_id, canal, destinatario, status_id, tentativas, \
    resposta_provedor, created_at, updated_at";

/// Dispatch-attempt accounting for notifications.
pub struct NotificacaoRepo;

impl NotificacaoRepo {
    /// Register a dispatch attempt as `pendente`.
    pub async fn registrar(
        pool: &PgPool,
        agendamento_id: DbId,
        canal: &str,
        destinatario: &str,
    ) -> Result<LogNotificacao, sqlx::Error> {
        let query = format!(
            "INSERT INTO logs_notificacao (agendamento_id, canal, destinatario, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LogNotificacao>(&query)
            .bind(agendamento_id)
            .bind(canal)
            .bind(destinatario)
            .bind(EntregaStatus::Pendente.id())
            .fetch_one(pool)
            .await
    }

    /// Settle an attempt as delivered, bumping the attempt counter.
    pub async fn marcar_enviado(
        pool: &PgPool,
        id: DbId,
        resposta_provedor: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        Self::marcar(pool, id, EntregaStatus::Enviado, resposta_provedor).await
    }

    /// Settle an attempt as failed, bumping the attempt counter.
    ///
    /// Delivery failure never propagates to the transition that triggered
    /// the notification; this row is all that remains of it.
    pub async fn marcar_falha(
        pool: &PgPool,
        id: DbId,
        resposta_provedor: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        Self::marcar(pool, id, EntregaStatus::Falha, resposta_provedor).await
    }

    async fn marcar(
        pool: &PgPool,
        id: DbId,
        status: EntregaStatus,
        resposta_provedor: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE logs_notificacao \
             SET status_id = $2, tentativas = tentativas + 1, \
                 resposta_provedor = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .bind(resposta_provedor)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List an appointment's dispatch attempts, oldest first.
    pub async fn listar_por_agendamento(
        pool: &PgPool,
        agendamento_id: DbId,
    ) -> Result<Vec<LogNotificacao>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM logs_notificacao \
             WHERE agendamento_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, LogNotificacao>(&query)
            .bind(agendamento_id)
            .fetch_all(pool)
            .await
    }
}
