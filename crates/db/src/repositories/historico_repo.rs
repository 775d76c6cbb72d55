//! Repository for the `historico_agendamentos` table.
//!
//! History is append-only: there is no update or delete here, and every
//! state transition writes its row inside the same transaction that commits
//! the new state.

use navalha_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::historico::{HistoricoAgendamento, NovoHistorico};

/// Column list for `historico_agendamentos` queries.
const COLUMNS: &str = "\
    id, agendamento_id, acao, data_hora_anterior, data_hora_nova, \
    status_anterior, status_novo, motivo, autor, created_at";

/// Append and list operations for the audit history.
pub struct HistoricoRepo;

impl HistoricoRepo {
    /// Append one history row.
    ///
    /// Takes any executor so transition code can write inside its own
    /// transaction while the notification dispatcher writes via the pool.
    pub async fn registrar<'e, E>(
        executor: E,
        agendamento_id: DbId,
        entrada: &NovoHistorico<'_>,
    ) -> Result<DbId, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "INSERT INTO historico_agendamentos \
             (agendamento_id, acao, data_hora_anterior, data_hora_nova, \
              status_anterior, status_novo, motivo, autor) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(agendamento_id)
        .bind(entrada.acao)
        .bind(entrada.data_hora_anterior)
        .bind(entrada.data_hora_nova)
        .bind(entrada.status_anterior)
        .bind(entrada.status_novo)
        .bind(entrada.motivo)
        .bind(entrada.autor)
        .fetch_one(executor)
        .await
    }

    /// List an appointment's history, oldest first.
    pub async fn listar_por_agendamento(
        pool: &PgPool,
        agendamento_id: DbId,
    ) -> Result<Vec<HistoricoAgendamento>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM historico_agendamentos \
             WHERE agendamento_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, HistoricoAgendamento>(&query)
            .bind(agendamento_id)
            .fetch_all(pool)
            .await
    }
}
