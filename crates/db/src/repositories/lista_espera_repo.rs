//! Repository for the `lista_espera` table.

use navalha_core::types::DbId;
use sqlx::PgPool;

use crate::models::lista_espera::{CriarEntradaListaEspera, EntradaListaEspera};
use crate::models::status::{ListaEsperaStatus, PrioridadeListaEspera};

/// Column list for `lista_espera` queries.
const COLUMNS: &str = "\
    id, unidade_id, profissional_id, servico_id, cliente_nome, cliente_telefone, \
    cliente_email, data_hora_preferida, prioridade, status_id, observacoes, \
    created_at, updated_at";

/// CRUD and promotion bookkeeping for waitlist entries.
pub struct ListaEsperaRepo;

impl ListaEsperaRepo {
    /// Create an `aguardando` entry.
    pub async fn criar(
        pool: &PgPool,
        input: &CriarEntradaListaEspera,
    ) -> Result<EntradaListaEspera, sqlx::Error> {
        let query = format!(
            "INSERT INTO lista_espera \
             (unidade_id, profissional_id, servico_id, cliente_nome, cliente_telefone, \
              cliente_email, data_hora_preferida, prioridade, status_id, observacoes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntradaListaEspera>(&query)
            .bind(input.unidade_id)
            .bind(input.profissional_id)
            .bind(input.servico_id)
            .bind(&input.cliente_nome)
            .bind(&input.cliente_telefone)
            .bind(&input.cliente_email)
            .bind(input.data_hora_preferida)
            .bind(
                input
                    .prioridade
                    .unwrap_or(PrioridadeListaEspera::Media.id()),
            )
            .bind(ListaEsperaStatus::Aguardando.id())
            .bind(&input.observacoes)
            .fetch_one(pool)
            .await
    }

    /// Find an entry by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EntradaListaEspera>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lista_espera WHERE id = $1");
        sqlx::query_as::<_, EntradaListaEspera>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a unit's waiting entries, highest priority first, FIFO inside
    /// a tier.
    pub async fn listar_aguardando(
        pool: &PgPool,
        unidade_id: DbId,
    ) -> Result<Vec<EntradaListaEspera>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lista_espera \
             WHERE unidade_id = $1 AND status_id = $2 \
             ORDER BY prioridade DESC, created_at"
        );
        sqlx::query_as::<_, EntradaListaEspera>(&query)
            .bind(unidade_id)
            .bind(ListaEsperaStatus::Aguardando.id())
            .fetch_all(pool)
            .await
    }

    /// CAS an entry from `aguardando` to `agendado` after a successful
    /// promotion.
    ///
    /// Returns `false` when the entry was no longer `aguardando` — promotion
    /// raced with another state change and the caller must not proceed as if
    /// it owned the entry.
    pub async fn marcar_agendada(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lista_espera \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ListaEsperaStatus::Agendado.id())
        .bind(ListaEsperaStatus::Aguardando.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
