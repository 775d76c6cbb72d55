//! Repository for the `servicos` table.

use navalha_core::types::DbId;
use sqlx::PgPool;

use crate::models::servico::{CriarServico, Servico};

/// Column list for `servicos` queries.
const COLUMNS: &str =
    "id, unidade_id, nome, duracao_minutos, preco_centavos, ativo, created_at, updated_at";

/// CRUD for the service catalogue.
pub struct ServicoRepo;

impl ServicoRepo {
    /// Create a service in a unit.
    pub async fn criar(
        pool: &PgPool,
        unidade_id: DbId,
        input: &CriarServico,
    ) -> Result<Servico, sqlx::Error> {
        let query = format!(
            "INSERT INTO servicos (unidade_id, nome, duracao_minutos, preco_centavos) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Servico>(&query)
            .bind(unidade_id)
            .bind(&input.nome)
            .bind(input.duracao_minutos)
            .bind(input.preco_centavos)
            .fetch_one(pool)
            .await
    }

    /// Find a service by ID *within* a unit (tenancy guard).
    pub async fn find_na_unidade(
        pool: &PgPool,
        id: DbId,
        unidade_id: DbId,
    ) -> Result<Option<Servico>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM servicos WHERE id = $1 AND unidade_id = $2");
        sqlx::query_as::<_, Servico>(&query)
            .bind(id)
            .bind(unidade_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a service by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Servico>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM servicos WHERE id = $1");
        sqlx::query_as::<_, Servico>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a unit's active services, ordered by name.
    pub async fn listar_ativos(pool: &PgPool, unidade_id: DbId) -> Result<Vec<Servico>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM servicos \
             WHERE unidade_id = $1 AND ativo = TRUE \
             ORDER BY nome"
        );
        sqlx::query_as::<_, Servico>(&query)
            .bind(unidade_id)
            .fetch_all(pool)
            .await
    }
}
