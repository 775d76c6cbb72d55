//! Repository for the `profissionais` table.

use navalha_core::types::DbId;
use sqlx::PgPool;

use crate::models::profissional::{CriarProfissional, Profissional};

/// Column list for `profissionais` queries.
const COLUMNS: &str = "id, unidade_id, nome, ativo, created_at, updated_at";

/// CRUD for professionals.
pub struct ProfissionalRepo;

impl ProfissionalRepo {
    /// Create a professional in a unit.
    pub async fn criar(
        pool: &PgPool,
        unidade_id: DbId,
        input: &CriarProfissional,
    ) -> Result<Profissional, sqlx::Error> {
        let query = format!(
            "INSERT INTO profissionais (unidade_id, nome) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profissional>(&query)
            .bind(unidade_id)
            .bind(&input.nome)
            .fetch_one(pool)
            .await
    }

    /// Find a professional by ID *within* a unit.
    ///
    /// Tenancy guard for the public flow: a professional from another unit
    /// resolves to `None`.
    pub async fn find_na_unidade(
        pool: &PgPool,
        id: DbId,
        unidade_id: DbId,
    ) -> Result<Option<Profissional>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profissionais WHERE id = $1 AND unidade_id = $2");
        sqlx::query_as::<_, Profissional>(&query)
            .bind(id)
            .bind(unidade_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a professional by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profissional>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profissionais WHERE id = $1");
        sqlx::query_as::<_, Profissional>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a unit's active professionals, ordered by name.
    pub async fn listar_ativos(
        pool: &PgPool,
        unidade_id: DbId,
    ) -> Result<Vec<Profissional>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profissionais \
             WHERE unidade_id = $1 AND ativo = TRUE \
             ORDER BY nome"
        );
        sqlx::query_as::<_, Profissional>(&query)
            .bind(unidade_id)
            .fetch_all(pool)
            .await
    }
}
