//! Repository for the `unidades`, `configuracoes_unidade` and
//! `horarios_funcionamento` tables.

use navalha_core::types::DbId;
use sqlx::PgPool;

use crate::models::unidade::{
    ConfiguracaoUnidade, CriarConfiguracaoUnidade, CriarHorario, CriarUnidade,
    HorarioFuncionamento, Unidade,
};

/// Column list for `unidades` queries.
const COLUMNS: &str = "id, nome, slug, ativo, created_at, updated_at";

/// Column list for `configuracoes_unidade` queries.
const CONFIG_COLUMNS: &str = "\
    id, unidade_id, antecedencia_minima_horas, max_reagendamentos, \
    permite_cancelamento, horario_limite_cancelamento, agendamento_publico_ativo, \
    duracao_slot_minutos, nome_publico, mensagem_boas_vindas, created_at, updated_at";

/// Column list for `horarios_funcionamento` queries.
const HORARIO_COLUMNS: &str = "id, unidade_id, dia_semana, abertura, fechamento, created_at";

/// CRUD for units and their policy configuration.
pub struct UnidadeRepo;

impl UnidadeRepo {
    /// Create a unit together with its (default-valued) configuration row.
    ///
    /// The configuration is created in the same transaction so the
    /// one-config-per-unit invariant holds from the first moment.
    pub async fn criar(
        pool: &PgPool,
        input: &CriarUnidade,
        config: &CriarConfiguracaoUnidade,
    ) -> Result<Unidade, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO unidades (nome, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let unidade = sqlx::query_as::<_, Unidade>(&query)
            .bind(&input.nome)
            .bind(&input.slug)
            .fetch_one(&mut *tx)
            .await?;

        let config_query = format!(
            "INSERT INTO configuracoes_unidade \
             (unidade_id, antecedencia_minima_horas, max_reagendamentos, \
              permite_cancelamento, horario_limite_cancelamento, \
              agendamento_publico_ativo, duracao_slot_minutos, nome_publico, \
              mensagem_boas_vindas) \
             VALUES ($1, COALESCE($2, 24), COALESCE($3, 2), COALESCE($4, TRUE), \
                     COALESCE($5, 2), COALESCE($6, TRUE), COALESCE($7, 30), $8, $9) \
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, ConfiguracaoUnidade>(&config_query)
            .bind(unidade.id)
            .bind(config.antecedencia_minima_horas)
            .bind(config.max_reagendamentos)
            .bind(config.permite_cancelamento)
            .bind(config.horario_limite_cancelamento)
            .bind(config.agendamento_publico_ativo)
            .bind(config.duracao_slot_minutos)
            .bind(&config.nome_publico)
            .bind(&config.mensagem_boas_vindas)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(unidade)
    }

    /// Find a unit by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Unidade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM unidades WHERE id = $1");
        sqlx::query_as::<_, Unidade>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active unit by its public slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Unidade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM unidades WHERE slug = $1 AND ativo = TRUE");
        sqlx::query_as::<_, Unidade>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a unit's configuration. Exactly one row exists per unit.
    pub async fn get_config(
        pool: &PgPool,
        unidade_id: DbId,
    ) -> Result<Option<ConfiguracaoUnidade>, sqlx::Error> {
        let query =
            format!("SELECT {CONFIG_COLUMNS} FROM configuracoes_unidade WHERE unidade_id = $1");
        sqlx::query_as::<_, ConfiguracaoUnidade>(&query)
            .bind(unidade_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a unit's configuration, keeping unspecified fields.
    pub async fn atualizar_config(
        pool: &PgPool,
        unidade_id: DbId,
        input: &CriarConfiguracaoUnidade,
    ) -> Result<Option<ConfiguracaoUnidade>, sqlx::Error> {
        let query = format!(
            "UPDATE configuracoes_unidade SET \
             antecedencia_minima_horas = COALESCE($2, antecedencia_minima_horas), \
             max_reagendamentos = COALESCE($3, max_reagendamentos), \
             permite_cancelamento = COALESCE($4, permite_cancelamento), \
             horario_limite_cancelamento = COALESCE($5, horario_limite_cancelamento), \
             agendamento_publico_ativo = COALESCE($6, agendamento_publico_ativo), \
             duracao_slot_minutos = COALESCE($7, duracao_slot_minutos), \
             nome_publico = COALESCE($8, nome_publico), \
             mensagem_boas_vindas = COALESCE($9, mensagem_boas_vindas), \
             updated_at = NOW() \
             WHERE unidade_id = $1 \
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, ConfiguracaoUnidade>(&query)
            .bind(unidade_id)
            .bind(input.antecedencia_minima_horas)
            .bind(input.max_reagendamentos)
            .bind(input.permite_cancelamento)
            .bind(input.horario_limite_cancelamento)
            .bind(input.agendamento_publico_ativo)
            .bind(input.duracao_slot_minutos)
            .bind(&input.nome_publico)
            .bind(&input.mensagem_boas_vindas)
            .fetch_optional(pool)
            .await
    }

    /// Set (or replace) one weekday's operating window.
    pub async fn definir_horario(
        pool: &PgPool,
        unidade_id: DbId,
        input: &CriarHorario,
    ) -> Result<HorarioFuncionamento, sqlx::Error> {
        let query = format!(
            "INSERT INTO horarios_funcionamento (unidade_id, dia_semana, abertura, fechamento) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_horarios_funcionamento_dia \
             DO UPDATE SET abertura = EXCLUDED.abertura, fechamento = EXCLUDED.fechamento \
             RETURNING {HORARIO_COLUMNS}"
        );
        sqlx::query_as::<_, HorarioFuncionamento>(&query)
            .bind(unidade_id)
            .bind(input.dia_semana)
            .bind(input.abertura)
            .bind(input.fechamento)
            .fetch_one(pool)
            .await
    }

    /// Operating window for one weekday, if the unit opens that day.
    pub async fn horario_do_dia(
        pool: &PgPool,
        unidade_id: DbId,
        dia_semana: i16,
    ) -> Result<Option<HorarioFuncionamento>, sqlx::Error> {
        let query = format!(
            "SELECT {HORARIO_COLUMNS} FROM horarios_funcionamento \
             WHERE unidade_id = $1 AND dia_semana = $2"
        );
        sqlx::query_as::<_, HorarioFuncionamento>(&query)
            .bind(unidade_id)
            .bind(dia_semana)
            .fetch_optional(pool)
            .await
    }
}
