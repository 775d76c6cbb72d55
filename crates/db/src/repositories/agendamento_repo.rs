//! Repository for the `agendamentos` table.
//!
//! All lifecycle transitions are compare-and-swap updates conditioned on the
//! status (and, for reschedules, the budget counter) the caller observed.
//! Zero affected rows means another transition won the race; callers surface
//! that as a conflict instead of silently no-op-ing. Slot availability is
//! re-checked inside the same transaction that writes the new state, behind
//! a per-professional row lock, so two clients cannot commit overlapping
//! appointments.

use navalha_core::booking::state_machine;
use navalha_core::historico::{
    ACAO_CANCELADO, ACAO_CONCLUIDO, ACAO_CONFIRMADO, ACAO_CRIADO, ACAO_REAGENDADO,
};
use navalha_core::token::gerar_token;
use navalha_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::agendamento::{Agendamento, AgendamentoListQuery, CriarAgendamento};
use crate::models::historico::NovoHistorico;
use crate::models::servico::Servico;
use crate::models::status::AgendamentoStatus;
use crate::repositories::historico_repo::HistoricoRepo;

/// Column list for `agendamentos` queries.
const COLUMNS: &str = "\
    id, unidade_id, profissional_id, servico_id, \
    cliente_nome, cliente_telefone, cliente_email, \
    data_hora, duracao_minutos, preco_centavos, status_id, observacoes, \
    token, reagendamentos_count, origem, created_at, updated_at";

/// Maximum page size for appointment listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for appointment listing.
const DEFAULT_LIMIT: i64 = 50;

/// Outcome of an appointment creation attempt.
#[derive(Debug)]
pub enum ResultadoCriacao {
    Criado(Agendamento),
    /// The requested interval overlaps a non-cancelled appointment.
    SlotOcupado,
}

/// Outcome of a reschedule attempt.
#[derive(Debug)]
pub enum ResultadoReagendamento {
    Reagendado(Agendamento),
    /// The target interval overlaps a non-cancelled appointment.
    SlotOcupado,
    /// The conditional update matched zero rows: a concurrent transition
    /// changed the status or consumed the budget first.
    Conflito,
}

/// CRUD and lifecycle transitions for appointments.
pub struct AgendamentoRepo;

impl AgendamentoRepo {
    /// Find an appointment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agendamento>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agendamentos WHERE id = $1");
        sqlx::query_as::<_, Agendamento>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an appointment by its self-service token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Agendamento>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agendamentos WHERE token = $1");
        sqlx::query_as::<_, Agendamento>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Ordered range query over a unit's appointments.
    pub async fn listar_por_unidade(
        pool: &PgPool,
        unidade_id: DbId,
        params: &AgendamentoListQuery,
    ) -> Result<Vec<Agendamento>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let query = format!(
            "SELECT {COLUMNS} FROM agendamentos \
             WHERE unidade_id = $1 \
               AND ($2::timestamptz IS NULL OR data_hora >= $2) \
               AND ($3::timestamptz IS NULL OR data_hora < $3) \
             ORDER BY data_hora \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Agendamento>(&query)
            .bind(unidade_id)
            .bind(params.de)
            .bind(params.ate)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// `[inicio, fim)` intervals of a professional's non-cancelled
    /// appointments inside `[de, ate)`, feeding the availability grid.
    pub async fn ocupados_no_periodo(
        pool: &PgPool,
        profissional_id: DbId,
        de: Timestamp,
        ate: Timestamp,
    ) -> Result<Vec<(Timestamp, Timestamp)>, sqlx::Error> {
        let linhas: Vec<(Timestamp, i32)> = sqlx::query_as(
            "SELECT data_hora, duracao_minutos FROM agendamentos \
             WHERE profissional_id = $1 AND status_id <> $2 \
               AND data_hora < $4 \
               AND data_hora + make_interval(mins => duracao_minutos) > $3 \
             ORDER BY data_hora",
        )
        .bind(profissional_id)
        .bind(AgendamentoStatus::Cancelado.id())
        .bind(de)
        .bind(ate)
        .fetch_all(pool)
        .await?;

        Ok(linhas
            .into_iter()
            .map(|(inicio, duracao)| (inicio, inicio + chrono::Duration::minutes(i64::from(duracao))))
            .collect())
    }

    /// Create a `pendente` appointment, re-checking slot availability inside
    /// the transaction that inserts the row.
    ///
    /// Duration and price are copied from `servico` at this moment and never
    /// track later catalogue edits. The generated self-service token is
    /// returned on the row.
    pub async fn criar(
        pool: &PgPool,
        unidade_id: DbId,
        input: &CriarAgendamento,
        servico: &Servico,
        origem: &str,
        autor: Option<&str>,
    ) -> Result<ResultadoCriacao, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if Self::intervalo_ocupado(
            &mut tx,
            input.profissional_id,
            input.data_hora,
            servico.duracao_minutos,
            None,
        )
        .await?
        {
            return Ok(ResultadoCriacao::SlotOcupado);
        }

        let query = format!(
            "INSERT INTO agendamentos \
             (unidade_id, profissional_id, servico_id, cliente_nome, cliente_telefone, \
              cliente_email, data_hora, duracao_minutos, preco_centavos, status_id, \
              observacoes, token, origem) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        let agendamento = sqlx::query_as::<_, Agendamento>(&query)
            .bind(unidade_id)
            .bind(input.profissional_id)
            .bind(input.servico_id)
            .bind(&input.cliente_nome)
            .bind(&input.cliente_telefone)
            .bind(&input.cliente_email)
            .bind(input.data_hora)
            .bind(servico.duracao_minutos)
            .bind(servico.preco_centavos)
            .bind(AgendamentoStatus::Pendente.id())
            .bind(&input.observacoes)
            .bind(gerar_token())
            .bind(origem)
            .fetch_one(&mut *tx)
            .await?;

        HistoricoRepo::registrar(
            &mut *tx,
            agendamento.id,
            &NovoHistorico {
                acao: ACAO_CRIADO,
                data_hora_nova: Some(agendamento.data_hora),
                status_novo: Some(agendamento.status_id),
                autor,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(ResultadoCriacao::Criado(agendamento))
    }

    /// Confirm a pending appointment (staff action).
    ///
    /// Returns `None` when the CAS matched zero rows — the appointment is no
    /// longer in the status the caller observed.
    pub async fn confirmar(
        pool: &PgPool,
        atual: &Agendamento,
        autor: Option<&str>,
    ) -> Result<Option<Agendamento>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE agendamentos \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let Some(agendamento) = sqlx::query_as::<_, Agendamento>(&query)
            .bind(atual.id)
            .bind(AgendamentoStatus::Confirmado.id())
            .bind(AgendamentoStatus::Pendente.id())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        HistoricoRepo::registrar(
            &mut *tx,
            agendamento.id,
            &NovoHistorico {
                acao: ACAO_CONFIRMADO,
                status_anterior: Some(AgendamentoStatus::Pendente.id()),
                status_novo: Some(agendamento.status_id),
                autor,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(agendamento))
    }

    /// Reschedule to `nova_data_hora`, consuming one unit of the budget.
    ///
    /// The CAS is conditioned on the status *and* counter the caller
    /// observed, so two concurrent reschedules can never both spend the same
    /// budget unit. The target slot is re-checked behind the professional
    /// row lock inside the same transaction.
    pub async fn reagendar(
        pool: &PgPool,
        atual: &Agendamento,
        nova_data_hora: Timestamp,
        autor: Option<&str>,
    ) -> Result<ResultadoReagendamento, sqlx::Error> {
        // The handler already validated the transition; this keeps the repo
        // safe against callers holding a terminal snapshot.
        if !state_machine::can_transition(atual.status_id, AgendamentoStatus::Pendente.id()) {
            return Ok(ResultadoReagendamento::Conflito);
        }

        let mut tx = pool.begin().await?;

        if Self::intervalo_ocupado(
            &mut tx,
            atual.profissional_id,
            nova_data_hora,
            atual.duracao_minutos,
            Some(atual.id),
        )
        .await?
        {
            return Ok(ResultadoReagendamento::SlotOcupado);
        }

        let query = format!(
            "UPDATE agendamentos \
             SET data_hora = $2, status_id = $3, \
                 reagendamentos_count = reagendamentos_count + 1, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 AND reagendamentos_count = $5 \
             RETURNING {COLUMNS}"
        );
        let Some(agendamento) = sqlx::query_as::<_, Agendamento>(&query)
            .bind(atual.id)
            .bind(nova_data_hora)
            .bind(AgendamentoStatus::Pendente.id())
            .bind(atual.status_id)
            .bind(atual.reagendamentos_count)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ResultadoReagendamento::Conflito);
        };

        HistoricoRepo::registrar(
            &mut *tx,
            agendamento.id,
            &NovoHistorico {
                acao: ACAO_REAGENDADO,
                data_hora_anterior: Some(atual.data_hora),
                data_hora_nova: Some(agendamento.data_hora),
                status_anterior: Some(atual.status_id),
                status_novo: Some(agendamento.status_id),
                autor,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(ResultadoReagendamento::Reagendado(agendamento))
    }

    /// Cancel a pending or confirmed appointment.
    ///
    /// Returns `None` when the CAS matched zero rows.
    pub async fn cancelar(
        pool: &PgPool,
        atual: &Agendamento,
        motivo: Option<&str>,
        autor: Option<&str>,
    ) -> Result<Option<Agendamento>, sqlx::Error> {
        if !state_machine::can_transition(atual.status_id, AgendamentoStatus::Cancelado.id()) {
            return Ok(None);
        }

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE agendamentos \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let Some(agendamento) = sqlx::query_as::<_, Agendamento>(&query)
            .bind(atual.id)
            .bind(AgendamentoStatus::Cancelado.id())
            .bind(atual.status_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        HistoricoRepo::registrar(
            &mut *tx,
            agendamento.id,
            &NovoHistorico {
                acao: ACAO_CANCELADO,
                status_anterior: Some(atual.status_id),
                status_novo: Some(agendamento.status_id),
                motivo,
                autor,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(agendamento))
    }

    /// Mark a confirmed appointment concluded (staff action).
    ///
    /// The time guard (`now >= data_hora`) is validated by the caller;
    /// here only the CAS on the confirmed status applies.
    pub async fn concluir(
        pool: &PgPool,
        atual: &Agendamento,
        autor: Option<&str>,
    ) -> Result<Option<Agendamento>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE agendamentos \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let Some(agendamento) = sqlx::query_as::<_, Agendamento>(&query)
            .bind(atual.id)
            .bind(AgendamentoStatus::Concluido.id())
            .bind(AgendamentoStatus::Confirmado.id())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        HistoricoRepo::registrar(
            &mut *tx,
            agendamento.id,
            &NovoHistorico {
                acao: ACAO_CONCLUIDO,
                status_anterior: Some(AgendamentoStatus::Confirmado.id()),
                status_novo: Some(agendamento.status_id),
                autor,
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(agendamento))
    }

    /// Overlap re-check behind a per-professional row lock.
    ///
    /// Locking the professional row serializes all bookings for that
    /// professional for the remainder of the transaction; unrelated
    /// professionals are unaffected.
    async fn intervalo_ocupado(
        tx: &mut Transaction<'_, Postgres>,
        profissional_id: DbId,
        inicio: Timestamp,
        duracao_minutos: i32,
        excluir: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query("SELECT id FROM profissionais WHERE id = $1 FOR UPDATE")
            .bind(profissional_id)
            .execute(&mut **tx)
            .await?;

        let fim = inicio + chrono::Duration::minutes(i64::from(duracao_minutos));
        let conflito: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM agendamentos \
             WHERE profissional_id = $1 AND status_id <> $2 \
               AND ($5::bigint IS NULL OR id <> $5) \
               AND data_hora < $4 \
               AND data_hora + make_interval(mins => duracao_minutos) > $3 \
             LIMIT 1",
        )
        .bind(profissional_id)
        .bind(AgendamentoStatus::Cancelado.id())
        .bind(inicio)
        .bind(fim)
        .bind(excluir)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(conflito.is_some())
    }
}
