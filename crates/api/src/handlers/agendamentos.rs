//! Handlers for staff appointment management.
//!
//! The staff verbs drive the same state machine as the public flow: every
//! mutation re-validates the core guards against a fresh snapshot, and the
//! repository's conditional update surfaces lost races as `Conflict`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use navalha_core::booking::{pode_concluir, state_machine};
use navalha_core::error::CoreError;
use navalha_core::origem::ORIGEM_ADMIN;
use navalha_core::token_access::{motivo_cancelamento, motivo_reagendamento, MotivoBloqueio};
use navalha_core::types::{DbId, Timestamp};
use navalha_db::models::agendamento::{Agendamento, AgendamentoListQuery, CriarAgendamento};
use navalha_db::models::status::AgendamentoStatus;
use navalha_db::repositories::{
    AgendamentoRepo, HistoricoRepo, NotificacaoRepo, ProfissionalRepo, ResultadoCriacao,
    ResultadoReagendamento, ServicoRepo, UnidadeRepo,
};
use navalha_events::bus::tipos;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::comum;
use crate::response::DataResponse;
use crate::state::AppState;

/// Actor recorded on staff-originated history rows.
const AUTOR_EQUIPE: &str = "equipe";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /agendamentos/{id}/reagendar`.
#[derive(Debug, Deserialize)]
pub struct ReagendarBody {
    pub nova_data_hora: Timestamp,
}

/// Body for `POST /agendamentos/{id}/cancelar`.
#[derive(Debug, Deserialize)]
pub struct CancelarBody {
    pub motivo: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn carregar(state: &AppState, id: DbId) -> AppResult<Agendamento> {
    AgendamentoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agendamento",
            id,
        }))
}

/// Map an invalid state-machine transition to the API error taxonomy:
/// terminal source states are `Forbidden`, anything else is a validation
/// problem in the request.
fn erro_transicao(de: i16, para: i16) -> AppError {
    if state_machine::is_terminal(de) {
        AppError::Core(CoreError::Forbidden(MotivoBloqueio::StatusTerminal))
    } else {
        let msg = state_machine::validate_transition(de, para)
            .expect_err("caller only maps invalid transitions");
        AppError::Core(CoreError::Validation(msg))
    }
}

const CONFLITO_CONCORRENTE: &str = "agendamento foi alterado por outra operação";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/unidades/{unidade_id}/agendamentos
///
/// Staff create with origin `admin`. Same creation path as the public flow,
/// including the commit-time slot re-check.
pub async fn criar(
    State(state): State<AppState>,
    Path(unidade_id): Path<DbId>,
    Json(input): Json<CriarAgendamento>,
) -> AppResult<(StatusCode, Json<DataResponse<Agendamento>>)> {
    input.validate()?;
    let now = Utc::now();

    let Some(unidade) = UnidadeRepo::find_by_id(&state.pool, unidade_id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Unidade",
            id: unidade_id,
        }));
    };
    let config = comum::config_da_unidade(&state.pool, unidade.id).await?;

    let Some(_profissional) =
        ProfissionalRepo::find_na_unidade(&state.pool, input.profissional_id, unidade.id).await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Profissional",
            id: input.profissional_id,
        }));
    };
    let Some(servico) =
        ServicoRepo::find_na_unidade(&state.pool, input.servico_id, unidade.id).await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Servico",
            id: input.servico_id,
        }));
    };

    comum::validar_janela(&state.pool, &config, input.data_hora, servico.duracao_minutos, now)
        .await?;

    let resultado = AgendamentoRepo::criar(
        &state.pool,
        unidade.id,
        &input,
        &servico,
        ORIGEM_ADMIN,
        Some(AUTOR_EQUIPE),
    )
    .await?;

    let agendamento = match resultado {
        ResultadoCriacao::Criado(agendamento) => agendamento,
        ResultadoCriacao::SlotOcupado => {
            return Err(AppError::Core(CoreError::Conflict(
                "horário não está mais disponível".to_string(),
            )));
        }
    };

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CRIADO, &agendamento, None);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: agendamento }),
    ))
}

/// GET /api/v1/unidades/{unidade_id}/agendamentos
///
/// Ordered range listing for the dashboard agenda.
pub async fn listar(
    State(state): State<AppState>,
    Path(unidade_id): Path<DbId>,
    Query(params): Query<AgendamentoListQuery>,
) -> AppResult<Json<DataResponse<Vec<Agendamento>>>> {
    let agendamentos =
        AgendamentoRepo::listar_por_unidade(&state.pool, unidade_id, &params).await?;
    Ok(Json(DataResponse { data: agendamentos }))
}

/// POST /api/v1/agendamentos/{id}/confirmar
pub async fn confirmar(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Agendamento>>> {
    let atual = carregar(&state, id).await?;

    let para = AgendamentoStatus::Confirmado.id();
    if !state_machine::can_transition(atual.status_id, para) {
        return Err(erro_transicao(atual.status_id, para));
    }

    let Some(agendamento) =
        AgendamentoRepo::confirmar(&state.pool, &atual, Some(AUTOR_EQUIPE)).await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            CONFLITO_CONCORRENTE.to_string(),
        )));
    };

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CONFIRMADO, &agendamento, None);

    Ok(Json(DataResponse { data: agendamento }))
}

/// POST /api/v1/agendamentos/{id}/reagendar
///
/// Staff reschedules run the same lead-time and budget guards as the
/// self-service flow; the unit policy is the single source of truth.
pub async fn reagendar(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ReagendarBody>,
) -> AppResult<Json<DataResponse<Agendamento>>> {
    let atual = carregar(&state, id).await?;
    let config = comum::config_da_unidade(&state.pool, atual.unidade_id).await?;
    let now = Utc::now();

    if let Some(motivo) = motivo_reagendamento(
        atual.status_id,
        atual.data_hora,
        now,
        &config.politica(),
        atual.reagendamentos_count,
    ) {
        return Err(AppError::Core(CoreError::Forbidden(motivo)));
    }

    comum::validar_janela(&state.pool, &config, body.nova_data_hora, atual.duracao_minutos, now)
        .await?;

    let resultado =
        AgendamentoRepo::reagendar(&state.pool, &atual, body.nova_data_hora, Some(AUTOR_EQUIPE))
            .await?;

    let agendamento = match resultado {
        ResultadoReagendamento::Reagendado(agendamento) => agendamento,
        ResultadoReagendamento::SlotOcupado => {
            return Err(AppError::Core(CoreError::Conflict(
                "novo horário não está disponível".to_string(),
            )));
        }
        ResultadoReagendamento::Conflito => {
            return Err(AppError::Core(CoreError::Conflict(
                CONFLITO_CONCORRENTE.to_string(),
            )));
        }
    };

    comum::publicar_evento(
        &state,
        tipos::AGENDAMENTO_REAGENDADO,
        &agendamento,
        Some(atual.data_hora),
    );

    Ok(Json(DataResponse { data: agendamento }))
}

/// POST /api/v1/agendamentos/{id}/cancelar
pub async fn cancelar(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<CancelarBody>,
) -> AppResult<Json<DataResponse<Agendamento>>> {
    let atual = carregar(&state, id).await?;
    let config = comum::config_da_unidade(&state.pool, atual.unidade_id).await?;
    let now = Utc::now();

    if let Some(motivo) =
        motivo_cancelamento(atual.status_id, atual.data_hora, now, &config.politica())
    {
        return Err(AppError::Core(CoreError::Forbidden(motivo)));
    }

    let Some(agendamento) =
        AgendamentoRepo::cancelar(&state.pool, &atual, body.motivo.as_deref(), Some(AUTOR_EQUIPE))
            .await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            CONFLITO_CONCORRENTE.to_string(),
        )));
    };

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CANCELADO, &agendamento, None);

    Ok(Json(DataResponse { data: agendamento }))
}

/// POST /api/v1/agendamentos/{id}/concluir
///
/// Allowed only from `confirmado` and only once the start time has passed.
pub async fn concluir(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Agendamento>>> {
    let atual = carregar(&state, id).await?;
    let now = Utc::now();

    let para = AgendamentoStatus::Concluido.id();
    if !state_machine::can_transition(atual.status_id, para) {
        return Err(erro_transicao(atual.status_id, para));
    }
    if !pode_concluir(atual.data_hora, now) {
        return Err(AppError::Core(CoreError::Forbidden(
            MotivoBloqueio::AindaNaoIniciado,
        )));
    }

    let Some(agendamento) =
        AgendamentoRepo::concluir(&state.pool, &atual, Some(AUTOR_EQUIPE)).await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            CONFLITO_CONCORRENTE.to_string(),
        )));
    };

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CONCLUIDO, &agendamento, None);

    Ok(Json(DataResponse { data: agendamento }))
}

/// GET /api/v1/agendamentos/{id}/historico
pub async fn historico(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    carregar(&state, id).await?;
    let entradas = HistoricoRepo::listar_por_agendamento(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "data": entradas })))
}

/// GET /api/v1/agendamentos/{id}/notificacoes
pub async fn notificacoes(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    carregar(&state, id).await?;
    let logs = NotificacaoRepo::listar_por_agendamento(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "data": logs })))
}
