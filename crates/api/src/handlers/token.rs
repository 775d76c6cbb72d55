//! Handlers for the token-based self-service flow.
//!
//! Possession of the opaque token is the only credential here. Resolution
//! recomputes both permission flags from a fresh snapshot and an explicit
//! `now` on every call; nothing is cached. The mutation handlers re-evaluate
//! the same guards before writing — the resolution-time flags are advisory,
//! the mutation-time check is authoritative, and a failed guard answers
//! `Forbidden`, never a silent no-op.
//!
//! Per the external contract, every resolution failure on this surface is a
//! 400 with `{ "error": ... }` — a missing token, an unknown token and a
//! broken join are deliberately indistinguishable.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use navalha_core::error::CoreError;
use navalha_core::token_access::{avaliar, motivo_cancelamento, motivo_reagendamento};
use navalha_core::types::Timestamp;
use navalha_db::models::agendamento::ResolucaoToken;
use navalha_db::models::status::AgendamentoStatus;
use navalha_db::repositories::{AgendamentoRepo, ResultadoReagendamento, TokenRepo};
use navalha_events::bus::tipos;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::comum;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /public/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

/// Body for `POST /public/token/reagendar`.
#[derive(Debug, Deserialize)]
pub struct ReagendarRequest {
    pub token: Option<String>,
    pub nova_data_hora: Timestamp,
}

/// Body for `POST /public/token/cancelar`.
#[derive(Debug, Deserialize)]
pub struct CancelarRequest {
    pub token: Option<String>,
    pub motivo: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Opaque 400 for any failure on the token surface.
fn token_invalido() -> AppError {
    AppError::BadRequest("token inválido".to_string())
}

async fn resolver_token(state: &AppState, token: Option<&str>) -> AppResult<ResolucaoToken> {
    let token = token.filter(|t| !t.is_empty()).ok_or_else(token_invalido)?;
    TokenRepo::resolve(&state.pool, token)
        .await?
        .ok_or_else(token_invalido)
}

/// POST /api/v1/public/token
///
/// Resolve a token to the appointment plus its joined context and the two
/// advisory self-service flags.
pub async fn resolver(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let resolucao = resolver_token(&state, req.token.as_deref()).await?;
    let now = Utc::now();

    let permissoes = avaliar(
        resolucao.agendamento.status_id,
        resolucao.agendamento.data_hora,
        now,
        &resolucao.config.politica(),
        resolucao.agendamento.reagendamentos_count,
    );

    let mut agendamento = serde_json::to_value(&resolucao.agendamento)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    agendamento["status"] = serde_json::json!(status_nome(resolucao.agendamento.status_id));
    agendamento["unidade"] = serde_json::to_value(&resolucao.unidade)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    agendamento["profissional"] = serde_json::to_value(&resolucao.profissional)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    agendamento["servico"] = serde_json::to_value(&resolucao.servico)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "agendamento": agendamento,
        "pode_reagendar": permissoes.pode_reagendar,
        "pode_cancelar": permissoes.pode_cancelar,
    })))
}

fn status_nome(status_id: i16) -> &'static str {
    navalha_core::booking::state_machine::status_name(status_id)
}

// ---------------------------------------------------------------------------
// Self-service mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/public/token/reagendar
///
/// Reschedule via token. The guard is re-evaluated here against a fresh
/// snapshot; the repository's CAS closes the remaining window between this
/// check and the write.
pub async fn reagendar(
    State(state): State<AppState>,
    Json(req): Json<ReagendarRequest>,
) -> AppResult<Json<DataResponse<navalha_db::models::agendamento::Agendamento>>> {
    let resolucao = resolver_token(&state, req.token.as_deref()).await?;
    let atual = resolucao.agendamento;
    let config = resolucao.config;
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

    comum::validar_janela(&state.pool, &config, req.nova_data_hora, atual.duracao_minutos, now)
        .await?;

    let resultado =
        AgendamentoRepo::reagendar(&state.pool, &atual, req.nova_data_hora, Some("cliente"))
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
                "agendamento foi alterado por outra operação".to_string(),
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

/// POST /api/v1/public/token/cancelar
///
/// Cancel via token. Cancellation is terminal; the CAS on the observed
/// status guarantees a lost race surfaces as `Conflict`.
pub async fn cancelar(
    State(state): State<AppState>,
    Json(req): Json<CancelarRequest>,
) -> AppResult<Json<DataResponse<navalha_db::models::agendamento::Agendamento>>> {
    let resolucao = resolver_token(&state, req.token.as_deref()).await?;
    let atual = resolucao.agendamento;
    let config = resolucao.config;
    let now = Utc::now();

    if let Some(motivo) =
        motivo_cancelamento(atual.status_id, atual.data_hora, now, &config.politica())
    {
        return Err(AppError::Core(CoreError::Forbidden(motivo)));
    }

    let Some(agendamento) =
        AgendamentoRepo::cancelar(&state.pool, &atual, req.motivo.as_deref(), Some("cliente"))
            .await?
    else {
        return Err(AppError::Core(CoreError::Conflict(
            "agendamento foi alterado por outra operação".to_string(),
        )));
    };

    debug_assert_eq!(agendamento.status_id, AgendamentoStatus::Cancelado.id());

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CANCELADO, &agendamento, None);

    Ok(Json(DataResponse { data: agendamento }))
}
