//! Handlers for the public booking surface.
//!
//! Everything here is tenant-scoped by the unit slug in the path and only
//! reachable while the unit has public booking enabled. The availability
//! output is advisory; the repository re-checks the slot inside the
//! transaction that commits a booking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use navalha_core::availability::{validar_data, GradeSlots, Slot};
use navalha_core::error::CoreError;
use navalha_core::origem::ORIGEM_PUBLICO;
use navalha_core::types::DbId;
use navalha_db::models::agendamento::{Agendamento, CriarAgendamento};
use navalha_db::models::unidade::{ConfiguracaoUnidade, Unidade};
use navalha_db::repositories::{
    AgendamentoRepo, ProfissionalRepo, ResultadoCriacao, ServicoRepo, UnidadeRepo,
};
use navalha_events::bus::tipos;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::comum;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /public/unidades/{slug}/disponibilidade`.
#[derive(Debug, Deserialize)]
pub struct DisponibilidadeQuery {
    pub profissional_id: DbId,
    pub servico_id: DbId,
    /// Day to resolve, `YYYY-MM-DD`.
    pub data: NaiveDate,
}

// ---------------------------------------------------------------------------
// Unit lookup
// ---------------------------------------------------------------------------

/// Resolve a slug to an active unit with public booking enabled.
///
/// A unit with public booking disabled is indistinguishable from a missing
/// one on this surface.
async fn unidade_publica(
    state: &AppState,
    slug: &str,
) -> AppResult<(Unidade, ConfiguracaoUnidade)> {
    let Some(unidade) = UnidadeRepo::find_by_slug(&state.pool, slug).await? else {
        return Err(AppError::BadRequest(format!(
            "unidade '{slug}' não encontrada"
        )));
    };
    let config = comum::config_da_unidade(&state.pool, unidade.id).await?;
    if !config.agendamento_publico_ativo {
        return Err(AppError::BadRequest(format!(
            "unidade '{slug}' não encontrada"
        )));
    }
    Ok((unidade, config))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/public/unidades/{slug}
///
/// Branding and policy snapshot for the public booking UI.
pub async fn get_unidade(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let (unidade, config) = unidade_publica(&state, &slug).await?;

    Ok(Json(serde_json::json!({
        "data": {
            "unidade": {
                "nome": config.nome_publico.as_deref().unwrap_or(&unidade.nome),
                "slug": unidade.slug,
                "mensagem_boas_vindas": config.mensagem_boas_vindas,
            },
            "politica": {
                "antecedencia_minima_horas": config.antecedencia_minima_horas,
                "max_reagendamentos": config.max_reagendamentos,
                "permite_cancelamento": config.permite_cancelamento,
                "horario_limite_cancelamento": config.horario_limite_cancelamento,
            },
        }
    })))
}

/// GET /api/v1/public/unidades/{slug}/servicos
pub async fn listar_servicos(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let (unidade, _) = unidade_publica(&state, &slug).await?;
    let servicos = ServicoRepo::listar_ativos(&state.pool, unidade.id).await?;
    Ok(Json(serde_json::json!({ "data": servicos })))
}

/// GET /api/v1/public/unidades/{slug}/profissionais
pub async fn listar_profissionais(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let (unidade, _) = unidade_publica(&state, &slug).await?;
    let profissionais = ProfissionalRepo::listar_ativos(&state.pool, unidade.id).await?;
    Ok(Json(serde_json::json!({ "data": profissionais })))
}

/// GET /api/v1/public/unidades/{slug}/disponibilidade
///
/// Resolve the bookable slots for one professional, service and day.
pub async fn disponibilidade(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<DisponibilidadeQuery>,
) -> AppResult<Json<DataResponse<Vec<Slot>>>> {
    let (unidade, config) = unidade_publica(&state, &slug).await?;
    let now = Utc::now();

    validar_data(params.data, now.date_naive(), state.config.carencia_dias)
        .map_err(AppError::Core)?;

    let Some(profissional) =
        ProfissionalRepo::find_na_unidade(&state.pool, params.profissional_id, unidade.id).await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Profissional",
            id: params.profissional_id,
        }));
    };
    let Some(servico) =
        ServicoRepo::find_na_unidade(&state.pool, params.servico_id, unidade.id).await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Servico",
            id: params.servico_id,
        }));
    };

    let dia_semana = params.data.weekday().num_days_from_sunday() as i16;
    let Some(horario) =
        UnidadeRepo::horario_do_dia(&state.pool, unidade.id, dia_semana).await?
    else {
        // Closed weekday: empty grid.
        let grade = GradeSlots::dia_fechado(profissional.id, params.data, now);
        return Ok(Json(DataResponse {
            data: grade.iter().collect(),
        }));
    };

    let dia_inicio = Utc.from_utc_datetime(&params.data.and_time(chrono::NaiveTime::MIN));
    let dia_fim = dia_inicio + chrono::Duration::days(1);
    let ocupados =
        AgendamentoRepo::ocupados_no_periodo(&state.pool, profissional.id, dia_inicio, dia_fim)
            .await?;

    let grade = GradeSlots {
        profissional_id: profissional.id,
        dia: params.data,
        abertura: horario.abertura,
        fechamento: horario.fechamento,
        duracao_slot_minutos: config.duracao_slot_minutos,
        duracao_servico_minutos: servico.duracao_minutos,
        antecedencia_minima_horas: config.antecedencia_minima_horas,
        agora: now,
        ocupados,
    };

    Ok(Json(DataResponse {
        data: grade.iter().collect(),
    }))
}

/// POST /api/v1/public/unidades/{slug}/agendamentos
///
/// Create a `pendente` appointment with origin `publico`. The response
/// carries the self-service token the client must keep.
pub async fn criar_agendamento(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<CriarAgendamento>,
) -> AppResult<(StatusCode, Json<DataResponse<Agendamento>>)> {
    input.validate()?;
    let (unidade, config) = unidade_publica(&state, &slug).await?;
    let now = Utc::now();

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
        ORIGEM_PUBLICO,
        Some("cliente"),
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
