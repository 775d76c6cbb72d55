//! Handlers for the waitlist.
//!
//! Promotion creates the appointment through the exact same path as a
//! direct booking (commit-time slot re-check included). When the slot is
//! gone the entry is left untouched and the conflict propagates to the
//! caller, which picks another candidate; no retry or slot reassignment
//! happens here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use navalha_core::error::CoreError;
use navalha_core::origem::ORIGEM_ADMIN;
use navalha_core::types::DbId;
use navalha_db::models::agendamento::{Agendamento, CriarAgendamento};
use navalha_db::models::lista_espera::{CriarEntradaListaEspera, EntradaListaEspera};
use navalha_db::models::status::ListaEsperaStatus;
use navalha_db::repositories::{
    AgendamentoRepo, ListaEsperaRepo, ProfissionalRepo, ResultadoCriacao, ServicoRepo,
    UnidadeRepo,
};
use navalha_events::bus::tipos;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::comum;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/lista-espera
pub async fn criar(
    State(state): State<AppState>,
    Json(input): Json<CriarEntradaListaEspera>,
) -> AppResult<(StatusCode, Json<DataResponse<EntradaListaEspera>>)> {
    input.validate()?;

    let Some(unidade) = UnidadeRepo::find_by_id(&state.pool, input.unidade_id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Unidade",
            id: input.unidade_id,
        }));
    };
    if let Some(profissional_id) = input.profissional_id {
        if ProfissionalRepo::find_na_unidade(&state.pool, profissional_id, unidade.id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Profissional",
                id: profissional_id,
            }));
        }
    }
    if ServicoRepo::find_na_unidade(&state.pool, input.servico_id, unidade.id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Servico",
            id: input.servico_id,
        }));
    }

    let entrada = ListaEsperaRepo::criar(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entrada })))
}

/// GET /api/v1/unidades/{unidade_id}/lista-espera
pub async fn listar(
    State(state): State<AppState>,
    Path(unidade_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EntradaListaEspera>>>> {
    let entradas = ListaEsperaRepo::listar_aguardando(&state.pool, unidade_id).await?;
    Ok(Json(DataResponse { data: entradas }))
}

/// POST /api/v1/lista-espera/{id}/promover
///
/// Convert a waiting entry into a confirmed booking. On failure (slot no
/// longer free) the entry stays `aguardando` and the caller receives the
/// conflict.
pub async fn promover(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CriarAgendamento>,
) -> AppResult<(StatusCode, Json<DataResponse<Agendamento>>)> {
    input.validate()?;
    let now = Utc::now();

    let Some(entrada) = ListaEsperaRepo::find_by_id(&state.pool, id).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "EntradaListaEspera",
            id,
        }));
    };
    if entrada.status_id != ListaEsperaStatus::Aguardando.id() {
        return Err(AppError::Core(CoreError::Conflict(
            "entrada da lista de espera já foi tratada".to_string(),
        )));
    }

    let config = comum::config_da_unidade(&state.pool, entrada.unidade_id).await?;

    let Some(_profissional) =
        ProfissionalRepo::find_na_unidade(&state.pool, input.profissional_id, entrada.unidade_id)
            .await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Profissional",
            id: input.profissional_id,
        }));
    };
    let Some(servico) =
        ServicoRepo::find_na_unidade(&state.pool, input.servico_id, entrada.unidade_id).await?
    else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Servico",
            id: input.servico_id,
        }));
    };

    comum::validar_janela(&state.pool, &config, input.data_hora, servico.duracao_minutos, now)
        .await?;

    // Same creation path as a direct booking: the slot is re-checked inside
    // the insert transaction. A conflict leaves the entry untouched.
    let resultado = AgendamentoRepo::criar(
        &state.pool,
        entrada.unidade_id,
        &input,
        &servico,
        ORIGEM_ADMIN,
        Some("equipe"),
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

    if !ListaEsperaRepo::marcar_agendada(&state.pool, entrada.id).await? {
        // The appointment exists either way; the entry raced with another
        // state change and keeps whatever status won.
        tracing::warn!(
            entrada_id = entrada.id,
            agendamento_id = agendamento.id,
            "Entrada da lista de espera mudou de status durante a promoção"
        );
    }

    comum::publicar_evento(&state, tipos::AGENDAMENTO_CRIADO, &agendamento, None);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: agendamento }),
    ))
}
