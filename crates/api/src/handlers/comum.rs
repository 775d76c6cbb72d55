//! Helpers shared by the booking handlers.
//!
//! The unit configuration is always loaded fresh and threaded explicitly
//! into the core guards — never cached on state.

use chrono::Datelike;
use navalha_core::error::CoreError;
use navalha_core::token_access::horas_restantes;
use navalha_core::types::{DbId, Timestamp};
use navalha_db::models::agendamento::Agendamento;
use navalha_db::models::unidade::ConfiguracaoUnidade;
use navalha_db::repositories::UnidadeRepo;
use navalha_db::DbPool;
use navalha_events::BookingEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a unit's configuration, failing loudly if the one-config-per-unit
/// invariant is broken.
pub async fn config_da_unidade(
    pool: &DbPool,
    unidade_id: DbId,
) -> AppResult<ConfiguracaoUnidade> {
    UnidadeRepo::get_config(pool, unidade_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "unidade {unidade_id} sem configuração"
            )))
        })
}

/// Validate that a requested `[inicio, inicio + duracao)` interval is a
/// bookable window: inside the unit's operating hours for that weekday and
/// not closer than the unit's minimum lead time.
///
/// The overlap against existing appointments is NOT checked here — that
/// guard is the conditional write inside the repository transaction.
pub async fn validar_janela(
    pool: &DbPool,
    config: &ConfiguracaoUnidade,
    inicio: Timestamp,
    duracao_minutos: i32,
    now: Timestamp,
) -> AppResult<()> {
    if horas_restantes(inicio, now) < f64::from(config.antecedencia_minima_horas) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "horário exige pelo menos {}h de antecedência",
            config.antecedencia_minima_horas
        ))));
    }

    let dia = inicio.date_naive();
    let dia_semana = dia.weekday().num_days_from_sunday() as i16;
    let Some(horario) = UnidadeRepo::horario_do_dia(pool, config.unidade_id, dia_semana).await?
    else {
        return Err(AppError::Core(CoreError::Validation(
            "a unidade não funciona nesse dia".to_string(),
        )));
    };

    let fim = inicio + chrono::Duration::minutes(i64::from(duracao_minutos));
    let abre = inicio.time() >= horario.abertura;
    let fecha = fim.date_naive() == dia && fim.time() <= horario.fechamento;
    if !abre || !fecha {
        return Err(AppError::Core(CoreError::Validation(format!(
            "horário fora da janela de funcionamento ({} - {})",
            horario.abertura, horario.fechamento
        ))));
    }

    Ok(())
}

/// Publish a booking event after a committed transition.
///
/// Fire-and-forget: publishing cannot fail the transition, and the
/// dispatcher settles delivery outcomes into `logs_notificacao` on its own.
pub fn publicar_evento(
    state: &AppState,
    tipo: &'static str,
    agendamento: &Agendamento,
    data_hora_anterior: Option<Timestamp>,
) {
    let mut payload = serde_json::json!({
        "cliente_nome": agendamento.cliente_nome,
        "data_hora": agendamento.data_hora,
        "duracao_minutos": agendamento.duracao_minutos,
    });
    if let Some(anterior) = data_hora_anterior {
        payload["data_hora_anterior"] = serde_json::json!(anterior);
    }

    state.event_bus.publish(
        BookingEvent::new(tipo, agendamento.id, agendamento.unidade_id).with_payload(payload),
    );
}
