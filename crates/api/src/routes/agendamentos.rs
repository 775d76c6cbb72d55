//! Route definitions for staff appointment management.
//!
//! Authentication/authorization for the staff surface is handled by the
//! deployment's reverse proxy; these routes carry the state-machine verbs
//! the dashboard calls.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::agendamentos;
use crate::state::AppState;

/// Routes mounted at `/unidades/{id}/agendamentos` and `/agendamentos`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/unidades/{unidade_id}/agendamentos",
            get(agendamentos::listar).post(agendamentos::criar),
        )
        .route("/agendamentos/{id}/confirmar", post(agendamentos::confirmar))
        .route("/agendamentos/{id}/reagendar", post(agendamentos::reagendar))
        .route("/agendamentos/{id}/cancelar", post(agendamentos::cancelar))
        .route("/agendamentos/{id}/concluir", post(agendamentos::concluir))
        .route("/agendamentos/{id}/historico", get(agendamentos::historico))
        .route(
            "/agendamentos/{id}/notificacoes",
            get(agendamentos::notificacoes),
        )
}
