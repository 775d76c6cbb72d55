//! Route definitions for the public booking surface.
//!
//! No authentication: the booking endpoints are reachable by anyone, and
//! the token endpoints are guarded solely by possession of the opaque
//! self-service token.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{public_booking, token};
use crate::state::AppState;

/// Routes mounted at `/public`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/public/unidades/{slug}", get(public_booking::get_unidade))
        .route(
            "/public/unidades/{slug}/servicos",
            get(public_booking::listar_servicos),
        )
        .route(
            "/public/unidades/{slug}/profissionais",
            get(public_booking::listar_profissionais),
        )
        .route(
            "/public/unidades/{slug}/disponibilidade",
            get(public_booking::disponibilidade),
        )
        .route(
            "/public/unidades/{slug}/agendamentos",
            post(public_booking::criar_agendamento),
        )
        .route("/public/token", post(token::resolver))
        .route("/public/token/reagendar", post(token::reagendar))
        .route("/public/token/cancelar", post(token::cancelar))
}
