//! Route definitions for the waitlist.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lista_espera;
use crate::state::AppState;

/// Routes mounted at `/lista-espera` and `/unidades/{id}/lista-espera`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lista-espera", post(lista_espera::criar))
        .route("/lista-espera/{id}/promover", post(lista_espera::promover))
        .route(
            "/unidades/{unidade_id}/lista-espera",
            get(lista_espera::listar),
        )
}
