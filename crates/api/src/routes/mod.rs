pub mod agendamentos;
pub mod health;
pub mod lista_espera;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /public/unidades/{slug}                   branding + policy snapshot
/// /public/unidades/{slug}/servicos          active services
/// /public/unidades/{slug}/profissionais     active professionals
/// /public/unidades/{slug}/disponibilidade   availability resolver
/// /public/unidades/{slug}/agendamentos      create booking (POST)
/// /public/token                             token resolution (POST)
/// /public/token/reagendar                   self-service reschedule (POST)
/// /public/token/cancelar                    self-service cancel (POST)
///
/// /unidades/{id}/agendamentos               staff list (GET), create (POST)
/// /agendamentos/{id}/confirmar              staff confirm (POST)
/// /agendamentos/{id}/reagendar              staff reschedule (POST)
/// /agendamentos/{id}/cancelar               staff cancel (POST)
/// /agendamentos/{id}/concluir               staff conclude (POST)
/// /agendamentos/{id}/historico              audit history (GET)
/// /agendamentos/{id}/notificacoes           dispatch log (GET)
///
/// /lista-espera                             create entry (POST)
/// /lista-espera/{id}/promover               promote to booking (POST)
/// /unidades/{id}/lista-espera               waiting entries (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .merge(agendamentos::router())
        .merge(lista_espera::router())
}
