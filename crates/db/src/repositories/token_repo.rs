//! Token resolution: opaque token -> appointment + joined tenant context.
//!
//! Resolution loads a fresh snapshot on every call; the permission flags
//! are computed by the caller from this snapshot and an explicit "now",
//! never stored.

use sqlx::PgPool;

use crate::models::agendamento::ResolucaoToken;
use crate::repositories::{AgendamentoRepo, ProfissionalRepo, ServicoRepo, UnidadeRepo};

/// Resolves self-service tokens to their full booking context.
pub struct TokenRepo;

impl TokenRepo {
    /// Resolve a token to `(agendamento, unidade, profissional, servico,
    /// configuracao)`.
    ///
    /// Returns `None` when the token matches no appointment or any joined
    /// row is missing; the caller decides how to render that (the public
    /// endpoint answers 400 with an opaque message, leaking nothing about
    /// which piece failed).
    pub async fn resolve(pool: &PgPool, token: &str) -> Result<Option<ResolucaoToken>, sqlx::Error> {
        let Some(agendamento) = AgendamentoRepo::find_by_token(pool, token).await? else {
            return Ok(None);
        };

        let Some(unidade) = UnidadeRepo::find_by_id(pool, agendamento.unidade_id).await? else {
            return Ok(None);
        };
        let Some(config) = UnidadeRepo::get_config(pool, agendamento.unidade_id).await? else {
            return Ok(None);
        };
        let Some(profissional) =
            ProfissionalRepo::find_by_id(pool, agendamento.profissional_id).await?
        else {
            return Ok(None);
        };
        let Some(servico) = ServicoRepo::find_by_id(pool, agendamento.servico_id).await? else {
            return Ok(None);
        };

        Ok(Some(ResolucaoToken {
            agendamento,
            unidade,
            profissional,
            servico,
            config,
        }))
    }
}
