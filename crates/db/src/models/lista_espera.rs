//! Waitlist entity models and DTOs.

use navalha_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::status::StatusId;

/// A row from the `lista_espera` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntradaListaEspera {
    pub id: DbId,
    pub unidade_id: DbId,
    pub profissional_id: Option<DbId>,
    pub servico_id: DbId,
    pub cliente_nome: String,
    pub cliente_telefone: Option<String>,
    pub cliente_email: Option<String>,
    pub data_hora_preferida: Timestamp,
    pub prioridade: i16,
    pub status_id: StatusId,
    pub observacoes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a waitlist entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CriarEntradaListaEspera {
    pub unidade_id: DbId,
    pub profissional_id: Option<DbId>,
    pub servico_id: DbId,
    #[validate(length(min = 2, max = 120))]
    pub cliente_nome: String,
    #[validate(length(min = 8, max = 20))]
    pub cliente_telefone: Option<String>,
    #[validate(email)]
    pub cliente_email: Option<String>,
    pub data_hora_preferida: Timestamp,
    /// 1 = baixa, 2 = media, 3 = alta. Defaults to media.
    pub prioridade: Option<i16>,
    #[validate(length(max = 500))]
    pub observacoes: Option<String>,
}
