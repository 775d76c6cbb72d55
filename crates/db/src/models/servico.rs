//! Service catalogue entity models.

use navalha_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `servicos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Servico {
    pub id: DbId,
    pub unidade_id: DbId,
    pub nome: String,
    pub duracao_minutos: i32,
    pub preco_centavos: i64,
    pub ativo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a service.
#[derive(Debug, Deserialize)]
pub struct CriarServico {
    pub nome: String,
    pub duracao_minutos: i32,
    pub preco_centavos: i64,
}
