//! Professional entity models.

use navalha_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profissionais` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profissional {
    pub id: DbId,
    pub unidade_id: DbId,
    pub nome: String,
    pub ativo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a professional.
#[derive(Debug, Deserialize)]
pub struct CriarProfissional {
    pub nome: String,
}
