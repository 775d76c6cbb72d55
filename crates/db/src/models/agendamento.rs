//! Appointment entity models and DTOs.

use navalha_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::status::StatusId;
use super::unidade::{ConfiguracaoUnidade, Unidade};
use super::{profissional::Profissional, servico::Servico};

/// A row from the `agendamentos` table.
///
/// `duracao_minutos` and `preco_centavos` are copied from the service at
/// creation time and do not track later catalogue edits. Rows are never
/// physically deleted; cancellation is a status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agendamento {
    pub id: DbId,
    pub unidade_id: DbId,
    pub profissional_id: DbId,
    pub servico_id: DbId,
    pub cliente_nome: String,
    pub cliente_telefone: Option<String>,
    pub cliente_email: Option<String>,
    pub data_hora: Timestamp,
    pub duracao_minutos: i32,
    pub preco_centavos: i64,
    pub status_id: StatusId,
    pub observacoes: Option<String>,
    pub token: String,
    pub reagendamentos_count: i32,
    pub origem: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Agendamento {
    /// End of the `[data_hora, data_hora + duracao)` interval.
    pub fn fim(&self) -> Timestamp {
        self.data_hora + chrono::Duration::minutes(i64::from(self.duracao_minutos))
    }
}

/// DTO for submitting a new appointment (public form or staff).
#[derive(Debug, Deserialize, Validate)]
pub struct CriarAgendamento {
    pub profissional_id: DbId,
    pub servico_id: DbId,
    #[validate(length(min = 2, max = 120))]
    pub cliente_nome: String,
    #[validate(length(min = 8, max = 20))]
    pub cliente_telefone: Option<String>,
    #[validate(email)]
    pub cliente_email: Option<String>,
    pub data_hora: Timestamp,
    #[validate(length(max = 500))]
    pub observacoes: Option<String>,
}

/// Query parameters for the staff range listing.
#[derive(Debug, Deserialize)]
pub struct AgendamentoListQuery {
    /// Range start (inclusive).
    pub de: Option<Timestamp>,
    /// Range end (exclusive).
    pub ate: Option<Timestamp>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// The fully joined view returned by token resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolucaoToken {
    pub agendamento: Agendamento,
    pub unidade: Unidade,
    pub profissional: Profissional,
    pub servico: Servico,
    #[serde(skip)]
    pub config: ConfiguracaoUnidade,
}
