//! Append-only audit history models.

use navalha_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `historico_agendamentos` table. Never mutated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoricoAgendamento {
    pub id: DbId,
    pub agendamento_id: DbId,
    pub acao: String,
    pub data_hora_anterior: Option<Timestamp>,
    pub data_hora_nova: Option<Timestamp>,
    pub status_anterior: Option<StatusId>,
    pub status_novo: Option<StatusId>,
    pub motivo: Option<String>,
    pub autor: Option<String>,
    pub created_at: Timestamp,
}

/// Payload for appending one history row.
#[derive(Debug, Clone, Default)]
pub struct NovoHistorico<'a> {
    pub acao: &'a str,
    pub data_hora_anterior: Option<Timestamp>,
    pub data_hora_nova: Option<Timestamp>,
    pub status_anterior: Option<StatusId>,
    pub status_novo: Option<StatusId>,
    pub motivo: Option<&'a str>,
    pub autor: Option<&'a str>,
}
