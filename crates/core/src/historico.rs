//! Well-known audit action tags for `historico_agendamentos.acao`.
//!
//! Every appointment state transition appends exactly one history row with
//! one of these tags. Rows are append-only and never mutated.

pub const ACAO_CRIADO: &str = "criado";
pub const ACAO_CONFIRMADO: &str = "confirmado";
pub const ACAO_REAGENDADO: &str = "reagendado";
pub const ACAO_CANCELADO: &str = "cancelado";
pub const ACAO_CONCLUIDO: &str = "concluido";
pub const ACAO_NOTIFICADO: &str = "notificado";
