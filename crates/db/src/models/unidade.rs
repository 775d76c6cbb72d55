//! Tenant unit, per-unit policy configuration and operating hours.

use chrono::NaiveTime;
use navalha_core::token_access::PoliticaUnidade;
use navalha_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `unidades` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unidade {
    pub id: DbId,
    pub nome: String,
    pub slug: String,
    pub ativo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `configuracoes_unidade` table.
///
/// Exactly one per unit; read-only from the booking flow's perspective.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfiguracaoUnidade {
    pub id: DbId,
    pub unidade_id: DbId,
    pub antecedencia_minima_horas: i32,
    pub max_reagendamentos: i32,
    pub permite_cancelamento: bool,
    pub horario_limite_cancelamento: i32,
    pub agendamento_publico_ativo: bool,
    pub duracao_slot_minutos: i32,
    pub nome_publico: Option<String>,
    pub mensagem_boas_vindas: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConfiguracaoUnidade {
    /// Snapshot of the self-service policy fields for the core guards.
    pub fn politica(&self) -> PoliticaUnidade {
        PoliticaUnidade {
            antecedencia_minima_horas: self.antecedencia_minima_horas,
            max_reagendamentos: self.max_reagendamentos,
            permite_cancelamento: self.permite_cancelamento,
            horario_limite_cancelamento: self.horario_limite_cancelamento,
        }
    }
}

/// A row from the `horarios_funcionamento` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HorarioFuncionamento {
    pub id: DbId,
    pub unidade_id: DbId,
    /// 0 = Sunday .. 6 = Saturday.
    pub dia_semana: i16,
    pub abertura: NaiveTime,
    pub fechamento: NaiveTime,
    pub created_at: Timestamp,
}

/// DTO for creating a unit.
#[derive(Debug, Deserialize)]
pub struct CriarUnidade {
    pub nome: String,
    pub slug: String,
}

/// DTO for creating or replacing a unit's configuration.
#[derive(Debug, Deserialize)]
pub struct CriarConfiguracaoUnidade {
    pub antecedencia_minima_horas: Option<i32>,
    pub max_reagendamentos: Option<i32>,
    pub permite_cancelamento: Option<bool>,
    pub horario_limite_cancelamento: Option<i32>,
    pub agendamento_publico_ativo: Option<bool>,
    pub duracao_slot_minutos: Option<i32>,
    pub nome_publico: Option<String>,
    pub mensagem_boas_vindas: Option<String>,
}

/// DTO for setting one weekday's operating window.
#[derive(Debug, Deserialize)]
pub struct CriarHorario {
    pub dia_semana: i16,
    pub abertura: NaiveTime,
    pub fechamento: NaiveTime,
}
