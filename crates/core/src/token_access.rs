//! Self-service permission computation for token-resolved appointments.
//!
//! `pode_reagendar` / `pode_cancelar` are pure functions of
//! `(status, inicio, now, politica, reagendamentos_count)`. They are
//! recomputed on every token resolution and never persisted — "now" is an
//! input, so a cached flag would be stale by construction. The mutation
//! paths re-evaluate the same guards at commit time; the resolution-time
//! flags are advisory only.

use serde::Serialize;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Policy snapshot
// ---------------------------------------------------------------------------

/// Per-unit self-service policy, copied from `configuracoes_unidade`.
///
/// Threaded explicitly into every evaluation; never read from ambient state.
#[derive(Debug, Clone, Copy)]
pub struct PoliticaUnidade {
    /// Minimum lead time (hours) below which self-service reschedule is blocked.
    pub antecedencia_minima_horas: i32,
    /// Maximum number of reschedules per appointment.
    pub max_reagendamentos: i32,
    /// Whether cancellation is permitted at all.
    pub permite_cancelamento: bool,
    /// Minimum lead time (hours) below which cancellation is blocked.
    pub horario_limite_cancelamento: i32,
}

/// Advisory self-service permissions returned with every token resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissoes {
    pub pode_reagendar: bool,
    pub pode_cancelar: bool,
}

// ---------------------------------------------------------------------------
// Guard failure reasons
// ---------------------------------------------------------------------------

/// The specific guard that blocked a self-service action.
///
/// Surfaced in `Forbidden` responses so the client UI can present an
/// actionable message instead of a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotivoBloqueio {
    /// The appointment is already `concluido` or `cancelado`.
    StatusTerminal,
    /// Less than the unit's minimum lead time remains before the start.
    AntecedenciaInsuficiente { minimo_horas: i32 },
    /// The reschedule budget is exhausted.
    LimiteReagendamentos { maximo: i32 },
    /// The unit does not permit cancellation.
    CancelamentoDesabilitado,
    /// Less than the unit's cancellation cut-off remains before the start.
    PrazoCancelamentoExpirado { limite_horas: i32 },
    /// Completion requested before the appointment's start time.
    AindaNaoIniciado,
}

impl MotivoBloqueio {
    /// Stable machine-readable code for API payloads.
    pub fn codigo(self) -> &'static str {
        match self {
            Self::StatusTerminal => "status_terminal",
            Self::AntecedenciaInsuficiente { .. } => "antecedencia_insuficiente",
            Self::LimiteReagendamentos { .. } => "limite_reagendamentos",
            Self::CancelamentoDesabilitado => "cancelamento_desabilitado",
            Self::PrazoCancelamentoExpirado { .. } => "prazo_cancelamento_expirado",
            Self::AindaNaoIniciado => "ainda_nao_iniciado",
        }
    }
}

impl std::fmt::Display for MotivoBloqueio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StatusTerminal => {
                write!(f, "agendamento já concluído ou cancelado")
            }
            Self::AntecedenciaInsuficiente { minimo_horas } => write!(
                f,
                "reagendamento exige pelo menos {minimo_horas}h de antecedência"
            ),
            Self::LimiteReagendamentos { maximo } => {
                write!(f, "limite de {maximo} reagendamento(s) atingido")
            }
            Self::CancelamentoDesabilitado => {
                write!(f, "esta unidade não permite cancelamento")
            }
            Self::PrazoCancelamentoExpirado { limite_horas } => write!(
                f,
                "cancelamento exige pelo menos {limite_horas}h de antecedência"
            ),
            Self::AindaNaoIniciado => {
                write!(f, "agendamento ainda não chegou ao horário de início")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Terminal status IDs: concluido (3) and cancelado (4).
const STATUS_TERMINAIS: [i16; 2] = [3, 4];

/// Whole-interval hours remaining until the appointment start.
///
/// Fractional hours matter at the boundary: an appointment 1h59min away has
/// fewer than 2 "horas restantes" for a 2-hour cut-off.
pub fn horas_restantes(inicio: Timestamp, now: Timestamp) -> f64 {
    (inicio - now).num_seconds() as f64 / 3600.0
}

/// First failing guard for a self-service (or staff) reschedule, if any.
pub fn motivo_reagendamento(
    status: i16,
    inicio: Timestamp,
    now: Timestamp,
    politica: &PoliticaUnidade,
    reagendamentos_count: i32,
) -> Option<MotivoBloqueio> {
    if STATUS_TERMINAIS.contains(&status) {
        return Some(MotivoBloqueio::StatusTerminal);
    }
    if horas_restantes(inicio, now) < f64::from(politica.antecedencia_minima_horas) {
        return Some(MotivoBloqueio::AntecedenciaInsuficiente {
            minimo_horas: politica.antecedencia_minima_horas,
        });
    }
    if reagendamentos_count >= politica.max_reagendamentos {
        return Some(MotivoBloqueio::LimiteReagendamentos {
            maximo: politica.max_reagendamentos,
        });
    }
    None
}

/// First failing guard for a cancellation, if any.
pub fn motivo_cancelamento(
    status: i16,
    inicio: Timestamp,
    now: Timestamp,
    politica: &PoliticaUnidade,
) -> Option<MotivoBloqueio> {
    if STATUS_TERMINAIS.contains(&status) {
        return Some(MotivoBloqueio::StatusTerminal);
    }
    if !politica.permite_cancelamento {
        return Some(MotivoBloqueio::CancelamentoDesabilitado);
    }
    if horas_restantes(inicio, now) < f64::from(politica.horario_limite_cancelamento) {
        return Some(MotivoBloqueio::PrazoCancelamentoExpirado {
            limite_horas: politica.horario_limite_cancelamento,
        });
    }
    None
}

/// Compute both advisory flags for a token resolution.
pub fn avaliar(
    status: i16,
    inicio: Timestamp,
    now: Timestamp,
    politica: &PoliticaUnidade,
    reagendamentos_count: i32,
) -> Permissoes {
    Permissoes {
        pode_reagendar: motivo_reagendamento(status, inicio, now, politica, reagendamentos_count)
            .is_none(),
        pode_cancelar: motivo_cancelamento(status, inicio, now, politica).is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn politica_padrao() -> PoliticaUnidade {
        PoliticaUnidade {
            antecedencia_minima_horas: 24,
            max_reagendamentos: 2,
            permite_cancelamento: true,
            horario_limite_cancelamento: 2,
        }
    }

    fn agora() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // Scenario grid from the unit policy
    // -----------------------------------------------------------------------

    #[test]
    fn pendente_36h_antes_permite_ambos() {
        let now = agora();
        let p = avaliar(1, now + Duration::hours(36), now, &politica_padrao(), 0);
        assert_eq!(
            p,
            Permissoes {
                pode_reagendar: true,
                pode_cancelar: true,
            }
        );
    }

    #[test]
    fn dez_horas_antes_bloqueia_reagendamento_mas_nao_cancelamento() {
        let now = agora();
        let p = avaliar(1, now + Duration::hours(10), now, &politica_padrao(), 0);
        assert!(!p.pode_reagendar);
        assert!(p.pode_cancelar);
    }

    #[test]
    fn limite_de_reagendamentos_bloqueia_mesmo_com_antecedencia() {
        let now = agora();
        let motivo = motivo_reagendamento(
            1,
            now + Duration::hours(100),
            now,
            &politica_padrao(),
            2,
        );
        assert_matches!(motivo, Some(MotivoBloqueio::LimiteReagendamentos { maximo: 2 }));
    }

    #[test]
    fn status_terminal_bloqueia_ambos() {
        let now = agora();
        let inicio = now + Duration::hours(48);
        for status in [3i16, 4i16] {
            let p = avaliar(status, inicio, now, &politica_padrao(), 0);
            assert!(!p.pode_reagendar);
            assert!(!p.pode_cancelar);
        }
    }

    #[test]
    fn cancelamento_desabilitado_na_unidade() {
        let now = agora();
        let politica = PoliticaUnidade {
            permite_cancelamento: false,
            ..politica_padrao()
        };
        let motivo = motivo_cancelamento(1, now + Duration::hours(48), now, &politica);
        assert_matches!(motivo, Some(MotivoBloqueio::CancelamentoDesabilitado));
    }

    #[test]
    fn prazo_de_cancelamento_expirado() {
        let now = agora();
        let motivo = motivo_cancelamento(
            2,
            now + Duration::minutes(90),
            now,
            &politica_padrao(),
        );
        assert_matches!(
            motivo,
            Some(MotivoBloqueio::PrazoCancelamentoExpirado { limite_horas: 2 })
        );
    }

    // -----------------------------------------------------------------------
    // Purity: same inputs, same outputs
    // -----------------------------------------------------------------------

    #[test]
    fn avaliacao_e_idempotente() {
        let now = agora();
        let inicio = now + Duration::hours(36);
        let politica = politica_padrao();
        let primeira = avaliar(2, inicio, now, &politica, 1);
        let segunda = avaliar(2, inicio, now, &politica, 1);
        assert_eq!(primeira, segunda);
    }

    // -----------------------------------------------------------------------
    // Boundary arithmetic
    // -----------------------------------------------------------------------

    #[test]
    fn horas_restantes_fracionarias() {
        let now = agora();
        let inicio = now + Duration::minutes(90);
        assert!((horas_restantes(inicio, now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn antecedencia_exata_no_limite_e_permitida() {
        // horas_restantes >= antecedencia_minima: the boundary is inclusive.
        let now = agora();
        let inicio = now + Duration::hours(24);
        let motivo = motivo_reagendamento(1, inicio, now, &politica_padrao(), 0);
        assert_matches!(motivo, None);
    }

    #[test]
    fn agendamento_no_passado_nunca_permite_acoes() {
        let now = agora();
        let inicio = now - Duration::hours(1);
        let p = avaliar(1, inicio, now, &politica_padrao(), 0);
        assert!(!p.pode_reagendar);
        assert!(!p.pode_cancelar);
    }

    // -----------------------------------------------------------------------
    // Display / codes
    // -----------------------------------------------------------------------

    #[test]
    fn motivo_carrega_codigo_estavel() {
        assert_eq!(MotivoBloqueio::StatusTerminal.codigo(), "status_terminal");
        assert_eq!(
            MotivoBloqueio::LimiteReagendamentos { maximo: 2 }.codigo(),
            "limite_reagendamentos"
        );
    }

    #[test]
    fn motivo_explica_guarda_que_falhou() {
        let msg = MotivoBloqueio::AntecedenciaInsuficiente { minimo_horas: 24 }.to_string();
        assert!(msg.contains("24h"));
    }
}
