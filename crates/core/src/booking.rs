//! Appointment lifecycle state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future worker or CLI tooling.

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Appointment status IDs matching `agendamento_statuses` seed data
/// (1-based SMALLSERIAL).
///
/// The state machine is intentionally duplicated from the `db` crate's
/// `AgendamentoStatus` enum because `core` must have zero internal deps.
pub mod state_machine {
    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Terminal states (Concluido=3, Cancelado=4) return an empty slice
    /// because no further transitions are allowed. A reschedule is modelled
    /// as a transition back to Pendente=1, including the self-transition
    /// from Pendente.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Pendente -> Pendente (reagendar), Confirmado, Cancelado
            1 => &[1, 2, 4],
            // Confirmado -> Pendente (reagendar), Concluido, Cancelado
            2 => &[1, 3, 4],
            // Terminal states: Concluido, Cancelado
            3 | 4 => &[],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Whether a status admits no further transitions.
    pub fn is_terminal(status: i16) -> bool {
        valid_transitions(status).is_empty()
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            let from_name = status_name(from);
            let to_name = status_name(to);
            Err(format!(
                "Transição inválida: {from_name} ({from}) -> {to_name} ({to})"
            ))
        }
    }

    /// Human-readable name for a status ID (for error messages).
    pub fn status_name(id: i16) -> &'static str {
        match id {
            1 => "pendente",
            2 => "confirmado",
            3 => "concluido",
            4 => "cancelado",
            _ => "desconhecido",
        }
    }
}

// ---------------------------------------------------------------------------
// Time-based completion guard
// ---------------------------------------------------------------------------

/// Whether a confirmed appointment may be marked concluded.
///
/// Staff may only conclude once the appointment's start time has passed;
/// the state guard (Confirmado -> Concluido) is checked separately by
/// [`state_machine::can_transition`].
pub fn pode_concluir(inicio: Timestamp, now: Timestamp) -> bool {
    now >= inicio
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pendente_to_confirmado() {
        assert!(can_transition(1, 2));
    }

    #[test]
    fn pendente_to_pendente_reagendamento() {
        assert!(can_transition(1, 1));
    }

    #[test]
    fn pendente_to_cancelado() {
        assert!(can_transition(1, 4));
    }

    #[test]
    fn confirmado_to_pendente_reagendamento() {
        assert!(can_transition(2, 1));
    }

    #[test]
    fn confirmado_to_concluido() {
        assert!(can_transition(2, 3));
    }

    #[test]
    fn confirmado_to_cancelado() {
        assert!(can_transition(2, 4));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn concluido_has_no_transitions() {
        assert!(valid_transitions(3).is_empty());
        assert!(is_terminal(3));
    }

    #[test]
    fn cancelado_has_no_transitions() {
        assert!(valid_transitions(4).is_empty());
        assert!(is_terminal(4));
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pendente_to_concluido_invalid() {
        assert!(!can_transition(1, 3));
    }

    #[test]
    fn concluido_to_cancelado_invalid() {
        assert!(!can_transition(3, 4));
    }

    #[test]
    fn cancelado_to_pendente_invalid() {
        assert!(!can_transition(4, 1));
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions(99).is_empty());
    }

    // -----------------------------------------------------------------------
    // validate_transition returns descriptive error
    // -----------------------------------------------------------------------

    #[test]
    fn validate_transition_ok() {
        assert!(validate_transition(1, 2).is_ok());
    }

    #[test]
    fn validate_transition_err() {
        let err = validate_transition(3, 4).unwrap_err();
        assert!(err.contains("concluido"));
        assert!(err.contains("cancelado"));
    }

    // -----------------------------------------------------------------------
    // Completion time guard
    // -----------------------------------------------------------------------

    #[test]
    fn pode_concluir_after_start() {
        let inicio = Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap();
        assert!(pode_concluir(inicio, inicio + Duration::minutes(5)));
        assert!(pode_concluir(inicio, inicio));
    }

    #[test]
    fn nao_pode_concluir_before_start() {
        let inicio = Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap();
        assert!(!pode_concluir(inicio, inicio - Duration::minutes(1)));
    }
}
