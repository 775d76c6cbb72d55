//! Pure slot-grid computation for the availability resolver.
//!
//! [`GradeSlots`] holds a day's inputs (operating window, granularity,
//! service duration, the professional's busy intervals, minimum lead time
//! and an explicit `agora`) and yields a lazy, finite, restartable sequence
//! of [`Slot`]s via [`GradeSlots::iter`]. The repository layer resolves the
//! inputs from the database; this module never touches I/O.
//!
//! The output is advisory: the authoritative overlap guard is the
//! conditional write performed at appointment commit time.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// One bookable (or blocked) time slot in a professional's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub inicio: Timestamp,
    pub profissional_id: DbId,
    pub disponivel: bool,
}

/// Binary overlap check of `[inicio, inicio + duracao)` against a busy
/// interval list. No slot is ever partially available.
pub fn conflita(
    inicio: Timestamp,
    duracao_minutos: i32,
    ocupados: &[(Timestamp, Timestamp)],
) -> bool {
    let fim = inicio + chrono::Duration::minutes(i64::from(duracao_minutos));
    ocupados
        .iter()
        .any(|(ocupado_inicio, ocupado_fim)| inicio < *ocupado_fim && *ocupado_inicio < fim)
}

/// Validate a requested availability date against the grace window.
///
/// Dates earlier than `hoje - carencia_dias` are rejected; `hoje` itself and
/// anything in the future is always accepted.
pub fn validar_data(data: NaiveDate, hoje: NaiveDate, carencia_dias: i64) -> Result<(), CoreError> {
    if data < hoje - chrono::Duration::days(carencia_dias) {
        return Err(CoreError::Validation(format!(
            "data {data} já passou (carência de {carencia_dias} dia(s))"
        )));
    }
    Ok(())
}

/// Inputs for one professional-day slot grid.
///
/// Operating hours and all timestamps are UTC; converting from the unit's
/// wall-clock timezone is the caller's concern.
#[derive(Debug, Clone)]
pub struct GradeSlots {
    pub profissional_id: DbId,
    pub dia: NaiveDate,
    pub abertura: NaiveTime,
    pub fechamento: NaiveTime,
    /// Grid granularity, from the unit configuration.
    pub duracao_slot_minutos: i32,
    /// Duration of the requested service; defines the `[inicio, fim)`
    /// interval each slot must fit and be conflict-free for.
    pub duracao_servico_minutos: i32,
    pub antecedencia_minima_horas: i32,
    pub agora: Timestamp,
    /// `[inicio, fim)` of the professional's non-cancelled appointments.
    pub ocupados: Vec<(Timestamp, Timestamp)>,
}

impl GradeSlots {
    /// A grid for a day the unit is closed: yields nothing.
    pub fn dia_fechado(profissional_id: DbId, dia: NaiveDate, agora: Timestamp) -> Self {
        Self {
            profissional_id,
            dia,
            abertura: NaiveTime::MIN,
            fechamento: NaiveTime::MIN,
            duracao_slot_minutos: 30,
            duracao_servico_minutos: 30,
            antecedencia_minima_horas: 0,
            agora,
            ocupados: Vec::new(),
        }
    }

    /// Iterate the day's slots. Restartable: each call walks the full grid
    /// again from the opening time.
    pub fn iter(&self) -> SlotsIter<'_> {
        SlotsIter {
            grade: self,
            cursor: self.abertura,
        }
    }
}

/// Lazy iterator over a [`GradeSlots`] grid.
pub struct SlotsIter<'a> {
    grade: &'a GradeSlots,
    cursor: NaiveTime,
}

impl Iterator for SlotsIter<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let grade = self.grade;
        let servico = chrono::Duration::minutes(i64::from(grade.duracao_servico_minutos));
        let passo = chrono::Duration::minutes(i64::from(grade.duracao_slot_minutos));
        if passo <= chrono::Duration::zero() {
            return None;
        }

        let inicio_naive = self.cursor;
        // The slot must fit entirely inside the operating window.
        let fim_naive = inicio_naive.overflowing_add_signed(servico);
        if fim_naive.1 != 0 || fim_naive.0 > grade.fechamento || inicio_naive >= grade.fechamento {
            return None;
        }

        let proximo = inicio_naive.overflowing_add_signed(passo);
        // Stop instead of wrapping past midnight.
        self.cursor = if proximo.1 != 0 {
            grade.fechamento
        } else {
            proximo.0
        };

        let inicio = Utc.from_utc_datetime(&grade.dia.and_time(inicio_naive));
        let antecedencia_ok = crate::token_access::horas_restantes(inicio, grade.agora)
            >= f64::from(grade.antecedencia_minima_horas);
        let livre = !conflita(inicio, grade.duracao_servico_minutos, &grade.ocupados);

        Some(Slot {
            inicio,
            profissional_id: grade.profissional_id,
            disponivel: antecedencia_ok && livre,
        })
    }
}
