//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `navalha_db`, re-validate the
//! core guards at mutation time, and map errors via [`AppError`](crate::error::AppError).

pub mod agendamentos;
pub mod comum;
pub mod health;
pub mod lista_espera;
pub mod public_booking;
pub mod token;
