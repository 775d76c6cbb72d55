//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod agendamento;
pub mod historico;
pub mod lista_espera;
pub mod notificacao;
pub mod profissional;
pub mod servico;
pub mod status;
pub mod unidade;
