//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. State transitions are
//! per-row conditional updates (compare-and-swap on the current status),
//! never global locks, so unrelated appointments proceed in parallel.

pub mod agendamento_repo;
pub mod historico_repo;
pub mod lista_espera_repo;
pub mod notificacao_repo;
pub mod profissional_repo;
pub mod servico_repo;
pub mod token_repo;
pub mod unidade_repo;

pub use agendamento_repo::{AgendamentoRepo, ResultadoCriacao, ResultadoReagendamento};
pub use historico_repo::HistoricoRepo;
pub use lista_espera_repo::ListaEsperaRepo;
pub use notificacao_repo::NotificacaoRepo;
pub use profissional_repo::ProfissionalRepo;
pub use servico_repo::ServicoRepo;
pub use token_repo::TokenRepo;
pub use unidade_repo::UnidadeRepo;
