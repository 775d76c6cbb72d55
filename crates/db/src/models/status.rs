//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Appointment lifecycle status (`agendamento_statuses` seed data).
    AgendamentoStatus {
        Pendente = 1,
        Confirmado = 2,
        Concluido = 3,
        Cancelado = 4,
    }
}

define_status_enum! {
    /// Waitlist entry status (`lista_espera_statuses` seed data).
    ListaEsperaStatus {
        Aguardando = 1,
        Contatado = 2,
        Agendado = 3,
        Cancelado = 4,
    }
}

define_status_enum! {
    /// Notification delivery status (`entrega_statuses` seed data).
    EntregaStatus {
        Pendente = 1,
        Enviado = 2,
        Falha = 3,
    }
}

define_status_enum! {
    /// Waitlist priority tier (CHECK-constrained SMALLINT, not a lookup table).
    PrioridadeListaEspera {
        Baixa = 1,
        Media = 2,
        Alta = 3,
    }
}

impl AgendamentoStatus {
    /// Human-readable name matching the seed data.
    pub fn nome(self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Confirmado => "confirmado",
            Self::Concluido => "concluido",
            Self::Cancelado => "cancelado",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agendamento_status_ids_match_seed_data() {
        assert_eq!(AgendamentoStatus::Pendente.id(), 1);
        assert_eq!(AgendamentoStatus::Confirmado.id(), 2);
        assert_eq!(AgendamentoStatus::Concluido.id(), 3);
        assert_eq!(AgendamentoStatus::Cancelado.id(), 4);
    }

    #[test]
    fn lista_espera_status_ids_match_seed_data() {
        assert_eq!(ListaEsperaStatus::Aguardando.id(), 1);
        assert_eq!(ListaEsperaStatus::Contatado.id(), 2);
        assert_eq!(ListaEsperaStatus::Agendado.id(), 3);
        assert_eq!(ListaEsperaStatus::Cancelado.id(), 4);
    }

    #[test]
    fn entrega_status_ids_match_seed_data() {
        assert_eq!(EntregaStatus::Pendente.id(), 1);
        assert_eq!(EntregaStatus::Enviado.id(), 2);
        assert_eq!(EntregaStatus::Falha.id(), 3);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = AgendamentoStatus::Pendente.into();
        assert_eq!(id, 1);
    }

    #[test]
    fn nomes_seguem_seed_data() {
        assert_eq!(AgendamentoStatus::Concluido.nome(), "concluido");
        assert_eq!(AgendamentoStatus::Cancelado.nome(), "cancelado");
    }
}
