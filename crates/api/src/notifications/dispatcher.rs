//! Event-to-notification dispatch engine.
//!
//! [`NotificationDispatcher`] subscribes to the booking event bus and, for
//! each event, picks a delivery channel from the appointment's contact
//! fields (WhatsApp when a phone is present, email otherwise), attempts
//! delivery and settles the outcome into `logs_notificacao`.
//!
//! Dispatch is strictly fire-and-forget with respect to the transition that
//! produced the event: a channel failure is downgraded to a `falha` log row
//! and a warning — it never reaches the caller of the state transition.
//! Retrying failed rows is an external process's job.

use navalha_core::channels::{CANAL_EMAIL, CANAL_WHATSAPP};
use navalha_core::historico::ACAO_NOTIFICADO;
use navalha_db::models::agendamento::Agendamento;
use navalha_db::models::historico::NovoHistorico;
use navalha_db::repositories::{AgendamentoRepo, HistoricoRepo, NotificacaoRepo};
use navalha_db::DbPool;
use navalha_events::bus::tipos;
use navalha_events::{BookingEvent, EmailConfig, EmailDelivery, WhatsAppConfig, WhatsAppDelivery};
use tokio::sync::broadcast;

/// Routes booking events to notification channels.
pub struct NotificationDispatcher {
    pool: DbPool,
    whatsapp: Option<WhatsAppDelivery>,
    email: Option<EmailDelivery>,
}

impl NotificationDispatcher {
    /// Create a dispatcher, wiring whichever channels are configured in the
    /// environment. With no channel configured the dispatcher still runs and
    /// records `falha` rows, keeping the accounting complete.
    pub fn new(pool: DbPool) -> Self {
        let whatsapp = WhatsAppConfig::from_env().map(WhatsAppDelivery::new);
        let email = EmailConfig::from_env().map(EmailDelivery::new);

        if whatsapp.is_none() {
            tracing::info!("WHATSAPP_API_URL not set, WhatsApp channel disabled");
        }
        if email.is_none() {
            tracing::info!("SMTP_HOST not set, email channel disabled");
        }

        Self {
            pool,
            whatsapp,
            email,
        }
    }

    /// Run the main dispatch loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](navalha_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<BookingEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.dispatch(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to dispatch notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Dispatch a single event.
    ///
    /// Only bookkeeping errors (the log/history writes) propagate; channel
    /// failures are settled as `falha` rows right here.
    async fn dispatch(&self, event: &BookingEvent) -> Result<(), sqlx::Error> {
        let Some(agendamento) =
            AgendamentoRepo::find_by_id(&self.pool, event.agendamento_id).await?
        else {
            tracing::warn!(
                agendamento_id = event.agendamento_id,
                "Event references unknown appointment, skipping"
            );
            return Ok(());
        };

        let Some((canal, destinatario)) = canal_preferido(&agendamento) else {
            tracing::debug!(
                agendamento_id = agendamento.id,
                "Appointment has no contact fields, nothing to notify"
            );
            return Ok(());
        };

        let log =
            NotificacaoRepo::registrar(&self.pool, agendamento.id, canal, &destinatario).await?;

        let mensagem = render_mensagem(event, &agendamento);
        let resultado = match canal {
            CANAL_WHATSAPP => match &self.whatsapp {
                Some(delivery) => delivery
                    .deliver(&destinatario, &mensagem, &event.payload)
                    .await
                    .map_err(|e| e.to_string()),
                None => Err("canal whatsapp não configurado".to_string()),
            },
            CANAL_EMAIL => match &self.email {
                Some(delivery) => delivery
                    .deliver(&destinatario, &assunto(event), &mensagem)
                    .await
                    .map_err(|e| e.to_string()),
                None => Err("canal email não configurado".to_string()),
            },
            other => Err(format!("canal desconhecido: {other}")),
        };

        match resultado {
            Ok(resposta) => {
                NotificacaoRepo::marcar_enviado(&self.pool, log.id, Some(&resposta)).await?;
                HistoricoRepo::registrar(
                    &self.pool,
                    agendamento.id,
                    &NovoHistorico {
                        acao: ACAO_NOTIFICADO,
                        motivo: Some(canal),
                        ..Default::default()
                    },
                )
                .await?;
            }
            Err(erro) => {
                // Delivery failure is downgraded to a log row; the transition
                // that triggered this event committed long ago.
                tracing::warn!(
                    agendamento_id = agendamento.id,
                    canal,
                    error = %erro,
                    "Notification delivery failed"
                );
                NotificacaoRepo::marcar_falha(&self.pool, log.id, Some(&erro)).await?;
            }
        }

        Ok(())
    }
}

/// Channel selection: WhatsApp when the client left a phone, email when only
/// an address is present, nothing otherwise.
fn canal_preferido(agendamento: &Agendamento) -> Option<(&'static str, String)> {
    if let Some(telefone) = &agendamento.cliente_telefone {
        return Some((CANAL_WHATSAPP, telefone.clone()));
    }
    if let Some(email) = &agendamento.cliente_email {
        return Some((CANAL_EMAIL, email.clone()));
    }
    None
}

fn assunto(event: &BookingEvent) -> String {
    match event.event_type.as_str() {
        tipos::AGENDAMENTO_CRIADO => "Agendamento recebido".to_string(),
        tipos::AGENDAMENTO_CONFIRMADO => "Agendamento confirmado".to_string(),
        tipos::AGENDAMENTO_REAGENDADO => "Agendamento reagendado".to_string(),
        tipos::AGENDAMENTO_CANCELADO => "Agendamento cancelado".to_string(),
        tipos::AGENDAMENTO_CONCLUIDO => "Até a próxima!".to_string(),
        other => format!("Atualização do agendamento ({other})"),
    }
}

fn render_mensagem(event: &BookingEvent, agendamento: &Agendamento) -> String {
    let quando = agendamento
        .data_hora
        .format("%d/%m/%Y às %H:%M")
        .to_string();
    match event.event_type.as_str() {
        tipos::AGENDAMENTO_CRIADO => format!(
            "Olá {}! Recebemos seu agendamento para {quando}. Você receberá uma confirmação em breve.",
            agendamento.cliente_nome
        ),
        tipos::AGENDAMENTO_CONFIRMADO => format!(
            "Olá {}! Seu agendamento para {quando} está confirmado.",
            agendamento.cliente_nome
        ),
        tipos::AGENDAMENTO_REAGENDADO => format!(
            "Olá {}! Seu agendamento foi reagendado para {quando}.",
            agendamento.cliente_nome
        ),
        tipos::AGENDAMENTO_CANCELADO => format!(
            "Olá {}! Seu agendamento de {quando} foi cancelado.",
            agendamento.cliente_nome
        ),
        tipos::AGENDAMENTO_CONCLUIDO => format!(
            "Obrigado pela visita, {}! Esperamos você na próxima.",
            agendamento.cliente_nome
        ),
        _ => format!(
            "Olá {}! Há uma atualização no seu agendamento de {quando}.",
            agendamento.cliente_nome
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use navalha_db::models::status::AgendamentoStatus;

    fn agendamento_teste(telefone: Option<&str>, email: Option<&str>) -> Agendamento {
        let ts = Utc.with_ymd_and_hms(2026, 3, 12, 14, 30, 0).unwrap();
        Agendamento {
            id: 1,
            unidade_id: 1,
            profissional_id: 1,
            servico_id: 1,
            cliente_nome: "Ana".to_string(),
            cliente_telefone: telefone.map(String::from),
            cliente_email: email.map(String::from),
            data_hora: ts,
            duracao_minutos: 30,
            preco_centavos: 5000,
            status_id: AgendamentoStatus::Pendente.id(),
            observacoes: None,
            token: "t".repeat(48),
            reagendamentos_count: 0,
            origem: "publico".to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn telefone_prefere_whatsapp() {
        let ag = agendamento_teste(Some("+5511999990000"), Some("ana@example.com"));
        let (canal, destinatario) = canal_preferido(&ag).unwrap();
        assert_eq!(canal, CANAL_WHATSAPP);
        assert_eq!(destinatario, "+5511999990000");
    }

    #[test]
    fn sem_telefone_usa_email() {
        let ag = agendamento_teste(None, Some("ana@example.com"));
        let (canal, _) = canal_preferido(&ag).unwrap();
        assert_eq!(canal, CANAL_EMAIL);
    }

    #[test]
    fn sem_contato_nao_notifica() {
        let ag = agendamento_teste(None, None);
        assert!(canal_preferido(&ag).is_none());
    }

    #[test]
    fn mensagem_inclui_nome_e_horario() {
        let ag = agendamento_teste(Some("+55"), None);
        let event = BookingEvent::new(tipos::AGENDAMENTO_CONFIRMADO, ag.id, ag.unidade_id);
        let msg = render_mensagem(&event, &ag);
        assert!(msg.contains("Ana"));
        assert!(msg.contains("12/03/2026"));
        assert!(msg.contains("confirmado"));
    }
}
