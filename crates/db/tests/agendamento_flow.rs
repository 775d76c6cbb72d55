//! Integration tests for the appointment lifecycle.
//!
//! Exercises the repository layer against a real database:
//! - creation with commit-time slot re-check
//! - the confirm / reschedule / cancel / conclude transitions
//! - compare-and-swap semantics under stale snapshots and true concurrency
//! - exactly one history row per transition

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use navalha_core::types::Timestamp;
use sqlx::PgPool;

use navalha_db::models::agendamento::{Agendamento, CriarAgendamento};
use navalha_db::models::profissional::CriarProfissional;
use navalha_db::models::servico::CriarServico;
use navalha_db::models::status::AgendamentoStatus;
use navalha_db::models::unidade::{CriarConfiguracaoUnidade, CriarUnidade};
use navalha_db::repositories::{
    AgendamentoRepo, HistoricoRepo, ProfissionalRepo, ResultadoCriacao, ResultadoReagendamento,
    ServicoRepo, UnidadeRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Cenario {
    unidade_id: i64,
    profissional_id: i64,
    servico: navalha_db::models::servico::Servico,
}

async fn seed(pool: &PgPool) -> Cenario {
    let unidade = UnidadeRepo::criar(
        pool,
        &CriarUnidade {
            nome: "Barbearia Central".to_string(),
            slug: "central".to_string(),
        },
        &CriarConfiguracaoUnidade {
            antecedencia_minima_horas: Some(24),
            max_reagendamentos: Some(2),
            permite_cancelamento: Some(true),
            horario_limite_cancelamento: Some(2),
            agendamento_publico_ativo: Some(true),
            duracao_slot_minutos: Some(30),
            nome_publico: None,
            mensagem_boas_vindas: None,
        },
    )
    .await
    .unwrap();

    let profissional = ProfissionalRepo::criar(
        pool,
        unidade.id,
        &CriarProfissional {
            nome: "Rafael".to_string(),
        },
    )
    .await
    .unwrap();

    let servico = ServicoRepo::criar(
        pool,
        unidade.id,
        &CriarServico {
            nome: "Corte masculino".to_string(),
            duracao_minutos: 30,
            preco_centavos: 5000,
        },
    )
    .await
    .unwrap();

    Cenario {
        unidade_id: unidade.id,
        profissional_id: profissional.id,
        servico,
    }
}

fn pedido(cenario: &Cenario, data_hora: Timestamp) -> CriarAgendamento {
    CriarAgendamento {
        profissional_id: cenario.profissional_id,
        servico_id: cenario.servico.id,
        cliente_nome: "Ana Souza".to_string(),
        cliente_telefone: Some("+5511999990000".to_string()),
        cliente_email: None,
        data_hora,
        observacoes: None,
    }
}

async fn criar_ok(pool: &PgPool, cenario: &Cenario, data_hora: Timestamp) -> Agendamento {
    match AgendamentoRepo::criar(
        pool,
        cenario.unidade_id,
        &pedido(cenario, data_hora),
        &cenario.servico,
        "publico",
        Some("cliente"),
    )
    .await
    .unwrap()
    {
        ResultadoCriacao::Criado(agendamento) => agendamento,
        ResultadoCriacao::SlotOcupado => panic!("slot should be free"),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn criar_copia_duracao_e_preco_do_servico(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;
    assert_eq!(agendamento.status_id, AgendamentoStatus::Pendente.id());
    assert_eq!(agendamento.duracao_minutos, 30);
    assert_eq!(agendamento.preco_centavos, 5000);
    assert_eq!(agendamento.reagendamentos_count, 0);
    assert_eq!(agendamento.origem, "publico");
    assert_eq!(agendamento.token.len(), 48);

    // Catalogue edits must not retrofit the copy.
    sqlx::query("UPDATE servicos SET duracao_minutos = 60, preco_centavos = 9000 WHERE id = $1")
        .bind(cenario.servico.id)
        .execute(&pool)
        .await
        .unwrap();
    let recarregado = AgendamentoRepo::find_by_id(&pool, agendamento.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recarregado.duracao_minutos, 30);
    assert_eq!(recarregado.preco_centavos, 5000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn criar_recusa_slot_sobreposto(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    criar_ok(&pool, &cenario, inicio).await;

    // Overlapping by 15 minutes: rejected at commit time.
    let resultado = AgendamentoRepo::criar(
        &pool,
        cenario.unidade_id,
        &pedido(&cenario, inicio + Duration::minutes(15)),
        &cenario.servico,
        "publico",
        None,
    )
    .await
    .unwrap();
    assert_matches!(resultado, ResultadoCriacao::SlotOcupado);

    // Back-to-back is fine: [inicio+30, inicio+60) does not overlap.
    let resultado = AgendamentoRepo::criar(
        &pool,
        cenario.unidade_id,
        &pedido(&cenario, inicio + Duration::minutes(30)),
        &cenario.servico,
        "publico",
        None,
    )
    .await
    .unwrap();
    assert_matches!(resultado, ResultadoCriacao::Criado(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn slot_de_agendamento_cancelado_fica_livre(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;
    AgendamentoRepo::cancelar(&pool, &agendamento, None, None)
        .await
        .unwrap()
        .expect("cancel should succeed");

    let resultado = AgendamentoRepo::criar(
        &pool,
        cenario.unidade_id,
        &pedido(&cenario, inicio),
        &cenario.servico,
        "publico",
        None,
    )
    .await
    .unwrap();
    assert_matches!(resultado, ResultadoCriacao::Criado(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tokens_sao_unicos_por_agendamento(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let primeiro = criar_ok(&pool, &cenario, inicio).await;
    let segundo = criar_ok(&pool, &cenario, inicio + Duration::hours(2)).await;
    assert_ne!(primeiro.token, segundo.token);
}

// ---------------------------------------------------------------------------
// Forward path: pendente -> confirmado -> concluido
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn fluxo_confirmar_e_concluir(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;

    let confirmado = AgendamentoRepo::confirmar(&pool, &agendamento, Some("equipe"))
        .await
        .unwrap()
        .expect("pendente -> confirmado");
    assert_eq!(confirmado.status_id, AgendamentoStatus::Confirmado.id());

    let concluido = AgendamentoRepo::concluir(&pool, &confirmado, Some("equipe"))
        .await
        .unwrap()
        .expect("confirmado -> concluido");
    assert_eq!(concluido.status_id, AgendamentoStatus::Concluido.id());

    // Terminal: no further transitions.
    let cancelamento = AgendamentoRepo::cancelar(&pool, &concluido, None, None)
        .await
        .unwrap();
    assert!(cancelamento.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirmar_duas_vezes_perde_na_segunda(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;

    AgendamentoRepo::confirmar(&pool, &agendamento, None)
        .await
        .unwrap()
        .expect("first confirm wins");

    // Same stale snapshot: the CAS must miss.
    let segunda = AgendamentoRepo::confirmar(&pool, &agendamento, None)
        .await
        .unwrap();
    assert!(segunda.is_none());
}

// ---------------------------------------------------------------------------
// Reschedule
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reagendar_volta_para_pendente_e_consome_orcamento(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;
    let confirmado = AgendamentoRepo::confirmar(&pool, &agendamento, None)
        .await
        .unwrap()
        .unwrap();

    let novo_inicio = inicio + Duration::hours(24);
    let resultado = AgendamentoRepo::reagendar(&pool, &confirmado, novo_inicio, Some("cliente"))
        .await
        .unwrap();

    let reagendado = match resultado {
        ResultadoReagendamento::Reagendado(agendamento) => agendamento,
        other => panic!("expected Reagendado, got {other:?}"),
    };
    assert_eq!(reagendado.status_id, AgendamentoStatus::Pendente.id());
    assert_eq!(reagendado.reagendamentos_count, 1);
    assert_eq!(reagendado.data_hora, novo_inicio);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reagendar_com_snapshot_obsoleto_da_conflito(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;

    let primeiro = AgendamentoRepo::reagendar(
        &pool,
        &agendamento,
        inicio + Duration::hours(24),
        None,
    )
    .await
    .unwrap();
    assert_matches!(primeiro, ResultadoReagendamento::Reagendado(_));

    // The counter moved on; the stale snapshot must lose.
    let segundo = AgendamentoRepo::reagendar(
        &pool,
        &agendamento,
        inicio + Duration::hours(30),
        None,
    )
    .await
    .unwrap();
    assert_matches!(segundo, ResultadoReagendamento::Conflito);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reagendamentos_concorrentes_tem_um_vencedor(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;

    let (a, b) = tokio::join!(
        AgendamentoRepo::reagendar(&pool, &agendamento, inicio + Duration::hours(24), None),
        AgendamentoRepo::reagendar(&pool, &agendamento, inicio + Duration::hours(30), None),
    );

    let resultados = [a.unwrap(), b.unwrap()];
    let vencedores = resultados
        .iter()
        .filter(|r| matches!(r, ResultadoReagendamento::Reagendado(_)))
        .count();
    let conflitos = resultados
        .iter()
        .filter(|r| matches!(r, ResultadoReagendamento::Conflito))
        .count();
    assert_eq!(vencedores, 1, "exactly one reschedule must win");
    assert_eq!(conflitos, 1, "the loser must see a conflict");

    let recarregado = AgendamentoRepo::find_by_id(&pool, agendamento.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recarregado.reagendamentos_count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reagendar_para_slot_ocupado_e_recusado(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);
    let outro_inicio = Utc::now() + Duration::hours(72);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;
    criar_ok(&pool, &cenario, outro_inicio).await;

    let resultado = AgendamentoRepo::reagendar(&pool, &agendamento, outro_inicio, None)
        .await
        .unwrap();
    assert_matches!(resultado, ResultadoReagendamento::SlotOcupado);

    // The original appointment is untouched.
    let recarregado = AgendamentoRepo::find_by_id(&pool, agendamento.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recarregado.data_hora, agendamento.data_hora);
    assert_eq!(recarregado.reagendamentos_count, 0);
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cada_transicao_gera_exatamente_uma_entrada_de_historico(pool: PgPool) {
    let cenario = seed(&pool).await;
    let inicio = Utc::now() + Duration::hours(48);

    let agendamento = criar_ok(&pool, &cenario, inicio).await;
    let confirmado = AgendamentoRepo::confirmar(&pool, &agendamento, Some("equipe"))
        .await
        .unwrap()
        .unwrap();
    let resultado = AgendamentoRepo::reagendar(
        &pool,
        &confirmado,
        inicio + Duration::hours(24),
        Some("cliente"),
    )
    .await
    .unwrap();
    let reagendado = match resultado {
        ResultadoReagendamento::Reagendado(agendamento) => agendamento,
        other => panic!("expected Reagendado, got {other:?}"),
    };
    AgendamentoRepo::cancelar(&pool, &reagendado, Some("imprevisto"), Some("cliente"))
        .await
        .unwrap()
        .unwrap();

    let historico = HistoricoRepo::listar_por_agendamento(&pool, agendamento.id)
        .await
        .unwrap();
    let acoes: Vec<&str> = historico.iter().map(|h| h.acao.as_str()).collect();
    assert_eq!(acoes, ["criado", "confirmado", "reagendado", "cancelado"]);

    // The reschedule row captures both timestamps and statuses.
    let linha = &historico[2];
    assert_eq!(linha.data_hora_anterior, Some(confirmado.data_hora));
    assert_eq!(linha.data_hora_nova, Some(reagendado.data_hora));
    assert_eq!(linha.status_anterior, Some(AgendamentoStatus::Confirmado.id()));
    assert_eq!(linha.status_novo, Some(AgendamentoStatus::Pendente.id()));

    // The cancel row keeps the reason.
    assert_eq!(historico[3].motivo.as_deref(), Some("imprevisto"));
}
