//! End-to-end tests for the public token endpoint contract, driven through
//! the full router (middleware included).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use navalha_api::config::ServerConfig;
use navalha_api::router::build_app_router;
use navalha_api::state::AppState;
use navalha_db::models::agendamento::{Agendamento, CriarAgendamento};
use navalha_db::models::profissional::CriarProfissional;
use navalha_db::models::servico::CriarServico;
use navalha_db::models::unidade::{CriarConfiguracaoUnidade, CriarUnidade};
use navalha_db::repositories::{
    AgendamentoRepo, ProfissionalRepo, ResultadoCriacao, ServicoRepo, UnidadeRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app(pool: PgPool) -> axum::Router {
    let config = ServerConfig::default();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(navalha_events::EventBus::default()),
    };
    build_app_router(state, &config)
}

async fn seed_agendamento(pool: &PgPool, horas_ate_inicio: i64) -> Agendamento {
    let unidade = UnidadeRepo::criar(
        pool,
        &CriarUnidade {
            nome: "Barbearia do Teste".to_string(),
            slug: format!("teste-{horas_ate_inicio}"),
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
            nome: "Léo".to_string(),
        },
    )
    .await
    .unwrap();
    let servico = ServicoRepo::criar(
        pool,
        unidade.id,
        &CriarServico {
            nome: "Corte".to_string(),
            duracao_minutos: 30,
            preco_centavos: 5000,
        },
    )
    .await
    .unwrap();

    let pedido = CriarAgendamento {
        profissional_id: profissional.id,
        servico_id: servico.id,
        cliente_nome: "Ana Souza".to_string(),
        cliente_telefone: None,
        cliente_email: None,
        data_hora: Utc::now() + Duration::hours(horas_ate_inicio),
        observacoes: None,
    };
    match AgendamentoRepo::criar(pool, unidade.id, &pedido, &servico, "publico", None)
        .await
        .unwrap()
    {
        ResultadoCriacao::Criado(agendamento) => agendamento,
        ResultadoCriacao::SlotOcupado => panic!("slot should be free"),
    }
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Resolution contract
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_valido_resolve_com_permissoes(pool: PgPool) {
    let agendamento = seed_agendamento(&pool, 36).await;

    let (status, body) = post_json(
        app(pool),
        "/api/v1/public/token",
        serde_json::json!({ "token": agendamento.token }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pode_reagendar"], true);
    assert_eq!(body["pode_cancelar"], true);
    assert_eq!(body["agendamento"]["id"], agendamento.id);
    assert_eq!(body["agendamento"]["status"], "pendente");
    // The joined context rides inside the appointment object.
    assert!(body["agendamento"]["unidade"]["nome"].is_string());
    assert!(body["agendamento"]["profissional"]["nome"].is_string());
    assert!(body["agendamento"]["servico"]["nome"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pouca_antecedencia_bloqueia_apenas_reagendamento(pool: PgPool) {
    let agendamento = seed_agendamento(&pool, 10).await;

    let (status, body) = post_json(
        app(pool),
        "/api/v1/public/token",
        serde_json::json!({ "token": agendamento.token }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pode_reagendar"], false);
    assert_eq!(body["pode_cancelar"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_desconhecido_responde_400_com_erro(pool: PgPool) {
    let (status, body) = post_json(
        app(pool),
        "/api/v1/public/token",
        serde_json::json!({ "token": "nao-existe" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_ausente_responde_400(pool: PgPool) {
    let (status, body) = post_json(app(pool), "/api/v1/public/token", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ---------------------------------------------------------------------------
// Mutation guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reagendar_abaixo_da_antecedencia_e_forbidden_com_motivo(pool: PgPool) {
    let agendamento = seed_agendamento(&pool, 10).await;

    let (status, body) = post_json(
        app(pool),
        "/api/v1/public/token/reagendar",
        serde_json::json!({
            "token": agendamento.token,
            "nova_data_hora": Utc::now() + Duration::hours(72),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["motivo"], "antecedencia_insuficiente");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelar_agendamento_cancelado_e_forbidden_terminal(pool: PgPool) {
    let agendamento = seed_agendamento(&pool, 36).await;
    AgendamentoRepo::cancelar(&pool, &agendamento, None, None)
        .await
        .unwrap()
        .unwrap();

    let (status, body) = post_json(
        app(pool),
        "/api/v1/public/token/cancelar",
        serde_json::json!({ "token": agendamento.token }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["motivo"], "status_terminal");
}

// ---------------------------------------------------------------------------
// Surface plumbing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn preflight_options_responde_200_vazio(pool: PgPool) {
    let response = app(pool)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/public/token")
                .header(header::ORIGIN, "https://exemplo.com.br")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_responde_ok(pool: PgPool) {
    let response = app(pool)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
