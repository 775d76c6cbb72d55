//! Smoke tests for migrations and seed data.

use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn migrations_seed_status_tables(pool: PgPool) {
    let agendamento: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agendamento_statuses")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(agendamento, 4);

    let entrega: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entrega_statuses")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entrega, 3);

    let lista: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lista_espera_statuses")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lista, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seed_names_match_enum_discriminants(pool: PgPool) {
    let nomes: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, nome FROM agendamento_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        nomes,
        vec![
            (1, "pendente".to_string()),
            (2, "confirmado".to_string()),
            (3, "concluido".to_string()),
            (4, "cancelado".to_string()),
        ]
    );
}
