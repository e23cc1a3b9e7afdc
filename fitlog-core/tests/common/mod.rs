use fitlog::SqlitePool;
use fitlog::db::models::Treino;
use fitlog::db::operations::{create_exercicio, create_treino, create_user};

pub async fn test_pool() -> SqlitePool {
    fitlog::db::connect_in_memory()
        .await
        .expect("in-memory database")
}

pub async fn test_user(pool: &SqlitePool) -> i64 {
    create_user(pool, "tester").await.expect("test user").id
}

/// A workout with `count` exercises attached as its defaults.
pub async fn workout_with_exercises(
    pool: &SqlitePool,
    user_id: i64,
    codigo: &str,
    count: usize,
) -> (Treino, Vec<i64>) {
    let treino = create_treino(
        pool,
        user_id,
        codigo,
        &format!("Treino {codigo}"),
        "test workout",
    )
    .await
    .expect("workout");

    let mut exercicios = Vec::with_capacity(count);
    for i in 0..count {
        let ex = create_exercicio(
            pool,
            user_id,
            &format!("Exercicio {codigo}{i}"),
            "",
            None,
            Some(treino.id),
        )
        .await
        .expect("exercise");
        exercicios.push(ex.id);
    }
    (treino, exercicios)
}
