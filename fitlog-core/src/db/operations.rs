//! Entity CRUD over the backing store. Everything except muscles is
//! scoped to a single user and every query filters on `user_id`.

use log::{info, warn};
use sqlx::SqlitePool;

use crate::catalog::ExerciseCatalog;
use crate::db::models::{Exercicio, Musculo, Treino, User};
use crate::error::{Error, Result};
use crate::validate::validate_codigo;

// Users

pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::Validation("username must not be empty".into()));
    }
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username) VALUES (?1) RETURNING *",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;
    info!("User '{}' created with id {}", user.username, user.id);
    Ok(user)
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user '{username}'")))
}

// Treinos

pub async fn create_treino(
    pool: &SqlitePool,
    user_id: i64,
    codigo: &str,
    nome: &str,
    descricao: &str,
) -> Result<Treino> {
    let codigo = validate_codigo(codigo)?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM treinos WHERE user_id = ?1 AND codigo = ?2",
    )
    .bind(user_id)
    .bind(&codigo)
    .fetch_one(pool)
    .await?;
    if existing > 0 {
        return Err(Error::Conflict(format!(
            "workout '{codigo}' already exists for this user"
        )));
    }

    let treino = sqlx::query_as::<_, Treino>(
        "INSERT INTO treinos (user_id, codigo, nome, descricao)
         VALUES (?1, ?2, ?3, ?4) RETURNING *",
    )
    .bind(user_id)
    .bind(&codigo)
    .bind(nome)
    .bind(descricao)
    .fetch_one(pool)
    .await?;
    info!("Workout {} created for user {}", codigo, user_id);
    Ok(treino)
}

pub async fn get_treino(pool: &SqlitePool, user_id: i64, treino_id: i64) -> Result<Treino> {
    sqlx::query_as::<_, Treino>("SELECT * FROM treinos WHERE id = ?1 AND user_id = ?2")
        .bind(treino_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("workout {treino_id}")))
}

pub async fn get_treino_by_codigo(
    pool: &SqlitePool,
    user_id: i64,
    codigo: &str,
) -> Result<Treino> {
    let codigo = validate_codigo(codigo)?;
    sqlx::query_as::<_, Treino>("SELECT * FROM treinos WHERE user_id = ?1 AND codigo = ?2")
        .bind(user_id)
        .bind(&codigo)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("workout '{codigo}'")))
}

pub async fn list_treinos(pool: &SqlitePool, user_id: i64) -> Result<Vec<Treino>> {
    sqlx::query_as::<_, Treino>("SELECT * FROM treinos WHERE user_id = ?1 ORDER BY codigo")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn update_treino(
    pool: &SqlitePool,
    user_id: i64,
    treino_id: i64,
    nome: Option<&str>,
    descricao: Option<&str>,
) -> Result<Treino> {
    let treino = get_treino(pool, user_id, treino_id).await?;
    let nome = nome.unwrap_or(&treino.nome);
    let descricao = descricao.unwrap_or(&treino.descricao);

    sqlx::query_as::<_, Treino>(
        "UPDATE treinos SET nome = ?1, descricao = ?2 WHERE id = ?3 RETURNING *",
    )
    .bind(nome)
    .bind(descricao)
    .bind(treino_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Deletes a workout. Cascades to its version entries and session
/// records; home-workout references on exercises are nulled out.
pub async fn delete_treino(pool: &SqlitePool, user_id: i64, treino_id: i64) -> Result<()> {
    let treino = get_treino(pool, user_id, treino_id).await?;
    sqlx::query("DELETE FROM treinos WHERE id = ?1")
        .bind(treino_id)
        .execute(pool)
        .await?;
    info!("Workout {} deleted for user {}", treino.codigo, user_id);
    Ok(())
}

// Musculos

/// Muscles are deduplicated by their lowercase key and shared by all
/// users.
pub async fn get_or_create_musculo(pool: &SqlitePool, nome_exibicao: &str) -> Result<Musculo> {
    let nome = nome_exibicao.trim().to_lowercase();
    if nome.is_empty() {
        return Err(Error::Validation("muscle name must not be empty".into()));
    }

    if let Some(musculo) =
        sqlx::query_as::<_, Musculo>("SELECT * FROM musculos WHERE nome = ?1")
            .bind(&nome)
            .fetch_optional(pool)
            .await?
    {
        return Ok(musculo);
    }

    sqlx::query_as::<_, Musculo>(
        "INSERT INTO musculos (nome, nome_exibicao) VALUES (?1, ?2) RETURNING *",
    )
    .bind(&nome)
    .bind(nome_exibicao.trim())
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

pub async fn list_musculos(pool: &SqlitePool) -> Result<Vec<Musculo>> {
    sqlx::query_as::<_, Musculo>("SELECT * FROM musculos ORDER BY nome_exibicao")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

// Exercicios

pub async fn create_exercicio(
    pool: &SqlitePool,
    user_id: i64,
    nome: &str,
    descricao: &str,
    musculo_id: Option<i64>,
    treino_id: Option<i64>,
) -> Result<Exercicio> {
    let nome = nome.trim();
    if nome.is_empty() {
        return Err(Error::Validation("exercise name must not be empty".into()));
    }
    if let Some(treino_id) = treino_id {
        get_treino(pool, user_id, treino_id).await?;
    }

    sqlx::query_as::<_, Exercicio>(
        "INSERT INTO exercicios (user_id, nome, descricao, musculo_id, treino_id)
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
    )
    .bind(user_id)
    .bind(nome)
    .bind(descricao)
    .bind(musculo_id)
    .bind(treino_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Creates an exercise, inferring the muscle group from the catalog when
/// none was given explicitly.
pub async fn create_exercicio_with_catalog(
    pool: &SqlitePool,
    catalog: &ExerciseCatalog,
    user_id: i64,
    nome: &str,
    descricao: &str,
    treino_id: Option<i64>,
) -> Result<Exercicio> {
    let musculo_id = match catalog.find_primary_muscle(nome)? {
        Some(nome_musculo) => Some(get_or_create_musculo(pool, &nome_musculo).await?.id),
        None => {
            warn!("No catalog muscle found for exercise '{}'", nome);
            None
        }
    };
    create_exercicio(pool, user_id, nome, descricao, musculo_id, treino_id).await
}

pub async fn get_exercicio(
    pool: &SqlitePool,
    user_id: i64,
    exercicio_id: i64,
) -> Result<Exercicio> {
    sqlx::query_as::<_, Exercicio>("SELECT * FROM exercicios WHERE id = ?1 AND user_id = ?2")
        .bind(exercicio_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("exercise {exercicio_id}")))
}

pub async fn list_exercicios(pool: &SqlitePool, user_id: i64) -> Result<Vec<Exercicio>> {
    sqlx::query_as::<_, Exercicio>("SELECT * FROM exercicios WHERE user_id = ?1 ORDER BY nome")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

/// Exercises defaulting to a given home workout, in creation order.
pub async fn list_exercicios_do_treino(
    pool: &SqlitePool,
    user_id: i64,
    treino_id: i64,
) -> Result<Vec<Exercicio>> {
    sqlx::query_as::<_, Exercicio>(
        "SELECT * FROM exercicios WHERE user_id = ?1 AND treino_id = ?2 ORDER BY id",
    )
    .bind(user_id)
    .bind(treino_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn delete_exercicio(pool: &SqlitePool, user_id: i64, exercicio_id: i64) -> Result<()> {
    get_exercicio(pool, user_id, exercicio_id).await?;
    sqlx::query("DELETE FROM exercicios WHERE id = ?1")
        .bind(exercicio_id)
        .execute(pool)
        .await?;
    Ok(())
}
