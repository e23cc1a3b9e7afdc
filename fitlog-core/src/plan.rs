//! Plan structure store: which workouts a version contains, which
//! exercises each workout carries and in what order, plus the upgrade
//! path for the two historical on-disk plan shapes.

use std::collections::BTreeMap;

use log::info;
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;

use crate::db::models::{Exercicio, VersaoTreino};
use crate::db::operations::{get_exercicio, get_treino_by_codigo, list_exercicios_do_treino};
use crate::error::{Error, Result};
use crate::versions::get_version;

/// Where a freshly added workout-in-version gets its exercise list from.
#[derive(Debug, Clone)]
pub enum WorkoutSeed {
    /// No exercises; configure later.
    Empty,
    /// Copy the workout's current default exercise list.
    FromWorkout,
    /// Explicit ordered exercise ids.
    Exercises(Vec<i64>),
}

/// A workout as it appears inside one version, with its ordered exercise
/// ids resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanWorkout {
    pub treino_id: i64,
    pub codigo: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub exercicios: Vec<i64>,
}

async fn get_versao_treino(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
) -> Result<VersaoTreino> {
    get_version(pool, user_id, versao_id).await?;
    let treino = get_treino_by_codigo(pool, user_id, codigo).await?;
    sqlx::query_as::<_, VersaoTreino>(
        "SELECT * FROM versao_treinos WHERE versao_id = ?1 AND treino_id = ?2",
    )
    .bind(versao_id)
    .bind(treino.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("workout '{codigo}' in version {versao_id}")))
}

/// Adds a workout to a version. The code must belong to the version's
/// split letter set and must not already be present.
pub async fn add_workout(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
    nome: &str,
    descricao: Option<&str>,
    seed: WorkoutSeed,
) -> Result<VersaoTreino> {
    let versao = get_version(pool, user_id, versao_id).await?;
    let treino = get_treino_by_codigo(pool, user_id, codigo).await?;

    let split = versao.split()?;
    if !split.admits(&treino.codigo) {
        return Err(Error::Validation(format!(
            "workout '{}' is not part of the {} split",
            treino.codigo, split
        )));
    }

    let exercicio_ids = match seed {
        WorkoutSeed::Empty => Vec::new(),
        WorkoutSeed::FromWorkout => list_exercicios_do_treino(pool, user_id, treino.id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect(),
        WorkoutSeed::Exercises(ids) => {
            for exercicio_id in &ids {
                get_exercicio(pool, user_id, *exercicio_id).await?;
            }
            ids
        }
    };

    let mut tx = pool.begin().await?;

    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM versao_treinos WHERE versao_id = ?1 AND treino_id = ?2",
    )
    .bind(versao_id)
    .bind(treino.id)
    .fetch_one(&mut *tx)
    .await?;
    if exists > 0 {
        return Err(Error::Conflict(format!(
            "workout '{}' already exists in version {}",
            treino.codigo, versao.numero_versao
        )));
    }

    let ordem: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM versao_treinos WHERE versao_id = ?1")
            .bind(versao_id)
            .fetch_one(&mut *tx)
            .await?;

    let tv = sqlx::query_as::<_, VersaoTreino>(
        "INSERT INTO versao_treinos (versao_id, treino_id, nome_treino, descricao_treino, ordem)
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
    )
    .bind(versao_id)
    .bind(treino.id)
    .bind(nome)
    .bind(descricao)
    .bind(ordem)
    .fetch_one(&mut *tx)
    .await?;

    for (ordem, exercicio_id) in exercicio_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO versao_exercicios (versao_treino_id, exercicio_id, ordem)
             VALUES (?1, ?2, ?3)",
        )
        .bind(tv.id)
        .bind(exercicio_id)
        .bind(ordem as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        "Workout '{}' added to version {} for user {}",
        treino.codigo, versao.numero_versao, user_id
    );
    Ok(tv)
}

/// Partial update of a workout-in-version. Supplying `exercicios` fully
/// replaces the ordered exercise list, it is not a merge.
pub async fn edit_workout(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
    nome: Option<&str>,
    descricao: Option<&str>,
    exercicios: Option<&[i64]>,
) -> Result<()> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;
    if let Some(ids) = exercicios {
        for exercicio_id in ids {
            get_exercicio(pool, user_id, *exercicio_id).await?;
        }
    }

    let mut tx = pool.begin().await?;

    let nome = nome.unwrap_or(&tv.nome_treino);
    let descricao = match descricao {
        Some(d) => Some(d.to_string()),
        None => tv.descricao_treino.clone(),
    };
    sqlx::query("UPDATE versao_treinos SET nome_treino = ?1, descricao_treino = ?2 WHERE id = ?3")
        .bind(nome)
        .bind(descricao)
        .bind(tv.id)
        .execute(&mut *tx)
        .await?;

    if let Some(ids) = exercicios {
        sqlx::query("DELETE FROM versao_exercicios WHERE versao_treino_id = ?1")
            .bind(tv.id)
            .execute(&mut *tx)
            .await?;
        for (ordem, exercicio_id) in ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO versao_exercicios (versao_treino_id, exercicio_id, ordem)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(tv.id)
            .bind(exercicio_id)
            .bind(ordem as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn remove_workout(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
) -> Result<()> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;
    sqlx::query("DELETE FROM versao_treinos WHERE id = ?1")
        .bind(tv.id)
        .execute(pool)
        .await?;
    info!("Workout '{}' removed from version {}", codigo, versao_id);
    Ok(())
}

/// Appends an exercise to a workout-in-version. Already present is a
/// no-op, not an error.
pub async fn add_exercise_to_workout(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
    exercicio_id: i64,
) -> Result<()> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;
    get_exercicio(pool, user_id, exercicio_id).await?;

    let mut tx = pool.begin().await?;

    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM versao_exercicios
         WHERE versao_treino_id = ?1 AND exercicio_id = ?2",
    )
    .bind(tv.id)
    .bind(exercicio_id)
    .fetch_one(&mut *tx)
    .await?;
    if exists > 0 {
        return Ok(());
    }

    let ordem: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM versao_exercicios WHERE versao_treino_id = ?1",
    )
    .bind(tv.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO versao_exercicios (versao_treino_id, exercicio_id, ordem)
         VALUES (?1, ?2, ?3)",
    )
    .bind(tv.id)
    .bind(exercicio_id)
    .bind(ordem)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn remove_exercise_from_workout(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
    exercicio_id: i64,
) -> Result<()> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;
    let removed = sqlx::query(
        "DELETE FROM versao_exercicios WHERE versao_treino_id = ?1 AND exercicio_id = ?2",
    )
    .bind(tv.id)
    .bind(exercicio_id)
    .execute(pool)
    .await?;
    if removed.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "exercise {exercicio_id} in workout '{codigo}'"
        )));
    }
    Ok(())
}

/// Rewrites exercise order to match the given list. Ids not in the
/// workout are ignored. Partial lists are accepted: members left out
/// keep their old order value, and reads sort by (ordem, id), so an
/// omitted member whose old value ties with a reassigned one falls back
/// to insertion id.
pub async fn reorder_exercises(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
    ordered_ids: &[i64],
) -> Result<()> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;

    let mut tx = pool.begin().await?;
    for (ordem, exercicio_id) in ordered_ids.iter().enumerate() {
        sqlx::query(
            "UPDATE versao_exercicios SET ordem = ?1
             WHERE versao_treino_id = ?2 AND exercicio_id = ?3",
        )
        .bind(ordem as i64)
        .bind(tv.id)
        .bind(exercicio_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// The version's workouts keyed by code, with ordered exercise ids.
/// This is the canonical nested plan shape.
pub async fn get_workouts(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
) -> Result<BTreeMap<String, PlanWorkout>> {
    get_version(pool, user_id, versao_id).await?;

    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        treino_id: i64,
        codigo: String,
        nome_treino: String,
        descricao_treino: Option<String>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT vt.id, vt.treino_id, t.codigo, vt.nome_treino, vt.descricao_treino
         FROM versao_treinos vt
         JOIN treinos t ON t.id = vt.treino_id
         WHERE vt.versao_id = ?1
         ORDER BY vt.ordem, vt.id",
    )
    .bind(versao_id)
    .fetch_all(pool)
    .await?;

    let mut resultado = BTreeMap::new();
    for row in rows {
        let exercicios: Vec<i64> = sqlx::query_scalar(
            "SELECT exercicio_id FROM versao_exercicios
             WHERE versao_treino_id = ?1 ORDER BY ordem, id",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;

        resultado.insert(
            row.codigo.clone(),
            PlanWorkout {
                treino_id: row.treino_id,
                codigo: row.codigo,
                nome: row.nome_treino,
                descricao: row.descricao_treino,
                exercicios,
            },
        );
    }
    Ok(resultado)
}

/// The exercises of one workout-in-version, in display order.
pub async fn get_workout_exercises(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    codigo: &str,
) -> Result<Vec<Exercicio>> {
    let tv = get_versao_treino(pool, user_id, versao_id, codigo).await?;
    sqlx::query_as::<_, Exercicio>(
        "SELECT e.* FROM exercicios e
         JOIN versao_exercicios ve ON ve.exercicio_id = e.id
         WHERE ve.versao_treino_id = ?1
         ORDER BY ve.ordem, ve.id",
    )
    .bind(tv.id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Upgrades the historical plan JSON to the current nested shape.
///
/// Two shapes exist in old exports: workouts as a plain exercise-id list
/// (`"A": [1, 2, 3]`) and workouts as a dict with metadata
/// (`"A": {"nome": …, "descricao": …, "exercicios": […]}`). The second
/// is already the target shape. Re-running on migrated data is a no-op.
pub fn legacy_migrate(raw: &Value) -> Result<Value> {
    let versions = raw
        .as_array()
        .ok_or_else(|| Error::Validation("legacy plan data must be a list of versions".into()))?;

    let mut migrated = Vec::with_capacity(versions.len());
    for version in versions {
        let mut version = version.clone();
        if let Some(treinos) = version.get("treinos").and_then(Value::as_object) {
            let mut novos: Map<String, Value> = Map::new();
            for (codigo, treino) in treinos {
                match treino {
                    Value::Array(ids) => {
                        novos.insert(
                            codigo.clone(),
                            json!({
                                "nome": format!("Treino {codigo}"),
                                "descricao": format!("Treino {codigo}"),
                                "exercicios": ids,
                            }),
                        );
                    }
                    Value::Object(_) => {
                        novos.insert(codigo.clone(), treino.clone());
                    }
                    other => {
                        return Err(Error::Validation(format!(
                            "workout '{codigo}' has unsupported shape: {other}"
                        )));
                    }
                }
            }
            version["treinos"] = Value::Object(novos);
        }
        migrated.push(version);
    }
    Ok(Value::Array(migrated))
}
