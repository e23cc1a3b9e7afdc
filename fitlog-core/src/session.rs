//! Session recorder: replace-on-conflict persistence of one session's
//! logged sets, plus the read queries over recorded sessions.

use std::collections::BTreeMap;

use chrono::Local;
use log::info;
use sqlx::SqlitePool;

use crate::db::models::{Registro, Serie};
use crate::db::operations::{get_exercicio, get_treino};
use crate::error::{Error, Result};
use crate::parser::sort_periods;
use crate::validate::{validate_carga, validate_num_series, validate_repeticoes, validate_semana};
use crate::versions::get_version;

/// One exercise's input for a session save. Every set in a save shares
/// one load/rep pair; the UI has no per-set variance.
#[derive(Debug, Clone, Copy)]
pub struct SessionEntry {
    pub carga: f64,
    pub repeticoes: i64,
    pub num_series: i64,
}

/// A recorded session row together with its sets.
#[derive(Debug, Clone)]
pub struct RecordedSession {
    pub registro: Registro,
    pub series: Vec<Serie>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistroFilter {
    pub treino_id: Option<i64>,
    pub versao_id: Option<i64>,
    pub exercicio_id: Option<i64>,
    pub periodo: Option<String>,
    pub semana: Option<i64>,
}

/// Replaces the whole session for (user, workout, version, period, week)
/// with the given entries: all prior records for that tuple are deleted
/// and one record plus `num_series` identical sets is inserted per
/// exercise carrying a positive load and rep count. All-or-nothing.
///
/// Returns the number of records written.
pub async fn save_session(
    pool: &SqlitePool,
    user_id: i64,
    treino_id: i64,
    versao_id: i64,
    periodo: &str,
    semana: i64,
    entries: &BTreeMap<i64, SessionEntry>,
) -> Result<usize> {
    let periodo = periodo.trim();
    if periodo.is_empty() {
        return Err(Error::Validation("period label must not be empty".into()));
    }
    validate_semana(semana)?;
    for (exercicio_id, entry) in entries {
        validate_carga(entry.carga).map_err(|e| annotate(e, *exercicio_id))?;
        validate_repeticoes(entry.repeticoes).map_err(|e| annotate(e, *exercicio_id))?;
        validate_num_series(entry.num_series).map_err(|e| annotate(e, *exercicio_id))?;
    }

    get_treino(pool, user_id, treino_id).await?;
    get_version(pool, user_id, versao_id).await?;
    for exercicio_id in entries.keys() {
        get_exercicio(pool, user_id, *exercicio_id).await?;
    }

    let agora = Local::now().naive_local();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM registros
         WHERE user_id = ?1 AND treino_id = ?2 AND versao_id = ?3
           AND periodo = ?4 AND semana = ?5",
    )
    .bind(user_id)
    .bind(treino_id)
    .bind(versao_id)
    .bind(periodo)
    .bind(semana)
    .execute(&mut *tx)
    .await?;

    let mut written = 0usize;
    for (exercicio_id, entry) in entries {
        // Empty cells (no load or no reps) are simply not recorded.
        if entry.carga <= 0.0 || entry.repeticoes <= 0 {
            continue;
        }

        let registro_id: i64 = sqlx::query_scalar(
            "INSERT INTO registros
                 (user_id, treino_id, versao_id, exercicio_id, periodo, semana, data_registro)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
        )
        .bind(user_id)
        .bind(treino_id)
        .bind(versao_id)
        .bind(exercicio_id)
        .bind(periodo)
        .bind(semana)
        .bind(agora)
        .fetch_one(&mut *tx)
        .await?;

        for ordem in 1..=entry.num_series {
            sqlx::query(
                "INSERT INTO series (registro_id, carga, repeticoes, ordem)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(registro_id)
            .bind(entry.carga)
            .bind(entry.repeticoes)
            .bind(ordem)
            .execute(&mut *tx)
            .await?;
        }
        written += 1;
    }

    tx.commit().await?;
    info!(
        "Session saved: workout {}, version {}, {} week {}, {} records",
        treino_id, versao_id, periodo, semana, written
    );
    Ok(written)
}

fn annotate(err: Error, exercicio_id: i64) -> Error {
    match err {
        Error::Validation(msg) => {
            Error::Validation(format!("exercise {exercicio_id}: {msg}"))
        }
        other => other,
    }
}

pub async fn list_registros(
    pool: &SqlitePool,
    user_id: i64,
    filter: &RegistroFilter,
) -> Result<Vec<Registro>> {
    sqlx::query_as::<_, Registro>(
        "SELECT * FROM registros WHERE user_id = ?1
           AND (?2 IS NULL OR treino_id = ?2)
           AND (?3 IS NULL OR versao_id = ?3)
           AND (?4 IS NULL OR exercicio_id = ?4)
           AND (?5 IS NULL OR periodo = ?5)
           AND (?6 IS NULL OR semana = ?6)
         ORDER BY data_registro DESC, id DESC",
    )
        .bind(user_id)
        .bind(filter.treino_id)
        .bind(filter.versao_id)
        .bind(filter.exercicio_id)
        .bind(filter.periodo.as_deref())
        .bind(filter.semana)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_series(pool: &SqlitePool, registro_id: i64) -> Result<Vec<Serie>> {
    sqlx::query_as::<_, Serie>(
        "SELECT * FROM series WHERE registro_id = ?1 ORDER BY ordem, id",
    )
    .bind(registro_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Records with their sets attached, for the read-side consumers.
pub async fn load_sessions(
    pool: &SqlitePool,
    user_id: i64,
    filter: &RegistroFilter,
) -> Result<Vec<RecordedSession>> {
    let registros = list_registros(pool, user_id, filter).await?;
    let mut sessions = Vec::with_capacity(registros.len());
    for registro in registros {
        let series = get_series(pool, registro.id).await?;
        sessions.push(RecordedSession { registro, series });
    }
    Ok(sessions)
}

/// Distinct period labels with at least one record, most recent first.
pub async fn list_periods(pool: &SqlitePool, user_id: i64) -> Result<Vec<String>> {
    let periodos: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT periodo FROM registros WHERE user_id = ?1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(sort_periods(periodos, Local::now().date_naive()))
}

/// Recorded weeks grouped by period label.
pub async fn weeks_by_period(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<BTreeMap<String, Vec<i64>>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        periodo: String,
        semana: i64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT DISTINCT periodo, semana FROM registros
         WHERE user_id = ?1 ORDER BY periodo, semana",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.periodo).or_default().push(row.semana);
    }
    Ok(grouped)
}
