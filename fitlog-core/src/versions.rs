//! Version interval index: which plan version is open right now, which
//! one was in effect at a given date, and the lifecycle operations that
//! keep the single-open-version invariant true.

use chrono::{Local, NaiveDate};
use log::info;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::models::{SplitType, Versao, VersaoExercicio, VersaoTreino};
use crate::error::{Error, Result};

pub async fn list_versions(pool: &SqlitePool, user_id: i64) -> Result<Vec<Versao>> {
    sqlx::query_as::<_, Versao>(
        "SELECT * FROM versoes WHERE user_id = ?1 ORDER BY numero_versao DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_version(pool: &SqlitePool, user_id: i64, versao_id: i64) -> Result<Versao> {
    sqlx::query_as::<_, Versao>("SELECT * FROM versoes WHERE id = ?1 AND user_id = ?2")
        .bind(versao_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("version {versao_id}")))
}

/// The open version (`data_fim IS NULL`), if any. "No open version" is a
/// different condition from "no version covers a date"; see
/// [`get_active_at`] for the latter.
pub async fn get_current(pool: &SqlitePool, user_id: i64) -> Result<Option<Versao>> {
    sqlx::query_as::<_, Versao>(
        "SELECT * FROM versoes WHERE user_id = ?1 AND data_fim IS NULL",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// The version whose `[data_inicio, data_fim]` interval contains `date`,
/// an open end counting as unbounded. Should intervals ever overlap, the
/// highest `data_inicio` wins.
pub async fn get_active_at(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<Versao>> {
    sqlx::query_as::<_, Versao>(
        "SELECT * FROM versoes
         WHERE user_id = ?1 AND data_inicio <= ?2
           AND (data_fim IS NULL OR data_fim >= ?2)
         ORDER BY data_inicio DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .map(Some)
    .or_else(|e| match e {
        sqlx::Error::RowNotFound => Ok(None),
        other => Err(other.into()),
    })
}

async fn next_version_number(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<i64> {
    let max: Option<i64> =
        sqlx::query_scalar("SELECT MAX(numero_versao) FROM versoes WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(max.unwrap_or(0) + 1)
}

/// Creates a new version. When the new version is open-ended and an open
/// version already exists, that version is force-closed at the new
/// version's start date inside the same transaction. This is the only
/// operation allowed to close a version implicitly.
pub async fn create_version(
    pool: &SqlitePool,
    user_id: i64,
    descricao: &str,
    divisao: SplitType,
    data_inicio: NaiveDate,
    data_fim: Option<NaiveDate>,
) -> Result<Versao> {
    if let Some(fim) = data_fim {
        if fim < data_inicio {
            return Err(Error::Validation(format!(
                "end date {fim} precedes start date {data_inicio}"
            )));
        }
    }

    let mut tx = pool.begin().await?;

    if data_fim.is_none() {
        let closed = sqlx::query(
            "UPDATE versoes SET data_fim = ?1 WHERE user_id = ?2 AND data_fim IS NULL",
        )
        .bind(data_inicio)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if closed.rows_affected() > 0 {
            info!(
                "Open version force-closed at {} for user {}",
                data_inicio, user_id
            );
        }
    }

    let numero = next_version_number(&mut tx, user_id).await?;
    let versao = sqlx::query_as::<_, Versao>(
        "INSERT INTO versoes (user_id, numero_versao, descricao, divisao, data_inicio, data_fim)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING *",
    )
    .bind(user_id)
    .bind(numero)
    .bind(descricao)
    .bind(divisao.as_str())
    .bind(data_inicio)
    .bind(data_fim)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Version {} created for user {}", numero, user_id);
    Ok(versao)
}

/// Partial update of description and dates. Reopening a closed version
/// is rejected while another open version exists.
pub async fn update_version(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    descricao: Option<&str>,
    data_inicio: Option<NaiveDate>,
    data_fim: Option<Option<NaiveDate>>,
) -> Result<Versao> {
    let versao = get_version(pool, user_id, versao_id).await?;

    let descricao = descricao.unwrap_or(&versao.descricao);
    let data_inicio = data_inicio.unwrap_or(versao.data_inicio);
    let data_fim = data_fim.unwrap_or(versao.data_fim);

    if data_fim.is_none() && versao.data_fim.is_some() {
        if let Some(open) = get_current(pool, user_id).await? {
            if open.id != versao_id {
                return Err(Error::Conflict(format!(
                    "version {} is already open",
                    open.numero_versao
                )));
            }
        }
    }

    sqlx::query_as::<_, Versao>(
        "UPDATE versoes SET descricao = ?1, data_inicio = ?2, data_fim = ?3
         WHERE id = ?4 RETURNING *",
    )
    .bind(descricao)
    .bind(data_inicio)
    .bind(data_fim)
    .bind(versao_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// Closes a version at `data_fim`. Finalizing twice is a conflict, not a
/// silent no-op.
pub async fn finalize_version(
    pool: &SqlitePool,
    user_id: i64,
    versao_id: i64,
    data_fim: NaiveDate,
) -> Result<Versao> {
    let versao = get_version(pool, user_id, versao_id).await?;
    if let Some(fim) = versao.data_fim {
        return Err(Error::Conflict(format!(
            "version {} already finalized at {fim}",
            versao.numero_versao
        )));
    }
    if data_fim < versao.data_inicio {
        return Err(Error::Validation(format!(
            "end date {data_fim} precedes start date {}",
            versao.data_inicio
        )));
    }

    let versao = sqlx::query_as::<_, Versao>(
        "UPDATE versoes SET data_fim = ?1 WHERE id = ?2 RETURNING *",
    )
    .bind(data_fim)
    .bind(versao_id)
    .fetch_one(pool)
    .await?;
    info!(
        "Version {} finalized at {} for user {}",
        versao.numero_versao, data_fim, user_id
    );
    Ok(versao)
}

/// Clones a version's workout/exercise structure into a new open version
/// starting today. Unlike [`create_version`] this never force-closes: a
/// still-open version makes the clone fail.
pub async fn clone_version(pool: &SqlitePool, user_id: i64, source_id: i64) -> Result<Versao> {
    let source = get_version(pool, user_id, source_id).await?;

    let mut tx = pool.begin().await?;

    let open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM versoes WHERE user_id = ?1 AND data_fim IS NULL",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    if open > 0 {
        return Err(Error::Conflict(
            "an open version already exists; finalize it before cloning".into(),
        ));
    }

    let numero = next_version_number(&mut tx, user_id).await?;
    let hoje = Local::now().date_naive();
    let nova = sqlx::query_as::<_, Versao>(
        "INSERT INTO versoes (user_id, numero_versao, descricao, divisao, data_inicio, data_fim)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL) RETURNING *",
    )
    .bind(user_id)
    .bind(numero)
    .bind(format!("Cópia de {}", source.descricao))
    .bind(&source.divisao)
    .bind(hoje)
    .fetch_one(&mut *tx)
    .await?;

    let treinos = sqlx::query_as::<_, VersaoTreino>(
        "SELECT * FROM versao_treinos WHERE versao_id = ?1 ORDER BY ordem, id",
    )
    .bind(source_id)
    .fetch_all(&mut *tx)
    .await?;

    for tv in treinos {
        let novo_tv = sqlx::query_as::<_, VersaoTreino>(
            "INSERT INTO versao_treinos (versao_id, treino_id, nome_treino, descricao_treino, ordem)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
        )
        .bind(nova.id)
        .bind(tv.treino_id)
        .bind(&tv.nome_treino)
        .bind(&tv.descricao_treino)
        .bind(tv.ordem)
        .fetch_one(&mut *tx)
        .await?;

        let exercicios = sqlx::query_as::<_, VersaoExercicio>(
            "SELECT * FROM versao_exercicios WHERE versao_treino_id = ?1 ORDER BY ordem, id",
        )
        .bind(tv.id)
        .fetch_all(&mut *tx)
        .await?;

        for ve in exercicios {
            sqlx::query(
                "INSERT INTO versao_exercicios (versao_treino_id, exercicio_id, ordem)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(novo_tv.id)
            .bind(ve.exercicio_id)
            .bind(ve.ordem)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!(
        "Version {} cloned as version {} for user {}",
        source.numero_versao, numero, user_id
    );
    Ok(nova)
}

/// Deletes a version. Blocked while the version is open or while any
/// session record still references it.
pub async fn delete_version(pool: &SqlitePool, user_id: i64, versao_id: i64) -> Result<()> {
    let versao = get_version(pool, user_id, versao_id).await?;
    if versao.is_ativa() {
        return Err(Error::Conflict(format!(
            "version {} is the active version",
            versao.numero_versao
        )));
    }

    let registros: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM registros WHERE versao_id = ?1")
            .bind(versao_id)
            .fetch_one(pool)
            .await?;
    if registros > 0 {
        return Err(Error::Conflict(format!(
            "version {} still has {registros} session records",
            versao.numero_versao
        )));
    }

    sqlx::query("DELETE FROM versoes WHERE id = ?1")
        .bind(versao_id)
        .execute(pool)
        .await?;
    info!(
        "Version {} deleted for user {}",
        versao.numero_versao, user_id
    );
    Ok(())
}
