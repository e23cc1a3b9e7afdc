//! Read-side aggregation over recorded sessions: volume, averages, and
//! per-muscle / per-workout / per-week rollups. Malformed legacy rows
//! are logged and skipped, never fatal.

use std::collections::BTreeMap;

use log::warn;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::Serie;
use crate::error::Result;
use crate::session::RecordedSession;

/// One logged set, detached from storage identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetEntry {
    pub carga: f64,
    pub repeticoes: i64,
}

impl From<&Serie> for SetEntry {
    fn from(serie: &Serie) -> Self {
        SetEntry {
            carga: serie.carga,
            repeticoes: serie.repeticoes,
        }
    }
}

/// Σ carga × repeticoes across the sets.
pub fn volume(sets: &[SetEntry]) -> f64 {
    sets.iter()
        .map(|s| s.carga * s.repeticoes as f64)
        .sum()
}

/// Mean load and mean rep count, `(0.0, 0.0)` for an empty slice.
pub fn series_average(sets: &[SetEntry]) -> (f64, f64) {
    if sets.is_empty() {
        return (0.0, 0.0);
    }
    let n = sets.len() as f64;
    let carga = sets.iter().map(|s| s.carga).sum::<f64>() / n;
    let reps = sets.iter().map(|s| s.repeticoes as f64).sum::<f64>() / n;
    (carga, reps)
}

/// Extracts sets from a legacy record value. Old exports carry either a
/// `series` list or a single flat `{carga, repeticoes}` pair; the flat
/// shape counts as one set.
pub fn series_from_value(registro: &Value) -> Vec<SetEntry> {
    if let Some(series) = registro.get("series").and_then(Value::as_array) {
        return series
            .iter()
            .filter_map(|s| {
                let carga = s.get("carga").and_then(Value::as_f64);
                let repeticoes = s.get("repeticoes").and_then(Value::as_i64);
                match (carga, repeticoes) {
                    (Some(carga), Some(repeticoes)) => Some(SetEntry { carga, repeticoes }),
                    _ => {
                        warn!("Skipping malformed set entry: {s}");
                        None
                    }
                }
            })
            .collect();
    }

    match (
        registro.get("carga").and_then(Value::as_f64),
        registro.get("repeticoes").and_then(Value::as_i64),
    ) {
        (Some(carga), Some(repeticoes)) => vec![SetEntry { carga, repeticoes }],
        _ => Vec::new(),
    }
}

/// The reporting bucket key for a record: `"{periodo}_{semana}"`.
pub fn week_key(periodo: &str, semana: i64) -> String {
    format!("{periodo}_{semana}")
}

/// Total volume per week key across the given sessions.
pub fn volume_by_week(sessions: &[RecordedSession]) -> BTreeMap<String, f64> {
    let mut per_week: BTreeMap<String, f64> = BTreeMap::new();
    for session in sessions {
        let key = week_key(&session.registro.periodo, session.registro.semana);
        let sets: Vec<SetEntry> = session.series.iter().map(SetEntry::from).collect();
        *per_week.entry(key).or_insert(0.0) += volume(&sets);
    }
    per_week
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuscleStats {
    pub qtd_exercicios: i64,
    pub qtd_registros: i64,
    pub total_series: i64,
    pub volume_total: f64,
}

/// Per-muscle rollup for one user, keyed by the muscle display name.
pub async fn stats_by_muscle(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<BTreeMap<String, MuscleStats>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        musculo: String,
        qtd_exercicios: i64,
        qtd_registros: i64,
        total_series: i64,
        volume_total: f64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT m.nome_exibicao AS musculo,
                COUNT(DISTINCT e.id) AS qtd_exercicios,
                COUNT(DISTINCT r.id) AS qtd_registros,
                COUNT(s.id) AS total_series,
                COALESCE(SUM(s.carga * s.repeticoes), 0) AS volume_total
         FROM musculos m
         LEFT JOIN exercicios e ON e.musculo_id = m.id AND e.user_id = ?1
         LEFT JOIN registros r ON r.exercicio_id = e.id AND r.user_id = ?1
         LEFT JOIN series s ON s.registro_id = r.id
         GROUP BY m.id, m.nome_exibicao",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.musculo,
                MuscleStats {
                    qtd_exercicios: row.qtd_exercicios,
                    qtd_registros: row.qtd_registros,
                    total_series: row.total_series,
                    volume_total: row.volume_total,
                },
            )
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutStats {
    pub codigo: String,
    pub nome: String,
    pub qtd_registros: i64,
    pub total_series: i64,
    pub volume_total: f64,
}

/// Per-workout rollup for one user, keyed by workout id.
pub async fn stats_by_workout(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<BTreeMap<i64, WorkoutStats>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        treino_id: i64,
        codigo: String,
        nome: String,
        qtd_registros: i64,
        total_series: i64,
        volume_total: f64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT t.id AS treino_id, t.codigo, t.nome,
                COUNT(DISTINCT r.id) AS qtd_registros,
                COUNT(s.id) AS total_series,
                COALESCE(SUM(s.carga * s.repeticoes), 0) AS volume_total
         FROM treinos t
         LEFT JOIN registros r ON r.treino_id = t.id AND r.user_id = ?1
         LEFT JOIN series s ON s.registro_id = r.id
         WHERE t.user_id = ?1
         GROUP BY t.id, t.codigo, t.nome
         ORDER BY t.codigo",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.treino_id,
                WorkoutStats {
                    codigo: row.codigo,
                    nome: row.nome,
                    qtd_registros: row.qtd_registros,
                    total_series: row.total_series,
                    volume_total: row.volume_total,
                },
            )
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekProgress {
    pub periodo: String,
    pub semana: i64,
    pub volume_total: f64,
    pub carga_media: f64,
}

/// Week-by-week totals, optionally restricted to one workout.
pub async fn progress_by_week(
    pool: &SqlitePool,
    user_id: i64,
    treino_id: Option<i64>,
) -> Result<Vec<WeekProgress>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        periodo: String,
        semana: i64,
        volume_total: f64,
        carga_media: f64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT r.periodo, r.semana,
                COALESCE(SUM(s.carga * s.repeticoes), 0) AS volume_total,
                COALESCE(AVG(s.carga), 0) AS carga_media
         FROM registros r
         JOIN series s ON s.registro_id = r.id
         WHERE r.user_id = ?1 AND (?2 IS NULL OR r.treino_id = ?2)
         GROUP BY r.periodo, r.semana
         ORDER BY r.periodo, r.semana",
    )
    .bind(user_id)
    .bind(treino_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| WeekProgress {
            periodo: row.periodo,
            semana: row.semana,
            volume_total: row.volume_total,
            carga_media: row.carga_media,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn volume_sums_all_sets() {
        let sets = [
            SetEntry { carga: 10.0, repeticoes: 8 },
            SetEntry { carga: 10.0, repeticoes: 8 },
            SetEntry { carga: 10.0, repeticoes: 10 },
        ];
        assert_eq!(volume(&sets), 260.0);
    }

    #[test]
    fn averages() {
        let sets = [
            SetEntry { carga: 10.0, repeticoes: 8 },
            SetEntry { carga: 20.0, repeticoes: 10 },
        ];
        let (carga, reps) = series_average(&sets);
        assert_eq!(carga, 15.0);
        assert_eq!(reps, 9.0);
        assert_eq!(series_average(&[]), (0.0, 0.0));
    }

    #[test]
    fn flat_legacy_shape_counts_as_one_set() {
        let flat = json!({ "carga": 20, "repeticoes": 5 });
        let nested = json!({ "series": [{ "carga": 20, "repeticoes": 5 }] });
        assert_eq!(volume(&series_from_value(&flat)), 100.0);
        assert_eq!(volume(&series_from_value(&nested)), 100.0);
    }

    #[test]
    fn malformed_sets_are_skipped() {
        let registro = json!({ "series": [
            { "carga": 10, "repeticoes": 5 },
            { "carga": "oops" },
        ]});
        let sets = series_from_value(&registro);
        assert_eq!(sets.len(), 1);
        assert_eq!(volume(&sets), 50.0);
    }

    #[test]
    fn no_sets_at_all() {
        assert!(series_from_value(&json!({ "periodo": "Janeiro/2024" })).is_empty());
    }
}
