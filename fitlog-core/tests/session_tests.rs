mod common;

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;

use common::{test_pool, test_user, workout_with_exercises};
use fitlog::db::models::{SplitType, Treino, Versao};
use fitlog::session::{
    RegistroFilter, SessionEntry, get_series, list_periods, list_registros, load_sessions,
    save_session, weeks_by_period,
};
use fitlog::stats::{progress_by_week, stats_by_workout, volume_by_week};
use fitlog::versions::create_version;

fn entry(carga: f64, repeticoes: i64, num_series: i64) -> SessionEntry {
    SessionEntry {
        carga,
        repeticoes,
        num_series,
    }
}

async fn setup(pool: &fitlog::SqlitePool, user: i64) -> (Treino, Vec<i64>, Versao) {
    let (treino, exercicios) = workout_with_exercises(pool, user, "A", 3).await;
    let versao = create_version(
        pool,
        user,
        "Base",
        SplitType::ThreeDay,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        None,
    )
    .await
    .expect("version");
    (treino, exercicios, versao)
}

#[tokio::test]
async fn saves_one_record_per_exercise_with_identical_sets() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    entries.insert(ex[1], entry(30.0, 10, 2));

    let written =
        save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;
    assert_eq!(written, 2);

    let registros = list_registros(&pool, user, &RegistroFilter::default()).await?;
    assert_eq!(registros.len(), 2);

    let primeiro = registros.iter().find(|r| r.exercicio_id == ex[0]).unwrap();
    let series = get_series(&pool, primeiro.id).await?;
    assert_eq!(series.len(), 3);
    assert!(series.iter().all(|s| s.carga == 20.0 && s.repeticoes == 8));
    assert_eq!(
        series.iter().map(|s| s.ordem).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    Ok(())
}

#[tokio::test]
async fn resaving_the_same_week_replaces_the_previous_session() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    entries.insert(ex[1], entry(30.0, 10, 2));
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;

    // Second pass drops one exercise and changes the other's load.
    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(22.5, 8, 3));
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;

    let sessions = load_sessions(&pool, user, &RegistroFilter::default()).await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].registro.exercicio_id, ex[0]);
    assert!(sessions[0].series.iter().all(|s| s.carga == 22.5));
    Ok(())
}

#[tokio::test]
async fn entries_without_load_or_reps_are_skipped() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    entries.insert(ex[1], entry(0.0, 8, 3));
    entries.insert(ex[2], entry(20.0, 0, 3));

    let written =
        save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;
    assert_eq!(written, 1);

    let registros = list_registros(&pool, user, &RegistroFilter::default()).await?;
    assert_eq!(registros.len(), 1);
    assert_eq!(registros[0].exercicio_id, ex[0]);
    Ok(())
}

#[tokio::test]
async fn invalid_input_writes_nothing() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    entries.insert(ex[1], entry(-5.0, 8, 3));

    let err = save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains(&ex[1].to_string()));

    // Week out of range fails before the entries are even looked at.
    let err = save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 0, &entries)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let registros = list_registros(&pool, user, &RegistroFilter::default()).await?;
    assert!(registros.is_empty());
    Ok(())
}

#[tokio::test]
async fn foreign_exercise_ids_are_rejected_before_any_write() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, _, versao) = setup(&pool, user).await;

    let outro = fitlog::db::operations::create_user(&pool, "outro").await?.id;
    let (_, alheios) = workout_with_exercises(&pool, outro, "A", 1).await;

    let mut entries = BTreeMap::new();
    entries.insert(alheios[0], entry(20.0, 8, 3));
    let err = save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let mut entries = BTreeMap::new();
    entries.insert(9999, entry(20.0, 8, 3));
    let err = save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let registros = list_registros(&pool, user, &RegistroFilter::default()).await?;
    assert!(registros.is_empty());
    Ok(())
}

#[tokio::test]
async fn filters_narrow_the_record_listing() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 2, &entries).await?;
    save_session(&pool, user, treino.id, versao.id, "Março/2024", 1, &entries).await?;

    let janeiro = list_registros(
        &pool,
        user,
        &RegistroFilter {
            periodo: Some("Janeiro/2024".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(janeiro.len(), 2);

    let semana_1 = list_registros(
        &pool,
        user,
        &RegistroFilter {
            periodo: Some("Janeiro/2024".into()),
            semana: Some(1),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(semana_1.len(), 1);
    Ok(())
}

#[tokio::test]
async fn periods_and_weeks_reflect_what_was_recorded() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 2, &entries).await?;
    save_session(&pool, user, treino.id, versao.id, "Março/2024", 1, &entries).await?;

    let periods = list_periods(&pool, user).await?;
    assert_eq!(periods, vec!["Março/2024".to_string(), "Janeiro/2024".to_string()]);

    let weeks = weeks_by_period(&pool, user).await?;
    assert_eq!(weeks["Janeiro/2024"], vec![1, 2]);
    assert_eq!(weeks["Março/2024"], vec![1]);
    Ok(())
}

#[tokio::test]
async fn aggregation_matches_the_recorded_sets() -> Result<()> {
    let pool = test_pool().await;
    let user = test_user(&pool).await;
    let (treino, ex, versao) = setup(&pool, user).await;

    // 3 x 20kg x 8 = 480, 2 x 30kg x 10 = 600.
    let mut entries = BTreeMap::new();
    entries.insert(ex[0], entry(20.0, 8, 3));
    entries.insert(ex[1], entry(30.0, 10, 2));
    save_session(&pool, user, treino.id, versao.id, "Janeiro/2024", 1, &entries).await?;

    let progress = progress_by_week(&pool, user, None).await?;
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].periodo, "Janeiro/2024");
    assert_eq!(progress[0].semana, 1);
    assert_eq!(progress[0].volume_total, 1080.0);

    let by_workout = stats_by_workout(&pool, user).await?;
    let stats = &by_workout[&treino.id];
    assert_eq!(stats.qtd_registros, 2);
    assert_eq!(stats.total_series, 5);
    assert_eq!(stats.volume_total, 1080.0);

    let sessions = load_sessions(&pool, user, &RegistroFilter::default()).await?;
    let per_week = volume_by_week(&sessions);
    assert_eq!(per_week["Janeiro/2024_1"], 1080.0);

    // Filtering by a workout with no records yields nothing.
    let none = progress_by_week(&pool, user, Some(treino.id + 999)).await?;
    assert!(none.is_empty());
    Ok(())
}
