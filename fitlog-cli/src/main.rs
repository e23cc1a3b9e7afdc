use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use std::fmt;

use fitlog::catalog::ExerciseCatalog;
use fitlog::db::models::{SplitType, User};
use fitlog::db::operations::{create_user, get_user_by_username, list_exercicios_do_treino,
    list_treinos};
use fitlog::parser::parse_period;
use fitlog::plan::get_workouts;
use fitlog::session::{SessionEntry, save_session, weeks_by_period};
use fitlog::stats::{progress_by_week, stats_by_muscle, stats_by_workout};
use fitlog::versions::{
    clone_version, create_version, finalize_version, get_active_at, get_current, list_versions,
};

#[derive(Parser, Debug)]
#[command(version, about = "FitLog - Workout Plan Tracker CLI", long_about = None)]
struct Args {
    /// Username owning the data
    #[arg(short, long, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum StatsKind {
    Muscle,
    Workout,
    Progress,
}

impl fmt::Display for StatsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsKind::Muscle => write!(f, "muscle"),
            StatsKind::Workout => write!(f, "workout"),
            StatsKind::Progress => write!(f, "progress"),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the user and seed the starter split
    Init {
        /// Split to seed: ABC, ABCD or ABCDE
        #[arg(short, long, default_value = "ABC")]
        split: String,
        /// Create bare workouts without exercises
        #[arg(long)]
        minimal: bool,
    },
    /// List workouts, optionally with their exercises
    Workouts {
        #[arg(short, long)]
        verbose: bool,
    },
    /// List plan versions
    Versions,
    /// Open a new plan version (closes the current one)
    NewVersion {
        #[arg(short, long)]
        descricao: String,
        #[arg(short, long, default_value = "ABC")]
        split: String,
        /// Start date, YYYY-MM-DD (default today)
        #[arg(long)]
        inicio: Option<String>,
    },
    /// Close the open version
    Finalize {
        /// End date, YYYY-MM-DD (default today)
        #[arg(long)]
        fim: Option<String>,
    },
    /// Copy a finalized version's structure into a new open version
    CloneVersion {
        #[arg(short, long)]
        version: i64,
    },
    /// Show a version's workout and exercise structure
    Plan {
        /// Version id (default: the open version)
        #[arg(short, long)]
        version: Option<i64>,
    },
    /// Record one session's sets for a workout
    Record {
        /// Workout code (A..E)
        #[arg(short, long)]
        workout: String,
        /// Period label, e.g. "Março/2024"
        #[arg(short, long)]
        periodo: String,
        #[arg(short, long)]
        semana: i64,
        /// Entries as exercicio_id:carga:repeticoes:num_series
        #[arg(short, long = "entry")]
        entries: Vec<String>,
    },
    /// List recorded periods and their weeks
    Periods,
    /// Aggregated numbers over recorded sessions
    Stats {
        #[arg(short, long, default_value_t = StatsKind::Workout)]
        kind: StatsKind,
        /// Restrict progress to one workout id
        #[arg(long)]
        treino: Option<i64>,
    },
    /// Resolve a free-text period label to a date
    Parse {
        input: String,
    },
    /// Search the exercise catalog
    Catalog {
        #[arg(short, long)]
        term: Option<String>,
        #[arg(short, long)]
        muscle: Option<String>,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD")),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_entry(raw: &str) -> Result<(i64, SessionEntry)> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        bail!("entry '{raw}' must be exercicio_id:carga:repeticoes:num_series");
    }
    Ok((
        parts[0].parse().context("exercise id")?,
        SessionEntry {
            carga: parts[1].parse().context("load")?,
            repeticoes: parts[2].parse().context("repetitions")?,
            num_series: parts[3].parse().context("set count")?,
        },
    ))
}

async fn resolve_user(pool: &fitlog::SqlitePool, username: &str, create: bool) -> Result<User> {
    match get_user_by_username(pool, username).await {
        Ok(user) => Ok(user),
        Err(e) if e.is_not_found() && create => Ok(create_user(pool, username).await?),
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let db_path = std::env::var("FITLOG_DB").unwrap_or_else(|_| "fitlog.db".to_string());
    let pool = fitlog::db::connect(&db_path).await?;

    match args.command {
        Commands::Init { split, minimal } => {
            let user = resolve_user(&pool, &args.user, true).await?;
            let treinos = if minimal {
                fitlog::seed::seed_minimal(&pool, user.id).await?
            } else {
                let split = SplitType::parse(&split)?;
                fitlog::seed::seed_user(&pool, user.id, split).await?
            };
            println!("User '{}' ready with {} workouts", user.username, treinos.len());
            Ok(())
        }
        Commands::Workouts { verbose } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            for treino in list_treinos(&pool, user.id).await? {
                println!("{}: {} ({})", treino.codigo, treino.nome, treino.descricao);
                if verbose {
                    for ex in list_exercicios_do_treino(&pool, user.id, treino.id).await? {
                        println!("\t[{}] {}", ex.id, ex.nome);
                    }
                }
            }
            Ok(())
        }
        Commands::Versions => {
            let user = resolve_user(&pool, &args.user, false).await?;
            for versao in list_versions(&pool, user.id).await? {
                let fim = versao
                    .data_fim
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "open".to_string());
                println!(
                    "v{} [{}] {} ({} -> {})",
                    versao.numero_versao, versao.divisao, versao.descricao,
                    versao.data_inicio, fim
                );
            }
            Ok(())
        }
        Commands::NewVersion {
            descricao,
            split,
            inicio,
        } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            let split = SplitType::parse(&split)?;
            let inicio = parse_date(inicio.as_deref())?;
            let versao =
                create_version(&pool, user.id, &descricao, split, inicio, None).await?;
            println!("Version {} opened at {}", versao.numero_versao, versao.data_inicio);
            Ok(())
        }
        Commands::Finalize { fim } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            let Some(aberta) = get_current(&pool, user.id).await? else {
                bail!("no open version to finalize");
            };
            let fim = parse_date(fim.as_deref())?;
            let versao = finalize_version(&pool, user.id, aberta.id, fim).await?;
            println!("Version {} finalized at {fim}", versao.numero_versao);
            Ok(())
        }
        Commands::CloneVersion { version } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            let nova = clone_version(&pool, user.id, version).await?;
            println!("Cloned into version {} (open)", nova.numero_versao);
            Ok(())
        }
        Commands::Plan { version } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            let versao_id = match version {
                Some(id) => id,
                None => match get_current(&pool, user.id).await? {
                    Some(v) => v.id,
                    None => bail!("no open version; pass --version"),
                },
            };
            for (codigo, workout) in get_workouts(&pool, user.id, versao_id).await? {
                println!("{}: {}", codigo, workout.nome);
                for exercicio_id in &workout.exercicios {
                    println!("\t[{exercicio_id}]");
                }
            }
            Ok(())
        }
        Commands::Record {
            workout,
            periodo,
            semana,
            entries,
        } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            let treino = fitlog::db::operations::get_treino_by_codigo(&pool, user.id, &workout)
                .await?;

            // Sessions attach to the version in effect for the period,
            // falling back to the open one.
            let data = parse_period(&periodo)?;
            let versao = match get_active_at(&pool, user.id, data).await? {
                Some(v) => v,
                None => get_current(&pool, user.id)
                    .await?
                    .context("no version covers this period and none is open")?,
            };

            let mut parsed = std::collections::BTreeMap::new();
            for raw in &entries {
                let (exercicio_id, entry) = parse_entry(raw)?;
                parsed.insert(exercicio_id, entry);
            }
            let written =
                save_session(&pool, user.id, treino.id, versao.id, &periodo, semana, &parsed)
                    .await?;
            println!("{written} exercises recorded for {periodo} week {semana}");
            Ok(())
        }
        Commands::Periods => {
            let user = resolve_user(&pool, &args.user, false).await?;
            for (periodo, semanas) in weeks_by_period(&pool, user.id).await? {
                let semanas: Vec<String> = semanas.iter().map(|s| s.to_string()).collect();
                println!("{}: weeks {}", periodo, semanas.join(", "));
            }
            Ok(())
        }
        Commands::Stats { kind, treino } => {
            let user = resolve_user(&pool, &args.user, false).await?;
            match kind {
                StatsKind::Muscle => {
                    for (musculo, stats) in stats_by_muscle(&pool, user.id).await? {
                        println!(
                            "{}: {} exercises, {} records, {} sets, volume {:.1}",
                            musculo, stats.qtd_exercicios, stats.qtd_registros,
                            stats.total_series, stats.volume_total
                        );
                    }
                }
                StatsKind::Workout => {
                    for (_, stats) in stats_by_workout(&pool, user.id).await? {
                        println!(
                            "{} ({}): {} records, {} sets, volume {:.1}",
                            stats.codigo, stats.nome, stats.qtd_registros,
                            stats.total_series, stats.volume_total
                        );
                    }
                }
                StatsKind::Progress => {
                    for week in progress_by_week(&pool, user.id, treino).await? {
                        println!(
                            "{} week {}: volume {:.1}, mean load {:.1}",
                            week.periodo, week.semana, week.volume_total, week.carga_media
                        );
                    }
                }
            }
            Ok(())
        }
        Commands::Parse { input } => {
            let data = parse_period(&input)?;
            println!("{input} -> {data}");
            Ok(())
        }
        Commands::Catalog { term, muscle, limit } => {
            let path = std::env::var("FITLOG_CATALOG")
                .unwrap_or_else(|_| "exercises.json".to_string());
            let catalog = ExerciseCatalog::new(&path);
            for hit in catalog.search(term.as_deref(), muscle.as_deref(), limit)? {
                let equipment = hit.equipment.unwrap_or_else(|| "-".to_string());
                println!("{} [{}] ({})", hit.nome, hit.musculo, equipment);
            }
            Ok(())
        }
    }
}
