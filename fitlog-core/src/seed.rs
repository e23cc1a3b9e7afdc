//! Starter content for new users: the predefined workout splits and the
//! routines that materialize them as workouts, muscles, and exercises.
//! Seeding skips anything that already exists, so running it again on a
//! populated account is harmless.

use log::{debug, info};
use sqlx::SqlitePool;

use crate::db::models::{SplitType, Treino};
use crate::db::operations::get_or_create_musculo;
use crate::error::Result;

async fn find_treino(pool: &SqlitePool, user_id: i64, codigo: &str) -> Result<Option<Treino>> {
    sqlx::query_as::<_, Treino>("SELECT * FROM treinos WHERE user_id = ?1 AND codigo = ?2")
        .bind(user_id)
        .bind(codigo)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub struct SeedExercise {
    pub nome: &'static str,
    pub musculo: &'static str,
}

pub struct SeedWorkout {
    pub codigo: &'static str,
    pub nome: &'static str,
    pub descricao: &'static str,
    pub exercicios: &'static [SeedExercise],
}

macro_rules! ex {
    ($nome:expr, $musculo:expr) => {
        SeedExercise {
            nome: $nome,
            musculo: $musculo,
        }
    };
}

const CHEST_SHOULDERS_TRICEPS: &[SeedExercise] = &[
    ex!("Supino Reto com Barra", "Peitoral"),
    ex!("Supino Inclinado com Halteres", "Peitoral"),
    ex!("Crucifixo com Halteres", "Peitoral"),
    ex!("Crossover na Polia", "Peitoral"),
    ex!("Desenvolvimento com Halteres", "Ombros"),
    ex!("Elevação Lateral com Halteres", "Ombros"),
    ex!("Elevação Frontal com Halteres", "Ombros"),
    ex!("Crucifixo Inverso", "Ombros"),
    ex!("Tríceps Pulley", "Tríceps"),
    ex!("Tríceps Testa com Barra W", "Tríceps"),
    ex!("Mergulho no Banco", "Tríceps"),
];

const BACK_BICEPS: &[SeedExercise] = &[
    ex!("Barra Fixa", "Costas"),
    ex!("Remada Curvada com Barra", "Costas"),
    ex!("Remada Unilateral com Halter", "Costas"),
    ex!("Pulldown na Polia", "Costas"),
    ex!("Pullover com Halter", "Costas"),
    ex!("Rosca Direta com Barra", "Bíceps"),
    ex!("Rosca Alternada com Halteres", "Bíceps"),
    ex!("Rosca Martelo", "Bíceps"),
    ex!("Rosca Scott com Halter", "Bíceps"),
];

const FULL_LEGS: &[SeedExercise] = &[
    ex!("Agachamento com Barra", "Quadríceps"),
    ex!("Leg Press", "Quadríceps"),
    ex!("Cadeira Extensora", "Quadríceps"),
    ex!("Afundo com Halteres", "Quadríceps"),
    ex!("Cadeira Flexora", "Posterior de Coxa"),
    ex!("Levantamento Terra Romeno", "Posterior de Coxa"),
    ex!("Stiff", "Posterior de Coxa"),
    ex!("Elevação Pélvica", "Glúteos"),
    ex!("Coice no Cabo", "Glúteos"),
    ex!("Elevação de Panturrilha em Pé", "Panturrilhas"),
    ex!("Elevação de Panturrilha Sentado", "Panturrilhas"),
];

const CHEST: &[SeedExercise] = &[
    ex!("Supino Reto com Barra", "Peitoral"),
    ex!("Supino Inclinado com Halteres", "Peitoral"),
    ex!("Crucifixo com Halteres", "Peitoral"),
    ex!("Crossover na Polia", "Peitoral"),
    ex!("Supino Declinado com Barra", "Peitoral"),
    ex!("Flexões", "Peitoral"),
];

const BACK: &[SeedExercise] = &[
    ex!("Barra Fixa", "Costas"),
    ex!("Remada Curvada com Barra", "Costas"),
    ex!("Remada Unilateral com Halter", "Costas"),
    ex!("Pulldown na Polia", "Costas"),
    ex!("Pullover com Halter", "Costas"),
    ex!("Remada Alta", "Costas"),
];

const LEGS_COMPACT: &[SeedExercise] = &[
    ex!("Agachamento com Barra", "Quadríceps"),
    ex!("Leg Press", "Quadríceps"),
    ex!("Cadeira Extensora", "Quadríceps"),
    ex!("Cadeira Flexora", "Posterior de Coxa"),
    ex!("Levantamento Terra Romeno", "Posterior de Coxa"),
    ex!("Elevação Pélvica", "Glúteos"),
    ex!("Elevação de Panturrilha em Pé", "Panturrilhas"),
];

const SHOULDERS_ARMS: &[SeedExercise] = &[
    ex!("Desenvolvimento com Halteres", "Ombros"),
    ex!("Elevação Lateral com Halteres", "Ombros"),
    ex!("Elevação Frontal com Halteres", "Ombros"),
    ex!("Crucifixo Inverso", "Ombros"),
    ex!("Tríceps Pulley", "Tríceps"),
    ex!("Tríceps Testa com Barra W", "Tríceps"),
    ex!("Mergulho no Banco", "Tríceps"),
    ex!("Rosca Direta com Barra", "Bíceps"),
    ex!("Rosca Alternada com Halteres", "Bíceps"),
    ex!("Rosca Martelo", "Bíceps"),
    ex!("Rosca Scott com Halter", "Bíceps"),
];

const SHOULDERS: &[SeedExercise] = &[
    ex!("Desenvolvimento com Halteres", "Ombros"),
    ex!("Elevação Lateral com Halteres", "Ombros"),
    ex!("Elevação Frontal com Halteres", "Ombros"),
    ex!("Crucifixo Inverso", "Ombros"),
    ex!("Encolhimento de Ombros", "Ombros"),
];

const ARMS: &[SeedExercise] = &[
    ex!("Rosca Direta com Barra", "Bíceps"),
    ex!("Rosca Alternada com Halteres", "Bíceps"),
    ex!("Rosca Martelo", "Bíceps"),
    ex!("Rosca Scott com Halter", "Bíceps"),
    ex!("Tríceps Pulley", "Tríceps"),
    ex!("Tríceps Testa com Barra W", "Tríceps"),
    ex!("Mergulho no Banco", "Tríceps"),
    ex!("Tríceps Coice com Halter", "Tríceps"),
];

const SPLIT_3X: &[SeedWorkout] = &[
    SeedWorkout {
        codigo: "A",
        nome: "Peito, Ombro e Tríceps",
        descricao: "Treino A - Peito, Ombro e Tríceps",
        exercicios: CHEST_SHOULDERS_TRICEPS,
    },
    SeedWorkout {
        codigo: "B",
        nome: "Costas e Bíceps",
        descricao: "Treino B - Costas e Bíceps",
        exercicios: BACK_BICEPS,
    },
    SeedWorkout {
        codigo: "C",
        nome: "Pernas Completa",
        descricao: "Treino C - Pernas Completa",
        exercicios: FULL_LEGS,
    },
];

const SPLIT_4X: &[SeedWorkout] = &[
    SeedWorkout {
        codigo: "A",
        nome: "Peito",
        descricao: "Treino A - Peito",
        exercicios: CHEST,
    },
    SeedWorkout {
        codigo: "B",
        nome: "Costas",
        descricao: "Treino B - Costas",
        exercicios: BACK,
    },
    SeedWorkout {
        codigo: "C",
        nome: "Pernas Completa",
        descricao: "Treino C - Pernas Completa",
        exercicios: LEGS_COMPACT,
    },
    SeedWorkout {
        codigo: "D",
        nome: "Ombros e Braços",
        descricao: "Treino D - Ombros e Braços",
        exercicios: SHOULDERS_ARMS,
    },
];

const SPLIT_5X: &[SeedWorkout] = &[
    SeedWorkout {
        codigo: "A",
        nome: "Peito",
        descricao: "Treino A - Peito",
        exercicios: CHEST,
    },
    SeedWorkout {
        codigo: "B",
        nome: "Costas",
        descricao: "Treino B - Costas",
        exercicios: BACK,
    },
    SeedWorkout {
        codigo: "C",
        nome: "Pernas",
        descricao: "Treino C - Pernas",
        exercicios: LEGS_COMPACT,
    },
    SeedWorkout {
        codigo: "D",
        nome: "Ombros",
        descricao: "Treino D - Ombros",
        exercicios: SHOULDERS,
    },
    SeedWorkout {
        codigo: "E",
        nome: "Braços",
        descricao: "Treino E - Braços",
        exercicios: ARMS,
    },
];

/// The predefined workout template for a split.
pub fn split_template(split: SplitType) -> &'static [SeedWorkout] {
    match split {
        SplitType::ThreeDay => SPLIT_3X,
        SplitType::FourDay => SPLIT_4X,
        SplitType::FiveDay => SPLIT_5X,
    }
}

/// Creates the bare A/B/C workouts without exercises, for users who want
/// to build their own plan.
pub async fn seed_minimal(pool: &SqlitePool, user_id: i64) -> Result<Vec<Treino>> {
    let base = [
        ("A", "Treino A", "Peito/Ombro/Tríceps"),
        ("B", "Treino B", "Costas/Bíceps"),
        ("C", "Treino C", "Pernas"),
    ];

    let mut criados = Vec::new();
    for (codigo, nome, descricao) in base {
        if let Some(existente) = find_treino(pool, user_id, codigo).await? {
            debug!("Workout {codigo} already exists for user {user_id}");
            criados.push(existente);
            continue;
        }
        let treino = sqlx::query_as::<_, Treino>(
            "INSERT INTO treinos (user_id, codigo, nome, descricao)
             VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(user_id)
        .bind(codigo)
        .bind(nome)
        .bind(descricao)
        .fetch_one(pool)
        .await?;
        criados.push(treino);
    }
    info!("{} minimal workouts ready for user {}", criados.len(), user_id);
    Ok(criados)
}

/// Populates a new account with the full template for the chosen split:
/// workouts, shared muscles, and exercises. Existing workouts and
/// exercises are kept as-is.
pub async fn seed_user(pool: &SqlitePool, user_id: i64, split: SplitType) -> Result<Vec<Treino>> {
    let template = split_template(split);
    let mut criados = Vec::new();

    for workout in template {
        let treino = match find_treino(pool, user_id, workout.codigo).await? {
            Some(existente) => {
                debug!(
                    "Workout {} already exists for user {user_id}, keeping it",
                    workout.codigo
                );
                existente
            }
            None => {
                sqlx::query_as::<_, Treino>(
                    "INSERT INTO treinos (user_id, codigo, nome, descricao)
                     VALUES (?1, ?2, ?3, ?4) RETURNING *",
                )
                .bind(user_id)
                .bind(workout.codigo)
                .bind(workout.nome)
                .bind(workout.descricao)
                .fetch_one(pool)
                .await?
            }
        };

        for seed_ex in workout.exercicios {
            let existente: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM exercicios WHERE user_id = ?1 AND nome = ?2",
            )
            .bind(user_id)
            .bind(seed_ex.nome)
            .fetch_optional(pool)
            .await?;
            if existente.is_some() {
                debug!("Exercise already exists: {}", seed_ex.nome);
                continue;
            }

            let musculo = get_or_create_musculo(pool, seed_ex.musculo).await?;
            sqlx::query(
                "INSERT INTO exercicios (user_id, treino_id, musculo_id, nome, descricao)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(user_id)
            .bind(treino.id)
            .bind(musculo.id)
            .bind(seed_ex.nome)
            .bind(format!("Exercício para {}", workout.nome))
            .execute(pool)
            .await?;
        }

        criados.push(treino);
    }

    info!(
        "Seeded {} workouts ({}) for user {}",
        criados.len(),
        split.as_str(),
        user_id
    );
    Ok(criados)
}
