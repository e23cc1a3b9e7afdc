use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{Error, Result};

/// How many training days a plan version uses, which also fixes the set
/// of valid workout letters for that version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitType {
    ThreeDay,
    FourDay,
    FiveDay,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::ThreeDay => "ABC",
            SplitType::FourDay => "ABCD",
            SplitType::FiveDay => "ABCDE",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "ABC" | "3X" => Ok(SplitType::ThreeDay),
            "ABCD" | "4X" => Ok(SplitType::FourDay),
            "ABCDE" | "5X" => Ok(SplitType::FiveDay),
            other => Err(Error::Validation(format!(
                "unknown split type '{other}' (expected ABC, ABCD or ABCDE)"
            ))),
        }
    }

    /// The workout codes this split admits.
    pub fn letters(&self) -> &'static [&'static str] {
        match self {
            SplitType::ThreeDay => &["A", "B", "C"],
            SplitType::FourDay => &["A", "B", "C", "D"],
            SplitType::FiveDay => &["A", "B", "C", "D", "E"],
        }
    }

    pub fn admits(&self, codigo: &str) -> bool {
        self.letters().contains(&codigo)
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Musculo {
    pub id: i64,
    pub nome: String,
    pub nome_exibicao: String,
}

/// A lettered training day template, user-owned, reused across versions.
#[derive(Debug, Clone, FromRow)]
pub struct Treino {
    pub id: i64,
    pub user_id: i64,
    pub codigo: String,
    pub nome: String,
    pub descricao: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Exercicio {
    pub id: i64,
    pub user_id: i64,
    pub nome: String,
    pub descricao: String,
    pub musculo_id: Option<i64>,
    /// Default home workout, distinct from the workouts that actually
    /// include this exercise in any given version.
    pub treino_id: Option<i64>,
    pub created_at: i64,
}

/// A time-bounded plan configuration. `data_fim == None` means the
/// version is open, i.e. currently active.
#[derive(Debug, Clone, FromRow)]
pub struct Versao {
    pub id: i64,
    pub user_id: i64,
    pub numero_versao: i64,
    pub descricao: String,
    pub divisao: String,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub created_at: i64,
}

impl Versao {
    pub fn is_ativa(&self) -> bool {
        self.data_fim.is_none()
    }

    pub fn split(&self) -> Result<SplitType> {
        SplitType::parse(&self.divisao)
    }

    /// Whether the interval `[data_inicio, data_fim]` contains `date`,
    /// an open end counting as unbounded.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.data_inicio <= date && self.data_fim.map_or(true, |fim| fim >= date)
    }
}

/// A workout instantiated inside one version, with its own name override
/// and display order.
#[derive(Debug, Clone, FromRow)]
pub struct VersaoTreino {
    pub id: i64,
    pub versao_id: i64,
    pub treino_id: i64,
    pub nome_treino: String,
    pub descricao_treino: Option<String>,
    pub ordem: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct VersaoExercicio {
    pub id: i64,
    pub versao_treino_id: i64,
    pub exercicio_id: i64,
    pub ordem: i64,
}

/// One exercise's logged performance for a (workout, version, period,
/// week) session.
#[derive(Debug, Clone, FromRow)]
pub struct Registro {
    pub id: i64,
    pub user_id: i64,
    pub treino_id: i64,
    pub versao_id: i64,
    pub exercicio_id: i64,
    pub periodo: String,
    pub semana: i64,
    pub data_registro: NaiveDateTime,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Serie {
    pub id: i64,
    pub registro_id: i64,
    pub carga: f64,
    pub repeticoes: i64,
    pub ordem: i64,
}

impl fmt::Display for Serie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}kg x {} reps", self.carga, self.repeticoes)
    }
}
