//! Range and shape checks applied before any mutation reaches the store.

use crate::error::{Error, Result};

/// Workout codes are a single uppercase letter.
pub fn validate_codigo(codigo: &str) -> Result<String> {
    let codigo = codigo.trim().to_uppercase();
    if codigo.chars().count() != 1 {
        return Err(Error::Validation(
            "workout code must be exactly one letter".into(),
        ));
    }
    if !codigo.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Validation(format!(
            "workout code '{codigo}' must be a letter"
        )));
    }
    Ok(codigo)
}

pub fn validate_semana(semana: i64) -> Result<i64> {
    if !(1..=52).contains(&semana) {
        return Err(Error::Validation(format!(
            "week {semana} out of range (1-52)"
        )));
    }
    Ok(semana)
}

pub fn validate_carga(carga: f64) -> Result<f64> {
    if !carga.is_finite() || carga < 0.0 {
        return Err(Error::Validation(format!("load {carga} must be >= 0")));
    }
    if carga > 999.0 {
        return Err(Error::Validation(format!(
            "load {carga} out of range (max 999kg)"
        )));
    }
    Ok(carga)
}

pub fn validate_repeticoes(repeticoes: i64) -> Result<i64> {
    if !(0..=100).contains(&repeticoes) {
        return Err(Error::Validation(format!(
            "rep count {repeticoes} out of range (0-100)"
        )));
    }
    Ok(repeticoes)
}

pub fn validate_num_series(num_series: i64) -> Result<i64> {
    if !(1..=10).contains(&num_series) {
        return Err(Error::Validation(format!(
            "set count {num_series} out of range (1-10)"
        )));
    }
    Ok(num_series)
}
