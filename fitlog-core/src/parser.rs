//! Free-text period labels ("Março/2024", "Março-24", "Março") resolved
//! to the first day of the month they name.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{Error, Result};

/// Month-name table, full names plus three-letter abbreviations, matched
/// case-insensitively.
const MESES: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

fn month_number(name: &str) -> Option<u32> {
    MESES
        .iter()
        .find(|(mes, _)| *mes == name)
        .map(|(_, numero)| *numero)
}

/// Two-digit years up to 50 land in the 2000s, the rest in the 1900s.
fn resolve_year(digits: &str) -> Option<i32> {
    match digits.len() {
        2 => {
            let short: i32 = digits.parse().ok()?;
            Some(if short <= 50 { 2000 + short } else { 1900 + short })
        }
        4 => digits.parse().ok(),
        _ => None,
    }
}

/// Parse a period label against an explicit "today", used when the label
/// carries no year.
pub fn parse_period_at(text: &str, today: NaiveDate) -> Result<NaiveDate> {
    let cleaned = text.trim().to_lowercase();
    if cleaned.is_empty() {
        return Err(Error::Parse(text.to_string()));
    }

    let month_part: String = cleaned
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();
    let rest = &cleaned[month_part.len()..];

    let Some(mes) = month_number(&month_part) else {
        return Err(Error::Parse(text.to_string()));
    };

    let year_digits: String = rest
        .trim_start_matches(['/', '-', ' '])
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let ano = if year_digits.is_empty() {
        today.year()
    } else {
        resolve_year(&year_digits).ok_or_else(|| Error::Parse(text.to_string()))?
    };

    NaiveDate::from_ymd_opt(ano, mes, 1).ok_or_else(|| Error::Parse(text.to_string()))
}

/// Parse a period label, assuming the current calendar year when the
/// label carries no year.
pub fn parse_period(text: &str) -> Result<NaiveDate> {
    parse_period_at(text, Local::now().date_naive())
}

/// Order period labels most recent first. Labels that fail to parse sort
/// last, in their original relative order.
pub fn sort_periods(mut periods: Vec<String>, today: NaiveDate) -> Vec<String> {
    periods.sort_by_cached_key(|p| {
        std::cmp::Reverse(parse_period_at(p, today).unwrap_or(NaiveDate::MIN))
    });
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_month_and_year() {
        assert_eq!(
            parse_period_at("Março/2024", date(2026, 8, 1)).unwrap(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_period_at("Janeiro 2023", date(2026, 8, 1)).unwrap(),
            date(2023, 1, 1)
        );
    }

    #[test]
    fn two_digit_year_window() {
        assert_eq!(
            parse_period_at("Março-24", date(2026, 8, 1)).unwrap(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_period_at("Dez/99", date(2026, 8, 1)).unwrap(),
            date(1999, 12, 1)
        );
        assert_eq!(
            parse_period_at("Dez/50", date(2026, 8, 1)).unwrap(),
            date(2050, 12, 1)
        );
        assert_eq!(
            parse_period_at("Dez/51", date(2026, 8, 1)).unwrap(),
            date(1951, 12, 1)
        );
    }

    #[test]
    fn month_only_uses_reference_year() {
        assert_eq!(
            parse_period_at("Março", date(2025, 11, 20)).unwrap(),
            date(2025, 3, 1)
        );
    }

    #[test]
    fn abbreviations_match() {
        assert_eq!(
            parse_period_at("fev/2024", date(2026, 8, 1)).unwrap(),
            date(2024, 2, 1)
        );
        assert_eq!(
            parse_period_at("AGO-25", date(2026, 8, 1)).unwrap(),
            date(2025, 8, 1)
        );
    }

    #[test]
    fn unknown_month_is_an_error() {
        // No silent "today" fallback.
        let err = parse_period_at("Xyz/2024", date(2026, 8, 1)).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(parse_period_at("", date(2026, 8, 1)).is_err());
        assert!(parse_period_at("2024", date(2026, 8, 1)).is_err());
    }

    #[test]
    fn sorts_most_recent_first() {
        let today = date(2026, 8, 1);
        let sorted = sort_periods(
            vec![
                "Janeiro/2024".into(),
                "Março/2024".into(),
                "nada".into(),
                "Fevereiro/2025".into(),
            ],
            today,
        );
        assert_eq!(
            sorted,
            vec![
                "Fevereiro/2025".to_string(),
                "Março/2024".to_string(),
                "Janeiro/2024".to_string(),
                "nada".to_string(),
            ]
        );
    }
}
