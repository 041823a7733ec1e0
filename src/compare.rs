//! Comparison of a current value against a reference value.

use crate::error::{Error, Result};
use crate::models::SeriesPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

impl Direction {
    /// Spanish verb phrase used in result messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Increased => "aumentado",
            Direction::Decreased => "disminuido",
            Direction::Unchanged => "mantenido",
        }
    }
}

/// Signed comparison reduced to a direction plus non-negative magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub direction: Direction,
    pub absolute_difference: f64,
    pub percentage_difference: f64,
}

/// Compare `current` against `reference`.
///
/// `percentage_difference` is relative to `|reference|`, so it stays non-negative for
/// indicators that can be negative (IMACEC, for instance).
///
/// ### Errors
/// - `DivisionByZero` when `reference == 0`
/// - `Validation` when either input is NaN or infinite
pub fn compare(current: f64, reference: f64) -> Result<ComparisonResult> {
    if !current.is_finite() || !reference.is_finite() {
        return Err(Error::Validation(
            "Datos insuficientes para la comparación".into(),
        ));
    }
    if reference == 0.0 {
        return Err(Error::DivisionByZero);
    }
    let direction = if current > reference {
        Direction::Increased
    } else if current < reference {
        Direction::Decreased
    } else {
        Direction::Unchanged
    };
    let absolute_difference = (current - reference).abs();
    Ok(ComparisonResult {
        direction,
        absolute_difference,
        percentage_difference: absolute_difference / reference.abs() * 100.0,
    })
}

/// Arithmetic mean; `EmptySeries` on an empty slice.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptySeries);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of the values of a series.
pub fn mean_of(series: &[SeriesPoint]) -> Result<f64> {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    mean(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_are_unchanged() {
        for x in [1.0, 950.5, -3.2, 1e9] {
            let r = compare(x, x).unwrap();
            assert_eq!(r.direction, Direction::Unchanged);
            assert_eq!(r.absolute_difference, 0.0);
            assert_eq!(r.percentage_difference, 0.0);
        }
    }

    #[test]
    fn nan_is_rejected() {
        assert!(matches!(compare(f64::NAN, 1.0), Err(Error::Validation(_))));
    }
}
