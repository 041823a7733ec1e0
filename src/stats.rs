use crate::models::SeriesPoint;
use serde::{Deserialize, Serialize};

/// Summary statistics for a chronological series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub latest: Option<f64>,
    /// Latest value minus the one before it.
    pub change: Option<f64>,
    /// `change` relative to the previous value, in percent.
    pub change_pct: Option<f64>,
}

/// Compute statistics over `points`, which must be ordered oldest to newest.
pub fn summary(points: &[SeriesPoint]) -> Summary {
    let mut vals: Vec<f64> = points
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };

    let latest = points.last().map(|p| p.value);
    let (change, change_pct) = match points {
        [.., prev, last] => {
            let change = last.value - prev.value;
            let pct = if prev.value != 0.0 {
                Some(change / prev.value * 100.0)
            } else {
                None
            };
            (Some(change), pct)
        }
        _ => (None, None),
    };

    Summary {
        count,
        min,
        max,
        mean,
        median,
        latest,
        change,
        change_pct,
    }
}
