//! Bar chart geometry for a short chronological series.
//!
//! Heights are percentages of the plot height after min/max normalization; axis ticks are
//! interpolated linearly between the extremes. Rendering lives in [`crate::viz`] and in
//! the GUI; both draw from a [`BarChart`].

use crate::api::SERIES_WINDOW;
use crate::error::{Error, Result};
use crate::models::{SeriesPoint, recent_window};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Number of horizontal gridlines, including top and bottom.
pub const GRIDLINES: usize = 5;

/// Height given to every bar when all values are equal.
pub const FLAT_BAR_HEIGHT: f64 = 100.0;

/// Above this many points only every third one is drawn.
pub const THIN_ABOVE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: DateTime<Utc>,
    pub value: f64,
    /// 0..=100
    pub height_pct: f64,
    pub is_latest: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub min: f64,
    pub max: f64,
    pub bars: Vec<Bar>,
    /// Gridline values from top (`max`) to bottom (`min`).
    pub value_ticks: Vec<f64>,
    /// Dates spread evenly from the first to the last point.
    pub date_ticks: Vec<DateTime<Utc>>,
}

/// Display height of `value` in percent.
pub fn bar_height(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        FLAT_BAR_HEIGHT
    } else {
        (value - min) / (max - min) * 100.0
    }
}

/// `min` and `max` over the values; `None` for an empty series.
pub fn value_range(points: &[SeriesPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Values for each gridline, top to bottom.
pub fn value_ticks(min: f64, max: f64) -> Vec<f64> {
    let steps = (GRIDLINES - 1) as f64;
    (0..GRIDLINES)
        .map(|i| max - (max - min) * i as f64 / steps)
        .collect()
}

fn date_ticks(first: DateTime<Utc>, last: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let steps = (GRIDLINES - 1) as i64;
    let (a, b) = (first.timestamp_millis(), last.timestamp_millis());
    (0..GRIDLINES as i64)
        .map(|i| {
            let ms = a + (b - a) * i / steps;
            Utc.timestamp_millis_opt(ms).single().unwrap_or(first)
        })
        .collect()
}

/// Points drawn as bars: all of them up to [`THIN_ABOVE`], otherwise every third one
/// plus the last.
pub fn thin_for_display(points: &[SeriesPoint]) -> Vec<SeriesPoint> {
    if points.len() <= THIN_ABOVE {
        return points.to_vec();
    }
    let last = points.len() - 1;
    points
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 == 0 || *i == last)
        .map(|(_, p)| *p)
        .collect()
}

/// Build the chart for `points`.
///
/// The input is first cut to the newest [`SERIES_WINDOW`] points in chronological order.
/// Min and max are taken over that window, before thinning, so the extremes always match
/// the statistics panel.
pub fn bar_chart(points: &[SeriesPoint]) -> Result<BarChart> {
    let window = recent_window(points.iter().copied(), SERIES_WINDOW);
    let (min, max) = value_range(&window).ok_or(Error::EmptySeries)?;
    let shown = thin_for_display(&window);
    let last = shown.len().saturating_sub(1);
    let bars = shown
        .iter()
        .enumerate()
        .map(|(i, p)| Bar {
            date: p.date,
            value: p.value,
            height_pct: bar_height(p.value, min, max),
            is_latest: i == last,
        })
        .collect();
    let (first_date, last_date) = match (window.first(), window.last()) {
        (Some(f), Some(l)) => (f.date, l.date),
        _ => return Err(Error::EmptySeries),
    };
    Ok(BarChart {
        min,
        max,
        bars,
        value_ticks: value_ticks(min, max),
        date_ticks: date_ticks(first_date, last_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_keeps_bars_visible() {
        assert_eq!(bar_height(5.0, 5.0, 5.0), FLAT_BAR_HEIGHT);
    }

    #[test]
    fn ticks_run_top_to_bottom() {
        assert_eq!(value_ticks(100.0, 300.0), vec![300.0, 250.0, 200.0, 150.0, 100.0]);
    }
}
