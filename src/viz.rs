//! Render the recent-values bar chart to **SVG**.
//!
//! Layout follows [`crate::chart::BarChart`]: five gridlines labelled from max to min,
//! one bar per displayed point with a short date underneath, and the latest bar
//! highlighted with its value on top.

use crate::chart::{self, GRIDLINES};
use crate::format;
use crate::models::SeriesPoint;
use anyhow::{Result, anyhow, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;
use std::path::Path;

// Office palette blue (#4472C4), orange (#ED7D31) and a light gray for gridlines.
const BAR_COLOR: RGBColor = RGBColor(68, 114, 196);
const LATEST_COLOR: RGBColor = RGBColor(237, 125, 49);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const LABEL_COLOR: RGBColor = RGBColor(89, 89, 89);

const MARGIN_LEFT: i32 = 90;
const MARGIN_RIGHT: i32 = 20;
const MARGIN_TOP: i32 = 56;
const MARGIN_BOTTOM: i32 = 48;
/// Bars never shrink below this, so the minimum stays visible.
const MIN_BAR_PX: i32 = 4;

/// Plot `points` as bars into `out_path` (must end in `.svg`).
pub fn plot_bars<P: AsRef<Path>>(
    points: &[SeriesPoint],
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
    locale_tag: &str,
) -> Result<()> {
    let out_path = out_path.as_ref();
    match out_path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("svg") => {}
        other => bail!(
            "unsupported chart format '{}': only .svg is supported",
            other.unwrap_or("")
        ),
    }
    let min_size = (MARGIN_LEFT + MARGIN_RIGHT + 40) as u32;
    if width < min_size || height < min_size {
        bail!("chart must be at least {}x{} pixels", min_size, min_size);
    }

    let chart = chart::bar_chart(points)?;
    let root = SVGBackend::new(out_path, (width, height)).into_drawing_area();
    draw(&root, &chart, width as i32, height as i32, title, locale_tag)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn text_style<'a>(size: u32, color: &'a RGBColor, h: HPos, v: VPos) -> TextStyle<'a> {
    TextStyle::from(("sans-serif", size).into_font())
        .color(color)
        .pos(Pos::new(h, v))
}

fn draw<DB>(
    root: &DrawingArea<DB, Shift>,
    chart: &chart::BarChart,
    width: i32,
    height: i32,
    title: &str,
    locale_tag: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let left = MARGIN_LEFT;
    let right = width - MARGIN_RIGHT;
    let top = MARGIN_TOP;
    let bottom = height - MARGIN_BOTTOM;
    let plot_h = (bottom - top) as f64;

    root.draw(&Text::new(
        title.to_string(),
        (width / 2, 24),
        text_style(22, &BLACK, HPos::Center, VPos::Center),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    // Gridlines with their value labels, top to bottom.
    let steps = (GRIDLINES - 1) as f64;
    for (i, v) in chart.value_ticks.iter().enumerate() {
        let y = top + (plot_h * i as f64 / steps).round() as i32;
        root.draw(&PathElement::new(vec![(left, y), (right, y)], GRID_COLOR))
            .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            format!("${}", format::amount(*v, 0, locale_tag)),
            (left - 8, y),
            text_style(13, &LABEL_COLOR, HPos::Right, VPos::Center),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let n = chart.bars.len().max(1) as f64;
    let slot = (right - left) as f64 / n;
    let bar_w = (slot * 0.8).max(1.0);
    for (i, bar) in chart.bars.iter().enumerate() {
        let x0 = left + (slot * i as f64 + (slot - bar_w) / 2.0).round() as i32;
        let x1 = x0 + bar_w.round() as i32;
        let h = ((bar.height_pct / 100.0 * plot_h).round() as i32).max(MIN_BAR_PX);
        let y0 = bottom - h;
        let color = if bar.is_latest { LATEST_COLOR } else { BAR_COLOR };
        root.draw(&Rectangle::new([(x0, y0), (x1, bottom)], color.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;

        let cx = (x0 + x1) / 2;
        root.draw(&Text::new(
            format::short_date(bar.date),
            (cx, bottom + 8),
            text_style(12, &LABEL_COLOR, HPos::Center, VPos::Top),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;

        if bar.is_latest {
            root.draw(&Text::new(
                format!("${}", format::amount(bar.value, 0, locale_tag)),
                (cx, y0 - 6),
                text_style(13, &LATEST_COLOR, HPos::Center, VPos::Bottom),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
    }

    Ok(())
}
