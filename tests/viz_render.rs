use chrono::{TimeZone, Utc};
use infodivisas::SeriesPoint;
use infodivisas::viz;
use std::fs;

fn sample_points(n: u32) -> Vec<SeriesPoint> {
    (1..=n)
        .map(|d| SeriesPoint {
            date: Utc.with_ymd_and_hms(2024, 5, d, 4, 0, 0).unwrap(),
            value: 930.0 + d as f64,
        })
        .collect()
}

#[test]
fn renders_svg_bar_chart() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dolar.svg");
    viz::plot_bars(&sample_points(22), &out, 900, 360, "Histórico DOLAR", "es").unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("<rect"));
    assert!(svg.contains("Histórico DOLAR"));
    // latest value printed on top of its bar
    assert!(svg.contains("$952"));
}

#[test]
fn flat_series_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("flat.svg");
    let mut points = sample_points(3);
    for p in &mut points {
        p.value = 100.0;
    }
    viz::plot_bars(&points, &out, 400, 300, "flat", "en").unwrap();
    assert!(fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn rejects_non_svg_and_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("chart.png");
    assert!(viz::plot_bars(&sample_points(5), &png, 800, 400, "t", "es").is_err());
    assert!(!png.exists());

    let svg = dir.path().join("empty.svg");
    assert!(viz::plot_bars(&[], &svg, 800, 400, "t", "es").is_err());

    let tiny = dir.path().join("tiny.svg");
    assert!(viz::plot_bars(&sample_points(5), &tiny, 50, 50, "t", "es").is_err());
}
