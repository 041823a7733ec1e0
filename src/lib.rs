//! infodivisas
//!
//! A small Rust library for following Chilean currency indicators published by
//! [mindicador.cl](https://mindicador.cl). Pairs with the `infodivisas` CLI and the
//! `infodivisas-gui` dashboard.
//!
//! ### Features
//! - Current value of every indicator (dólar, euro, UF, UTM, ...)
//! - Compare the current value with a past date or a past year's average
//! - CLP / USD converter at the current dollar rate
//! - Last 30 values as a bar chart (SVG) with summary statistics
//! - Export a fetched series as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use infodivisas::{Client, ClientConfig, IndicatorId, compare};
//!
//! let client = Client::new(ClientConfig::default())?;
//! let now = client.get_indicator_value(&IndicatorId::Dolar)?;
//! let then = client.get_historical_indicator_value(&IndicatorId::Dolar, "2024-05-02")?;
//! let diff = compare::compare(now.value, then.value)?;
//! println!("{:?} {:.2}%", diff.direction, diff.percentage_difference);
//!
//! let series = client.get_indicator_series(&IndicatorId::Dolar)?;
//! infodivisas::viz::plot_bars(&series, "dolar.svg", 1000, 400, "Dólar", "es")
//!     .map_err(|e| infodivisas::Error::Validation(e.to_string()))?;
//! # Ok::<(), infodivisas::Error>(())
//! ```

pub mod api;
pub mod chart;
pub mod compare;
pub mod config;
pub mod converter;
pub mod error;
pub mod format;
pub mod models;
pub mod stats;
pub mod storage;
pub mod timeout;
pub mod viz;
pub mod widget;
pub mod workflow;

pub use api::{Client, FetchJson, HttpFetcher};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use models::{IndicatorId, IndicatorSeries, IndicatorSnapshot, SeriesPoint};
