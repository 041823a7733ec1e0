//! Synchronous client for the **mindicador.cl** indicators API.
//!
//! Every operation is a single GET through a [`FetchJson`] implementation followed by a
//! typed extraction of the JSON body. There is no retry and no total timeout here; callers
//! that want one race the call with [`crate::timeout::with_timeout`].
//!
//! ### Endpoints
//! - `GET {base}`: snapshot of all indicators, keyed by id
//! - `GET {base}/{id}`: recent series of one indicator, newest first
//! - `GET {base}/{id}/{dd-mm-yyyy}`: value on one date (empty `serie` on holidays/weekends)
//! - `GET {base}/{id}/{yyyy}`: every value during one year
//!
//! Typical usage:
//! ```no_run
//! # use infodivisas::{Client, ClientConfig, IndicatorId};
//! let client = Client::new(ClientConfig::default())?;
//! let dolar = client.get_indicator_value(&IndicatorId::Dolar)?;
//! println!("{} {}", dolar.value, dolar.display_unit());
//! # Ok::<(), infodivisas::Error>(())
//! ```
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    IndicatorId, IndicatorSeries, IndicatorSnapshot, RawIndicator, RawSeries, SeriesPoint,
    provider_date, recent_window, validate_year,
};
use chrono::{Datelike, Local};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::collections::BTreeMap;

/// Number of points kept for the recent-values chart.
pub const SERIES_WINDOW: usize = 30;

/// One HTTP GET returning a JSON document.
///
/// This is the only place the data access layer touches the network, which lets tests
/// substitute a recording stub.
pub trait FetchJson {
    fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// [`FetchJson`] over a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: HttpClient,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            // no total timeout; callers race the call instead
            .timeout(None)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(5))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Network(format!("http client build: {}", e)))?;
        Ok(Self { http })
    }
}

impl FetchJson for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            warn!("GET {} -> {}", url, status);
            return Err(Error::NotFound(format!("GET {} returned HTTP 404", url)));
        }
        if !status.is_success() {
            warn!("GET {} -> {}", url, status);
            return Err(Error::Network(format!("GET {} failed with HTTP {}", url, status)));
        }
        let body = resp.text()?;
        serde_json::from_str(&body).map_err(|e| Error::Parse(format!("GET {}: {}", url, e)))
    }
}

// Allow - and _ unescaped in ids
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

fn enc(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment.trim(), SAFE).to_string()
}

#[derive(Debug, Clone)]
pub struct Client<F = HttpFetcher> {
    pub base_url: String,
    fetcher: F,
}

impl Client<HttpFetcher> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config.base_url, fetcher))
    }
}

impl<F: FetchJson> Client<F> {
    pub fn with_fetcher(base_url: impl Into<String>, fetcher: F) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for s in segments {
            url.push('/');
            url.push_str(&enc(s));
        }
        url
    }

    fn get_series(&self, url: &str) -> Result<RawSeries> {
        let v = self.fetcher.fetch_json(url)?;
        serde_json::from_value(v).map_err(|e| Error::Parse(format!("GET {}: {}", url, e)))
    }

    /// Fetch the current snapshot of every indicator.
    ///
    /// Malformed entries are logged and left out.
    ///
    /// ### Errors
    /// - `Network` on transport failure or a failed HTTP status
    /// - `Parse` if the body is not an object
    pub fn get_all_indicators(&self) -> Result<BTreeMap<IndicatorId, IndicatorSnapshot>> {
        let url = self.url(&[]);
        let v = self.fetcher.fetch_json(&url)?;
        parse_snapshot(&v)
    }

    /// Fetch the snapshot and project one indicator out of it.
    ///
    /// Only the requested entry is decoded; other entries never fail this call.
    pub fn get_indicator_value(&self, id: &IndicatorId) -> Result<IndicatorSnapshot> {
        let url = self.url(&[]);
        let v = self.fetcher.fetch_json(&url)?;
        let obj = v
            .as_object()
            .ok_or_else(|| Error::Parse("unexpected response shape: not a top-level object".into()))?;
        let entry = obj
            .get(id.as_str())
            .filter(|e| e.get("codigo").is_some())
            .ok_or_else(|| Error::NotFound(format!("indicator '{}' not in snapshot", id)))?;
        let raw: RawIndicator = serde_json::from_value(entry.clone())
            .map_err(|e| Error::Parse(format!("indicator '{}': {}", id, e)))?;
        Ok(IndicatorSnapshot::from_raw(id.clone(), raw))
    }

    /// Value of `id` on `date` (`yyyy-mm-dd`).
    ///
    /// The provider answers weekends and holidays with an empty `serie`, surfaced here as
    /// `NotFound`. Callers should reject weekend dates before calling.
    pub fn get_historical_indicator_value(&self, id: &IndicatorId, date: &str) -> Result<SeriesPoint> {
        let segment = provider_date(date)?;
        let url = self.url(&[id.as_str(), &segment]);
        let raw = self.get_series(&url)?;
        raw.serie
            .into_iter()
            .next()
            .map(SeriesPoint::from)
            .ok_or_else(|| Error::NotFound(format!("no '{}' value on {}", id, date.trim())))
    }

    /// Every value of `id` during `year`, oldest to newest.
    ///
    /// `year` must lie in `[2000, current year]`; otherwise no request is made.
    pub fn get_indicator_by_year(&self, id: &IndicatorId, year: i32) -> Result<IndicatorSeries> {
        let year = validate_year(year, Local::now().year())?;
        let url = self.url(&[id.as_str(), &year.to_string()]);
        let raw = self.get_series(&url)?;
        Ok(IndicatorSeries::from_raw(id.clone(), raw))
    }

    /// The latest [`SERIES_WINDOW`] values of `id`, oldest to newest.
    pub fn get_indicator_series(&self, id: &IndicatorId) -> Result<Vec<SeriesPoint>> {
        let url = self.url(&[id.as_str()]);
        let raw = self.get_series(&url)?;
        Ok(recent_window(
            raw.serie.into_iter().map(SeriesPoint::from),
            SERIES_WINDOW,
        ))
    }
}

/// Extract typed indicators from a snapshot body.
///
/// Besides the indicators the snapshot carries metadata keys (`version`, `autor`,
/// `fecha`); only object entries with a `codigo` are indicators.
pub fn parse_snapshot(v: &Value) -> Result<BTreeMap<IndicatorId, IndicatorSnapshot>> {
    let obj = v
        .as_object()
        .ok_or_else(|| Error::Parse("unexpected response shape: not a top-level object".into()))?;
    let mut out = BTreeMap::new();
    for (key, entry) in obj {
        if entry.get("codigo").is_none() {
            continue;
        }
        let id: IndicatorId = match key.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!("skipping snapshot entry with unusable key '{}'", key);
                continue;
            }
        };
        match serde_json::from_value::<RawIndicator>(entry.clone()) {
            Ok(raw) => {
                out.insert(id.clone(), IndicatorSnapshot::from_raw(id, raw));
            }
            Err(e) => warn!("skipping malformed snapshot entry '{}': {}", key, e),
        }
    }
    Ok(out)
}
