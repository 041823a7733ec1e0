use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Earliest year the provider serves yearly series for.
pub const MIN_YEAR: i32 = 2000;

/// Identifier of an indicator as used in the provider's URLs and snapshot keys.
///
/// The known ids are listed explicitly; anything else that looks like an id is kept
/// as `Other` so new indicators published by the provider still work.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndicatorId {
    Uf,
    Ivp,
    #[default]
    Dolar,
    DolarIntercambio,
    Euro,
    Ipc,
    Utm,
    Imacec,
    Tpm,
    LibraCobre,
    TasaDesempleo,
    Bitcoin,
    Other(String),
}

impl IndicatorId {
    pub const KNOWN: [IndicatorId; 12] = [
        IndicatorId::Uf,
        IndicatorId::Ivp,
        IndicatorId::Dolar,
        IndicatorId::DolarIntercambio,
        IndicatorId::Euro,
        IndicatorId::Ipc,
        IndicatorId::Utm,
        IndicatorId::Imacec,
        IndicatorId::Tpm,
        IndicatorId::LibraCobre,
        IndicatorId::TasaDesempleo,
        IndicatorId::Bitcoin,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IndicatorId::Uf => "uf",
            IndicatorId::Ivp => "ivp",
            IndicatorId::Dolar => "dolar",
            IndicatorId::DolarIntercambio => "dolar_intercambio",
            IndicatorId::Euro => "euro",
            IndicatorId::Ipc => "ipc",
            IndicatorId::Utm => "utm",
            IndicatorId::Imacec => "imacec",
            IndicatorId::Tpm => "tpm",
            IndicatorId::LibraCobre => "libra_cobre",
            IndicatorId::TasaDesempleo => "tasa_desempleo",
            IndicatorId::Bitcoin => "bitcoin",
            IndicatorId::Other(s) => s,
        }
    }

    /// Upper-case label used in selectors and messages ("DOLAR").
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_ascii_lowercase();
        if id.is_empty() {
            return Err(Error::Validation("Por favor, seleccione un indicador".into()));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(Error::Validation(format!("Indicador inválido: {}", s.trim())));
        }
        let known = IndicatorId::KNOWN.iter().find(|k| k.as_str() == id).cloned();
        Ok(known.unwrap_or(IndicatorId::Other(id)))
    }
}

impl Serialize for IndicatorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IndicatorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw snapshot entry as served by `GET {base}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIndicator {
    pub codigo: String,
    pub nombre: String,
    pub unidad_medida: String,
    pub fecha: DateTime<Utc>,
    pub valor: f64,
}

/// Raw point of a `serie` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeriesPoint {
    pub fecha: DateTime<Utc>,
    pub valor: f64,
}

/// Raw body of the per-indicator endpoints (`/{id}`, `/{id}/{date}`, `/{id}/{year}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub unidad_medida: Option<String>,
    #[serde(default)]
    pub serie: Vec<RawSeriesPoint>,
}

/// Current value of one indicator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    pub id: IndicatorId,
    pub name: String,
    pub code: String,
    pub unit: String,
    pub value: f64,
    pub date: DateTime<Utc>,
}

impl IndicatorSnapshot {
    pub fn from_raw(id: IndicatorId, raw: RawIndicator) -> Self {
        Self {
            id,
            name: raw.nombre,
            code: raw.codigo,
            unit: raw.unidad_medida,
            value: raw.valor,
            date: raw.fecha,
        }
    }

    pub fn display_unit(&self) -> String {
        display_unit(&self.unit)
    }
}

/// The provider reports the peso as "Pesos"; everywhere else we show the ISO code.
pub fn display_unit(unit: &str) -> String {
    if unit.trim().eq_ignore_ascii_case("pesos") {
        "CLP".to_string()
    } else {
        unit.to_string()
    }
}

/// One observation of a series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

impl From<RawSeriesPoint> for SeriesPoint {
    fn from(p: RawSeriesPoint) -> Self {
        Self {
            date: p.fecha,
            value: p.valor,
        }
    }
}

/// A named series, e.g. every value of one indicator during a year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSeries {
    pub id: IndicatorId,
    pub code: String,
    pub name: String,
    pub unit: String,
    /// Oldest to newest.
    pub series: Vec<SeriesPoint>,
}

impl IndicatorSeries {
    pub fn from_raw(id: IndicatorId, raw: RawSeries) -> Self {
        let mut series: Vec<SeriesPoint> = raw.serie.into_iter().map(SeriesPoint::from).collect();
        series.sort_by_key(|p| p.date);
        Self {
            code: raw.codigo.unwrap_or_else(|| id.as_str().to_string()),
            name: raw.nombre.unwrap_or_else(|| id.label()),
            unit: raw.unidad_medida.unwrap_or_default(),
            id,
            series,
        }
    }

    pub fn display_unit(&self) -> String {
        display_unit(&self.unit)
    }
}

/// Keep the newest `max` points, ordered oldest to newest.
pub fn recent_window(points: impl IntoIterator<Item = SeriesPoint>, max: usize) -> Vec<SeriesPoint> {
    let mut pts: Vec<SeriesPoint> = points.into_iter().collect();
    // Newest first, then cut, then flip.
    pts.sort_by(|a, b| b.date.cmp(&a.date));
    pts.truncate(max);
    pts.reverse();
    pts
}

/// Parse a `yyyy-mm-dd` date as typed in a date input.
pub fn parse_input_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "Fecha inválida: {}. Use el formato aaaa-mm-dd",
            input.trim()
        ))
    })
}

/// Reformat a `yyyy-mm-dd` input into the provider's `dd-mm-yyyy` path segment.
pub fn provider_date(input: &str) -> Result<String> {
    Ok(parse_input_date(input)?.format("%d-%m-%Y").to_string())
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Year bounds check for yearly lookups.
pub fn validate_year(year: i32, current_year: i32) -> Result<i32> {
    if (MIN_YEAR..=current_year).contains(&year) {
        Ok(year)
    } else {
        Err(Error::Validation(format!(
            "Por favor, ingrese un año entre {} y {}",
            MIN_YEAR, current_year
        )))
    }
}

/// Parse a year typed as text and check its bounds.
pub fn parse_input_year(input: &str, current_year: i32) -> Result<i32> {
    let year = input
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Validation(format!("Año inválido: {}", input.trim())))?;
    validate_year(year, current_year)
}
