//! Historical comparison: compare an indicator's current value with its value on a
//! past date or with a past year's average.
//!
//! The workflow is `Idle -> Comparing -> Success | Failed`. A comparison starts only on
//! an explicit action ([`ComparisonWorkflow::request`]); changing the indicator, the
//! mode, the date or the year puts it back to `Idle` and drops any result, including
//! one still in flight.

use crate::api::{Client, FetchJson};
use crate::compare::{ComparisonResult, Direction, compare, mean_of};
use crate::config::LookupTimeouts;
use crate::error::{Error, Result};
use crate::format;
use crate::models::{
    IndicatorId, IndicatorSnapshot, display_unit, is_weekend, parse_input_date, parse_input_year,
};
use crate::timeout::with_timeout;
use crate::widget::{Loadable, RequestToken, Widget};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonMode {
    #[default]
    Date,
    Year,
}

/// Validated input of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonQuery {
    Date(NaiveDate),
    Year(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceLabel {
    Date(DateTime<Utc>),
    YearAverage(i32),
}

impl ReferenceLabel {
    pub fn describe(&self) -> String {
        match self {
            ReferenceLabel::Date(d) => format::long_date(*d),
            ReferenceLabel::YearAverage(y) => format!("promedio de {}", y),
        }
    }
}

/// The value the current one is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub unit: String,
    pub value: f64,
    pub label: ReferenceLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub indicator: IndicatorId,
    pub current: f64,
    pub reference: Reference,
    pub result: ComparisonResult,
}

impl ComparisonOutcome {
    /// "Dólar observado ha aumentado en $12.30 (1.31%) en comparación con 02 de mayo de 2024"
    pub fn message(&self) -> String {
        let phrase = match self.result.direction {
            Direction::Unchanged => "se ha mantenido".to_string(),
            dir => format!("ha {}", dir.verb()),
        };
        format!(
            "{} {} en ${:.2} ({:.2}%) en comparación con {}",
            self.reference.name,
            phrase,
            self.result.absolute_difference,
            self.result.percentage_difference,
            self.reference.label.describe()
        )
    }
}

/// One issued comparison, ready to run on any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub token: RequestToken,
    pub indicator: IndicatorId,
    pub query: ComparisonQuery,
    pub timeouts: LookupTimeouts,
}

impl ComparisonRequest {
    /// Fetch the reference value and compare `current` against it.
    ///
    /// `current` is reused when it is the snapshot of the compared indicator; otherwise
    /// the compared indicator's current value is fetched first.
    pub fn execute<F>(
        &self,
        client: &Client<F>,
        current: Option<&IndicatorSnapshot>,
    ) -> Result<ComparisonOutcome>
    where
        F: FetchJson + Clone + Send + 'static,
    {
        let limit = match self.query {
            ComparisonQuery::Date(_) => self.timeouts.by_date,
            ComparisonQuery::Year(_) => self.timeouts.by_year,
        };

        let current = match current {
            Some(s) if s.id == self.indicator => s.clone(),
            _ => {
                let (c, id) = (client.clone(), self.indicator.clone());
                with_timeout(limit, move || c.get_indicator_value(&id))?
            }
        };

        let reference = match self.query {
            ComparisonQuery::Date(date) => {
                let (c, id) = (client.clone(), self.indicator.clone());
                let input = date.format("%Y-%m-%d").to_string();
                let point =
                    with_timeout(limit, move || c.get_historical_indicator_value(&id, &input))?;
                Reference {
                    name: current.name.clone(),
                    unit: current.display_unit(),
                    value: point.value,
                    label: ReferenceLabel::Date(point.date),
                }
            }
            ComparisonQuery::Year(year) => {
                let (c, id) = (client.clone(), self.indicator.clone());
                let series = with_timeout(limit, move || c.get_indicator_by_year(&id, year))?;
                let average = mean_of(&series.series)?;
                debug!(
                    "{} {}: average {} over {} points",
                    self.indicator,
                    year,
                    average,
                    series.series.len()
                );
                Reference {
                    name: series.name.clone(),
                    unit: display_unit(&series.unit),
                    value: average,
                    label: ReferenceLabel::YearAverage(year),
                }
            }
        };

        let result = compare(current.value, reference.value)?;
        Ok(ComparisonOutcome {
            indicator: self.indicator.clone(),
            current: current.value,
            reference,
            result,
        })
    }
}

/// State of the historical comparison widget.
#[derive(Debug, Clone, Default)]
pub struct ComparisonWorkflow {
    indicator: IndicatorId,
    mode: ComparisonMode,
    date_input: String,
    year_input: String,
    timeouts: LookupTimeouts,
    widget: Widget<ComparisonOutcome>,
}

impl ComparisonWorkflow {
    pub fn new(indicator: IndicatorId) -> Self {
        Self {
            indicator,
            ..Self::default()
        }
    }

    pub fn with_timeouts(mut self, timeouts: LookupTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn indicator(&self) -> &IndicatorId {
        &self.indicator
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn date_input(&self) -> &str {
        &self.date_input
    }

    pub fn year_input(&self) -> &str {
        &self.year_input
    }

    pub fn state(&self) -> &Loadable<ComparisonOutcome> {
        self.widget.state()
    }

    pub fn is_comparing(&self) -> bool {
        self.widget.state().is_loading()
    }

    /// Changing the indicator also clears the typed date and year.
    pub fn set_indicator(&mut self, indicator: IndicatorId) {
        if indicator != self.indicator {
            self.indicator = indicator;
            self.date_input.clear();
            self.year_input.clear();
            self.widget.reset();
        }
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) {
        if mode != self.mode {
            self.mode = mode;
            self.date_input.clear();
            self.year_input.clear();
            self.widget.reset();
        }
    }

    pub fn set_date(&mut self, input: &str) {
        if input != self.date_input {
            self.date_input = input.to_string();
            self.widget.reset();
        }
    }

    pub fn set_year(&mut self, input: &str) {
        if input != self.year_input {
            self.year_input = input.to_string();
            self.widget.reset();
        }
    }

    /// Validate the inputs against `today` and the mode.
    pub fn query(&self, today: NaiveDate) -> Result<ComparisonQuery> {
        match self.mode {
            ComparisonMode::Date => {
                if self.date_input.trim().is_empty() {
                    return Err(Error::Validation("Por favor, seleccione una fecha".into()));
                }
                let date = parse_input_date(&self.date_input)?;
                if date > today {
                    return Err(Error::Validation(
                        "La fecha seleccionada está en el futuro. Por favor, seleccione una fecha pasada."
                            .into(),
                    ));
                }
                if is_weekend(date) {
                    return Err(Error::Validation(
                        "La fecha seleccionada corresponde a un fin de semana. Por favor, seleccione un día hábil."
                            .into(),
                    ));
                }
                Ok(ComparisonQuery::Date(date))
            }
            ComparisonMode::Year => {
                if self.year_input.trim().is_empty() {
                    return Err(Error::Validation("Por favor, ingrese un año".into()));
                }
                parse_input_year(&self.year_input, today.year()).map(ComparisonQuery::Year)
            }
        }
    }

    /// Start a comparison. Invalid input moves straight to `Failed` without a request.
    pub fn request(&mut self, today: NaiveDate) -> Result<ComparisonRequest> {
        match self.query(today) {
            Ok(query) => {
                let token = self.widget.begin();
                info!("comparing {} against {:?} (#{})", self.indicator, query, token.value());
                Ok(ComparisonRequest {
                    token,
                    indicator: self.indicator.clone(),
                    query,
                    timeouts: self.timeouts,
                })
            }
            Err(e) => {
                self.widget.fail(e.clone());
                Err(e)
            }
        }
    }

    /// Re-issue the identical request after a failure.
    pub fn retry(&mut self, today: NaiveDate) -> Option<Result<ComparisonRequest>> {
        if matches!(self.widget.state(), Loadable::Failed(_)) {
            Some(self.request(today))
        } else {
            None
        }
    }

    /// Apply the response of `token`; stale responses are dropped.
    pub fn finish(&mut self, token: RequestToken, result: Result<ComparisonOutcome>) -> bool {
        self.widget.finish(token, result)
    }

    /// Request, execute and finish on the calling thread.
    pub fn run<F>(
        &mut self,
        client: &Client<F>,
        current: Option<&IndicatorSnapshot>,
        today: NaiveDate,
    ) -> &Loadable<ComparisonOutcome>
    where
        F: FetchJson + Clone + Send + 'static,
    {
        if let Ok(req) = self.request(today) {
            let result = req.execute(client, current);
            self.finish(req.token, result);
        }
        self.widget.state()
    }

    /// What the widget shows: the result message, the error message, or nothing.
    pub fn message(&self) -> Option<String> {
        match self.widget.state() {
            Loadable::Success(outcome) => Some(outcome.message()),
            Loadable::Failed(e) => Some(e.user_message(&self.subject())),
            _ => None,
        }
    }

    fn subject(&self) -> String {
        match self.mode {
            ComparisonMode::Date => format!("{} en la fecha seleccionada", self.indicator.label()),
            ComparisonMode::Year => format!(
                "{} en el año {}",
                self.indicator.label(),
                self.year_input.trim()
            ),
        }
    }
}
