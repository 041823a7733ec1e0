//! Error taxonomy shared by the data access layer, the comparison engine and the widgets.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a user action and a rendered value.
///
/// The type is `Clone` so a failed widget can keep the error it ended in.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Transport/connection failure or a non-success HTTP status other than 404.
    #[error("network error: {0}")]
    Network(String),

    /// Body was not well-formed JSON, or did not have the expected shape.
    #[error("could not parse response: {0}")]
    Parse(String),

    /// Indicator, date or year absent from the response.
    #[error("not found: {0}")]
    NotFound(String),

    /// User input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The caller's timer expired before the response arrived.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("percentage change is undefined for a zero reference value")]
    DivisionByZero,

    #[error("cannot average an empty series")]
    EmptySeries,
}

/// Discriminant of [`Error`], for callers that branch on the category only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Parse,
    NotFound,
    Validation,
    Timeout,
    DivisionByZero,
    EmptySeries,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) => ErrorKind::Network,
            Error::Parse(_) => ErrorKind::Parse,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::DivisionByZero => ErrorKind::DivisionByZero,
            Error::EmptySeries => ErrorKind::EmptySeries,
        }
    }

    /// Message shown to the user at the widget boundary.
    ///
    /// `subject` names what was being fetched, e.g. `"DOLAR"` or `"DOLAR en el año 2022"`.
    pub fn user_message(&self, subject: &str) -> String {
        match self {
            Error::Network(_) => format!(
                "Error al obtener datos de {}. Por favor, intente nuevamente.",
                subject
            ),
            Error::Parse(_) => format!(
                "La respuesta recibida para {} no es válida. Por favor, intente nuevamente.",
                subject
            ),
            Error::NotFound(_) => format!(
                "No hay datos disponibles para {}. Intente con otra fecha o indicador.",
                subject
            ),
            // Validation messages are written for the user already.
            Error::Validation(msg) => msg.clone(),
            Error::Timeout(_) => {
                "La consulta está tomando demasiado tiempo. Por favor, intente más tarde.".to_string()
            }
            Error::DivisionByZero => format!(
                "No se puede calcular la variación porcentual de {}: el valor de referencia es cero.",
                subject
            ),
            Error::EmptySeries => format!(
                "No hay datos disponibles para {}.",
                subject
            ),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Parse(e.to_string())
        } else if let Some(status) = e.status()
            && status == reqwest::StatusCode::NOT_FOUND
        {
            Error::NotFound(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}
