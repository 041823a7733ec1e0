//! CLP / USD conversion at the current `dolar` rate.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converter {
    /// Pesos per dollar.
    rate: f64,
}

impl Converter {
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::Validation(format!(
                "Tipo de cambio inválido: {}",
                rate
            )));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn clp_to_usd(&self, clp: f64) -> f64 {
        clp / self.rate
    }

    pub fn usd_to_clp(&self, usd: f64) -> f64 {
        usd * self.rate
    }

    /// Convert a typed CLP amount into a USD field value with 2 decimals.
    ///
    /// Empty or non-numeric input clears the other field (`None`).
    pub fn clp_field_to_usd(&self, input: &str) -> Option<String> {
        parse_amount(input).map(|clp| format!("{:.2}", self.clp_to_usd(clp)))
    }

    /// Convert a typed USD amount into a CLP field value with no decimals.
    pub fn usd_field_to_clp(&self, input: &str) -> Option<String> {
        parse_amount(input).map(|usd| format!("{:.0}", self.usd_to_clp(usd)))
    }
}

fn parse_amount(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
