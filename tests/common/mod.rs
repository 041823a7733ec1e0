#![allow(dead_code)]

use infodivisas::{Client, Error, FetchJson, Result};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const BASE: &str = "http://stub.local/api";

/// Serves canned JSON by URL and records every URL it was asked for.
#[derive(Clone, Default)]
pub struct StubFetcher {
    responses: Arc<HashMap<String, Result<Value>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl StubFetcher {
    pub fn new(responses: Vec<(&str, Result<Value>)>) -> Self {
        let map = responses
            .into_iter()
            .map(|(path, v)| (format!("{}{}", BASE, path), v))
            .collect();
        Self {
            responses: Arc::new(map),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn client(&self) -> Client<StubFetcher> {
        Client::with_fetcher(BASE, self.clone())
    }
}

impl FetchJson for StubFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(d) = self.delay {
            thread::sleep(d);
        }
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Error::NotFound(format!("no stub for {}", url))))
    }
}

pub fn snapshot() -> Value {
    json!({
        "version": "1.7.0",
        "autor": "mindicador.cl",
        "fecha": "2024-05-06T20:00:00.000Z",
        "uf": {
            "codigo": "uf",
            "nombre": "Unidad de fomento (UF)",
            "unidad_medida": "Pesos",
            "fecha": "2024-05-06T04:00:00.000Z",
            "valor": 37250.11
        },
        "dolar": {
            "codigo": "dolar",
            "nombre": "Dólar observado",
            "unidad_medida": "Pesos",
            "fecha": "2024-05-06T04:00:00.000Z",
            "valor": 950.5
        },
        "tasa_desempleo": {
            "codigo": "tasa_desempleo",
            "nombre": "Tasa de desempleo",
            "unidad_medida": "Porcentaje",
            "fecha": "2024-03-01T03:00:00.000Z",
            "valor": 8.7
        }
    })
}

/// A `serie` body with one point per (day-of-May-2024, value), in the given order.
pub fn may_series(points: &[(u32, f64)]) -> Value {
    let serie: Vec<Value> = points
        .iter()
        .map(|(day, v)| json!({ "fecha": format!("2024-05-{:02}T04:00:00.000Z", day), "valor": v }))
        .collect();
    json!({
        "version": "1.7.0",
        "autor": "mindicador.cl",
        "codigo": "dolar",
        "nombre": "Dólar observado",
        "unidad_medida": "Pesos",
        "serie": serie
    })
}
