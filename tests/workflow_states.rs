mod common;

use chrono::NaiveDate;
use common::{StubFetcher, may_series, snapshot};
use infodivisas::compare::Direction;
use infodivisas::config::LookupTimeouts;
use infodivisas::widget::Loadable;
use infodivisas::workflow::{ComparisonMode, ComparisonQuery, ComparisonWorkflow, ReferenceLabel};
use infodivisas::{Error, ErrorKind, IndicatorId};
use serde_json::json;
use std::time::Duration;

// A Friday.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn date_stub() -> StubFetcher {
    StubFetcher::new(vec![
        ("", Ok(snapshot())),
        ("/dolar/02-05-2024", Ok(may_series(&[(2, 935.15)]))),
    ])
}

#[test]
fn compare_by_date_succeeds() {
    let stub = date_stub();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), None, today());

    let outcome = wf.state().success().expect("comparison succeeded");
    assert_eq!(outcome.current, 950.5);
    assert_eq!(outcome.reference.value, 935.15);
    assert_eq!(outcome.reference.unit, "CLP");
    assert_eq!(outcome.result.direction, Direction::Increased);
    assert!((outcome.result.absolute_difference - 15.35).abs() < 1e-9);
    assert!(matches!(outcome.reference.label, ReferenceLabel::Date(_)));
    assert_eq!(
        wf.message().unwrap(),
        "Dólar observado ha aumentado en $15.35 (1.64%) en comparación con 02 de mayo de 2024"
    );
}

#[test]
fn loaded_snapshot_of_same_indicator_is_reused() {
    let stub = date_stub();
    let current = stub
        .client()
        .get_indicator_value(&IndicatorId::Dolar)
        .unwrap();
    let before = stub.calls().len();

    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), Some(&current), today());
    assert!(wf.state().success().is_some());
    assert_eq!(stub.calls().len(), before + 1);
}

#[test]
fn snapshot_of_other_indicator_triggers_fetch_of_compared_one() {
    let body = json!({
        "nombre": "Unidad de fomento (UF)",
        "unidad_medida": "Pesos",
        "serie": [{ "fecha": "2024-05-02T04:00:00.000Z", "valor": 37250.11 }]
    });
    let stub = StubFetcher::new(vec![("", Ok(snapshot())), ("/uf/02-05-2024", Ok(body))]);
    let dolar = stub
        .client()
        .get_indicator_value(&IndicatorId::Dolar)
        .unwrap();

    let mut wf = ComparisonWorkflow::new(IndicatorId::Uf);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), Some(&dolar), today());
    let outcome = wf.state().success().unwrap();
    assert_eq!(outcome.indicator, IndicatorId::Uf);
    assert_eq!(outcome.current, 37250.11);
    assert_eq!(outcome.result.direction, Direction::Unchanged);
    assert_eq!(
        wf.message().unwrap(),
        "Unidad de fomento (UF) se ha mantenido en $0.00 (0.00%) en comparación con 02 de mayo de 2024"
    );
}

#[test]
fn compare_by_year_uses_average() {
    let body = json!({
        "nombre": "Dólar observado",
        "unidad_medida": "Pesos",
        "serie": [
            { "fecha": "2022-03-01T03:00:00.000Z", "valor": 800.0 },
            { "fecha": "2022-06-01T04:00:00.000Z", "valor": 900.0 },
            { "fecha": "2022-09-01T04:00:00.000Z", "valor": 1000.0 }
        ]
    });
    let stub = StubFetcher::new(vec![("", Ok(snapshot())), ("/dolar/2022", Ok(body))]);
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_mode(ComparisonMode::Year);
    wf.set_year("2022");
    wf.run(&stub.client(), None, today());

    let outcome = wf.state().success().unwrap();
    assert_eq!(outcome.reference.value, 900.0);
    assert_eq!(outcome.reference.label, ReferenceLabel::YearAverage(2022));
    assert_eq!(
        wf.message().unwrap(),
        "Dólar observado ha aumentado en $50.50 (5.61%) en comparación con promedio de 2022"
    );
}

#[test]
fn empty_year_is_a_hard_error() {
    let stub = StubFetcher::new(vec![
        ("", Ok(snapshot())),
        ("/dolar/2023", Ok(json!({ "serie": [] }))),
    ]);
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_mode(ComparisonMode::Year);
    wf.set_year("2023");
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.state().error(), Some(&Error::EmptySeries));
    assert_eq!(
        wf.message().unwrap(),
        "No hay datos disponibles para DOLAR en el año 2023."
    );
}

#[test]
fn weekend_and_future_dates_are_rejected_without_requests() {
    let stub = date_stub();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);

    wf.set_date("2024-05-04"); // Saturday
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.state().error().map(|e| e.kind()), Some(ErrorKind::Validation));
    assert!(wf.message().unwrap().contains("fin de semana"));

    wf.set_date("2024-05-20");
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.state().error().map(|e| e.kind()), Some(ErrorKind::Validation));

    wf.set_date("");
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.message().unwrap(), "Por favor, seleccione una fecha");

    assert!(stub.calls().is_empty());
}

#[test]
fn out_of_range_year_is_rejected_without_requests() {
    let stub = date_stub();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_mode(ComparisonMode::Year);
    for year in ["1999", "2025", "abc"] {
        wf.set_year(year);
        wf.run(&stub.client(), None, today());
        assert_eq!(wf.state().error().map(|e| e.kind()), Some(ErrorKind::Validation));
    }
    assert_eq!(
        wf.query(today()).unwrap_err(),
        Error::Validation("Año inválido: abc".into())
    );
    assert!(stub.calls().is_empty());
}

#[test]
fn changing_inputs_resets_to_idle() {
    let stub = date_stub();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), None, today());
    assert!(wf.state().success().is_some());

    wf.set_date("2024-05-03");
    assert_eq!(wf.state(), &Loadable::Idle);
    assert!(wf.message().is_none());

    wf.set_date("2024-05-02");
    wf.run(&stub.client(), None, today());
    wf.set_mode(ComparisonMode::Year);
    assert_eq!(wf.state(), &Loadable::Idle);
    assert_eq!(wf.date_input(), "");

    wf.set_year("2022");
    wf.set_indicator(IndicatorId::Euro);
    assert_eq!(wf.state(), &Loadable::Idle);
    assert_eq!(wf.year_input(), "");
}

#[test]
fn response_after_reset_is_discarded() {
    let stub = date_stub();
    let client = stub.client();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");

    let req = wf.request(today()).unwrap();
    assert!(wf.is_comparing());
    let result = req.execute(&client, None);

    wf.set_date("2024-05-03");
    assert!(!wf.finish(req.token, result));
    assert_eq!(wf.state(), &Loadable::Idle);
}

#[test]
fn older_of_two_overlapping_requests_is_discarded() {
    let stub = date_stub();
    let client = stub.client();
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");

    let first = wf.request(today()).unwrap();
    let second = wf.request(today()).unwrap();
    assert!(second.token > first.token);

    assert!(wf.finish(second.token, second.execute(&client, None)));
    assert!(!wf.finish(first.token, Err(Error::Network("late".into()))));
    assert!(wf.state().success().is_some());
}

#[test]
fn retry_reissues_identical_request() {
    let stub = StubFetcher::new(vec![("", Err(Error::Network("connection reset".into())))]);
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.state().error().map(|e| e.kind()), Some(ErrorKind::Network));
    assert_eq!(
        wf.message().unwrap(),
        "Error al obtener datos de DOLAR en la fecha seleccionada. Por favor, intente nuevamente."
    );

    let again = wf.retry(today()).unwrap().unwrap();
    assert_eq!(
        again.query,
        ComparisonQuery::Date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
    );
    assert_eq!(again.indicator, IndicatorId::Dolar);
    assert!(wf.is_comparing());
    // nothing to retry while a comparison is running
    assert!(wf.retry(today()).is_none());
}

#[test]
fn slow_lookup_times_out() {
    let stub = date_stub().with_delay(Duration::from_millis(300));
    let timeouts = LookupTimeouts {
        by_date: Duration::from_millis(20),
        by_year: Duration::from_millis(20),
    };
    let mut wf = ComparisonWorkflow::new(IndicatorId::Dolar).with_timeouts(timeouts);
    wf.set_date("2024-05-02");
    wf.run(&stub.client(), None, today());
    assert_eq!(wf.state().error().map(|e| e.kind()), Some(ErrorKind::Timeout));
    assert!(wf.message().unwrap().contains("demasiado tiempo"));
}
