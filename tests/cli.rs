use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("infodivisas"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn convert_with_explicit_rate_needs_no_network() {
    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.args(["convert", "--rate", "950", "--clp", "9500"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("9500 CLP = 10.00 USD"));

    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.args(["convert", "--rate", "950.5", "--usd", "50"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("50 USD = 47525 CLP"));
}

#[test]
fn convert_rejects_bad_amount_and_missing_flags() {
    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.args(["convert", "--rate", "950", "--clp", "mucho"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid CLP amount"));

    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.args(["compare", "--indicator", "dolar"]);
    cmd.assert().failure();
}

#[test]
fn compare_rejects_weekend_before_any_request() {
    // unreachable base url: validation must fail first
    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.args([
        "--base-url",
        "http://127.0.0.1:9/api",
        "compare",
        "-i",
        "dolar",
        "-d",
        "2024-05-04",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("fin de semana"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn list_online_snapshot() {
    let mut cmd = Command::cargo_bin("infodivisas").unwrap();
    cmd.arg("list");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dolar"));
}
