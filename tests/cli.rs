use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use wbi_edu::storage;
use wbi_edu::table::{Observation, ObservationTable};

fn write_cache(path: &std::path::Path) {
    let columns = wbi_edu::IndicatorCatalog::education().names();
    let mut t = ObservationTable::new(columns.clone());
    for (c, y, v) in [
        ("KE", 2022, 1.0),
        ("SN", 2022, 2.0),
        ("NG", 2022, 3.0),
        ("KE", 2023, 1.0),
        ("SN", 2023, 2.0),
        ("NG", 2023, 3.0),
    ] {
        let mut values = vec![None; columns.len()];
        values[0] = Some(v);
        t.push(Observation {
            country: c.into(),
            country_name: c.into(),
            year: y,
            values,
        })
        .unwrap();
    }
    storage::save_table_csv(&t, path).unwrap();
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("wbi-edu"));
}

#[test]
fn cli_lists_indicators() {
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.arg("indicators");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SE.PRM.CMPT.ZS"))
        .stdout(predicate::str::contains("primary_completion_rate"));
}

#[test]
fn offline_without_cache_halts_with_notice() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path())
        .args(["--offline", "--cache-file"])
        .arg(dir.path().join("missing.csv"))
        .arg("show");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No data available"));
}

#[test]
fn offline_with_cache_prints_gini_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache.csv");
    write_cache(&cache);
    let export = dir.path().join("export.csv");
    let gini = dir.path().join("gini.json");

    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path())
        .args(["--offline", "--cache-file"])
        .arg(&cache)
        .args(["show", "--years", "2022:2023", "--export"])
        .arg(&export)
        .arg("--gini-out")
        .arg(&gini);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Local data loaded"))
        .stdout(predicate::str::contains("2023  0.2222"))
        .stdout(predicate::str::contains("KE had the lowest value"));

    let bytes = fs::read(&export).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&gini).unwrap()).unwrap();
    assert_eq!(v["points"].as_array().unwrap().len(), 2);
}

#[test]
fn invalid_years_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache.csv");
    write_cache(&cache);
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path())
        .args(["--offline", "--cache-file"])
        .arg(&cache)
        .args(["show", "--years", "twenty"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid --years"));
}

#[test]
fn countries_flag_selects_iso2_codes_and_reports_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache.csv");
    write_cache(&cache);
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path())
        .args(["--offline", "--cache-file"])
        .arg(&cache)
        .args(["show", "--years", "2023", "--countries", "sn,NG,XX"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Not in the data: XX"))
        .stdout(predicate::str::contains("2023  0.1"))
        .stdout(predicate::str::contains("SN had the lowest value"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn load_online() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wbi-edu").unwrap();
    cmd.args(["--cache-file"])
        .arg(dir.path().join("cache.csv"))
        .arg("load");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Data loaded from the API"));
}
