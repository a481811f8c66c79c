//! Integration tests for the kml-fix binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a CLI command
fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kml-fix"))
}

fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join("lands.kml");
    fs::write(
        &path,
        r##"<?xml version="1.0" encoding="utf-8" ?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document id="root_doc">
<Schema name="Lands" id="Lands">
  <SimpleField name="ComplexNam" type="string"/>
  <SimpleField name="DivName" type="string"/>
</Schema>
<Folder><name>Lands</name>
  <Placemark>
    <ExtendedData><SchemaData schemaUrl="#Lands">
      <SimpleData name="ComplexNam">Main St Depot</SimpleData>
      <SimpleData name="DivName">East</SimpleData>
    </SchemaData></ExtendedData>
    <Point><coordinates>-78.6,35.7</coordinates></Point>
  </Placemark>
</Folder>
</Document>
</kml>
"##,
    )
    .unwrap();
    path
}

#[test]
fn test_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixes KML files"))
        .stdout(predicate::str::contains("--name-field"));
}

#[test]
fn test_fix_sample_file() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());
    let out = dir.path().join("fixed");

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Named 1 placemarks"))
        .stdout(predicate::str::contains("Wrote 1 rows"));

    let kml = fs::read_to_string(out.join("lands.kml")).unwrap();
    assert!(kml.contains("<name>Main St Depot</name>"));
    let csv = fs::read_to_string(out.join("lands.csv")).unwrap();
    assert_eq!(csv, "ComplexNam,DivName\nMain St Depot,East\n");
}

#[test]
fn test_name_field_and_start_with_options() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());
    let out = dir.path().join("fixed");

    cli()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .args(["--name-field", "DivName", "--start-with", "3", "--log-level", "debug"])
        .assert()
        .success()
        .stderr(predicate::str::contains("start-with has no effect"));

    let kml = fs::read_to_string(out.join("lands.kml")).unwrap();
    assert!(kml.contains("<name>East</name>"));
}

#[test]
fn test_log_level_controls_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("info"))
        .args(["--start-with", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing complete"))
        .stderr(predicate::str::contains("start-with has no effect").not());

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("quiet"))
        .args(["--log-level", "error"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing complete").not());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg("-i")
        .arg(dir.path().join("absent.kml"))
        .arg("-o")
        .arg(dir.path().join("fixed"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.kml"));
}

#[test]
fn test_missing_name_field_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("fixed"))
        .args(["--name-field", "Owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Owner"));
}

#[test]
fn test_invalid_log_level_rejected() {
    cli()
        .args(["--log-level", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}
