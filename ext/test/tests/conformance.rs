//! Conformance tests that run YAML fixtures against the validator
//!
//! Run with: cargo test -p gatecheck-test --test conformance --features gatecheck-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use gatecheck_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    println!("Running fixture file: {}", path.display());

    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_scenarios() {
    run_fixture_file("01_scenarios.yaml");
}

#[test]
fn test_membership() {
    run_fixture_file("02_membership.yaml");
}

#[test]
fn test_content_length() {
    run_fixture_file("03_content_length.yaml");
}

#[test]
fn test_malformed() {
    run_fixture_file("04_malformed.yaml");
}

#[test]
fn test_every_fixture_file_is_covered() {
    let mut files: Vec<_> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| {
            let path = entry.expect("dir entry").path();
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
                .then(|| path.file_name().unwrap().to_string_lossy().into_owned())
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_scenarios.yaml",
            "02_membership.yaml",
            "03_content_length.yaml",
            "04_malformed.yaml",
        ]
    );
}
