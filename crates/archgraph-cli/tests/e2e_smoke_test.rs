use std::{fs, path::PathBuf};

use serde_json::Value;
use tempfile::tempdir;

use archgraph_cli::{Args, run};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args(input: &PathBuf, output: &PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_fixtures = collect_json_files(fixtures());

    assert!(!valid_fixtures.is_empty(), "No fixtures found");

    let mut failed = Vec::new();
    for fixture in &valid_fixtures {
        let output = temp_dir.path().join(fixture.file_name().unwrap());
        if let Err(e) = run(&args(fixture, &output)) {
            failed.push((fixture.clone(), e));
        }
    }

    if !failed.is_empty() {
        eprintln!("\nValid fixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid fixture(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_fixtures = collect_json_files(fixtures().join("errors"));

    assert!(!error_fixtures.is_empty(), "No error fixtures found");

    let mut unexpectedly_succeeded = Vec::new();
    for fixture in &error_fixtures {
        let output = temp_dir.path().join(fixture.file_name().unwrap());
        if run(&args(fixture, &output)).is_ok() {
            unexpectedly_succeeded.push(fixture.clone());
        }
        assert!(!output.exists(), "{} produced output", fixture.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError fixtures that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error fixture(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_derived_document() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("bank.out.json");

    let summary = run(&args(&fixtures().join("bank.json"), &output)).expect("Failed to run");

    let document: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let keys: Vec<&str> = document["views"]["views"]
        .as_array()
        .unwrap()
        .iter()
        .map(|view| view["key"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        vec![
            "SystemLandscape",
            "Internet Banking System-SystemContext",
            "Mainframe Banking System-SystemContext",
            "Internet Banking System-Container",
            "Internet Banking System-API Application-Component",
            "Internet Banking System-Live-Deployment",
        ]
    );
    assert_eq!(summary.derivation.default_views, keys);
    assert_eq!(summary.views, keys.len());

    let customer = &document["model"]["people"][0];
    let destinations: Vec<&str> = customer["relationships"]
        .as_array()
        .unwrap()
        .iter()
        .map(|relationship| relationship["destinationId"].as_str().unwrap())
        .collect();
    assert_eq!(destinations, vec!["4", "2"]);
}

#[test]
fn e2e_config_disables_derivations() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = temp_dir.path().join("config.toml");
    fs::write(
        &config,
        "[model]\nimplied_relationships = false\n\n[views]\ndefault_views = false\n",
    )
    .unwrap();
    let output = temp_dir.path().join("bank.out.json");

    let mut args = args(&fixtures().join("bank.json"), &output);
    args.config = Some(config.to_string_lossy().to_string());
    let summary = run(&args).expect("Failed to run");
    assert!(summary.derivation.is_empty());

    let document: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(document["views"]["views"].as_array().unwrap().is_empty());
    assert_eq!(
        document["model"]["people"][0]["relationships"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}
