use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use cw_results::*;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn row(hour: u32, rf: Option<f64>) -> AugmentedSample {
    let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp");
    AugmentedSample {
        sample: Sample {
            timestamp,
            acid_out_c: Some(55.0),
            ..Sample::default()
        },
        operating: rf.is_some(),
        thermal: ThermalFields {
            rf_x1e4: rf,
            ..ThermalFields::default()
        },
        crit: CriticalityFields {
            criticality: rf.map(|v| v * 10.0),
            level: CriticalityLevel::from_index(rf.map(|v| v * 10.0)),
            ..CriticalityFields::default()
        },
        ..AugmentedSample::default()
    }
}

#[test]
fn save_list_load_roundtrip() {
    let config_dir = unique_temp_dir("cw_results_config");
    fs::create_dir_all(&config_dir).expect("failed to create temp dir");
    let config_path = config_dir.join("plant.yaml");
    fs::write(&config_path, "version: 1\nname: test\n").expect("failed to write config");

    let store = RunStore::for_config(&config_path).expect("failed to create run store");

    let manifest = RunManifest {
        run_id: "run-123".to_string(),
        plant_name: "plant".to_string(),
        timestamp: "2026-02-26T00:00:00".to_string(),
        engine_version: "0.1.0".to_string(),
        units: vec!["TS".to_string()],
        failed_units: vec![],
    };
    let rows = vec![row(0, Some(2.0)), row(1, None)];

    store
        .save_run(&manifest, [("TS", rows.as_slice())])
        .expect("failed to save run");

    assert!(store.has_run("run-123"));
    let runs = store.list_runs("plant").expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert!(store.list_runs("other").expect("list").is_empty());

    let loaded = store.load_unit("run-123", "TS").expect("failed to load rows");
    assert_eq!(loaded, rows);
    assert_eq!(loaded[0].crit.level, CriticalityLevel::Low);
    assert_eq!(loaded[1].crit.level, CriticalityLevel::NotAvailable);

    assert!(matches!(
        store.load_unit("run-123", "TAF"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_unit("run-123", "../x"),
        Err(ResultsError::InvalidPath { .. })
    ));

    store.delete_run("run-123").expect("failed to delete");
    assert!(!store.has_run("run-123"));
    assert!(matches!(
        store.load_manifest("run-123"),
        Err(ResultsError::RunNotFound { .. })
    ));
}
