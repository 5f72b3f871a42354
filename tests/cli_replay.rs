use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sensor_cli"))
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sensor_cli_{}_{}", std::process::id(), name))
}

/// 60 resting readings per channel, then a magnetic spike and a shake.
fn write_replay_input(name: &str) -> PathBuf {
    let mut lines = Vec::new();
    for i in 0..60u64 {
        let t = i * 16;
        lines.push(format!(r#"{{"sensor":"field","timestamp_ms":{t},"value":40.0}}"#));
        lines.push(format!(
            r#"{{"sensor":"motion","timestamp_ms":{t},"x":0.0,"y":0.0,"z":9.8}}"#
        ));
    }
    lines.push(r#"{"sensor":"field","timestamp_ms":2000,"value":45.0}"#.to_string());
    lines.push(r#"{"sensor":"magnetometer","timestamp_ms":2100,"x":0.0,"y":60.0,"z":80.0}"#.to_string());
    lines.push(r#"{"sensor":"motion","timestamp_ms":2200,"x":0.0,"y":0.0,"z":25.0}"#.to_string());
    lines.push("not json".to_string());

    let path = scratch_file(name);
    fs::write(&path, lines.join("\n")).expect("write replay input");
    path
}

#[test]
fn replay_calibrates_then_classifies() {
    let input = write_replay_input("classify.jsonl");
    let output = cli()
        .args(["replay", "--input", input.to_str().unwrap()])
        .output()
        .expect("failed to run sensor_cli replay");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let results: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("classification JSON line"))
        .collect();
    assert_eq!(results.len(), 3, "calibration samples must not be classified");

    assert_eq!(results[0]["channel"], "field");
    assert_eq!(results[0]["severity"], "normal");

    // Magnetometer magnitude 100 smoothed against 45 gives 61.5
    assert_eq!(results[1]["channel"], "field");
    assert_eq!(results[1]["severity"], "elevated");

    assert_eq!(results[2]["channel"], "motion");
    assert_eq!(results[2]["severity"], "anomaly");
    assert!(results[2]["event"].is_object());

    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("1 anomalies"), "unexpected summary: {stderr}");

    let _ = fs::remove_file(input);
}

#[test]
fn replay_writes_flat_export() {
    let input = write_replay_input("export.jsonl");
    let export = scratch_file("export.json");
    let output = cli()
        .args([
            "replay",
            "--input",
            input.to_str().unwrap(),
            "--export",
            export.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run sensor_cli replay --export");
    assert!(output.status.success());

    let json: Value =
        serde_json::from_str(&fs::read_to_string(&export).expect("export written")).unwrap();
    assert_eq!(json["field_calibrated"], true);
    assert_eq!(json["field_baseline"], 40.0);
    assert_eq!(json["field_threshold_normal"], 55.0);
    assert_eq!(json["anomaly_count"], 1);
    assert!(json.as_object().unwrap().values().all(|v| !v.is_object()));

    let _ = fs::remove_file(input);
    let _ = fs::remove_file(export);
}

#[test]
fn defaults_prints_config() {
    let output = cli()
        .arg("defaults")
        .output()
        .expect("failed to run sensor_cli defaults");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("config JSON");
    assert_eq!(json["calibration"]["window_size"], 60);
    assert_eq!(json["filter"]["field_alpha"], 0.3);
    assert_eq!(json["motion"]["deviation_threshold"], 3.0);
}

#[test]
fn replay_missing_input_fails() {
    let output = cli()
        .args(["replay", "--input", "/nonexistent/readings.jsonl"])
        .output()
        .expect("failed to run sensor_cli replay");
    assert_eq!(output.status.code(), Some(1));
}
