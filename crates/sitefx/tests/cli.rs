use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn sitefx(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sitefx"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run sitefx")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "sitefx failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn write_config(root: &TempDir, body: &str) -> String {
    let path = root.path().join("site.toml");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn profile_classifies_a_desktop() {
    let output = sitefx(&[
        "profile",
        "--cores",
        "16",
        "--memory-gb",
        "32",
        "--gpu-renderer",
        "NVIDIA GeForce RTX 4080",
        "--viewport-width",
        "2560",
    ]);
    let report = json(&output);
    assert_eq!(report["profile"]["tier"], "desktop");
    assert_eq!(report["profile"]["gpu_tier"], "high");
    assert_eq!(report["profile"]["line_count"], 40);
    assert_eq!(report["cores"], 16);
}

#[test]
fn profile_classifies_a_phone_with_fps_cap() {
    let root = TempDir::new().unwrap();
    let config = write_config(&root, "version = 1\n[render]\nmax_fps = 30.0\n");
    let output = sitefx(&[
        "profile",
        "--cores",
        "6",
        "--gpu-renderer",
        "Apple GPU",
        "--mobile",
        "--touch",
        "--viewport-width",
        "390",
        "--config",
        &config,
    ]);
    let report = json(&output);
    assert_eq!(report["profile"]["tier"], "mobile");
    assert_eq!(report["profile"]["line_count"], 25);
    assert_eq!(report["profile"]["target_fps"], 30.0);
}

#[test]
fn layout_spreads_items_evenly() {
    let root = TempDir::new().unwrap();
    let config = write_config(
        &root,
        r##"
version = 1

[dome]
segments = 4

[[dome.items]]
preview = "thumbs/a.webp"

[[dome.items]]
preview = "thumbs/b.webp"
target = "full/b.webp"

[[dome.items]]
preview = "thumbs/c.webp"
kind = "embedded-document"
"##,
    );
    let report = json(&sitefx(&["layout", "--config", &config]));
    assert_eq!(report["pool_size"], 3);
    assert_eq!(report["quota"], 6);

    let tiles = report["tiles"].as_array().unwrap();
    assert_eq!(tiles.len(), 16);
    let mut counts = [0; 3];
    for tile in tiles {
        counts[tile["content_index"].as_u64().unwrap() as usize] += 1;
    }
    assert!(counts.iter().all(|count| *count <= 6), "{counts:?}");
    assert!(tiles
        .iter()
        .any(|tile| tile["content"]["target_uri"] == "full/b.webp"));
}

#[test]
fn layout_segments_override() {
    let root = TempDir::new().unwrap();
    let config = write_config(
        &root,
        "version = 1\n[[dome.items]]\npreview = \"a.webp\"\n",
    );
    let report = json(&sitefx(&["layout", "--config", &config, "--segments", "5"]));
    assert_eq!(report["segments"], 5);
    assert_eq!(report["tiles"].as_array().unwrap().len(), 20);
}

#[test]
fn layout_rejects_invalid_config() {
    let root = TempDir::new().unwrap();
    let config = write_config(&root, "version = 2\n");
    let output = sitefx(&["layout", "--config", &config]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version"), "{stderr}");
}

#[test]
fn simulate_reports_quality_steps() {
    let output = sitefx(&[
        "simulate",
        "--cores",
        "16",
        "--memory-gb",
        "32",
        "--gpu-renderer",
        "NVIDIA GeForce RTX 4080",
        "--viewport-width",
        "2560",
        "--frames",
        "300",
        "--cost-per-line-ms",
        "2",
        "--jitter-ms",
        "0",
    ]);
    let report = json(&output);
    assert_eq!(report["initial_quality"], 40);
    let changes = report["quality_changes"].as_array().unwrap();
    assert_eq!(changes[0]["from"], 40);
    assert_eq!(changes[0]["to"], 35);
    assert!(report["final_quality"].as_u64().unwrap() < 40);
}

#[test]
fn simulate_with_low_fps_cap_keeps_full_quality() {
    let root = TempDir::new().unwrap();
    let config = write_config(&root, "version = 1\n[render]\nmax_fps = 24.0\n");
    let output = sitefx(&[
        "simulate",
        "--config",
        &config,
        "--cores",
        "16",
        "--memory-gb",
        "32",
        "--gpu-renderer",
        "NVIDIA GeForce RTX 4080",
        "--viewport-width",
        "2560",
        "--frames",
        "1500",
        "--cost-per-line-ms",
        "0.01",
        "--jitter-ms",
        "0",
    ]);
    let report = json(&output);
    assert_eq!(report["profile"]["target_fps"], 24.0);
    assert_eq!(report["initial_quality"], 40);
    assert_eq!(report["final_quality"], 40);
    assert!(report["quality_changes"].as_array().unwrap().is_empty());
}
