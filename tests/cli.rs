use std::fs;

use predicates::prelude::*;
use serde_json::json;

fn hood_json(name: &str, cards: usize) -> String {
    let cards = (0..cards)
        .map(|i| json!({"title": format!("{name} {i}"), "url": format!("{name}/{i}/"), "last_modified": "", "has_sound": false}))
        .collect::<Vec<_>>();
    json!({
        "name": name,
        "description": "",
        "url": format!("http://mirror/{name}"),
        "cards": cards,
        "total_pages": cards.len(),
        "burbs": [],
        "total_burbs": 0,
        "metadata": {"scraped_at": "2024-01-01 00:00:00", "base_url": "http://mirror"}
    })
    .to_string()
}

#[test]
fn flatten_writes_metadata_and_chunks() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("Area51.json"), hood_json("Area51", 3)).unwrap();
    fs::write(data.join("Athens.json"), hood_json("Athens", 2)).unwrap();
    let output = tmp.path().join("flat.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hoodscrap");
    cmd.env("RUST_LOG", "debug")
        .arg("flatten")
        .arg("--input")
        .arg(&data)
        .arg("--output")
        .arg(&output)
        .args(["--chunk-size", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));

    assert!(tmp.path().join("flat_metadata.json.gz").exists());
    for idx in 0..3 {
        assert!(tmp.path().join(format!("flat_chunk_{idx}.json.gz")).exists());
    }
    assert!(!tmp.path().join("flat_chunk_3.json.gz").exists());
}

#[test]
fn flatten_rejects_zero_chunk_size() {
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hoodscrap");
    cmd.arg("flatten")
        .arg("--input")
        .arg(tmp.path())
        .arg("--output")
        .arg(tmp.path().join("flat"))
        .args(["--chunk-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chunk size must be at least 1"));
}

#[test]
fn scrape_unknown_hood_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.json");
    fs::write(
        &config,
        json!({"base_url": "http://127.0.0.1:9", "neighborhoods": {"Area51": {"description": "", "burbs": []}}})
            .to_string(),
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hoodscrap");
    cmd.arg("scrape")
        .arg("--config")
        .arg(&config)
        .arg("--out-dir")
        .arg(tmp.path().join("data"))
        .args(["--hood", "Hollywood"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hood Hollywood not found in config"));
}
