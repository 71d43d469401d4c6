//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXAMPLE: &str = "../../records/example.toml";
const RECORDS_DIR: &str = "../../records";

fn examtrack() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("examtrack").unwrap();
    cmd.env_remove("EXAMTRACK_TARGET_DAILY")
        .env_remove("EXAMTRACK_TARGET_WEEKLY")
        .env_remove("EXAMTRACK_TARGET_MONTHLY");
    cmd
}

#[test]
fn validate_example_records() {
    examtrack()
        .arg("validate")
        .arg("--records")
        .arg(EXAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 2 exams, 6 practice logs"))
        .stdout(predicate::str::contains("Students: ayse, mehmet"))
        .stdout(predicate::str::contains("[ayse@2024-03-06] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_directory() {
    examtrack()
        .arg("validate")
        .arg("--records")
        .arg(RECORDS_DIR)
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 2 exams, 7 practice logs"));
}

#[test]
fn validate_nonexistent_file() {
    examtrack()
        .arg("validate")
        .arg("--records")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rejects_bad_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[[practice]]
student_id = "ayse"
date = "2024-03-04"
subjects = { Paragraf = { correct = -2, incorrect = 0 } }
"#,
    )
    .unwrap();

    examtrack()
        .arg("validate")
        .arg("--records")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid practice log #1"));
}

#[test]
fn score_lgs() {
    examtrack()
        .args(["score", "--format", "LGS"])
        .args(["--subject", "turkish=18:3", "--subject", "math=15:3"])
        .args(["--subject", "science=17:3", "--subject", "inkilap=9:1"])
        .args(["--subject", "religion=10", "--subject", "foreign_lang=8:2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Placement score: 432.69"));
}

#[test]
fn score_tyt_json() {
    let output = examtrack()
        .args(["score", "--format", "tyt", "--diploma", "80"])
        .args(["--subject", "turkish=30:8", "--subject", "social=12:4"])
        .args(["--subject", "math=25:8", "--subject", "science=10:4"])
        .args(["--format-output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "TYT");
    assert_eq!(json["nets"]["turkish"], 28.0);
    assert_eq!(json["total_net"], 71.0);
    assert_eq!(json["placement"], 384.3);
}

#[test]
fn score_rejects_subject_outside_format() {
    examtrack()
        .args(["score", "--format", "LGS", "--subject", "physics=10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not part of the LGS exam"));
}

#[test]
fn score_rejects_diploma_out_of_range() {
    examtrack()
        .args(["score", "--format", "TYT", "--diploma", "120"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("diploma score"));
}

#[test]
fn progress_daily_text() {
    examtrack()
        .args(["progress", "--records", EXAMPLE])
        .args(["--student", "ayse", "--granularity", "daily", "--target", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 March 2024"))
        .stdout(predicate::str::contains("Target 80: 3/5 periods met (60%)"));
}

#[test]
fn progress_weekly_json() {
    let output = examtrack()
        .args(["progress", "--records", EXAMPLE])
        .args(["--student", "ayse", "--granularity", "weekly", "--target", "200"])
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let buckets = json["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["bucket"]["key"], "2024-03-04");
    assert_eq!(buckets[0]["bucket"]["label"], "4/3 – 10/3");
    assert_eq!(buckets[0]["total"], 230.0);
    assert_eq!(buckets[1]["total"], 110.0);
    assert_eq!(json["classification"]["meets"], 1);
    assert_eq!(json["classification"]["success_percent"], 50);
}

#[test]
fn progress_key_range() {
    let output = examtrack()
        .args(["progress", "--records", EXAMPLE, "--granularity", "daily"])
        .args(["--from", "2024-03-05", "--to", "2024-03-11", "--target", "80"])
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&str> = json["buckets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bucket"]["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["2024-03-05", "2024-03-06", "2024-03-11"]);
}

#[test]
fn progress_exam_mean() {
    examtrack()
        .args(["progress", "--records", EXAMPLE, "--kind", "exams"])
        .args(["--granularity", "monthly", "--target", "400"])
        .assert()
        .success()
        .stdout(predicate::str::contains("408.50"))
        .stdout(predicate::str::contains("1/1 periods met (100%)"));
}

#[test]
fn progress_exam_format_filter_markdown() {
    examtrack()
        .args(["progress", "--records", EXAMPLE, "--kind", "exams"])
        .args(["--exam-format", "TYT", "--granularity", "monthly", "--target", "400"])
        .args(["--output", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Monthly progress: all students, TYT"))
        .stdout(predicate::str::contains("| March 2024 | 384 |"))
        .stdout(predicate::str::contains("**Met:** 0/1 (0%)"));
}

#[test]
fn progress_uses_config_targets() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("examtrack.toml");
    std::fs::write(&config, "default_granularity = \"weekly\"\n\n[targets]\nweekly = 100\n")
        .unwrap();

    examtrack()
        .args(["progress", "--records", EXAMPLE, "--student", "ayse"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Target 100: 2/2 periods met (100%)"));
}

#[test]
fn progress_env_overrides_target() {
    examtrack()
        .env("EXAMTRACK_TARGET_DAILY", "85")
        .args(["progress", "--records", EXAMPLE])
        .args(["--student", "ayse", "--granularity", "daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target 85: 2/5 periods met (40%)"));
}

#[test]
fn progress_saves_report() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("out").join("report.json");

    examtrack()
        .args(["progress", "--records", EXAMPLE, "--granularity", "monthly"])
        .args(["--target", "300"])
        .arg("--save")
        .arg(&report)
        .assert()
        .success();

    let content = std::fs::read_to_string(&report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["granularity"], "monthly");
    assert_eq!(json["buckets"][0]["total"], 352.0);
}

#[test]
fn progress_rejects_unknown_kind() {
    examtrack()
        .args(["progress", "--records", EXAMPLE, "--kind", "homework"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown record kind"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    examtrack()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created examtrack.toml"))
        .stdout(predicate::str::contains("Created records/example.toml"));

    assert!(dir.path().join("examtrack.toml").exists());
    assert!(dir.path().join("records/example.toml").exists());

    examtrack()
        .current_dir(dir.path())
        .args(["validate", "--records", "records"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All records valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    examtrack()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    examtrack()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    examtrack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("study progress tracker"));
}

#[test]
fn version_output() {
    examtrack()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examtrack"));
}
