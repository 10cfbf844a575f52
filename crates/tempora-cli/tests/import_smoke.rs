use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SEPARABLE: &str = r#"{"id":"d_real","group":"devel","class":"real","scores":[0.8,0.9]}
{"id":"d_attack","group":"devel","class":"attack","scores":[-0.8,-0.7]}
{"id":"g1","group":"test","class":"real","scores":[0.9,0.9,0.9]}
{"id":"g2","group":"test","class":"real","scores":[0.8,0.7]}
{"id":"a1","group":"test","class":"attack","scores":[-0.9,-0.9,-0.9]}
{"id":"a2","group":"test","class":"attack","scores":[-0.8]}
"#;

fn import(from: &Path, out: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("tempora"));
    cmd.arg("import")
        .arg("--from")
        .arg(from)
        .arg("--out")
        .arg(out)
        .args(["--window-size", "20", "--overlap", "10"]);
    cmd
}

#[test]
fn import_validate_analyze_separable_scores() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.jsonl");
    fs::write(&input, SEPARABLE).unwrap();
    let scores = dir.path().join("scores");
    import(&input, &scores).assert().success();
    assert!(!dir.path().join("scores.partial").exists());

    let mut validate = Command::new(assert_cmd::cargo_bin!("tempora"));
    validate.arg("validate").arg(&scores).assert().success();

    let run_dir = dir.path().join("run");
    fs::create_dir_all(&run_dir).unwrap();
    let mut analyze = Command::new(assert_cmd::cargo_bin!("tempora"));
    analyze
        .arg("analyze")
        .arg(&run_dir)
        .arg("--scores")
        .arg(&scores)
        .assert()
        .success();

    let bytes = fs::read(run_dir.join("time-analysis.json")).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    for mode in ["instantaneous", "averaged"] {
        let rates = json[mode]["rates"].as_array().unwrap();
        assert_eq!(rates.len(), 3);
        for row in rates {
            assert_eq!(row["hter"], 0.0);
        }
        assert_eq!(rates[1]["genuine"], 2);
        assert_eq!(rates[1]["attack"], 1);
        assert_eq!(rates[2]["genuine"], 1);
        assert_eq!(rates[2]["attack"], 1);
    }
    assert!(run_dir.join("time-analysis-misclassified-at-220.txt").exists());
}

#[test]
fn missing_devel_attack_exits_5() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.jsonl");
    let only_real: String = SEPARABLE
        .lines()
        .filter(|line| !line.contains("d_attack"))
        .map(|line| format!("{line}\n"))
        .collect();
    fs::write(&input, only_real).unwrap();
    let scores = dir.path().join("scores");
    import(&input, &scores).assert().success();

    let run_dir = dir.path().join("run");
    fs::create_dir_all(&run_dir).unwrap();
    let mut analyze = Command::new(assert_cmd::cargo_bin!("tempora"));
    analyze
        .arg("analyze")
        .arg(&run_dir)
        .arg("--scores")
        .arg(&scores)
        .assert()
        .failure()
        .code(5);
}

#[test]
fn malformed_line_is_validation_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.jsonl");
    fs::write(&input, "{\"id\":\"x\",\"group\":\"devel\"}\n").unwrap();
    import(&input, &dir.path().join("scores"))
        .assert()
        .failure()
        .code(3);
}

#[test]
fn unpaired_window_flag_is_usage_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.jsonl");
    fs::write(&input, SEPARABLE).unwrap();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("tempora"));
    cmd.arg("import")
        .arg("--from")
        .arg(&input)
        .arg("--out")
        .arg(dir.path().join("scores"))
        .args(["--window-size", "20"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn window_and_labels_inferred_from_run_layout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scores.jsonl");
    fs::write(&input, SEPARABLE).unwrap();
    let scores = dir.path().join("scores");
    let mut cmd = Command::new(assert_cmd::cargo_bin!("tempora"));
    cmd.arg("import")
        .arg("--from")
        .arg(&input)
        .arg("--out")
        .arg(&scores)
        .assert()
        .success();

    let run_dir = dir
        .path()
        .join("results/window_12/overlap_4/face/print/hand/run1");
    fs::create_dir_all(&run_dir).unwrap();
    let mut analyze = Command::new(assert_cmd::cargo_bin!("tempora"));
    analyze
        .arg("analyze")
        .arg(&run_dir)
        .arg("--scores")
        .arg(&scores)
        .assert()
        .success();
    let table = fs::read_to_string(run_dir.join("time-analysis-table.rst")).unwrap();
    assert!(table.contains("Window *12*, Overlap *4*, Protocol *print*, Support *hand*"));
    let bytes = fs::read(run_dir.join("time-analysis.json")).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["instantaneous"]["rates"][2]["elapsed"], 28);
}
