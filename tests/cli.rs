mod common;

use assert_cmd::Command;
use common::fixture;
use predicates::str::contains;
use serde_json::Value;

fn cmd() -> Command {
    Command::cargo_bin("formtree").unwrap()
}

fn decode_args(input: &str) -> Vec<String> {
    vec![
        "decode".to_string(),
        "--schema".to_string(),
        fixture("order.schema.json").display().to_string(),
        "--input".to_string(),
        fixture(input).display().to_string(),
    ]
}

#[test]
fn decode_valid_json_submission() {
    cmd()
        .args(decode_args("order.json"))
        .assert()
        .success()
        .stdout(contains(r#""type": "valid""#))
        .stdout(contains(r#""sku": "B-7""#))
        .stderr(contains("valid"));
}

#[test]
fn decode_urlencoded_submission_reports_field_errors() {
    cmd()
        .args(decode_args("order-bad.txt"))
        .assert()
        .success()
        .stdout(contains(r#""type": "invalid""#))
        .stdout(contains(r#""customer.email": "Invalid email""#))
        .stdout(contains(r#""items.0.qty": "Order at least one""#));
}

#[test]
fn file_payload_is_reported_as_fatal() {
    cmd()
        .args(decode_args("upload.json"))
        .assert()
        .success()
        .stdout(contains("bob.png"))
        .stderr(contains("fatal"));
}

#[test]
fn glob_input_decodes_every_match() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.json", "b.json"] {
        std::fs::copy(fixture("order.json"), dir.path().join(name)).unwrap();
    }
    let pattern = dir.path().join("*.json").display().to_string();
    let schema = fixture("order.schema.json").display().to_string();
    let output = cmd()
        .args(["decode", "--schema", schema.as_str(), "--input", pattern.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    let files: Vec<&str> = reports
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|report| report["file"].as_str())
        .collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.json") && files[1].ends_with("b.json"));
}

#[test]
fn config_file_and_flags_select_array_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("keyed.txt");
    std::fs::write(
        &input,
        "customer.name=Cy&customer.email=cy%40example.com&items.key=a&items%5Ba%5D.sku=Z-9&items%5Ba%5D.qty=3",
    )
    .unwrap();
    let schema = fixture("order.schema.json").display().to_string();
    let input = input.display().to_string();

    let run = |extra: &[&str]| -> Value {
        let out = dir.path().join("out.json");
        let mut args = vec!["decode", "--schema", schema.as_str(), "--input", input.as_str()];
        args.extend_from_slice(extra);
        let out_arg = out.display().to_string();
        args.extend_from_slice(&["--out", out_arg.as_str()]);
        cmd().args(&args).assert().success();
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap()
    };

    let items = |reports: &Value| reports[0]["outcome"]["data"]["items"].as_array().map(Vec::len);

    assert_eq!(items(&run(&[])), Some(1));
    let config = fixture("index-only.config.json").display().to_string();
    assert_eq!(items(&run(&["--config", config.as_str()])), Some(0));
    assert_eq!(items(&run(&["--config", config.as_str(), "--array-strategy", "key-then-index"])), Some(1));
}

#[test]
fn fields_lists_leaf_paths() {
    let schema = fixture("order.schema.json").display().to_string();
    cmd()
        .args(["fields", "--schema", schema.as_str()])
        .assert()
        .success()
        .stdout("customer.name\ncustomer.email\nexpress\ntags\nitems.N.sku\nitems.N.qty\n");
}

#[test]
fn fields_resolve_rejects_unknown_path() {
    let schema = fixture("order.schema.json").display().to_string();
    cmd()
        .args(["fields", "--schema", schema.as_str(), "--resolve", "items.0.sku"])
        .assert()
        .success()
        .stdout("items.0.sku\n");
    cmd()
        .args(["fields", "--schema", schema.as_str(), "--resolve", "customer.phone"])
        .assert()
        .failure()
        .stderr(contains("phone"));
}

#[test]
fn missing_schema_file_fails() {
    cmd()
        .args(["decode", "--schema", "does-not-exist.json", "--input", "nope.json"])
        .assert()
        .failure()
        .stderr(contains("does-not-exist.json"));
}
