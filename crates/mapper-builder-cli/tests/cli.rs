//! Runs the `mapper-builder` binary against schema and data documents on disk.

use std::{fs, path::Path, process::Command};

const SCHEMA: &str = r#"{
  "types": [
    {
      "name": "Amount",
      "validatable": true,
      "attributes": [
        { "name": "value", "type": "float", "rules": [{ "rule": "presence" }, { "rule": "range", "min": 0 }] },
        { "name": "currency", "type": "string", "default": "USD" }
      ]
    },
    {
      "name": "Transaction",
      "nested_validations": true,
      "track_assignments": true,
      "xml_root": "transaction",
      "attributes": [
        { "name": "cvv_code", "type": "string", "doc": "Card verification value" },
        { "name": "amount", "type": "Amount" }
      ],
      "aliases": { "cvv": "cvv_code" }
    }
  ]
}"#;

fn mapper_builder(dir: &Path, args: &[&str]) -> std::process::Output {
  Command::new(env!("CARGO_BIN_EXE_mapper-builder"))
    .current_dir(dir)
    .args(["--color", "never"])
    .args(args)
    .output()
    .expect("binary runs")
}

/// Output with ANSI color sequences removed.
fn plain(output: &[u8]) -> String {
  let output = String::from_utf8_lossy(output);
  let mut text = String::new();
  let mut chars = output.chars();
  while let Some(c) = chars.next() {
    if c == '\u{1b}' {
      chars.by_ref().find(|c| *c == 'm');
    } else {
      text.push(c);
    }
  }
  text
}

fn workspace() -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
  dir
}

#[test]
fn test_inspect_lists_resolved_attributes() {
  let dir = workspace();
  let output = mapper_builder(dir.path(), &["inspect", "-s", "schema.json", "-t", "Transaction"]);

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Transaction"));
  assert!(stdout.contains("cvv_code"));
  assert!(stdout.contains("cvv"));
}

#[test]
fn test_check_valid_document_succeeds() {
  let dir = workspace();
  fs::write(
    dir.path().join("payment.json"),
    r#"{"cvv_code":"321","amount":{"value":45.0,"currency":"USD"}}"#,
  )
  .unwrap();

  let output = mapper_builder(
    dir.path(),
    &["check", "-s", "schema.json", "-t", "Transaction", "-i", "payment.json", "-v"],
  );

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Document is a valid Transaction"));
  assert!(stdout.contains("cvv_code"));
}

#[test]
fn test_check_verbose_lists_assigned_attributes() {
  let dir = workspace();
  fs::write(
    dir.path().join("payment.json"),
    r#"{"cvv_code":null,"amount":{"value":45.0},"memo":"x"}"#,
  )
  .unwrap();

  let output = mapper_builder(
    dir.path(),
    &["check", "-s", "schema.json", "-t", "Transaction", "-i", "payment.json", "-v"],
  );

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let stdout = plain(&output.stdout);
  let assigned = stdout
    .lines()
    .find(|line| line.contains("Assigned attributes:"))
    .expect("assigned count is printed");
  assert!(assigned.trim_end().ends_with('2'), "{assigned}");
  assert!(stdout.lines().any(|line| line.contains("cvv_code") && line.contains("(cleared)")));
  assert!(stdout.lines().any(|line| line.contains("amount") && line.contains("45.0")));
  assert!(!stdout.lines().any(|line| line.contains("memo") && line.contains("\"x\"")));
}

#[test]
fn test_check_invalid_document_fails_with_nested_paths() {
  let dir = workspace();
  fs::write(
    dir.path().join("payment.xml"),
    "<transaction><amount><value>-3</value></amount><memo>ignored</memo></transaction>",
  )
  .unwrap();

  let output = mapper_builder(
    dir.path(),
    &["check", "-s", "schema.json", "-t", "Transaction", "-i", "payment.xml"],
  );

  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("amount.value must be greater than or equal to 0"), "{stderr}");
}

#[test]
fn test_check_unknown_type_is_an_error() {
  let dir = workspace();
  fs::write(dir.path().join("payment.json"), "{}").unwrap();

  let output = mapper_builder(
    dir.path(),
    &["check", "-s", "schema.json", "-t", "Refund", "-i", "payment.json"],
  );

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("unknown type 'Refund'"));
}

#[test]
fn test_convert_xml_to_json_on_stdout() {
  let dir = workspace();
  fs::write(
    dir.path().join("payment.xml"),
    "<transaction><cvv_code>321</cvv_code><amount><value>12.5</value></amount></transaction>",
  )
  .unwrap();

  let output = mapper_builder(
    dir.path(),
    &["convert", "-s", "schema.json", "-t", "Transaction", "-i", "payment.xml", "--to", "json"],
  );

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(
    json,
    serde_json::json!({ "cvv_code": "321", "amount": { "value": 12.5, "currency": "USD" } })
  );
}
