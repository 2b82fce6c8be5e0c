use assert_cmd::Command;
use tempfile::TempDir;

const VALID_YAML: &str = r#"
name: personal loan submission
execution_mode: sequential
stop_on_error: true
steps:
  - name: validate applicant
    sequence_order: 1
    http_method: POST
    api_endpoint: /v1/validate
    output_fields: [validation_id]
  - name: submit application
    sequence_order: 2
    http_method: POST
    api_endpoint: /v1/applications
    depends_on_fields:
      application.ref: validation_id
"#;

fn lendflow(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lendflow").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LENDFLOW_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

struct Outcome {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

fn run(dir: &TempDir, args: &[&str]) -> Outcome {
    let out = lendflow(dir).args(args).output().unwrap();
    Outcome {
        code: out.status.code(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    }
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn validate_accepts_yaml_sequence() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "seq.yaml", VALID_YAML);

    let out = run(&dir, &["validate", &path]);

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out
        .stdout
        .contains("ok: valid sequence 'personal loan submission' (2 steps, sequential"));
}

#[test]
fn validate_accepts_json_sequence_with_json_output() {
    let dir = TempDir::new().unwrap();
    let doc = r#"{
        "name": "prequal",
        "execution_mode": "parallel",
        "steps": [
            {"sequence_order": 1, "api_endpoint": "https://bureau.example.com/score"},
            {"sequence_order": 2, "http_method": "get", "api_endpoint": "/offers"}
        ]
    }"#;
    let path = write(&dir, "seq.json", doc);

    let out = run(&dir, &["validate", &path, "--format", "json"]);

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    let result: serde_json::Value = serde_json::from_str(out.stdout.trim()).unwrap();
    assert_eq!(result["valid"], true);
    assert_eq!(result["steps"], 2);
    assert_eq!(result["format"], "Json");
}

#[test]
fn validate_rejects_dependencies_in_parallel_mode() {
    let dir = TempDir::new().unwrap();
    let doc = VALID_YAML.replace("execution_mode: sequential", "execution_mode: parallel");
    let path = write(&dir, "seq.yaml", &doc);

    let out = run(&dir, &["validate", &path]);

    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("$.steps[1].depends_on_fields"), "stderr: {}", out.stderr);
}

#[test]
fn validate_reports_every_violation() {
    let dir = TempDir::new().unwrap();
    let doc = r#"
name: ""
steps:
  - sequence_order: 1
    http_method: TRACE
    api_endpoint: ftp://files.example.com
    timeout_seconds: 0
  - sequence_order: 3
    api_endpoint: /ok
"#;
    let path = write(&dir, "seq.yaml", doc);

    let out = run(&dir, &["validate", &path, "--format", "json"]);

    assert_eq!(out.code, Some(2));
    let result: serde_json::Value = serde_json::from_str(out.stdout.trim()).unwrap();
    assert_eq!(result["valid"], false);
    let errors = result["errors"].as_array().unwrap();
    for path in [
        "$.name",
        "$.steps[0].http_method",
        "$.steps[0].api_endpoint",
        "$.steps[0].timeout_seconds",
        "$.steps[1].sequence_order",
    ] {
        assert!(
            errors.iter().any(|e| e.as_str().unwrap_or_default().starts_with(path)),
            "no violation at {path}: {errors:?}"
        );
    }
}

#[test]
fn validate_rejects_unknown_execution_mode() {
    let dir = TempDir::new().unwrap();
    let doc = VALID_YAML.replace("execution_mode: sequential", "execution_mode: round_robin");
    let path = write(&dir, "seq.yaml", &doc);

    assert_eq!(run(&dir, &["validate", &path]).code, Some(2));
}

#[test]
fn validate_missing_file_is_a_runtime_error() {
    let dir = TempDir::new().unwrap();

    let out = run(&dir, &["validate", "does-not-exist.yaml"]);

    assert_eq!(out.code, Some(4));
    assert!(out.stderr.contains("failed to read"));
}

#[test]
fn store_commands_require_a_database_url() {
    let dir = TempDir::new().unwrap();

    let out = run(&dir, &["runs", "1"]);

    assert_eq!(out.code, Some(4));
    assert!(out.stderr.contains("missing database URL"));
}

#[test]
fn malformed_set_is_rejected_before_connecting() {
    let dir = TempDir::new().unwrap();

    let out = run(
        &dir,
        &["run", "1", "--set", "no-equals-sign", "--store", "postgres://127.0.0.1:1/none"],
    );

    assert_eq!(out.code, Some(4));
    assert!(out.stderr.contains("expected PATH=VALUE"));
}

#[test]
fn trace_rejects_invalid_run_id() {
    let dir = TempDir::new().unwrap();

    let out = run(&dir, &["trace", "1", "not-a-uuid", "--format", "json"]);

    assert_eq!(out.code, Some(4));
    assert!(out.stderr.contains("invalid run_id"));
}
