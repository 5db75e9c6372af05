//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `memdrill` command isolated from the caller's keys and config files.
fn memdrill(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("memdrill").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("MEMDRILL_GEMINI_KEY")
        .env_remove("MEMDRILL_OPENAI_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn write_config(dir: &TempDir, base_url: &str) -> std::path::PathBuf {
    let path = dir.path().join("memdrill.toml");
    std::fs::write(
        &path,
        format!(
            r#"
gemini_base_url = "{base_url}"
openai_base_url = "{base_url}"
timeout_secs = 5
duration_secs = 1

[credentials]
gemini_api_key = "test-key"
"#
        ),
    )
    .unwrap();
    path
}

async fn gemini_backend(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
        })))
        .mount(&server)
        .await;
    server
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("drill"))
        .stdout(predicate::str::contains("list-models"));
}

#[test]
fn keywords_from_argument() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .args(["keywords", "首先，市场调研显示需求强烈。"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Script: chinese"))
        .stdout(predicate::str::contains("1. 首先"));
}

#[test]
fn keywords_json_from_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("passage.txt");
    std::fs::write(&file, "먼저 시장을 분석했다.").unwrap();

    let output = memdrill(&dir)
        .args(["keywords", "--json", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["script"], "korean");
    assert_eq!(json["keywords"][0], "먼저");
}

#[test]
fn keywords_from_stdin() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .arg("keywords")
        .write_stdin("Minister Park arrived in Geneva")
        .assert()
        .success()
        .stdout(predicate::str::contains("Script: other"))
        .stdout(predicate::str::contains("Geneva"));
}

#[test]
fn keywords_rejects_blank_input() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .args(["keywords", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    memdrill(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created memdrill.toml"));
    assert!(dir.path().join("memdrill.toml").exists());

    memdrill(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    // The sample parses and carries no keys until they are exported.
    memdrill(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-flash"))
        .stdout(predicate::str::contains("No API keys configured"));
}

#[test]
fn list_models_shows_credential_status() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .arg("list-models")
        .env("MEMDRILL_OPENAI_KEY", "sk-test")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4.1-mini"))
        .stdout(predicate::str::contains("configured"))
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn generate_without_keys_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .args(["generate", "--type", "numbers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential configured"));
}

#[test]
fn generate_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .args(["generate", "--type", "poems"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exercise type"));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    memdrill(&dir)
        .args(["list-models", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_json_against_mock_backend() {
    let server = gemini_backend("먼저 김 대사는 서울에서 박 장관을 만났다.").await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());

    let output = memdrill(&dir)
        .args(["generate", "--type", "names", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["model"], "gemini-2.5-flash");
    assert_eq!(json["exercise_type"], "인명/지명");
    assert_eq!(json["script"], "먼저 김 대사는 서울에서 박 장관을 만났다.");
    assert_eq!(json["key_points"][0], "먼저");
}

#[tokio::test(flavor = "multi_thread")]
async fn drill_runs_countdown_and_records_history() {
    let server = gemini_backend("首先，市场调研显示需求强烈。然后，完成产品发布。").await;
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server.uri());
    let history = dir.path().join("history.jsonl");

    memdrill(&dir)
        .args(["drill", "--type", "process", "--language", "zh", "--config"])
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("首先，市场调研显示需求强烈。"))
        .stdout(predicate::str::contains("과정/절차 훈련"))
        .stdout(predicate::str::contains("Key points to recall"));

    let saved = std::fs::read_to_string(&history).unwrap();
    let record: serde_json::Value = serde_json::from_str(saved.lines().next().unwrap()).unwrap();
    assert_eq!(record["exerciseType"], "과정/절차");
    assert_eq!(record["language"], "중국어");
    assert_eq!(record["studyTime"], 1);
}
