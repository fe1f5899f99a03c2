use std::path::Path;
use std::process::Output;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tokio::process::Command;

/// An unsigned JWT expiring `expires_in` seconds from now.
#[allow(dead_code)]
pub fn jwt(id: &str, expires_in: i64, is_admin: bool) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({ "jti": id, "exp": now + expires_in, "is_admin": is_admin });
    format!("{}.{}.sig", header, URL_SAFE_NO_PAD.encode(payload.to_string()))
}

/// Run the CLI binary against `host`, keeping credentials under `store`.
pub async fn run_cli(args: &[&str], store: &Path, host: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reelpass"));
    cmd.args(args);
    cmd.env("REELPASS_STORE", store);
    cmd.env_remove("REELPASS_HOST");
    cmd.env_remove("REELPASS_PASSWORD");
    cmd.env_remove("REELPASS_ROTATE_REFRESH");
    cmd.env_remove("REELPASS_ROUTES");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    if let Some(host) = host {
        cmd.env("REELPASS_HOST", host);
    }
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
#[allow(dead_code)]
pub async fn run_cli_success(args: &[&str], store: &Path, host: Option<&str>) -> String {
    let output = run_cli(args, store, host).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stdout and stderr.
#[allow(dead_code)]
pub async fn run_cli_failure(args: &[&str], store: &Path, host: Option<&str>) -> (String, String) {
    let output = run_cli(args, store, host).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}
