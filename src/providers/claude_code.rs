/*!
 * Claude Code command-line provider.
 *
 * Runs `claude -p --output-format json --max-turns 1` with the prompt on
 * stdin and reads the JSON envelope `{ "is_error": bool, "result": "..." }`
 * from stdout.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Client that shells out to the `claude` binary
#[derive(Debug, Clone)]
pub struct ClaudeCode {
    /// Path or name of the CLI binary
    binary: String,
    /// Optional model override passed with `--model`
    model: Option<String>,
}

/// One print-mode invocation
#[derive(Debug, Clone)]
pub struct ClaudeCodeRequest {
    /// Full prompt, written to stdin
    pub prompt: String,
}

/// JSON envelope printed by `--output-format json`
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeCodeResponse {
    /// Whether the run ended in an error
    #[serde(default)]
    pub is_error: bool,
    /// Final assistant text, or the error message
    #[serde(default)]
    pub result: String,
    /// Session subtype, e.g. `success` or `error_max_turns`
    #[serde(default)]
    pub subtype: Option<String>,
    /// Reported cost of the run
    #[serde(default)]
    pub total_cost_usd: Option<f64>,
}

impl ClaudeCodeRequest {
    /// Create a request from a complete prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

fn looks_like_auth_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["invalid api key", "authentication", "unauthorized", "please run /login", "not logged in"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn classify_failure(message: String) -> ProviderError {
    if looks_like_auth_failure(&message) {
        ProviderError::AuthenticationError(message)
    } else {
        ProviderError::RequestFailed(message)
    }
}

/// Parse the stdout of a print-mode run
pub fn parse_output(stdout: &str) -> Result<ClaudeCodeResponse, ProviderError> {
    let response: ClaudeCodeResponse = serde_json::from_str(stdout.trim())
        .map_err(|e| ProviderError::ParseError(format!("Claude CLI output: {}", e)))?;

    if response.is_error {
        return Err(classify_failure(format!(
            "Claude CLI reported an error ({}): {}",
            response.subtype.as_deref().unwrap_or("unknown"),
            response.result
        )));
    }

    Ok(response)
}

impl ClaudeCode {
    /// Create a client for the given binary
    pub fn new(binary: impl Into<String>, model: Option<String>) -> Self {
        let binary = binary.into();
        Self {
            binary: if binary.trim().is_empty() { "claude".to_string() } else { binary },
            model: model.filter(|m| !m.trim().is_empty()),
        }
    }

    fn print_command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(["-p", "--output-format", "json", "--max-turns", "1"]);
        if let Some(model) = &self.model {
            command.arg("--model").arg(model);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, error: std::io::Error) -> ProviderError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ProviderError::ConnectionError(format!("'{}' was not found on PATH", self.binary))
        } else {
            ProviderError::ConnectionError(format!("Failed to start '{}': {}", self.binary, error))
        }
    }
}

#[async_trait]
impl Provider for ClaudeCode {
    type Request = ClaudeCodeRequest;
    type Response = ClaudeCodeResponse;

    async fn complete(&self, request: ClaudeCodeRequest) -> Result<ClaudeCodeResponse, ProviderError> {
        let mut child = self.print_command().spawn().map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.prompt.as_bytes())
                .await
                .map_err(|e| ProviderError::RequestFailed(format!("Failed to write prompt: {}", e)))?;
            // Closing stdin ends the prompt
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Claude CLI did not finish: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            // A failed run may still print the envelope with the reason
            if let Err(e) = parse_output(&stdout) {
                if matches!(e, ProviderError::AuthenticationError(_)) {
                    return Err(e);
                }
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(format!(
                "Claude CLI exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_output(&stdout)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ProviderError::ConnectionError(format!(
                "'{} --version' exited with {}",
                self.binary, output.status
            )));
        }
        debug!("Claude CLI version: {}", String::from_utf8_lossy(&output.stdout).trim());

        if std::env::var("ANTHROPIC_API_KEY").map(|k| k.is_empty()).unwrap_or(true) {
            warn!("ANTHROPIC_API_KEY is not set; relying on the Claude CLI's own login");
        }

        Ok(())
    }

    fn extract_text(response: &ClaudeCodeResponse) -> String {
        response.result.clone()
    }
}
