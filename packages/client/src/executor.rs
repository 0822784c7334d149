//! Running code in a Piston-compatible sandbox.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_SANDBOX_URL: &str = "https://emkc.org/api/v2/piston";

/// Output shown when a run prints nothing
pub const EMPTY_OUTPUT: &str = "No output";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
    pub stdin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecuteResponse {
    pub run: RunResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub output: String,
}

#[derive(Debug, Deserialize)]
struct SandboxError {
    message: String,
}

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(
        &self,
        language: &str,
        version: &str,
        source_code: &str,
        stdin: &str,
    ) -> Result<ExecuteResponse, ClientError>;
}

/// Text for the terminal output pane after a run
pub fn terminal_output(result: &Result<ExecuteResponse, ClientError>) -> String {
    match result {
        Ok(response) if response.run.output.is_empty() => EMPTY_OUTPUT.to_string(),
        Ok(response) => response.run.output.clone(),
        Err(ClientError::ExecutionError(message)) => format!("Error: {}", message),
        Err(e) => format!("Error: {}", e),
    }
}

pub struct PistonExecutor {
    http: reqwest::Client,
    base_url: String,
}

impl PistonExecutor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for PistonExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SANDBOX_URL)
    }
}

#[async_trait]
impl CodeExecutor for PistonExecutor {
    async fn execute(
        &self,
        language: &str,
        version: &str,
        source_code: &str,
        stdin: &str,
    ) -> Result<ExecuteResponse, ClientError> {
        let request = ExecuteRequest {
            language: language.to_string(),
            version: version.to_string(),
            files: vec![SourceFile {
                content: source_code.to_string(),
            }],
            stdin: stdin.to_string(),
        };

        let response = self
            .http
            .post(format!("{}/execute", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::ExecutionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<SandboxError>().await {
                Ok(body) => body.message,
                Err(_) => format!("sandbox answered {}", status),
            };
            return Err(ClientError::ExecutionError(message));
        }

        response
            .json::<ExecuteResponse>()
            .await
            .map_err(|e| ClientError::ExecutionError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        // テスト項目: サンドボックスへのリクエストボディの形式
        // given (前提条件):
        let request = ExecuteRequest {
            language: "python".to_string(),
            version: "3.10.0".to_string(),
            files: vec![SourceFile {
                content: "print(1)".to_string(),
            }],
            stdin: "".to_string(),
        };

        // when (操作):
        let json = serde_json::to_value(&request).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "language": "python",
                "version": "3.10.0",
                "files": [{"content": "print(1)"}],
                "stdin": ""
            })
        );
    }

    #[test]
    fn test_terminal_output_variants() {
        // テスト項目: 実行結果からターミナル出力の文言が決まる
        // given (前提条件):
        let printed: Result<ExecuteResponse, ClientError> = Ok(ExecuteResponse {
            run: RunResult {
                output: "1\n".to_string(),
            },
        });
        let silent: Result<ExecuteResponse, ClientError> = Ok(ExecuteResponse {
            run: RunResult::default(),
        });
        let failed: Result<ExecuteResponse, ClientError> =
            Err(ClientError::ExecutionError("runtime unknown".to_string()));

        // when (操作) / then (期待する結果):
        assert_eq!(terminal_output(&printed), "1\n");
        assert_eq!(terminal_output(&silent), "No output");
        assert_eq!(terminal_output(&failed), "Error: runtime unknown");
    }

    #[test]
    fn test_response_without_output_field() {
        // テスト項目: output が無いレスポンスも受け付ける
        // given (前提条件):
        let body = r#"{"run": {"stdout": "", "stderr": "", "code": 0}}"#;

        // when (操作):
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();

        // then (期待する結果):
        assert_eq!(response.run.output, "");
    }
}
