use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use orbit_core::RunId;
use orbit_logging::{orbit_debug, orbit_info};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, FailureKind, GenerateError};

pub const GENERATE_PATH: &str = "api/generate";

#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub base_url: String,
    pub model: String,
    /// Passed through to the server untouched.
    pub options: Value,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "gemma3n:e4b".to_string(),
            options: json!({ "temperature": 0.6, "num_ctx": 4096 }),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(600),
        }
    }
}

impl GenerateSettings {
    pub fn endpoint(&self) -> Result<reqwest::Url, GenerateError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), GENERATE_PATH);
        reqwest::Url::parse(&raw)
            .map_err(|err| GenerateError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a Value,
}

pub trait ChunkSink: Send + Sync {
    fn chunk(&self, bytes: Bytes);
}

pub struct ChannelChunkSink {
    run_id: RunId,
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelChunkSink {
    pub fn new(run_id: RunId, tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { run_id, tx }
    }
}

impl ChunkSink for ChannelChunkSink {
    fn chunk(&self, bytes: Bytes) {
        let _ = self.tx.send(EngineEvent::Chunk {
            run_id: self.run_id,
            bytes,
        });
    }
}

#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Streams the completion for `prompt` into `sink` until the body ends,
    /// the transport fails, or `cancel` fires.
    async fn generate(
        &self,
        prompt: &str,
        sink: &dyn ChunkSink,
        cancel: &CancellationToken,
    ) -> Result<(), GenerateError>;
}

#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    settings: GenerateSettings,
}

impl OllamaGenerator {
    pub fn new(settings: GenerateSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GenerateSettings {
        &self.settings
    }

    fn build_client(&self) -> Result<reqwest::Client, GenerateError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| GenerateError::new(FailureKind::Network, err.to_string()))
    }

    fn request_body(&self, prompt: &str) -> Result<Vec<u8>, GenerateError> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: true,
            options: &self.settings.options,
        };
        serde_json::to_vec(&request)
            .map_err(|err| GenerateError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Generator for OllamaGenerator {
    async fn generate(
        &self,
        prompt: &str,
        sink: &dyn ChunkSink,
        cancel: &CancellationToken,
    ) -> Result<(), GenerateError> {
        let endpoint = self.settings.endpoint()?;
        let client = self.build_client()?;
        let body = self.request_body(prompt)?;
        orbit_info!(
            "POST {} model={} prompt_len={}",
            endpoint,
            self.settings.model,
            prompt.len()
        );

        let send = client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerateError::cancelled()),
            result = send => result.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerateError::cancelled()),
                next = stream.next() => next,
            };
            match next {
                Some(chunk) => {
                    let chunk = chunk.map_err(map_reqwest_error)?;
                    received += chunk.len() as u64;
                    sink.chunk(chunk);
                }
                None => break,
            }
        }

        orbit_debug!("Stream closed after {} bytes", received);
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GenerateError {
    if err.is_timeout() {
        return GenerateError::new(FailureKind::Timeout, err.to_string());
    }
    GenerateError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::GenerateSettings;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let settings = GenerateSettings {
            base_url: "http://localhost:11434/".into(),
            ..GenerateSettings::default()
        };
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let settings = GenerateSettings {
            base_url: "http://gateway/ollama".into(),
            ..GenerateSettings::default()
        };
        assert_eq!(
            settings.endpoint().unwrap().as_str(),
            "http://gateway/ollama/api/generate"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let settings = GenerateSettings {
            base_url: "not a url".into(),
            ..GenerateSettings::default()
        };
        assert!(settings.endpoint().is_err());
    }
}
