//! [`Generator`] backed by a local Ollama server.
//!
//! Answers are streamed from `POST /api/chat` as newline-delimited JSON:
//!
//! ```text
//! {"message":{"role":"assistant","content":"In "},"done":false}
//! {"message":{"role":"assistant","content":"August."},"done":false}
//! {"message":{"role":"assistant","content":""},"done":true}
//! ```

use std::env;
use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ChatRequest, FragmentStream, Generator};
use crate::error::{ChatscrollError, Result};

/// Used when neither the configuration nor `OLLAMA_HOST` names a server.
pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";

/// Environment variable consulted for the server address.
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Client for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
}

impl OllamaGenerator {
    /// Creates a client for `host`, falling back to `OLLAMA_HOST` and then
    /// [`DEFAULT_HOST`]. A host without a scheme is taken as `http://`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Generation`] if the HTTP client cannot be
    /// created.
    pub fn new(host: Option<&str>) -> Result<Self> {
        let env_host = env::var(HOST_ENV).ok();
        let host = host
            .or(env_host.as_deref())
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(DEFAULT_HOST);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ChatscrollError::generation(format!("cannot create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_host(host),
        })
    }

    /// Server address requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed on the server, as listed by `/api/tags`.
    pub fn list_models(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Tags {
            #[serde(default)]
            models: Vec<Tag>,
        }

        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }

        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ChatscrollError::generation(format!("cannot reach Ollama at {}: {e}", self.base_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatscrollError::generation(format!(
                "Ollama returned {status} for /api/tags"
            )));
        }

        let tags: Tags = response
            .json()
            .map_err(|e| ChatscrollError::generation(format!("unexpected /api/tags response: {e}")))?;
        Ok(tags.models.into_iter().map(|tag| tag.name).collect())
    }

    /// `model` if given, otherwise the first installed model.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::Generation`] if no model is given and none
    /// is installed.
    pub fn resolve_model(&self, model: Option<&str>) -> Result<String> {
        if let Some(model) = model {
            return Ok(model.to_string());
        }
        self.list_models()?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ChatscrollError::generation("no models installed; pull one with `ollama pull <model>`")
            })
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let url = format!("{}/api/chat", self.base_url);
        let body = json!({
            "model": request.model,
            "messages": request.messages,
            "stream": true,
            "options": {
                "temperature": request.temperature,
            }
        });
        debug!(url = %url, model = %request.model, "requesting chat completion");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ChatscrollError::generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChatscrollError::generation(format!(
                "Ollama returned {status}: {}",
                error_message(&body)
            )));
        }

        Ok(Box::new(NdjsonFragments::new(BufReader::new(response))))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Pulls the `error` field out of an Ollama error body, if there is one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct StreamLine {
    #[serde(default)]
    message: Option<StreamMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: String,
}

/// Decodes an NDJSON chat stream into content fragments, ending at the
/// first `"done": true` line.
struct NdjsonFragments<R> {
    lines: Lines<R>,
    finished: bool,
}

impl<R: BufRead> NdjsonFragments<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for NdjsonFragments<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(ChatscrollError::generation(format!("stream error: {err}"))));
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed: StreamLine = match serde_json::from_str(line) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(error = %err, line, "skipping undecodable stream line");
                    continue;
                }
            };
            if let Some(error) = parsed.error {
                self.finished = true;
                return Some(Err(ChatscrollError::generation(error)));
            }
            self.finished = parsed.done;

            let content = parsed.message.map(|m| m.content).unwrap_or_default();
            if !content.is_empty() {
                return Some(Ok(content));
            }
        }
        None
    }
}
