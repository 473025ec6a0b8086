//! stateless client for the two LLM oracle operations: molecule-name
//! extraction from free text and SMILES generation from a molecule name.
//! one OpenAI-compatible chat-completions endpoint serves both

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::error::OracleError;

const EXTRACT_PROMPT: &str = "Extract molecule names from a text passage. \
    Respond with a JSON array of the molecule names mentioned, in order of \
    appearance, and nothing else. Respond with [] if there are none.";

const SMILES_PROMPT: &str = "Return the SMILES string for the given molecule \
    name. Respond with the SMILES string only, no prose.";

/// the external text-generation oracle the resolution pipeline depends on.
/// single-shot requests, no session state
#[async_trait]
pub trait Oracle: Send + Sync {
    /// molecule names mentioned in `text`: finite, ordered, possibly empty,
    /// duplicates preserved
    async fn extract_molecule_names(
        &self,
        text: &str,
    ) -> Result<Vec<String>, OracleError>;

    /// a SMILES string for a molecule name absent from the registry
    async fn smiles_for(&self, molecule_name: &str) -> Result<String, OracleError>;
}

pub struct OpenAiOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl OpenAiOracle {
    pub fn new(cfg: &OracleConfig, api_key: String) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            model: cfg.model.clone(),
            api_key,
            max_retries: cfg.max_retries,
        })
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        // bounded retry with backoff; the calls are idempotent
        let mut attempt = 0;
        loop {
            match self.try_complete(&url, &body).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.max_retries && retryable(&e) => {
                    let delay = Duration::from_millis(250 << attempt);
                    warn!("oracle call failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_complete(
        &self,
        url: &str,
        body: &ChatRequest<'_>,
    ) -> Result<String, OracleError> {
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }
        let reply: ChatResponse = resp.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Malformed("no choices in reply".into()))
    }
}

fn retryable(e: &OracleError) -> bool {
    match e {
        OracleError::Http(_) => true,
        OracleError::Status(s) => {
            s.is_server_error() || *s == StatusCode::TOO_MANY_REQUESTS
        }
        OracleError::Malformed(_) => false,
    }
}

/// models wrap structured replies in code fences often enough that stripping
/// them beats re-prompting
fn strip_fences(reply: &str) -> &str {
    let reply = reply.trim();
    let Some(inner) = reply
        .strip_prefix("```json")
        .or_else(|| reply.strip_prefix("```"))
    else {
        return reply;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_names(reply: &str) -> Result<Vec<String>, OracleError> {
    let body = strip_fences(reply);
    serde_json::from_str(body)
        .map_err(|e| OracleError::Malformed(format!("{e} in {body:?}")))
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn extract_molecule_names(
        &self,
        text: &str,
    ) -> Result<Vec<String>, OracleError> {
        let reply = self.complete(EXTRACT_PROMPT, text).await?;
        let names = parse_names(&reply)?;
        debug!("extracted {} molecule names", names.len());
        Ok(names)
    }

    async fn smiles_for(&self, molecule_name: &str) -> Result<String, OracleError> {
        let reply = self.complete(SMILES_PROMPT, molecule_name).await?;
        Ok(strip_fences(&reply).trim_matches('"').to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_accepts_plain_and_fenced_arrays() {
        let want = vec!["aspirin".to_owned(), "ibuprofen".to_owned()];
        let got = parse_names(r#"["aspirin", "ibuprofen"]"#).unwrap();
        assert_eq!(got, want);

        let got =
            parse_names("```json\n[\"aspirin\", \"ibuprofen\"]\n```").unwrap();
        assert_eq!(got, want);

        assert_eq!(parse_names("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn parse_names_rejects_prose() {
        let got = parse_names("the molecules are aspirin and ibuprofen");
        assert!(matches!(got, Err(OracleError::Malformed(_))));
    }

    #[test]
    fn fence_stripping_leaves_bare_replies_alone() {
        assert_eq!(strip_fences("  CCO \n"), "CCO");
        assert_eq!(strip_fences("```\nCCO\n```"), "CCO");
    }
}
