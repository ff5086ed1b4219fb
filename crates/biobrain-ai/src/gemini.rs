//! Metadata extraction through the Gemini `generateContent` API.

use std::time::Duration;

use biobrain_core::config::AiConfig;
use biobrain_core::ExtractedMetadata;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AiError, Result};
use crate::extractor::MetadataExtractor;
use crate::response::parse_extraction_reply;

const PROMPT: &str = "You are reading a biomedical research paper. Return one JSON object \
with exactly these keys: \"title\", \"author\" (first author, surname and initials), \
\"year\" (integer), \"category\" (a list of short topic tags), \"problem\" (the problem \
the paper solves), \"finding\" (the key finding), \"method\" (the methodology) and \
\"limitation\" (the main limitation). Use null for anything you cannot determine. \
Return only the JSON object.\n\nPaper text:\n";

// ─── Wire types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ─── GeminiExtractor ──────────────────────────────────────────

pub struct GeminiExtractor {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_input_chars: usize,
}

impl GeminiExtractor {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        max_input_chars: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("biobrain/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key,
            max_input_chars,
        })
    }

    /// Builds an extractor from config, reading the key from the environment
    /// variable named by `api_key_env`.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            config.max_input_chars,
            config.timeout_secs,
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn prompt(&self, text: &str) -> String {
        let clipped: String = text.chars().take(self.max_input_chars).collect();
        format!("{PROMPT}{clipped}")
    }
}

impl MetadataExtractor for GeminiExtractor {
    fn extract(&self, text: &str) -> Result<ExtractedMetadata> {
        let body = json!({
            "contents": [{ "parts": [{ "text": self.prompt(text) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!(model = %self.model, "requesting metadata extraction");
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|env| env.error.message)
                .unwrap_or(raw);
            tracing::warn!(status = status.as_u16(), "metadata extraction failed");
            return Err(AiError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateResponse = resp.json()?;
        let reply = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| AiError::Response("reply has no text candidate".to_string()))?;

        parse_extraction_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn extractor(url: &str, max_chars: usize) -> GeminiExtractor {
        GeminiExtractor::new(url, "models/gemini-2.5-flash", "test-key".into(), max_chars, 5)
            .unwrap()
    }

    fn candidate_body(text: &str) -> String {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
    }

    #[test]
    fn test_extract_success() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body(
                r#"{"title": "Base editing", "author": "Komor AC", "year": 2016,
                    "category": ["Gene Therapy"], "problem": "p", "finding": "f",
                    "method": "m", "limitation": "l"}"#,
            ))
            .create();

        let meta = extractor(&server.url(), 1000).extract("some text").unwrap();
        mock.assert();
        assert_eq!(meta.title.as_deref(), Some("Base editing"));
        assert_eq!(meta.year, Some(2016));
        assert_eq!(meta.limitation.as_deref(), Some("l"));
    }

    #[test]
    fn test_input_is_clipped() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::Regex("Paper text:\\\\nabc\"".to_string()))
            .with_status(200)
            .with_body(candidate_body("{}"))
            .create();

        let meta = extractor(&server.url(), 3).extract("abcdefgh").unwrap();
        mock.assert();
        assert_eq!(meta, ExtractedMetadata::default());
    }

    #[test]
    fn test_http_error_carries_message() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", PATH)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "API key not valid"}}"#)
            .create();

        let err = extractor(&server.url(), 1000).extract("text").unwrap_err();
        match err {
            AiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_payload_in_reply() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(candidate_body(r#"{"error": "document is not a paper"}"#))
            .create();

        let err = extractor(&server.url(), 1000).extract("text").unwrap_err();
        assert!(matches!(err, AiError::Response(msg) if msg == "document is not a paper"));
    }

    #[test]
    fn test_empty_candidates() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create();

        let err = extractor(&server.url(), 1000).extract("text").unwrap_err();
        assert!(matches!(err, AiError::Response(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let config = AiConfig {
            api_key_env: "BIOBRAIN_TEST_UNSET_KEY_VAR".to_string(),
            ..AiConfig::default()
        };
        let err = GeminiExtractor::from_config(&config).err().unwrap();
        assert!(matches!(err, AiError::MissingApiKey(name) if name == "BIOBRAIN_TEST_UNSET_KEY_VAR"));
    }
}
