//! Grounded answer generation.
//!
//! Builds a fixed prompt that embeds the retrieved context chunks and the
//! question, instructing the model to answer only from that context and to
//! return [`FALLBACK_ANSWER`] verbatim when the context does not contain the
//! answer. The model's text output is returned unmodified. Remote failures
//! are not retried.

use std::time::Duration;

use crate::config::{self, GenerationConfig};
use crate::error::PipelineError;

/// The literal string the model must return when the context does not
/// contain the answer.
pub const FALLBACK_ANSWER: &str = "The answer is not available in the context.";

const PROMPT_TEMPLATE: &str = "You are a historian with expertise in answering questions related \
to history. Answer the question as detailed as possible from the provided context. Make sure to \
provide all the details. If the answer is not in the provided context, just say, \
\"The answer is not available in the context.\" and do not provide incorrect information.\n\
\n\
Context:\n{context}\n\
\n\
Question:\n{question}\n\
\n\
Answer:";

/// Render the prompt for one question against its retrieved context chunks.
pub fn build_prompt(context: &[String], question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", &context.join("\n\n"))
        .replace("{question}", question)
}

/// Obtain a grounded answer for `question` from the retrieved `context`.
///
/// Empty context short-circuits to [`FALLBACK_ANSWER`] without a remote
/// call: with nothing to ground on, the model must not be asked to invent.
///
/// # Errors
///
/// [`PipelineError::Config`] when the API key is missing,
/// [`PipelineError::GenerationService`] on remote failure (no retry).
pub async fn answer(
    config: &GenerationConfig,
    question: &str,
    context: &[String],
) -> Result<String, PipelineError> {
    if context.iter().all(|c| c.trim().is_empty()) {
        return Ok(FALLBACK_ANSWER.to_string());
    }

    let api_key = config::api_key()?;
    let prompt = build_prompt(context, question);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

    let url = format!("{}/models/{}:generateContent", config.base_url, config.model);

    let body = serde_json::json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "temperature": config.temperature },
    });

    let response = client
        .post(&url)
        .header("x-goog-api-key", &api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(PipelineError::GenerationService(format!(
            "Gemini API error {}: {}",
            status, body_text
        )));
    }

    let json: serde_json::Value = response
        .json()
        .await
        .map_err(|e| PipelineError::GenerationService(e.to_string()))?;

    parse_generate_response(&json)
}

/// Extract the first candidate's text parts from a `generateContent`
/// response, concatenated in order.
fn parse_generate_response(json: &serde_json::Value) -> Result<String, PipelineError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            PipelineError::GenerationService(
                "invalid Gemini response: no candidate content".to_string(),
            )
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(PipelineError::GenerationService(
            "empty generation response".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_context_returns_fallback_literal() {
        let config = GenerationConfig::default();
        let reply = answer(&config, "Who stormed the Bastille?", &[])
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_whitespace_context_returns_fallback_literal() {
        let config = GenerationConfig::default();
        let context = vec!["   ".to_string(), "\n".to_string()];
        let reply = answer(&config, "Who stormed the Bastille?", &context)
            .await
            .unwrap();
        assert_eq!(reply, FALLBACK_ANSWER);
    }

    #[test]
    fn test_prompt_contains_inputs_and_fallback() {
        let context = vec![
            "The revolution began in 1789.".to_string(),
            "It ended in 1799.".to_string(),
        ];
        let prompt = build_prompt(&context, "When did the revolution begin?");

        assert!(prompt.contains("The revolution began in 1789."));
        assert!(prompt.contains("It ended in 1799."));
        assert!(prompt.contains("When did the revolution begin?"));
        assert!(prompt.contains(FALLBACK_ANSWER));
        assert!(prompt.contains("do not provide incorrect information"));
    }

    #[test]
    fn test_parse_generate_response() {
        let json = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "It began " }, { "text": "in 1789." }]
                }
            }]
        });
        assert_eq!(parse_generate_response(&json).unwrap(), "It began in 1789.");
    }

    #[test]
    fn test_parse_generate_response_no_candidates() {
        let json = serde_json::json!({ "candidates": [] });
        let err = parse_generate_response(&json).unwrap_err();
        assert!(matches!(err, PipelineError::GenerationService(_)));
    }
}
