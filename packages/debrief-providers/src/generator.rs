use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Calls an OpenAI-compatible chat-completions endpoint and returns the
/// assistant message as free text.
pub async fn complete(
	cfg: &debrief_config::GeneratorProviderConfig,
	messages: &[Value],
) -> Result<String> {
	let json = request_completion(cfg, messages, false).await?;

	completion_text(&json)
}

/// Same endpoint in JSON-object response mode. The assistant content is
/// expected to parse as a JSON object; up to three attempts are made before
/// giving up, since the model occasionally emits unparseable content.
pub async fn complete_json(
	cfg: &debrief_config::GeneratorProviderConfig,
	messages: &[Value],
) -> Result<Value> {
	for _ in 0..3 {
		let json = request_completion(cfg, messages, true).await?;

		if let Ok(parsed) = parse_json_content(&json) {
			return Ok(parsed);
		}
	}

	Err(Error::invalid_response("Generator response is not valid JSON."))
}

async fn request_completion(
	cfg: &debrief_config::GeneratorProviderConfig,
	messages: &[Value],
	json_mode: bool,
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});

	if json_mode && let Some(map) = body.as_object_mut() {
		map.insert(
			"response_format".to_string(),
			serde_json::json!({ "type": "json_object" }),
		);
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn completion_text(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| Error::invalid_response("Generator response is missing message content."))
}

fn parse_json_content(json: &Value) -> Result<Value> {
	let content = completion_text(json)?;

	serde_json::from_str(&content)
		.map_err(|_| Error::invalid_response("Generator content is not valid JSON."))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chat_response(content: &str) -> Value {
		serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": content } }
			]
		})
	}

	#[test]
	fn extracts_first_choice_content() {
		let text =
			completion_text(&chat_response("HIGH PRIORITY (This Week)")).expect("parse failed");

		assert_eq!(text, "HIGH PRIORITY (This Week)");
	}

	#[test]
	fn missing_choices_is_an_error() {
		let json = serde_json::json!({ "usage": { "total_tokens": 12 } });

		assert!(completion_text(&json).is_err());
	}

	#[test]
	fn parses_json_object_content() {
		let parsed = parse_json_content(&chat_response("{\"company\": \"ACME Corp\"}"))
			.expect("parse failed");

		assert_eq!(parsed["company"], "ACME Corp");
	}

	#[test]
	fn non_json_content_is_an_error() {
		assert!(parse_json_content(&chat_response("plain prose")).is_err());
	}
}
