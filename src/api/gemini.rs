use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::logging::log_request_to_file;
use crate::models::{Part, Role, Turn};

use super::GenerativeModel;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: Option<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        system_prompt: Option<String>,
    ) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            model,
            base_url,
            system_prompt,
            client: reqwest::Client::new(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn part_to_value(part: &Part) -> Value {
        match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineImage { mime_type, data } => json!({
                "inline_data": {
                    "mime_type": mime_type,
                    "data": STANDARD.encode(data),
                }
            }),
        }
    }

    fn build_request(&self, history: &[Turn], parts: &[Part]) -> Value {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.as_str(),
                    "parts": [{ "text": turn.content }],
                })
            })
            .collect();

        contents.push(json!({
            "role": Role::User.as_str(),
            "parts": parts.iter().map(Self::part_to_value).collect::<Vec<_>>(),
        }));

        let mut request = json!({ "contents": contents });
        if let Some(prompt) = &self.system_prompt {
            request["system_instruction"] = json!({ "parts": [{ "text": prompt }] });
        }
        request
    }

    fn extract_reply(response: &Value) -> Result<String> {
        let parts = response["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| anyhow!("no candidates in response"))?;

        let mut text = String::new();
        for item in parts {
            if let Some(chunk) = item["text"].as_str() {
                text.push_str(chunk);
            }
        }

        if text.is_empty() {
            return Err(anyhow!("response contained no text parts"));
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, history: &[Turn], parts: &[Part]) -> Result<String> {
        let request = self.build_request(history, parts);
        let url = self.generate_url();

        // Log request to file for persistent debugging
        let _ = log_request_to_file(&url, &request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error: {} - {}", status, error_text));
        }

        let response_json: Value = response.json().await?;
        Self::extract_reply(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(system_prompt: Option<&str>) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            "gemini-2.5-flash-lite".to_string(),
            "https://example.invalid/".to_string(),
            system_prompt.map(str::to_string),
        )
    }

    #[test]
    fn generate_url_strips_trailing_slash() {
        assert_eq!(
            client(None).generate_url(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }

    #[test]
    fn request_carries_history_then_new_parts() {
        let history = vec![
            Turn::new(Role::User, "hi"),
            Turn::new(Role::Model, "hello"),
        ];
        let parts = vec![Part::Text("how are you?".to_string())];

        let request = client(None).build_request(&history, &parts);
        let contents = request["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "hello");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "how are you?");
        assert!(request.get("system_instruction").is_none());
    }

    #[test]
    fn image_part_is_base64_inline_data() {
        let parts = vec![
            Part::InlineImage {
                mime_type: "image/png".to_string(),
                data: b"foo".to_vec(),
            },
            Part::Text("what is this?".to_string()),
        ];

        let request = client(Some("be terse")).build_request(&[], &parts);
        let sent = request["contents"][0]["parts"].as_array().unwrap();

        // Image first, text second.
        assert_eq!(sent[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(sent[0]["inline_data"]["data"], "Zm9v");
        assert_eq!(sent[1]["text"], "what is this?");
        assert_eq!(request["system_instruction"]["parts"][0]["text"], "be terse");
    }

    #[test]
    fn extract_reply_concatenates_text_parts() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Hello" }, { "text": " there" }],
                    "role": "model"
                }
            }]
        });
        assert_eq!(GeminiClient::extract_reply(&response).unwrap(), "Hello there");
    }

    #[test]
    fn extract_reply_rejects_empty_candidates() {
        assert!(GeminiClient::extract_reply(&json!({})).is_err());
        assert!(GeminiClient::extract_reply(&json!({
            "candidates": [{ "content": { "parts": [] } }]
        }))
        .is_err());
    }
}
