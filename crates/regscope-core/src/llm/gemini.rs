//! Google Generative Language API client

use super::client::{CachedTransport, ChatMessage, LLMClient, MetricsSnapshot};
use crate::config::LLMServiceConfig;
use crate::error::{RegscopeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Client for `models/{model}:generateContent`
pub struct GeminiClient {
    transport: CachedTransport,
    config: LLMServiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GeminiClient {
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let transport = CachedTransport::new(&config)?;
        Ok(Self { transport, config })
    }

    /// System messages become the system instruction, the rest become user turns
    fn build_request(&self, messages: &[ChatMessage]) -> GenerateRequest {
        let system: Vec<Part> = messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| Part {
                text: Some(m.content.clone()),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| !m.is_system())
            .map(|m| Content {
                role: Some(if m.role == "assistant" { "model" } else { "user" }.to_string()),
                parts: vec![Part {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        GenerateRequest {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: system,
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();
        let (cache_key, cached) = self.transport.lookup(&self.config.model, &messages);
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            RegscopeError::Config("Gemini provider requires an API key".to_string())
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.url.trim_end_matches('/'),
            self.config.model
        );
        let request = self.build_request(&messages);

        let response = self
            .transport
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                self.transport.metrics.record_error();
                RegscopeError::Http(e)
            })?;
        let response = self.transport.check_status(response).await?;

        let body: GenerateResponse = response.json().await.map_err(|e| {
            self.transport.metrics.record_error();
            RegscopeError::Http(e)
        })?;

        let content: String = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            tracing::warn!("Gemini returned no candidate text");
        }
        self.transport.finish(cache_key, &content, start);

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        Some(self.transport.metrics.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use axum::{extract::Path, http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn gemini_config(url: String) -> LLMServiceConfig {
        LLMServiceConfig {
            provider: LlmProvider::Gemini,
            url,
            model: "gemini-2.5-pro".to_string(),
            api_key: Some("test-key".to_string()),
            ..LLMServiceConfig::default()
        }
    }

    #[test]
    fn test_build_request_splits_system_instruction() {
        let client = GeminiClient::new(gemini_config("http://unused".into())).unwrap();
        let request = client.build_request(&[
            ChatMessage::system("Respond with JSON."),
            ChatMessage::user("Question: leverage ratio"),
        ]);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            "Respond with JSON."
        );
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[tokio::test]
    async fn test_generate_content_joins_parts() {
        let app = Router::new().route(
            "/v1beta/models/{*rest}",
            post(
                |Path(rest): Path<String>, headers: HeaderMap, Json(_body): Json<Value>| async move {
                    assert_eq!(rest, "gemini-2.5-pro:generateContent");
                    assert_eq!(headers["x-goog-api-key"], "test-key");
                    Json(json!({
                        "candidates": [{
                            "content": { "role": "model", "parts": [{ "text": "Tier 1 " }, { "text": "capital" }] }
                        }]
                    }))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GeminiClient::new(gemini_config(format!("http://{}", addr))).unwrap();
        let reply = client
            .chat_completion(vec![ChatMessage::user("Define Tier 1")])
            .await
            .unwrap();

        assert_eq!(reply, "Tier 1 capital");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let mut config = gemini_config("http://unused".into());
        config.api_key = None;
        let client = GeminiClient::new(config).unwrap();

        let err = client
            .chat_completion(vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, RegscopeError::Config(_)));
    }
}
