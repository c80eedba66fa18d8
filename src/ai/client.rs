//! Provider-backed text completion
//!
//! One HTTP call per classification batch. Each supported provider has its
//! own request/response shape behind an exhaustive match, so an unsupported
//! provider is unrepresentable rather than a runtime lookup miss.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{CofferError, CofferResult};
use crate::models::AiProvider;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// A text-completion backend: prompt in, raw response text out
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(
        &self,
        provider: AiProvider,
        prompt: &str,
        api_key: &str,
        model: &str,
    ) -> CofferResult<String>;
}

/// HTTP client for the real providers
///
/// Anthropic blocks browser-style CORS, so it is reached through a stateless
/// relay that forwards the key in the request body and never stores it; the
/// relay URL comes from device settings.
pub struct HttpCompletionClient {
    client: Client,
    relay_url: Option<String>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f64,
    response_format: OpenAiResponseFormat,
}

// JSON mode keeps the completion parseable without prose wrapping.
fn openai_request<'a>(prompt: &'a str, model: &'a str) -> OpenAiRequest<'a> {
    OpenAiRequest {
        model,
        messages: vec![OpenAiMessage {
            role: "user",
            content: prompt,
        }],
        temperature: 0.1,
        response_format: OpenAiResponseFormat {
            kind: "json_object",
        },
    }
}

impl HttpCompletionClient {
    pub fn new(relay_url: Option<String>) -> CofferResult<Self> {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| CofferError::Provider(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, relay_url })
    }

    async fn call_openai(&self, prompt: &str, api_key: &str, model: &str) -> CofferResult<String> {
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: String,
        }
        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&openai_request(prompt, model))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CofferError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let parsed: Response = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn call_anthropic(
        &self,
        prompt: &str,
        api_key: &str,
        model: &str,
    ) -> CofferResult<String> {
        let relay = self.relay_url.as_deref().ok_or_else(|| {
            CofferError::Provider(
                "an AI relay URL is required for Anthropic; set ai_relay_url in settings"
                    .to_string(),
            )
        })?;

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            text: String,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            content: Vec<ContentBlock>,
        }

        let body = serde_json::json!({
            "provider": "anthropic",
            "apiKey": api_key,
            "body": {
                "model": model,
                "max_tokens": 4096,
                "messages": [{ "role": "user", "content": prompt }],
            },
        });

        let response = self
            .client
            .post(format!("{}/ai/proxy", relay.trim_end_matches('/')))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CofferError::Provider(format!(
                "Anthropic relay error ({}): {}",
                status, body
            )));
        }

        let parsed: Response = response.json().await?;
        Ok(parsed
            .content
            .into_iter()
            .find(|c| c.kind == "text")
            .map(|c| c.text)
            .unwrap_or_default())
    }

    async fn call_google(&self, prompt: &str, api_key: &str, model: &str) -> CofferResult<String> {
        #[derive(Deserialize)]
        struct Part {
            #[serde(default)]
            text: String,
        }
        #[derive(Deserialize)]
        struct Content {
            #[serde(default)]
            parts: Vec<Part>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model, api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json",
            },
        });

        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CofferError::Provider(format!(
                "Google Gemini API error ({}): {}",
                status, body
            )));
        }

        let parsed: Response = response.json().await?;
        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TextCompletion for HttpCompletionClient {
    async fn complete(
        &self,
        provider: AiProvider,
        prompt: &str,
        api_key: &str,
        model: &str,
    ) -> CofferResult<String> {
        debug!(?provider, model, "dispatching classification batch");
        match provider {
            AiProvider::OpenAi => self.call_openai(prompt, api_key, model).await,
            AiProvider::Anthropic => self.call_anthropic(prompt, api_key, model).await,
            AiProvider::Google => self.call_google(prompt, api_key, model).await,
        }
    }
}
