//! Scripted completion backend for tests and offline development
//!
//! Returns a canned response (or failure) and records every prompt it was
//! given, so tests can assert on batch contents without network access.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{CofferError, CofferResult};
use crate::models::AiProvider;

use super::client::TextCompletion;

/// A [`TextCompletion`] that replays a scripted outcome
pub struct ScriptedCompletion {
    outcome: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    /// Always reply with the given raw response text
    pub fn replying(response: impl Into<String>) -> Self {
        Self {
            outcome: Ok(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a provider error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// The most recent prompt, if any call was made
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(
        &self,
        _provider: AiProvider,
        prompt: &str,
        _api_key: &str,
        _model: &str,
    ) -> CofferResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.outcome {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(CofferError::Provider(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replying_records_prompt() {
        let mock = ScriptedCompletion::replying("[]");
        let out = mock
            .complete(AiProvider::OpenAi, "classify this", "k", "m")
            .await
            .unwrap();
        assert_eq!(out, "[]");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_prompt().unwrap(), "classify this");
    }

    #[tokio::test]
    async fn test_failing_returns_provider_error() {
        let mock = ScriptedCompletion::failing("boom");
        let err = mock
            .complete(AiProvider::OpenAi, "p", "k", "m")
            .await
            .unwrap_err();
        assert!(err.is_provider());
    }
}
