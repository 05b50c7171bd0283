use super::client::Transport;
use super::models::{ChatMessage, RequestBody};
use super::response::extract_completion;
use crate::config::Config;
use crate::error::{NexoraError, Result};
use crate::models::Message;
use std::sync::Arc;

/// Progress of one completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    RequestingPrimary,
    RequestingBackup,
    Failed,
    /// An image request is in flight; never part of the completion fallback
    GeneratingImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub primary_model: String,
    pub backup_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl CompletionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary_model: config.primary_model.clone(),
            backup_model: config.backup_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }
}

/// Answer produced by one of the two models
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub used_backup: bool,
}

pub struct CompletionClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    settings: CompletionSettings,
}

impl CompletionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// System instruction, then `history` in order, then the prompt as the
    /// final user turn.
    pub fn build_request(&self, model: &str, prompt: &str, history: &[Message]) -> RequestBody {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&self.settings.system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(prompt));

        RequestBody {
            model: model.to_string(),
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            max_tokens: self.settings.max_tokens,
            messages,
        }
    }

    /// One call against a single model
    pub async fn try_model(&self, model: &str, prompt: &str, history: &[Message]) -> Result<String> {
        let request = self.build_request(model, prompt, history);
        let body = serde_json::to_value(&request)?;
        tracing::debug!(
            %model,
            history = history.len(),
            endpoint = %self.endpoint,
            "sending completion request"
        );

        let response = self.transport.post_json(&self.endpoint, &body).await?;
        extract_completion(&response)
    }

    /// Try the primary model, then the backup model exactly once if the
    /// primary fails. `observe` sees every state transition, ending in
    /// `Idle`.
    pub async fn complete_with(
        &self,
        prompt: &str,
        history: &[Message],
        mut observe: impl FnMut(RequestState) + Send,
    ) -> Result<Completion> {
        let primary_model = &self.settings.primary_model;
        let backup_model = &self.settings.backup_model;

        observe(RequestState::RequestingPrimary);
        let primary_error = match self.try_model(primary_model, prompt, history).await {
            Ok(text) => {
                observe(RequestState::Idle);
                return Ok(Completion {
                    text,
                    model: primary_model.clone(),
                    used_backup: false,
                });
            }
            Err(e) if e.is_model_failure() => e,
            Err(e) => {
                observe(RequestState::Idle);
                return Err(e);
            }
        };

        tracing::warn!(
            model = %primary_model,
            error = %primary_error,
            "primary model failed, trying backup model"
        );
        observe(RequestState::RequestingBackup);
        match self.try_model(backup_model, prompt, history).await {
            Ok(text) => {
                observe(RequestState::Idle);
                Ok(Completion {
                    text,
                    model: backup_model.clone(),
                    used_backup: true,
                })
            }
            Err(backup_error) => {
                tracing::warn!(
                    model = %backup_model,
                    error = %backup_error,
                    "backup model failed"
                );
                observe(RequestState::Failed);
                observe(RequestState::Idle);
                Err(NexoraError::AllModelsFailed {
                    primary: Box::new(primary_error),
                    backup: Box::new(backup_error),
                })
            }
        }
    }
}
