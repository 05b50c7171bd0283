use super::models::{SpeechRequest, VoiceSettings};
use crate::config::SpeechSettings;
use crate::error::{NexoraError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

const SPEECH_ENDPOINT: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// Text-to-speech through the ElevenLabs API, returning MP3 bytes
pub struct SpeechClient {
    client: reqwest::Client,
    settings: SpeechSettings,
}

impl SpeechClient {
    pub fn new(settings: SpeechSettings, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("audio/mpeg"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "xi-api-key",
            HeaderValue::from_str(&settings.api_key).map_err(|e| {
                NexoraError::ConfigError(format!("Invalid speech API key header: {}", e))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", SPEECH_ENDPOINT, self.settings.voice_id)
    }

    pub fn build_request(&self, text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            model_id: self.settings.model_id.clone(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        }
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to generate speech".to_string());
            return Err(NexoraError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
