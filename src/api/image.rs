use super::client::Transport;
use super::models::ImageRequest;
use super::response::extract_image_url;
use crate::config::ImageSettings;
use crate::error::Result;
use std::sync::Arc;

pub struct ImageClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    settings: ImageSettings,
}

impl ImageClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        settings: ImageSettings,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            settings,
        }
    }

    pub fn build_request(&self, prompt: &str) -> ImageRequest {
        ImageRequest {
            model: self.settings.model.clone(),
            prompt: prompt.to_string(),
            width: self.settings.width,
            height: self.settings.height,
            steps: self.settings.steps,
        }
    }

    /// Generate an image and return its URL
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_value(self.build_request(prompt))?;
        tracing::debug!(model = %self.settings.model, "sending image request");
        let response = self.transport.post_json(&self.endpoint, &body).await?;
        extract_image_url(&response)
    }
}
