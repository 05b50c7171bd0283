use super::AuthProvider;
use crate::config::AuthSettings;
use crate::error::{NexoraError, Result};
use crate::models::UserProfile;
use async_trait::async_trait;
use colored::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPE: &str = "openid email profile";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SLOW_DOWN_BACKOFF_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_url")]
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
}

fn default_interval() -> u64 {
    5
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    device_code: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for UserProfile {
    fn from(info: UserInfo) -> Self {
        UserProfile {
            uid: info.sub,
            display_name: info.name,
            email: info.email,
            photo_url: info.picture,
        }
    }
}

/// Google sign-in through the OAuth 2.0 device authorization grant.
///
/// The access token is only used to fetch the profile and is never stored,
/// so signing out is purely local.
pub struct GoogleDeviceAuth {
    client: reqwest::Client,
    settings: AuthSettings,
}

impl GoogleDeviceAuth {
    pub fn new(settings: AuthSettings, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }

    async fn device_flow(&self) -> Result<String> {
        let resp = self
            .client
            .post(DEVICE_CODE_URL)
            .header("Accept", "application/json")
            .form(&DeviceCodeRequest {
                client_id: &self.settings.client_id,
                scope: SCOPE,
            })
            .send()
            .await
            .map_err(|e| NexoraError::AuthError(format!("Device code request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(NexoraError::AuthError(format!(
                "Device code request returned {}: {}",
                status, body
            )));
        }

        let device: DeviceCodeResponse = resp
            .json()
            .await
            .map_err(|e| NexoraError::AuthError(format!("Failed to parse device code: {}", e)))?;

        println!("\n{}", "Google Sign-In Required:".cyan());
        println!("  1. Visit: {}", device.verification_uri);
        println!("  2. Enter code: {}", device.user_code.bold());
        println!("\n{}", "Waiting for authorization...".dimmed());

        let interval = Duration::from_secs(device.interval.max(1));
        let max_attempts = (device.expires_in / device.interval.max(1)).max(1);

        for attempt in 0..max_attempts {
            tokio::time::sleep(interval).await;

            let response = self
                .client
                .post(TOKEN_URL)
                .header("Accept", "application/json")
                .form(&TokenRequest {
                    client_id: &self.settings.client_id,
                    client_secret: self.settings.client_secret.as_deref(),
                    device_code: &device.device_code,
                    grant_type: DEVICE_GRANT_TYPE,
                })
                .send()
                .await
                .map_err(|e| NexoraError::AuthError(format!("Token poll failed: {}", e)))?;

            // Pending authorizations come back as 4xx with an error body
            let body: serde_json::Value = response.json().await.map_err(|e| {
                NexoraError::AuthError(format!("Failed to parse token poll response: {}", e))
            })?;

            if let Some(access) = body.get("access_token").and_then(|v| v.as_str()) {
                tracing::info!("Google device flow completed");
                return Ok(access.to_string());
            }

            match body.get("error").and_then(|v| v.as_str()) {
                Some("authorization_pending") => {
                    tracing::debug!("authorization_pending; continuing to poll");
                }
                Some("slow_down") => {
                    tracing::debug!("slow_down received; backing off");
                    tokio::time::sleep(Duration::from_secs(SLOW_DOWN_BACKOFF_SECS)).await;
                }
                Some("access_denied") => {
                    return Err(NexoraError::AuthError(
                        "Sign-in was denied".to_string(),
                    ));
                }
                Some("expired_token") => {
                    return Err(NexoraError::AuthError(
                        "Device code expired before authorization".to_string(),
                    ));
                }
                Some(other) => {
                    return Err(NexoraError::AuthError(format!(
                        "Device flow error from provider: {}",
                        other
                    )));
                }
                None => {
                    tracing::debug!("token poll returned no token and no error; continuing");
                }
            }

            tracing::debug!("polling attempt {}/{}", attempt + 1, max_attempts);
        }

        Err(NexoraError::AuthError(
            "Timed out waiting for authorization".to_string(),
        ))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| NexoraError::AuthError(format!("Profile request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NexoraError::AuthError(format!(
                "Profile request returned {}",
                response.status()
            )));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| NexoraError::AuthError(format!("Failed to parse profile: {}", e)))?;
        Ok(info.into())
    }
}

#[async_trait]
impl AuthProvider for GoogleDeviceAuth {
    async fn sign_in(&self) -> Result<UserProfile> {
        let token = self.device_flow().await?;
        self.fetch_profile(&token).await
    }

    async fn sign_out(&self) -> Result<()> {
        tracing::debug!("no stored Google token to revoke");
        Ok(())
    }
}
