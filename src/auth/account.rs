use super::AuthProvider;
use crate::error::{NexoraError, Result};
use crate::models::UserProfile;
use crate::session::StateStorage;
use std::sync::Arc;

/// Storage key the signed-in profile is kept under
pub const USER_STORAGE_KEY: &str = "nexora_user";

/// Durable record of the signed-in user
pub struct ProfileStore {
    storage: Arc<dyn StateStorage>,
}

impl ProfileStore {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self { storage }
    }

    /// The stored profile. A record that can't be read or parsed is dropped
    /// and reported as signed out.
    pub fn load(&self) -> Option<UserProfile> {
        let contents = match self.storage.load() {
            Ok(contents) => contents?,
            Err(e) => {
                tracing::warn!("failed to read user profile: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("discarding unreadable user profile: {}", e);
                if let Err(e) = self.storage.clear() {
                    tracing::warn!("failed to remove user profile: {}", e);
                }
                None
            }
        }
    }

    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let contents = serde_json::to_string(profile)?;
        self.storage.save(&contents)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.clear()
    }
}

/// Sign-in and sign-out on top of an optional identity provider.
///
/// Without a provider, signing in is unavailable but signing out still
/// forgets the stored profile.
pub struct AccountManager {
    provider: Option<Box<dyn AuthProvider>>,
    profiles: ProfileStore,
}

impl AccountManager {
    pub fn new(provider: Option<Box<dyn AuthProvider>>, storage: Arc<dyn StateStorage>) -> Self {
        Self {
            provider,
            profiles: ProfileStore::new(storage),
        }
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.profiles.load()
    }

    pub async fn sign_in(&self) -> Result<UserProfile> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            NexoraError::FeatureUnavailable(
                "sign-in needs an OAuth client id (GOOGLE_CLIENT_ID)".to_string(),
            )
        })?;

        let profile = provider.sign_in().await?;
        self.profiles.save(&profile)?;
        tracing::info!(uid = %profile.uid, "signed in");
        Ok(profile)
    }

    pub async fn sign_out(&self) -> Result<()> {
        if let Some(provider) = &self.provider {
            if let Err(e) = provider.sign_out().await {
                tracing::warn!("provider sign-out failed: {}", e);
            }
        }
        self.profiles.clear()?;
        tracing::info!("signed out");
        Ok(())
    }
}
