mod account;
mod google;

pub use account::{AccountManager, ProfileStore, USER_STORAGE_KEY};
pub use google::GoogleDeviceAuth;

use crate::error::Result;
use crate::models::UserProfile;
use async_trait::async_trait;

/// Identity provider seam; the rest of the crate depends only on this.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self) -> Result<UserProfile>;

    async fn sign_out(&self) -> Result<()>;
}
