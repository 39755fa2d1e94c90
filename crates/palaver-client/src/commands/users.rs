//! User directory commands.

use palaver_net::Gateway;
use palaver_shared::model::User;
use palaver_shared::types::UserId;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::Session;

impl Session {
    /// List every registered user.
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        Ok(self.gateway.list_users().await?)
    }

    /// Look up a user by id.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, ClientError> {
        Ok(self.gateway.get_user(user_id).await?)
    }

    /// Look up a user by username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<User, ClientError> {
        Ok(self.gateway.get_user_by_username(username).await?)
    }
}

/// Resolve an existing account by username, before a session exists.
pub async fn login(config: &ClientConfig, username: &str) -> Result<User, ClientError> {
    Ok(Gateway::new(&config.api_base)
        .get_user_by_username(username)
        .await?)
}

/// Register a new account, before a session exists.
pub async fn register(config: &ClientConfig, username: &str) -> Result<User, ClientError> {
    Ok(Gateway::new(&config.api_base).create_user(username).await?)
}
