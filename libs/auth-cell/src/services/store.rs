use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::auth::UserAccount;

use crate::models::CredentialError;

/// Persistence seam for login records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_one(&self, username: &str) -> Result<Option<UserAccount>, CredentialError>;

    /// Fails with `UserExists` when the username is taken.
    async fn insert_one(&self, account: UserAccount) -> Result<(), CredentialError>;
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_one(&self, username: &str) -> Result<Option<UserAccount>, CredentialError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn insert_one(&self, account: UserAccount) -> Result<(), CredentialError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Err(CredentialError::UserExists(account.username));
        }

        debug!("Stored login record for {}", account.username);
        accounts.insert(account.username.clone(), account);
        Ok(())
    }
}
