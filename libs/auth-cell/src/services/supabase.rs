use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::UserAccount;

use crate::models::CredentialError;
use crate::services::store::CredentialStore;

const USER_LOGIN_TABLE: &str = "user_login";

/// Login records in the Supabase `user_login` table, unique on `username`.
pub struct SupabaseCredentialStore {
    supabase: SupabaseClient,
}

impl SupabaseCredentialStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

fn store_error(e: anyhow::Error) -> CredentialError {
    error!("Supabase credential store failure: {}", e);
    CredentialError::Store(e.to_string())
}

#[async_trait]
impl CredentialStore for SupabaseCredentialStore {
    async fn find_one(&self, username: &str) -> Result<Option<UserAccount>, CredentialError> {
        let filters = [("username", format!("eq.{}", username))];

        let mut rows = self.supabase
            .select::<UserAccount>(USER_LOGIN_TABLE, &filters)
            .await
            .map_err(store_error)?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn insert_one(&self, account: UserAccount) -> Result<(), CredentialError> {
        debug!("Inserting login record for {}", account.username);

        let username = account.username.clone();
        let body = serde_json::to_value(&account).map_err(|e| CredentialError::Store(e.to_string()))?;

        let _: Vec<Value> = self.supabase
            .insert(USER_LOGIN_TABLE, body)
            .await
            .map_err(|e| {
                if e.to_string().starts_with("Conflict") {
                    CredentialError::UserExists(username)
                } else {
                    store_error(e)
                }
            })?;

        Ok(())
    }
}
