use std::sync::Arc;

use log::{info, warn};
use validator::Validate;

use crate::auth::{hash_password, verify_password, RegisterRequest};
use crate::error::AppError;
use crate::models::User;
use crate::store::UserRepository;

const USERNAME_RULES: &str =
    "username must be 3 to 50 characters of letters, digits, underscores or hyphens";
const PASSWORD_RULES: &str = "password must be 6 to 72 characters and at most 72 bytes";

/// Registers users and checks their passwords.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    cost: u32,
    /// Verified against when the username is unknown, so a miss costs as
    /// much as a wrong password.
    dummy_hash: Arc<str>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password("not-a-real-password", cost)?;
        Ok(Self {
            users,
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let request = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        // Username rules, then availability, then password strength.
        let invalid_fields = match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.field_errors().into_keys().collect(),
        };
        if invalid_fields.contains(&"username") {
            return Err(AppError::InvalidUsername(USERNAME_RULES.into()));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        if invalid_fields.contains(&"password") {
            return Err(AppError::WeakPassword(PASSWORD_RULES.into()));
        }

        let password_hash = self.hash(request.password).await?;
        let user = self.users.insert_user(username, &password_hash).await?;
        info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Unknown usernames and wrong passwords both end in
    /// `AppError::InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self.users.find_by_username(username).await?;
        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| {
                AppError::Internal(format!("password verification task failed: {}", e))
            })??;

        match user {
            Some(user) if matches => Ok(user),
            _ => {
                warn!("failed login attempt for username {:?}", username);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }
}
