pub mod extractors;
pub mod guard;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::OwnerScope;
pub use guard::{authorize, AuthError};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService};

/// bcrypt only looks at the first 72 bytes of its input.
pub const PASSWORD_MAX_BYTES: usize = 72;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 50 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account: 6 to 72 characters, and no more than 72 bytes.
    #[validate(length(min = 6, max = 72), custom = "validate_password_bytes")]
    pub password: String,
}

/// Form body of `POST /auth/token`.
///
/// No format rules are applied here: a malformed username simply fails to
/// authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response body of a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub username: String,
}

/// OAuth2-style bearer token response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The JWT for session authentication.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > PASSWORD_MAX_BYTES {
        let mut error = ValidationError::new("length");
        error.message = Some("password must be at most 72 bytes".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(request("test_user-123", "password123").validate().is_ok());
        assert!(request("abc", "secret").validate().is_ok());
        assert!(request(&"a".repeat(50), &"p".repeat(72)).validate().is_ok());

        // Contains space and exclamation
        assert!(request("test user!", "password123").validate().is_err());
        assert!(request("tu", "password123").validate().is_err());
        assert!(request(&"a".repeat(51), "password123").validate().is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(request("alice", "12345").validate().is_err());
        assert!(request("alice", &"p".repeat(73)).validate().is_err());

        // 36 two-byte characters: 72 bytes, accepted; 37 are 74 bytes, rejected.
        assert!(request("alice", &"é".repeat(36)).validate().is_ok());
        assert!(request("alice", &"é".repeat(37)).validate().is_err());
    }

    #[test]
    fn test_token_response_shape() {
        let body = serde_json::to_value(TokenResponse::bearer("abc".into(), 1800)).unwrap();
        assert_eq!(body["access_token"], "abc");
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 1800);
    }
}
