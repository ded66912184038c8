//! Owner-scoped authorization.
//!
//! Every `/api/{user_id}/...` request names the owner whose tasks it targets.
//! The guard accepts the request only when the bearer token is valid *and*
//! its subject is that owner. A mismatch is reported as `NotFound` rather
//! than "forbidden", so a caller cannot tell "no such user/task" apart from
//! "exists but belongs to someone else".

use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

use super::token::TokenService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token, or the token failed verification.
    #[error("could not validate credentials")]
    Unauthenticated,
    /// The token is valid but its subject is not the owner named in the path.
    #[error("resource not found")]
    NotFound,
}

/// Checks `token` against the owner id named in the request path.
///
/// On success returns the verified owner id, which callers pass down as the
/// scoping parameter of every task operation.
pub fn authorize(
    tokens: &TokenService,
    token: Option<&str>,
    claimed_owner_id: &str,
) -> Result<Uuid, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated)?;

    let subject = tokens.verify(token).map_err(|e| {
        debug!("rejecting bearer token: {}", e);
        AuthError::Unauthenticated
    })?;

    match Uuid::parse_str(claimed_owner_id) {
        Ok(owner_id) if owner_id == subject => Ok(owner_id),
        _ => {
            warn!(
                "user {} attempted to access resources of owner {:?}",
                subject, claimed_owner_id
            );
            Err(AuthError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new("guard_test_secret", Duration::minutes(30))
    }

    #[test]
    fn test_owner_with_valid_token_is_authorized() {
        let tokens = tokens();
        let owner = Uuid::new_v4();
        let token = tokens.issue_default(owner).unwrap();

        let result = authorize(&tokens, Some(token.as_str()), &owner.to_string());
        assert_eq!(result, Ok(owner));
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let owner = Uuid::new_v4().to_string();
        assert_eq!(
            authorize(&tokens(), None, &owner),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_invalid_or_expired_token_is_unauthenticated() {
        let tokens = tokens();
        let owner = Uuid::new_v4();
        let expired = tokens.issue(owner, Duration::zero()).unwrap();

        for token in ["garbage", expired.as_str()] {
            assert_eq!(
                authorize(&tokens, Some(token), &owner.to_string()),
                Err(AuthError::Unauthenticated)
            );
        }
    }

    #[test]
    fn test_token_check_runs_before_owner_check() {
        // Even with a nonsense owner id, a bad token is reported as unauthenticated.
        assert_eq!(
            authorize(&tokens(), Some("garbage"), "not-a-uuid"),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn test_other_owner_is_not_found() {
        let tokens = tokens();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let bobs_token = tokens.issue_default(bob).unwrap();

        assert_eq!(
            authorize(&tokens, Some(bobs_token.as_str()), &alice.to_string()),
            Err(AuthError::NotFound)
        );
        assert_eq!(
            authorize(&tokens, Some(bobs_token.as_str()), "not-a-uuid"),
            Err(AuthError::NotFound)
        );
    }
}
