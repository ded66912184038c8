use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's stable identifier.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature mismatch, malformed payload, or `exp <= now`.
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies signed, expiring bearer tokens.
///
/// The service owns the process-wide signing secret; the same instance (or one
/// built from the same secret) must be used for issuing and verifying.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared exactly in `verify`, without clock-skew allowance.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            exp: now + ttl.num_seconds(),
            iat: now,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        debug!("issued token for {} expiring at {}", subject, claims.exp);
        Ok(token)
    }

    /// Signs a token with the configured default lifetime.
    pub fn issue_default(&self, subject: Uuid) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl)
    }

    /// Verifies signature and expiry and returns the subject.
    ///
    /// A token whose `exp` equals the current second is already expired.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Invalid("ExpiredSignature".into()));
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::minutes(30))
    }

    fn assert_invalid(result: Result<Uuid, TokenError>, expected: &str) {
        match result {
            Err(TokenError::Invalid(msg)) => {
                assert!(msg.contains(expected), "unexpected message: {}", msg)
            }
            Ok(sub) => panic!("token should have been rejected, got subject {}", sub),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test_log::test]
    fn test_token_issue_and_verify() {
        let tokens = service("test_secret_for_gen_verify");
        let user_id = Uuid::new_v4();
        let token = tokens.issue_default(user_id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_zero_ttl_is_rejected_immediately() {
        let tokens = service("test_secret_for_zero_ttl");
        let token = tokens.issue(Uuid::new_v4(), Duration::zero()).unwrap();
        assert_invalid(tokens.verify(&token), "ExpiredSignature");
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service("test_secret_for_expiration");
        let token = tokens.issue(Uuid::new_v4(), Duration::hours(-2)).unwrap();
        assert_invalid(tokens.verify(&token), "ExpiredSignature");
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = service("the_real_secret");
        let verifier = service("a_completely_different_secret");
        let token = issuer.issue_default(Uuid::new_v4()).unwrap();
        assert_invalid(verifier.verify(&token), "InvalidSignature");
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = service("tamper_secret");
        let victim = Uuid::new_v4();
        let attacker_token = tokens.issue_default(Uuid::new_v4()).unwrap();
        let victim_token = tokens.issue_default(victim).unwrap();

        // Graft the victim's payload onto the attacker's signature.
        let a: Vec<&str> = attacker_token.split('.').collect();
        let v: Vec<&str> = victim_token.split('.').collect();
        let forged = format!("{}.{}.{}", a[0], v[1], a[2]);

        assert_invalid(tokens.verify(&forged), "InvalidSignature");
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let tokens = service("malformed_secret");
        for garbage in ["", "not-a-token", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30."] {
            assert!(
                matches!(tokens.verify(garbage), Err(TokenError::Invalid(_))),
                "{:?} should be rejected",
                garbage
            );
        }
    }

    #[test]
    fn test_token_without_uuid_subject_is_rejected() {
        // Well-signed, but the subject is not a user id.
        let secret = "foreign_claims_secret";
        let foreign = serde_json::json!({
            "sub": "1234567890",
            "exp": Utc::now().timestamp() + 600,
        });
        let token = encode(
            &Header::default(),
            &foreign,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            service(secret).verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }
}
