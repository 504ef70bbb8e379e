//! Bearer token issuance and verification
//! Tokens are stateless, self-contained JWTs: no server-side session
//! store and no revocation before expiry.

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Token issuer/verifier
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl_minutes: u64,
}

impl TokenService {
    pub fn new(
        secret: &str,
        algorithm: Algorithm,
        default_ttl_minutes: u64,
    ) -> Result<Self, AppError> {
        if secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret too short (min 32 chars)".to_string(),
            ));
        }

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unsupported JWT algorithm: {:?}",
                    other
                )))
            }
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_ttl_minutes,
        })
    }

    /// Build the service from application config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let algorithm = match config.security.jwt_algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AppError::Config(format!(
                    "Unsupported JWT algorithm: {}",
                    other
                )))
            }
        };

        Self::new(
            config.security.jwt_secret.expose_secret(),
            algorithm,
            config.security.access_token_expire_minutes,
        )
    }

    /// Issue a token with the configured default lifetime
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.issue_with_ttl(subject, Duration::minutes(self.default_ttl_minutes as i64))
    }

    /// Issue a token expiring at now + ttl
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Malformed structure, bad signature, expiry, and wrong algorithm
    /// all collapse into the single `InvalidToken` kind; no partially
    /// trusted subject escapes a failure path. Expiry is compared
    /// against the local wall clock with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::InvalidToken
            })?
            .claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

    fn test_service() -> TokenService {
        TokenService::new(TEST_SECRET, Algorithm::HS256, 30).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let service = test_service();

        let token = service.issue("alice").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
        // Default ttl is 30 minutes
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_expired_token_fails() {
        let service = test_service();

        // Already past its expiry
        let token = service
            .issue_with_ttl("alice", Duration::minutes(-5))
            .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let service = test_service();
        let token = service.issue("alice").unwrap();

        // Flip one character in the signature segment
        let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
        assert_eq!(parts.len(), 3);
        let sig = &mut parts[2];
        let flipped = if sig.ends_with('A') { "B" } else { "A" };
        sig.replace_range(sig.len() - 1.., flipped);
        let tampered = parts.join(".");

        assert!(matches!(
            service.verify(&tampered),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let service = test_service();
        let other = TokenService::new(
            "another-secret-key-for-testing-min-32-chars!",
            Algorithm::HS256,
            30,
        )
        .unwrap();

        let token = other.issue("alice").unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_algorithm_fails() {
        let hs256 = test_service();
        let hs512 = TokenService::new(TEST_SECRET, Algorithm::HS512, 30).unwrap();

        let token = hs512.issue("alice").unwrap();
        assert!(matches!(hs256.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token_fails() {
        let service = test_service();

        assert!(service.verify("not-a-token").is_err());
        assert!(service.verify("").is_err());
        assert!(service.verify("a.b.c").is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(TokenService::new("short", Algorithm::HS256, 30).is_err());
    }
}
