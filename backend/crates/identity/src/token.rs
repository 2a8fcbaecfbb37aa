//! Token Codec
//!
//! Creates and parses signed, self-contained access/renewal credentials.
//! A credential carries its subject (email), kind and absolute expiry in
//! its claims, so validation needs no server-side lookup. Signature and
//! expiry failures are surfaced as distinct reasons so callers can tell
//! "bad token" apart from "stale token".

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Credential kind claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential presented on every protected request
    Access,
    /// Long-lived credential exchanged for fresh pairs
    Renewal,
}

/// JWT claims carried by every credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email
    pub sub: String,
    /// Credential kind
    pub kind: TokenKind,
    /// Unique token id. Makes every issuance distinct even within the
    /// same second, so denylist entries never block a later credential.
    pub jti: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// A freshly minted credential
#[derive(Debug, Clone)]
pub struct Credential {
    /// Raw signed token string
    pub token: String,
    /// Credential kind
    pub kind: TokenKind,
    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

/// Claims extracted from a valid raw credential
#[derive(Debug, Clone)]
pub struct ParsedCredential {
    /// Subject email
    pub subject: String,
    /// Credential kind
    pub kind: TokenKind,
    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

/// Token parse/issue failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not verify against the process secret
    #[error("Credential signature is invalid")]
    InvalidSignature,

    /// Signature verifies but the embedded expiry has elapsed
    #[error("Credential has expired")]
    Expired,

    /// Not a parseable credential at all
    #[error("Credential is malformed")]
    Malformed,

    /// Signing failed while minting
    #[error("Credential could not be signed: {0}")]
    Signing(String),
}

/// Codec for signed access/renewal credentials (HS256)
///
/// Holds the process-wide signing secret, read-only after startup, so it
/// is safe to share across request workers behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    renewal_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the signing secret and credential lifetimes
    pub fn new(secret: &[u8], access_ttl: Duration, renewal_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock-skew grace window
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            renewal_ttl,
        }
    }

    /// Mint a short-lived access credential for the subject
    pub fn issue_access(&self, subject_email: &str) -> Result<Credential, TokenError> {
        self.issue(subject_email, TokenKind::Access, self.access_ttl)
    }

    /// Mint a long-lived renewal credential for the subject
    pub fn issue_renewal(&self, subject_email: &str) -> Result<Credential, TokenError> {
        self.issue(subject_email, TokenKind::Renewal, self.renewal_ttl)
    }

    fn issue(
        &self,
        subject_email: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<Credential, TokenError> {
        let now = Utc::now();
        let iat = now.timestamp();
        let exp = iat + ttl.as_secs() as i64;

        let claims = Claims {
            sub: subject_email.to_string(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        Ok(Credential {
            token,
            kind,
            expires_at,
        })
    }

    /// Parse and verify a raw credential
    ///
    /// The signature is checked before the expiry claim, so a tampered
    /// token reports `InvalidSignature` even when it is also stale.
    pub fn parse(&self, raw: &str) -> Result<ParsedCredential, TokenError> {
        let data = decode::<Claims>(raw, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;

        let expires_at = DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
            .ok_or(TokenError::Malformed)?;

        Ok(ParsedCredential {
            subject: data.claims.sub,
            kind: data.claims.kind,
            expires_at,
        })
    }

    /// Remaining lifetime of a valid raw credential, clamped at zero
    ///
    /// Used to size revocation-store TTLs exactly to the credential's
    /// natural death, so store entries never outlive what they guard.
    pub fn remaining_ttl(&self, raw: &str) -> Result<Duration, TokenError> {
        let parsed = self.parse(raw)?;
        let remaining = parsed.expires_at.timestamp() - Utc::now().timestamp();
        Ok(Duration::from_secs(remaining.max(0) as u64))
    }

    /// Configured access-credential lifetime
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Configured renewal-credential lifetime
    pub fn renewal_ttl(&self) -> Duration {
        self.renewal_ttl
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            b"test-secret-test-secret-test-sec",
            Duration::from_secs(30 * 60),
            Duration::from_secs(14 * 24 * 3600),
        )
    }

    #[test]
    fn test_issue_and_parse_access() {
        let codec = codec();
        let cred = codec.issue_access("alice@example.com").unwrap();

        let parsed = codec.parse(&cred.token).unwrap();
        assert_eq!(parsed.subject, "alice@example.com");
        assert_eq!(parsed.kind, TokenKind::Access);
        assert_eq!(parsed.expires_at, cred.expires_at);
    }

    #[test]
    fn test_every_issuance_is_distinct() {
        let codec = codec();
        let first = codec.issue_access("alice@example.com").unwrap();
        let second = codec.issue_access("alice@example.com").unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let codec = codec();
        let access = codec.issue_access("alice@example.com").unwrap();
        let renewal = codec.issue_renewal("alice@example.com").unwrap();

        assert_ne!(access.token, renewal.token);
        assert_eq!(codec.parse(&access.token).unwrap().kind, TokenKind::Access);
        assert_eq!(codec.parse(&renewal.token).unwrap().kind, TokenKind::Renewal);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let now = Utc::now();

        let claims = Claims {
            sub: "alice@example.com".to_string(),
            kind: TokenKind::Access,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: (now - chrono::Duration::seconds(1000)).timestamp(),
            exp: (now - chrono::Duration::seconds(100)).timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-test-secret-test-sec"),
        )
        .unwrap();

        assert_eq!(codec.parse(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let codec = codec();
        let other = TokenCodec::new(
            b"another-secret-another-secret-00",
            Duration::from_secs(30 * 60),
            Duration::from_secs(14 * 24 * 3600),
        );

        let cred = other.issue_access("alice@example.com").unwrap();
        assert_eq!(
            codec.parse(&cred.token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.parse("not-a-token").unwrap_err(), TokenError::Malformed);
        assert_eq!(codec.parse("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_remaining_ttl_bounded_by_configured_ttl() {
        let codec = codec();
        let cred = codec.issue_access("alice@example.com").unwrap();

        let remaining = codec.remaining_ttl(&cred.token).unwrap();
        assert!(remaining <= codec.access_ttl());
        // Freshly minted, so nearly the whole window is left
        assert!(remaining >= codec.access_ttl() - Duration::from_secs(5));
    }
}
