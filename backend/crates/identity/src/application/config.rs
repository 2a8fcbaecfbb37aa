//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::time::Duration;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Secret key for HS256 credential signing
    pub token_secret: Vec<u8>,
    /// Access credential lifetime (30 minutes)
    pub access_ttl: Duration,
    /// Renewal credential lifetime (14 days)
    pub renewal_ttl: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            access_ttl: Duration::from_secs(30 * 60),
            renewal_ttl: Duration::from_secs(14 * 24 * 3600),
        }
    }
}

impl IdentityConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }
}
