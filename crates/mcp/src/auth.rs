#![forbid(unsafe_code)]

use jg_core::error::AuthError;
use jg_core::ports::Authenticator;
use sha2::{Digest as _, Sha256};

/// Static shared-secret bearer authentication.
pub(crate) struct BearerTokenAuth {
    expected_digest: [u8; 32],
}

impl BearerTokenAuth {
    pub(crate) fn new(secret: &str) -> Self {
        Self {
            expected_digest: digest(secret),
        }
    }
}

impl Authenticator for BearerTokenAuth {
    fn validate(&self, token: &str) -> Result<bool, AuthError> {
        if token.is_empty() {
            tracing::warn!("empty bearer token");
            return Err(AuthError::MissingCredential);
        }
        if constant_time_eq(&digest(token), &self.expected_digest) {
            tracing::debug!(token = %token_hint(token), "bearer token accepted");
            Ok(true)
        } else {
            tracing::warn!(token = %token_hint(token), "bearer token rejected");
            Err(AuthError::InvalidCredential)
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0_u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

// Equal-length digests, so only the XOR fold decides; no early exit.
fn constant_time_eq(left: &[u8; 32], right: &[u8; 32]) -> bool {
    let mut diff = 0_u8;
    for (a, b) in left.iter().zip(right.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

/// First four characters followed by `...`; short tokens are fully masked.
pub(crate) fn token_hint(token: &str) -> String {
    if token.chars().count() <= 8 {
        return "***".to_string();
    }
    let head = token.chars().take(4).collect::<String>();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cr3t-token-value";

    #[test]
    fn validate_accepts_only_the_exact_secret() {
        let auth = BearerTokenAuth::new(SECRET);
        assert_eq!(auth.validate(SECRET), Ok(true));
        assert_eq!(auth.validate("s3cr3t-token-valuE"), Err(AuthError::InvalidCredential));
        assert_eq!(auth.validate("s3cr3t"), Err(AuthError::InvalidCredential));
        assert_eq!(
            auth.validate(&format!("{SECRET}x")),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(auth.validate(""), Err(AuthError::MissingCredential));
    }

    #[test]
    fn authenticate_runs_extraction_then_validation() {
        let auth = BearerTokenAuth::new(SECRET);
        assert_eq!(auth.authenticate(Some(&format!("Bearer {SECRET}"))), Ok(()));
        assert_eq!(auth.authenticate(Some(&format!("bearer {SECRET}"))), Ok(()));
        assert_eq!(auth.authenticate(None), Err(AuthError::MissingCredential));
        assert_eq!(
            auth.authenticate(Some(&format!("Basic {SECRET}"))),
            Err(AuthError::UnsupportedScheme {
                scheme: "Basic".into()
            })
        );
        assert_eq!(
            auth.authenticate(Some(SECRET)),
            Err(AuthError::MalformedCredential { parts: 1 })
        );
        assert_eq!(
            auth.authenticate(Some("Bearer wrong-token-1234")),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn token_hint_never_reveals_short_tokens() {
        assert_eq!(token_hint("abcdefgh"), "***");
        assert_eq!(token_hint("abc"), "***");
        assert_eq!(token_hint("abcdefghi"), "abcd...");
        assert!(!token_hint(SECRET).contains("token-value"));
    }

    #[test]
    fn extract_credential_returns_the_raw_token() {
        let auth = BearerTokenAuth::new(SECRET);
        assert_eq!(
            auth.extract_credential(Some("Bearer abc123")),
            Ok("abc123".to_string())
        );
    }
}
