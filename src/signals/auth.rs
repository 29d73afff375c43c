use sha2::{Digest, Sha256};

use crate::error::WebhookError;

/// Shared-secret check for TradingView alerts.
///
/// TradingView cannot sign requests or set headers, so the secret travels in
/// the alert body. Both sides are hashed before comparison so the check does
/// not short-circuit on the secret's length or prefix.
#[derive(Clone)]
pub struct PassphraseGuard {
    expected: Option<[u8; 32]>,
}

impl PassphraseGuard {
    pub fn new(passphrase: Option<&str>) -> Self {
        Self {
            expected: passphrase.map(digest),
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.expected.is_some()
    }

    pub fn verify(&self, provided: Option<&str>) -> Result<(), WebhookError> {
        let Some(expected) = self.expected else {
            return Ok(());
        };
        let provided = provided.ok_or(WebhookError::InvalidPassphrase)?;

        let actual = digest(provided);
        let diff = expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(WebhookError::InvalidPassphrase)
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
