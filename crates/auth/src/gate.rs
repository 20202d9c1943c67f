//! Access-key login gate.

use quantii_core::{DomainError, DomainResult};

/// Shared till access key, compared in plaintext.
#[derive(Clone)]
pub struct AccessGate {
    key: String,
}

impl AccessGate {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Accept or reject a submitted key. Blank submissions never match.
    pub fn verify(&self, submitted: &str) -> DomainResult<()> {
        if submitted.is_empty() || self.key.is_empty() || submitted != self.key {
            tracing::warn!("access key rejected");
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }
}

impl core::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessGate").field("key", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_exact_key() {
        let gate = AccessGate::new("admin123");
        assert_eq!(gate.verify("admin123"), Ok(()));
        assert_eq!(gate.verify("admin1234"), Err(DomainError::Unauthorized));
        assert_eq!(gate.verify("ADMIN123"), Err(DomainError::Unauthorized));
        assert_eq!(gate.verify(""), Err(DomainError::Unauthorized));
    }

    #[test]
    fn empty_configured_key_locks_everyone_out() {
        assert_eq!(AccessGate::new("").verify(""), Err(DomainError::Unauthorized));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let rendered = format!("{:?}", AccessGate::new("admin123"));
        assert!(!rendered.contains("admin123"));
    }
}
