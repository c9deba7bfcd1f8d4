use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`CryptoError`].
///
/// Callers branch on this instead of matching individual variants: parameter
/// failures are fixable by the caller, validity failures mean the data is bad,
/// backend failures mean the provider cannot do the job at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Wrong fixed length, undersized output, missing key material, bad hash id.
    Parameter,
    /// Invalid point or value, authentication tag mismatch, bad signature.
    Validity,
    /// Unsupported algorithm, RNG failure, internal primitive failure.
    Backend,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Length of {what} exceeds the supported maximum: {actual}")]
    LengthOverflow { what: &'static str, actual: usize },
    #[error("Output buffer too small: required {required}, provided {provided}")]
    BufferTooSmall { required: usize, provided: usize },
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHash(String),
    #[error("Private key has not been generated")]
    MissingPrivateKey,
    #[error("Public key has not been set or generated")]
    MissingPublicKey,
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
    #[error("AEAD authentication failed")]
    AuthenticationFailed,
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Random number generation failed: {0}")]
    RandomFailure(String),
    #[error("Backend failure: {0}")]
    Backend(String),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidLength { .. }
            | CryptoError::LengthOverflow { .. }
            | CryptoError::BufferTooSmall { .. }
            | CryptoError::UnsupportedHash(_)
            | CryptoError::MissingPrivateKey
            | CryptoError::MissingPublicKey => ErrorKind::Parameter,
            CryptoError::InvalidPublicKey(_)
            | CryptoError::InvalidKey(_)
            | CryptoError::AuthenticationFailed
            | CryptoError::SignatureVerification(_) => ErrorKind::Validity,
            CryptoError::Unsupported(_)
            | CryptoError::RandomFailure(_)
            | CryptoError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Exact capacity to retry with, if this is an undersized-buffer failure.
    pub fn required_capacity(&self) -> Option<usize> {
        match self {
            CryptoError::BufferTooSmall { required, .. } => Some(*required),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CryptoError::Unsupported(_))
    }

    pub(crate) fn unsupported(what: impl std::fmt::Display) -> Self {
        CryptoError::Unsupported(what.to_string())
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::RandomFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CryptoError::BufferTooSmall { required: 16, provided: 0 }.kind(),
            ErrorKind::Parameter
        );
        assert_eq!(CryptoError::AuthenticationFailed.kind(), ErrorKind::Validity);
        assert_eq!(
            CryptoError::Unsupported("sm2".into()).kind(),
            ErrorKind::Backend
        );
    }

    #[test]
    fn test_required_capacity_only_for_buffer_errors() {
        let err = CryptoError::BufferTooSmall { required: 256, provided: 10 };
        assert_eq!(err.required_capacity(), Some(256));
        assert_eq!(CryptoError::MissingPrivateKey.required_capacity(), None);
    }
}
