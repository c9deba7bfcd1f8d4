//! Backend for platforms that lack the primitives.
//!
//! Every operation deterministically returns [`CryptoError::Unsupported`].
//! No context can ever be created, so [`StubContext`] is uninhabited.

use crate::crypto::algorithms::{AeadAlgorithm, HashAlgorithm, KeyExchangeAlgorithm};
use crate::crypto::provider::{CryptoProvider, KeyExchangeContext};
use crate::crypto::random::RandomSource;
use crate::error::{CryptoError, Result};

pub struct StubProvider;

/// Context type of [`StubProvider`]; has no values.
#[derive(Debug)]
pub enum StubContext {}

impl KeyExchangeContext for StubContext {
    fn algorithm(&self) -> KeyExchangeAlgorithm {
        match *self {}
    }

    fn generate_key(&mut self, _public_out: &mut [u8]) -> Result<usize> {
        match *self {}
    }

    fn compute_shared_secret(&self, _peer_public: &[u8], _secret_out: &mut [u8]) -> Result<usize> {
        match *self {}
    }

    fn set_public_key(&mut self, _public_key: &[u8]) -> Result<()> {
        match *self {}
    }

    fn get_public_key(&self, _public_out: &mut [u8]) -> Result<usize> {
        match *self {}
    }

    fn check_key(&self) -> Result<()> {
        match *self {}
    }

    fn sign(&self, _hash: HashAlgorithm, _message: &[u8], _signature_out: &mut [u8]) -> Result<usize> {
        match *self {}
    }

    fn verify(&self, _hash: HashAlgorithm, _message: &[u8], _signature: &[u8]) -> Result<()> {
        match *self {}
    }
}

impl CryptoProvider for StubProvider {
    type Context = StubContext;

    fn backend_name() -> &'static str {
        "stub"
    }

    fn supports_key_exchange(_algorithm: KeyExchangeAlgorithm) -> bool {
        false
    }

    fn supports_aead(_algorithm: AeadAlgorithm) -> bool {
        false
    }

    fn new_context_with_rng(
        algorithm: KeyExchangeAlgorithm,
        _rng: Box<dyn RandomSource>,
    ) -> Result<Self::Context> {
        Err(CryptoError::unsupported(format!("{} key exchange (stub backend)", algorithm)))
    }

    fn aead_encrypt(
        algorithm: AeadAlgorithm,
        _key: &[u8],
        _nonce: &[u8],
        _aad: &[u8],
        _plaintext: &[u8],
        _tag_out: &mut [u8],
        _ciphertext_out: &mut [u8],
    ) -> Result<usize> {
        Err(CryptoError::unsupported(format!("{} (stub backend)", algorithm)))
    }

    fn aead_decrypt(
        algorithm: AeadAlgorithm,
        _key: &[u8],
        _nonce: &[u8],
        _aad: &[u8],
        _ciphertext: &[u8],
        _tag: &[u8],
        _plaintext_out: &mut [u8],
    ) -> Result<usize> {
        Err(CryptoError::unsupported(format!("{} (stub backend)", algorithm)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_algorithm_is_unsupported() {
        for algorithm in KeyExchangeAlgorithm::ALL {
            assert!(!StubProvider::supports_key_exchange(algorithm));
            assert!(StubProvider::new_context(algorithm).unwrap_err().is_unsupported());
        }
    }

    #[test]
    fn test_aead_is_unsupported_even_with_valid_arguments() {
        let mut tag = [0u8; 16];
        let mut out = [0u8; 4];
        let err = StubProvider::aead_encrypt(
            AeadAlgorithm::ChaCha20Poly1305,
            &[0u8; 32],
            &[0u8; 12],
            b"",
            b"test",
            &mut tag,
            &mut out,
        )
        .unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(out, [0u8; 4]);
    }
}
