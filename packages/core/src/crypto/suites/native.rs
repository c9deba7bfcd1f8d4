use crate::crypto::aead;
use crate::crypto::algorithms::{AeadAlgorithm, KeyExchangeAlgorithm};
use crate::crypto::key_exchange::CryptoContext;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::random::RandomSource;
use crate::error::Result;

/// Concrete implementation of `CryptoProvider` backed by RustCrypto and dalek.
pub struct NativeProvider;

impl CryptoProvider for NativeProvider {
    type Context = CryptoContext;

    fn backend_name() -> &'static str {
        "native"
    }

    fn supports_key_exchange(algorithm: KeyExchangeAlgorithm) -> bool {
        CryptoContext::is_supported(algorithm)
    }

    fn supports_aead(_algorithm: AeadAlgorithm) -> bool {
        true
    }

    fn new_context_with_rng(
        algorithm: KeyExchangeAlgorithm,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self::Context> {
        CryptoContext::new_with_rng(algorithm, rng)
    }

    fn aead_encrypt(
        algorithm: AeadAlgorithm,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_out: &mut [u8],
        ciphertext_out: &mut [u8],
    ) -> Result<usize> {
        aead::encrypt(algorithm, key, nonce, aad, plaintext, tag_out, ciphertext_out)
    }

    fn aead_decrypt(
        algorithm: AeadAlgorithm,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext_out: &mut [u8],
    ) -> Result<usize> {
        aead::decrypt(algorithm, key, nonce, aad, ciphertext, tag, plaintext_out)
    }
}
