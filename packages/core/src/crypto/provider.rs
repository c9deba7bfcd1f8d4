//! Defines the CryptoProvider trait for backend interchangeability.

use crate::crypto::algorithms::{AeadAlgorithm, HashAlgorithm, KeyExchangeAlgorithm};
use crate::crypto::random::{OsRandom, RandomSource};
use crate::error::Result;

/// Operations on one party's key-exchange state.
///
/// Every output buffer follows the capacity-query convention: an undersized
/// buffer is left untouched and the error carries the exact size required;
/// otherwise the number of bytes written is returned.
pub trait KeyExchangeContext: Send {
    /// The algorithm fixed at creation.
    fn algorithm(&self) -> KeyExchangeAlgorithm;

    /// Draws a new private secret and writes the matching public value.
    ///
    /// Calling this again replaces the secret; shared secrets computed from
    /// the old one no longer match the new public value.
    fn generate_key(&mut self, public_out: &mut [u8]) -> Result<usize>;

    /// Validates `peer_public` and writes the agreed secret.
    ///
    /// Requires a prior [`generate_key`](Self::generate_key).
    fn compute_shared_secret(&self, peer_public: &[u8], secret_out: &mut [u8]) -> Result<usize>;

    /// Seeds the context with an externally supplied public key (curve algorithms).
    fn set_public_key(&mut self, public_key: &[u8]) -> Result<()>;

    /// Writes the stored public key.
    fn get_public_key(&self, public_out: &mut [u8]) -> Result<usize>;

    /// Validates the stored key material.
    fn check_key(&self) -> Result<()>;

    /// Signs `message` (before hashing). Signature layout is R‖S.
    fn sign(&self, hash: HashAlgorithm, message: &[u8], signature_out: &mut [u8]) -> Result<usize>;

    /// Verifies an R‖S signature over `message` (before hashing).
    fn verify(&self, hash: HashAlgorithm, message: &[u8], signature: &[u8]) -> Result<()>;
}

/// Trait that formalizes all operations a cryptographic backend provides.
/// Backends are selected at composition time (`ConformanceHarness<P>`, `DefaultProvider`).
pub trait CryptoProvider: Send + Sync + 'static {
    /// Backend-owned key-exchange handle.
    type Context: KeyExchangeContext;

    /// Human-readable backend name, used in logs and reports.
    fn backend_name() -> &'static str;

    /// Whether [`new_context`](Self::new_context) can succeed for `algorithm`.
    fn supports_key_exchange(algorithm: KeyExchangeAlgorithm) -> bool;

    /// Whether the AEAD operations accept `algorithm`.
    fn supports_aead(algorithm: AeadAlgorithm) -> bool;

    /// Allocates a context whose secrets come from `rng`.
    fn new_context_with_rng(
        algorithm: KeyExchangeAlgorithm,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self::Context>;

    /// Allocates a context backed by the operating-system RNG.
    fn new_context(algorithm: KeyExchangeAlgorithm) -> Result<Self::Context> {
        Self::new_context_with_rng(algorithm, Box::new(OsRandom))
    }

    /// Performs AEAD encryption.
    /// `tag_out` receives exactly 16 bytes; the return value is the ciphertext length,
    /// which always equals `plaintext.len()`.
    fn aead_encrypt(
        algorithm: AeadAlgorithm,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_out: &mut [u8],
        ciphertext_out: &mut [u8],
    ) -> Result<usize>;

    /// Performs AEAD decryption.
    /// On tag mismatch nothing is written to `plaintext_out`.
    fn aead_decrypt(
        algorithm: AeadAlgorithm,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        plaintext_out: &mut [u8],
    ) -> Result<usize>;
}
