//! Контексты обмена ключами
//!
//! [`CryptoContext`] описывает одну сторону протокола
//! Диффи-Хеллмана. Алгоритм фиксируется при создании и не меняется до
//! освобождения контекста (drop). Секретный материал затирается при drop.
//!
//! ## Семейства
//! - **Finite field**: FFDHE (RFC 7919), открытое значение big-endian
//! - **Weierstrass**: SECP256R1, SM2, открытое значение X‖Y
//! - **Montgomery**: X25519, открытое значение: u-координата
//!
//! ## Протокол
//! ```text
//! Alice                                   Bob
//! =====                                   ===
//! ctx_a = CryptoContext::new(alg)         ctx_b = CryptoContext::new(alg)
//! pub_a = ctx_a.generate_key()            pub_b = ctx_b.generate_key()
//!                 ── обмен pub_a / pub_b ──
//! s_a = ctx_a.compute(pub_b)              s_b = ctx_b.compute(pub_a)
//!                    s_a == s_b
//! ```

mod ffdhe;
mod secp256r1;
mod sm2_curve;
mod x25519;

use crate::crypto::algorithms::{HashAlgorithm, KeyExchangeAlgorithm};
use crate::crypto::provider::KeyExchangeContext;
use crate::crypto::random::{random_secret, OsRandom, RandomSource};
use crate::config::Config;
use crate::error::{CryptoError, Result};
use crate::utils::buffer::{ensure_capacity, write_output};
use ffdhe::FfdheKey;
use secp256r1::P256Key;
use sm2_curve::Sm2Key;
use std::fmt;
use x25519::X25519Key;

/// Rejection-samples a scalar: draws `len` random bytes until `parse` accepts them.
///
/// Bounded by `Config::max_scalar_attempts`; running out is reported as an RNG failure.
pub(crate) fn sample_scalar<T>(
    rng: &mut dyn RandomSource,
    len: usize,
    parse: impl Fn(&[u8]) -> Option<T>,
) -> Result<T> {
    for _ in 0..Config::global().max_scalar_attempts.max(1) {
        let candidate = random_secret(rng, len)?;
        if let Some(value) = parse(&candidate) {
            return Ok(value);
        }
    }
    Err(CryptoError::RandomFailure(
        "Random source did not yield a scalar in range".to_string(),
    ))
}

/// Per-algorithm key material.
enum KeyMaterial {
    FiniteField(FfdheKey),
    Secp256r1(P256Key),
    Sm2(Sm2Key),
    X25519(X25519Key),
}

/// One party's key-exchange state for a single algorithm.
pub struct CryptoContext {
    algorithm: KeyExchangeAlgorithm,
    material: KeyMaterial,
    rng: Box<dyn RandomSource>,
}

impl CryptoContext {
    /// Creates a context backed by the operating-system RNG.
    pub fn new(algorithm: KeyExchangeAlgorithm) -> Result<Self> {
        Self::new_with_rng(algorithm, Box::new(OsRandom))
    }

    /// Creates a context drawing private secrets from `rng`.
    pub fn new_with_rng(algorithm: KeyExchangeAlgorithm, rng: Box<dyn RandomSource>) -> Result<Self> {
        use tracing::debug;

        let material = match algorithm {
            KeyExchangeAlgorithm::Ffdhe2048 => KeyMaterial::FiniteField(FfdheKey::new(algorithm)?),
            KeyExchangeAlgorithm::Secp256r1 => KeyMaterial::Secp256r1(P256Key::new()),
            KeyExchangeAlgorithm::Sm2P256 => KeyMaterial::Sm2(Sm2Key::new()),
            KeyExchangeAlgorithm::X25519 => KeyMaterial::X25519(X25519Key::new()),
            other => return Err(CryptoError::unsupported(format!("{} key exchange", other))),
        };

        debug!(
            target: "crypto::kex",
            algorithm = %algorithm,
            "Created key exchange context"
        );

        Ok(Self {
            algorithm,
            material,
            rng,
        })
    }

    pub fn is_supported(algorithm: KeyExchangeAlgorithm) -> bool {
        matches!(
            algorithm,
            KeyExchangeAlgorithm::Ffdhe2048
                | KeyExchangeAlgorithm::Secp256r1
                | KeyExchangeAlgorithm::Sm2P256
                | KeyExchangeAlgorithm::X25519
        )
    }

    pub fn has_private_key(&self) -> bool {
        match &self.material {
            KeyMaterial::FiniteField(key) => key.has_private_key(),
            KeyMaterial::Secp256r1(key) => key.has_private_key(),
            KeyMaterial::Sm2(key) => key.has_private_key(),
            KeyMaterial::X25519(key) => key.has_private_key(),
        }
    }

    fn stored_public_key(&self) -> Option<Vec<u8>> {
        match &self.material {
            KeyMaterial::FiniteField(key) => key.public_key().map(<[u8]>::to_vec),
            KeyMaterial::Secp256r1(key) => key.public_key(),
            KeyMaterial::Sm2(key) => key.public_key(),
            KeyMaterial::X25519(key) => key.public_key(),
        }
    }

    fn ensure_allowed_hash(&self, hash: HashAlgorithm) -> Result<()> {
        if !self.algorithm.supports_signatures() {
            return Err(CryptoError::unsupported(format!("{} signatures", self.algorithm)));
        }
        if !self.algorithm.allowed_hashes().contains(&hash) {
            return Err(CryptoError::UnsupportedHash(format!(
                "{} cannot be used with {}",
                hash, self.algorithm
            )));
        }
        Ok(())
    }
}

impl KeyExchangeContext for CryptoContext {
    fn algorithm(&self) -> KeyExchangeAlgorithm {
        self.algorithm
    }

    fn generate_key(&mut self, public_out: &mut [u8]) -> Result<usize> {
        use tracing::debug;

        // Capacity first: an undersized buffer must not touch the stored key.
        ensure_capacity(public_out.len(), self.algorithm.public_key_size())?;

        let rng = self.rng.as_mut();
        let public = match &mut self.material {
            KeyMaterial::FiniteField(key) => key.generate(rng)?.to_vec(),
            KeyMaterial::Secp256r1(key) => key.generate(rng)?,
            KeyMaterial::Sm2(key) => key.generate(rng)?,
            KeyMaterial::X25519(key) => key.generate(rng)?,
        };

        debug!(
            target: "crypto::kex",
            algorithm = %self.algorithm,
            public_len = public.len(),
            "Generated key pair"
        );

        write_output(public_out, &public)
    }

    fn compute_shared_secret(&self, peer_public: &[u8], secret_out: &mut [u8]) -> Result<usize> {
        use tracing::{debug, warn};

        let result = match &self.material {
            KeyMaterial::FiniteField(key) => key.compute(peer_public),
            KeyMaterial::Secp256r1(key) => key.compute(peer_public),
            KeyMaterial::Sm2(key) => key.compute(peer_public),
            KeyMaterial::X25519(key) => key.compute(peer_public),
        };

        let shared = match result {
            Ok(shared) => shared,
            Err(e) => {
                warn!(
                    target: "crypto::kex",
                    algorithm = %self.algorithm,
                    error = %e,
                    "Shared secret computation rejected"
                );
                return Err(e);
            }
        };

        debug!(
            target: "crypto::kex",
            algorithm = %self.algorithm,
            "Computed shared secret"
        );

        write_output(secret_out, &shared)
    }

    fn set_public_key(&mut self, public_key: &[u8]) -> Result<()> {
        match &mut self.material {
            KeyMaterial::Secp256r1(key) => key.set_public(public_key),
            KeyMaterial::Sm2(key) => key.set_public(public_key),
            KeyMaterial::FiniteField(_) | KeyMaterial::X25519(_) => Err(CryptoError::unsupported(
                format!("{} external public keys", self.algorithm),
            )),
        }
    }

    fn get_public_key(&self, public_out: &mut [u8]) -> Result<usize> {
        let public = self.stored_public_key().ok_or(CryptoError::MissingPublicKey)?;
        write_output(public_out, &public)
    }

    fn check_key(&self) -> Result<()> {
        match &self.material {
            KeyMaterial::FiniteField(key) => key.check(),
            KeyMaterial::Secp256r1(key) => key.check(),
            KeyMaterial::Sm2(key) => key.check(),
            KeyMaterial::X25519(key) => key.check(),
        }
    }

    fn sign(&self, hash: HashAlgorithm, message: &[u8], signature_out: &mut [u8]) -> Result<usize> {
        self.ensure_allowed_hash(hash)?;
        if !self.has_private_key() {
            return Err(CryptoError::MissingPrivateKey);
        }
        if let Some(size) = self.algorithm.signature_size() {
            ensure_capacity(signature_out.len(), size)?;
        }

        let signature = match &self.material {
            KeyMaterial::Secp256r1(key) => key.sign(hash, message)?,
            KeyMaterial::Sm2(key) => key.sign(hash, message)?,
            KeyMaterial::FiniteField(_) | KeyMaterial::X25519(_) => {
                return Err(CryptoError::unsupported(format!("{} signatures", self.algorithm)))
            }
        };
        write_output(signature_out, &signature)
    }

    fn verify(&self, hash: HashAlgorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        use tracing::warn;

        self.ensure_allowed_hash(hash)?;
        let result = match &self.material {
            KeyMaterial::Secp256r1(key) => key.verify(hash, message, signature),
            KeyMaterial::Sm2(key) => key.verify(hash, message, signature),
            KeyMaterial::FiniteField(_) | KeyMaterial::X25519(_) => {
                Err(CryptoError::unsupported(format!("{} signatures", self.algorithm)))
            }
        };

        if let Err(e) = &result {
            warn!(
                target: "crypto::kex",
                algorithm = %self.algorithm,
                error = %e,
                "Signature rejected"
            );
        }
        result
    }
}

impl fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoContext")
            .field("algorithm", &self.algorithm)
            .field("has_private_key", &self.has_private_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRandom;

    impl RandomSource for FailingRandom {
        fn fill(&mut self, _dest: &mut [u8]) -> Result<()> {
            Err(CryptoError::RandomFailure("entropy exhausted".to_string()))
        }
    }

    /// Always yields 0xFF bytes, which is above every curve order.
    struct SaturatedRandom;

    impl RandomSource for SaturatedRandom {
        fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
            dest.fill(0xFF);
            Ok(())
        }
    }

    #[test]
    fn test_unsupported_algorithms_fail_at_creation() {
        for algorithm in [
            KeyExchangeAlgorithm::Ffdhe3072,
            KeyExchangeAlgorithm::Ffdhe4096,
            KeyExchangeAlgorithm::Secp384r1,
            KeyExchangeAlgorithm::Secp521r1,
        ] {
            assert!(!CryptoContext::is_supported(algorithm));
            assert!(CryptoContext::new(algorithm).unwrap_err().is_unsupported());
        }
    }

    #[test]
    fn test_rng_failure_propagates() {
        for algorithm in [KeyExchangeAlgorithm::Ffdhe2048, KeyExchangeAlgorithm::X25519] {
            let mut ctx = CryptoContext::new_with_rng(algorithm, Box::new(FailingRandom)).unwrap();
            let mut public = vec![0u8; algorithm.public_key_size()];
            assert!(matches!(
                ctx.generate_key(&mut public),
                Err(CryptoError::RandomFailure(_))
            ));
            assert!(!ctx.has_private_key());
        }
    }

    #[test]
    fn test_out_of_range_scalars_exhaust_attempts() {
        let mut ctx =
            CryptoContext::new_with_rng(KeyExchangeAlgorithm::Secp256r1, Box::new(SaturatedRandom))
                .unwrap();
        let mut public = [0u8; 64];
        assert!(matches!(
            ctx.generate_key(&mut public),
            Err(CryptoError::RandomFailure(_))
        ));
    }

    #[test]
    fn test_undersized_generate_keeps_state() {
        let mut ctx = CryptoContext::new(KeyExchangeAlgorithm::X25519).unwrap();
        let err = ctx.generate_key(&mut []).unwrap_err();
        assert_eq!(err.required_capacity(), Some(32));
        assert!(!ctx.has_private_key());
    }

    #[test]
    fn test_compute_before_generate() {
        let ctx = CryptoContext::new(KeyExchangeAlgorithm::Sm2P256).unwrap();
        let mut out = [0u8; 32];
        assert_eq!(
            ctx.compute_shared_secret(&[0u8; 64], &mut out).unwrap_err(),
            CryptoError::MissingPrivateKey
        );
    }

    #[test]
    fn test_signatures_unsupported_for_ffdhe() {
        let mut ctx = CryptoContext::new(KeyExchangeAlgorithm::Ffdhe2048).unwrap();
        let mut public = vec![0u8; 256];
        ctx.generate_key(&mut public).unwrap();
        let mut signature = [0u8; 64];
        assert!(ctx
            .sign(HashAlgorithm::Sha256, b"msg", &mut signature)
            .unwrap_err()
            .is_unsupported());
    }

    #[test]
    fn test_get_public_key_matches_generated() {
        let mut ctx = CryptoContext::new(KeyExchangeAlgorithm::Secp256r1).unwrap();
        let mut generated = [0u8; 64];
        ctx.generate_key(&mut generated).unwrap();

        let mut fetched = [0u8; 64];
        assert_eq!(ctx.get_public_key(&mut fetched).unwrap(), 64);
        assert_eq!(generated, fetched);
        assert!(ctx.check_key().is_ok());
    }

    #[test]
    fn test_releasing_absent_context_is_noop() {
        let ctx: Option<CryptoContext> = None;
        drop(ctx);
    }
}
