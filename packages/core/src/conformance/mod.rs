//! Conformance harness
//!
//! Прогоняет любой `CryptoProvider` через протоколы обмена ключами, AEAD и
//! подписи и сообщает первый упавший шаг для каждого алгоритма.
//!
//! ```text
//!   Context1 ──► Generate key1 ──┐         ┌──► Compute key1 ──┐
//!                                ├─ swap ──┤                   ├──► Compare keys
//!   Context2 ──► Generate key2 ──┘         └──► Compute key2 ──┘
//! ```
//!
//! Первый упавший шаг прерывает только свой алгоритм. Если backend отказался
//! уже на первом шаге с `Unsupported`, алгоритм помечается как `Unsupported`,
//! а не как ошибка.

mod report;

pub use report::{AlgorithmReport, Category, ConformanceReport, Outcome};

use crate::config::Config;
use crate::crypto::algorithms::{AeadAlgorithm, AlgorithmFamily, HashAlgorithm, KeyExchangeAlgorithm};
use crate::crypto::provider::{CryptoProvider, KeyExchangeContext};
use crate::error::{CryptoError, ErrorKind, Result};
use std::marker::PhantomData;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Filler for output buffers that must survive a failed call unchanged.
const SENTINEL: u8 = 0xA5;

const AAD: &[u8] = b"conformance";

/// One algorithm to drive through the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    KeyExchange(KeyExchangeAlgorithm),
    Aead(AeadAlgorithm),
    Signature(KeyExchangeAlgorithm),
}

struct StepFailure {
    step: &'static str,
    error: String,
    kind: Option<ErrorKind>,
    unsupported: bool,
}

impl StepFailure {
    fn backend(step: &'static str, error: CryptoError) -> Self {
        Self {
            step,
            kind: Some(error.kind()),
            unsupported: error.is_unsupported(),
            error: error.to_string(),
        }
    }

    fn mismatch(step: &'static str, error: impl Into<String>) -> Self {
        Self {
            step,
            error: error.into(),
            kind: None,
            unsupported: false,
        }
    }
}

type StepResult<T = ()> = std::result::Result<T, StepFailure>;

/// Completed steps of one algorithm, in order.
#[derive(Default)]
struct Steps {
    done: Vec<&'static str>,
}

impl Steps {
    fn pass(&mut self, step: &'static str) {
        use tracing::debug;

        debug!(target: "crypto::conformance", step, "Step passed");
        self.done.push(step);
    }

    fn run<T>(&mut self, step: &'static str, result: Result<T>) -> StepResult<T> {
        let value = result.map_err(|e| StepFailure::backend(step, e))?;
        self.pass(step);
        Ok(value)
    }

    /// Succeeds when the call wrote exactly `expected` bytes.
    fn written(&mut self, step: &'static str, result: Result<usize>, expected: usize) -> StepResult {
        let written = result.map_err(|e| StepFailure::backend(step, e))?;
        if written != expected {
            return Err(StepFailure::mismatch(
                step,
                format!("wrote {} bytes, expected {}", written, expected),
            ));
        }
        self.pass(step);
        Ok(())
    }

    fn expect(&mut self, step: &'static str, ok: bool, error: impl FnOnce() -> String) -> StepResult {
        if !ok {
            return Err(StepFailure::mismatch(step, error()));
        }
        self.pass(step);
        Ok(())
    }

    /// Succeeds when the call failed with an error accepted by `accept`.
    fn expect_error<T>(
        &mut self,
        step: &'static str,
        result: Result<T>,
        accept: impl FnOnce(&CryptoError) -> bool,
    ) -> StepResult {
        match result {
            Ok(_) => Err(StepFailure::mismatch(step, "operation unexpectedly succeeded")),
            Err(e) if accept(&e) => {
                self.pass(step);
                Ok(())
            }
            Err(e) => Err(StepFailure::backend(step, e)),
        }
    }

    /// Succeeds when the call reported exactly `required` bytes of capacity.
    fn capacity(&mut self, step: &'static str, result: Result<usize>, required: usize) -> StepResult {
        self.expect_error(step, result, |e| e.required_capacity() == Some(required))
    }
}

fn is_validity(e: &CryptoError) -> bool {
    e.kind() == ErrorKind::Validity
}

/// Drives a backend `P` through every protocol and collects a report.
pub struct ConformanceHarness<P: CryptoProvider> {
    plaintext: Vec<u8>,
    key_exchange_algorithms: Vec<KeyExchangeAlgorithm>,
    aead_algorithms: Vec<AeadAlgorithm>,
    signature_algorithms: Vec<KeyExchangeAlgorithm>,
    _provider: PhantomData<P>,
}

impl<P: CryptoProvider> Default for ConformanceHarness<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CryptoProvider> ConformanceHarness<P> {
    /// Harness configured from [`Config::global`].
    pub fn new() -> Self {
        Self::with_config(Config::global())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            plaintext: config.harness_plaintext.clone(),
            key_exchange_algorithms: config.harness_key_exchange_algorithms.clone(),
            aead_algorithms: config.harness_aead_algorithms.clone(),
            signature_algorithms: config.harness_signature_algorithms.clone(),
            _provider: PhantomData,
        }
    }

    /// Runs the configured algorithm lists.
    pub fn run_default(&self) -> ConformanceReport {
        let checks: Vec<Check> = self
            .key_exchange_algorithms
            .iter()
            .copied()
            .map(Check::KeyExchange)
            .chain(self.aead_algorithms.iter().copied().map(Check::Aead))
            .chain(self.signature_algorithms.iter().copied().map(Check::Signature))
            .collect();
        self.run(&checks)
    }

    pub fn run(&self, checks: &[Check]) -> ConformanceReport {
        use tracing::info;

        let results: Vec<AlgorithmReport> = checks
            .iter()
            .map(|check| match *check {
                Check::KeyExchange(algorithm) => self.validate_key_exchange(algorithm),
                Check::Aead(algorithm) => self.validate_aead(algorithm),
                Check::Signature(algorithm) => self.validate_signatures(algorithm),
            })
            .collect();

        let report = ConformanceReport {
            backend: P::backend_name(),
            results,
        };

        info!(
            target: "crypto::conformance",
            backend = report.backend,
            checks = report.results.len(),
            failed = report.failures().count(),
            "Conformance run finished"
        );

        report
    }

    /// Two-party agreement, capacity negotiation and peer validation.
    pub fn validate_key_exchange(&self, algorithm: KeyExchangeAlgorithm) -> AlgorithmReport {
        let mut steps = Steps::default();
        let result = self.key_exchange_steps(algorithm, &mut steps);
        finish(Category::KeyExchange, algorithm.name(), steps, result)
    }

    /// Round trips, tamper detection and capacity negotiation.
    pub fn validate_aead(&self, algorithm: AeadAlgorithm) -> AlgorithmReport {
        let mut steps = Steps::default();
        let result = self.aead_steps(algorithm, &mut steps);
        finish(Category::Aead, algorithm.name(), steps, result)
    }

    /// Sign/verify round trip, tamper rejection and hash-parameter checks.
    pub fn validate_signatures(&self, algorithm: KeyExchangeAlgorithm) -> AlgorithmReport {
        let mut steps = Steps::default();
        let result = self.signature_steps(algorithm, &mut steps);
        finish(Category::Signature, algorithm.name(), steps, result)
    }

    fn key_exchange_steps(&self, algorithm: KeyExchangeAlgorithm, steps: &mut Steps) -> StepResult {
        let public_size = algorithm.public_key_size();
        let secret_size = algorithm.shared_secret_size();

        let mut ctx1 = steps.run("Context1", P::new_context(algorithm))?;
        let mut ctx2 = steps.run("Context2", P::new_context(algorithm))?;

        let mut public1 = vec![0u8; public_size];
        steps.written("Generate key1", ctx1.generate_key(&mut public1), public_size)?;
        let mut public2 = vec![0u8; public_size];
        steps.written("Generate key2", ctx2.generate_key(&mut public2), public_size)?;

        let mut secret1 = Zeroizing::new(vec![0u8; secret_size]);
        steps.written(
            "Compute key1",
            ctx1.compute_shared_secret(&public2, &mut secret1),
            secret_size,
        )?;
        let mut secret2 = Zeroizing::new(vec![0u8; secret_size]);
        steps.written(
            "Compute key2",
            ctx2.compute_shared_secret(&public1, &mut secret2),
            secret_size,
        )?;
        steps.expect("Compare keys", bool::from(secret1.ct_eq(&secret2)), || {
            "shared secrets differ".to_string()
        })?;

        steps.run("Check key1", ctx1.check_key())?;

        steps.capacity(
            "Shared secret capacity",
            ctx1.compute_shared_secret(&public2, &mut []),
            secret_size,
        )?;
        let mut sentinel = vec![SENTINEL; secret_size - 1];
        steps.capacity(
            "Shared secret short buffer",
            ctx1.compute_shared_secret(&public2, &mut sentinel),
            secret_size,
        )?;
        steps.expect(
            "Short buffer untouched",
            sentinel.iter().all(|b| *b == SENTINEL),
            || "undersized buffer was written".to_string(),
        )?;

        steps.capacity("Public key capacity", ctx1.get_public_key(&mut []), public_size)?;
        let mut stored = vec![0u8; public_size];
        steps.written("Public key exact capacity", ctx1.get_public_key(&mut stored), public_size)?;
        steps.expect("Public key matches", stored == public1, || {
            "stored public key differs from generated one".to_string()
        })?;

        let mut rejected = Zeroizing::new(vec![SENTINEL; secret_size]);
        steps.expect_error(
            "Reject zero peer",
            ctx1.compute_shared_secret(&vec![0u8; public_size], &mut rejected),
            is_validity,
        )?;

        if algorithm.family() == AlgorithmFamily::Weierstrass {
            // (1, 1) satisfies neither y^2 = x^3 - 3x + b for P-256 nor for SM2.
            let coordinate = algorithm.coordinate_size();
            let mut off_curve = vec![0u8; public_size];
            off_curve[coordinate - 1] = 1;
            off_curve[public_size - 1] = 1;
            steps.expect_error(
                "Reject off-curve point",
                ctx1.compute_shared_secret(&off_curve, &mut rejected),
                is_validity,
            )?;
        }

        steps.written("Regenerate key1", ctx1.generate_key(&mut public1), public_size)?;
        steps.written(
            "Recompute key1",
            ctx1.compute_shared_secret(&public2, &mut secret1),
            secret_size,
        )?;
        steps.written(
            "Recompute key2",
            ctx2.compute_shared_secret(&public1, &mut secret2),
            secret_size,
        )?;
        steps.expect("Compare regenerated keys", bool::from(secret1.ct_eq(&secret2)), || {
            "shared secrets differ after regeneration".to_string()
        })
    }

    fn aead_steps(&self, algorithm: AeadAlgorithm, steps: &mut Steps) -> StepResult {
        let key = vec![0u8; algorithm.key_size()];
        let nonce = vec![0u8; algorithm.nonce_size()];
        let tag_size = algorithm.tag_size();
        let plaintext = self.plaintext.as_slice();
        let len = plaintext.len();

        let mut tag = vec![0u8; tag_size];
        let mut ciphertext = vec![0u8; len];
        steps.written(
            "Encrypt",
            P::aead_encrypt(algorithm, &key, &nonce, &[], plaintext, &mut tag, &mut ciphertext),
            len,
        )?;

        let mut decrypted = vec![0u8; len];
        steps.written(
            "Decrypt",
            P::aead_decrypt(algorithm, &key, &nonce, &[], &ciphertext, &tag, &mut decrypted),
            len,
        )?;
        steps.expect("Round trip", decrypted == plaintext, || {
            "decrypted text differs from plaintext".to_string()
        })?;

        let mut tampered_tag = tag.clone();
        if let Some(last) = tampered_tag.last_mut() {
            *last = last.wrapping_add(1);
        }
        let mut output = vec![SENTINEL; len];
        steps.expect_error(
            "Tag tamper",
            P::aead_decrypt(algorithm, &key, &nonce, &[], &ciphertext, &tampered_tag, &mut output),
            |e| *e == CryptoError::AuthenticationFailed,
        )?;
        steps.expect("Tamper output untouched", output.iter().all(|b| *b == SENTINEL), || {
            "plaintext released after tag mismatch".to_string()
        })?;

        if !ciphertext.is_empty() {
            let mut flipped = ciphertext.clone();
            flipped[0] ^= 0x01;
            steps.expect_error(
                "Ciphertext bit flip",
                P::aead_decrypt(algorithm, &key, &nonce, &[], &flipped, &tag, &mut output),
                |e| *e == CryptoError::AuthenticationFailed,
            )?;
        }

        let mut aad_tag = vec![0u8; tag_size];
        let mut aad_ciphertext = vec![0u8; len];
        steps.written(
            "Encrypt with AAD",
            P::aead_encrypt(algorithm, &key, &nonce, AAD, plaintext, &mut aad_tag, &mut aad_ciphertext),
            len,
        )?;
        steps.written(
            "Decrypt with AAD",
            P::aead_decrypt(algorithm, &key, &nonce, AAD, &aad_ciphertext, &aad_tag, &mut decrypted),
            len,
        )?;
        steps.expect("AAD round trip", decrypted == plaintext, || {
            "decrypted text differs from plaintext".to_string()
        })?;
        steps.expect_error(
            "AAD mismatch",
            P::aead_decrypt(algorithm, &key, &nonce, &[], &aad_ciphertext, &aad_tag, &mut output),
            |e| *e == CryptoError::AuthenticationFailed,
        )?;

        if len > 0 {
            steps.capacity(
                "Ciphertext capacity",
                P::aead_encrypt(algorithm, &key, &nonce, &[], plaintext, &mut tag, &mut []),
                len,
            )?;
            steps.capacity(
                "Plaintext capacity",
                P::aead_decrypt(algorithm, &key, &nonce, &[], &ciphertext, &tag, &mut []),
                len,
            )?;
        }
        steps.capacity(
            "Tag capacity",
            P::aead_encrypt(algorithm, &key, &nonce, &[], plaintext, &mut [], &mut ciphertext),
            tag_size,
        )?;

        let short_key = &key[..key.len() - 1];
        steps.expect_error(
            "Reject short key",
            P::aead_encrypt(algorithm, short_key, &nonce, &[], plaintext, &mut tag, &mut ciphertext),
            |e| matches!(e, CryptoError::InvalidLength { .. }),
        )
    }

    fn signature_steps(&self, algorithm: KeyExchangeAlgorithm, steps: &mut Steps) -> StepResult {
        let (Some(&hash), Some(signature_size)) =
            (algorithm.allowed_hashes().first(), algorithm.signature_size())
        else {
            return Err(StepFailure::backend(
                "Context",
                CryptoError::unsupported(format!("{} signatures", algorithm)),
            ));
        };
        let public_size = algorithm.public_key_size();
        let message = self.plaintext.as_slice();

        let mut signer = steps.run("Context", P::new_context(algorithm))?;
        let mut public = vec![0u8; public_size];
        steps.written("Generate key", signer.generate_key(&mut public), public_size)?;

        let mut signature = vec![0u8; signature_size];
        steps.written("Sign", signer.sign(hash, message, &mut signature), signature_size)?;
        steps.run("Verify", signer.verify(hash, message, &signature))?;

        let mut tampered_message = message.to_vec();
        tampered_message.push(0x01);
        steps.expect_error(
            "Tampered message",
            signer.verify(hash, &tampered_message, &signature),
            is_validity,
        )?;

        let mut tampered_signature = signature.clone();
        tampered_signature[signature_size - 1] ^= 0x01;
        steps.expect_error(
            "Tampered signature",
            signer.verify(hash, message, &tampered_signature),
            is_validity,
        )?;

        let wrong_hash = [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
            HashAlgorithm::Sm3_256,
        ]
        .into_iter()
        .find(|h| !algorithm.allowed_hashes().contains(h));
        if let Some(wrong_hash) = wrong_hash {
            steps.expect_error(
                "Wrong hash",
                signer.sign(wrong_hash, message, &mut signature),
                |e| matches!(e, CryptoError::UnsupportedHash(_)),
            )?;
        }

        steps.capacity(
            "Signature capacity",
            signer.sign(hash, message, &mut []),
            signature_size,
        )?;

        let mut verifier = steps.run("Verifier context", P::new_context(algorithm))?;
        steps.run("Set public key", verifier.set_public_key(&public))?;
        steps.run("Public-only verify", verifier.verify(hash, message, &signature))?;
        steps.expect_error(
            "Public-only sign",
            verifier.sign(hash, message, &mut signature),
            |e| *e == CryptoError::MissingPrivateKey,
        )
    }
}

fn finish(
    category: Category,
    algorithm: &'static str,
    steps: Steps,
    result: StepResult,
) -> AlgorithmReport {
    use tracing::{info, warn};

    let outcome = match result {
        Ok(()) => Outcome::Passed { steps: steps.done },
        Err(failure) if failure.unsupported && steps.done.is_empty() => Outcome::Unsupported,
        Err(failure) => Outcome::Failed {
            step: failure.step,
            error: failure.error,
            kind: failure.kind,
        },
    };

    match &outcome {
        Outcome::Failed { step, error, .. } => warn!(
            target: "crypto::conformance",
            ?category,
            algorithm,
            step,
            error = error.as_str(),
            "Conformance failed"
        ),
        _ => info!(
            target: "crypto::conformance",
            ?category,
            algorithm,
            outcome = ?outcome,
            "Conformance checked"
        ),
    }

    AlgorithmReport {
        category,
        algorithm,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::native::NativeProvider;
    use crate::crypto::suites::stub::StubProvider;

    #[test]
    fn test_native_x25519_passes() {
        let harness = ConformanceHarness::<NativeProvider>::with_config(&Config::default());
        let report = harness.validate_key_exchange(KeyExchangeAlgorithm::X25519);
        match report.outcome {
            Outcome::Passed { steps } => {
                assert_eq!(steps.first(), Some(&"Context1"));
                assert!(steps.contains(&"Compare keys"));
                assert!(steps.contains(&"Reject zero peer"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_native_algorithm_is_not_a_failure() {
        let harness = ConformanceHarness::<NativeProvider>::with_config(&Config::default());
        let report = harness.validate_key_exchange(KeyExchangeAlgorithm::Secp384r1);
        assert!(report.is_unsupported());
    }

    #[test]
    fn test_non_signing_algorithm_is_unsupported_for_signatures() {
        let harness = ConformanceHarness::<NativeProvider>::with_config(&Config::default());
        let report = harness.validate_signatures(KeyExchangeAlgorithm::X25519);
        assert!(report.is_unsupported());
    }

    #[test]
    fn test_stub_aead_is_unsupported() {
        let harness = ConformanceHarness::<StubProvider>::with_config(&Config::default());
        let report = harness.validate_aead(AeadAlgorithm::ChaCha20Poly1305);
        assert!(report.is_unsupported());
    }

    #[test]
    fn test_empty_plaintext_still_checks_tags() {
        let config = Config {
            harness_plaintext: Vec::new(),
            ..Config::default()
        };
        let harness = ConformanceHarness::<NativeProvider>::with_config(&config);
        let report = harness.validate_aead(AeadAlgorithm::Aes128Gcm);
        assert!(report.is_passed(), "{:?}", report.outcome);
    }

    #[test]
    fn test_steps_stop_at_first_failure() {
        let mut steps = Steps::default();
        let result: StepResult = (|| {
            steps.run("first", Ok(()))?;
            steps.expect("second", false, || "mismatch".to_string())?;
            steps.run("third", Ok(()))
        })();

        let report = finish(Category::Aead, "TEST", steps, result);
        assert_eq!(
            report.outcome,
            Outcome::Failed {
                step: "second",
                error: "mismatch".to_string(),
                kind: None,
            }
        );
    }
}
