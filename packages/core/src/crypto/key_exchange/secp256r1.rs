//! ECDH and ECDSA over NIST P-256.
//!
//! Public keys travel as X‖Y (64 bytes, no SEC1 tag byte); the agreed secret
//! is the 32-byte X coordinate of the shared point.

use super::sample_scalar;
use crate::crypto::algorithms::HashAlgorithm;
use crate::crypto::random::RandomSource;
use crate::error::{CryptoError, Result};
use crate::utils::validation::validate_exact_length;
use p256::ecdh::diffie_hellman;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, FieldBytes, PublicKey, SecretKey};
use zeroize::Zeroizing;

const COORDINATE_SIZE: usize = 32;
pub(crate) const PUBLIC_KEY_SIZE: usize = 2 * COORDINATE_SIZE;
pub(crate) const SIGNATURE_SIZE: usize = 2 * COORDINATE_SIZE;

/// Parses X‖Y and rejects out-of-range coordinates and off-curve points.
pub(crate) fn decode_public(bytes: &[u8]) -> Result<PublicKey> {
    validate_exact_length("SECP256R1 public key", bytes, PUBLIC_KEY_SIZE)?;
    let point = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&bytes[..COORDINATE_SIZE]),
        FieldBytes::from_slice(&bytes[COORDINATE_SIZE..]),
        false,
    );
    Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
        .ok_or_else(|| CryptoError::InvalidPublicKey("Point is not on SECP256R1".to_string()))
}

pub(crate) fn encode_public(public: &PublicKey) -> Vec<u8> {
    // Uncompressed SEC1 is 0x04 || X || Y
    public.to_encoded_point(false).as_bytes()[1..].to_vec()
}

pub(crate) struct P256Key {
    secret: Option<SecretKey>,
    public: Option<PublicKey>,
}

impl P256Key {
    pub(crate) fn new() -> Self {
        Self {
            secret: None,
            public: None,
        }
    }

    pub(crate) fn has_private_key(&self) -> bool {
        self.secret.is_some()
    }

    pub(crate) fn public_key(&self) -> Option<Vec<u8>> {
        self.public.as_ref().map(encode_public)
    }

    pub(crate) fn generate(&mut self, rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let secret = sample_scalar(rng, COORDINATE_SIZE, |bytes| SecretKey::from_slice(bytes).ok())?;
        let public = secret.public_key();
        let encoded = encode_public(&public);

        self.secret = Some(secret);
        self.public = Some(public);
        Ok(encoded)
    }

    pub(crate) fn set_public(&mut self, bytes: &[u8]) -> Result<()> {
        let public = decode_public(bytes)?;
        // A foreign public key invalidates any private key we held.
        self.secret = None;
        self.public = Some(public);
        Ok(())
    }

    pub(crate) fn compute(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let secret = self.secret.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        let peer = decode_public(peer_public)?;

        let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
    }

    pub(crate) fn check(&self) -> Result<()> {
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        // Round-trip through the wire encoding re-runs the on-curve checks.
        decode_public(&encode_public(public))?;

        if let Some(secret) = &self.secret {
            if secret.public_key() != *public {
                return Err(CryptoError::InvalidKey(
                    "SECP256R1 public key does not match private key".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn sign(&self, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
        let secret = self.secret.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        let digest = hash.digest(message);

        let signing_key = SigningKey::from_bytes(&secret.to_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let signature: Signature = signing_key
            .sign_prehash(&digest)
            .map_err(|e| CryptoError::Backend(format!("ECDSA signing failed: {}", e)))?;
        Ok(signature.to_bytes().to_vec())
    }

    pub(crate) fn verify(&self, hash: HashAlgorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        validate_exact_length("SECP256R1 signature", signature, SIGNATURE_SIZE)?;

        let signature = Signature::try_from(signature)
            .map_err(|e| CryptoError::SignatureVerification(e.to_string()))?;
        let verifying_key = VerifyingKey::from_affine(*public.as_affine())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let digest = hash.digest(message);
        verifying_key
            .verify_prehash(&digest, &signature)
            .map_err(|e| CryptoError::SignatureVerification(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::OsRandom;

    #[test]
    fn test_key_exchange_commutativity() {
        let mut alice = P256Key::new();
        let mut bob = P256Key::new();
        let alice_public = alice.generate(&mut OsRandom).unwrap();
        let bob_public = bob.generate(&mut OsRandom).unwrap();

        assert_eq!(alice_public.len(), 64);
        assert_eq!(
            *alice.compute(&bob_public).unwrap(),
            *bob.compute(&alice_public).unwrap()
        );
    }

    #[test]
    fn test_rejects_off_curve_point() {
        let mut key = P256Key::new();
        key.generate(&mut OsRandom).unwrap();

        let mut off_curve = vec![0u8; 64];
        off_curve[31] = 1;
        off_curve[63] = 1;
        assert!(matches!(
            key.compute(&off_curve),
            Err(CryptoError::InvalidPublicKey(_))
        ));
        assert!(key.compute(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_rejects_coordinate_above_modulus() {
        let mut key = P256Key::new();
        key.generate(&mut OsRandom).unwrap();
        assert!(key.compute(&[0xFFu8; 64]).is_err());
    }

    #[test]
    fn test_sign_verify_prehash() {
        let mut key = P256Key::new();
        key.generate(&mut OsRandom).unwrap();

        let signature = key.sign(HashAlgorithm::Sha256, b"message").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(key.verify(HashAlgorithm::Sha256, b"message", &signature).is_ok());
        assert!(key.verify(HashAlgorithm::Sha256, b"massage", &signature).is_err());
    }

    #[test]
    fn test_public_only_context_verifies() {
        let mut signer = P256Key::new();
        let public = signer.generate(&mut OsRandom).unwrap();
        let signature = signer.sign(HashAlgorithm::Sha384, b"payload").unwrap();

        let mut verifier = P256Key::new();
        verifier.set_public(&public).unwrap();
        assert!(verifier.check().is_ok());
        assert!(verifier.verify(HashAlgorithm::Sha384, b"payload", &signature).is_ok());
        assert_eq!(
            verifier.sign(HashAlgorithm::Sha256, b"payload").unwrap_err(),
            CryptoError::MissingPrivateKey
        );
    }
}
