//! SM2 key agreement and signatures (GB/T 32918).
//!
//! Same wire layout as the NIST curves: public X‖Y, signature R‖S, shared
//! secret is the X coordinate of d·Q. Signatures always hash with SM3 over
//! Z_A‖M, where Z_A binds the distinguishing identifier from [`Config`].

use super::sample_scalar;
use crate::config::Config;
use crate::crypto::algorithms::HashAlgorithm;
use crate::crypto::random::RandomSource;
use crate::error::{CryptoError, Result};
use crate::utils::validation::validate_exact_length;
use sm2::dsa::signature::{SignatureEncoding, Signer, Verifier};
use sm2::dsa::{Signature, SigningKey, VerifyingKey};
use sm2::elliptic_curve::group::Curve;
use sm2::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use sm2::{EncodedPoint, FieldBytes, PublicKey, SecretKey};
use zeroize::Zeroizing;

const COORDINATE_SIZE: usize = 32;
pub(crate) const PUBLIC_KEY_SIZE: usize = 2 * COORDINATE_SIZE;
pub(crate) const SIGNATURE_SIZE: usize = 2 * COORDINATE_SIZE;

pub(crate) fn decode_public(bytes: &[u8]) -> Result<PublicKey> {
    validate_exact_length("SM2 public key", bytes, PUBLIC_KEY_SIZE)?;
    let point = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&bytes[..COORDINATE_SIZE]),
        FieldBytes::from_slice(&bytes[COORDINATE_SIZE..]),
        false,
    );
    Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
        .ok_or_else(|| CryptoError::InvalidPublicKey("Point is not on the SM2 curve".to_string()))
}

pub(crate) fn encode_public(public: &PublicKey) -> Vec<u8> {
    public.to_encoded_point(false).as_bytes()[1..].to_vec()
}

pub(crate) struct Sm2Key {
    secret: Option<SecretKey>,
    public: Option<PublicKey>,
}

impl Sm2Key {
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
        self.secret = None;
        self.public = Some(public);
        Ok(())
    }

    pub(crate) fn compute(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let secret = self.secret.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        let peer = decode_public(peer_public)?;

        let shared = (peer.to_projective() * *secret.to_nonzero_scalar()).to_affine();
        let encoded = shared.to_encoded_point(false);
        let x = encoded.x().ok_or_else(|| {
            CryptoError::InvalidPublicKey("SM2 agreement produced the identity".to_string())
        })?;
        Ok(Zeroizing::new(x.to_vec()))
    }

    pub(crate) fn check(&self) -> Result<()> {
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        decode_public(&encode_public(public))?;

        if let Some(secret) = &self.secret {
            if secret.public_key() != *public {
                return Err(CryptoError::InvalidKey(
                    "SM2 public key does not match private key".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn sign(&self, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
        ensure_sm3(hash)?;
        let secret = self.secret.as_ref().ok_or(CryptoError::MissingPrivateKey)?;

        let distid = &Config::global().sm2_distinguishing_id;
        let signing_key = SigningKey::new(distid, secret)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let signature: Signature = signing_key
            .try_sign(message)
            .map_err(|e| CryptoError::Backend(format!("SM2 signing failed: {}", e)))?;
        let bytes = signature.to_bytes();
        Ok(bytes[..].to_vec())
    }

    pub(crate) fn verify(&self, hash: HashAlgorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        ensure_sm3(hash)?;
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        validate_exact_length("SM2 signature", signature, SIGNATURE_SIZE)?;

        let signature = Signature::try_from(signature)
            .map_err(|e| CryptoError::SignatureVerification(e.to_string()))?;
        let distid = &Config::global().sm2_distinguishing_id;
        let verifying_key = VerifyingKey::new(distid, public.clone())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        verifying_key
            .verify(message, &signature)
            .map_err(|e| CryptoError::SignatureVerification(e.to_string()))
    }
}

fn ensure_sm3(hash: HashAlgorithm) -> Result<()> {
    if hash != HashAlgorithm::Sm3_256 {
        return Err(CryptoError::UnsupportedHash(format!("SM2 requires SM3_256, got {}", hash)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::OsRandom;

    #[test]
    fn test_key_exchange_commutativity() {
        let mut alice = Sm2Key::new();
        let mut bob = Sm2Key::new();
        let alice_public = alice.generate(&mut OsRandom).unwrap();
        let bob_public = bob.generate(&mut OsRandom).unwrap();

        let a = alice.compute(&bob_public).unwrap();
        let b = bob.compute(&alice_public).unwrap();
        assert_eq!(a.len(), 32);
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_sign_verify() {
        let mut key = Sm2Key::new();
        key.generate(&mut OsRandom).unwrap();

        let signature = key.sign(HashAlgorithm::Sm3_256, b"message").unwrap();
        assert_eq!(signature.len(), SIGNATURE_SIZE);
        assert!(key.verify(HashAlgorithm::Sm3_256, b"message", &signature).is_ok());

        let mut tampered = signature.clone();
        tampered[SIGNATURE_SIZE - 1] ^= 0x01;
        assert!(key.verify(HashAlgorithm::Sm3_256, b"message", &tampered).is_err());
    }

    #[test]
    fn test_rejects_non_sm3_hash_before_signing() {
        let key = Sm2Key::new();
        // No key material: the hash check must fire first.
        assert!(matches!(
            key.sign(HashAlgorithm::Sha256, b"message"),
            Err(CryptoError::UnsupportedHash(_))
        ));
        assert!(matches!(
            key.verify(HashAlgorithm::Sha512, b"message", &[0u8; 64]),
            Err(CryptoError::UnsupportedHash(_))
        ));
    }

    #[test]
    fn test_set_public_rejects_off_curve() {
        let mut key = Sm2Key::new();
        let mut off_curve = [0u8; 64];
        off_curve[31] = 1;
        off_curve[63] = 1;
        assert!(key.set_public(&off_curve).is_err());
        assert_eq!(key.check().unwrap_err(), CryptoError::MissingPublicKey);
    }
}
