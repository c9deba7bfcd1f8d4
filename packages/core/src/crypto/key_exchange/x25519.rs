//! X25519 (RFC 7748). Public values are the raw 32-byte u-coordinate.

use crate::crypto::random::{random_secret, RandomSource};
use crate::error::{CryptoError, Result};
use crate::utils::validation::validate_exact_length;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

pub(crate) const KEY_SIZE: usize = 32;

pub(crate) struct X25519Key {
    secret: Option<StaticSecret>,
    public: Option<PublicKey>,
}

impl X25519Key {
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
        self.public.as_ref().map(|public| public.as_bytes().to_vec())
    }

    pub(crate) fn generate(&mut self, rng: &mut dyn RandomSource) -> Result<Vec<u8>> {
        let bytes = random_secret(rng, KEY_SIZE)?;
        let mut scalar = Zeroizing::new([0u8; KEY_SIZE]);
        scalar.copy_from_slice(&bytes);

        // Clamping happens inside the scalar multiplication.
        let secret = StaticSecret::from(*scalar);
        let public = PublicKey::from(&secret);

        self.secret = Some(secret);
        self.public = Some(public);
        Ok(public.as_bytes().to_vec())
    }

    /// Rejects low-order peer points: their shared secret is all zeros.
    pub(crate) fn compute(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let secret = self.secret.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        validate_exact_length("X25519 public key", peer_public, KEY_SIZE)?;

        let mut peer = [0u8; KEY_SIZE];
        peer.copy_from_slice(peer_public);
        let shared = secret.diffie_hellman(&PublicKey::from(peer));
        if !shared.was_contributory() {
            return Err(CryptoError::InvalidPublicKey(
                "X25519 peer value is a low-order point".to_string(),
            ));
        }
        Ok(Zeroizing::new(shared.as_bytes().to_vec()))
    }

    pub(crate) fn check(&self) -> Result<()> {
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        if let Some(secret) = &self.secret {
            if PublicKey::from(secret).as_bytes() != public.as_bytes() {
                return Err(CryptoError::InvalidKey(
                    "X25519 public key does not match private key".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::OsRandom;

    #[test]
    fn test_key_exchange_commutativity() {
        let mut alice = X25519Key::new();
        let mut bob = X25519Key::new();
        let alice_public = alice.generate(&mut OsRandom).unwrap();
        let bob_public = bob.generate(&mut OsRandom).unwrap();

        assert_eq!(
            *alice.compute(&bob_public).unwrap(),
            *bob.compute(&alice_public).unwrap()
        );
    }

    #[test]
    fn test_rejects_zero_point() {
        let mut key = X25519Key::new();
        key.generate(&mut OsRandom).unwrap();
        assert!(matches!(
            key.compute(&[0u8; 32]),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }
}
