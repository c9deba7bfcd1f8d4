//! Finite-field Diffie-Hellman over the RFC 7919 named groups.
//!
//! Public values and shared secrets are big-endian and left-padded to the
//! group size, so FFDHE2048 always produces 256-byte outputs.

use crate::config::Config;
use crate::crypto::algorithms::KeyExchangeAlgorithm;
use crate::crypto::random::{random_secret, RandomSource};
use crate::error::{CryptoError, Result};
use crate::utils::buffer::left_pad;
use crate::utils::validation::validate_exact_length;
use num_bigint_dig::BigUint;
use zeroize::Zeroizing;

/// RFC 7919 Appendix A.1, generator 2.
const FFDHE2048_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFADF85458A2BB4A9AAFDC5620273D3CF1",
    "D8B9C583CE2D3695A9E13641146433FBCC939DCE249B3EF9",
    "7D2FE363630C75D8F681B202AEC4617AD3DF1ED5D5FD6561",
    "2433F51F5F066ED0856365553DED1AF3B557135E7F57C935",
    "984F0C70E0E68B77E2A689DAF3EFE8721DF158A136ADE735",
    "30ACCA4F483A797ABC0AB182B324FB61D108A94BB2C8E3FB",
    "B96ADAB760D7F4681D4F42A3DE394DF4AE56EDE76372BB19",
    "0B07A7C8EE0A6D709E02FCE1CDF7E2ECC03404CD28342F61",
    "9172FE9CE98583FF8E4F1232EEF28183C3FE3B1B4C6FAD73",
    "3BB5FCBC2EC22005C58EF1837D1683B2C6F34A26C1B2EFFA",
    "886B423861285C97FFFFFFFFFFFFFFFF",
);

const FFDHE_GENERATOR: u32 = 2;

/// Group parameters (p, g) and the fixed encoding width.
#[derive(Clone)]
struct FfdheGroup {
    prime: BigUint,
    prime_minus_one: BigUint,
    generator: BigUint,
    size: usize,
}

impl FfdheGroup {
    fn named(algorithm: KeyExchangeAlgorithm) -> Result<Self> {
        let hex = match algorithm {
            KeyExchangeAlgorithm::Ffdhe2048 => FFDHE2048_PRIME,
            other => return Err(CryptoError::unsupported(format!("{} group", other))),
        };
        let prime = BigUint::parse_bytes(hex.as_bytes(), 16)
            .ok_or_else(|| CryptoError::Backend("Malformed group prime".to_string()))?;
        let prime_minus_one = &prime - &BigUint::from(1u32);

        Ok(Self {
            prime,
            prime_minus_one,
            generator: BigUint::from(FFDHE_GENERATOR),
            size: algorithm.coordinate_size(),
        })
    }

    /// Parses a peer value and enforces 1 < y < p - 1.
    fn decode_element(&self, bytes: &[u8]) -> Result<BigUint> {
        validate_exact_length("FFDHE public value", bytes, self.size)?;
        let value = BigUint::from_bytes_be(bytes);
        if value <= BigUint::from(1u32) || value >= self.prime_minus_one {
            return Err(CryptoError::InvalidPublicKey(
                "FFDHE public value outside (1, p-1)".to_string(),
            ));
        }
        Ok(value)
    }

    fn encode_element(&self, value: &BigUint) -> Result<Vec<u8>> {
        left_pad(&value.to_bytes_be(), self.size)
            .ok_or_else(|| CryptoError::Backend("Group element wider than modulus".to_string()))
    }
}

/// One party's finite-field key pair.
pub(crate) struct FfdheKey {
    group: FfdheGroup,
    private: Option<Zeroizing<Vec<u8>>>,
    public: Option<Vec<u8>>,
}

impl FfdheKey {
    pub(crate) fn new(algorithm: KeyExchangeAlgorithm) -> Result<Self> {
        Ok(Self {
            group: FfdheGroup::named(algorithm)?,
            private: None,
            public: None,
        })
    }

    pub(crate) fn public_key(&self) -> Option<&[u8]> {
        self.public.as_deref()
    }

    pub(crate) fn has_private_key(&self) -> bool {
        self.private.is_some()
    }

    /// Draws a fresh private exponent x >= 2 and stores g^x mod p.
    pub(crate) fn generate(&mut self, rng: &mut dyn RandomSource) -> Result<&[u8]> {
        let config = Config::global();
        let exponent_len = config.ffdhe_private_key_bytes.clamp(1, self.group.size);

        let mut private = None;
        for _ in 0..config.max_scalar_attempts.max(1) {
            let candidate = random_secret(rng, exponent_len)?;
            if BigUint::from_bytes_be(&candidate) > BigUint::from(1u32) {
                private = Some(candidate);
                break;
            }
        }
        let private = private.ok_or_else(|| {
            CryptoError::RandomFailure("Could not draw a usable private exponent".to_string())
        })?;

        let exponent = BigUint::from_bytes_be(&private);
        let public = self.group.generator.modpow(&exponent, &self.group.prime);
        let encoded = self.group.encode_element(&public)?;

        self.private = Some(private);
        Ok(self.public.insert(encoded).as_slice())
    }

    /// Validates the peer value, then computes y^x mod p.
    pub(crate) fn compute(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let private = self.private.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        let peer = self.group.decode_element(peer_public)?;

        let exponent = BigUint::from_bytes_be(private);
        let shared = peer.modpow(&exponent, &self.group.prime);
        if shared <= BigUint::from(1u32) {
            return Err(CryptoError::InvalidPublicKey(
                "FFDHE peer value produced a degenerate secret".to_string(),
            ));
        }
        Ok(Zeroizing::new(self.group.encode_element(&shared)?))
    }

    /// Checks the stored public value, and that it matches the private exponent.
    pub(crate) fn check(&self) -> Result<()> {
        let public = self.public.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        let value = self.group.decode_element(public)?;

        if let Some(private) = &self.private {
            let exponent = BigUint::from_bytes_be(private);
            if self.group.generator.modpow(&exponent, &self.group.prime) != value {
                return Err(CryptoError::InvalidKey(
                    "FFDHE public value does not match private exponent".to_string(),
                ));
            }
        }
        Ok(())
    }
}
