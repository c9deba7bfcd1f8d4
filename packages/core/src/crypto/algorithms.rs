//! Algorithm identifiers and their fixed wire sizes.
//!
//! Sizes here are the contract shared by every backend: two providers that
//! agree on these numbers are bit-compatible on the wire.

use serde::Serialize;
use sha2::{Digest, Sha256, Sha384, Sha512};
use sm3::Sm3;
use std::fmt;

/// Key-exchange groups and curves a backend may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyExchangeAlgorithm {
    /// RFC 7919 2048-bit finite-field group
    Ffdhe2048,
    /// RFC 7919 3072-bit finite-field group
    Ffdhe3072,
    /// RFC 7919 4096-bit finite-field group
    Ffdhe4096,
    /// NIST P-256
    Secp256r1,
    /// NIST P-384
    Secp384r1,
    /// NIST P-521
    Secp521r1,
    /// SM2 recommended curve (GB/T 32918)
    Sm2P256,
    /// Curve25519 in Montgomery form (RFC 7748)
    X25519,
}

/// Family a key-exchange algorithm belongs to; decides the wire layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    FiniteField,
    /// Short-Weierstrass curves, public value X‖Y
    Weierstrass,
    /// Montgomery curves, public value is the u-coordinate
    Montgomery,
}

impl KeyExchangeAlgorithm {
    pub const ALL: [KeyExchangeAlgorithm; 8] = [
        KeyExchangeAlgorithm::Ffdhe2048,
        KeyExchangeAlgorithm::Ffdhe3072,
        KeyExchangeAlgorithm::Ffdhe4096,
        KeyExchangeAlgorithm::Secp256r1,
        KeyExchangeAlgorithm::Secp384r1,
        KeyExchangeAlgorithm::Secp521r1,
        KeyExchangeAlgorithm::Sm2P256,
        KeyExchangeAlgorithm::X25519,
    ];

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            KeyExchangeAlgorithm::Ffdhe2048
            | KeyExchangeAlgorithm::Ffdhe3072
            | KeyExchangeAlgorithm::Ffdhe4096 => AlgorithmFamily::FiniteField,
            KeyExchangeAlgorithm::Secp256r1
            | KeyExchangeAlgorithm::Secp384r1
            | KeyExchangeAlgorithm::Secp521r1
            | KeyExchangeAlgorithm::Sm2P256 => AlgorithmFamily::Weierstrass,
            KeyExchangeAlgorithm::X25519 => AlgorithmFamily::Montgomery,
        }
    }

    /// Size of a single field element / group element coordinate in bytes.
    pub fn coordinate_size(&self) -> usize {
        match self {
            KeyExchangeAlgorithm::Ffdhe2048 => 256,
            KeyExchangeAlgorithm::Ffdhe3072 => 384,
            KeyExchangeAlgorithm::Ffdhe4096 => 512,
            KeyExchangeAlgorithm::Secp256r1 | KeyExchangeAlgorithm::Sm2P256 => 32,
            KeyExchangeAlgorithm::Secp384r1 => 48,
            KeyExchangeAlgorithm::Secp521r1 => 66,
            KeyExchangeAlgorithm::X25519 => 32,
        }
    }

    /// Length of the public value on the wire.
    pub fn public_key_size(&self) -> usize {
        match self.family() {
            AlgorithmFamily::Weierstrass => self.coordinate_size() * 2,
            AlgorithmFamily::FiniteField | AlgorithmFamily::Montgomery => self.coordinate_size(),
        }
    }

    /// Length of the agreed secret.
    pub fn shared_secret_size(&self) -> usize {
        self.coordinate_size()
    }

    /// Length of an R‖S signature, for algorithms that sign.
    pub fn signature_size(&self) -> Option<usize> {
        if self.supports_signatures() {
            Some(self.coordinate_size() * 2)
        } else {
            None
        }
    }

    pub fn supports_signatures(&self) -> bool {
        self.family() == AlgorithmFamily::Weierstrass
    }

    /// Digest algorithms accepted by `sign` / `verify` for this curve.
    pub fn allowed_hashes(&self) -> &'static [HashAlgorithm] {
        match self {
            KeyExchangeAlgorithm::Sm2P256 => &[HashAlgorithm::Sm3_256],
            KeyExchangeAlgorithm::Secp256r1
            | KeyExchangeAlgorithm::Secp384r1
            | KeyExchangeAlgorithm::Secp521r1 => &[
                HashAlgorithm::Sha256,
                HashAlgorithm::Sha384,
                HashAlgorithm::Sha512,
            ],
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyExchangeAlgorithm::Ffdhe2048 => "FFDHE2048",
            KeyExchangeAlgorithm::Ffdhe3072 => "FFDHE3072",
            KeyExchangeAlgorithm::Ffdhe4096 => "FFDHE4096",
            KeyExchangeAlgorithm::Secp256r1 => "SECP256R1",
            KeyExchangeAlgorithm::Secp384r1 => "SECP384R1",
            KeyExchangeAlgorithm::Secp521r1 => "SECP521R1",
            KeyExchangeAlgorithm::Sm2P256 => "SM2_P256",
            KeyExchangeAlgorithm::X25519 => "X25519",
        }
    }
}

impl fmt::Display for KeyExchangeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// AEAD ciphers. All of them use a 12-byte nonce and a detached 16-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AeadAlgorithm {
    ChaCha20Poly1305,
    Aes128Gcm,
    Aes256Gcm,
}

impl AeadAlgorithm {
    pub const NONCE_SIZE: usize = 12;
    pub const TAG_SIZE: usize = 16;

    pub fn key_size(&self) -> usize {
        match self {
            AeadAlgorithm::ChaCha20Poly1305 | AeadAlgorithm::Aes256Gcm => 32,
            AeadAlgorithm::Aes128Gcm => 16,
        }
    }

    pub fn nonce_size(&self) -> usize {
        Self::NONCE_SIZE
    }

    pub fn tag_size(&self) -> usize {
        Self::TAG_SIZE
    }

    pub fn name(&self) -> &'static str {
        match self {
            AeadAlgorithm::ChaCha20Poly1305 => "CHACHA20_POLY1305",
            AeadAlgorithm::Aes128Gcm => "AES_128_GCM",
            AeadAlgorithm::Aes256Gcm => "AES_256_GCM",
        }
    }
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest capability consumed by signing.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
    Sm3_256,
}

impl HashAlgorithm {
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Sm3_256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
            HashAlgorithm::Sm3_256 => Sm3::digest(message).to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Sm3_256 => "SM3_256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
