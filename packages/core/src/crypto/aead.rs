//! AEAD with a detached tag.
//!
//! Implements:
//! - ChaCha20-Poly1305 (RFC 8439)
//! - AES-128-GCM / AES-256-GCM (NIST SP 800-38D)
//!
//! Ciphertext has exactly the plaintext's length; the 16-byte tag is written
//! to its own buffer. Nonce uniqueness per key is the caller's obligation:
//! these functions are stateless and keep no nonce history.

use crate::crypto::algorithms::AeadAlgorithm;
use crate::error::{CryptoError, Result};
use crate::utils::buffer::ensure_capacity;
use crate::utils::validation::{validate_exact_length, validate_input_length};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::{Zeroize, Zeroizing};

const TAG_SIZE: usize = AeadAlgorithm::TAG_SIZE;

fn validate_parameters(
    algorithm: AeadAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    data: &[u8],
) -> Result<()> {
    validate_input_length("data", data.len())?;
    validate_input_length("aad", aad.len())?;
    validate_exact_length("AEAD key", key, algorithm.key_size())?;
    validate_exact_length("AEAD nonce", nonce, algorithm.nonce_size())?;
    Ok(())
}

fn init<C: KeyInit>(key: &[u8]) -> Result<C> {
    C::new_from_slice(key).map_err(|_| CryptoError::Backend("Cipher rejected key".to_string()))
}

fn seal<C: AeadInPlace>(cipher: &C, nonce: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<Tag<C>> {
    cipher
        .encrypt_in_place_detached(Nonce::<C>::from_slice(nonce), aad, buffer)
        .map_err(|_| CryptoError::Backend("AEAD encryption failed".to_string()))
}

/// The underlying ciphers compare tags in constant time before decrypting.
fn open<C: AeadInPlace>(
    cipher: &C,
    nonce: &[u8],
    aad: &[u8],
    buffer: &mut [u8],
    tag: &[u8],
) -> Result<()> {
    cipher
        .decrypt_in_place_detached(Nonce::<C>::from_slice(nonce), aad, buffer, Tag::<C>::from_slice(tag))
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Encrypts `plaintext` into `ciphertext_out` and writes the tag into `tag_out`.
///
/// Checks run in order: input lengths, ciphertext capacity, tag capacity.
pub fn encrypt(
    algorithm: AeadAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_out: &mut [u8],
    ciphertext_out: &mut [u8],
) -> Result<usize> {
    use tracing::debug;

    validate_parameters(algorithm, key, nonce, aad, plaintext)?;
    ensure_capacity(ciphertext_out.len(), plaintext.len())?;
    ensure_capacity(tag_out.len(), TAG_SIZE)?;

    let out = &mut ciphertext_out[..plaintext.len()];
    out.copy_from_slice(plaintext);

    let sealed = match algorithm {
        AeadAlgorithm::ChaCha20Poly1305 => {
            seal(&init::<ChaCha20Poly1305>(key)?, nonce, aad, out).map(|tag| tag.to_vec())
        }
        AeadAlgorithm::Aes128Gcm => seal(&init::<Aes128Gcm>(key)?, nonce, aad, out).map(|tag| tag.to_vec()),
        AeadAlgorithm::Aes256Gcm => seal(&init::<Aes256Gcm>(key)?, nonce, aad, out).map(|tag| tag.to_vec()),
    };

    let tag = match sealed {
        Ok(tag) => tag,
        Err(e) => {
            // Never leave the plaintext copy behind.
            out.zeroize();
            return Err(e);
        }
    };
    tag_out[..TAG_SIZE].copy_from_slice(&tag);

    debug!(
        target: "crypto::aead",
        algorithm = %algorithm,
        len = plaintext.len(),
        aad_len = aad.len(),
        "Encrypted"
    );

    Ok(plaintext.len())
}

/// Verifies `tag` over `aad` and `ciphertext`, then writes the plaintext.
///
/// Decryption happens in a scratch buffer; `plaintext_out` is written only
/// after authentication succeeds.
pub fn decrypt(
    algorithm: AeadAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    plaintext_out: &mut [u8],
) -> Result<usize> {
    use tracing::{debug, warn};

    validate_parameters(algorithm, key, nonce, aad, ciphertext)?;
    validate_exact_length("AEAD tag", tag, TAG_SIZE)?;
    ensure_capacity(plaintext_out.len(), ciphertext.len())?;

    let mut scratch = Zeroizing::new(ciphertext.to_vec());
    let opened = match algorithm {
        AeadAlgorithm::ChaCha20Poly1305 => {
            open(&init::<ChaCha20Poly1305>(key)?, nonce, aad, &mut scratch, tag)
        }
        AeadAlgorithm::Aes128Gcm => open(&init::<Aes128Gcm>(key)?, nonce, aad, &mut scratch, tag),
        AeadAlgorithm::Aes256Gcm => open(&init::<Aes256Gcm>(key)?, nonce, aad, &mut scratch, tag),
    };

    if let Err(e) = opened {
        warn!(
            target: "crypto::aead",
            algorithm = %algorithm,
            "Authentication tag mismatch"
        );
        return Err(e);
    }

    plaintext_out[..scratch.len()].copy_from_slice(&scratch);

    debug!(
        target: "crypto::aead",
        algorithm = %algorithm,
        len = ciphertext.len(),
        "Decrypted"
    );

    Ok(ciphertext.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc8439_vector() {
        // RFC 8439 §2.8.2
        let key: Vec<u8> = (0x80u8..=0x9f).collect();
        let nonce = [0x07, 0x00, 0x00, 0x00, 0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47];
        let aad = [0x50, 0x51, 0x52, 0x53, 0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7];
        let plaintext = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";

        let mut ciphertext = vec![0u8; plaintext.len()];
        let mut tag = [0u8; 16];
        encrypt(
            AeadAlgorithm::ChaCha20Poly1305,
            &key,
            &nonce,
            &aad,
            plaintext,
            &mut tag,
            &mut ciphertext,
        )
        .unwrap();

        assert_eq!(&ciphertext[..8], &[0xd3, 0x1a, 0x8d, 0x34, 0x64, 0x8e, 0x60, 0xdb]);
        assert_eq!(
            tag,
            [
                0x1a, 0xe1, 0x0b, 0x59, 0x4f, 0x09, 0xe2, 0x6a, 0x7e, 0x90, 0x2e, 0xcb, 0xd0, 0x60,
                0x06, 0x91
            ]
        );
    }

    #[test]
    fn test_tamper_leaves_output_untouched() {
        let key = [0x42u8; 32];
        let nonce = [0x01u8; 12];
        let mut ciphertext = [0u8; 5];
        let mut tag = [0u8; 16];
        encrypt(
            AeadAlgorithm::Aes256Gcm,
            &key,
            &nonce,
            b"aad",
            b"hello",
            &mut tag,
            &mut ciphertext,
        )
        .unwrap();

        tag[0] ^= 0x80;
        let mut out = [0xA5u8; 5];
        let err = decrypt(
            AeadAlgorithm::Aes256Gcm,
            &key,
            &nonce,
            b"aad",
            &ciphertext,
            &tag,
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err, CryptoError::AuthenticationFailed);
        assert_eq!(out, [0xA5u8; 5]);
    }

    #[test]
    fn test_wrong_key_length_per_algorithm() {
        let mut ciphertext = [0u8; 4];
        let mut tag = [0u8; 16];
        let err = encrypt(
            AeadAlgorithm::Aes128Gcm,
            &[0u8; 32],
            &[0u8; 12],
            b"",
            b"test",
            &mut tag,
            &mut ciphertext,
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidLength { expected: 16, actual: 32, .. }));
    }

    #[test]
    fn test_decrypt_requires_exact_tag() {
        let mut out = [0u8; 4];
        let err = decrypt(
            AeadAlgorithm::ChaCha20Poly1305,
            &[0u8; 32],
            &[0u8; 12],
            b"",
            b"abcd",
            &[0u8; 15],
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidLength { expected: 16, .. }));
    }
}
