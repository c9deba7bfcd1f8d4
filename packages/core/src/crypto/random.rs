//! Random-bytes capability consumed by key generation.

use crate::error::{CryptoError, Result};
use rand::rngs::OsRng;
use rand_core::RngCore;
use zeroize::Zeroizing;

/// Source of cryptographically secure random bytes.
///
/// Failures must be reported, never papered over: key generation turns them
/// into [`CryptoError::RandomFailure`].
pub trait RandomSource: Send {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(dest)?;
        Ok(())
    }
}

/// Draws `len` secret bytes; the buffer is wiped on drop.
pub fn random_secret(rng: &mut dyn RandomSource, len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rng.fill(&mut bytes)
        .map_err(|e| match e {
            CryptoError::RandomFailure(_) => e,
            other => CryptoError::RandomFailure(other.to_string()),
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_random_fills() {
        let a = random_secret(&mut OsRandom, 32).unwrap();
        let b = random_secret(&mut OsRandom, 32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(*a, *b);
    }
}
