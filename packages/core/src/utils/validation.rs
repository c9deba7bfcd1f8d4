use crate::error::{CryptoError, Result};

/// Largest input length the cipher primitives accept (signed 32-bit counter).
pub const MAX_INPUT_LENGTH: usize = i32::MAX as usize;

pub fn validate_exact_length(what: &'static str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(CryptoError::InvalidLength {
            what,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

pub fn validate_input_length(what: &'static str, len: usize) -> Result<()> {
    if len > MAX_INPUT_LENGTH {
        return Err(CryptoError::LengthOverflow { what, actual: len });
    }
    Ok(())
}
