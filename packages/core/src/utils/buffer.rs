// Capacity-query convention for output buffers
//
// The length of the caller's `&mut [u8]` is its capacity. Undersized buffers
// are never written and report the exact size needed; on success the exact
// number of bytes written is returned.

use crate::error::{CryptoError, Result};

/// Fails with [`CryptoError::BufferTooSmall`] if `provided < required`.
pub fn ensure_capacity(provided: usize, required: usize) -> Result<()> {
    if provided < required {
        return Err(CryptoError::BufferTooSmall { required, provided });
    }
    Ok(())
}

/// Copies `data` to the front of `out` following the capacity-query convention.
pub fn write_output(out: &mut [u8], data: &[u8]) -> Result<usize> {
    ensure_capacity(out.len(), data.len())?;
    out[..data.len()].copy_from_slice(data);
    Ok(data.len())
}

/// Left-pads a big-endian integer encoding to `width` bytes.
///
/// Returns `None` if `value` does not fit.
pub fn left_pad(value: &[u8], width: usize) -> Option<Vec<u8>> {
    if value.len() > width {
        return None;
    }
    let mut padded = vec![0u8; width];
    padded[width - value.len()..].copy_from_slice(value);
    Some(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_reports_required_size() {
        let mut empty: [u8; 0] = [];
        let err = write_output(&mut empty, b"abcd").unwrap_err();
        assert_eq!(err.required_capacity(), Some(4));

        let mut exact = [0u8; 4];
        assert_eq!(write_output(&mut exact, b"abcd").unwrap(), 4);
        assert_eq!(&exact, b"abcd");
    }

    #[test]
    fn test_undersized_buffer_is_untouched() {
        let mut small = [0xAAu8; 3];
        assert!(write_output(&mut small, b"abcd").is_err());
        assert_eq!(small, [0xAA; 3]);
    }

    #[test]
    fn test_larger_buffer_reports_written_bytes() {
        let mut large = [0u8; 8];
        assert_eq!(write_output(&mut large, b"ab").unwrap(), 2);
        assert_eq!(&large[..2], b"ab");
        assert_eq!(&large[2..], &[0u8; 6]);
    }

    #[test]
    fn test_left_pad() {
        assert_eq!(left_pad(&[1, 2], 4).unwrap(), vec![0, 0, 1, 2]);
        assert!(left_pad(&[1, 2, 3], 2).is_none());
    }
}
