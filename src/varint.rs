//! The Remaining Length of a fixed header, encoded as a variable-length integer.
//!
//! Each byte carries 7 data bits, least significant digit first,
//! with the high bit set on all but the last byte:
//!
//! | Digits | From        | To                     |
//! |--------|-------------|------------------------|
//! | 1      | 0           | 127 (0x7F)             |
//! | 2      | 128         | 16,383 (0xFF, 0x7F)    |
//! | 3      | 16,384      | 2,097,151              |
//! | 4      | 2,097,152   | 268,435,455            |
use bytes::BufMut;

use crate::error::{Error, Result};

/// The largest value a Remaining Length field can hold.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// The maximum number of bytes a Remaining Length field can take.
pub const MAX_LENGTH_BYTES: usize = 4;

const CONTINUATION_BIT: u8 = 0x80;
const DIGIT_MASK: u8 = 0x7F;

/// Returns the number of bytes `encode_length` writes for `n`.
pub fn size_of_length(n: usize) -> usize {
    match n {
        n if n <= 127 => 1,
        n if n <= 16_383 => 2,
        n if n <= 2_097_151 => 3,
        _ => 4,
    }
}

/// Writes `value` with the minimal number of digits and returns the number of bytes written.
///
/// Nothing is written if `value` exceeds `MAX_REMAINING_LENGTH`
/// or `buf` has no room for all of its digits.
pub fn encode_length<T: BufMut>(buf: &mut T, mut value: usize) -> Result<usize> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::LengthOverflow("remaining length"));
    }

    let size = size_of_length(value);

    if buf.remaining_mut() < size {
        return Err(Error::IncompleteBuffer {
            needed: size,
            available: buf.remaining_mut(),
        });
    }

    let mut written = 0;

    loop {
        let digit = (value % 0x80) as u8;
        value >>= 7;
        written += 1;

        if value > 0 {
            buf.put_u8(CONTINUATION_BIT | digit);
        } else {
            buf.put_u8(digit);
            break;
        }
    }

    Ok(written)
}

/// Reads a Remaining Length from the front of `cursor` and advances it past the consumed bytes.
///
/// The cursor is left untouched on error. Running out of bytes before the last digit
/// is `IncompleteBuffer`; a continuation bit on the fourth byte is `LengthOverflow`.
pub fn decode_length(cursor: &mut &[u8]) -> Result<usize> {
    let input = *cursor;
    let mut value = 0;

    for (i, &b) in input.iter().take(MAX_LENGTH_BYTES).enumerate() {
        value += usize::from(b & DIGIT_MASK) << (7 * i);

        if (b & CONTINUATION_BIT) == 0 {
            *cursor = &input[i + 1..];

            return Ok(value);
        }
    }

    if input.len() >= MAX_LENGTH_BYTES {
        Err(Error::LengthOverflow("remaining length"))
    } else {
        Err(Error::IncompleteBuffer {
            needed: input.len() + 1,
            available: input.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use super::*;

    #[test]
    fn test_encode_length() {
        macro_rules! assert_encoded (
            ($value:expr, $bytes:expr) => {{
                let mut v = Vec::new();
                assert_eq!(encode_length(&mut v, $value), Ok($bytes.len()));
                assert_eq!(v, &$bytes[..]);
                assert_eq!(size_of_length($value), $bytes.len());
            }};
        );

        assert_encoded!(0, b"\x00");
        assert_encoded!(127, b"\x7f");
        assert_encoded!(128, b"\x80\x01");
        assert_encoded!(321, b"\xc1\x02");
        assert_encoded!(16_383, b"\xff\x7f");
        assert_encoded!(16_384, b"\x80\x80\x01");
        assert_encoded!(2_097_151, b"\xff\xff\x7f");
        assert_encoded!(2_097_152, b"\x80\x80\x80\x01");
        assert_encoded!(268_435_455, b"\xff\xff\xff\x7f");

        let mut v = Vec::new();
        assert_eq!(
            encode_length(&mut v, MAX_REMAINING_LENGTH + 1),
            Err(Error::LengthOverflow("remaining length"))
        );
        assert!(v.is_empty(), "nothing written on overflow");
    }

    #[test]
    fn test_encode_short_buffer() {
        let mut buf = [0u8; 1];

        assert_eq!(
            encode_length(&mut &mut buf[..], 200),
            Err(Error::IncompleteBuffer {
                needed: 2,
                available: 1
            })
        );
        assert_eq!(buf, [0], "nothing written");

        assert_eq!(encode_length(&mut &mut buf[..], 127), Ok(1));
        assert_eq!(buf, [0x7f]);
    }

    #[test]
    fn test_decode_length() {
        let mut cursor = &b"\x7f\x7f"[..];
        assert_eq!(decode_length(&mut cursor), Ok(127));
        assert_eq!(cursor, b"\x7f", "only the length is consumed");

        let mut cursor = &b"\x82\x7f"[..];
        assert_eq!(decode_length(&mut cursor), Ok(16_258));
        assert!(cursor.is_empty());

        let mut cursor = &b"\x80\x00"[..];
        assert_eq!(decode_length(&mut cursor), Ok(0), "padded zero digit");
    }

    #[test]
    fn test_round_trip() {
        for &n in &[0, 127, 128, 16_383, 16_384, 2_097_151, 2_097_152, 268_435_455] {
            let mut v = Vec::new();
            let written = encode_length(&mut v, n).unwrap();

            let mut cursor = &v[..];
            assert_eq!(decode_length(&mut cursor), Ok(n));
            assert_eq!(written, v.len());
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn test_decode_incomplete() {
        for bytes in &[&b""[..], &b"\x80"[..], &b"\xff\xff"[..], &b"\xff\xff\xff"[..]] {
            let mut cursor = *bytes;

            assert_matches!(
                decode_length(&mut cursor),
                Err(Error::IncompleteBuffer { .. })
            );
            assert_eq!(cursor, *bytes, "cursor untouched on error");
        }
    }

    #[test]
    fn test_decode_overflow() {
        let mut cursor = &b"\xff\xff\xff\xff\x7f"[..];

        assert_eq!(
            decode_length(&mut cursor),
            Err(Error::LengthOverflow("remaining length"))
        );
        assert_eq!(cursor.len(), 5);

        let mut cursor = &b"\x80\x80\x80\x80"[..];
        assert_eq!(
            decode_length(&mut cursor),
            Err(Error::LengthOverflow("remaining length"))
        );
    }
}
