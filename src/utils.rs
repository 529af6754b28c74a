//! Low-level I/O primitives shared by the binary parsers.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity. A short read surfaces as
//! [`Error::UnexpectedEof`].

use std::io::Read;

use crate::{Error, Result};

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a little-endian `i32`.
#[inline]
pub(crate) fn le_i32<R: Read>(r: &mut R) -> Result<i32> {
    Ok(i32::from_le_bytes(bytesa(r)?))
}

/// Read a little-endian `i64`.
#[inline]
pub(crate) fn le_i64<R: Read>(r: &mut R) -> Result<i64> {
    Ok(i64::from_le_bytes(bytesa(r)?))
}

/// Read exactly `N` bytes into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut b = [0u8; N];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Read exactly `len` bytes into a `Vec`.
#[inline]
pub(crate) fn bytesv<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut b = vec![0u8; len];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Verify that the next `N` bytes in the stream match `expected`.
///
/// Returns [`Error::BadMagic`] on mismatch.
#[inline]
pub(crate) fn magic<R: Read, const N: usize>(r: &mut R, expected: &[u8; N]) -> Result<()> {
    let got = bytesa::<N>(r)?;
    if &got != expected {
        return Err(Error::BadMagic);
    }
    Ok(())
}

/// Read a string prefixed by a one-byte length.
///
/// The bytes must be valid UTF-8; a zero length yields an empty string.
pub(crate) fn u8_string<R: Read>(r: &mut R) -> Result<String> {
    let len = u8(r)?;
    let bytes = bytesv(r, len as usize)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_little_endian() {
        let data = [0xFE, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0x80];
        let mut r = Cursor::new(&data[..]);
        assert_eq!(le_i32(&mut r).unwrap(), -2);
        assert_eq!(le_i64(&mut r).unwrap(), i64::MIN + 1);
    }

    #[test]
    fn short_read_is_eof() {
        let mut r = Cursor::new(&[1u8, 2][..]);
        assert!(matches!(le_i32(&mut r), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn length_prefixed_string() {
        let mut r = Cursor::new(&b"\x03abcd"[..]);
        assert_eq!(u8_string(&mut r).unwrap(), "abc");
        assert_eq!(u8(&mut r).unwrap(), b'd');

        let mut empty = Cursor::new(&[0u8][..]);
        assert_eq!(u8_string(&mut empty).unwrap(), "");
    }

    #[test]
    fn string_overrun_is_eof() {
        let mut r = Cursor::new(&b"\x05ab"[..]);
        assert!(matches!(u8_string(&mut r), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn invalid_utf8_name() {
        let mut r = Cursor::new(&[2u8, 0xC3, 0x28][..]);
        assert!(matches!(u8_string(&mut r), Err(Error::InvalidName(_))));
    }

    #[test]
    fn magic_mismatch() {
        let mut r = Cursor::new(&b"ABCD"[..]);
        assert!(magic(&mut r, b"ABCD").is_ok());
        let mut r = Cursor::new(&b"ABCE"[..]);
        assert!(matches!(magic(&mut r, b"ABCD"), Err(Error::BadMagic)));
    }
}
