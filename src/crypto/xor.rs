//! Single-byte XOR stream obfuscation used by shipped `.pak` files.
//!
//! Every byte of the file, header included, is XOR-ed with one constant key
//! (`0xF7` for retail archives). The transform does not depend on the byte's
//! position, so [`XorReader`] can seek freely and still decode correctly.

use std::io::{self, Read, Seek, SeekFrom};

/// Key applied to every byte of a retail `.pak` file.
pub const PAK_XOR_KEY: u8 = 0xF7;

/// `Read + Seek` adapter that XORs every byte read with a fixed key.
#[derive(Debug)]
pub struct XorReader<R> {
    inner: R,
    key: u8,
}

impl<R> XorReader<R> {
    /// Wrap `inner`, decoding with `key`.
    pub fn new(inner: R, key: u8) -> Self {
        Self { inner, key }
    }

    /// The key in use.
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Consume the adapter, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for XorReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        xor_in_place(&mut buf[..n], self.key);
        Ok(n)
    }
}

impl<R: Seek> Seek for XorReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// XOR `data` with `key` in place.
///
/// The operation is its own inverse.
pub fn xor_in_place(data: &mut [u8], key: u8) {
    for b in data {
        *b ^= key;
    }
}
