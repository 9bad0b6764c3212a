//! Little-endian length-prefixed byte encoding shared by the vault record
//! stream and the registry metadata file.
//!
//! `ByteCursor` owns nothing but an offset into a borrowed buffer; every
//! read is bounds-checked and fails with `TruncatedRecord` instead of
//! reading past the end.

use crate::errors::{ClamError, Result};

/// Width of every length prefix in bytes.
pub const LEN_PREFIX: usize = 4;

/// A forward-only reader over a byte slice.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// `true` once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ClamError::TruncatedRecord {
                needed: len,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Consume a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Consume a 4-byte little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<LEN_PREFIX>()?))
    }

    /// Consume a length prefix followed by that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_le()?;
        let len = usize::try_from(len).map_err(|_| ClamError::TruncatedRecord {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.read_bytes(len)
    }
}

/// Append a 4-byte little-endian `u32`.
pub fn put_u32_le(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append `bytes` preceded by its length as a 4-byte little-endian prefix.
pub fn put_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        ClamError::MalformedRecord(format!("field length {} exceeds u32::MAX", bytes.len()))
    })?;
    put_u32_le(buf, len);
    buf.extend_from_slice(bytes);
    Ok(())
}
