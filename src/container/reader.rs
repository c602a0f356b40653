//! Cursor over a fixed byte buffer with bounds-checked big-endian reads.

use crate::foundation::error::FormatError;

/// Forward-only reader over `data[pos..end]`.
///
/// Every read checks the remaining window first and reports [`FormatError::Truncated`]
/// with the absolute offset instead of panicking.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ByteReader<'a> {
    /// Reader over the whole buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
        }
    }

    /// Reader over `data[start..end]`; fails when the window lies outside the buffer.
    pub fn window(data: &'a [u8], start: usize, end: usize) -> Result<Self, FormatError> {
        if start > end || end > data.len() {
            return Err(FormatError::Truncated {
                offset: start,
                needed: end.saturating_sub(start),
                available: data.len().saturating_sub(start),
            });
        }
        Ok(Self {
            data,
            pos: start,
            end,
        })
    }

    /// Absolute cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the window.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    /// Take `len` bytes and advance.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u16_be(&mut self) -> Result<u16, FormatError> {
        self.array::<2>().map(u16::from_be_bytes)
    }

    pub fn u32_be(&mut self) -> Result<u32, FormatError> {
        self.array::<4>().map(u32::from_be_bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/container/reader.rs"]
mod tests;
