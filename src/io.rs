#![forbid(unsafe_code)]

use crate::error::{JabError, JabResult};

/// Forward-only little-endian cursor over an in-memory buffer.
///
/// Every read either consumes exactly the requested bytes or fails with
/// [`JabError::Truncated`] without moving the cursor.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn skip(&mut self, n: usize, what: &'static str) -> JabResult<()> {
        self.take(n, what).map(|_| ())
    }

    pub fn take(&mut self, n: usize, what: &'static str) -> JabResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(JabError::Truncated {
                what,
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_exact<const N: usize>(&mut self, what: &'static str) -> JabResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, what)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self, what: &'static str) -> JabResult<u8> {
        Ok(self.read_exact::<1>(what)?[0])
    }

    pub fn read_u16(&mut self, what: &'static str) -> JabResult<u16> {
        Ok(u16::from_le_bytes(self.read_exact::<2>(what)?))
    }

    pub fn read_u32(&mut self, what: &'static str) -> JabResult<u32> {
        Ok(u32::from_le_bytes(self.read_exact::<4>(what)?))
    }

    pub fn read_i32(&mut self, what: &'static str) -> JabResult<i32> {
        Ok(i32::from_le_bytes(self.read_exact::<4>(what)?))
    }

    pub fn read_f32(&mut self, what: &'static str) -> JabResult<f32> {
        Ok(f32::from_le_bytes(self.read_exact::<4>(what)?))
    }

    pub fn read_f64(&mut self, what: &'static str) -> JabResult<f64> {
        Ok(f64::from_le_bytes(self.read_exact::<8>(what)?))
    }

    /// Reads `len` bytes and decodes them as UTF-8, replacing invalid sequences.
    pub fn read_utf8(&mut self, len: usize, what: &'static str) -> JabResult<String> {
        let bytes = self.take(len, what)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// `u16` length followed by that many UTF-8 bytes.
    pub fn read_short_string(&mut self, what: &'static str) -> JabResult<String> {
        let len = self.read_u16(what)? as usize;
        self.read_utf8(len, what)
    }
}
