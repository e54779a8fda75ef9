#![forbid(unsafe_code)]

//! zlib inflate for child payloads and the outer hotfix container.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{JabError, JabResult};

/// Turns a compressed payload back into its original bytes.
pub trait Decompressor: Sync {
    fn inflate(&self, data: &[u8]) -> JabResult<Vec<u8>>;
}

/// Standard zlib-framed inflate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Zlib;

impl Decompressor for Zlib {
    fn inflate(&self, data: &[u8]) -> JabResult<Vec<u8>> {
        inflate(data)
    }
}

pub fn inflate(data: &[u8]) -> JabResult<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::with_capacity(data.len().saturating_mul(2));
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| JabError::Decompression(format!("zlib inflate: {e}")))?;
    Ok(out)
}

/// Inflates the outer hotfix container.
///
/// The container stores its first byte bit-inverted; it is flipped back on a
/// copy before inflating. Child payloads never get this treatment.
pub fn inflate_hotfix_container(data: &[u8]) -> JabResult<Vec<u8>> {
    if data.is_empty() {
        return Err(JabError::EmptyInput);
    }
    let mut working = data.to_vec();
    working[0] = !working[0];
    tracing::debug!("inflating hotfix container ({} bytes)", data.len());
    inflate(&working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn inflates_zlib_stream() {
        let packed = deflate(b"hello hello hello");
        assert_eq!(inflate(&packed).unwrap(), b"hello hello hello");
    }

    #[test]
    fn rejects_garbage() {
        let err = inflate(b"definitely not zlib").unwrap_err();
        assert!(matches!(err, JabError::Decompression(_)));
    }

    #[test]
    fn container_needs_first_byte_inverted() {
        let mut container = deflate(b"descriptor bytes");
        container[0] = !container[0];

        assert!(inflate(&container).is_err());
        assert_eq!(inflate_hotfix_container(&container).unwrap(), b"descriptor bytes");
    }

    #[test]
    fn empty_container_is_an_error() {
        assert!(matches!(inflate_hotfix_container(&[]), Err(JabError::EmptyInput)));
    }
}
