#![forbid(unsafe_code)]

//! JAB asset archives: header, delta-encoded child table, data section.
//!
//! Layout (all integers little-endian):
//! - `u8` version (1..=4)
//! - `u8` flags, version >= 2 (bit 0: entries carry an uncompressed size)
//! - `u32` data section offset
//! - `u32` child count
//! - `u16` prefix length + UTF-8 prefix, version >= 3
//! - children:
//!   - `u8` reused prefix length, `u8` suffix type, `u16` name length, UTF-8 name
//!   - `u32` offset relative to the data section
//!   - `i32` size
//!   - `i32` uncompressed size, when the compress flag is set
//!   - `f64` modification time
//!   - `u32` CRC, version >= 4 and the path ends in `.asset`

mod extract;
mod format;
mod read;

pub use extract::{child_payload, extract, ExtractReport};
pub use format::{ArchiveHeader, ChildEntry, JabArchive, MAX_CHILDREN, MAX_VERSION, MIN_VERSION};
pub use read::{read_header, ChildValidation, JabReader};

use crate::diag::Diagnostics;
use crate::error::{JabError, JabResult};
use crate::io::ByteReader;

impl JabArchive {
    /// Parses a standalone archive, failing on the first invalid child.
    pub fn parse(data: &[u8], jab_name: &str, diag: &mut dyn Diagnostics) -> JabResult<Self> {
        Self::parse_with(data, jab_name, ChildValidation::Fail, diag)
    }

    /// Parses a standalone archive for metadata, stopping at the first invalid child.
    pub fn inspect(data: &[u8], jab_name: &str, diag: &mut dyn Diagnostics) -> JabResult<Self> {
        Self::parse_with(data, jab_name, ChildValidation::Stop, diag)
    }

    fn parse_with(
        data: &[u8],
        jab_name: &str,
        validation: ChildValidation,
        diag: &mut dyn Diagnostics,
    ) -> JabResult<Self> {
        if data.is_empty() {
            return Err(JabError::EmptyInput);
        }
        let mut reader = JabReader::standalone(validation);
        reader.read_archive(&mut ByteReader::new(data), jab_name, diag)
    }
}
