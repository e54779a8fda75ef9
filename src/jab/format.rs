#![forbid(unsafe_code)]

use serde::Serialize;

/// Lowest archive version understood.
pub const MIN_VERSION: u8 = 1;
/// Highest archive version understood.
pub const MAX_VERSION: u8 = 4;
/// Headers announcing more children than this are treated as corrupt.
pub const MAX_CHILDREN: u32 = 100_000;

/// Low bit of the flags byte: entries carry a distinct uncompressed size.
pub(crate) const FLAG_COMPRESS: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveHeader {
    pub version: u8,
    pub compress: bool,
    #[serde(rename = "dataSectionOffset")]
    pub data_section_offset: u32,
    pub child_count: u32,
    /// Empty, or ends with `/`.
    pub prefix: String,
}

impl ArchiveHeader {
    pub fn is_valid(&self) -> bool {
        (MIN_VERSION..=MAX_VERSION).contains(&self.version) && self.child_count <= MAX_CHILDREN
    }

    /// Version 4 archives store a CRC after every `.asset` entry.
    pub fn has_asset_crc(&self) -> bool {
        self.version >= 4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildEntry {
    pub jab_name: String,
    /// Archive prefix plus the reconstructed relative path.
    pub path: String,
    pub size: i32,
    pub unc_size: i32,
    pub time: f64,
    pub crc: u32,
    pub data_local_offset: u32,
    pub compressed: bool,
}

impl ChildEntry {
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty() && self.size >= 0
    }

    /// Whether extraction should try to inflate this entry.
    pub fn needs_inflate(&self) -> bool {
        self.compressed && self.unc_size > 0 && self.unc_size != self.size
    }
}

/// A parsed archive: its header and child table, without payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JabArchive {
    pub jab_name: String,
    #[serde(flatten)]
    pub header: ArchiveHeader,
    pub children: Vec<ChildEntry>,
}
