#![forbid(unsafe_code)]

//! Hotfix descriptor: GMF metadata, a flat delta-encoded file list and
//! optional embedded archive groups.

mod read;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::gmf::DynamicValue;
use crate::jab::ChildEntry;

pub use read::{decode, decode_container, MAX_DESC_VERSION, MIN_DESC_VERSION};

/// Entry of the descriptor's flat file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub size: i32,
    pub crc: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotfixDescriptor {
    pub date: Option<String>,
    pub patch_version: Option<String>,
    pub base_version: Option<String>,
    /// Opaque; kept exactly as decoded.
    pub override_dic: Option<DynamicValue>,
    /// Groups flagged as externally compressed; their contents are not parsed.
    pub compressed_jab_names: Vec<String>,
    pub files: BTreeMap<String, FileInfo>,
    /// First occurrence of a path wins.
    pub jab_item_info_dic: BTreeMap<String, ChildEntry>,
}
