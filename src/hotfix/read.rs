#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use crate::diag::Diagnostics;
use crate::error::{JabError, JabResult};
use crate::gmf::{self, DynamicValue};
use crate::hotfix::{FileInfo, HotfixDescriptor};
use crate::io::ByteReader;
use crate::jab::JabReader;
use crate::path::{PathDeltaCodec, RollingState, SuffixStyle};
use crate::zlib::inflate_hotfix_container;

pub const MIN_DESC_VERSION: u8 = 3;
pub const MAX_DESC_VERSION: u8 = 4;

/// Group flag marking an archive that is compressed as a whole.
const GROUP_COMPRESSED: u8 = 1;

/// Inflates an outer hotfix container and decodes the descriptor inside it.
pub fn decode_container(raw: &[u8], diag: &mut dyn Diagnostics) -> JabResult<HotfixDescriptor> {
    let data = inflate_hotfix_container(raw)?;
    decode(&data, diag)
}

/// Decodes an already inflated descriptor.
pub fn decode(data: &[u8], diag: &mut dyn Diagnostics) -> JabResult<HotfixDescriptor> {
    if data.is_empty() {
        return Err(JabError::EmptyInput);
    }
    let mut r = ByteReader::new(data);
    r.skip(1, "descriptor marker")?;

    let version = r.read_u8("descriptor version")?;
    if !(MIN_DESC_VERSION..=MAX_DESC_VERSION).contains(&version) {
        return Err(JabError::UnsupportedVersion {
            format: "hotfix descriptor",
            version,
            min: MIN_DESC_VERSION,
            max: MAX_DESC_VERSION,
        });
    }
    let jab_group_count = r.read_i32("JAB group count")?;
    tracing::debug!("hotfix descriptor: version {version}, JAB groups {jab_group_count}");

    let meta = gmf::decode(&mut r)?;
    if meta.as_object().is_none() {
        return Err(JabError::NotAnObject {
            found: meta.type_name(),
        });
    }
    let text = |key: &str| meta.get(key).and_then(DynamicValue::to_text);
    let patch_version = text("patchVersion");
    let base_version = text("baseVersion");
    let date = text("date");
    let override_dic = meta
        .get("overrideDic")
        .filter(|v| v.as_object().is_some())
        .cloned();

    let files = read_files(&mut r, diag)?;
    tracing::debug!(
        "hotfix descriptor: patchVersion {:?}, baseVersion {:?}, date {:?}, files {}",
        patch_version,
        base_version,
        date,
        files.len()
    );

    let mut compressed_jab_names = Vec::new();
    let mut jab_item_info_dic = BTreeMap::new();
    if jab_group_count > 0 {
        read_groups(&mut r, &mut compressed_jab_names, &mut jab_item_info_dic, diag)?;
    }

    Ok(HotfixDescriptor {
        date,
        patch_version,
        base_version,
        override_dic,
        compressed_jab_names,
        files,
        jab_item_info_dic,
    })
}

fn read_count(r: &mut ByteReader<'_>, what: &'static str) -> JabResult<u32> {
    let count = r.read_i32(what)?;
    if count < 0 {
        return Err(JabError::NegativeLength { what, length: count });
    }
    Ok(count as u32)
}

// Unlike archive child tables, the flat list rolls over the suffixed path.
fn read_files(r: &mut ByteReader<'_>, diag: &mut dyn Diagnostics) -> JabResult<BTreeMap<String, FileInfo>> {
    let count = read_count(r, "file count")?;
    let mut codec = PathDeltaCodec::new("hotfix files", SuffixStyle::Underscored, RollingState::Suffixed);
    let mut files = BTreeMap::new();
    for _ in 0..count {
        let path = codec.read_next(r, diag)?;
        let size = r.read_i32("file size")?;
        let crc = r.read_u32("file crc")?;
        files.insert(path.clone(), FileInfo { path, size, crc });
    }
    Ok(files)
}

fn read_groups(
    r: &mut ByteReader<'_>,
    compressed: &mut Vec<String>,
    items: &mut BTreeMap<String, crate::jab::ChildEntry>,
    diag: &mut dyn Diagnostics,
) -> JabResult<()> {
    let groups = read_count(r, "JAB group entries")?;
    let mut reader = JabReader::embedded();
    for _ in 0..groups {
        let name = r.read_short_string("JAB group name")?;
        let flag = r.read_u8("JAB group flag")?;
        r.skip(4, "JAB group reserved")?;

        if flag == GROUP_COMPRESSED {
            compressed.push(name);
            continue;
        }

        let archive = reader.read_archive(r, &name, diag)?;
        for child in archive.children {
            items.entry(child.path.clone()).or_insert(child);
        }
    }
    Ok(())
}
