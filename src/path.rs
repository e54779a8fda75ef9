#![forbid(unsafe_code)]

//! Delta-encoded path reconstruction and path normalization helpers.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::diag::{Diagnostics, Warning};
use crate::error::JabResult;
use crate::io::ByteReader;

/// Spelling of the extensions attached by suffix codes 2..=4.
///
/// Standalone archives use dotted extensions (`.asset.manifest`); the hotfix
/// descriptor and the archives embedded in it use underscores (`.asset_manifest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixStyle {
    Dotted,
    Underscored,
}

impl SuffixStyle {
    pub fn suffix(self, code: u8) -> Option<&'static str> {
        match (code, self) {
            (1, _) => Some(".asset"),
            (2, SuffixStyle::Dotted) => Some(".asset.manifest"),
            (2, SuffixStyle::Underscored) => Some(".asset_manifest"),
            (3, SuffixStyle::Dotted) => Some(".prefab.asset"),
            (3, SuffixStyle::Underscored) => Some(".prefab_asset"),
            (4, SuffixStyle::Dotted) => Some(".prefab.asset.manifest"),
            (4, SuffixStyle::Underscored) => Some(".prefab_asset_manifest"),
            (5, _) => Some(".manifest"),
            _ => None,
        }
    }
}

/// Which string becomes the "previous path" for the next entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingState {
    /// The reconstructed path before its suffix is appended (archive child tables).
    Core,
    /// The full path including its suffix (hotfix flat file list).
    Suffixed,
}

/// One delta-encoded path as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDelta {
    pub prefix_len: u8,
    pub suffix_type: u8,
    pub name_part: String,
}

impl PathDelta {
    /// `u8` prefix length, `u8` suffix type, `u16` name length, UTF-8 name.
    pub fn read(r: &mut ByteReader<'_>) -> JabResult<Self> {
        let prefix_len = r.read_u8("path prefix length")?;
        let suffix_type = r.read_u8("path suffix type")?;
        let name_part = r.read_short_string("path name part")?;
        Ok(Self {
            prefix_len,
            suffix_type,
            name_part,
        })
    }
}

/// Rolling "previous path" cursor for one section of delta-encoded paths.
///
/// Create one per section; never share a codec between sections.
#[derive(Debug, Clone)]
pub struct PathDeltaCodec {
    section: String,
    style: SuffixStyle,
    rolling: RollingState,
    previous: String,
    index: usize,
}

impl PathDeltaCodec {
    pub fn new(section: impl Into<String>, style: SuffixStyle, rolling: RollingState) -> Self {
        Self {
            section: section.into(),
            style,
            rolling,
            previous: String::new(),
            index: 0,
        }
    }

    /// Starts a new section: forgets the previous path and renames the section
    /// used in warnings.
    pub fn reset(&mut self, section: impl Into<String>) {
        self.section = section.into();
        self.previous.clear();
        self.index = 0;
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }

    /// Reconstructs the next path from `prefix_len` characters of the previous
    /// one plus `name_part`, then appends the suffix for `suffix_type`.
    pub fn apply(
        &mut self,
        prefix_len: u8,
        suffix_type: u8,
        name_part: &str,
        diag: &mut dyn Diagnostics,
    ) -> String {
        let available = self.previous.chars().count();
        let keep = if prefix_len as usize > available {
            diag.warn(Warning::PrefixOverflow {
                section: self.section.clone(),
                index: self.index,
                requested: prefix_len,
                available,
            });
            available
        } else {
            prefix_len as usize
        };

        let mut core = char_prefix(&self.previous, keep).to_string();
        core.push_str(name_part);

        let mut path = core.clone();
        match self.style.suffix(suffix_type) {
            Some(suffix) => path.push_str(suffix),
            None if suffix_type > 5 => diag.warn(Warning::UnknownSuffix {
                section: self.section.clone(),
                code: suffix_type,
                index: self.index,
            }),
            None => {}
        }

        self.previous = match self.rolling {
            RollingState::Core => core,
            RollingState::Suffixed => path.clone(),
        };
        self.index += 1;
        path
    }

    pub fn apply_delta(&mut self, delta: &PathDelta, diag: &mut dyn Diagnostics) -> String {
        self.apply(delta.prefix_len, delta.suffix_type, &delta.name_part, diag)
    }

    /// Reads one [`PathDelta`] and applies it.
    pub fn read_next(&mut self, r: &mut ByteReader<'_>, diag: &mut dyn Diagnostics) -> JabResult<String> {
        let delta = PathDelta::read(r)?;
        Ok(self.apply_delta(&delta, diag))
    }
}

fn char_prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Appends a trailing `/` to a non-empty prefix that lacks one.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut p = prefix.to_string();
    if !p.is_empty() && !p.ends_with('/') {
        p.push('/');
    }
    p
}

/// Replaces `/` with the platform separator.
pub fn to_native_separators(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        return path.to_string();
    }
    path.replace('/', &MAIN_SEPARATOR.to_string())
}

/// Output location for `logical` (either separator) below `root`.
pub fn output_path(root: &Path, logical: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    for part in logical.split(['/', '\\']).filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}

/// Avoids `Asset/Asset/...` when the output directory already names the
/// first segment of the archive prefix: extraction then targets its parent.
pub fn normalize_decode_dir(out_dir: &Path, prefix: &str) -> PathBuf {
    if out_dir.as_os_str().is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }
    let p = prefix.replace('\\', "/");
    let first_seg = p.trim_start_matches('/').split('/').next().unwrap_or("");
    if first_seg.is_empty() {
        return out_dir.to_path_buf();
    }

    let out_name = out_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !out_name.is_empty() && out_name.eq_ignore_ascii_case(first_seg) {
        return match out_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
    }
    out_dir.to_path_buf()
}

/// File name component of `path`, accepting either separator.
pub fn archive_name(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}
