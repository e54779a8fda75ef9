#![forbid(unsafe_code)]

use crate::diag::{Diagnostics, Warning};
use crate::error::{JabError, JabResult};
use crate::io::ByteReader;
use crate::jab::format::{
    ArchiveHeader, ChildEntry, JabArchive, FLAG_COMPRESS, MAX_CHILDREN, MAX_VERSION, MIN_VERSION,
};
use crate::path::{normalize_prefix, to_native_separators, PathDeltaCodec, RollingState, SuffixStyle};

/// What to do with a child whose path is empty or whose size is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildValidation {
    /// Abort the parse with [`JabError::InvalidEntry`].
    Fail,
    /// Warn and stop reading the table, keeping the children read so far.
    Stop,
    /// Keep it as is.
    Accept,
}

/// Reads archive headers and their child tables.
///
/// One reader may parse several archives in a row (the hotfix descriptor
/// does this); every header resets the rolling path state.
#[derive(Debug, Clone)]
pub struct JabReader {
    native_separators: bool,
    validation: ChildValidation,
    codec: PathDeltaCodec,
}

impl JabReader {
    pub fn new(style: SuffixStyle, native_separators: bool, validation: ChildValidation) -> Self {
        Self {
            native_separators,
            validation,
            codec: PathDeltaCodec::new("JAB", style, RollingState::Core),
        }
    }

    /// Reader for standalone `.jab` files.
    pub fn standalone(validation: ChildValidation) -> Self {
        Self::new(SuffixStyle::Dotted, true, validation)
    }

    /// Reader for archive groups embedded in a hotfix descriptor.
    pub fn embedded() -> Self {
        Self::new(SuffixStyle::Underscored, false, ChildValidation::Accept)
    }

    pub fn read_header(&mut self, r: &mut ByteReader<'_>, jab_name: &str) -> JabResult<ArchiveHeader> {
        self.codec.reset(format!("JAB {jab_name}"));
        read_header(r)
    }

    pub fn read_child(
        &mut self,
        r: &mut ByteReader<'_>,
        header: &ArchiveHeader,
        jab_name: &str,
        diag: &mut dyn Diagnostics,
    ) -> JabResult<ChildEntry> {
        let relative = self.codec.read_next(r, diag)?;

        let data_local_offset = r.read_u32("child data offset")?;
        let size = r.read_i32("child size")?;
        let unc_size = if header.compress {
            r.read_i32("child uncompressed size")?
        } else {
            size
        };
        let time = r.read_f64("child time")?;
        let crc = if header.has_asset_crc() && relative.ends_with(".asset") {
            r.read_u32("child crc")?
        } else {
            0
        };

        let full = format!("{}{}", header.prefix, relative);
        let path = if self.native_separators {
            to_native_separators(&full)
        } else {
            full
        };

        Ok(ChildEntry {
            jab_name: jab_name.to_string(),
            path,
            size,
            unc_size,
            time,
            crc,
            data_local_offset,
            compressed: header.compress,
        })
    }

    /// Reads a header and its whole child table.
    pub fn read_archive(
        &mut self,
        r: &mut ByteReader<'_>,
        jab_name: &str,
        diag: &mut dyn Diagnostics,
    ) -> JabResult<JabArchive> {
        let header = self.read_header(r, jab_name)?;
        let mut children = Vec::with_capacity(header.child_count as usize);
        for index in 0..header.child_count {
            let child = self.read_child(r, &header, jab_name, diag)?;
            if !child.is_valid() {
                match self.validation {
                    ChildValidation::Fail => {
                        return Err(JabError::InvalidEntry {
                            index,
                            path: child.path,
                            size: child.size,
                        })
                    }
                    ChildValidation::Stop => {
                        diag.warn(Warning::InvalidChildSkipped {
                            index,
                            path: child.path,
                            size: child.size,
                        });
                        break;
                    }
                    ChildValidation::Accept => {}
                }
            }
            children.push(child);
        }
        tracing::debug!(
            "JAB {jab_name}: version {} compress {} children {}/{}",
            header.version,
            header.compress,
            children.len(),
            header.child_count
        );
        Ok(JabArchive {
            jab_name: jab_name.to_string(),
            header,
            children,
        })
    }
}

/// Parses an archive header.
///
/// Versions outside `1..=4` and child counts above the guardrail are fatal.
pub fn read_header(r: &mut ByteReader<'_>) -> JabResult<ArchiveHeader> {
    let version = r.read_u8("archive version")?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(JabError::UnsupportedVersion {
            format: "JAB",
            version,
            min: MIN_VERSION,
            max: MAX_VERSION,
        });
    }
    let flags = if version >= 2 {
        r.read_u8("archive flags")?
    } else {
        0
    };
    let data_section_offset = r.read_u32("data section offset")?;
    let child_count = r.read_u32("child count")?;

    let prefix = if version >= 3 {
        normalize_prefix(&r.read_short_string("archive prefix")?)
    } else {
        String::new()
    };

    if child_count > MAX_CHILDREN {
        return Err(JabError::TooManyChildren { count: child_count });
    }

    Ok(ArchiveHeader {
        version,
        compress: flags & FLAG_COMPRESS != 0,
        data_section_offset,
        child_count,
        prefix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::CollectedDiagnostics;

    struct Child<'a> {
        prefix_len: u8,
        suffix: u8,
        name: &'a str,
        offset: u32,
        size: i32,
        unc_size: Option<i32>,
        time: f64,
        crc: Option<u32>,
    }

    fn child(prefix_len: u8, suffix: u8, name: &str) -> Child<'_> {
        Child {
            prefix_len,
            suffix,
            name,
            offset: 0,
            size: 0,
            unc_size: None,
            time: 0.0,
            crc: None,
        }
    }

    fn header_bytes(version: u8, flags: u8, data_offset: u32, count: u32, prefix: &str) -> Vec<u8> {
        let mut out = vec![version];
        if version >= 2 {
            out.push(flags);
        }
        out.extend_from_slice(&data_offset.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        if version >= 3 {
            out.extend_from_slice(&(prefix.len() as u16).to_le_bytes());
            out.extend_from_slice(prefix.as_bytes());
        }
        out
    }

    fn push_child(out: &mut Vec<u8>, c: &Child<'_>) {
        out.push(c.prefix_len);
        out.push(c.suffix);
        out.extend_from_slice(&(c.name.len() as u16).to_le_bytes());
        out.extend_from_slice(c.name.as_bytes());
        out.extend_from_slice(&c.offset.to_le_bytes());
        out.extend_from_slice(&c.size.to_le_bytes());
        if let Some(unc) = c.unc_size {
            out.extend_from_slice(&unc.to_le_bytes());
        }
        out.extend_from_slice(&c.time.to_le_bytes());
        if let Some(crc) = c.crc {
            out.extend_from_slice(&crc.to_le_bytes());
        }
    }

    fn parse(bytes: &[u8], validation: ChildValidation) -> (JabResult<JabArchive>, CollectedDiagnostics) {
        let mut diag = CollectedDiagnostics::new();
        let mut reader = JabReader::new(SuffixStyle::Dotted, false, validation);
        let res = reader.read_archive(&mut ByteReader::new(bytes), "t.jab", &mut diag);
        (res, diag)
    }

    #[test]
    fn version_one_header_has_no_flags_or_prefix() {
        let bytes = header_bytes(1, 0, 0, 0, "");
        let mut r = ByteReader::new(&bytes);
        let h = read_header(&mut r).unwrap();
        assert_eq!(h.version, 1);
        assert!(!h.compress);
        assert_eq!(h.prefix, "");
        assert!(h.is_valid());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn prefix_is_normalized() {
        let bytes = header_bytes(3, 1, 16, 0, "Asset");
        let h = read_header(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(h.prefix, "Asset/");
        assert!(h.compress);
        assert_eq!(h.data_section_offset, 16);

        let bytes = header_bytes(3, 0, 0, 0, "Asset/");
        assert_eq!(read_header(&mut ByteReader::new(&bytes)).unwrap().prefix, "Asset/");
    }

    #[test]
    fn only_low_flag_bit_means_compress() {
        let bytes = header_bytes(2, 0xFE, 0, 0, "");
        assert!(!read_header(&mut ByteReader::new(&bytes)).unwrap().compress);
    }

    #[test]
    fn bad_versions_are_fatal() {
        for v in [0u8, 5, 255] {
            let bytes = header_bytes(v, 0, 0, 0, "");
            assert!(matches!(
                read_header(&mut ByteReader::new(&bytes)),
                Err(JabError::UnsupportedVersion { version, .. }) if version == v
            ));
        }
    }

    #[test]
    fn child_count_guardrail() {
        let bytes = header_bytes(2, 0, 0, MAX_CHILDREN + 1, "");
        assert!(matches!(
            read_header(&mut ByteReader::new(&bytes)),
            Err(JabError::TooManyChildren { count }) if count == MAX_CHILDREN + 1
        ));
    }

    #[test]
    fn children_reuse_pre_suffix_core() {
        let mut bytes = header_bytes(3, 0, 0, 3, "Asset");
        push_child(&mut bytes, &Child { size: 4, ..child(0, 1, "ui/Foo") });
        // Reuses "ui/" from the core "ui/Foo", not from "ui/Foo.asset".
        push_child(&mut bytes, &Child { size: 5, ..child(3, 5, "Bar") });
        push_child(&mut bytes, &Child { size: 6, time: 2.5, ..child(6, 0, "x") });

        let (res, diag) = parse(&bytes, ChildValidation::Fail);
        let archive = res.unwrap();
        let paths: Vec<_> = archive.children.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["Asset/ui/Foo.asset", "Asset/ui/Bar.manifest", "Asset/ui/Barx"]);
        assert_eq!(archive.children[1].unc_size, 5);
        assert_eq!(archive.children[2].time, 2.5);
        assert_eq!(archive.children[0].jab_name, "t.jab");
        assert!(diag.is_empty());
    }

    #[test]
    fn crc_only_for_v4_asset_entries() {
        let mut bytes = header_bytes(4, 1, 0, 2, "");
        push_child(
            &mut bytes,
            &Child {
                size: 3,
                unc_size: Some(9),
                crc: Some(0xDEAD_BEEF),
                ..child(0, 1, "a")
            },
        );
        push_child(
            &mut bytes,
            &Child {
                size: 3,
                unc_size: Some(3),
                ..child(0, 2, "b")
            },
        );

        let (res, _) = parse(&bytes, ChildValidation::Fail);
        let archive = res.unwrap();
        assert_eq!(archive.children[0].crc, 0xDEAD_BEEF);
        assert_eq!(archive.children[0].unc_size, 9);
        assert_eq!(archive.children[1].path, "b.asset.manifest");
        assert_eq!(archive.children[1].crc, 0);
    }

    #[test]
    fn v3_asset_entries_have_no_crc() {
        let mut bytes = header_bytes(3, 0, 0, 1, "");
        push_child(&mut bytes, &Child { size: 1, ..child(0, 1, "a") });
        let (res, _) = parse(&bytes, ChildValidation::Fail);
        assert_eq!(res.unwrap().children[0].crc, 0);
    }

    #[test]
    fn prefix_overflow_is_clamped() {
        let mut bytes = header_bytes(2, 0, 0, 2, "");
        push_child(&mut bytes, &Child { size: 1, ..child(0, 0, "ab") });
        push_child(&mut bytes, &Child { size: 1, ..child(200, 0, "c") });
        let (res, diag) = parse(&bytes, ChildValidation::Fail);
        assert_eq!(res.unwrap().children[1].path, "abc");
        assert!(matches!(
            diag.warnings[0],
            Warning::PrefixOverflow { requested: 200, available: 2, .. }
        ));
    }

    #[test]
    fn invalid_child_policies() {
        let mut bytes = header_bytes(2, 0, 0, 2, "");
        push_child(&mut bytes, &Child { size: 1, ..child(0, 0, "ok") });
        push_child(&mut bytes, &Child { size: -1, ..child(0, 0, "neg") });

        let (res, _) = parse(&bytes, ChildValidation::Fail);
        assert!(matches!(res, Err(JabError::InvalidEntry { index: 1, .. })));

        let (res, diag) = parse(&bytes, ChildValidation::Stop);
        assert_eq!(res.unwrap().children.len(), 1);
        assert!(matches!(diag.warnings[0], Warning::InvalidChildSkipped { index: 1, .. }));

        let (res, _) = parse(&bytes, ChildValidation::Accept);
        assert_eq!(res.unwrap().children.len(), 2);
    }

    #[test]
    fn truncated_child_table_is_fatal() {
        let mut bytes = header_bytes(2, 0, 0, 2, "");
        push_child(&mut bytes, &Child { size: 1, ..child(0, 0, "ok") });
        let (res, _) = parse(&bytes, ChildValidation::Accept);
        assert!(matches!(res, Err(JabError::Truncated { .. })));
    }

    #[test]
    fn new_header_resets_rolling_path() {
        let mut bytes = header_bytes(2, 0, 0, 1, "");
        push_child(&mut bytes, &Child { size: 1, ..child(0, 0, "first/long") });
        bytes.extend(header_bytes(2, 0, 0, 1, ""));
        push_child(&mut bytes, &Child { size: 1, ..child(3, 0, "z") });

        let mut diag = CollectedDiagnostics::new();
        let mut reader = JabReader::embedded();
        let mut r = ByteReader::new(&bytes);
        reader.read_archive(&mut r, "a", &mut diag).unwrap();
        let second = reader.read_archive(&mut r, "b", &mut diag).unwrap();
        assert_eq!(second.children[0].path, "z");
        assert_eq!(diag.warnings.len(), 1);
    }
}
