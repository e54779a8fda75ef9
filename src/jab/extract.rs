#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::diag::{Diagnostics, Warning};
use crate::error::{JabError, JabResult};
use crate::jab::format::{ChildEntry, JabArchive};
use crate::path::output_path;
use crate::zlib::Decompressor;

/// Outcome of an extraction pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractReport {
    pub files_written: usize,
    pub bytes_written: u64,
    /// Children whose payload was inflated.
    pub inflated: usize,
    pub warnings: Vec<Warning>,
}

struct ChildOutcome {
    bytes: u64,
    inflated: bool,
    warnings: Vec<Warning>,
}

/// Writes every child of `archive` below `out_dir`.
///
/// `data` is the complete archive file. Children are written in parallel on
/// the current rayon pool. When several children map to the same file only
/// the last one in table order is written; the others are still range
/// checked. An out-of-range offset or a short payload aborts the pass; a
/// payload that fails to inflate is written raw and reported as a warning.
pub fn extract(
    data: &[u8],
    archive: &JabArchive,
    out_dir: &Path,
    inflater: &dyn Decompressor,
    diag: &mut dyn Diagnostics,
) -> JabResult<ExtractReport> {
    std::fs::create_dir_all(out_dir)?;

    let base = archive.header.data_section_offset as u64;
    let targets: Vec<PathBuf> = archive
        .children
        .iter()
        .map(|child| output_path(out_dir, &child.path))
        .collect();
    let mut last_writer = HashMap::with_capacity(targets.len());
    for (i, target) in targets.iter().enumerate() {
        last_writer.insert(target.as_path(), i);
    }

    let outcomes = archive
        .children
        .par_iter()
        .zip(targets.par_iter())
        .enumerate()
        .map(|(i, (child, target))| {
            if last_writer.get(target.as_path()) != Some(&i) {
                tracing::debug!("{} superseded by a later entry", child.path);
                return child_payload(data, base, child).map(|_| None);
            }
            extract_child(data, base, child, target, inflater).map(Some)
        })
        .collect::<JabResult<Vec<_>>>()?;

    let mut report = ExtractReport::default();
    for outcome in outcomes.into_iter().flatten() {
        report.files_written += 1;
        report.bytes_written += outcome.bytes;
        report.inflated += usize::from(outcome.inflated);
        for w in outcome.warnings {
            diag.warn(w.clone());
            report.warnings.push(w);
        }
    }

    tracing::info!(
        "{}: extracted {} files ({} bytes)",
        archive.jab_name,
        report.files_written,
        report.bytes_written
    );
    Ok(report)
}

/// Raw (still compressed) payload of `child`.
pub fn child_payload<'a>(data: &'a [u8], base: u64, child: &ChildEntry) -> JabResult<&'a [u8]> {
    let offset = base + child.data_local_offset as u64;
    if offset > data.len() as u64 {
        return Err(JabError::OffsetOutOfRange {
            path: child.path.clone(),
            offset,
            input_len: data.len(),
        });
    }
    if child.size < 0 {
        return Err(JabError::NegativeLength {
            what: "child payload",
            length: child.size,
        });
    }

    let start = offset as usize;
    let size = child.size as usize;
    let available = data.len() - start;
    if size > available {
        return Err(JabError::Truncated {
            what: "child payload",
            needed: size,
            available,
        });
    }
    Ok(&data[start..start + size])
}

fn extract_child(
    data: &[u8],
    base: u64,
    child: &ChildEntry,
    target: &Path,
    inflater: &dyn Decompressor,
) -> JabResult<ChildOutcome> {
    let raw = child_payload(data, base, child)?;
    let mut warnings = Vec::new();
    let mut inflated = false;

    let bytes: std::borrow::Cow<'_, [u8]> = if child.needs_inflate() {
        match inflater.inflate(raw) {
            Ok(out) => {
                inflated = true;
                if out.len() != child.unc_size as usize {
                    warnings.push(Warning::UncompressedSizeMismatch {
                        path: child.path.clone(),
                        expected: child.unc_size,
                        actual: out.len(),
                    });
                }
                out.into()
            }
            Err(e) => {
                warnings.push(Warning::DecompressionFallback {
                    path: child.path.clone(),
                    reason: e.to_string(),
                });
                raw.into()
            }
        }
    } else {
        raw.into()
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, &bytes)?;
    tracing::debug!(
        "extracted {} size={} unc={}{}",
        child.path,
        child.size,
        child.unc_size,
        if inflated { " [decomp]" } else { "" }
    );

    Ok(ChildOutcome {
        bytes: bytes.len() as u64,
        inflated,
        warnings,
    })
}
