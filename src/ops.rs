#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diag::TracingDiagnostics;
use crate::error::{JabError, JabResult};
use crate::hotfix::{self, HotfixDescriptor};
use crate::jab::{self, ExtractReport, JabArchive};
use crate::path::{archive_name, normalize_decode_dir};
use crate::zlib::Zlib;

/// Extension of the metadata written next to an archive.
pub const META_EXTENSION: &str = "jabmeta.json";

fn read_input(path: &Path) -> JabResult<Vec<u8>> {
    let data = std::fs::read(path)?;
    if data.is_empty() {
        return Err(JabError::EmptyInput);
    }
    Ok(data)
}

fn name_of(path: &Path) -> String {
    archive_name(&path.to_string_lossy())
}

/// Reads archive metadata without extracting payloads.
pub fn inspect(path: &Path) -> JabResult<JabArchive> {
    let data = read_input(path)?;
    JabArchive::inspect(&data, &name_of(path), &mut TracingDiagnostics)
}

pub fn write_json<T: serde::Serialize>(value: &T, out: &Path) -> JabResult<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(out, json)?;
    Ok(())
}

/// Extracts every entry of the archive at `path` below `out_dir`.
///
/// `jobs` bounds the worker pool; 0 uses rayon's default.
pub fn extract(path: &Path, out_dir: &Path, jobs: usize) -> JabResult<ExtractReport> {
    let data = read_input(path)?;
    let mut diag = TracingDiagnostics;
    let archive = JabArchive::parse(&data, &name_of(path), &mut diag)?;
    let root = normalize_decode_dir(out_dir, &archive.header.prefix);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| JabError::Io(std::io::Error::other(e)))?;
    pool.install(|| jab::extract(&data, &archive, &root, &Zlib, &mut diag))
}

/// All `*.jab` files below `dir`, sorted.
pub fn find_archives(dir: &Path) -> JabResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for ent in WalkDir::new(dir).follow_links(false) {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other(msg));
            JabError::Io(io)
        })?;
        if !ent.file_type().is_file() {
            continue;
        }
        let is_jab = ent
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jab"));
        if is_jab {
            out.push(ent.path().to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}

/// Summary of a `jab` run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JabRunSummary {
    pub processed: usize,
    pub failed: Vec<PathBuf>,
    pub metadata: Vec<PathBuf>,
    pub files_extracted: usize,
}

/// Handles one archive or a directory of archives.
///
/// Without `extract_to`, metadata JSON is written (to `json_out`, or next to
/// the archive). With it, entries are extracted and metadata is only written
/// for a single file when `json_out` is given. In directory mode a failing
/// archive is logged and skipped.
pub fn run_jab(
    input: &Path,
    extract_to: Option<&Path>,
    json_out: Option<&Path>,
    jobs: usize,
) -> JabResult<JabRunSummary> {
    let mut summary = JabRunSummary::default();

    if input.is_dir() {
        let archives = find_archives(input)?;
        if archives.is_empty() {
            return Err(JabError::NoArchives {
                dir: input.display().to_string(),
            });
        }
        for path in archives {
            tracing::info!("processing {}", path.display());
            match process_one(&path, extract_to, None, jobs, extract_to.is_none()) {
                Ok(one) => {
                    summary.processed += 1;
                    summary.metadata.extend(one.metadata);
                    summary.files_extracted += one.files_extracted;
                }
                Err(e) => {
                    tracing::error!("{}: {e}", path.display());
                    summary.failed.push(path);
                }
            }
        }
        return Ok(summary);
    }

    let write_meta = extract_to.is_none() || json_out.is_some();
    let one = process_one(input, extract_to, json_out, jobs, write_meta)?;
    summary.processed = 1;
    summary.metadata = one.metadata;
    summary.files_extracted = one.files_extracted;
    Ok(summary)
}

fn process_one(
    path: &Path,
    extract_to: Option<&Path>,
    json_out: Option<&Path>,
    jobs: usize,
    write_meta: bool,
) -> JabResult<JabRunSummary> {
    let mut summary = JabRunSummary::default();
    let info = inspect(path)?;

    if write_meta {
        let meta_path = json_out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.with_extension(META_EXTENSION));
        write_json(&info, &meta_path)?;
        tracing::info!("metadata saved to {}", meta_path.display());
        summary.metadata.push(meta_path);
    }

    if let Some(out_dir) = extract_to {
        let report = extract(path, out_dir, jobs)?;
        summary.files_extracted = report.files_written;
        tracing::info!("extraction completed in {}", out_dir.display());
    }
    Ok(summary)
}

/// Decodes an outer hotfix container and writes it as JSON next to `output`
/// (extension forced to `.json`).
pub fn run_hotfix(input: &Path, output: &Path) -> JabResult<(HotfixDescriptor, PathBuf)> {
    let raw = read_input(input)?;
    let desc = hotfix::decode_container(&raw, &mut TracingDiagnostics)?;
    let out = output.with_extension("json");
    write_json(&desc, &out)?;
    tracing::info!("hotfix descriptor saved to {}", out.display());
    Ok((desc, out))
}
