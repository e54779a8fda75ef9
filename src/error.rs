#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JabError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is empty")]
    EmptyInput,

    #[error("unsupported {format} version {version} (expected {min}..={max})")]
    UnsupportedVersion {
        format: &'static str,
        version: u8,
        min: u8,
        max: u8,
    },

    #[error("truncated input reading {what}: need {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("child count {count} exceeds the 100000 entry guardrail")]
    TooManyChildren { count: u32 },

    #[error("invalid child entry {index} (path {path:?}, size {size})")]
    InvalidEntry { index: u32, path: String, size: i32 },

    #[error("unknown GMF tag {tag} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("unsupported GMF tag {tag} at offset {offset}")]
    UnsupportedTag { tag: u8, offset: usize },

    #[error("GMF nesting deeper than {depth} levels at offset {offset}")]
    NestingTooDeep { depth: usize, offset: usize },

    #[error("negative {what} length {length}")]
    NegativeLength { what: &'static str, length: i32 },

    #[error("data offset {offset} for {path} is outside the input ({input_len} bytes)")]
    OffsetOutOfRange {
        path: String,
        offset: u64,
        input_len: usize,
    },

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("hotfix metadata is not a GMF object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no .jab files found in {dir}")]
    NoArchives { dir: String },
}

pub type JabResult<T> = Result<T, JabError>;
