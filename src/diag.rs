#![forbid(unsafe_code)]

//! Non-fatal decode conditions and the sink they are reported through.

use std::fmt;

/// Something odd in the input that the decoders recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A delta path asked to reuse more characters than the previous path has.
    PrefixOverflow {
        section: String,
        index: usize,
        requested: u8,
        available: usize,
    },
    UnknownSuffix {
        section: String,
        code: u8,
        index: usize,
    },
    UncompressedSizeMismatch {
        path: String,
        expected: i32,
        actual: usize,
    },
    /// Inflating a child failed and its raw bytes were written instead.
    DecompressionFallback { path: String, reason: String },
    InvalidChildSkipped { index: u32, path: String, size: i32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PrefixOverflow {
                section,
                index,
                requested,
                available,
            } => write!(
                f,
                "{section}: prefix overflow {requested} > {available} at entry {index}, clamping"
            ),
            Warning::UnknownSuffix {
                section,
                code,
                index,
            } => write!(f, "{section}: unknown suffix type {code} at entry {index}"),
            Warning::UncompressedSizeMismatch {
                path,
                expected,
                actual,
            } => write!(
                f,
                "{path}: uncompressed size expected {expected}, obtained {actual}"
            ),
            Warning::DecompressionFallback { path, reason } => {
                write!(f, "decompression failed for {path}, saving raw data: {reason}")
            }
            Warning::InvalidChildSkipped { index, path, size } => write!(
                f,
                "child {index} not valid (path {path:?}, size {size}), stopping"
            ),
        }
    }
}

/// Receiver for [`Warning`]s, passed explicitly to every decoder.
pub trait Diagnostics {
    fn warn(&mut self, warning: Warning);
}

/// Forwards every warning to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
    }
}

/// Keeps warnings around for the caller, still logging them at debug level.
#[derive(Debug, Default, Clone)]
pub struct CollectedDiagnostics {
    pub warnings: Vec<Warning>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn warn(&mut self, warning: Warning) {
        tracing::debug!("{warning}");
        self.warnings.push(warning);
    }
}
