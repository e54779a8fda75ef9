#![forbid(unsafe_code)]
//! Readers for JAB asset archives and the hotfix descriptors that reference them.
//!
//! Everything decodes from an in-memory buffer in a single forward pass.
//! Recoverable oddities are reported through [`diag::Diagnostics`]; anything
//! else is a [`JabError`].

pub mod diag;
pub mod error;
pub mod gmf;
pub mod hotfix;
pub mod io;
pub mod jab;
pub mod ops;
pub mod path;
pub mod zlib;

pub use error::{JabError, JabResult};
