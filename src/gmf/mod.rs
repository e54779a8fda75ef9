#![forbid(unsafe_code)]

//! GMF: the tagged binary value encoding used for hotfix metadata.

mod decode;
mod value;

pub use decode::{decode, decode_slice};
pub use value::DynamicValue;
