//! LAS (Log ASCII Standard) well-log format
//!
//! Turns the raw bytes of a LAS 2.0 file into a [`LasDocument`]: header
//! metadata, ordered curve definitions, the depth index and one value column
//! per non-index curve. Null samples come out as `None`.

mod document;
mod parser;

pub use document::{CurveDefinition, HeaderItem, LasDocument, DEFAULT_NULL_VALUE};
pub use parser::{parse_las, LasError};

/// Mnemonics that conventionally name an index curve.
pub const INDEX_MNEMONICS: &[&str] = &["DEPT", "DEPTH", "MD", "TVD", "TIME", "ETIM", "INDEX"];

/// Whether a mnemonic looks like a depth or time index.
pub fn is_index_mnemonic(mnemonic: &str) -> bool {
    INDEX_MNEMONICS
        .iter()
        .any(|m| mnemonic.trim().eq_ignore_ascii_case(m))
}
