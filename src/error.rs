//! Error classification shared by every module
//!
//! Each module owns its own `thiserror` enum. The boundary only needs to know
//! which of three classes an error falls into to pick a response.

use serde::Serialize;

/// Coarse error class used for response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// User-fixable: bad file, bad range, bad request
    InvalidInput,
    /// Requested entity or data does not exist
    NotFound,
    /// Storage or archive failure; opaque to the caller
    Infrastructure,
}

impl ErrorClass {
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Infrastructure => "INTERNAL_ERROR",
        }
    }
}

/// Implemented by every domain error so the API can map it without
/// matching on concrete variants.
pub trait Classify {
    fn class(&self) -> ErrorClass;
}

/// Validate an inclusive depth window.
///
/// Returns the offending bounds in the error message so callers can echo it.
pub fn check_depth_range(min_depth: f64, max_depth: f64) -> Result<(), String> {
    if !min_depth.is_finite() || !max_depth.is_finite() {
        return Err(format!(
            "depth bounds must be finite (min_depth={min_depth}, max_depth={max_depth})"
        ));
    }
    if min_depth > max_depth {
        return Err("min_depth cannot be greater than max_depth.".to_string());
    }
    Ok(())
}
