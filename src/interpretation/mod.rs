//! Curve interpretation
//!
//! Three layers over one curve and an inclusive depth window:
//! 1. extraction: curve lookup, range query, null filtering
//! 2. generic statistics and their sentences ([`statistics`])
//! 3. mnemonic-specific heuristics ([`rules`])

mod engine;
pub mod rules;
pub mod statistics;

pub use engine::{interpret_values, InterpretError, InterpretationEngine};
