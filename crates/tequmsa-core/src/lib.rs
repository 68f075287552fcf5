//! Tequmsa Core - Types, status enums, and error handling

pub mod error;
pub mod types;

pub use error::{ensure_positive_frequency, Error, Result};
pub use types::*;
