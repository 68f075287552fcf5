//! tequmsa — command-line front end for the engine and relay.
//!
//! The binary lives in `src/bin/tequmsa.rs`; the demonstration scenario and
//! text rendering live here so they can be tested without spawning it.

pub mod demo;
pub mod format;
