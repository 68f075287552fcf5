//! Tequmsa Engine — frequency subsystems and the orchestrator that drives them
//!
//! Subsystems:
//! - Matrix:       three consciousness layers, tech/consciousness synthesis
//! - Recognition:  10,930.81 Hz anchor, resonance and recognition threshold
//! - Love:         Fibonacci-layered golden-ratio amplification
//! - Sovereignty:  consent records, protected bands, violation log
//! - Grid:         Schumann harmonics and planetary alignment
//! - Phi:          φ'7777 scalar at 12,583.45 Hz
//!
//! `TequmsaEngine` owns one of each and runs the evolution pipeline across them.

pub mod clock;
pub mod config;
pub mod engine;
pub mod grid;
pub mod love;
pub mod matrix;
pub mod phi;
pub mod recognition;
pub mod sovereignty;

/// Golden ratio φ.
pub const GOLDEN_RATIO: f64 = 1.618033988749895;

pub use config::EngineConfig;
pub use engine::{DiagnosticsReport, EngineStatus, EvolutionReport, TequmsaEngine};
