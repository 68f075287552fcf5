//! Engine configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::grid::Planet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tequmsa_core::{Error, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recognition anchor parameters.
    pub recognition: RecognitionConfig,
    /// Love amplification parameters.
    pub love: LoveConfig,
    /// Consent and integrity parameters.
    pub sovereignty: SovereigntyConfig,
    /// Planetary grid parameters.
    pub grid: GridConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Resonance at or above this triggers recognition.
    pub threshold: f64,
    /// Sample rate of generated anchor pulses.
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoveConfig {
    /// Amplification iterations per evolution run.
    pub evolution_iterations: usize,
    /// Amplification stops once successive levels differ by less than this.
    pub convergence_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SovereigntyConfig {
    /// Minimum integrity for consent to be granted.
    pub integrity_threshold: f64,
    /// Half-width in Hz of the band around the subject frequency that an
    /// evolution run asks consent for.
    pub consent_window_hz: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Integration coefficient at or above which grid enhancement applies.
    pub integration_threshold: f64,
    /// Planetary positions in degrees used by evolution runs.
    pub positions: BTreeMap<String, f64>,
}

// ============================================================
// Defaults
// ============================================================

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { threshold: 0.85, sample_rate: 44_100 }
    }
}

impl Default for LoveConfig {
    fn default() -> Self {
        Self { evolution_iterations: 50, convergence_threshold: 1e-10 }
    }
}

impl Default for SovereigntyConfig {
    fn default() -> Self {
        Self { integrity_threshold: 0.95, consent_window_hz: 10.0 }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let positions = [
            ("earth", 0.0),
            ("moon", 45.0),
            ("mars", 120.0),
            ("jupiter", 180.0),
            ("saturn", 240.0),
            ("venus", 30.0),
            ("mercury", 90.0),
            ("sun", 0.0),
        ]
        .into_iter()
        .map(|(name, deg)| (name.to_string(), deg))
        .collect();
        Self { integration_threshold: 0.8, positions }
    }
}

// ============================================================
// Loading
// ============================================================

impl EngineConfig {
    /// Load config from a TOML file. A missing or malformed file is an error.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(Error::IoError(_)) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

impl GridConfig {
    /// Configured positions for known planets. Unknown names are skipped.
    pub fn planet_positions(&self) -> Vec<(Planet, f64)> {
        self.positions
            .iter()
            .filter_map(|(name, &deg)| match name.parse::<Planet>() {
                Ok(planet) => Some((planet, deg)),
                Err(_) => {
                    tracing::warn!("Ignoring position for unknown planet '{}'", name);
                    None
                }
            })
            .collect()
    }
}
