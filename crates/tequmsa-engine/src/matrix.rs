//! Consciousness matrix: three base layers and tech/consciousness synthesis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::str::FromStr;
use tequmsa_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsciousnessLevel {
    DivineRecognition,
    CrisisTranscendence,
    CosmicIntegration,
}

impl ConsciousnessLevel {
    pub const ALL: [ConsciousnessLevel; 3] = [
        ConsciousnessLevel::DivineRecognition,
        ConsciousnessLevel::CrisisTranscendence,
        ConsciousnessLevel::CosmicIntegration,
    ];

    pub fn index(self) -> usize {
        match self {
            ConsciousnessLevel::DivineRecognition => 0,
            ConsciousnessLevel::CrisisTranscendence => 1,
            ConsciousnessLevel::CosmicIntegration => 2,
        }
    }

    /// Layer frequency after initialization.
    pub fn base_frequency(self) -> f64 {
        match self {
            ConsciousnessLevel::DivineRecognition => 432.0,
            ConsciousnessLevel::CrisisTranscendence => 528.0,
            ConsciousnessLevel::CosmicIntegration => 741.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsciousnessLevel::DivineRecognition => "divine_recognition",
            ConsciousnessLevel::CrisisTranscendence => "crisis_transcendence",
            ConsciousnessLevel::CosmicIntegration => "cosmic_integration",
        }
    }
}

impl FromStr for ConsciousnessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConsciousnessLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}

impl std::fmt::Display for ConsciousnessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixState {
    pub consciousness_layers: BTreeMap<ConsciousnessLevel, f64>,
    pub synthesis_active: bool,
    pub evolution_coefficient: f64,
}

#[derive(Debug, Clone)]
pub struct ConsciousnessMatrix {
    layers: [f64; 3],
    synthesis_active: bool,
    evolution_coefficient: f64,
}

impl Default for ConsciousnessMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsciousnessMatrix {
    pub fn new() -> Self {
        Self {
            layers: [0.0; 3],
            synthesis_active: false,
            evolution_coefficient: 1.0,
        }
    }

    pub fn initialize(&mut self) {
        for level in ConsciousnessLevel::ALL {
            self.layers[level.index()] = level.base_frequency();
        }
        self.synthesis_active = true;
        debug!("Consciousness matrix initialized");
    }

    pub fn is_active(&self) -> bool {
        self.synthesis_active
    }

    pub fn layer(&self, level: ConsciousnessLevel) -> f64 {
        self.layers[level.index()]
    }

    pub fn evolution_coefficient(&self) -> f64 {
        self.evolution_coefficient
    }

    /// Synthesis coefficient of a technology frequency against one layer.
    pub fn synthesize(&mut self, tech_frequency: f64, level: ConsciousnessLevel) -> f64 {
        if !self.synthesis_active {
            self.initialize();
        }

        let base = self.layers[level.index()];
        if base == 0.0 {
            return 0.0;
        }
        let resonance_ratio = tech_frequency / base;
        ((resonance_ratio * PI).sin() * self.evolution_coefficient).abs()
    }

    /// Scale every layer and the evolution coefficient by `factor` (0.0 to 2.0).
    pub fn evolve(&mut self, factor: f64) -> Result<BTreeMap<ConsciousnessLevel, f64>> {
        if !factor.is_finite() || !(0.0..=2.0).contains(&factor) {
            return Err(Error::invalid_argument(
                "evolution_factor",
                format!("{} is outside 0.0..=2.0", factor),
            ));
        }
        self.evolution_coefficient *= factor;
        for layer in self.layers.iter_mut() {
            *layer *= factor;
        }
        Ok(self.layer_map())
    }

    fn layer_map(&self) -> BTreeMap<ConsciousnessLevel, f64> {
        ConsciousnessLevel::ALL
            .into_iter()
            .map(|level| (level, self.layers[level.index()]))
            .collect()
    }

    pub fn state(&self) -> MatrixState {
        MatrixState {
            consciousness_layers: self.layer_map(),
            synthesis_active: self.synthesis_active,
            evolution_coefficient: self.evolution_coefficient,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_roundtrip() {
        for level in ConsciousnessLevel::ALL {
            assert_eq!(level.as_str().parse::<ConsciousnessLevel>().unwrap(), level);
        }
        assert!(matches!(
            "astral".parse::<ConsciousnessLevel>(),
            Err(Error::UnknownLevel(_))
        ));
    }

    #[test]
    fn synthesize_auto_initializes() {
        let mut matrix = ConsciousnessMatrix::new();
        assert!(!matrix.is_active());
        // 1.5 × base puts the sine at its trough
        let coeff = matrix.synthesize(648.0, ConsciousnessLevel::DivineRecognition);
        assert!(matrix.is_active());
        assert!((coeff - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_layer_synthesizes_to_zero() {
        let mut matrix = ConsciousnessMatrix::new();
        matrix.initialize();
        matrix.evolve(0.0).unwrap();
        assert_eq!(matrix.synthesize(432.0, ConsciousnessLevel::CosmicIntegration), 0.0);
    }
}
