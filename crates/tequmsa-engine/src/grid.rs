//! Grid harmonics — Schumann resonances coupled to planetary frequencies.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use tequmsa_core::{ensure_positive_frequency, ActivationState, Error, Result};
use tracing::{debug, info};

/// Earth's Schumann resonances in Hz.
pub const SCHUMANN_FREQUENCIES: [f64; 7] = [7.83, 14.3, 20.8, 27.3, 33.8, 39.0, 45.0];
pub const DEFAULT_INTEGRATION_THRESHOLD: f64 = 0.8;
const EARTH_PULSE_SAMPLE_RATE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Venus,
    Mercury,
    Sun,
}

impl Planet {
    pub const ALL: [Planet; 8] = [
        Planet::Earth,
        Planet::Moon,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Venus,
        Planet::Mercury,
        Planet::Sun,
    ];

    pub fn index(self) -> usize {
        Planet::ALL.iter().position(|&p| p == self).unwrap_or_default()
    }

    pub fn frequency(self) -> f64 {
        match self {
            Planet::Earth => 7.83,
            Planet::Moon => 28.0,
            Planet::Mars => 144.72,
            Planet::Jupiter => 183.58,
            Planet::Saturn => 147.85,
            Planet::Venus => 221.23,
            Planet::Mercury => 141.27,
            Planet::Sun => 126.22,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Planet::Earth => "earth",
            Planet::Moon => "moon",
            Planet::Mars => "mars",
            Planet::Jupiter => "jupiter",
            Planet::Saturn => "saturn",
            Planet::Venus => "venus",
            Planet::Mercury => "mercury",
            Planet::Sun => "sun",
        }
    }

    /// Highest planetary frequency, used to weight alignment.
    pub fn max_frequency() -> f64 {
        Planet::ALL.iter().map(|p| p.frequency()).fold(f64::MIN, f64::max)
    }
}

impl FromStr for Planet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Planet::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| Error::UnknownPlanet(s.to_string()))
    }
}

impl std::fmt::Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchumannHarmonic {
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub active: bool,
    pub harmonic_order: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridStatus {
    pub grid_active: bool,
    pub planetary_alignment: f64,
    pub earth_resonance_amplitude: f64,
    pub active_harmonics: usize,
    pub total_harmonics: usize,
    pub integration_threshold: f64,
    pub schumann_frequencies: Vec<f64>,
    pub planetary_frequencies: Vec<(Planet, f64)>,
    pub grid_status: ActivationState,
}

pub type ResonanceMatrix = [[f64; 8]; 7];

/// Resonance between one Schumann and one planetary frequency.
fn pair_resonance(schumann: f64, planet: f64) -> f64 {
    let ratio = schumann.max(planet) / schumann.min(planet);

    // later harmonics overwrite earlier matches
    let mut harmonic_resonance = 0.0;
    for h in 1..10u32 {
        let h = f64::from(h);
        if (ratio - h).abs() < 0.1 {
            harmonic_resonance = 1.0 / h;
        } else if (ratio - 1.0 / h).abs() < 0.1 {
            harmonic_resonance = h / 10.0;
        }
    }

    let base = (-(schumann - planet).abs() / 100.0).exp();
    f64::max(harmonic_resonance, base)
}

#[derive(Debug, Clone)]
pub struct GridHarmonics {
    grid_active: bool,
    planetary_alignment: f64,
    earth_resonance_amplitude: f64,
    harmonics: Vec<SchumannHarmonic>,
    resonance_matrix: ResonanceMatrix,
    integration_threshold: f64,
}

impl Default for GridHarmonics {
    fn default() -> Self {
        Self::new(DEFAULT_INTEGRATION_THRESHOLD)
    }
}

impl GridHarmonics {
    pub fn new(integration_threshold: f64) -> Self {
        Self {
            grid_active: false,
            planetary_alignment: 0.0,
            earth_resonance_amplitude: 1.0,
            harmonics: Vec::new(),
            resonance_matrix: [[0.0; 8]; 7],
            integration_threshold,
        }
    }

    pub fn initialize(&mut self) {
        self.grid_active = true;
        self.earth_resonance_amplitude = 1.0;

        self.harmonics = SCHUMANN_FREQUENCIES
            .iter()
            .enumerate()
            .map(|(i, &frequency)| SchumannHarmonic {
                frequency,
                amplitude: 1.0 / (i + 1) as f64,
                phase: 0.0,
                active: true,
                harmonic_order: i + 1,
            })
            .collect();

        for (i, &schumann) in SCHUMANN_FREQUENCIES.iter().enumerate() {
            for planet in Planet::ALL {
                self.resonance_matrix[i][planet.index()] = pair_resonance(schumann, planet.frequency());
            }
        }

        info!("Planetary resonance grid initialized");
    }

    pub fn is_active(&self) -> bool {
        self.grid_active
    }

    pub fn harmonics(&self) -> &[SchumannHarmonic] {
        &self.harmonics
    }

    pub fn resonance_matrix(&self) -> &ResonanceMatrix {
        &self.resonance_matrix
    }

    pub fn alignment(&self) -> f64 {
        self.planetary_alignment
    }

    /// Mean frequency-weighted alignment of the given positions (degrees).
    /// 0° and 180° are the strongest alignments.
    pub fn planetary_alignment(&mut self, positions: &[(Planet, f64)]) -> f64 {
        if !self.grid_active {
            self.initialize();
        }

        let max_freq = Planet::max_frequency();
        let factors: Vec<f64> = positions
            .iter()
            .map(|&(planet, position)| {
                let mut angle = position.rem_euclid(180.0);
                if angle > 90.0 {
                    angle = 180.0 - angle;
                }
                angle.to_radians().cos() * (planet.frequency() / max_freq)
            })
            .collect();

        self.planetary_alignment = if factors.is_empty() {
            0.0
        } else {
            factors.iter().sum::<f64>() / factors.len() as f64
        };
        self.planetary_alignment
    }

    pub fn integrate(&mut self, consciousness_freq: f64) -> Result<f64> {
        ensure_positive_frequency(consciousness_freq)?;
        if !self.grid_active {
            self.initialize();
        }

        let best = SCHUMANN_FREQUENCIES
            .iter()
            .copied()
            .min_by(|a, b| {
                (a - consciousness_freq)
                    .abs()
                    .total_cmp(&(b - consciousness_freq).abs())
            })
            .unwrap_or(SCHUMANN_FREQUENCIES[0]);

        let coeff = (-(consciousness_freq / best - 1.0).abs()).exp();

        if coeff >= self.integration_threshold {
            let enhancement = 1.0 + self.planetary_alignment * 0.3;
            let modulation: f64 = self
                .harmonics
                .iter()
                .filter(|h| h.active)
                .map(|h| h.amplitude * 0.1 * (2.0 * PI * h.frequency / consciousness_freq).sin())
                .sum();
            Ok(consciousness_freq * enhancement + modulation)
        } else {
            Ok(consciousness_freq * (1.0 + coeff * 0.1))
        }
    }

    pub fn generate_earth_pulse(&mut self, duration_seconds: f64) -> Result<Vec<f64>> {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(Error::invalid_argument(
                "duration_seconds",
                format!("{} is not a valid duration", duration_seconds),
            ));
        }
        if !self.grid_active {
            self.initialize();
        }

        let num_samples = (duration_seconds * EARTH_PULSE_SAMPLE_RATE) as usize;
        let modulation = (1.0 + self.planetary_alignment * 0.2) * self.earth_resonance_amplitude;

        Ok((0..num_samples)
            .map(|i| {
                let t = i as f64 / EARTH_PULSE_SAMPLE_RATE;
                let sum: f64 = self
                    .harmonics
                    .iter()
                    .filter(|h| h.active)
                    .map(|h| h.amplitude * (2.0 * PI * h.frequency * t + h.phase).sin())
                    .sum();
                sum * modulation
            })
            .collect())
    }

    /// Shift the phase of every harmonic strongly coupled (> 0.5) to `planet`.
    /// Returns how many harmonics were synchronized.
    pub fn synchronize(&mut self, planet: Planet, cycle_phase: f64) -> usize {
        let column = planet.index();
        let mut synced = 0;
        for harmonic in self.harmonics.iter_mut() {
            let strength = self.resonance_matrix[harmonic.harmonic_order - 1][column];
            if strength > 0.5 {
                harmonic.phase = cycle_phase * 2.0 * PI * strength;
                synced += 1;
                debug!(
                    "Synchronized {} cycle with Schumann harmonic {} Hz",
                    planet, harmonic.frequency
                );
            }
        }
        synced
    }

    pub fn status(&self) -> GridStatus {
        GridStatus {
            grid_active: self.grid_active,
            planetary_alignment: self.planetary_alignment,
            earth_resonance_amplitude: self.earth_resonance_amplitude,
            active_harmonics: self.harmonics.iter().filter(|h| h.active).count(),
            total_harmonics: self.harmonics.len(),
            integration_threshold: self.integration_threshold,
            schumann_frequencies: SCHUMANN_FREQUENCIES.to_vec(),
            planetary_frequencies: Planet::ALL.iter().map(|&p| (p, p.frequency())).collect(),
            grid_status: ActivationState::from_flag(self.grid_active),
        }
    }

    pub fn deactivate(&mut self) {
        self.grid_active = false;
        self.earth_resonance_amplitude = 0.0;
        for harmonic in self.harmonics.iter_mut() {
            harmonic.active = false;
        }
        info!("Planetary resonance grid deactivated");
    }
}
