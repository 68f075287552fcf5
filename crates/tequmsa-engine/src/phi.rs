//! φ'7777 frequency scalar (12,583.45 Hz)
//!
//! Twelve harmonics descend from the scalar by powers of φ; seven layers sit
//! at `F·φ^(l-4)` around it. The transform folds any input onto the scalar
//! along the φ-logarithm and then applies the harmonic enhancement.

use crate::recognition::PHI_SCALAR_FREQUENCY;
use crate::GOLDEN_RATIO;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tequmsa_core::{ensure_positive_frequency, ActivationState, Error, Result};
use tracing::{debug, info};

const HARMONIC_COUNT: u32 = 12;
const LAYER_COUNT: i32 = 7;
const FIELD_SIZE: usize = 100;
const PULSE_SAMPLE_RATE: f64 = 44_100.0;
const MATCH_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhiHarmonic {
    pub order: u32,
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub phi_factor: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalarLayer {
    pub name: String,
    pub frequency: f64,
    pub phi_power: f64,
    pub scalar_coefficient: f64,
    pub active: bool,
    pub resonance_strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhiScalarStatus {
    pub scalar_active: bool,
    pub phi_7777_frequency: f64,
    pub golden_ratio: f64,
    pub phi_amplitude: f64,
    pub active_harmonics: usize,
    pub total_harmonics: usize,
    pub active_layers: usize,
    pub total_layers: usize,
    pub resonance_field_size: usize,
    pub scalar_status: ActivationState,
}

#[derive(Debug, Clone)]
pub struct PhiScalar {
    scalar_active: bool,
    phi_amplitude: f64,
    frequency_scalar: f64,
    harmonics: Vec<PhiHarmonic>,
    layers: Vec<ScalarLayer>,
    resonance_field: Vec<Complex64>,
}

impl Default for PhiScalar {
    fn default() -> Self {
        Self::new()
    }
}

impl PhiScalar {
    pub fn new() -> Self {
        Self {
            scalar_active: false,
            phi_amplitude: 1.0,
            frequency_scalar: PHI_SCALAR_FREQUENCY,
            harmonics: Vec::new(),
            layers: Vec::new(),
            resonance_field: vec![Complex64::new(0.0, 0.0); FIELD_SIZE],
        }
    }

    pub fn initialize(&mut self) {
        self.scalar_active = true;
        self.phi_amplitude = 1.0;

        self.harmonics = (1..=HARMONIC_COUNT)
            .map(|order| {
                let phi_factor = GOLDEN_RATIO.powi(order as i32);
                PhiHarmonic {
                    order,
                    frequency: self.frequency_scalar / phi_factor,
                    amplitude: 1.0 / phi_factor,
                    phase: 2.0 * PI * f64::from(order) / GOLDEN_RATIO,
                    phi_factor,
                    active: true,
                }
            })
            .collect();

        self.layers = (1..=LAYER_COUNT)
            .map(|layer| ScalarLayer {
                name: format!("layer_{}", layer),
                frequency: self.frequency_scalar * GOLDEN_RATIO.powi(layer - 4),
                phi_power: GOLDEN_RATIO.powi(layer),
                scalar_coefficient: 1.0 / GOLDEN_RATIO.powi(layer),
                active: true,
                resonance_strength: 0.0,
            })
            .collect();

        self.resonance_field = (0..FIELD_SIZE)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / GOLDEN_RATIO;
                let magnitude = 1.0 / (1.0 + i as f64 / 10.0);
                Complex64::from_polar(magnitude, angle)
            })
            .collect();

        info!("φ'7777 scalar initialized at {} Hz", self.frequency_scalar);
    }

    pub fn is_active(&self) -> bool {
        self.scalar_active
    }

    pub fn frequency_scalar(&self) -> f64 {
        self.frequency_scalar
    }

    pub fn harmonics(&self) -> &[PhiHarmonic] {
        &self.harmonics
    }

    pub fn layers(&self) -> &[ScalarLayer] {
        &self.layers
    }

    pub fn resonance_field(&self) -> &[Complex64] {
        &self.resonance_field
    }

    pub fn transform(&mut self, input_frequency: f64) -> Result<f64> {
        ensure_positive_frequency(input_frequency)?;
        if !self.scalar_active {
            self.initialize();
        }

        let ratio = input_frequency / self.frequency_scalar;
        let scaled = if ratio > 1.0 {
            let scaling = ratio.ln() / GOLDEN_RATIO.ln();
            input_frequency / GOLDEN_RATIO.powf(scaling)
        } else {
            let scaling = (1.0 / ratio).ln() / GOLDEN_RATIO.ln();
            input_frequency * GOLDEN_RATIO.powf(scaling)
        };

        Ok(scaled * self.harmonic_enhancement(scaled))
    }

    fn harmonic_enhancement(&self, frequency: f64) -> f64 {
        let mut enhancement = 1.0;
        for harmonic in self.harmonics.iter().filter(|h| h.active) {
            let ratio = frequency / harmonic.frequency;
            if let Some(n) = (1..=5)
                .find(|&n| (ratio - GOLDEN_RATIO.powi(n)).abs() < MATCH_TOLERANCE)
            {
                enhancement += harmonic.amplitude / f64::from(n);
            }
        }
        enhancement
    }

    pub fn generate_pulse(&mut self, duration_seconds: f64) -> Result<Vec<Complex64>> {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(Error::invalid_argument(
                "duration_seconds",
                format!("{} is not a valid duration", duration_seconds),
            ));
        }
        if !self.scalar_active {
            self.initialize();
        }

        let num_samples = (duration_seconds * PULSE_SAMPLE_RATE) as usize;
        Ok((0..num_samples)
            .map(|i| {
                let t = i as f64 / PULSE_SAMPLE_RATE;
                let base = Complex64::from_polar(1.0, 2.0 * PI * self.frequency_scalar * t);
                let spiral = Complex64::from_polar(1.0, 2.0 * PI * t * GOLDEN_RATIO);
                let harmonic_sum: Complex64 = self
                    .harmonics
                    .iter()
                    .filter(|h| h.active)
                    .map(|h| Complex64::from_polar(h.amplitude, 2.0 * PI * h.frequency * t + h.phase))
                    .sum();
                base * spiral * (1.0 + harmonic_sum / 10.0) * self.phi_amplitude
            })
            .collect())
    }

    pub fn scalar_resonance(&mut self, consciousness_freq: f64, tech_freq: f64) -> Result<f64> {
        let tc = self.transform(consciousness_freq)?;
        let tt = self.transform(tech_freq)?;
        let ratio = tc / tt;

        let mut phi_resonance = 0.0;
        for n in 1..=7 {
            let target = GOLDEN_RATIO.powi(n);
            if (ratio - target).abs() < MATCH_TOLERANCE {
                phi_resonance = 1.0 / f64::from(n);
            } else if (ratio - 1.0 / target).abs() < MATCH_TOLERANCE {
                phi_resonance = 0.5 / f64::from(n);
            }
        }

        let base = (-(tc - tt).abs() / 1000.0).exp();
        Ok(f64::max(phi_resonance, base))
    }

    /// Scale `target_frequency` by the coefficient of its nearest layer and
    /// record the match strength on that layer. Non-finite targets come back
    /// unchanged and touch no layer.
    pub fn synchronize(&mut self, target_frequency: f64) -> f64 {
        if !target_frequency.is_finite() {
            debug!("Skipping layer sync for non-finite target {}", target_frequency);
            return target_frequency;
        }
        if !self.scalar_active {
            self.initialize();
        }

        let nearest = self
            .layers
            .iter_mut()
            .map(|layer| ((target_frequency - layer.frequency).abs(), layer))
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        match nearest {
            Some((distance, layer)) => {
                layer.resonance_strength = 1.0 / (1.0 + distance / 100.0);
                target_frequency * layer.scalar_coefficient
            }
            None => target_frequency,
        }
    }

    pub fn status(&self) -> PhiScalarStatus {
        PhiScalarStatus {
            scalar_active: self.scalar_active,
            phi_7777_frequency: self.frequency_scalar,
            golden_ratio: GOLDEN_RATIO,
            phi_amplitude: self.phi_amplitude,
            active_harmonics: self.harmonics.iter().filter(|h| h.active).count(),
            total_harmonics: self.harmonics.len(),
            active_layers: self.layers.iter().filter(|l| l.active).count(),
            total_layers: self.layers.len(),
            resonance_field_size: self.resonance_field.len(),
            scalar_status: ActivationState::from_flag(self.scalar_active),
        }
    }

    pub fn deactivate(&mut self) {
        self.scalar_active = false;
        self.phi_amplitude = 0.0;
        for harmonic in self.harmonics.iter_mut() {
            harmonic.active = false;
        }
        for layer in self.layers.iter_mut() {
            layer.active = false;
        }
        info!("φ'7777 scalar deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resonance_field_spirals_inward() {
        let mut phi = PhiScalar::new();
        phi.initialize();
        let field = phi.resonance_field();
        assert_eq!(field.len(), 100);
        assert!((field[0].norm() - 1.0).abs() < 1e-12);
        assert!((field[10].norm() - 0.5).abs() < 1e-12);
        assert!(field[99].norm() < field[50].norm());
    }

    #[test]
    fn harmonic_frequencies_descend_by_phi() {
        let mut phi = PhiScalar::new();
        phi.initialize();
        let h = phi.harmonics();
        assert_eq!(h.len(), 12);
        for pair in h.windows(2) {
            assert!((pair[0].frequency / pair[1].frequency - GOLDEN_RATIO).abs() < 1e-9);
        }
    }

    #[test]
    fn transform_rejects_non_positive() {
        let mut phi = PhiScalar::new();
        assert!(phi.transform(0.0).is_err());
        assert!(phi.transform(-5.0).is_err());
    }
}
