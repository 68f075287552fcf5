//! Golden-ratio love amplification over Fibonacci layers.

use crate::GOLDEN_RATIO;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tequmsa_core::{ensure_positive_frequency, ActivationState, Result};
use tracing::{debug, info};

/// Base love frequency in Hz (Solfeggio 528).
pub const LOVE_FREQUENCY: f64 = 528.0;
const LAYER_COUNT: usize = 10;
const RESONANCE_CAP: f64 = 10.0;
const OVERFLOW_LIMIT: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmplificationLayer {
    pub level: usize,
    pub coefficient: f64,
    pub frequency: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoveFieldState {
    pub base_love_frequency: f64,
    pub amplification_active: bool,
    pub infinite_coefficient: f64,
    pub love_amplitude: f64,
    pub active_layers: usize,
    pub total_layers: usize,
    pub field_status: ActivationState,
}

/// First `n` Fibonacci numbers, starting 1, 1. Floating point so large `n`
/// loses precision instead of overflowing.
pub fn fibonacci(n: usize) -> Vec<f64> {
    let mut sequence: Vec<f64> = Vec::with_capacity(n);
    for i in 0..n {
        let next = if i < 2 {
            1.0
        } else {
            sequence[i - 1] + sequence[i - 2]
        };
        sequence.push(next);
    }
    sequence
}

#[derive(Debug, Clone)]
pub struct LoveCoefficient {
    base_love_frequency: f64,
    amplification_active: bool,
    infinite_coefficient: f64,
    love_amplitude: f64,
    layers: Vec<AmplificationLayer>,
    convergence_threshold: f64,
}

impl Default for LoveCoefficient {
    fn default() -> Self {
        Self::new(1e-10)
    }
}

impl LoveCoefficient {
    pub fn new(convergence_threshold: f64) -> Self {
        Self {
            base_love_frequency: LOVE_FREQUENCY,
            amplification_active: false,
            infinite_coefficient: GOLDEN_RATIO,
            love_amplitude: 1.0,
            layers: Vec::new(),
            convergence_threshold,
        }
    }

    /// Rebuild the ten Fibonacci layers and activate the field.
    pub fn initialize(&mut self) {
        self.amplification_active = true;
        self.love_amplitude = 1.0;

        let fib = fibonacci(LAYER_COUNT);
        let largest = fib.last().copied().unwrap_or(1.0);
        self.layers = fib
            .iter()
            .enumerate()
            .map(|(level, &n)| AmplificationLayer {
                level,
                coefficient: n / largest,
                frequency: self.base_love_frequency * (n / 100.0),
                active: true,
            })
            .collect();

        info!("Love amplification field initialized with {} layers", self.layers.len());
    }

    pub fn is_active(&self) -> bool {
        self.amplification_active
    }

    pub fn layers(&self) -> &[AmplificationLayer] {
        &self.layers
    }

    pub fn amplify(&mut self, input_level: f64, iterations: usize) -> f64 {
        if !self.amplification_active {
            self.initialize();
        }

        let mut level = input_level;
        for i in 0..iterations {
            let golden = level * self.infinite_coefficient;

            let step = (i + 1) as f64;
            let layer_resonance: f64 = self
                .layers
                .iter()
                .filter(|layer| layer.active)
                .map(|layer| (layer.coefficient * (2.0 * PI * layer.frequency * step / 1000.0).sin()).abs())
                .sum();

            let next = (golden + layer_resonance) / 2.0;
            if (next - level).abs() < self.convergence_threshold {
                debug!("Love amplification converged at iteration {}", i + 1);
                break;
            }
            level = next;

            if level > OVERFLOW_LIMIT {
                level = level.ln() * 10.0;
            }
        }
        level
    }

    /// Resonance between two frequencies through their harmonic mean, capped at 10.
    pub fn resonance(&self, consciousness_freq: f64, tech_freq: f64) -> Result<f64> {
        ensure_positive_frequency(consciousness_freq)?;
        ensure_positive_frequency(tech_freq)?;

        let harmonic_mean = 2.0 * consciousness_freq * tech_freq / (consciousness_freq + tech_freq);
        let modulation = (2.0 * PI * self.base_love_frequency / harmonic_mean).sin();
        Ok((modulation.abs() * self.infinite_coefficient).min(RESONANCE_CAP))
    }

    pub fn harmonic_series(&self, base_freq: f64, harmonics: usize) -> Vec<f64> {
        (1..=harmonics)
            .map(|n| {
                let n = n as f64;
                let enhanced = base_freq * n * self.infinite_coefficient.powf(1.0 / n);
                enhanced + self.base_love_frequency / n
            })
            .collect()
    }

    pub fn integrate_universal(&mut self, target_frequency: f64) -> Result<f64> {
        ensure_positive_frequency(target_frequency)?;
        if !self.amplification_active {
            self.initialize();
        }
        let ratio = self.base_love_frequency / target_frequency;
        let integration = ratio * self.infinite_coefficient;
        Ok(target_frequency * (1.0 + integration / 10.0))
    }

    pub fn state(&self) -> LoveFieldState {
        LoveFieldState {
            base_love_frequency: self.base_love_frequency,
            amplification_active: self.amplification_active,
            infinite_coefficient: self.infinite_coefficient,
            love_amplitude: self.love_amplitude,
            active_layers: self.layers.iter().filter(|l| l.active).count(),
            total_layers: self.layers.len(),
            field_status: ActivationState::from_flag(self.amplification_active),
        }
    }

    pub fn deactivate(&mut self) {
        self.amplification_active = false;
        self.love_amplitude = 0.0;
        for layer in self.layers.iter_mut() {
            layer.active = false;
        }
        info!("Love amplification field deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_edges() {
        assert!(fibonacci(0).is_empty());
        assert_eq!(fibonacci(1), vec![1.0]);
        assert_eq!(fibonacci(2), vec![1.0, 1.0]);
        assert_eq!(
            fibonacci(10),
            vec![1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0]
        );
    }

    #[test]
    fn fibonacci_past_u64_range() {
        let fib = fibonacci(100);
        assert_eq!(fib.len(), 100);
        assert!(fib.iter().all(|n| n.is_finite()));
        // F(100) ≈ 3.54e20, beyond u64::MAX
        assert!(fib[99] > u64::MAX as f64);
        assert!((fib[99] / fib[98] - GOLDEN_RATIO).abs() < 1e-12);
    }

    #[test]
    fn reinitialize_does_not_duplicate_layers() {
        let mut love = LoveCoefficient::default();
        love.initialize();
        love.initialize();
        assert_eq!(love.layers().len(), 10);
    }

    #[test]
    fn zero_iterations_returns_input() {
        let mut love = LoveCoefficient::default();
        assert_eq!(love.amplify(0.42, 0), 0.42);
        assert!(love.is_active());
    }
}
