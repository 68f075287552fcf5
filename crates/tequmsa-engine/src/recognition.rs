//! The 10,930.81 Hz recognition anchor.
//!
//! Resonance against the anchor combines an exact-harmonic match (within 1 Hz
//! of `anchor × h`, h = 1..9, scoring `1/h`) with a smooth falloff
//! `ratio · exp(-|Δf| / 1000)`. Recognition triggers when resonance reaches
//! the configured threshold.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tequmsa_core::{ActivationState, Error, Result};
use tracing::{debug, info};

/// Anchor frequency in Hz.
pub const ANCHOR_FREQUENCY: f64 = 10930.81;
/// φ'7777 scalar frequency in Hz, reported alongside the anchor.
pub const PHI_SCALAR_FREQUENCY: f64 = 12583.45;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_RECOGNITION_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarmonicResonator {
    pub frequency: f64,
    pub amplitude: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorStatus {
    pub anchor_frequency: f64,
    pub pulse_active: bool,
    pub recognition_threshold: f64,
    pub pulse_amplitude: f64,
    pub harmonic_resonators: usize,
    pub system_status: ActivationState,
}

/// Constant reading of the universal recognition pulse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniversalPulse {
    pub frequency: f64,
    pub phi_scalar: f64,
    pub status: String,
}

pub fn universal_pulse() -> UniversalPulse {
    UniversalPulse {
        frequency: ANCHOR_FREQUENCY,
        phi_scalar: PHI_SCALAR_FREQUENCY,
        status: "ETERNAL_LOCK".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct RecognitionPulse {
    anchor_frequency: f64,
    pulse_active: bool,
    recognition_threshold: f64,
    pulse_amplitude: f64,
    sample_rate: u32,
    resonators: Vec<HarmonicResonator>,
}

impl Default for RecognitionPulse {
    fn default() -> Self {
        Self::new(DEFAULT_RECOGNITION_THRESHOLD, DEFAULT_SAMPLE_RATE)
    }
}

impl RecognitionPulse {
    pub fn new(recognition_threshold: f64, sample_rate: u32) -> Self {
        Self {
            anchor_frequency: ANCHOR_FREQUENCY,
            pulse_active: false,
            recognition_threshold,
            pulse_amplitude: 1.0,
            sample_rate,
            resonators: Vec::new(),
        }
    }

    pub fn activate(&mut self) {
        self.pulse_active = true;
        self.pulse_amplitude = 1.0;
        info!("Recognition anchor activated at {} Hz", self.anchor_frequency);
    }

    pub fn is_active(&self) -> bool {
        self.pulse_active
    }

    pub fn anchor_frequency(&self) -> f64 {
        self.anchor_frequency
    }

    pub fn resonators(&self) -> &[HarmonicResonator] {
        &self.resonators
    }

    /// Anchor tone plus its 2nd-5th harmonics at `1/h` weight.
    pub fn generate_pulse(&mut self, duration_seconds: f64) -> Result<Vec<f64>> {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(Error::invalid_argument(
                "duration_seconds",
                format!("{} is not a valid duration", duration_seconds),
            ));
        }
        if !self.pulse_active {
            self.activate();
        }

        let rate = f64::from(self.sample_rate);
        let num_samples = (duration_seconds * rate) as usize;
        let omega = 2.0 * PI * self.anchor_frequency;

        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f64 / rate;
                let fundamental = self.pulse_amplitude * (omega * t).sin();
                let overtones: f64 = (2..6u32)
                    .map(|h| {
                        let h = f64::from(h);
                        (1.0 / h) * (omega * h * t).sin()
                    })
                    .sum();
                fundamental + overtones
            })
            .collect();
        Ok(samples)
    }

    /// Resonance coefficient with the anchor; 0.0 while the anchor is inactive.
    pub fn resonance(&self, input_frequency: f64) -> f64 {
        if !self.pulse_active {
            return 0.0;
        }
        let anchor = self.anchor_frequency;

        let harmonic = (1..10u32)
            .map(f64::from)
            .filter(|h| (input_frequency - anchor * h).abs() < 1.0)
            .map(|h| 1.0 / h)
            .fold(0.0, f64::max);

        let hi = input_frequency.max(anchor);
        let ratio = if hi == 0.0 { 0.0 } else { input_frequency.min(anchor) / hi };
        let base = ratio * (-(input_frequency - anchor).abs() / 1000.0).exp();

        harmonic.max(base)
    }

    pub fn trigger_recognition(&self, subject_frequency: f64) -> bool {
        let resonance = self.resonance(subject_frequency);
        if resonance >= self.recognition_threshold {
            info!("Recognition triggered: resonance {:.3}", resonance);
            true
        } else {
            debug!("Recognition threshold not met: resonance {:.3}", resonance);
            false
        }
    }

    pub fn add_resonator(&mut self, frequency: f64, amplitude: f64) {
        self.resonators.push(HarmonicResonator {
            frequency,
            amplitude,
            active: true,
        });
        debug!("Harmonic resonator added at {} Hz", frequency);
    }

    pub fn status(&self) -> AnchorStatus {
        AnchorStatus {
            anchor_frequency: self.anchor_frequency,
            pulse_active: self.pulse_active,
            recognition_threshold: self.recognition_threshold,
            pulse_amplitude: self.pulse_amplitude,
            harmonic_resonators: self.resonators.len(),
            system_status: ActivationState::from_flag(self.pulse_active),
        }
    }

    pub fn deactivate(&mut self) {
        self.pulse_active = false;
        self.pulse_amplitude = 0.0;
        info!("Recognition anchor deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_anchor_has_no_resonance() {
        let pulse = RecognitionPulse::default();
        assert_eq!(pulse.resonance(ANCHOR_FREQUENCY), 0.0);
        assert!(!pulse.trigger_recognition(ANCHOR_FREQUENCY));
    }

    #[test]
    fn zero_frequency_resonance_is_zero() {
        let mut pulse = RecognitionPulse::default();
        pulse.activate();
        assert_eq!(pulse.resonance(0.0), 0.0);
    }

    #[test]
    fn negative_duration_rejected() {
        let mut pulse = RecognitionPulse::default();
        assert!(pulse.generate_pulse(-1.0).is_err());
        assert!(pulse.generate_pulse(f64::NAN).is_err());
    }
}
