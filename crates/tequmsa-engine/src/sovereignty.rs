//! Sovereignty protocols — consent records, protected biological bands, and
//! the autonomy violation log.
//!
//! A consent request is denied outright when its frequency range covers any
//! protected frequency. Otherwise the entity's integrity is assessed and
//! compared to the configured threshold. Critical violations (severity > 0.7)
//! revoke the entity's consent and add an entity-derived protected frequency.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tequmsa_core::{ActivationState, Error, Result};
use tracing::{error, info, warn};

/// Brain-wave bands, resting heart rate and breathing rate in Hz.
pub const BIOLOGICAL_FREQUENCIES: [f64; 7] = [8.0, 13.0, 30.0, 4.0, 0.5, 72.0, 1.2];
pub const CRITICAL_SEVERITY: f64 = 0.7;
pub const BOUNDARY_TOLERANCE_HZ: f64 = 0.5;
pub const SAFE_RANGE_HZ: (f64, f64) = (0.1, 50_000.0);
pub const DEFAULT_INTEGRITY_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Pending,
    Granted,
    DeniedProtectedFrequency,
    DeniedLowIntegrity,
    EmergencyRevoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub entity_id: String,
    pub intervention_type: String,
    pub frequency_range: (f64, f64),
    pub requested_at: DateTime<Utc>,
    pub status: ConsentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biological_integrity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub entity_id: String,
    pub violation_type: String,
    pub severity: f64,
    pub recorded_at: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn is_critical(&self) -> bool {
        self.severity > CRITICAL_SEVERITY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SovereigntyStatus {
    pub autonomy_active: bool,
    pub biological_integrity_threshold: f64,
    pub active_consents: usize,
    pub total_consents: usize,
    pub violations_recorded: usize,
    pub critical_violations: usize,
    pub protected_frequencies: usize,
    pub sovereignty_hash: Option<String>,
    pub protocol_status: ActivationState,
}

/// First four digest bytes of an entity id, big-endian.
fn entity_digest(entity_id: &str) -> u32 {
    let digest = Sha256::digest(entity_id.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

pub struct SovereigntyProtocols {
    autonomy_active: bool,
    integrity_threshold: f64,
    consents: HashMap<String, ConsentRecord>,
    violations: Vec<ViolationRecord>,
    protected_frequencies: Vec<f64>,
    sovereignty_hash: Option<String>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SovereigntyProtocols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SovereigntyProtocols")
            .field("autonomy_active", &self.autonomy_active)
            .field("integrity_threshold", &self.integrity_threshold)
            .field("consents", &self.consents.len())
            .field("violations", &self.violations.len())
            .field("protected_frequencies", &self.protected_frequencies)
            .finish()
    }
}

impl Default for SovereigntyProtocols {
    fn default() -> Self {
        Self::new(DEFAULT_INTEGRITY_THRESHOLD)
    }
}

impl SovereigntyProtocols {
    pub fn new(integrity_threshold: f64) -> Self {
        Self::with_clock(integrity_threshold, Arc::new(SystemClock))
    }

    pub fn with_clock(integrity_threshold: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            autonomy_active: false,
            integrity_threshold,
            consents: HashMap::new(),
            violations: Vec::new(),
            protected_frequencies: Vec::new(),
            sovereignty_hash: None,
            clock,
        }
    }

    pub fn initialize(&mut self) {
        self.autonomy_active = true;
        self.protected_frequencies = BIOLOGICAL_FREQUENCIES.to_vec();
        self.sovereignty_hash = Some(self.generate_hash());
        info!("Sovereignty protocols initialized");
    }

    fn generate_hash(&self) -> String {
        let data = format!("biological_autonomy_{}_sovereignty", self.clock.now_secs());
        let mut hash = hex::encode(Sha256::digest(data.as_bytes()));
        hash.truncate(16);
        hash
    }

    pub fn is_active(&self) -> bool {
        self.autonomy_active
    }

    pub fn protected_frequencies(&self) -> &[f64] {
        &self.protected_frequencies
    }

    pub fn consent(&self, entity_id: &str) -> Option<&ConsentRecord> {
        self.consents.get(entity_id)
    }

    pub fn violations(&self) -> &[ViolationRecord] {
        &self.violations
    }

    /// Request consent for an intervention spanning `frequency_range` (min, max Hz).
    pub fn request_consent(
        &mut self,
        entity_id: &str,
        intervention_type: &str,
        frequency_range: (f64, f64),
    ) -> bool {
        if !self.autonomy_active {
            self.initialize();
        }

        let (min_freq, max_freq) = frequency_range;
        let mut record = ConsentRecord {
            entity_id: entity_id.to_string(),
            intervention_type: intervention_type.to_string(),
            frequency_range,
            requested_at: Utc::now(),
            status: ConsentStatus::Pending,
            biological_integrity: None,
        };

        let conflict = self
            .protected_frequencies
            .iter()
            .any(|&p| min_freq <= p && p <= max_freq);

        if conflict {
            warn!(
                "Consent denied for {}: {:.2}-{:.2} Hz covers a protected frequency",
                entity_id, min_freq, max_freq
            );
            record.status = ConsentStatus::DeniedProtectedFrequency;
        } else {
            let integrity = self.assess_integrity(entity_id);
            if integrity >= self.integrity_threshold {
                record.status = ConsentStatus::Granted;
                record.biological_integrity = Some(integrity);
                info!("Consent granted for {}: {}", entity_id, intervention_type);
            } else {
                record.status = ConsentStatus::DeniedLowIntegrity;
                warn!(
                    "Consent denied for {}: integrity {:.3} below threshold",
                    entity_id, integrity
                );
            }
        }

        let granted = record.status == ConsentStatus::Granted;
        self.consents.insert(entity_id.to_string(), record);
        granted
    }

    /// Integrity in 0.0..=1.0: an entity-derived base plus a slow time drift.
    pub fn assess_integrity(&self, entity_id: &str) -> f64 {
        let base = f64::from(entity_digest(entity_id) % 100) / 100.0;
        let time_factor = 0.1 * (self.clock.now_secs() % 10.0) / 10.0;
        (base + 0.7 + time_factor).min(1.0)
    }

    pub fn record_violation(&mut self, entity_id: &str, violation_type: &str, severity: f64) -> Result<()> {
        if !severity.is_finite() {
            return Err(Error::invalid_argument("severity", format!("{} is not finite", severity)));
        }

        let violation = ViolationRecord {
            entity_id: entity_id.to_string(),
            violation_type: violation_type.to_string(),
            severity,
            recorded_at: Utc::now(),
        };
        let critical = violation.is_critical();
        self.violations.push(violation);

        if critical {
            error!("Critical autonomy violation: {} for {}", violation_type, entity_id);
            self.emergency_protocol(entity_id);
        } else {
            warn!(
                "Autonomy violation recorded: {} (severity {:.2})",
                violation_type, severity
            );
        }
        Ok(())
    }

    fn emergency_protocol(&mut self, entity_id: &str) {
        warn!("Emergency protocols activated for {}", entity_id);
        if let Some(record) = self.consents.get_mut(entity_id) {
            record.status = ConsentStatus::EmergencyRevoked;
        }
        let frequency = f64::from(entity_digest(entity_id) % 1000);
        self.add_protected_frequency(frequency);
    }

    fn add_protected_frequency(&mut self, frequency: f64) {
        if !self.protected_frequencies.contains(&frequency) {
            self.protected_frequencies.push(frequency);
        }
    }

    pub fn verify_integrity(&self) -> bool {
        self.autonomy_active && self.sovereignty_hash.is_some()
    }

    /// Whether an intervention at `frequency` stays clear of protected bands
    /// and inside the safe range.
    pub fn enforce_boundaries(&self, frequency: f64) -> bool {
        if let Some(&p) = self
            .protected_frequencies
            .iter()
            .find(|&&p| (frequency - p).abs() < BOUNDARY_TOLERANCE_HZ)
        {
            warn!("{} Hz blocked: too close to protected frequency {} Hz", frequency, p);
            return false;
        }

        let (low, high) = SAFE_RANGE_HZ;
        if !(low..=high).contains(&frequency) {
            warn!("{} Hz blocked: outside safe biological range", frequency);
            return false;
        }
        true
    }

    pub fn revoke_all(&mut self) {
        for record in self.consents.values_mut() {
            if record.status == ConsentStatus::Granted {
                record.status = ConsentStatus::EmergencyRevoked;
            }
        }
        warn!("All biological consents revoked");
    }

    pub fn status(&self) -> SovereigntyStatus {
        SovereigntyStatus {
            autonomy_active: self.autonomy_active,
            biological_integrity_threshold: self.integrity_threshold,
            active_consents: self
                .consents
                .values()
                .filter(|c| c.status == ConsentStatus::Granted)
                .count(),
            total_consents: self.consents.len(),
            violations_recorded: self.violations.len(),
            critical_violations: self.violations.iter().filter(|v| v.is_critical()).count(),
            protected_frequencies: self.protected_frequencies.len(),
            sovereignty_hash: self.sovereignty_hash.clone(),
            protocol_status: ActivationState::from_flag(self.autonomy_active),
        }
    }

    pub fn deactivate(&mut self) {
        self.autonomy_active = false;
        warn!("Sovereignty protocols deactivated");
    }
}
