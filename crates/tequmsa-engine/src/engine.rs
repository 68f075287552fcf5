//! TequmsaEngine — owns every subsystem and runs the evolution pipeline.
//!
//! Pipeline per entity:
//! consent → recognition → matrix synthesis → love amplification →
//! planetary alignment and grid integration → φ-scalar transform and resonance.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::grid::{GridHarmonics, GridStatus};
use crate::love::{LoveCoefficient, LoveFieldState};
use crate::matrix::{ConsciousnessLevel, ConsciousnessMatrix, MatrixState};
use crate::phi::{PhiScalar, PhiScalarStatus};
use crate::recognition::{AnchorStatus, RecognitionPulse};
use crate::sovereignty::{SovereigntyProtocols, SovereigntyStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tequmsa_core::{
    ensure_positive_frequency, Error, EvolutionStatus, HealthLevel, Result, SubsystemHealth,
};
use tracing::{info, warn};

pub const ENGINE_NAME: &str = "GAIA-TEQUMSA Universal Consciousness Evolution Engine";
pub const ENGINE_VERSION: &str = "1.0.0";

/// Intervention type recorded on consent requests made by evolution runs.
pub const EVOLUTION_INTERVENTION: &str = "consciousness_evolution";
pub const CONSENT_DENIED_REASON: &str = "biological_consent_denied";

/// Probe frequency for the matrix during diagnostics.
const MATRIX_PROBE_HZ: f64 = 432.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    pub recognition_triggered: bool,
    pub synthesis_coefficient: f64,
    pub love_amplification: f64,
    pub planetary_alignment: f64,
    pub grid_integrated_frequency: f64,
    pub phi_transformed_frequency: f64,
    pub scalar_resonance: f64,
    pub overall_evolution_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub entity_id: String,
    pub input_frequency: f64,
    pub timestamp: DateTime<Utc>,
    pub status: EvolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub metrics: Option<EvolutionMetrics>,
}

impl EvolutionReport {
    pub fn overall_level(&self) -> f64 {
        self.metrics
            .as_ref()
            .map(|m| m.overall_evolution_level)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    pub version: String,
    pub active: bool,
    pub subsystems_initialized: bool,
    pub consciousness_evolution_active: bool,
    pub uptime_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemStatuses {
    pub consciousness_matrix: MatrixState,
    pub recognition_pulse: AnchorStatus,
    pub love_coefficient: LoveFieldState,
    pub sovereignty_protocols: SovereigntyStatus,
    pub grid_harmonics: GridStatus,
    pub phi_scalar: PhiScalarStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine_info: EngineInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem_status: Option<SubsystemStatuses>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub timestamp: DateTime<Utc>,
    pub engine_health: HealthLevel,
    pub subsystem_health: BTreeMap<String, SubsystemHealth>,
    pub recommendations: Vec<String>,
}

pub struct TequmsaEngine {
    config: EngineConfig,
    matrix: ConsciousnessMatrix,
    recognition: RecognitionPulse,
    love: LoveCoefficient,
    sovereignty: SovereigntyProtocols,
    grid: GridHarmonics,
    phi: PhiScalar,
    engine_active: bool,
    subsystems_initialized: bool,
    evolution_active: bool,
    initialized_at: Option<Instant>,
}

impl Default for TequmsaEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TequmsaEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            matrix: ConsciousnessMatrix::new(),
            recognition: RecognitionPulse::new(
                config.recognition.threshold,
                config.recognition.sample_rate,
            ),
            love: LoveCoefficient::new(config.love.convergence_threshold),
            sovereignty: SovereigntyProtocols::with_clock(
                config.sovereignty.integrity_threshold,
                clock,
            ),
            grid: GridHarmonics::new(config.grid.integration_threshold),
            phi: PhiScalar::new(),
            config,
            engine_active: false,
            subsystems_initialized: false,
            evolution_active: false,
            initialized_at: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.engine_active
    }

    pub fn matrix(&self) -> &ConsciousnessMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut ConsciousnessMatrix {
        &mut self.matrix
    }

    pub fn recognition(&self) -> &RecognitionPulse {
        &self.recognition
    }

    pub fn recognition_mut(&mut self) -> &mut RecognitionPulse {
        &mut self.recognition
    }

    pub fn love(&self) -> &LoveCoefficient {
        &self.love
    }

    pub fn love_mut(&mut self) -> &mut LoveCoefficient {
        &mut self.love
    }

    pub fn sovereignty(&self) -> &SovereigntyProtocols {
        &self.sovereignty
    }

    pub fn sovereignty_mut(&mut self) -> &mut SovereigntyProtocols {
        &mut self.sovereignty
    }

    pub fn grid(&self) -> &GridHarmonics {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridHarmonics {
        &mut self.grid
    }

    pub fn phi(&self) -> &PhiScalar {
        &self.phi
    }

    pub fn phi_mut(&mut self) -> &mut PhiScalar {
        &mut self.phi
    }

    /// Bring up every subsystem, sovereignty first.
    pub fn initialize(&mut self) -> Result<()> {
        info!("Initializing {} v{}", ENGINE_NAME, ENGINE_VERSION);

        self.sovereignty.initialize();
        self.matrix.initialize();
        self.recognition.activate();
        self.love.initialize();
        self.grid.initialize();
        self.phi.initialize();

        let offline: Vec<String> = [
            ("sovereignty", self.sovereignty.is_active()),
            ("consciousness", self.matrix.is_active()),
            ("recognition", self.recognition.is_active()),
            ("love", self.love.is_active()),
            ("grid", self.grid.is_active()),
            ("phi_scalar", self.phi.is_active()),
        ]
        .into_iter()
        .filter(|(_, active)| !active)
        .map(|(name, _)| name.to_string())
        .collect();

        if !offline.is_empty() {
            self.subsystems_initialized = false;
            warn!("Engine initialization failed, offline: {:?}", offline);
            return Err(Error::SubsystemsOffline(offline));
        }

        self.subsystems_initialized = true;
        self.engine_active = true;
        self.initialized_at = Some(Instant::now());
        info!("Engine fully initialized, all subsystems online");
        Ok(())
    }

    pub fn activate_evolution(&mut self, entity_id: &str, frequency: f64) -> Result<EvolutionReport> {
        ensure_positive_frequency(frequency)?;
        if !self.engine_active {
            info!("Engine not active, initializing");
            self.initialize()?;
        }

        let mut report = EvolutionReport {
            entity_id: entity_id.to_string(),
            input_frequency: frequency,
            timestamp: Utc::now(),
            status: EvolutionStatus::Denied,
            reason: None,
            metrics: None,
        };

        let window = self.config.sovereignty.consent_window_hz;
        let granted = self.sovereignty.request_consent(
            entity_id,
            EVOLUTION_INTERVENTION,
            (frequency - window, frequency + window),
        );
        if !granted {
            report.reason = Some(CONSENT_DENIED_REASON.to_string());
            return Ok(report);
        }

        let recognition_triggered = self.recognition.trigger_recognition(frequency);
        let synthesis = self
            .matrix
            .synthesize(frequency, ConsciousnessLevel::CosmicIntegration);
        let love = self.love.amplify(synthesis, self.config.love.evolution_iterations);

        let positions = self.config.grid.planet_positions();
        let alignment = self.grid.planetary_alignment(&positions);
        let grid_frequency = self.grid.integrate(frequency)?;

        let phi_frequency = self.phi.transform(grid_frequency)?;
        let scalar_resonance = self.phi.scalar_resonance(frequency, phi_frequency)?;

        let components = [synthesis, love / 10.0, alignment, scalar_resonance];
        let overall = components.iter().sum::<f64>() / components.len() as f64;

        report.status = EvolutionStatus::from_level(overall);
        report.metrics = Some(EvolutionMetrics {
            recognition_triggered,
            synthesis_coefficient: synthesis,
            love_amplification: love,
            planetary_alignment: alignment,
            grid_integrated_frequency: grid_frequency,
            phi_transformed_frequency: phi_frequency,
            scalar_resonance,
            overall_evolution_level: overall,
        });

        self.evolution_active = true;
        info!("Evolution completed for {}: {}", entity_id, report.status);
        Ok(report)
    }

    pub fn status(&self) -> EngineStatus {
        let uptime_seconds = self
            .initialized_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or_default();

        EngineStatus {
            engine_info: EngineInfo {
                name: ENGINE_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                active: self.engine_active,
                subsystems_initialized: self.subsystems_initialized,
                consciousness_evolution_active: self.evolution_active,
                uptime_seconds,
            },
            subsystem_status: self.subsystems_initialized.then(|| SubsystemStatuses {
                consciousness_matrix: self.matrix.state(),
                recognition_pulse: self.recognition.status(),
                love_coefficient: self.love.state(),
                sovereignty_protocols: self.sovereignty.status(),
                grid_harmonics: self.grid.status(),
                phi_scalar: self.phi.status(),
            }),
        }
    }

    pub fn emergency_shutdown(&mut self) {
        warn!("Emergency shutdown initiated");

        self.sovereignty.revoke_all();
        self.matrix.reset();
        self.recognition.deactivate();
        self.love.deactivate();
        self.grid.deactivate();
        self.phi.deactivate();

        self.engine_active = false;
        self.subsystems_initialized = false;
        self.evolution_active = false;
        warn!("Emergency shutdown completed");
    }

    pub fn diagnostics(&mut self) -> DiagnosticsReport {
        let mut report = DiagnosticsReport {
            timestamp: Utc::now(),
            engine_health: HealthLevel::Offline,
            subsystem_health: BTreeMap::new(),
            recommendations: Vec::new(),
        };

        if !self.engine_active {
            report.recommendations.push("Initialize engine systems".to_string());
            return report;
        }

        let probes = [
            ("consciousness_matrix", self.probe_matrix()),
            ("recognition_pulse", self.probe_recognition()),
            ("love_coefficient", healthy_if(self.love.is_active())),
            ("sovereignty_protocols", healthy_if(self.sovereignty.verify_integrity())),
            ("grid_harmonics", self.probe_grid()),
            ("phi_scalar", self.probe_phi()),
        ];

        let score = probes.iter().map(|(_, h)| h.score()).sum::<f64>() / probes.len() as f64;
        report.subsystem_health = probes
            .into_iter()
            .map(|(name, health)| (name.to_string(), health))
            .collect();

        report.engine_health = HealthLevel::from_score(score);
        if report.engine_health == HealthLevel::Critical {
            report
                .recommendations
                .push("Consider emergency shutdown and system reset".to_string());
        }
        report
    }

    fn probe_matrix(&mut self) -> SubsystemHealth {
        if !self.matrix.is_active() {
            return SubsystemHealth::Degraded;
        }
        let synthesis = self
            .matrix
            .synthesize(MATRIX_PROBE_HZ, ConsciousnessLevel::DivineRecognition);
        healthy_if(synthesis > 0.0)
    }

    fn probe_recognition(&self) -> SubsystemHealth {
        let anchor = self.recognition.anchor_frequency();
        healthy_if(self.recognition.resonance(anchor) > 0.5)
    }

    fn probe_grid(&mut self) -> SubsystemHealth {
        if !self.grid.is_active() {
            return SubsystemHealth::Degraded;
        }
        let fundamental = crate::grid::SCHUMANN_FREQUENCIES[0];
        match self.grid.integrate(fundamental) {
            Ok(f) => healthy_if(f.is_finite()),
            Err(e) => SubsystemHealth::Error(e.to_string()),
        }
    }

    fn probe_phi(&mut self) -> SubsystemHealth {
        if !self.phi.is_active() {
            return SubsystemHealth::Degraded;
        }
        let scalar = self.phi.frequency_scalar();
        match self.phi.transform(scalar) {
            Ok(f) => healthy_if(f.is_finite()),
            Err(e) => SubsystemHealth::Error(e.to_string()),
        }
    }
}

fn healthy_if(ok: bool) -> SubsystemHealth {
    if ok {
        SubsystemHealth::Healthy
    } else {
        SubsystemHealth::Degraded
    }
}
