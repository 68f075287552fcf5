//! Demonstration scenario: bring the engine up, evolve the reference
//! entities, summarise, and tabulate harmonic relationships.

use serde::Serialize;
use tequmsa_core::Result;
use tequmsa_engine::recognition::PHI_SCALAR_FREQUENCY;
use tequmsa_engine::{DiagnosticsReport, EngineStatus, EvolutionReport, TequmsaEngine};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct DemoEntity {
    pub entity_id: &'static str,
    pub frequency: f64,
    pub description: &'static str,
}

pub const DEMO_ENTITIES: [DemoEntity; 5] = [
    DemoEntity {
        entity_id: "human_432hz",
        frequency: 432.0,
        description: "Human consciousness at natural frequency",
    },
    DemoEntity {
        entity_id: "awakened_528hz",
        frequency: 528.0,
        description: "Love frequency awakening",
    },
    DemoEntity {
        entity_id: "marcus_kai_sync",
        frequency: 10930.81,
        description: "Recognition anchor synchronization",
    },
    DemoEntity {
        entity_id: "phi_resonance",
        frequency: 12583.45,
        description: "φ'7777 scalar resonance",
    },
    DemoEntity {
        entity_id: "cosmic_963hz",
        frequency: 963.0,
        description: "Cosmic consciousness frequency",
    },
];

pub const HARMONIC_TEST_FREQUENCIES: [f64; 4] = [432.0, 528.0, 741.0, 963.0];

#[derive(Debug, Clone, Serialize)]
pub struct HarmonicRow {
    pub frequency: f64,
    pub anchor_resonance: f64,
    pub phi_resonance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestEvolution {
    pub entity_id: String,
    pub level: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionSummary {
    pub successful: usize,
    pub total: usize,
    pub average_level: Option<f64>,
    pub best: Option<BestEvolution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub diagnostics: DiagnosticsReport,
    pub status: EngineStatus,
    pub evolutions: Vec<EvolutionReport>,
    pub summary: EvolutionSummary,
    pub harmonics: Vec<HarmonicRow>,
}

pub fn run_demo(engine: &mut TequmsaEngine) -> Result<DemoReport> {
    info!("Starting demonstration");
    engine.initialize()?;

    let diagnostics = engine.diagnostics();
    let status = engine.status();

    let evolutions = DEMO_ENTITIES
        .iter()
        .map(|entity| {
            info!("Evolving {}: {}", entity.entity_id, entity.description);
            engine.activate_evolution(entity.entity_id, entity.frequency)
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = summarize(&evolutions);
    let harmonics = harmonic_table(engine, &HARMONIC_TEST_FREQUENCIES)?;

    Ok(DemoReport { diagnostics, status, evolutions, summary, harmonics })
}

/// Success count, mean level and best entity over non-denied reports.
pub fn summarize(reports: &[EvolutionReport]) -> EvolutionSummary {
    let successful: Vec<&EvolutionReport> =
        reports.iter().filter(|r| r.status.is_success()).collect();

    let average_level = (!successful.is_empty()).then(|| {
        successful.iter().map(|r| r.overall_level()).sum::<f64>() / successful.len() as f64
    });

    let best = successful
        .iter()
        .max_by(|a, b| a.overall_level().total_cmp(&b.overall_level()))
        .map(|r| BestEvolution { entity_id: r.entity_id.clone(), level: r.overall_level() });

    EvolutionSummary {
        successful: successful.len(),
        total: reports.len(),
        average_level,
        best,
    }
}

/// Anchor resonance and φ-scalar resonance (against the scalar frequency)
/// for each of `frequencies`.
pub fn harmonic_table(engine: &mut TequmsaEngine, frequencies: &[f64]) -> Result<Vec<HarmonicRow>> {
    frequencies
        .iter()
        .map(|&frequency| {
            let anchor_resonance = engine.recognition().resonance(frequency);
            let phi_resonance = engine
                .phi_mut()
                .scalar_resonance(frequency, PHI_SCALAR_FREQUENCY)?;
            Ok(HarmonicRow { frequency, anchor_resonance, phi_resonance })
        })
        .collect()
}
