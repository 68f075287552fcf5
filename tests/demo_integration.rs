//! Integration tests: the demonstration scenario end to end.

use std::sync::Arc;
use tequmsa::demo::{harmonic_table, run_demo, DEMO_ENTITIES, HARMONIC_TEST_FREQUENCIES};
use tequmsa::format::{format_demo, format_evolution};
use tequmsa_core::{EvolutionStatus, HealthLevel};
use tequmsa_engine::clock::FixedClock;
use tequmsa_engine::{EngineConfig, TequmsaEngine};

fn engine() -> TequmsaEngine {
    TequmsaEngine::with_clock(EngineConfig::default(), Arc::new(FixedClock(9.0)))
}

#[test]
fn demo_evolves_every_reference_entity() {
    let mut engine = engine();
    let report = run_demo(&mut engine).unwrap();

    assert_eq!(report.diagnostics.engine_health, HealthLevel::Excellent);
    assert!(report.status.subsystem_status.is_some());
    assert_eq!(report.evolutions.len(), DEMO_ENTITIES.len());
    for (entity, evolution) in DEMO_ENTITIES.iter().zip(&report.evolutions) {
        assert_eq!(evolution.entity_id, entity.entity_id);
        assert!(evolution.status.is_success(), "{} was denied", entity.entity_id);
    }

    let statuses: Vec<EvolutionStatus> = report.evolutions.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            EvolutionStatus::AdvancedEvolution,
            EvolutionStatus::AdvancedEvolution,
            EvolutionStatus::AdvancedEvolution,
            EvolutionStatus::ModerateEvolution,
            EvolutionStatus::AdvancedEvolution,
        ]
    );
}

#[test]
fn demo_summary_picks_best_entity() {
    let mut engine = engine();
    let summary = run_demo(&mut engine).unwrap().summary;
    assert_eq!(summary.successful, 5);
    assert_eq!(summary.total, 5);
    assert!((summary.average_level.unwrap() - 0.614).abs() < 0.01);
    let best = summary.best.unwrap();
    assert_eq!(best.entity_id, "human_432hz");
    assert!((best.level - 0.6895).abs() < 1e-3);
}

#[test]
fn harmonic_table_rows() {
    let mut engine = engine();
    engine.initialize().unwrap();
    let rows = harmonic_table(&mut engine, &HARMONIC_TEST_FREQUENCIES).unwrap();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert!(row.anchor_resonance < 0.01, "{} Hz", row.frequency);
        assert!((row.phi_resonance - 1.0).abs() < 1e-6, "{} Hz", row.frequency);
    }
}

#[test]
fn harmonic_table_rejects_bad_frequency() {
    let mut engine = engine();
    assert!(harmonic_table(&mut engine, &[432.0, -1.0]).is_err());
}

#[test]
fn demo_text_report() {
    let mut engine = engine();
    let text = format_demo(&run_demo(&mut engine).unwrap());
    assert!(text.contains("GAIA-TEQUMSA Engine Demonstration"));
    assert!(text.contains("System health: EXCELLENT"));
    assert!(text.contains("Successful evolutions: 5/5"));
    assert!(text.contains("Best evolution: human_432hz"));
    assert!(text.contains("MODERATE_EVOLUTION"));
}

#[test]
fn demo_report_serializes() {
    let mut engine = engine();
    let json = serde_json::to_value(run_demo(&mut engine).unwrap()).unwrap();
    assert_eq!(json["evolutions"].as_array().unwrap().len(), 5);
    assert_eq!(json["harmonics"][0]["frequency"], 432.0);
    assert_eq!(json["summary"]["best"]["entity_id"], "human_432hz");
}

#[test]
fn denied_evolution_text() {
    let mut engine = engine();
    let report = engine.activate_evolution("seeker", 432.0).unwrap();
    let text = format_evolution(&report);
    assert!(text.contains("Status: DENIED"));
    assert!(text.contains("Reason: biological_consent_denied"));
    assert!(!text.contains("Overall level"));
}
