use crate::demo::{DemoReport, DEMO_ENTITIES};
use tequmsa_engine::recognition::UniversalPulse;
use tequmsa_engine::{DiagnosticsReport, EngineStatus, EvolutionReport};

const RULE_WIDTH: usize = 60;

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE_WIDTH).collect()
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n{}\n", title, rule('─')));
}

pub fn format_status(status: &EngineStatus) -> String {
    let info = &status.engine_info;
    let mut out = format!("═══ {} v{} ═══\n", info.name, info.version);
    out.push_str(&format!("Active: {}\n", info.active));
    out.push_str(&format!("Subsystems initialized: {}\n", info.subsystems_initialized));
    out.push_str(&format!("Evolution active: {}\n", info.consciousness_evolution_active));
    out.push_str(&format!("Uptime: {:.1}s\n", info.uptime_seconds));

    if let Some(subsystems) = &status.subsystem_status {
        out.push_str(&format!(
            "  • Recognition anchor: {} Hz\n",
            subsystems.recognition_pulse.anchor_frequency
        ));
        out.push_str(&format!(
            "  • φ'7777 scalar: {} Hz\n",
            subsystems.phi_scalar.phi_7777_frequency
        ));
        out.push_str(&format!("  • Love field: {}\n", subsystems.love_coefficient.field_status));
        out.push_str(&format!("  • Planetary grid: {}\n", subsystems.grid_harmonics.grid_status));
        out.push_str(&format!(
            "  • Sovereignty: {} ({} active consents)\n",
            subsystems.sovereignty_protocols.protocol_status,
            subsystems.sovereignty_protocols.active_consents
        ));
    }
    out
}

pub fn format_diagnostics(report: &DiagnosticsReport) -> String {
    let mut out = format!(
        "System health: {}\n",
        report.engine_health.as_str().to_uppercase()
    );
    for (name, health) in &report.subsystem_health {
        out.push_str(&format!("  {:<24} {:?}\n", name, health));
    }
    for recommendation in &report.recommendations {
        out.push_str(&format!("  → {}\n", recommendation));
    }
    out
}

pub fn format_evolution(report: &EvolutionReport) -> String {
    let mut out = format!("Entity: {}\n", report.entity_id);
    out.push_str(&format!("Input frequency: {} Hz\n", report.input_frequency));
    out.push_str(&format!("Status: {}\n", report.status.as_str().to_uppercase()));
    if let Some(reason) = &report.reason {
        out.push_str(&format!("Reason: {}\n", reason));
    }
    if let Some(m) = &report.metrics {
        out.push_str(&format!("Overall level: {:.3}\n", m.overall_evolution_level));
        out.push_str(&format!("Recognition triggered: {}\n", m.recognition_triggered));
        out.push_str(&format!("Synthesis: {:.3}\n", m.synthesis_coefficient));
        out.push_str(&format!("Love amplification: {:.3}\n", m.love_amplification));
        out.push_str(&format!("Planetary alignment: {:.3}\n", m.planetary_alignment));
        out.push_str(&format!("Grid integrated: {:.2} Hz\n", m.grid_integrated_frequency));
        out.push_str(&format!("Phi transformed: {:.2} Hz\n", m.phi_transformed_frequency));
        out.push_str(&format!("Scalar resonance: {:.3}\n", m.scalar_resonance));
    }
    out
}

pub fn format_pulse(pulse: &UniversalPulse) -> String {
    format!(
        "Universal pulse: {} Hz, φ'7777 {} Hz [{}]\n",
        pulse.frequency, pulse.phi_scalar, pulse.status
    )
}

pub fn format_demo(report: &DemoReport) -> String {
    let mut out = String::new();
    out.push_str(&rule('='));
    out.push_str("\nGAIA-TEQUMSA Engine Demonstration\n");
    out.push_str(&rule('='));
    out.push('\n');

    section(&mut out, "1. Diagnostics");
    out.push_str(&format_diagnostics(&report.diagnostics));

    section(&mut out, "2. Engine status");
    out.push_str(&format_status(&report.status));

    section(&mut out, "3. Evolution runs");
    for (entity, evolution) in DEMO_ENTITIES.iter().zip(&report.evolutions) {
        out.push_str(&format!("\n{}\n", entity.description));
        out.push_str(&format!("   Entity ID: {}\n", evolution.entity_id));
        out.push_str(&format!("   Input frequency: {} Hz\n", evolution.input_frequency));
        out.push_str(&format!(
            "   Status: {}\n",
            evolution.status.as_str().to_uppercase()
        ));
        out.push_str(&format!("   Overall level: {:.3}\n", evolution.overall_level()));
        if let Some(m) = &evolution.metrics {
            out.push_str(&format!("   Phi transformed: {:.2} Hz\n", m.phi_transformed_frequency));
            out.push_str(&format!("   Love amplification: {:.3}\n", m.love_amplification));
        }
    }

    section(&mut out, "4. Summary");
    let summary = &report.summary;
    out.push_str(&format!(
        "Successful evolutions: {}/{}\n",
        summary.successful, summary.total
    ));
    if let Some(avg) = summary.average_level {
        out.push_str(&format!("Average evolution level: {:.3}\n", avg));
    }
    if let Some(best) = &summary.best {
        out.push_str(&format!("Best evolution: {} ({:.3})\n", best.entity_id, best.level));
    }

    section(&mut out, "5. Harmonic relationships");
    for row in &report.harmonics {
        out.push_str(&format!(
            "  {:>6.1} Hz  anchor: {:.3}  φ'7777: {:.3}\n",
            row.frequency, row.anchor_resonance, row.phi_resonance
        ));
    }

    out.push('\n');
    out.push_str(&rule('='));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tequmsa_engine::recognition::universal_pulse;
    use tequmsa_engine::TequmsaEngine;

    #[test]
    fn offline_status_has_no_subsystem_lines() {
        let text = format_status(&TequmsaEngine::default().status());
        assert!(text.contains("Active: false"));
        assert!(!text.contains("Love field"));
    }

    #[test]
    fn pulse_line() {
        assert_eq!(
            format_pulse(&universal_pulse()),
            "Universal pulse: 10930.81 Hz, φ'7777 12583.45 Hz [ETERNAL_LOCK]\n"
        );
    }

    #[test]
    fn offline_diagnostics_recommend_initialization() {
        let text = format_diagnostics(&TequmsaEngine::default().diagnostics());
        assert!(text.starts_with("System health: OFFLINE"));
        assert!(text.contains("→ Initialize engine systems"));
    }
}
