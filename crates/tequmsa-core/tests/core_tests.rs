//! Tests for tequmsa-core: status enums, relay config, errors

use tequmsa_core::*;

// ===========================================================================
// ActivationState
// ===========================================================================

#[test]
fn activation_state_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&ActivationState::Active).unwrap(), r#""ACTIVE""#);
    assert_eq!(serde_json::to_string(&ActivationState::Inactive).unwrap(), r#""INACTIVE""#);
}

#[test]
fn activation_state_from_flag() {
    assert_eq!(ActivationState::from_flag(true), ActivationState::Active);
    assert_eq!(ActivationState::from_flag(false), ActivationState::Inactive);
    assert!(ActivationState::Active.is_active());
    assert_eq!(ActivationState::Inactive.to_string(), "INACTIVE");
}

// ===========================================================================
// EvolutionStatus
// ===========================================================================

#[test]
fn evolution_status_thresholds() {
    assert_eq!(EvolutionStatus::from_level(0.95), EvolutionStatus::TranscendentEvolution);
    assert_eq!(EvolutionStatus::from_level(0.8), EvolutionStatus::TranscendentEvolution);
    assert_eq!(EvolutionStatus::from_level(0.79), EvolutionStatus::AdvancedEvolution);
    assert_eq!(EvolutionStatus::from_level(0.6), EvolutionStatus::AdvancedEvolution);
    assert_eq!(EvolutionStatus::from_level(0.4), EvolutionStatus::ModerateEvolution);
    assert_eq!(EvolutionStatus::from_level(0.39), EvolutionStatus::MinimalEvolution);
    assert_eq!(EvolutionStatus::from_level(-1.0), EvolutionStatus::MinimalEvolution);
}

#[test]
fn evolution_status_wire_names() {
    assert_eq!(
        serde_json::to_string(&EvolutionStatus::TranscendentEvolution).unwrap(),
        r#""transcendent_evolution""#
    );
    assert_eq!(serde_json::to_string(&EvolutionStatus::Denied).unwrap(), r#""denied""#);
    assert_eq!(EvolutionStatus::MinimalEvolution.to_string(), "minimal_evolution");
    assert!(!EvolutionStatus::Denied.is_success());
    assert!(EvolutionStatus::MinimalEvolution.is_success());
}

// ===========================================================================
// Health
// ===========================================================================

#[test]
fn health_level_thresholds() {
    assert_eq!(HealthLevel::from_score(1.0), HealthLevel::Excellent);
    assert_eq!(HealthLevel::from_score(0.9), HealthLevel::Excellent);
    assert_eq!(HealthLevel::from_score(0.75), HealthLevel::Good);
    assert_eq!(HealthLevel::from_score(0.5), HealthLevel::Degraded);
    assert_eq!(HealthLevel::from_score(0.49), HealthLevel::Critical);
    assert_eq!(HealthLevel::Offline.to_string(), "offline");
}

#[test]
fn subsystem_health_scores() {
    assert_eq!(SubsystemHealth::Healthy.score(), 1.0);
    assert_eq!(SubsystemHealth::Degraded.score(), 0.5);
    assert_eq!(SubsystemHealth::Error("boom".into()).score(), 0.0);
}

#[test]
fn subsystem_health_serde_shape() {
    let json = serde_json::to_value(SubsystemHealth::Healthy).unwrap();
    assert_eq!(json["state"], "healthy");
    let json = serde_json::to_value(SubsystemHealth::Error("probe failed".into())).unwrap();
    assert_eq!(json["state"], "error");
    assert_eq!(json["detail"], "probe failed");
}

// ===========================================================================
// RelayConfig
// ===========================================================================

#[test]
fn relay_config_defaults() {
    let config = RelayConfig::default();
    assert_eq!(config.port, 3080);
    assert_eq!(config.bind, BindMode::Lan);
    assert_eq!(config.auth.mode, AuthMode::Token);
    assert!(config.auth.token.is_none());
    assert_eq!(config.max_updates, 1024);
}

#[test]
fn relay_config_partial_json_uses_defaults() {
    let config: RelayConfig = serde_json::from_str(r#"{"bind": "loopback"}"#).unwrap();
    assert_eq!(config.port, 3080);
    assert_eq!(config.bind, BindMode::Loopback);
}

#[test]
fn bind_mode_parse_and_addr() {
    assert_eq!("localhost".parse::<BindMode>().unwrap(), BindMode::Loopback);
    assert_eq!("127.0.0.1".parse::<BindMode>().unwrap(), BindMode::Loopback);
    assert_eq!("LAN".parse::<BindMode>().unwrap(), BindMode::Lan);
    assert!(matches!(
        "anything".parse::<BindMode>(),
        Err(Error::InvalidArgument { .. })
    ));
    assert_eq!(BindMode::Loopback.to_addr(), "127.0.0.1");
    assert_eq!(BindMode::Lan.to_addr(), "0.0.0.0");
}

// ===========================================================================
// UpdateEnvelope
// ===========================================================================

#[test]
fn update_envelopes_get_distinct_ids() {
    let a = UpdateEnvelope::new(serde_json::json!({"repo": "a"}));
    let b = UpdateEnvelope::new(serde_json::json!({"repo": "a"}));
    assert_ne!(a.id, b.id);
    assert_eq!(a.payload["repo"], "a");
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_display_messages() {
    let err = Error::invalid_frequency(-3.0, "must be positive");
    assert_eq!(err.to_string(), "invalid frequency: -3 Hz (must be positive)");

    let err = Error::SubsystemsOffline(vec!["grid".into(), "phi".into()]);
    assert_eq!(err.to_string(), "subsystems offline: grid, phi");

    let err = Error::auth_failed("token required");
    assert_eq!(err.to_string(), "authentication failed: token required");
}

#[test]
fn client_errors_are_classified() {
    assert!(Error::invalid_frequency(0.0, "x").is_client_error());
    assert!(Error::invalid_argument("factor", "x").is_client_error());
    assert!(Error::UnknownPlanet("pluto".into()).is_client_error());
    assert!(!Error::ConfigError("x".into()).is_client_error());
    assert!(!Error::SubsystemsOffline(vec![]).is_client_error());
}

#[test]
fn ensure_positive_frequency_rejects_bad_input() {
    assert_eq!(ensure_positive_frequency(432.0).unwrap(), 432.0);
    assert!(ensure_positive_frequency(0.0).is_err());
    assert!(ensure_positive_frequency(-1.0).is_err());
    assert!(ensure_positive_frequency(f64::NAN).is_err());
    assert!(ensure_positive_frequency(f64::INFINITY).is_err());
}
