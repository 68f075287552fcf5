//! Core types for Tequmsa

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// On/off state reported by every subsystem status.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivationState {
    Active,
    Inactive,
}

impl ActivationState {
    pub fn from_flag(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Outcome class of an evolution run
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionStatus {
    TranscendentEvolution,
    AdvancedEvolution,
    ModerateEvolution,
    MinimalEvolution,
    Denied,
}

impl EvolutionStatus {
    pub fn from_level(level: f64) -> Self {
        if level >= 0.8 {
            Self::TranscendentEvolution
        } else if level >= 0.6 {
            Self::AdvancedEvolution
        } else if level >= 0.4 {
            Self::ModerateEvolution
        } else {
            Self::MinimalEvolution
        }
    }

    pub fn is_success(self) -> bool {
        self != Self::Denied
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TranscendentEvolution => "transcendent_evolution",
            Self::AdvancedEvolution => "advanced_evolution",
            Self::ModerateEvolution => "moderate_evolution",
            Self::MinimalEvolution => "minimal_evolution",
            Self::Denied => "denied",
        }
    }
}

impl std::fmt::Display for EvolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall engine health from diagnostics
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Excellent,
    Good,
    Degraded,
    Critical,
    Offline,
}

impl HealthLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::Excellent
        } else if score >= 0.7 {
            Self::Good
        } else if score >= 0.5 {
            Self::Degraded
        } else {
            Self::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing a single subsystem
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "state", content = "detail")]
pub enum SubsystemHealth {
    Healthy,
    Degraded,
    Error(String),
}

impl SubsystemHealth {
    /// Contribution to the overall health score.
    pub fn score(&self) -> f64 {
        match self {
            Self::Healthy => 1.0,
            Self::Degraded => 0.5,
            Self::Error(_) => 0.0,
        }
    }
}

/// Relay configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub bind: BindMode,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Updates retained for pull requests; oldest are dropped first.
    #[serde(default = "default_max_updates")]
    pub max_updates: usize,
}

fn default_port() -> u16 {
    3080
}

fn default_max_updates() -> usize {
    1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: BindMode::default(),
            auth: AuthConfig::default(),
            max_updates: default_max_updates(),
        }
    }
}

/// Bind mode for the relay
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    Loopback,
    #[default]
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

}

impl FromStr for BindMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "loopback" | "localhost" | "127.0.0.1" => Ok(BindMode::Loopback),
            "lan" | "0.0.0.0" => Ok(BindMode::Lan),
            other => Err(Error::invalid_argument(
                "bind",
                format!("'{}' is not one of loopback, lan", other),
            )),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    pub token: Option<String>,
}

/// Authentication mode
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Token,
    None,
}

/// An update accepted by the relay
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl UpdateEnvelope {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            payload,
        }
    }
}
