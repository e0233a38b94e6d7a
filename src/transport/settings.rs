//! Run settings for delta tracking, loadable from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENERGY_CUTOFF;
use crate::error::{DeltaError, Result};

/// Settings of a transport run
///
/// Every field has a default, so a JSON file only needs the ones it changes:
///
/// ```json
/// { "n_particles": 1000, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Histories to run
    pub n_particles: usize,
    /// Seed of the run's random generator
    pub seed: u64,
    /// Histories end as absorbed once energy is at or below this (eV)
    pub energy_cutoff: f64,
    /// Tentative flights allowed per history before it is cut off
    pub max_events: usize,
    /// Target-to-particle mass ratio for scattering kinematics
    pub scatter_mass_ratio: f64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            n_particles: 100,
            seed: 110,
            energy_cutoff: DEFAULT_ENERGY_CUTOFF,
            max_events: 1_000_000,
            scatter_mass_ratio: 1.0,
        }
    }
}

impl TransportSettings {
    /// Read and validate settings from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.energy_cutoff >= 0.0) {
            return Err(DeltaError::Config(format!(
                "energy_cutoff must be non-negative, got {}",
                self.energy_cutoff
            )));
        }
        if self.max_events == 0 {
            return Err(DeltaError::Config("max_events must be at least 1".into()));
        }
        if !(self.scatter_mass_ratio >= 1.0) {
            return Err(DeltaError::Config(format!(
                "scatter_mass_ratio must be >= 1, got {}",
                self.scatter_mass_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = TransportSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.seed, 110);
        assert_eq!(s.energy_cutoff, 1e-3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = TransportSettings::from_json(r#"{ "n_particles": 5, "seed": 9 }"#).unwrap();
        assert_eq!(s.n_particles, 5);
        assert_eq!(s.seed, 9);
        assert_eq!(s.max_events, TransportSettings::default().max_events);
    }

    #[test]
    fn test_roundtrip_json() {
        let s = TransportSettings {
            energy_cutoff: 0.5,
            ..Default::default()
        };
        let back = TransportSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            TransportSettings::from_json(r#"{ "energy_cutoff": -1.0 }"#),
            Err(DeltaError::Config(_))
        ));
        assert!(matches!(
            TransportSettings::from_json(r#"{ "max_events": 0 }"#),
            Err(DeltaError::Config(_))
        ));
        assert!(matches!(
            TransportSettings::from_json(r#"{ "scatter_mass_ratio": 0.5 }"#),
            Err(DeltaError::Config(_))
        ));
        assert!(matches!(
            TransportSettings::from_json("{ not json"),
            Err(DeltaError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TransportSettings::from_json_file("/nonexistent/deltasim.json"),
            Err(DeltaError::Io(_))
        ));
    }
}
