//! # Nuclear Data Module
//!
//! Point-wise microscopic cross sections per nuclide and temperature.
//!
//! The majorant pipeline only needs one query: the total cross section of a
//! nuclide at a temperature, as a [`PiecewiseLinear`] in barns over energy in
//! eV. [`CrossSectionLibrary`] is that query; [`TabulatedLibrary`] is an
//! in-memory implementation holding several temperatures per nuclide.

use std::collections::HashMap;

use log::debug;

use crate::error::{DeltaError, Result};
use crate::plf::PiecewiseLinear;

/// Source of point-wise total cross sections
pub trait CrossSectionLibrary: Sync {
    /// Total microscopic cross section (barn) of `nuclide` at `temperature` (K)
    fn fetch(&self, nuclide: &str, temperature: f64) -> Result<PiecewiseLinear>;
}

/// One temperature of tabulated data
#[derive(Debug, Clone)]
struct TemperatureTable {
    temperature: f64,
    total: PiecewiseLinear,
}

/// Nuclear data held in memory
///
/// Requests between tabulated temperatures resolve to the nearest one.
#[derive(Debug, Clone, Default)]
pub struct TabulatedLibrary {
    tables: HashMap<String, Vec<TemperatureTable>>,
}

impl TabulatedLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the table of `nuclide` at `temperature`
    pub fn insert(&mut self, nuclide: &str, temperature: f64, total: PiecewiseLinear) {
        let temps = self.tables.entry(nuclide.to_string()).or_default();
        match temps.iter_mut().find(|t| t.temperature == temperature) {
            Some(existing) => existing.total = total,
            None => {
                temps.push(TemperatureTable { temperature, total });
                temps.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
            }
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, nuclide: &str, temperature: f64, total: PiecewiseLinear) -> Self {
        self.insert(nuclide, temperature, total);
        self
    }

    pub fn contains(&self, nuclide: &str) -> bool {
        self.tables.contains_key(nuclide)
    }

    /// Tabulated temperatures of `nuclide`, ascending
    pub fn temperatures(&self, nuclide: &str) -> Vec<f64> {
        self.tables
            .get(nuclide)
            .map(|t| t.iter().map(|t| t.temperature).collect())
            .unwrap_or_default()
    }

    /// Names of all nuclides, sorted
    pub fn nuclides(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl CrossSectionLibrary for TabulatedLibrary {
    fn fetch(&self, nuclide: &str, temperature: f64) -> Result<PiecewiseLinear> {
        let table = self
            .tables
            .get(nuclide)
            .and_then(|temps| {
                temps.iter().min_by(|a, b| {
                    (a.temperature - temperature)
                        .abs()
                        .total_cmp(&(b.temperature - temperature).abs())
                })
            })
            .ok_or_else(|| DeltaError::UnknownNuclide(nuclide.to_string()))?;

        if table.temperature != temperature {
            debug!(
                "{}: no data at {} K, using nearest tabulated {} K",
                nuclide, temperature, table.temperature
            );
        }
        Ok(table.total.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(v: f64) -> PiecewiseLinear {
        PiecewiseLinear::new(vec![1e-5, 2e7], vec![v, v]).unwrap()
    }

    fn library() -> TabulatedLibrary {
        TabulatedLibrary::new()
            .with("U238", 600.0, flat(12.0))
            .with("U238", 294.0, flat(10.0))
            .with("H1", 294.0, flat(20.0))
    }

    #[test]
    fn test_exact_temperature() {
        let lib = library();
        let xs = lib.fetch("U238", 600.0).unwrap();
        assert_eq!(xs.evaluate(1.0).unwrap(), 12.0);
        assert_eq!(lib.temperatures("U238"), vec![294.0, 600.0]);
    }

    #[test]
    fn test_nearest_temperature() {
        let lib = library();
        assert_eq!(lib.fetch("U238", 400.0).unwrap().evaluate(1.0).unwrap(), 10.0);
        assert_eq!(lib.fetch("U238", 900.0).unwrap().evaluate(1.0).unwrap(), 12.0);
    }

    #[test]
    fn test_unknown_nuclide() {
        let lib = library();
        assert!(matches!(lib.fetch("Pu239", 294.0), Err(DeltaError::UnknownNuclide(_))));
        assert!(!lib.contains("Pu239"));
        assert_eq!(lib.nuclides(), vec!["H1", "U238"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut lib = library();
        lib.insert("H1", 294.0, flat(30.0));
        assert_eq!(lib.temperatures("H1"), vec![294.0]);
        assert_eq!(lib.fetch("H1", 294.0).unwrap().evaluate(1.0).unwrap(), 30.0);
    }
}
