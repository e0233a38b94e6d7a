//! # Benchmark Problems
//!
//! Synthetic nuclear data and a light-water pin cell for exercising the
//! majorant pipeline and the delta tracker without evaluated data files.
//!
//! ## Cross section model
//!
//! ```text
//! σ_t(E, T) = σ_pot + σ_th·√(E_th/E) + Σ_r σ_r·(Γ_r/Γ_D)·(Γ_D²/4) / ((E - E_r)² + Γ_D²/4)
//! Γ_D = √(Γ_r² + 4·k·T·E_r/A)
//! ```
//!
//! Resonances broaden and flatten with temperature, so the fuel at 900 K and
//! the same nuclides at room temperature cross each other near every peak.

use crate::error::Result;
use crate::geometry::{Cell, Geometry, Region, Surface};
use crate::materials::Material;
use crate::nuclear::TabulatedLibrary;
use crate::plf::PiecewiseLinear;

/// Boltzmann constant (eV/K)
const BOLTZMANN_EV: f64 = 8.617_333e-5;

/// Thermal reference energy (eV)
const THERMAL_ENERGY: f64 = 0.0253;

/// Lowest tabulated energy (eV)
pub const GRID_MIN: f64 = 1e-5;
/// Highest tabulated energy (eV)
pub const GRID_MAX: f64 = 2e7;

/// Temperatures tabulated by [`synthetic_library`] (K)
pub const LIBRARY_TEMPERATURES: [f64; 3] = [294.0, 600.0, 900.0];

/// Single-level resonance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resonance {
    /// Resonance energy (eV)
    pub energy: f64,
    /// Peak at 0 K (barn)
    pub peak: f64,
    /// Natural width (eV)
    pub width: f64,
}

impl Resonance {
    pub const fn new(energy: f64, peak: f64, width: f64) -> Self {
        Self { energy, peak, width }
    }

    /// Contribution at `energy` for a target of mass ratio `a` at `temperature`
    fn value(&self, energy: f64, a: f64, temperature: f64) -> f64 {
        let doppler2 = 4.0 * BOLTZMANN_EV * temperature * self.energy / a;
        let gamma = (self.width * self.width + doppler2).sqrt();
        let half2 = 0.25 * gamma * gamma;
        let de = energy - self.energy;
        self.peak * (self.width / gamma) * half2 / (de * de + half2)
    }
}

/// Analytic total cross section of one nuclide
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticNuclide {
    pub name: &'static str,
    /// Target mass ratio
    pub mass_ratio: f64,
    /// Potential scattering (barn)
    pub potential: f64,
    /// 1/v component at 0.0253 eV (barn)
    pub thermal: f64,
    pub resonances: Vec<Resonance>,
}

impl SyntheticNuclide {
    /// Total cross section (barn)
    pub fn total(&self, energy: f64, temperature: f64) -> f64 {
        self.potential
            + self.thermal * (THERMAL_ENERGY / energy).sqrt()
            + self
                .resonances
                .iter()
                .map(|r| r.value(energy, self.mass_ratio, temperature))
                .sum::<f64>()
    }

    /// Tabulate on a log grid refined around every resonance
    pub fn tabulate(&self, temperature: f64, points: usize) -> Result<PiecewiseLinear> {
        let grid = self.energy_grid(points);
        let xs = grid.iter().map(|&e| self.total(e, temperature)).collect();
        PiecewiseLinear::new(grid, xs)
    }

    /// Temperature independent tabulation grid
    pub fn energy_grid(&self, points: usize) -> Vec<f64> {
        let mut grid = log_grid(GRID_MIN, GRID_MAX, points);
        for r in &self.resonances {
            for k in -8..=8 {
                grid.push(r.energy + 0.25 * k as f64 * r.width);
            }
        }
        grid.retain(|&e| (GRID_MIN..=GRID_MAX).contains(&e));
        grid.sort_by(f64::total_cmp);
        grid.dedup();
        grid
    }
}

/// `n` log-spaced points from `min` to `max` inclusive
pub fn log_grid(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![min];
    }
    let (lo, hi) = (min.ln(), max.ln());
    let step = (hi - lo) / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| (lo + step * i as f64).exp()).collect();
    grid[0] = min;
    grid[n - 1] = max;
    grid
}

// Data loosely shaped after ENDF/B-VIII.0 totals

pub fn u235() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "U235",
        mass_ratio: 233.0,
        potential: 11.5,
        thermal: 680.0,
        resonances: vec![
            Resonance::new(0.29, 120.0, 0.10),
            Resonance::new(1.14, 180.0, 0.12),
            Resonance::new(8.77, 300.0, 0.10),
        ],
    }
}

pub fn u238() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "U238",
        mass_ratio: 236.0,
        potential: 9.3,
        thermal: 12.0,
        resonances: vec![
            Resonance::new(6.67, 7000.0, 0.027),
            Resonance::new(20.87, 3000.0, 0.034),
            Resonance::new(36.68, 2500.0, 0.057),
        ],
    }
}

pub fn o16() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "O16",
        mass_ratio: 15.86,
        potential: 3.8,
        thermal: 0.0002,
        resonances: vec![Resonance::new(4.34e5, 5.0, 4.0e4)],
    }
}

pub fn zr90() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "Zr90",
        mass_ratio: 89.13,
        potential: 6.5,
        thermal: 0.014,
        resonances: vec![Resonance::new(292.0, 60.0, 0.5)],
    }
}

pub fn h1() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "H1",
        mass_ratio: 0.9992,
        potential: 20.4,
        thermal: 0.33,
        resonances: Vec::new(),
    }
}

pub fn b10() -> SyntheticNuclide {
    SyntheticNuclide {
        name: "B10",
        mass_ratio: 9.93,
        potential: 2.2,
        thermal: 3840.0,
        resonances: Vec::new(),
    }
}

/// Every nuclide of the pin cell
pub fn pin_cell_nuclides() -> Vec<SyntheticNuclide> {
    vec![u235(), u238(), o16(), zr90(), h1(), b10()]
}

/// Library tabulating every pin-cell nuclide at [`LIBRARY_TEMPERATURES`]
pub fn synthetic_library(points: usize) -> Result<TabulatedLibrary> {
    let mut library = TabulatedLibrary::new();
    for nuclide in pin_cell_nuclides() {
        for &t in &LIBRARY_TEMPERATURES {
            library.insert(nuclide.name, t, nuclide.tabulate(t, points)?);
        }
    }
    Ok(library)
}

/// Infinite pin cell: fuel (900 K), cladding (600 K), coolant (294 K)
///
/// Concentric Z cylinders of radius 1.5, 1.7 and 2.0 cm; the coolant cell
/// has no temperature of its own and falls back to the default.
pub fn pin_cell() -> Geometry {
    let fuel_cyl = Surface::CylinderZ { center: (0.0, 0.0), radius: 1.5 };
    let clad_cyl = Surface::CylinderZ { center: (0.0, 0.0), radius: 1.7 };
    let boundary = Surface::CylinderZ { center: (0.0, 0.0), radius: 2.0 };

    Geometry::new()
        .with_cell(
            Cell::with_material(1, "fuel", Region::Inside(fuel_cyl.clone()), Material::uo2_fuel(1))
                .at_temperature(900.0),
        )
        .with_cell(
            Cell::with_material(
                2,
                "clad",
                Region::shell(fuel_cyl, clad_cyl.clone()),
                Material::zircaloy(2),
            )
            .at_temperature(600.0),
        )
        .with_cell(Cell::with_material(
            3,
            "coolant",
            Region::shell(clad_cyl, boundary),
            Material::borated_water(3),
        ))
}
