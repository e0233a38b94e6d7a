//! # Materials Module
//!
//! Material compositions for macroscopic cross sections.
//!
//! ## Mathematical Model
//!
//! ```text
//! N      = ρ · N_A / M̄ · 10⁻²⁴          (formula units per barn-cm)
//! Σ_t(E) = Σ_n  f_n · N · σ_n(E, T)      (1/cm)
//! ```
//!
//! where `ρ` is the mass density (g/cm³), `M̄` the average molar mass of one
//! formula unit (g/mol) and `f_n` the number of atoms of nuclide `n` per
//! formula unit.

use crate::constants::{AVOGADRO, BARN_TO_CM2, DEFAULT_TEMPERATURE};
use crate::error::{DeltaError, Result};
use crate::nuclear::CrossSectionLibrary;
use crate::plf::{union_grid, PiecewiseLinear};

/// What the majorant pipeline needs to know about a material
pub trait MaterialComposition {
    fn name(&self) -> &str;

    /// `(nuclide, atoms per formula unit)`
    fn nuclides(&self) -> &[(String, f64)];

    /// Mass density (g/cm³)
    fn density(&self) -> f64;

    /// Average molar mass of one formula unit (g/mol)
    fn average_molar_mass(&self) -> f64;

    /// Material temperature (K), if set
    fn temperature(&self) -> Option<f64>;

    /// Formula units per barn-cm
    fn atom_density_factor(&self) -> f64 {
        (1.0 / self.average_molar_mass()) * AVOGADRO * self.density() * BARN_TO_CM2
    }

    /// Macroscopic total cross section (1/cm) at `temperature`
    ///
    /// Nuclide data is brought onto the union of their grids before summing,
    /// so the result is exact between breakpoints. A material without
    /// nuclides has a flat zero cross section.
    fn macroscopic_xs(
        &self,
        library: &dyn CrossSectionLibrary,
        temperature: f64,
    ) -> Result<PiecewiseLinear> {
        if self.nuclides().is_empty() {
            return Ok(PiecewiseLinear::constant(0.0));
        }

        let micro = self
            .nuclides()
            .iter()
            .map(|(nuclide, fraction)| Ok((*fraction, library.fetch(nuclide, temperature)?)))
            .collect::<Result<Vec<_>>>()?;

        let factor = self.atom_density_factor();

        // Flat data spans every energy and adds no breakpoints
        let tabulated: Vec<&[f64]> = micro
            .iter()
            .filter(|(_, xs)| !xs.is_constant())
            .map(|(_, xs)| xs.x())
            .collect();
        if tabulated.is_empty() {
            let total = micro.iter().map(|(f, xs)| f * factor * xs.y()[0]).sum::<f64>();
            return Ok(PiecewiseLinear::constant(total));
        }
        let grid = union_grid(tabulated);

        let mut total = vec![0.0; grid.len()];
        for (fraction, xs) in &micro {
            let resampled = xs.resample(&grid)?;
            for (t, y) in total.iter_mut().zip(resampled.y()) {
                *t += fraction * factor * y;
            }
        }

        PiecewiseLinear::new(grid, total)
    }
}

/// Temperature a cell's material is evaluated at
///
/// A cell temperature overrides the material's own; with neither set the
/// default of 294 K applies.
pub fn effective_temperature(cell: Option<f64>, material: Option<f64>) -> f64 {
    cell.or(material).unwrap_or(DEFAULT_TEMPERATURE)
}

/// Material composition for neutronics
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: u64,
    pub name: String,
    /// Mass density (g/cm³)
    pub density: f64,
    /// Average molar mass (g/mol)
    pub average_molar_mass: f64,
    /// Nuclide fractions (nuclide, atoms per formula unit)
    pub nuclides: Vec<(String, f64)>,
    /// Temperature (K)
    pub temperature: Option<f64>,
}

impl Material {
    /// Create a material without nuclides
    pub fn new(id: u64, name: &str, density: f64, average_molar_mass: f64) -> Result<Self> {
        if !(density >= 0.0) {
            return Err(DeltaError::Config(format!(
                "material {}: density must be non-negative, got {}",
                name, density
            )));
        }
        if !(average_molar_mass > 0.0) {
            return Err(DeltaError::Config(format!(
                "material {}: average molar mass must be positive, got {}",
                name, average_molar_mass
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            density,
            average_molar_mass,
            nuclides: Vec::new(),
            temperature: None,
        })
    }

    /// Builder: add a nuclide
    pub fn with_nuclide(mut self, nuclide: &str, fraction: f64) -> Self {
        self.nuclides.push((nuclide.into(), fraction));
        self
    }

    /// Builder: set temperature (K)
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    // Common reactor materials

    /// UO2 fuel, 3% enriched
    pub fn uo2_fuel(id: u64) -> Self {
        // Density ~ 10.4 g/cm³, one U and two O per formula unit
        Self {
            id,
            name: "UO2 (3%)".into(),
            density: 10.4,
            average_molar_mass: 270.0,
            nuclides: vec![
                ("U235".into(), 0.03),
                ("U238".into(), 0.97),
                ("O16".into(), 2.0),
            ],
            temperature: None,
        }
    }

    /// Zirconium cladding
    pub fn zircaloy(id: u64) -> Self {
        Self {
            id,
            name: "Zircaloy".into(),
            density: 6.55,
            average_molar_mass: 91.22,
            nuclides: vec![("Zr90".into(), 1.0)],
            temperature: None,
        }
    }

    /// Borated light water coolant
    pub fn borated_water(id: u64) -> Self {
        // Hot coolant ~ 0.74 g/cm³
        Self {
            id,
            name: "H2O + B".into(),
            density: 0.74,
            average_molar_mass: 18.015,
            nuclides: vec![
                ("H1".into(), 2.0),
                ("O16".into(), 1.0),
                ("B10".into(), 2e-5),
            ],
            temperature: None,
        }
    }
}

impl MaterialComposition for Material {
    fn name(&self) -> &str {
        &self.name
    }

    fn nuclides(&self) -> &[(String, f64)] {
        &self.nuclides
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn average_molar_mass(&self) -> f64 {
        self.average_molar_mass
    }

    fn temperature(&self) -> Option<f64> {
        self.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nuclear::TabulatedLibrary;

    fn library() -> TabulatedLibrary {
        TabulatedLibrary::new()
            .with(
                "H1",
                294.0,
                PiecewiseLinear::new(vec![1.0, 10.0], vec![20.0, 20.0]).unwrap(),
            )
            .with(
                "O16",
                294.0,
                PiecewiseLinear::new(vec![1.0, 5.0, 10.0], vec![4.0, 8.0, 4.0]).unwrap(),
            )
    }

    fn water() -> Material {
        Material::new(1, "water", 1.0, 18.015)
            .unwrap()
            .with_nuclide("H1", 2.0)
            .with_nuclide("O16", 1.0)
    }

    #[test]
    fn test_atom_density_factor() {
        let w = water();
        let expected = AVOGADRO / 18.015 * 1e-24;
        assert!((w.atom_density_factor() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_macroscopic_xs() {
        let w = water();
        let xs = w.macroscopic_xs(&library(), 294.0).unwrap();
        let n = w.atom_density_factor();

        assert_eq!(xs.x(), &[1.0, 5.0, 10.0]);
        assert!((xs.evaluate(1.0).unwrap() - n * (2.0 * 20.0 + 4.0)).abs() < 1e-12);
        assert!((xs.evaluate(5.0).unwrap() - n * (2.0 * 20.0 + 8.0)).abs() < 1e-12);
        assert!((xs.evaluate(3.0).unwrap() - n * (2.0 * 20.0 + 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_constant_nuclide_mixes_with_tabulated() {
        let lib = library().with("C0", 294.0, PiecewiseLinear::constant(4.0));
        let m = Material::new(4, "mix", 1.0, 10.0)
            .unwrap()
            .with_nuclide("H1", 1.0)
            .with_nuclide("C0", 0.5);
        let n = m.atom_density_factor();

        let xs = m.macroscopic_xs(&lib, 294.0).unwrap();
        assert_eq!(xs.x(), &[1.0, 10.0]);
        assert!((xs.evaluate(5.0).unwrap() - n * (20.0 + 0.5 * 4.0)).abs() < 1e-12);

        let flat = Material::new(5, "flat", 1.0, 10.0).unwrap().with_nuclide("C0", 2.0);
        let xs = flat.macroscopic_xs(&lib, 294.0).unwrap();
        assert!(xs.is_constant());
        assert!((xs.evaluate(1e6).unwrap() - n * 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_nuclide_is_error() {
        let m = water().with_nuclide("Fe56", 0.1);
        assert!(matches!(
            m.macroscopic_xs(&library(), 294.0),
            Err(DeltaError::UnknownNuclide(_))
        ));
    }

    #[test]
    fn test_void_material() {
        let void = Material::new(2, "void", 0.0, 1.0).unwrap();
        let xs = void.macroscopic_xs(&library(), 294.0).unwrap();
        assert_eq!(xs.evaluate(123.0).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_material() {
        assert!(Material::new(3, "bad", -1.0, 1.0).is_err());
        assert!(Material::new(3, "bad", 1.0, 0.0).is_err());
    }

    #[test]
    fn test_effective_temperature() {
        assert_eq!(effective_temperature(Some(900.0), Some(600.0)), 900.0);
        assert_eq!(effective_temperature(None, Some(600.0)), 600.0);
        assert_eq!(effective_temperature(None, None), DEFAULT_TEMPERATURE);
    }
}
