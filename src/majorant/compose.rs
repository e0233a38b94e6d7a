//! Bottom-up majorant construction
//!
//! ```text
//! σ_n(E, T₁..T_k) ──max──▶ σ̂_n(E)                  per nuclide
//! σ̂_n on ∪ grids  ──Σ f_n N──▶ Σ̂_m(E)              per material
//! Σ̂_m             ──max──▶ Σ_maj(E)                global
//! ```
//!
//! Per-nuclide envelopes are independent and are built on the rayon pool;
//! results are keyed by nuclide name so the order of later folds does not
//! depend on scheduling.

use std::collections::BTreeMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::constants::DEFAULT_TEMPERATURE;
use crate::error::{DeltaError, Result};
use crate::geometry::Geometry;
use crate::materials::MaterialComposition;
use crate::nuclear::CrossSectionLibrary;
use crate::plf::{union_grid, PiecewiseLinear};

use super::Envelope;

// ============================================================================
// NUCLIDE
// ============================================================================

/// Envelope of one nuclide's total cross section over several temperatures
#[derive(Debug, Clone)]
pub struct NuclideMajorant {
    nuclide: String,
    temperatures: Vec<f64>,
    envelope: Envelope,
}

impl NuclideMajorant {
    /// Fetch every temperature from `library` and fold the envelope
    ///
    /// Unset temperatures (`None`) and an empty list both mean 294 K.
    pub fn build(
        nuclide: &str,
        temperatures: &[Option<f64>],
        library: &dyn CrossSectionLibrary,
    ) -> Result<Self> {
        let mut temps: Vec<f64> = temperatures
            .iter()
            .map(|t| t.unwrap_or(DEFAULT_TEMPERATURE))
            .collect();
        if temps.is_empty() {
            temps.push(DEFAULT_TEMPERATURE);
        }
        temps.sort_by(f64::total_cmp);
        temps.dedup();

        let mut envelope = Envelope::new();
        for &t in &temps {
            let xs = library.fetch(nuclide, t)?;
            envelope.update(&xs)?;
        }

        debug!(
            "{}: majorant over {:?} K has {} breakpoints",
            nuclide,
            temps,
            envelope.x_values().len()
        );

        Ok(Self {
            nuclide: nuclide.to_string(),
            temperatures: temps,
            envelope,
        })
    }

    pub fn nuclide(&self) -> &str {
        &self.nuclide
    }

    /// Temperatures folded into the envelope (K), ascending
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn function(&self) -> Result<&PiecewiseLinear> {
        self.envelope.function()
    }

    pub fn e_grid(&self) -> &[f64] {
        self.envelope.x_values()
    }

    pub fn xs(&self) -> &[f64] {
        self.envelope.y_values()
    }

    /// Energy independent majorant
    pub fn is_constant(&self) -> bool {
        self.e_grid().len() == 1
    }

    /// Re-express on a finer grid, typically the common energy grid
    pub fn resample_onto(&mut self, grid: &[f64]) -> Result<()> {
        self.envelope.resample(grid)
    }
}

/// Sorted union of every tabulated nuclide majorant's breakpoints
///
/// Flat majorants have no breakpoints of their own and only contribute when
/// every majorant is flat.
pub fn common_energy_grid(majorants: &BTreeMap<String, NuclideMajorant>) -> Vec<f64> {
    let tabulated = union_grid(
        majorants
            .values()
            .filter(|m| !m.is_constant())
            .map(NuclideMajorant::e_grid),
    );
    if tabulated.is_empty() {
        union_grid(majorants.values().map(NuclideMajorant::e_grid))
    } else {
        tabulated
    }
}

// ============================================================================
// MATERIAL
// ============================================================================

/// Macroscopic majorant of one material
///
/// Holds the nuclide majorants it is made of; they must already share the
/// energy grid passed to [`xs`](Self::xs).
#[derive(Debug, Clone)]
pub struct MaterialMajorant {
    name: String,
    atom_density_factor: f64,
    fractions: Vec<(String, f64)>,
    nuclides: BTreeMap<String, NuclideMajorant>,
}

impl MaterialMajorant {
    /// Pick the nuclide majorants `material` needs
    pub fn new<M: MaterialComposition + ?Sized>(
        material: &M,
        nuclide_majorants: &BTreeMap<String, NuclideMajorant>,
    ) -> Result<Self> {
        let mut nuclides = BTreeMap::new();
        for (nuclide, _) in material.nuclides() {
            let majorant = nuclide_majorants
                .get(nuclide)
                .ok_or_else(|| DeltaError::UnknownNuclide(nuclide.clone()))?;
            nuclides.insert(nuclide.clone(), majorant.clone());
        }

        Ok(Self {
            name: material.name().to_string(),
            atom_density_factor: material.atom_density_factor(),
            fractions: material.nuclides().to_vec(),
            nuclides,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formula units per barn-cm
    pub fn atom_density_factor(&self) -> f64 {
        self.atom_density_factor
    }

    pub fn fractions(&self) -> &[(String, f64)] {
        &self.fractions
    }

    /// Energy grid of the underlying nuclide majorants
    pub fn e_grid(&self) -> &[f64] {
        self.nuclides.values().next().map_or(&[][..], NuclideMajorant::e_grid)
    }

    /// `Σ_n f_n · N · σ̂_n` at every point of `grid` (1/cm)
    pub fn xs(&self, grid: &[f64]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; grid.len()];
        for (nuclide, fraction) in &self.fractions {
            let majorant = self
                .nuclides
                .get(nuclide)
                .ok_or_else(|| DeltaError::UnknownNuclide(nuclide.clone()))?;
            let values = majorant.xs();
            if values.len() != grid.len() {
                return Err(DeltaError::ShapeMismatch(format!(
                    "majorant of {} has {} points but the energy grid has {}; \
                     resample it onto the common grid first",
                    nuclide,
                    values.len(),
                    grid.len()
                )));
            }
            for (o, y) in out.iter_mut().zip(values) {
                *o += fraction * self.atom_density_factor * y;
            }
        }
        Ok(out)
    }

    /// [`xs`](Self::xs) as a function of energy
    pub fn function(&self, grid: &[f64]) -> Result<PiecewiseLinear> {
        PiecewiseLinear::new(grid.to_vec(), self.xs(grid)?)
    }
}

// ============================================================================
// GLOBAL
// ============================================================================

/// Envelope of all material majorants: the flight-sampling cross section
#[derive(Debug, Clone)]
pub struct GlobalMajorant {
    energy_grid: Vec<f64>,
    envelope: Envelope,
}

impl GlobalMajorant {
    /// Fold the material majorants on `grid`, in order
    pub fn from_materials(grid: &[f64], materials: &[MaterialMajorant]) -> Result<Self> {
        let mut envelope = Envelope::new();
        for material in materials {
            envelope.update(&material.function(grid)?)?;
        }
        Ok(Self {
            energy_grid: grid.to_vec(),
            envelope,
        })
    }

    /// Majorant (1/cm) at `energy` (eV)
    pub fn evaluate(&self, energy: f64) -> Result<f64> {
        self.envelope.evaluate(energy)
    }

    pub fn function(&self) -> Result<&PiecewiseLinear> {
        self.envelope.function()
    }

    /// Common grid the material majorants were evaluated on
    pub fn energy_grid(&self) -> &[f64] {
        &self.energy_grid
    }

    pub fn into_function(self) -> Result<PiecewiseLinear> {
        self.envelope.into_function()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Material majorants for every material in `geometry` on a common grid
///
/// Each nuclide's temperatures are those of every cell filled by a material
/// containing it, plus the materials' own temperatures.
pub fn majorants_from_geometry(
    geometry: &Geometry,
    library: &dyn CrossSectionLibrary,
) -> Result<(Vec<f64>, Vec<MaterialMajorant>)> {
    let materials = geometry.materials();

    let mut nuclide_temps: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for material in &materials {
        let temps = geometry.material_temperatures(material.id);
        for (nuclide, _) in material.nuclides() {
            nuclide_temps
                .entry(nuclide.clone())
                .or_default()
                .extend(temps.iter().copied().map(Some));
        }
    }

    let built = nuclide_temps
        .par_iter()
        .map(|(nuclide, temps)| {
            info!("Computing majorant for {}...", nuclide);
            NuclideMajorant::build(nuclide, temps, library).map(|m| (nuclide.clone(), m))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut nuclide_majorants: BTreeMap<String, NuclideMajorant> = built.into_iter().collect();

    info!("Computing common energy grid...");
    let grid = common_energy_grid(&nuclide_majorants);
    if let (Some(first), Some(last)) = (grid.first(), grid.last()) {
        info!("Energy grid size: {}", grid.len());
        info!("Energy grid min (eV): {}", first);
        info!("Energy grid max (eV): {}", last);
    }

    nuclide_majorants
        .par_iter_mut()
        .try_for_each(|(_, m)| m.resample_onto(&grid))?;

    let material_majorants = materials
        .iter()
        .map(|m| MaterialMajorant::new(*m, &nuclide_majorants))
        .collect::<Result<Vec<_>>>()?;

    Ok((grid, material_majorants))
}

/// Global majorant of `geometry`
pub fn majorant_from_geometry(
    geometry: &Geometry,
    library: &dyn CrossSectionLibrary,
) -> Result<GlobalMajorant> {
    let (grid, materials) = majorants_from_geometry(geometry, library)?;
    info!("Computing global majorant from {} materials...", materials.len());
    let majorant = GlobalMajorant::from_materials(&grid, &materials)?;
    info!(
        "Global majorant: {} breakpoints",
        majorant.function()?.len()
    );
    Ok(majorant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Cell, Region, Surface};
    use crate::materials::Material;
    use crate::nuclear::TabulatedLibrary;
    use crate::types::Vec3;

    fn plf(x: &[f64], y: &[f64]) -> PiecewiseLinear {
        PiecewiseLinear::new(x.to_vec(), y.to_vec()).unwrap()
    }

    fn library() -> TabulatedLibrary {
        TabulatedLibrary::new()
            .with("A", 294.0, plf(&[1.0, 4.0, 10.0], &[2.0, 2.0, 2.0]))
            .with("A", 600.0, plf(&[1.0, 10.0], &[4.0, 1.0]))
            .with("B", 294.0, plf(&[1.0, 5.0, 10.0], &[1.0, 3.0, 1.0]))
    }

    #[test]
    fn test_nuclide_majorant_over_temperatures() {
        let lib = library();
        let m = NuclideMajorant::build("A", &[Some(294.0), Some(600.0), None], &lib).unwrap();
        assert_eq!(m.temperatures(), &[294.0, 600.0]);

        let f = m.function().unwrap();
        for i in 0..=90 {
            let e = 1.0 + 0.1 * i as f64;
            let expected = 2.0f64.max(4.0 - 3.0 * (e - 1.0) / 9.0);
            assert!((f.evaluate(e).unwrap() - expected).abs() < 1e-9);
        }
        // Crossing at E = 7
        assert!(m.e_grid().iter().any(|&e| (e - 7.0).abs() < 1e-9));
    }

    #[test]
    fn test_nuclide_majorant_defaults_temperature() {
        let lib = library();
        let m = NuclideMajorant::build("B", &[], &lib).unwrap();
        assert_eq!(m.temperatures(), &[DEFAULT_TEMPERATURE]);
        assert_eq!(m.xs(), &[1.0, 3.0, 1.0]);
    }

    #[test]
    fn test_material_xs_requires_common_grid() {
        let lib = library();
        let mut majorants = BTreeMap::new();
        for n in ["A", "B"] {
            majorants.insert(n.to_string(), NuclideMajorant::build(n, &[None], &lib).unwrap());
        }
        let material = Material::new(0, "mix", 1.0, 10.0)
            .unwrap()
            .with_nuclide("A", 1.0)
            .with_nuclide("B", 0.5);

        let grid = common_energy_grid(&majorants);
        assert_eq!(grid, vec![1.0, 4.0, 5.0, 10.0]);

        let unaligned = MaterialMajorant::new(&material, &majorants).unwrap();
        assert!(matches!(unaligned.xs(&grid), Err(DeltaError::ShapeMismatch(_))));

        for m in majorants.values_mut() {
            m.resample_onto(&grid).unwrap();
        }
        let aligned = MaterialMajorant::new(&material, &majorants).unwrap();
        let xs = aligned.xs(&grid).unwrap();
        let n = material.atom_density_factor();
        assert!((xs[2] - n * (2.0 + 0.5 * 3.0)).abs() < 1e-15);
        assert_eq!(aligned.e_grid(), &grid[..]);
    }

    #[test]
    fn test_material_with_missing_nuclide() {
        let material = Material::new(0, "x", 1.0, 1.0).unwrap().with_nuclide("Z", 1.0);
        assert!(matches!(
            MaterialMajorant::new(&material, &BTreeMap::new()),
            Err(DeltaError::UnknownNuclide(_))
        ));
    }

    fn geometry() -> Geometry {
        let m1 = Material::new(1, "one", 1.0, 10.0).unwrap().with_nuclide("A", 1.0);
        let m2 = Material::new(2, "two", 2.0, 10.0)
            .unwrap()
            .with_nuclide("B", 1.0)
            .with_nuclide("A", 0.1);
        let inner = Surface::Sphere { center: Vec3::zero(), radius: 1.0 };
        let outer = Surface::Sphere { center: Vec3::zero(), radius: 2.0 };
        Geometry::new()
            .with_cell(Cell::with_material(0, "inner", Region::Inside(inner.clone()), m1).at_temperature(600.0))
            .with_cell(Cell::with_material(1, "outer", Region::shell(inner, outer), m2))
    }

    #[test]
    fn test_pipeline_dominates_every_cell() {
        let lib = library();
        let mut g = geometry();
        let majorant = majorant_from_geometry(&g, &lib).unwrap();

        g.tabulate_cross_sections(&lib).unwrap();
        for i in 0..=900 {
            let e = 1.0 + 0.01 * i as f64;
            let m = majorant.evaluate(e).unwrap();
            for region in 0..2 {
                let local = crate::geometry::TransportGeometry::region_cross_section(&g, region, e).unwrap();
                assert!(local <= m * (1.0 + 1e-9), "E = {}: {} > {}", e, local, m);
            }
        }
    }

    #[test]
    fn test_pipeline_grid_and_materials() {
        let lib = library();
        let (grid, materials) = majorants_from_geometry(&geometry(), &lib).unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name(), "one");
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(grid.first(), Some(&1.0));
        assert_eq!(grid.last(), Some(&10.0));
        for m in &materials {
            assert_eq!(m.xs(&grid).unwrap().len(), grid.len());
        }
    }

    #[test]
    fn test_global_majorant_matches_material_max() {
        let lib = library();
        let (grid, materials) = majorants_from_geometry(&geometry(), &lib).unwrap();
        let global = GlobalMajorant::from_materials(&grid, &materials).unwrap();
        assert_eq!(global.energy_grid(), &grid[..]);

        let functions: Vec<PiecewiseLinear> =
            materials.iter().map(|m| m.function(&grid).unwrap()).collect();
        for i in 0..=180 {
            let e = 1.0 + 0.05 * i as f64;
            let expected = functions
                .iter()
                .map(|f| f.evaluate(e).unwrap())
                .fold(f64::NEG_INFINITY, f64::max);
            let got = global.evaluate(e).unwrap();
            assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    fn single_cell(material: Material) -> Geometry {
        let ball = Surface::Sphere { center: Vec3::zero(), radius: 1.0 };
        Geometry::new().with_cell(Cell::with_material(0, "ball", Region::Inside(ball), material))
    }

    #[test]
    fn test_pipeline_with_constant_nuclide() {
        let lib = library().with("C", 294.0, PiecewiseLinear::constant(4.0));
        let mixed = Material::new(3, "mixed", 1.0, 10.0)
            .unwrap()
            .with_nuclide("B", 1.0)
            .with_nuclide("C", 0.5);
        let n = mixed.atom_density_factor();
        let mut g = single_cell(mixed);

        let (grid, materials) = majorants_from_geometry(&g, &lib).unwrap();
        assert_eq!(grid, vec![1.0, 5.0, 10.0]);
        let majorant = GlobalMajorant::from_materials(&grid, &materials).unwrap();

        g.tabulate_cross_sections(&lib).unwrap();
        for (e, sigma_b) in [(1.0, 1.0), (3.0, 2.0), (5.0, 3.0), (10.0, 1.0)] {
            let expected = n * (sigma_b + 0.5 * 4.0);
            let local = crate::geometry::TransportGeometry::region_cross_section(&g, 0, e).unwrap();
            assert!((majorant.evaluate(e).unwrap() - expected).abs() < 1e-12, "E = {}", e);
            assert!((local - expected).abs() < 1e-12, "E = {}", e);
        }
    }

    #[test]
    fn test_pipeline_all_constant() {
        let lib = TabulatedLibrary::new().with("C", 294.0, PiecewiseLinear::constant(4.0));
        let flat = Material::new(4, "flat", 1.0, 10.0).unwrap().with_nuclide("C", 1.0);
        let n = flat.atom_density_factor();

        let majorant = majorant_from_geometry(&single_cell(flat), &lib).unwrap();
        assert!(majorant.function().unwrap().is_constant());
        assert!((majorant.evaluate(1e3).unwrap() - 4.0 * n).abs() < 1e-12);
    }

    #[test]
    fn test_empty_global_majorant() {
        let global = GlobalMajorant::from_materials(&[1.0, 2.0], &[]).unwrap();
        assert!(matches!(global.evaluate(1.5), Err(DeltaError::EmptyEnvelope)));
    }
}
