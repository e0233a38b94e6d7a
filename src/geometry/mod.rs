//! # Geometry Module
//!
//! Constructive solid geometry (CSG) cells carrying total cross sections.
//!
//! Delta tracking never computes distances to boundaries: it only asks which
//! cell contains a point and what that cell's total cross section is at the
//! particle energy. [`TransportGeometry`] is that interface.

use log::debug;

use crate::error::{DeltaError, Result};
use crate::materials::{effective_temperature, Material, MaterialComposition};
use crate::nuclear::CrossSectionLibrary;
use crate::plf::PiecewiseLinear;
use crate::types::Vec3;

/// What the transport loop needs from a geometry
pub trait TransportGeometry {
    /// Region containing `position`, `None` outside the model
    ///
    /// `direction` breaks ties for points exactly on a surface.
    fn locate(&self, position: &Vec3, direction: &Vec3) -> Result<Option<usize>>;

    /// Total macroscopic cross section (1/cm) of `region` at `energy` (eV)
    fn region_cross_section(&self, region: usize, energy: f64) -> Result<f64>;
}

// ============================================================================
// SURFACES AND REGIONS
// ============================================================================

/// Surface primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Plane: n·r = d
    Plane { normal: Vec3, d: f64 },
    /// Sphere: (x-x0)² + (y-y0)² + (z-z0)² = R²
    Sphere { center: Vec3, radius: f64 },
    /// Cylinder along Z: (x-x0)² + (y-y0)² = R²
    CylinderZ { center: (f64, f64), radius: f64 },
}

impl Surface {
    /// Evaluate surface equation (negative = inside, positive = outside)
    pub fn sense(&self, p: &Vec3) -> f64 {
        match self {
            Surface::Plane { normal, d } => normal.dot(p) - d,
            Surface::Sphere { center, radius } => {
                (*p - *center).mag_squared() - radius * radius
            }
            Surface::CylinderZ { center, radius } => {
                let dx = p.x - center.0;
                let dy = p.y - center.1;
                dx * dx + dy * dy - radius * radius
            }
        }
    }

    /// Outward normal direction at `p` (not normalized)
    fn gradient(&self, p: &Vec3) -> Vec3 {
        match self {
            Surface::Plane { normal, .. } => *normal,
            Surface::Sphere { center, .. } => *p - *center,
            Surface::CylinderZ { center, .. } => Vec3::new(p.x - center.0, p.y - center.1, 0.0),
        }
    }

    /// Side of the surface, resolving points on it by the travel direction
    fn is_inside(&self, p: &Vec3, u: &Vec3) -> bool {
        let s = self.sense(p);
        if s == 0.0 {
            self.gradient(p).dot(u) < 0.0
        } else {
            s < 0.0
        }
    }
}

/// Region definition (CSG)
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Inside a surface (negative sense)
    Inside(Surface),
    /// Outside a surface (positive sense)
    Outside(Surface),
    /// Intersection (AND)
    Intersection(Vec<Region>),
    /// Union (OR)
    Union(Vec<Region>),
    /// Complement (NOT)
    Complement(Box<Region>),
    /// All of space
    Everywhere,
}

impl Region {
    /// Check if point is inside region, moving along `u`
    pub fn contains(&self, p: &Vec3, u: &Vec3) -> bool {
        match self {
            Region::Inside(s) => s.is_inside(p, u),
            Region::Outside(s) => !s.is_inside(p, u),
            Region::Intersection(regions) => regions.iter().all(|r| r.contains(p, u)),
            Region::Union(regions) => regions.iter().any(|r| r.contains(p, u)),
            Region::Complement(r) => !r.contains(p, u),
            Region::Everywhere => true,
        }
    }

    /// Points between two surfaces: outside `inner`, inside `outer`
    pub fn shell(inner: Surface, outer: Surface) -> Self {
        Region::Intersection(vec![Region::Outside(inner), Region::Inside(outer)])
    }
}

// ============================================================================
// CELLS
// ============================================================================

/// Total cross section of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellXs {
    /// Energy-independent (1/cm)
    Constant(f64),
    /// Point-wise in energy (1/cm over eV)
    Tabulated(PiecewiseLinear),
}

impl CellXs {
    pub fn evaluate(&self, energy: f64) -> Result<f64> {
        match self {
            CellXs::Constant(v) => Ok(*v),
            CellXs::Tabulated(xs) => xs.evaluate(energy),
        }
    }

    /// Largest value over all energies
    pub fn max_value(&self) -> f64 {
        match self {
            CellXs::Constant(v) => *v,
            CellXs::Tabulated(xs) => xs.max_value(),
        }
    }
}

/// Geometry cell for delta tracking
#[derive(Debug, Clone)]
pub struct Cell {
    pub id: u64,
    pub name: String,
    pub region: Region,
    /// Material fill, `None` for cells given a cross section directly
    pub material: Option<Material>,
    /// Cell temperature (K), overrides the material's
    pub temperature: Option<f64>,
    pub xs: CellXs,
}

impl Cell {
    /// Cell with a fixed total cross section
    pub fn with_constant_xs(id: u64, name: &str, region: Region, sigma_t: f64) -> Self {
        Self {
            id,
            name: name.into(),
            region,
            material: None,
            temperature: None,
            xs: CellXs::Constant(sigma_t),
        }
    }

    /// Cell filled with `material`; the cross section is set by
    /// [`Geometry::tabulate_cross_sections`]
    pub fn with_material(id: u64, name: &str, region: Region, material: Material) -> Self {
        Self {
            id,
            name: name.into(),
            region,
            material: Some(material),
            temperature: None,
            xs: CellXs::Constant(0.0),
        }
    }

    /// Builder: set cell temperature (K)
    pub fn at_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Temperature the material is evaluated at, `None` without a material
    pub fn material_temperature(&self) -> Option<f64> {
        self.material
            .as_ref()
            .map(|m| effective_temperature(self.temperature, m.temperature()))
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Ordered list of cells; the first cell containing a point wins
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    cells: Vec<Cell>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Builder form of [`add_cell`](Self::add_cell)
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.add_cell(cell);
        self
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, region: usize) -> Result<&Cell> {
        self.cells.get(region).ok_or(DeltaError::UnknownRegion(region))
    }

    /// Every cell index containing `position`
    ///
    /// More than one entry means overlapping cells; `locate` picks the first.
    pub fn cells_containing(&self, position: &Vec3, direction: &Vec3) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.region.contains(position, direction))
            .map(|(i, _)| i)
            .collect()
    }

    /// Largest total cross section of any cell over all energies
    ///
    /// A valid (if loose) constant majorant for the whole model.
    pub fn constant_majorant(&self) -> Result<f64> {
        if self.cells.is_empty() {
            return Err(DeltaError::EmptyGeometry);
        }
        Ok(self
            .cells
            .iter()
            .map(|c| c.xs.max_value())
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Distinct materials filling cells, in first-appearance order
    pub fn materials(&self) -> Vec<&Material> {
        let mut out: Vec<&Material> = Vec::new();
        for m in self.cells.iter().filter_map(|c| c.material.as_ref()) {
            if !out.iter().any(|seen| seen.id == m.id) {
                out.push(m);
            }
        }
        out
    }

    /// Temperatures a material is needed at: every cell it fills plus its own
    pub fn material_temperatures(&self, material_id: u64) -> Vec<f64> {
        let filled: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|c| c.material.as_ref().map(|m| m.id) == Some(material_id))
            .collect();
        let own = filled
            .first()
            .and_then(|c| c.material.as_ref())
            .map(|m| effective_temperature(None, m.temperature()));

        let mut temps: Vec<f64> = filled
            .iter()
            .filter_map(|c| c.material_temperature())
            .chain(own)
            .collect();
        temps.sort_by(f64::total_cmp);
        temps.dedup();
        temps
    }

    /// Replace every material cell's cross section by the material's
    /// macroscopic cross section at the cell temperature
    pub fn tabulate_cross_sections(&mut self, library: &dyn CrossSectionLibrary) -> Result<()> {
        for cell in &mut self.cells {
            let (Some(material), Some(temperature)) = (&cell.material, cell.material_temperature())
            else {
                continue;
            };
            let xs = material.macroscopic_xs(library, temperature)?;
            debug!(
                "Cell {} ({}): {} at {} K, {} breakpoints, max {:.4e} 1/cm",
                cell.id,
                cell.name,
                material.name,
                temperature,
                xs.len(),
                xs.max_value()
            );
            cell.xs = CellXs::Tabulated(xs);
        }
        Ok(())
    }
}

impl TransportGeometry for Geometry {
    fn locate(&self, position: &Vec3, direction: &Vec3) -> Result<Option<usize>> {
        if self.cells.is_empty() {
            return Err(DeltaError::EmptyGeometry);
        }
        Ok(self
            .cells
            .iter()
            .position(|c| c.region.contains(position, direction)))
    }

    fn region_cross_section(&self, region: usize, energy: f64) -> Result<f64> {
        self.cell(region)?.xs.evaluate(energy)
    }
}
