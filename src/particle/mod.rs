//! # Particle Module
//!
//! Neutral particle state for delta tracking.
//!
//! ## Physics
//!
//! Between events a particle flies in a straight line. Flight distances are
//! sampled against the majorant `Σ_maj`, so the particle does not need to know
//! which cells it crosses:
//!
//! ```text
//! d = -ln(ξ) / Σ_maj(E)
//! ```
//!
//! A scatter draws a new isotropic direction and an outgoing energy uniform
//! in `[αE, E]`, `α = ((A-1)/(A+1))²`, the elastic kinematics of a target
//! with mass ratio `A`.

mod source;

pub use source::{AngularSampler, EnergySampler, ParticleFactory, ParticleSource, SpatialSampler};

use std::fmt;

use crate::error::Result;
use crate::geometry::TransportGeometry;
use crate::stochastic::UniformSource;
use crate::types::Vec3;

/// Lifecycle of a particle history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleState {
    Traveling,
    /// Left the geometry
    Escaped,
    /// Energy fell to the cutoff
    Absorbed,
}

/// Neutral particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    /// Position (cm)
    pub position: Vec3,
    /// Direction (unit vector)
    pub direction: Vec3,
    /// Energy (eV)
    pub energy: f64,
    /// Tentative flights taken
    pub advances: usize,
    /// Real collisions
    pub scatters: usize,
    pub state: ParticleState,
    /// Region from the latest `locate`
    pub region: Option<usize>,
    /// Total distance flown (cm)
    pub path_length: f64,
}

impl Particle {
    pub fn new(id: u64, position: Vec3, direction: Vec3, energy: f64) -> Self {
        Self {
            id,
            position,
            direction: direction.normalize(),
            energy,
            advances: 0,
            scatters: 0,
            state: ParticleState::Traveling,
            region: None,
            path_length: 0.0,
        }
    }

    pub fn is_traveling(&self) -> bool {
        self.state == ParticleState::Traveling
    }

    /// Fly a sampled distance against `majorant` (1/cm); returns the distance
    pub fn advance<R: UniformSource + ?Sized>(&mut self, majorant: f64, rng: &mut R) -> f64 {
        let distance = rng.exponential(majorant);
        self.position += self.direction * distance;
        self.path_length += distance;
        self.advances += 1;
        distance
    }

    /// Find the current region; outside the geometry the particle escapes
    pub fn locate<G: TransportGeometry + ?Sized>(&mut self, geometry: &G) -> Result<Option<usize>> {
        self.region = geometry.locate(&self.position, &self.direction)?;
        if self.region.is_none() {
            self.state = ParticleState::Escaped;
        }
        Ok(self.region)
    }

    /// Real collision; returns the outgoing energy
    pub fn scatter<R: UniformSource + ?Sized>(&mut self, mass_ratio: f64, rng: &mut R) -> f64 {
        let alpha = ((mass_ratio - 1.0) / (mass_ratio + 1.0)).powi(2);
        let mu_cm = 2.0 * rng.next_uniform() - 1.0;
        let e_ratio = 0.5 * ((1.0 + alpha) + (1.0 - alpha) * mu_cm);

        self.direction = rng.isotropic_direction();
        self.energy *= e_ratio;
        self.scatters += 1;
        self.energy
    }

    pub fn absorb(&mut self) {
        self.state = ParticleState::Absorbed;
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Particle {}:", self.id)?;
        writeln!(f, "\t Position: {}", self.position)?;
        writeln!(f, "\t Direction: {}", self.direction)?;
        writeln!(f, "\t Energy: {:.6e} eV", self.energy)?;
        writeln!(f, "\t State: {:?}", self.state)?;
        write!(
            f,
            "\t Advances: {}, scatters: {}, path: {:.4e} cm",
            self.advances, self.scatters, self.path_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Cell, Geometry, Region, Surface};
    use crate::stochastic::RandomGenerator;

    fn particle() -> Particle {
        Particle::new(1, Vec3::zero(), Vec3::new(2.0, 0.0, 0.0), 10.0)
    }

    #[test]
    fn test_particle_creation() {
        let p = particle();
        assert_eq!(p.direction, Vec3::unit_x());
        assert!(p.is_traveling());
        assert_eq!(p.advances, 0);
    }

    #[test]
    fn test_advance_moves_along_direction() {
        let mut rng = RandomGenerator::new(42);
        let mut p = particle();
        let d = p.advance(2.0, &mut rng);

        assert!(d > 0.0);
        assert!((p.position.x - d).abs() < 1e-12);
        assert_eq!(p.position.y, 0.0);
        assert_eq!(p.advances, 1);
        assert_eq!(p.path_length, d);
    }

    #[test]
    fn test_mean_free_path() {
        let mut rng = RandomGenerator::new(5);
        let mut p = particle();
        let n = 20000;
        for _ in 0..n {
            p.advance(4.0, &mut rng);
        }
        let mean = p.path_length / n as f64;
        assert!((mean - 0.25).abs() < 0.01, "Mean flight {} should be ~0.25", mean);
    }

    #[test]
    fn test_scatter_hydrogen_energy_range() {
        let mut rng = RandomGenerator::new(42);
        for _ in 0..1000 {
            let mut p = particle();
            let e = p.scatter(1.0, &mut rng);
            assert!((0.0..=10.0).contains(&e));
            assert_eq!(p.scatters, 1);
            assert!((p.direction.mag() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scatter_heavy_target_keeps_energy() {
        let mut rng = RandomGenerator::new(42);
        let a = 238.0;
        let alpha = ((a - 1.0) / (a + 1.0)) * ((a - 1.0) / (a + 1.0));
        for _ in 0..1000 {
            let mut p = particle();
            let e = p.scatter(a, &mut rng);
            assert!(e >= alpha * 10.0 - 1e-12 && e <= 10.0);
        }
    }

    #[test]
    fn test_locate_escape() {
        let geometry = Geometry::new().with_cell(Cell::with_constant_xs(
            0,
            "ball",
            Region::Inside(Surface::Sphere { center: Vec3::zero(), radius: 1.0 }),
            1.0,
        ));
        let mut p = particle();
        assert_eq!(p.locate(&geometry).unwrap(), Some(0));
        assert!(p.is_traveling());

        p.position = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(p.locate(&geometry).unwrap(), None);
        assert_eq!(p.state, ParticleState::Escaped);
    }

    #[test]
    fn test_display() {
        let text = particle().to_string();
        assert!(text.starts_with("Particle 1:"));
        assert!(text.contains("Energy"));
    }
}
