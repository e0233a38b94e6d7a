//! Particle sources built from independent space, angle and energy samplers

use std::fmt;

use crate::constants::DEFAULT_SOURCE_ENERGY;
use crate::stochastic::UniformSource;
use crate::types::Vec3;

use super::Particle;

/// User-supplied sampling function
pub type SampleFn<T> = Box<dyn Fn(&mut dyn UniformSource) -> T + Send + Sync>;

/// Source position distribution
pub enum SpatialSampler {
    Fixed(Vec3),
    /// Uniform in an axis-aligned box
    Box { min: Vec3, max: Vec3 },
    Custom(SampleFn<Vec3>),
}

impl SpatialSampler {
    pub fn sample(&self, rng: &mut dyn UniformSource) -> Vec3 {
        match self {
            SpatialSampler::Fixed(p) => *p,
            SpatialSampler::Box { min, max } => Vec3::new(
                rng.uniform_range(min.x, max.x),
                rng.uniform_range(min.y, max.y),
                rng.uniform_range(min.z, max.z),
            ),
            SpatialSampler::Custom(f) => f(rng),
        }
    }
}

impl Default for SpatialSampler {
    fn default() -> Self {
        SpatialSampler::Fixed(Vec3::zero())
    }
}

/// Source direction distribution
pub enum AngularSampler {
    Fixed(Vec3),
    Isotropic,
    Custom(SampleFn<Vec3>),
}

impl AngularSampler {
    pub fn sample(&self, rng: &mut dyn UniformSource) -> Vec3 {
        match self {
            AngularSampler::Fixed(u) => *u,
            AngularSampler::Isotropic => rng.isotropic_direction(),
            AngularSampler::Custom(f) => f(rng),
        }
    }
}

impl Default for AngularSampler {
    fn default() -> Self {
        AngularSampler::Isotropic
    }
}

/// Source energy distribution (eV)
pub enum EnergySampler {
    Fixed(f64),
    Uniform { min: f64, max: f64 },
    Custom(SampleFn<f64>),
}

impl EnergySampler {
    pub fn sample(&self, rng: &mut dyn UniformSource) -> f64 {
        match self {
            EnergySampler::Fixed(e) => *e,
            EnergySampler::Uniform { min, max } => rng.uniform_range(*min, *max),
            EnergySampler::Custom(f) => f(rng),
        }
    }
}

impl Default for EnergySampler {
    fn default() -> Self {
        EnergySampler::Fixed(DEFAULT_SOURCE_ENERGY)
    }
}

impl fmt::Debug for SpatialSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialSampler::Fixed(p) => f.debug_tuple("Fixed").field(p).finish(),
            SpatialSampler::Box { min, max } => {
                f.debug_struct("Box").field("min", min).field("max", max).finish()
            }
            SpatialSampler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for AngularSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngularSampler::Fixed(u) => f.debug_tuple("Fixed").field(u).finish(),
            AngularSampler::Isotropic => f.write_str("Isotropic"),
            AngularSampler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for EnergySampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergySampler::Fixed(e) => f.debug_tuple("Fixed").field(e).finish(),
            EnergySampler::Uniform { min, max } => {
                f.debug_struct("Uniform").field("min", min).field("max", max).finish()
            }
            EnergySampler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Anything that can start a particle history
pub trait ParticleFactory {
    fn sample(&self, id: u64, rng: &mut dyn UniformSource) -> Particle;
}

/// Source from independent space, angle and energy distributions
///
/// Defaults to an isotropic point source at the origin emitting 10 eV.
#[derive(Debug, Default)]
pub struct ParticleSource {
    pub space: SpatialSampler,
    pub angle: AngularSampler,
    pub energy: EnergySampler,
}

impl ParticleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set spatial distribution
    pub fn with_space(mut self, space: SpatialSampler) -> Self {
        self.space = space;
        self
    }

    /// Builder: set angular distribution
    pub fn with_angle(mut self, angle: AngularSampler) -> Self {
        self.angle = angle;
        self
    }

    /// Builder: set energy distribution
    pub fn with_energy(mut self, energy: EnergySampler) -> Self {
        self.energy = energy;
        self
    }
}

impl ParticleFactory for ParticleSource {
    fn sample(&self, id: u64, rng: &mut dyn UniformSource) -> Particle {
        let position = self.space.sample(rng);
        let direction = self.angle.sample(rng);
        let energy = self.energy.sample(rng);
        Particle::new(id, position, direction, energy)
    }
}
