//! # Delta-Tracking Transport Module
//!
//! Woodcock (delta) tracking of neutral particles through a cell geometry.
//!
//! ## Theory
//!
//! Flight distances are sampled against a majorant `Σ_maj(E) ≥ Σ_t(r, E)`
//! that is constant in space, so no distance-to-boundary is ever computed.
//! At the end of each flight the collision is accepted as real with
//! probability
//!
//! ```text
//! P(real) = Σ_t(r, E) / Σ_maj(E)
//! ```
//!
//! and is otherwise virtual (the particle continues unchanged). Real
//! collisions then occur at exactly the rate an analog walk in `Σ_t` would
//! produce, provided the majorant really bounds every local cross section.
//! A local value above the majorant is a fatal
//! [`DeltaError::EnvelopeConsistencyViolation`]: statistics past that point
//! would be biased.
//!
//! ## Algorithm
//!
//! ```text
//! loop
//!   E ≤ E_cut            → absorbed
//!   d = -ln(ξ) / Σ_maj(E); r += dΩ
//!   locate(r) fails      → escaped
//!   Σ_t(r, E) > Σ_maj(E) → fatal
//!   ξ < Σ_t / Σ_maj      → scatter
//! ```
//!
//! ## References
//!
//! - Woodcock et al., "Techniques used in the GEM code for Monte Carlo
//!   neutronics calculations in reactors and other systems of complex geometry"
//! - Lux & Koblinger, "Monte Carlo Particle Transport Methods"

mod settings;

pub use settings::TransportSettings;

use log::{debug, error, info};

use crate::constants::CONSISTENCY_TOLERANCE;
use crate::error::{DeltaError, Result};
use crate::geometry::TransportGeometry;
use crate::particle::{Particle, ParticleFactory, ParticleState};
use crate::plf::PiecewiseLinear;
use crate::stochastic::{RandomGenerator, UniformSource};
use crate::types::IdAllocator;

/// How a history ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Left the geometry
    Escaped,
    /// Energy reached the cutoff
    Absorbed,
    /// Hit the per-history flight limit
    EventLimit,
}

/// Result of one history
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub id: u64,
    pub advances: usize,
    pub scatters: usize,
    pub outcome: Outcome,
    pub final_energy: f64,
}

/// Aggregate statistics over all histories of a tracker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportStats {
    pub histories_run: usize,
    /// Tentative flights
    pub advances: usize,
    pub real_collisions: usize,
    pub virtual_collisions: usize,
    pub escapes: usize,
    pub absorptions: usize,
    pub event_limits: usize,
    /// Total distance flown (cm)
    pub path_length: f64,
}

impl TransportStats {
    /// Real collisions per unit path length (1/cm)
    ///
    /// In a homogeneous medium this estimates its total cross section.
    pub fn collision_rate(&self) -> f64 {
        if self.path_length > 0.0 {
            self.real_collisions as f64 / self.path_length
        } else {
            0.0
        }
    }

    /// Fraction of tentative collisions that were real
    pub fn acceptance_ratio(&self) -> f64 {
        let total = self.real_collisions + self.virtual_collisions;
        if total > 0 {
            self.real_collisions as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Delta-tracking random walk driver
///
/// Owns the run's random generator and identifier allocator; borrows the
/// majorant and geometry, which stay immutable for the whole run.
pub struct DeltaTracker<'a, G: TransportGeometry + ?Sized> {
    majorant: &'a PiecewiseLinear,
    geometry: &'a G,
    settings: TransportSettings,
    rng: RandomGenerator,
    ids: IdAllocator,
    stats: TransportStats,
}

impl<'a, G: TransportGeometry + ?Sized> DeltaTracker<'a, G> {
    pub fn new(
        majorant: &'a PiecewiseLinear,
        geometry: &'a G,
        settings: TransportSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            majorant,
            geometry,
            rng: RandomGenerator::new(settings.seed),
            settings,
            ids: IdAllocator::starting_at(1),
            stats: TransportStats::default(),
        })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    /// Run `n_histories` histories from `source`
    pub fn run(
        &mut self,
        source: &dyn ParticleFactory,
        n_histories: usize,
    ) -> Result<Vec<HistorySummary>> {
        info!("Running {} particles...", n_histories);
        let summaries = (0..n_histories)
            .map(|_| self.run_history(source))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Finished: {} real collisions, {} escapes, {} absorptions",
            self.stats.real_collisions, self.stats.escapes, self.stats.absorptions
        );
        Ok(summaries)
    }

    /// Run a single history to completion
    pub fn run_history(&mut self, source: &dyn ParticleFactory) -> Result<HistorySummary> {
        let id = self.ids.allocate();
        let mut particle = source.sample(id, &mut self.rng);

        let outcome = self.transport(&mut particle)?;

        self.stats.histories_run += 1;
        self.stats.advances += particle.advances;
        self.stats.real_collisions += particle.scatters;
        self.stats.virtual_collisions += particle.advances.saturating_sub(particle.scatters);
        self.stats.path_length += particle.path_length;
        match outcome {
            Outcome::Escaped => self.stats.escapes += 1,
            Outcome::Absorbed => self.stats.absorptions += 1,
            Outcome::EventLimit => self.stats.event_limits += 1,
        }

        debug!("{}", particle);

        Ok(HistorySummary {
            id,
            advances: particle.advances,
            scatters: particle.scatters,
            outcome,
            final_energy: particle.energy,
        })
    }

    fn transport(&mut self, particle: &mut Particle) -> Result<Outcome> {
        if particle.locate(self.geometry)?.is_none() {
            debug!("Particle {} born outside the geometry", particle.id);
            return Ok(Outcome::Escaped);
        }

        loop {
            if !(particle.energy > self.settings.energy_cutoff) {
                particle.absorb();
                return Ok(Outcome::Absorbed);
            }
            if particle.advances >= self.settings.max_events {
                debug!(
                    "Particle {} reached the limit of {} flights",
                    particle.id, self.settings.max_events
                );
                return Ok(Outcome::EventLimit);
            }

            let majorant = self.majorant.evaluate(particle.energy)?;
            if !(majorant > 0.0) {
                // Nothing to collide with anywhere: the flight is unbounded
                particle.state = ParticleState::Escaped;
                return Ok(Outcome::Escaped);
            }

            particle.advance(majorant, &mut self.rng);

            let Some(region) = particle.locate(self.geometry)? else {
                return Ok(Outcome::Escaped);
            };

            let local = self.geometry.region_cross_section(region, particle.energy)?;
            if local > majorant * (1.0 + CONSISTENCY_TOLERANCE) {
                error!(
                    "Total cross section {} in region {} exceeds the majorant {} at {} eV",
                    local, region, majorant, particle.energy
                );
                return Err(DeltaError::EnvelopeConsistencyViolation {
                    energy: particle.energy,
                    local,
                    majorant,
                });
            }

            if self.rng.next_uniform() < local / majorant {
                particle.scatter(self.settings.scatter_mass_ratio, &mut self.rng);
            }
        }
    }

    /// Human-readable run summary
    pub fn summary(&self) -> String {
        let s = &self.stats;
        let mut out = String::new();
        out.push_str("=== Delta Tracking Summary ===\n");
        out.push_str(&format!("Histories run: {}\n", s.histories_run));
        out.push_str(&format!("Tentative flights: {}\n", s.advances));
        out.push_str(&format!("Real collisions: {}\n", s.real_collisions));
        out.push_str(&format!("Virtual collisions: {}\n", s.virtual_collisions));
        out.push_str(&format!("Acceptance ratio: {:.4}\n", s.acceptance_ratio()));
        out.push_str(&format!("Escapes: {}\n", s.escapes));
        out.push_str(&format!("Absorptions (E <= {:.3e} eV): {}\n", self.settings.energy_cutoff, s.absorptions));
        out.push_str(&format!("Flight limit reached: {}\n", s.event_limits));
        out.push_str(&format!("Total path length: {:.4e} cm\n", s.path_length));
        out
    }
}
