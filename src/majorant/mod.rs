//! # Majorant Envelope Module
//!
//! Exact pointwise maximum of piecewise-linear cross sections.
//!
//! ## Theory
//!
//! Delta tracking samples flight distances against a majorant `Σ_maj(E)` that
//! must satisfy
//!
//! ```text
//! Σ_maj(E) ≥ Σ_t(r, E)    for every position r and energy E
//! ```
//!
//! Sampling both curves on a shared grid and taking the larger value per grid
//! point is not enough: between grid points two crossing segments can rise
//! above the sampled maximum. The merge below walks both curves segment by
//! segment and inserts the true crossing points, so linear interpolation of
//! the result never dips below either input.
//!
//! ```text
//!   σ           B
//!   │    A ●───●╲        ●───●
//!   │     ╱     ╲╲  ✕   ╱
//!   │ ●──●       ●╲╱╲──●        ✕ = inserted crossing point
//!   └─────────────────────── E
//! ```
//!
//! ## References
//!
//! - Woodcock et al., "Techniques used in the GEM code for Monte Carlo
//!   neutronics calculations in reactors and other systems of complex geometry"
//! - Leppänen, "Performance of Woodcock delta-tracking in lattice physics
//!   applications using the Serpent Monte Carlo reactor physics burnup code"

pub mod compose;

pub use compose::{
    common_energy_grid, majorant_from_geometry, majorants_from_geometry, GlobalMajorant,
    MaterialMajorant, NuclideMajorant,
};

use log::warn;

use crate::error::{DeltaError, Result};
use crate::plf::{Cursor, PiecewiseLinear, Point};

/// Slack allowed on the segment parameter before a crossing is rejected.
///
/// Crossings that land on a shared end point are otherwise lost to rounding.
const INTERSECTION_SNAP: f64 = 1e-9;

// ============================================================================
// ENVELOPE ACCUMULATOR
// ============================================================================

/// Running pointwise maximum of piecewise-linear functions
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    data: Option<PiecewiseLinear>,
}

impl Envelope {
    /// Create empty envelope
    pub fn new() -> Self {
        Self { data: None }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Current envelope function
    pub fn function(&self) -> Result<&PiecewiseLinear> {
        self.data.as_ref().ok_or(DeltaError::EmptyEnvelope)
    }

    pub fn into_function(self) -> Result<PiecewiseLinear> {
        self.data.ok_or(DeltaError::EmptyEnvelope)
    }

    pub fn x_values(&self) -> &[f64] {
        self.data.as_ref().map_or(&[][..], |f| f.x())
    }

    pub fn y_values(&self) -> &[f64] {
        self.data.as_ref().map_or(&[][..], |f| f.y())
    }

    pub fn evaluate(&self, x: f64) -> Result<f64> {
        self.function()?.evaluate(x)
    }

    /// Fold one more function into the running maximum
    pub fn update(&mut self, other: &PiecewiseLinear) -> Result<()> {
        let merged = match &self.data {
            None => other.clone(),
            Some(current) => merge_max(current, other)?,
        };
        self.data = Some(merged);
        Ok(())
    }

    /// Replace the envelope by its values on `grid`
    pub fn resample(&mut self, grid: &[f64]) -> Result<()> {
        let resampled = self.function()?.resample(grid)?;
        self.data = Some(resampled);
        Ok(())
    }

    /// Build by folding `others` in order
    ///
    /// The evaluated function does not depend on the order; the breakpoint set
    /// may.
    pub fn from_others<'a, I>(others: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a PiecewiseLinear>,
    {
        let mut out = Self::new();
        for other in others {
            out.update(other)?;
        }
        Ok(out)
    }
}

impl From<PiecewiseLinear> for Envelope {
    fn from(plf: PiecewiseLinear) -> Self {
        Self { data: Some(plf) }
    }
}

// ============================================================================
// MERGE
// ============================================================================

/// Exact pointwise maximum of `a` and `b` over their common domain
///
/// Breakpoints of the result are the maximal breakpoints of both inputs plus
/// every crossing point between them.
///
/// A single-point (flat) input is stretched over the other input's domain.
pub fn merge_max(a: &PiecewiseLinear, b: &PiecewiseLinear) -> Result<PiecewiseLinear> {
    match (a.is_constant(), b.is_constant()) {
        (true, true) => Ok(PiecewiseLinear::constant(a.y()[0].max(b.y()[0]))),
        (true, false) => merge_tabulated(&flat_over(a.y()[0], b), b),
        (false, true) => merge_tabulated(a, &flat_over(b.y()[0], a)),
        (false, false) => merge_tabulated(a, b),
    }
}

/// Flat function with value `y` spanning the domain of `other`
fn flat_over(y: f64, other: &PiecewiseLinear) -> PiecewiseLinear {
    let (lo, hi) = other.domain();
    PiecewiseLinear::from_sorted(vec![lo, hi], vec![y, y])
}

fn merge_tabulated(a: &PiecewiseLinear, b: &PiecewiseLinear) -> Result<PiecewiseLinear> {
    let mut cursor_a = a.cursor();
    let mut cursor_b = b.cursor();

    let a0 = cursor_a.current()?;
    let b0 = cursor_b.current()?;

    // Smaller starting x leads; equal starts go to the taller curve
    let a_leads = if a0.x != b0.x { a0.x < b0.x } else { a0.y > b0.y };

    // (point, maximal) pairs; non-maximal points only keep the cursors in step
    let mut trace: Vec<(Point, bool)> = Vec::with_capacity(a.len() + b.len());

    {
        let (mut current, mut trailing): (&mut Cursor, &mut Cursor) = if a_leads {
            (&mut cursor_a, &mut cursor_b)
        } else {
            (&mut cursor_b, &mut cursor_a)
        };

        trace.push((current.pop_advance()?, true));

        while !current.is_exhausted() && !trailing.is_exhausted() {
            let current_next = current.current()?;
            let other_next = trailing.current()?;
            let last = trace[trace.len() - 1].0;

            let above = is_above(last, current_next, other_next);
            let nearer = other_next.x < current_next.x;

            if above {
                match trailing.previous() {
                    Ok(other_prev) => {
                        match crossing(last, current_next, other_prev, other_next) {
                            Some(p) => {
                                trace.push((p, true));
                                std::mem::swap(&mut current, &mut trailing);
                            }
                            // Trailing curve already above at `last`: a vertical
                            // step in its data, the envelope steps up with it
                            None if line_value(other_prev, other_next, last.x) > last.y => {
                                if let Some(entry) = trace.last_mut() {
                                    entry.1 = true;
                                }
                                let top = line_value(other_prev, other_next, last.x);
                                trace.push((Point::new(last.x, top), true));
                                std::mem::swap(&mut current, &mut trailing);
                            }
                            None => {
                                if nearer {
                                    warn!(
                                        "No intersection found for a nearer point above the \
                                         envelope segment ({}, {}) -> ({}, {})",
                                        last.x, last.y, current_next.x, current_next.y
                                    );
                                }
                                trace.push((current_next, true));
                            }
                        }
                    }
                    // Trailing curve has not started yet: the maximum jumps up to it
                    Err(_) if other_next.x <= current_next.x => {
                        let foot = line_value(last, current_next, other_next.x);
                        trace.push((Point::new(other_next.x, foot), true));
                        trace.push((other_next, true));
                        std::mem::swap(&mut current, &mut trailing);
                    }
                    Err(_) => trace.push((current_next, true)),
                }
            } else if nearer {
                let y = line_value(last, current_next, other_next.x);
                trace.push((Point::new(other_next.x, y), false));
            } else {
                trace.push((current_next, true));
            }

            let emitted_x = trace[trace.len() - 1].0.x;
            current.advance_past(emitted_x);
            if current.is_exhausted() {
                break;
            }
            trailing.advance_past(emitted_x);
        }
    }

    assert!(
        cursor_a.is_exhausted() || cursor_b.is_exhausted(),
        "envelope merge finished with both curves unexhausted"
    );

    let mut x = Vec::with_capacity(trace.len());
    let mut y = Vec::with_capacity(trace.len());
    for (p, _) in trace.into_iter().filter(|(_, maximal)| *maximal) {
        x.push(p.x);
        y.push(p.y);
    }
    for p in cursor_a.remaining().chain(cursor_b.remaining()) {
        x.push(p.x);
        y.push(p.y);
    }

    Ok(PiecewiseLinear::from_sorted(x, y))
}

/// Value at `x` of the line through `p1` and `p2`
///
/// A vertical pair takes the larger of the two values.
fn line_value(p1: Point, p2: Point, x: f64) -> f64 {
    let dx = p2.x - p1.x;
    if dx == 0.0 {
        return p1.y.max(p2.y);
    }
    p1.y + (p2.y - p1.y) / dx * (x - p1.x)
}

/// True when `p3` lies strictly above the line `p1 → p2`
pub fn is_above(p1: Point, p2: Point, p3: Point) -> bool {
    line_value(p1, p2, p3.x) < p3.y
}

/// Intersection of segments `p1 → p2` and `p3 → p4`
///
/// Parallel or collinear segments (zero determinant) and crossings with the
/// parameter `t` of `p1 → p2` outside `[0, 1]` give `None`.
pub fn intersect_2d(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let t = segment_parameter(p1, p2, p3, p4)?;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(point_on_segment(p1, p2, t))
}

/// [`intersect_2d`] with `t` snapped onto `[0, 1]` when it overshoots by rounding
fn crossing(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    intersect_2d(p1, p2, p3, p4).or_else(|| {
        let t = segment_parameter(p1, p2, p3, p4)?;
        if t >= -INTERSECTION_SNAP && t <= 1.0 + INTERSECTION_SNAP {
            Some(point_on_segment(p1, p2, t.clamp(0.0, 1.0)))
        } else {
            None
        }
    })
}

fn segment_parameter(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<f64> {
    let denominator = (p4.x - p3.x) * (p1.y - p2.y) - (p1.x - p2.x) * (p4.y - p3.y);
    if denominator == 0.0 {
        return None;
    }
    let numerator = (p3.y - p4.y) * (p1.x - p3.x) + (p4.x - p3.x) * (p1.y - p3.y);
    Some(numerator / denominator)
}

fn point_on_segment(p1: Point, p2: Point, t: f64) -> Point {
    let x = p1.x + (p2.x - p1.x) * t;
    Point::new(x, line_value(p1, p2, x))
}

// ============================================================================
// TESTS
// ============================================================================
