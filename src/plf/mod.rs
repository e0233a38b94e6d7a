//! # Piecewise-Linear Functions
//!
//! Tabulated functions `y(x)` defined by ordered breakpoints with linear
//! interpolation in between. Used for point-wise cross sections `σ(E)` and for
//! the majorant envelopes built from them.
//!
//! ## Representation
//!
//! ```text
//!   y
//!   │      (x₂,y₂)
//!   │        ●───────●(x₃,y₃)
//!   │       ╱
//!   │  ●───●
//!   │(x₀,y₀)(x₁,y₁)
//!   └──────────────────── x
//! ```
//!
//! A single-point function is flat: it evaluates to its only value everywhere
//! and stands in for energy-independent cross sections.

mod cursor;

pub use cursor::{Cursor, CursorError};

use crate::error::{DeltaError, Result};
use crate::search::interval_index;

/// A breakpoint `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Piecewise-linear function over strictly increasing breakpoints
///
/// Envelopes produced by [`crate::majorant::merge_max`] may repeat an x value
/// where the maximum jumps; evaluation at such a point returns the larger value.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl PiecewiseLinear {
    /// Create from breakpoints, validating shape and ordering
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(DeltaError::ShapeMismatch(format!(
                "{} x values but {} y values",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(DeltaError::ShapeMismatch(
                "a piecewise-linear function needs at least one point".into(),
            ));
        }
        if let Some(i) = (1..x.len()).find(|&i| !(x[i] > x[i - 1])) {
            return Err(DeltaError::ShapeMismatch(format!(
                "x values must be strictly increasing (x[{}] = {}, x[{}] = {})",
                i - 1,
                x[i - 1],
                i,
                x[i]
            )));
        }
        Ok(Self { x, y })
    }

    /// Create from non-decreasing breakpoints (repeated x allowed)
    pub(crate) fn from_sorted(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(!x.is_empty());
        debug_assert!(x.windows(2).all(|w| w[0] <= w[1]));
        Self { x, y }
    }

    /// Flat function (energy-independent cross section)
    pub fn constant(value: f64) -> Self {
        Self { x: vec![0.0], y: vec![value] }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false: a function holds at least one point
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.x.len() == 1
    }

    /// `(x_min, x_max)`
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Breakpoint `i`
    pub fn point(&self, i: usize) -> Option<Point> {
        Some(Point::new(*self.x.get(i)?, self.y[i]))
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Point::new(x, y))
    }

    pub fn max_value(&self) -> f64 {
        self.y.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of distinct breakpoint abscissae
    pub fn distinct_len(&self) -> usize {
        1 + self.x.windows(2).filter(|w| w[1] > w[0]).count()
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// Evaluate by linear interpolation
    ///
    /// `y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        if self.is_constant() {
            return Ok(self.y[0]);
        }

        let i = interval_index(&self.x, x)?;
        let mut value = self.segment_value(i, x);

        // Jump discontinuity: take the upper side
        if i > 0 && x == self.x[i] && self.x[i - 1] == x {
            value = value.max(self.y[i - 1]);
        }

        Ok(value)
    }

    /// Re-express this function on `grid`
    ///
    /// `grid` must be strictly increasing, at least as fine as the current
    /// breakpoints and lie inside the current domain. Both sequences are walked
    /// once with a monotonically advancing segment index.
    ///
    /// Grid points outside the domain are a [`DeltaError::Domain`] error rather
    /// than being filled with placeholder values.
    pub fn resample(&self, grid: &[f64]) -> Result<PiecewiseLinear> {
        if grid.len() < self.distinct_len() {
            return Err(DeltaError::ShapeMismatch(format!(
                "resample grid of {} points is coarser than the {} source breakpoints",
                grid.len(),
                self.distinct_len()
            )));
        }

        if self.is_constant() {
            return PiecewiseLinear::new(grid.to_vec(), vec![self.y[0]; grid.len()]);
        }

        let (min, max) = self.domain();
        if let Some(&g) = grid.iter().find(|&&g| !(min..=max).contains(&g)) {
            return Err(DeltaError::Domain { value: g, min, max });
        }

        let n = self.x.len();
        let last_segment = n - 2;
        let mut segment = 0;
        let mut values = Vec::with_capacity(grid.len());

        for &g in grid {
            while segment < last_segment && self.x[segment + 1] < g {
                segment += 1;
            }

            let mut value = self.segment_value(segment, g);
            let mut j = segment + 1;
            while j < n && self.x[j] == g {
                value = value.max(self.y[j]);
                j += 1;
            }
            values.push(value);
        }

        PiecewiseLinear::new(grid.to_vec(), values)
    }

    /// Value on segment `[x[i], x[i+1]]`; zero-width segments give the larger end
    fn segment_value(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let dx = x1 - x0;
        if dx == 0.0 {
            return y0.max(y1);
        }
        y0 + (y1 - y0) * (x - x0) / dx
    }
}

/// Sorted, deduplicated union of several breakpoint sets
pub fn union_grid<'a, I>(grids: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut out: Vec<f64> = grids.into_iter().flatten().copied().collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}
