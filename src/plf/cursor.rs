//! Index cursor for co-iterating two piecewise-linear functions

use thiserror::Error;

use super::{PiecewiseLinear, Point};

/// Read past either end of the underlying breakpoints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Index {index} out of range for {len} breakpoints")]
    OutOfRange { index: usize, len: usize },

    #[error("No breakpoint before index 0")]
    BeforeStart,
}

/// Stepping position over a [`PiecewiseLinear`]
///
/// Exhaustion (`is_exhausted`) is normal completion; reading while exhausted is
/// a [`CursorError`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    plf: &'a PiecewiseLinear,
    index: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(plf: &'a PiecewiseLinear) -> Self {
        Self { plf, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.plf.len()
    }

    /// Point at the cursor
    pub fn current(&self) -> Result<Point, CursorError> {
        self.plf.point(self.index).ok_or(CursorError::OutOfRange {
            index: self.index,
            len: self.plf.len(),
        })
    }

    /// Point just behind the cursor
    pub fn previous(&self) -> Result<Point, CursorError> {
        if self.index == 0 {
            return Err(CursorError::BeforeStart);
        }
        self.plf.point(self.index - 1).ok_or(CursorError::OutOfRange {
            index: self.index - 1,
            len: self.plf.len(),
        })
    }

    /// Return the current point, then step forward
    pub fn pop_advance(&mut self) -> Result<Point, CursorError> {
        let out = self.current()?;
        self.index += 1;
        Ok(out)
    }

    /// Step forward while the current x is `<= threshold`
    pub fn advance_past(&mut self, threshold: f64) {
        while let Some(p) = self.plf.point(self.index) {
            if p.x > threshold {
                break;
            }
            self.index += 1;
        }
    }

    /// Points not yet visited
    pub fn remaining(&self) -> impl Iterator<Item = Point> + 'a {
        let plf = self.plf;
        (self.index.min(plf.len())..plf.len()).filter_map(move |i| plf.point(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> PiecewiseLinear {
        PiecewiseLinear::new(vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 30.0, 40.0]).unwrap()
    }

    #[test]
    fn test_pop_and_previous() {
        let f = data();
        let mut c = f.cursor();
        assert_eq!(c.previous(), Err(CursorError::BeforeStart));
        assert_eq!(c.pop_advance().unwrap(), Point::new(1.0, 10.0));
        assert_eq!(c.current().unwrap(), Point::new(2.0, 20.0));
        assert_eq!(c.previous().unwrap(), Point::new(1.0, 10.0));
    }

    #[test]
    fn test_advance_past() {
        let f = data();
        let mut c = f.cursor();
        c.advance_past(2.0);
        assert_eq!(c.index(), 2);
        c.advance_past(2.5);
        assert_eq!(c.index(), 2);
        c.advance_past(10.0);
        assert!(c.is_exhausted());
    }

    #[test]
    fn test_exhausted_reads_are_errors() {
        let f = data();
        let mut c = f.cursor();
        for _ in 0..4 {
            c.pop_advance().unwrap();
        }
        assert!(c.is_exhausted());
        assert_eq!(c.current(), Err(CursorError::OutOfRange { index: 4, len: 4 }));
        assert!(c.pop_advance().is_err());
        assert_eq!(c.previous().unwrap(), Point::new(4.0, 40.0));
    }

    #[test]
    fn test_remaining() {
        let f = data();
        let mut c = f.cursor();
        c.advance_past(2.0);
        let rest: Vec<f64> = c.remaining().map(|p| p.x).collect();
        assert_eq!(rest, vec![3.0, 4.0]);
    }
}
