//! # DELTASIM-RS
//!
//! Majorant cross sections and delta-tracking Monte Carlo transport
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          DELTASIM-RS                                        │
//! │               Woodcock Tracking with Exact Majorants                        │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  LEVEL 1: PLF (piecewise-linear functions, cursors, resampling)             │
//! │  LEVEL 2: MAJORANT (exact upper envelope of PLFs)                           │
//! │  LEVEL 3: COMPOSITION (nuclide → material → global majorant)                │
//! │  LEVEL 4: GEOMETRY (CSG cells with material cross sections)                 │
//! │  LEVEL 5: TRANSPORT (delta tracking, real/virtual collisions)               │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pipeline
//!
//! | Stage              | Input                      | Output                       |
//! |--------------------|----------------------------|------------------------------|
//! | Nuclide majorant   | σ(E) at each temperature   | max over temperatures        |
//! | Common grid        | nuclide majorant grids     | sorted union of energies     |
//! | Material majorant  | fractions, density         | Σ f·N·σ̂ on the common grid    |
//! | Global majorant    | material majorants         | max over materials           |
//! | Delta tracking     | global majorant, geometry  | collision histories          |

pub mod constants;
pub mod error;
pub mod geometry;
pub mod majorant;
pub mod materials;
pub mod nuclear;
pub mod particle;
pub mod plf;
pub mod problems;
pub mod search;
pub mod stochastic;
pub mod transport;
pub mod types;

// Re-exports
pub use constants::*;
pub use error::{DeltaError, Result};
pub use types::*;
pub use plf::{PiecewiseLinear, Point};
pub use majorant::{merge_max, majorant_from_geometry, Envelope, GlobalMajorant};
pub use transport::{DeltaTracker, Outcome, TransportSettings};

/// DELTASIM version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Information about the simulator
pub fn info() -> String {
    format!(
        "DELTASIM-RS v{}\n\
         Majorant cross sections and delta-tracking transport\n\
         Exact piecewise-linear envelopes, deterministic seeds",
        VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let info = info();
        assert!(info.contains("DELTASIM"));
        assert!(info.contains(VERSION));
    }
}
