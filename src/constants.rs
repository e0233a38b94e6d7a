//! # Physical Constants
//!
//! Constants and unit conversions for cross-section composition and transport.
//! Energies are in eV, lengths in cm, cross sections in barns (microscopic) or
//! 1/cm (macroscopic).

// ============================================================================
// FUNDAMENTAL CONSTANTS
// ============================================================================

/// Avogadro number (1/mol)
pub const AVOGADRO: f64 = 6.022_140_76e23;

// ============================================================================
// UNIT CONVERSIONS
// ============================================================================

/// 1 barn in cm²
pub const BARN_TO_CM2: f64 = 1e-24;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Temperature used when neither a cell nor its material sets one (K)
pub const DEFAULT_TEMPERATURE: f64 = 294.0;

/// Source energy of the default particle generator (eV)
pub const DEFAULT_SOURCE_ENERGY: f64 = 10.0;

/// Energy at or below which a history is terminated as absorbed (eV)
pub const DEFAULT_ENERGY_CUTOFF: f64 = 1e-3;

/// Relative slack on the `local <= majorant` check
///
/// Absorbs rounding between a majorant folded on a shared grid and the same
/// cross section evaluated directly at the particle energy.
pub const CONSISTENCY_TOLERANCE: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_density_factor_of_water() {
        // H2O: 1 g/cm³, 18.015 g/mol → 0.0334 molecules (0.1003 atoms) per barn-cm
        let factor = AVOGADRO * 1.0 / 18.015 * BARN_TO_CM2;
        assert!((factor - 0.03343).abs() < 1e-4);
        assert!((3.0 * factor - 0.1003).abs() < 1e-3);
    }
}
