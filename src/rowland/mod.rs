/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Rowland circle spectrometer geometry
//!
//! This module maps the Bragg angle of a spectrometer built from bent
//! crystal analysers into source/image distances, energies, lab-frame
//! positions and the pivot offsets of off-axis analysers. For ganged
//! analyser rows it also solves the two-bar bender linkage driving them.

mod bender;
mod circle;
mod config;
mod errors;
mod frame;
mod pivot;

pub use bender::{BenderMechanism, BenderSolution, SagittalPoint};
pub use circle::{bragg_energy, RowlandCircle, RowlandSummary};
pub use config::{Actuator, BenderLinkage, Frame, RowlandConfig};
pub use errors::{Result, RowlandError};
pub use frame::MiscutOffset;
pub use pivot::PivotSolution;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pivot_table_matches_bender_input() {
        let config = RowlandConfig::new(1000.0, 75.0, 3.1356 / 4.0)
            .with_analyser(25.0, 32.0, 10.0, 97.0);
        let rc = RowlandCircle::new(config).unwrap();
        let pivots = rc.get_pivots(&[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(pivots.len(), 6);
        assert_eq!(pivots[0].axoff, 0.0);
        assert_eq!(pivots[0].sagoff, 0.0);
        // pivots move monotonically away from the central analyser
        for pair in pivots.windows(2) {
            assert!(pair[1].axoff > pair[0].axoff);
            assert!(pair[1].sagoff > pair[0].sagoff);
        }
        assert_relative_eq!(pivots[5].chi, 9.721782752478282, epsilon = 1e-9);
    }
}
