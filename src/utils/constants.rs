/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical constants and numerical thresholds

/// Planck constant times speed of light in eV·m
pub const HC: f64 = 1.2398418743309972e-6;

/// Conversion factor from metres to Angstroms
pub const M_TO_ANGSTROM: f64 = 1e10;

/// Energy steps (eV) at or below this value are treated as zero
pub const MIN_ENERGY_STEP: f64 = 1e-4;

/// Analyser Z steps (mm) at or below this value are treated as zero
pub const MIN_Z_STEP: f64 = 1e-4;

/// Wavelength in Angstroms for a photon energy in eV
pub fn energy_to_wavelength(energy: f64) -> f64 {
    HC / energy * M_TO_ANGSTROM
}

/// Photon energy in eV for a wavelength in Angstroms
pub fn wavelength_to_energy(wavelength: f64) -> f64 {
    HC / wavelength * M_TO_ANGSTROM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wavelength_energy_conversion() {
        // Cu K-alpha1
        assert_relative_eq!(energy_to_wavelength(8047.8), 1.540597, epsilon = 1e-6);
        let e = 7112.0;
        assert_relative_eq!(wavelength_to_energy(energy_to_wavelength(e)), e, epsilon = 1e-9);
    }
}
