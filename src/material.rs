//! Materials of the mirror / polymer / metal stack.
//!
//! Refractive indices follow the `n = n' - i n''` convention, so a passive
//! absorbing medium carries a negative imaginary part.

use std::fmt;

use num_complex::Complex;

/// Vacuum wavelength times photon energy, in eV nm.
pub const HC_EV_NM: f64 = 1240.0;

/// Thickness of one silicon nitride mirror layer (nm).
pub const MIRROR_SIN_THICKNESS: f64 = 45.1;
/// Thickness of one silicon oxide mirror layer (nm).
pub const MIRROR_SIO_THICKNESS: f64 = 59.5;
/// Number of (SiO, SiN) periods stacked on the first SiN layer.
pub const MIRROR_PERIODS: usize = 8;

/// A homogeneous medium with a constant complex refractive index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Air,
    Aluminium,
    Pmma,
    FusedSilica,
    SiliconNitride,
    SiliconOxide,
    Substrate,
}

impl Material {
    pub fn refr_index(&self) -> Complex<f64> {
        match self {
            Material::Air => Complex::new(1.0, 0.0),
            Material::Aluminium => Complex::new(0.35, -4.1),
            Material::Pmma => Complex::new(1.49, 0.0),
            Material::FusedSilica => Complex::new(1.485, 0.0),
            Material::SiliconNitride => Complex::new(1.96, 0.0),
            Material::SiliconOxide => Complex::new(1.485, 0.0),
            Material::Substrate => Complex::new(1.47865, 0.0),
        }
    }

    /// True if the medium absorbs (non-zero extinction).
    pub fn is_absorbing(&self) -> bool {
        self.refr_index().im != 0.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Material::Air => "air",
            Material::Aluminium => "Al",
            Material::Pmma => "PMMA",
            Material::FusedSilica => "silica",
            Material::SiliconNitride => "SiN",
            Material::SiliconOxide => "SiO",
            Material::Substrate => "substrate",
        };
        write!(f, "{}", name)
    }
}

/// Converts a photon energy in eV to a vacuum wavelength in nm.
pub fn energy_to_wavelength(energy: f64) -> f64 {
    HC_EV_NM / energy
}
