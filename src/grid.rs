use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TmmError};
use crate::material::energy_to_wavelength;


/// Evenly spaced photon energies (eV) on `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyGrid {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for EnergyGrid {
    fn default() -> Self {
        Self {
            start: 2.8,
            stop: 4.4,
            step: 0.001,
        }
    }
}

impl EnergyGrid {
    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.start > 0.0) {
            return Err(TmmError::invalid(
                "energy start",
                self.start,
                "must be finite and positive",
            ));
        }
        if !(self.stop.is_finite() && self.stop > self.start) {
            return Err(TmmError::invalid(
                "energy stop",
                self.stop,
                "must be finite and above the start energy",
            ));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(TmmError::invalid(
                "energy step",
                self.step,
                "must be finite and positive",
            ));
        }
        Ok(())
    }

    /// Number of samples, `floor((stop - start) / step)`.
    pub fn len(&self) -> usize {
        ((self.stop - self.start) / self.step).floor() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Photon energies `start + i * step` for `i` in `0..len()`.
    pub fn energies(&self) -> Result<Array1<f64>> {
        self.validate()?;
        Ok(Array1::from_iter(
            (0..self.len()).map(|i| self.start + i as f64 * self.step),
        ))
    }

    /// Vacuum wavelengths (nm) aligned with [`EnergyGrid::energies`].
    pub fn wavelengths(&self) -> Result<Array1<f64>> {
        Ok(self.energies()?.mapv(energy_to_wavelength))
    }
}
