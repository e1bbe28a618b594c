//! Reflectivity and transmittance spectra over an energy sweep.
//!
//! The sweep evaluates one [`StackPlan`] at every wavelength of an
//! [`EnergyGrid`]. Samples are independent and are computed in parallel with
//! rayon; results are collected back in grid order.
//!
//! Sample 0 of the grid is never evaluated: its reflectivity and
//! transmittance stay at `0.0` and the sweep starts at
//! [`FIRST_EVALUATED_SAMPLE`]. Consumers that want the evaluated part only
//! should skip the first entry.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::grid::EnergyGrid;
use crate::material::MIRROR_PERIODS;
use crate::stack::{Stack, StackPlan};

/// Index of the first sample the sweep evaluates.
pub const FIRST_EVALUATED_SAMPLE: usize = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    fn small_grid() -> EnergyGrid {
        EnergyGrid {
            start: 3.0,
            stop: 3.2,
            step: 0.05,
        }
    }

    #[test]
    fn first_sample_is_left_at_zero() {
        let stack = Stack::design(30.0, 100.0, 200.0, MIRROR_PERIODS).unwrap();
        let plan = StackPlan::new(&stack, 0.0).unwrap();
        let spectrum = Spectrum::compute(&plan, &small_grid()).unwrap();
        assert_eq!(spectrum.len(), 4);
        assert_eq!(spectrum.reflectivity[0], 0.0);
        assert_eq!(spectrum.transmittance[0], 0.0);
        assert!(spectrum.reflectivity[1] > 0.0);
    }

    #[test]
    fn parallel_sweep_matches_direct_evaluation() {
        let stack = Stack::design(30.0, 100.0, 200.0, MIRROR_PERIODS).unwrap();
        let plan = StackPlan::new(&stack, 0.3).unwrap();
        let spectrum = Spectrum::compute(&plan, &small_grid()).unwrap();
        for i in FIRST_EVALUATED_SAMPLE..spectrum.len() {
            let (r, t) = plan.response(spectrum.wavelengths[i]).unwrap();
            assert_eq!(spectrum.reflectivity[i], r);
            assert_eq!(spectrum.transmittance[i], t);
        }
    }

    #[test]
    fn summary_skips_unevaluated_sample() {
        let stack = Stack::builder(Material::Substrate)
            .layer(Material::Pmma, 120.0)
            .build(Material::Air)
            .unwrap();
        let plan = StackPlan::new(&stack, 0.0).unwrap();
        let spectrum = Spectrum::compute(&plan, &small_grid()).unwrap();
        let summary = spectrum.summary().unwrap();
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.evaluated, 3);
        assert!(summary.dip.reflectivity > 0.0);
        assert!(summary.peak.reflectivity >= summary.dip.reflectivity);
        assert!(summary.peak.energy >= 3.05 && summary.dip.energy >= 3.05);
    }

    #[test]
    fn summary_needs_evaluated_samples() {
        let stack = Stack::builder(Material::Substrate)
            .build(Material::Air)
            .unwrap();
        let plan = StackPlan::new(&stack, 0.0).unwrap();
        let grid = EnergyGrid {
            start: 3.0,
            stop: 3.0015,
            step: 0.001,
        };
        let spectrum = Spectrum::compute(&plan, &grid).unwrap();
        assert_eq!(spectrum.len(), 1);
        assert!(spectrum.summary().is_none());
    }
}

/// Reflectivity and transmittance aligned with an energy grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub energies: Array1<f64>,
    pub wavelengths: Array1<f64>,
    pub reflectivity: Array1<f64>,
    pub transmittance: Array1<f64>,
}

/// One point of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralPoint {
    pub energy: f64,
    pub wavelength: f64,
    pub reflectivity: f64,
    pub transmittance: f64,
}

/// Condensed view of the evaluated part of a spectrum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub evaluated: usize,
    pub peak: SpectralPoint,
    pub dip: SpectralPoint,
    pub mean_reflectivity: f64,
    pub mean_transmittance: f64,
}

impl Spectrum {
    /// Evaluates `plan` over `grid`.
    pub fn compute(plan: &StackPlan, grid: &EnergyGrid) -> Result<Self> {
        Self::compute_with_progress(plan, grid, &ProgressBar::hidden())
    }

    /// Evaluates `plan` over `grid`, advancing `pb` once per evaluated sample.
    ///
    /// **Context**: Every sample of the sweep is independent of the others,
    /// so the sweep is spread over the rayon thread pool.
    ///
    /// **How it Works**: Maps each evaluated grid index to its `(R, T)` pair in
    /// parallel, stops at the first failing sample, and writes the results
    /// into zeroed arrays aligned with the grid. Sample 0 stays at zero.
    pub fn compute_with_progress(
        plan: &StackPlan,
        grid: &EnergyGrid,
        pb: &ProgressBar,
    ) -> Result<Self> {
        let start = Instant::now();
        let energies = grid.energies()?;
        let wavelengths = grid.wavelengths()?;
        let n = energies.len();
        let first = FIRST_EVALUATED_SAMPLE.min(n);

        debug!(
            "sweeping {} samples from {:.4} eV at theta = {:.4} rad (lossless: {}), skipping sample 0",
            n,
            grid.start,
            plan.theta_incidence,
            plan.is_lossless()
        );

        let responses = (first..n)
            .into_par_iter()
            .map(|i| {
                let response = plan
                    .response(wavelengths[i])
                    .map_err(|e| e.at_sample(i, energies[i]));
                pb.inc(1);
                response
            })
            .collect::<Result<Vec<(f64, f64)>>>()?;

        let mut reflectivity = Array1::<f64>::zeros(n);
        let mut transmittance = Array1::<f64>::zeros(n);
        for (i, (r, t)) in (first..n).zip(responses) {
            reflectivity[i] = r;
            transmittance[i] = t;
        }

        let duration = start.elapsed();
        info!(
            "Time taken: {:.2?}, Time per sample: {:.2?}",
            duration,
            duration.div_f64((n - first).max(1) as f64)
        );

        Ok(Self {
            energies,
            wavelengths,
            reflectivity,
            transmittance,
        })
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn point(&self, i: usize) -> SpectralPoint {
        SpectralPoint {
            energy: self.energies[i],
            wavelength: self.wavelengths[i],
            reflectivity: self.reflectivity[i],
            transmittance: self.transmittance[i],
        }
    }

    /// Points of the evaluated samples, in grid order.
    pub fn evaluated(&self) -> impl Iterator<Item = SpectralPoint> + '_ {
        (FIRST_EVALUATED_SAMPLE.min(self.len())..self.len()).map(|i| self.point(i))
    }

    /// Peak and dip of the reflectivity plus means, or `None` if nothing was evaluated.
    pub fn summary(&self) -> Option<Summary> {
        let (dip, peak) = self
            .evaluated()
            .minmax_by(|a, b| a.reflectivity.total_cmp(&b.reflectivity))
            .into_option()?;
        let evaluated = self.len() - FIRST_EVALUATED_SAMPLE.min(self.len());
        let (sum_r, sum_t) = self
            .evaluated()
            .fold((0.0, 0.0), |(r, t), p| (r + p.reflectivity, t + p.transmittance));

        Some(Summary {
            samples: self.len(),
            evaluated,
            peak,
            dip,
            mean_reflectivity: sum_r / evaluated as f64,
            mean_transmittance: sum_t / evaluated as f64,
        })
    }
}

/// Progress bar styled for a spectrum sweep over `grid`.
pub fn sweep_progress(grid: &EnergyGrid) -> ProgressBar {
    let pb = ProgressBar::new(grid.len().saturating_sub(FIRST_EVALUATED_SAMPLE) as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
    ) {
        pb.set_style(style.progress_chars("█▇▆▅▄▃▂▁"));
    }
    pb.set_message("samples".to_string());
    pb
}

/// TE spectrum of the fixed design stack over the default energy grid.
///
/// `theta_incidence` is the incidence angle in air (radians, `[0, pi/2)`);
/// thicknesses are in nm. The mirror has [`MIRROR_PERIODS`] periods.
pub fn reflectivity_spectrum(
    theta_incidence: f64,
    thickness_metal: f64,
    thickness_polymer: f64,
    thickness_spacer: f64,
) -> Result<Spectrum> {
    let stack = Stack::design(
        thickness_metal,
        thickness_polymer,
        thickness_spacer,
        MIRROR_PERIODS,
    )?;
    let plan = StackPlan::new(&stack, theta_incidence)?;
    Spectrum::compute(&plan, &EnergyGrid::default())
}
