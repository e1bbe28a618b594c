//! Stack description and the precomputed transfer-matrix plan.
//!
//! A [`Stack`] is an ordered list of layers between a semi-infinite entry
//! medium (the substrate) and a semi-infinite exit medium (air). Its system
//! matrix is the ordered product
//!
//! `S = I(0->1) C(1) I(1->2) C(2) ... C(N) I(N->exit)`
//!
//! taken from the substrate towards the exit medium. Matrix products do not
//! commute, so the order of [`StackPlan::factors`] is the physical order.
//!
//! [`StackPlan`] does all the wavelength-independent work once: it derives
//! the propagation angle in every medium and builds one interface matrix per
//! distinct boundary. Repeated layers (the dielectric mirror) share a single
//! layer matrix per wavelength.

use std::collections::HashMap;

use log::debug;
use nalgebra::Matrix2;
use num_complex::Complex;

use crate::error::{Result, TmmError};
use crate::fresnel;
use crate::layer::{self, Layer};
use crate::material::{Material, MIRROR_SIN_THICKNESS, MIRROR_SIO_THICKNESS};
use crate::snell::{self, Angle};


/// An ordered planar stack between two semi-infinite media.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub substrate: Material,
    pub layers: Vec<Layer>,
    pub exit: Material,
}

impl Stack {
    pub fn builder(substrate: Material) -> StackBuilder {
        StackBuilder {
            substrate,
            layers: Vec::new(),
            error: None,
        }
    }

    /// The fixed design: substrate, SiN/SiO Bragg mirror, silica spacer,
    /// PMMA, aluminium, air. Thicknesses are in nm.
    pub fn design(
        thickness_metal: f64,
        thickness_polymer: f64,
        thickness_spacer: f64,
        mirror_periods: usize,
    ) -> Result<Self> {
        if mirror_periods == 0 {
            return Err(TmmError::invalid(
                "mirror periods",
                0.0,
                "the mirror needs at least one period",
            ));
        }
        Stack::builder(Material::Substrate)
            .layer(Material::SiliconNitride, MIRROR_SIN_THICKNESS)
            .periodic(
                &[
                    (Material::SiliconOxide, MIRROR_SIO_THICKNESS),
                    (Material::SiliconNitride, MIRROR_SIN_THICKNESS),
                ],
                mirror_periods,
            )
            .layer(Material::FusedSilica, thickness_spacer)
            .layer(Material::Pmma, thickness_polymer)
            .layer(Material::Aluminium, thickness_metal)
            .build(Material::Air)
    }

    /// Media from the substrate to the exit medium, one per boundary side.
    pub fn media(&self) -> impl Iterator<Item = Material> + '_ {
        std::iter::once(self.substrate)
            .chain(self.layers.iter().map(|l| l.material))
            .chain(std::iter::once(self.exit))
    }
}

/// Builder for [`Stack`]. The first invalid layer is reported by `build`.
#[derive(Debug)]
pub struct StackBuilder {
    substrate: Material,
    layers: Vec<Layer>,
    error: Option<TmmError>,
}

impl StackBuilder {
    pub fn layer(mut self, material: Material, thickness: f64) -> Self {
        if self.error.is_none() {
            match Layer::new(material, thickness) {
                Ok(layer) => self.layers.push(layer),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Appends `period` repeated `count` times.
    pub fn periodic(self, period: &[(Material, f64)], count: usize) -> Self {
        std::iter::repeat(period)
            .take(count)
            .flatten()
            .fold(self, |builder, &(material, thickness)| {
                builder.layer(material, thickness)
            })
    }

    pub fn build(self, exit: Material) -> Result<Stack> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Stack {
                substrate: self.substrate,
                layers: self.layers,
                exit,
            }),
        }
    }
}

/// One factor of the system matrix product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Factor {
    Interface { upper: Material, lower: Material },
    Layer(Layer),
}

/// Wavelength-independent part of a stack evaluation at one incidence angle.
#[derive(Debug, Clone)]
pub struct StackPlan {
    pub theta_incidence: f64,
    pub angles: HashMap<Material, Angle>,
    interfaces: Vec<Matrix2<Complex<f64>>>,
    boundary_index: Vec<usize>,
    boundaries: Vec<(Material, Material)>,
    unique_layers: Vec<Layer>,
    layer_index: Vec<usize>,
    n_substrate: Complex<f64>,
    n_exit: Complex<f64>,
}

impl StackPlan {
    /// Prepares the wavelength-independent part of a stack evaluation.
    ///
    /// **Context**: Propagation angles and Fresnel interface matrices depend
    /// only on the refractive indices and the incidence angle, not on the
    /// wavelength, so a sweep over many wavelengths should build them once.
    ///
    /// **How it Works**: Derives the angle in every distinct medium from the
    /// exit medium with the generalized Snell's law, then walks the boundaries
    /// in physical order and builds one interface matrix per distinct
    /// (upper, lower) pair. Layers are deduplicated the same way so that
    /// repeated mirror layers share one matrix per wavelength.
    /// `theta_incidence` is measured in the exit medium, in radians.
    pub fn new(stack: &Stack, theta_incidence: f64) -> Result<Self> {
        snell::validate_incidence(theta_incidence)?;
        let n_exit = stack.exit.refr_index();

        let mut angles: HashMap<Material, Angle> = HashMap::new();
        for material in stack.media() {
            if !angles.contains_key(&material) {
                let angle = Angle::in_medium(n_exit, theta_incidence, material.refr_index())?;
                angles.insert(material, angle);
            }
        }

        let media: Vec<Material> = stack.media().collect();
        let mut interfaces: Vec<Matrix2<Complex<f64>>> = Vec::new();
        let mut boundaries: Vec<(Material, Material)> = Vec::new();
        let mut boundary_index = Vec::with_capacity(media.len() - 1);
        for pair in media.windows(2) {
            let key = (pair[0], pair[1]);
            let index = match boundaries.iter().position(|b| *b == key) {
                Some(index) => index,
                None => {
                    let (upper, lower) = key;
                    let matrix = fresnel::interface_te(
                        upper.refr_index(),
                        angles[&upper].cos,
                        lower.refr_index(),
                        angles[&lower].cos,
                    )
                    .map_err(|e| e.at_boundary(upper, lower))?;
                    interfaces.push(matrix);
                    boundaries.push(key);
                    boundaries.len() - 1
                }
            };
            boundary_index.push(index);
        }

        let mut unique_layers: Vec<Layer> = Vec::new();
        let layer_index: Vec<usize> = stack
            .layers
            .iter()
            .map(|layer| match unique_layers.iter().position(|l| l == layer) {
                Some(index) => index,
                None => {
                    unique_layers.push(*layer);
                    unique_layers.len() - 1
                }
            })
            .collect();

        debug!(
            "plan at theta = {:.4} rad: {} boundaries ({} distinct), {} layers ({} distinct)",
            theta_incidence,
            boundary_index.len(),
            interfaces.len(),
            stack.layers.len(),
            unique_layers.len()
        );

        Ok(Self {
            theta_incidence,
            angles,
            interfaces,
            boundary_index,
            boundaries,
            unique_layers,
            layer_index,
            n_substrate: stack.substrate.refr_index(),
            n_exit,
        })
    }

    /// True if no medium of the stack absorbs, so that `R + T = 1`.
    pub fn is_lossless(&self) -> bool {
        !self.angles.keys().any(Material::is_absorbing)
    }

    /// The factors of the system matrix in physical order.
    pub fn factors(&self) -> Vec<Factor> {
        let interface = |i: usize| {
            let (upper, lower) = self.boundaries[self.boundary_index[i]];
            Factor::Interface { upper, lower }
        };
        let mut factors = vec![interface(0)];
        for (i, &l) in self.layer_index.iter().enumerate() {
            factors.push(Factor::Layer(self.unique_layers[l]));
            factors.push(interface(i + 1));
        }
        factors
    }

    /// Composes the system matrix at vacuum wavelength `lambda0` (nm).
    pub fn system_matrix(&self, lambda0: f64) -> Result<Matrix2<Complex<f64>>> {
        let layer_matrices = self
            .unique_layers
            .iter()
            .map(|l| {
                layer::layer(
                    lambda0,
                    l.material.refr_index(),
                    l.thickness,
                    self.angles[&l.material].cos,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let first = self.interfaces[self.boundary_index[0]];
        let s = self
            .layer_index
            .iter()
            .zip(&self.boundary_index[1..])
            .fold(first, |s, (&l, &b)| s * layer_matrices[l] * self.interfaces[b]);
        Ok(s)
    }

    /// Reflectivity and transmittance `(R, T)` at vacuum wavelength `lambda0` (nm).
    pub fn response(&self, lambda0: f64) -> Result<(f64, f64)> {
        let s = self.system_matrix(lambda0)?;
        let s00 = s[(0, 0)];
        if !(s00.norm().is_finite() && s00.norm() > 0.0) {
            return Err(TmmError::DegenerateGeometry { denominator: s00 });
        }
        let reflectivity = (s[(1, 0)] / s00).norm_sqr();
        let transmittance = (self.n_exit / self.n_substrate).norm() * s00.inv().norm_sqr();
        Ok((reflectivity, transmittance))
    }
}
