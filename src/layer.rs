//! Propagation matrices for homogeneous layers.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex;

use crate::error::{Result, TmmError};
use crate::material::Material;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_thickness_is_identity() {
        let cos = Complex::new(0.9, -0.01);
        let m = layer(512.0, Complex::new(0.35, -4.1), 0.0, cos).unwrap();
        assert_eq!(m, Matrix2::identity());
    }

    #[test]
    fn lossless_layer_is_unitary() {
        let m = layer(400.0, Complex::new(1.96, 0.0), 45.1, Complex::new(0.97, 0.0)).unwrap();
        assert!((m[(0, 0)].norm() - 1.0).abs() < 1e-12);
        assert!((m[(1, 1)].norm() - 1.0).abs() < 1e-12);
        assert_eq!(m[(0, 1)], Complex::new(0.0, 0.0));
        assert_eq!(m[(1, 0)], Complex::new(0.0, 0.0));
    }

    #[test]
    fn quarter_wave_phase() {
        // n d = lambda / 4 gives beta = pi / 2
        let m = layer(400.0, Complex::new(2.0, 0.0), 50.0, Complex::new(1.0, 0.0)).unwrap();
        assert!((m[(0, 0)] - Complex::new(0.0, 1.0)).norm() < 1e-12);
        assert!((m[(1, 1)] - Complex::new(0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn absorbing_layer_is_not_clamped() {
        let n = Material::Aluminium.refr_index();
        let m = layer(400.0, n, 30.0, Complex::new(1.0, 0.0)).unwrap();
        let beta_im = 2.0 * PI / 400.0 * n.im * 30.0;
        assert!((m[(0, 0)].norm() - (-beta_im).exp()).abs() < 1e-9);
        assert!((m[(1, 1)].norm() - beta_im.exp()).abs() < 1e-12);
        assert!(m[(0, 0)].norm() > 1.0);
        assert!(m[(1, 1)].norm() < 1.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        let n = Complex::new(1.5, 0.0);
        let c = Complex::new(1.0, 0.0);
        assert!(layer(0.0, n, 10.0, c).is_err());
        assert!(layer(-400.0, n, 10.0, c).is_err());
        assert!(layer(400.0, n, -1.0, c).is_err());
        assert!(layer(f64::NAN, n, 1.0, c).is_err());
        assert!(layer(400.0, n, f64::INFINITY, c).is_err());
    }
}

/// A slab of one material with a thickness in nm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub material: Material,
    pub thickness: f64,
}

impl Layer {
    pub fn new(material: Material, thickness: f64) -> Result<Self> {
        validate_thickness(thickness)?;
        Ok(Self {
            material,
            thickness,
        })
    }
}

/// Computes the diagonal propagation matrix of a layer.
///
/// `lambda0` is the vacuum wavelength and `thickness` the layer thickness,
/// both in nm. `cos_theta` is the (possibly complex) cosine of the
/// propagation angle inside the layer. The phase `beta = k0 n cos(theta) d`
/// enters as `diag(exp(i beta), exp(-i beta))`; absorbing layers give one
/// growing and one decaying entry.
pub fn layer(
    lambda0: f64,
    n: Complex<f64>,
    thickness: f64,
    cos_theta: Complex<f64>,
) -> Result<Matrix2<Complex<f64>>> {
    if !(lambda0.is_finite() && lambda0 > 0.0) {
        return Err(TmmError::invalid(
            "wavelength",
            lambda0,
            "must be finite and positive",
        ));
    }
    validate_thickness(thickness)?;

    let k0 = 2.0 * PI / lambda0;
    let kz = k0 * n * cos_theta;
    let beta = kz * thickness;
    let i = Complex::<f64>::i();

    Ok(Matrix2::from_diagonal(&Vector2::new(
        (i * beta).exp(),
        (-i * beta).exp(),
    )))
}

fn validate_thickness(thickness: f64) -> Result<()> {
    if !(thickness.is_finite() && thickness >= 0.0) {
        return Err(TmmError::invalid(
            "thickness",
            thickness,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}
