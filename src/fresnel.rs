//! Fresnel interface matrices for TE (s) polarization.
//!
//! A sharp boundary between an upper medium 1 and a lower medium 2 couples
//! the forward and backward field amplitudes on either side. In the
//! transfer-matrix picture this coupling is the interface matrix
//!
//! `I = (1/t) [[1, r], [r, 1]]`
//!
//! built from the TE Fresnel reflection and transmission coefficients of the
//! boundary, seen from medium 1. Refractive indices and cosines may be
//! complex, which covers absorbing media and evanescent angles.

use nalgebra::Matrix2;
use num_complex::Complex;

use crate::error::{Result, TmmError};

/// Denominators with a modulus below this are treated as singular.
pub const DENOMINATOR_EPSILON: f64 = 1e-12;


/// Computes the TE Fresnel reflection and transmission coefficients `(r, t)`
/// for a wave travelling from the upper medium `n1` into the lower medium `n2`.
pub fn coefficients_te(
    n1: Complex<f64>,
    cos1: Complex<f64>,
    n2: Complex<f64>,
    cos2: Complex<f64>,
) -> Result<(Complex<f64>, Complex<f64>)> {
    let z1 = n1 * cos1;
    let z2 = n2 * cos2;
    let denominator = z1 + z2;
    if !(denominator.norm() >= DENOMINATOR_EPSILON) {
        return Err(TmmError::DegenerateGeometry { denominator });
    }

    let r = (z1 - z2) / denominator;
    let t = 2.0 * z1 / denominator;
    if !(t.norm() >= DENOMINATOR_EPSILON) {
        return Err(TmmError::DegenerateGeometry { denominator: t });
    }
    Ok((r, t))
}

/// Computes the TE interface matrix for the boundary from `n1` to `n2`.
///
/// # Example
/// ```rust
/// use num_complex::Complex;
/// use reflectivity::fresnel;
///
/// let one = Complex::new(1.0, 0.0);
/// let glass = Complex::new(1.5, 0.0);
/// let m = fresnel::interface_te(one, one, glass, one).unwrap();
/// let r = m[(1, 0)] / m[(0, 0)];
/// assert!((r.re + 0.2).abs() < 1e-12);
/// ```
pub fn interface_te(
    n1: Complex<f64>,
    cos1: Complex<f64>,
    n2: Complex<f64>,
    cos2: Complex<f64>,
) -> Result<Matrix2<Complex<f64>>> {
    let (r, t) = coefficients_te(n1, cos1, n2, cos2)?;
    let inv_t = t.inv();
    Ok(Matrix2::new(inv_t, r * inv_t, r * inv_t, inv_t))
}
