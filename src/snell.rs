//! Generalized Snell's law for stratified media.
//!
//! In a planar stack the transverse wavevector component is conserved across
//! every boundary, so the propagation angle in any medium follows directly
//! from the incidence angle in the ambient medium:
//!
//! `n_ambient sin(theta_ambient) = n sin(theta)`
//!
//! For absorbing media the angle is complex. Every medium goes through the
//! same complex arcsine so that no imaginary part is lost on the way to
//! `cos(theta)`, which is the only projection the matrices need.

use num_complex::Complex;

use crate::error::{Result, TmmError};


/// Propagation direction inside one medium, measured from the stack normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub theta: Complex<f64>,
    pub sin: Complex<f64>,
    pub cos: Complex<f64>,
}

impl Angle {
    /// Angle inside a medium of index `n` for a wave incident at `theta_i`
    /// (radians) from the ambient medium of index `n_ambient`.
    ///
    /// `theta_i` must lie in `[0, pi/2)`.
    pub fn in_medium(n_ambient: Complex<f64>, theta_i: f64, n: Complex<f64>) -> Result<Self> {
        validate_incidence(theta_i)?;
        if n.norm() == 0.0 {
            return Err(TmmError::invalid(
                "refractive index",
                n.norm(),
                "must be non-zero",
            ));
        }

        let sin = n_ambient * theta_i.sin() / n;
        let theta = sin.asin();

        Ok(Self {
            theta,
            sin,
            cos: theta.cos(),
        })
    }
}

/// Checks an incidence angle against `[0, pi/2)`.
pub fn validate_incidence(theta_i: f64) -> Result<()> {
    if !(0.0..std::f64::consts::FRAC_PI_2).contains(&theta_i) {
        return Err(TmmError::invalid(
            "incidence angle",
            theta_i,
            "must lie in [0, pi/2) radians",
        ));
    }
    Ok(())
}
