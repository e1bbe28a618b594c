//! Error types for the transfer-matrix engine.

use num_complex::Complex;
use thiserror::Error;

/// Result type used throughout the numeric core.
pub type Result<T> = std::result::Result<T, TmmError>;

/// Errors raised while building or evaluating a stack.
#[derive(Debug, Error)]
pub enum TmmError {
    /// The TE Fresnel denominator (or the transmission coefficient) vanishes.
    #[error("degenerate TE geometry: Fresnel denominator {denominator} is numerically zero")]
    DegenerateGeometry { denominator: Complex<f64> },

    /// A caller supplied value lies outside its physical domain.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// An interface between two media could not be built.
    #[error("boundary {upper} -> {lower}: {source}")]
    Boundary {
        upper: String,
        lower: String,
        #[source]
        source: Box<TmmError>,
    },

    /// Evaluation failed at one sample of the sweep.
    #[error("sample {index} (E = {energy:.4} eV): {source}")]
    Sample {
        index: usize,
        energy: f64,
        #[source]
        source: Box<TmmError>,
    },
}

impl TmmError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        TmmError::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub(crate) fn at_boundary(self, upper: impl ToString, lower: impl ToString) -> Self {
        TmmError::Boundary {
            upper: upper.to_string(),
            lower: lower.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn at_sample(self, index: usize, energy: f64) -> Self {
        TmmError::Sample {
            index,
            energy,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_boundary_and_sample() {
        let err = TmmError::DegenerateGeometry {
            denominator: Complex::new(0.0, 0.0),
        }
        .at_boundary("PMMA", "Al")
        .at_sample(12, 3.1);
        let msg = err.to_string();
        assert!(msg.starts_with("sample 12 (E = 3.1000 eV)"), "{}", msg);
        assert!(msg.contains("PMMA -> Al"), "{}", msg);
        assert!(msg.contains("degenerate TE geometry"), "{}", msg);
    }

    #[test]
    fn display_invalid_parameter() {
        let err = TmmError::invalid("thickness", -1.0, "must be non-negative");
        assert_eq!(err.to_string(), "invalid thickness = -1: must be non-negative");
    }
}
