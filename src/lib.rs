//! TE transfer-matrix reflectivity spectra of planar multilayer stacks.
//!
//! The crate computes the reflectivity and transmittance of a substrate /
//! Bragg mirror / spacer / polymer / metal / air stack over a sweep of
//! photon energies. Each boundary contributes a Fresnel interface matrix
//! ([`fresnel`]), each layer a diagonal propagation matrix ([`layer`]), and
//! their ordered product ([`stack`]) gives the system matrix from which
//! `R` and `T` are read ([`spectrum`]).

pub mod error;
pub mod fresnel;
pub mod grid;
pub mod layer;
pub mod material;
pub mod output;
pub mod settings;
pub mod snell;
pub mod spectrum;
pub mod stack;

pub use error::{Result, TmmError};
pub use spectrum::{reflectivity_spectrum, Spectrum};
