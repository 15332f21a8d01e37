use nalgebra::RealField;

pub mod connectivity;
pub mod descriptor;
pub mod dictionary;
pub mod entities;
pub mod error;
pub mod field;
pub mod mesh;
pub mod physics;
pub mod predicates;
pub mod quadrature;
pub mod scheme;
pub mod shape_function;
pub mod solver;
pub mod space;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::MeshError;

/// Scalar type used for coordinates and field values.
///
/// Trait alias for the bounds needed by the generic routines in this crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
