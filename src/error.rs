//! Error types shared by the mesh data model and the element kernels.
use std::fmt;
use std::fmt::{Display, Formatter};

/// Library-wide error type for lookups, shape checks and element integration.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MeshError {
    /// An index into a connectivity table, field or entity group exceeds its bounds.
    OutOfRange { index: usize, size: usize },
    /// A named or owned component (space, field, dictionary, entity group) does not exist.
    NotFound { kind: &'static str, name: String },
    /// Two fields taking part in an arithmetic operation have different shapes.
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A consistency check failed. The message describes the first violation found.
    InconsistentState(String),
    /// The Jacobian determinant at a quadrature point is not strictly positive.
    DegenerateElement {
        element: usize,
        quadrature_point: usize,
        determinant: f64,
    },
    /// A variables descriptor could not be parsed.
    InvalidDescriptor { descriptor: String, reason: String },
    /// A shape function cannot be used in the requested context.
    UnsupportedShapeFunction { name: String, reason: String },
}

impl MeshError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState(message.into())
    }

    pub(crate) fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedShapeFunction {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_descriptor(descriptor: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }
}

impl Display for MeshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, size } => {
                write!(f, "index {index} is out of range for size {size}")
            }
            Self::NotFound { kind, name } => write!(f, "{kind} \"{name}\" not found"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::InconsistentState(message) => write!(f, "inconsistent state: {message}"),
            Self::DegenerateElement {
                element,
                quadrature_point,
                determinant,
            } => write!(
                f,
                "degenerate element {element}: Jacobian determinant {determinant:e} \
                 at quadrature point {quadrature_point}"
            ),
            Self::InvalidDescriptor { descriptor, reason } => {
                write!(f, "invalid variables descriptor \"{descriptor}\": {reason}")
            }
            Self::UnsupportedShapeFunction { name, reason } => {
                write!(f, "unsupported shape function {name}: {reason}")
            }
        }
    }
}

impl std::error::Error for MeshError {}
