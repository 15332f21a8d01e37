//! Lagrange shape functions on reference elements.
//!
//! Reference domains follow the conventions of the quadrature rules: the line is `[-1, 1]`,
//! the quadrilateral is `[-1, 1]^2` and the triangle has vertices `(-1, -1)`, `(1, -1)` and
//! `(-1, 1)`. Vertices always come first in the node ordering, so the first
//! `shape().nb_vertices()` entries of an element's geometric connectivity row are its corners.
use crate::{MeshError, Real};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

mod line;
mod quadrilateral;
mod triangle;

pub use line::*;
pub use quadrilateral::*;
pub use triangle::*;

/// Prefix accepted in front of shape function family names.
const QUALIFIED_PREFIX: &str = "cf3.mesh.";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoShape {
    Line,
    Triangle,
    Quad,
}

impl GeoShape {
    /// Dimension of the reference element.
    pub const fn dimensionality(&self) -> usize {
        match self {
            Self::Line => 1,
            Self::Triangle | Self::Quad => 2,
        }
    }

    pub const fn nb_vertices(&self) -> usize {
        match self {
            Self::Line => 2,
            Self::Triangle => 3,
            Self::Quad => 4,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Triangle => "Triangle",
            Self::Quad => "Quad",
        }
    }
}

/// The geometric entity a shape function node is attached to.
///
/// `vertices` are indices of the corners (in element-local numbering) spanning the entity
/// that carries the node. When an entity carries several nodes, `child` is the position of
/// the node among its `siblings`, ordered from the first listed vertex towards the last.
/// Two nodes of neighbouring elements coincide exactly when they are attached to the same
/// set of global vertices with the same orientation-normalised child index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSupport {
    pub vertices: Vec<usize>,
    pub child: usize,
    pub siblings: usize,
}

impl NodeSupport {
    pub fn vertex(vertex: usize) -> Self {
        Self {
            vertices: vec![vertex],
            child: 0,
            siblings: 1,
        }
    }

    pub fn entity(vertices: &[usize], child: usize, siblings: usize) -> Self {
        Self {
            vertices: vertices.to_vec(),
            child,
            siblings,
        }
    }
}

/// Basis functions of a reference element.
pub trait ShapeFunction<T: Real>: Debug + Send + Sync {
    /// Family name, e.g. `LagrangeP2`.
    fn family(&self) -> &'static str;

    fn shape(&self) -> GeoShape;

    fn order(&self) -> usize;

    fn nb_nodes(&self) -> usize;

    fn dimensionality(&self) -> usize {
        self.shape().dimensionality()
    }

    /// Full name, e.g. `LagrangeP2.Quad`.
    fn name(&self) -> String {
        format!("{}.{}", self.family(), self.shape().name())
    }

    /// Writes the value of every basis function at `xi` into `values`.
    fn evaluate_value(&self, xi: &[T], values: &mut [T]);

    /// Writes the reference gradients at `xi` into `gradients`.
    ///
    /// `gradients` has one row per reference dimension and one column per node.
    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>);

    /// Reference coordinates of the nodes, one row per node.
    fn local_coordinates(&self) -> DMatrix<T>;

    fn node_support(&self, node: usize) -> NodeSupport;
}

/// Looks up a Lagrange shape function by family name and shape.
///
/// The family may be given bare (`LagrangeP1`) or qualified (`cf3.mesh.LagrangeP1`).
pub fn lagrange<T: Real>(family: &str, shape: GeoShape) -> Result<Arc<dyn ShapeFunction<T>>, MeshError> {
    let bare = family.strip_prefix(QUALIFIED_PREFIX).unwrap_or(family);
    let sf: Arc<dyn ShapeFunction<T>> = match (bare, shape) {
        ("LagrangeP0", GeoShape::Line) => Arc::new(LineP0),
        ("LagrangeP1", GeoShape::Line) => Arc::new(LineP1),
        ("LagrangeP2", GeoShape::Line) => Arc::new(LineP2),
        ("LagrangeP3", GeoShape::Line) => Arc::new(LineP3),
        ("LagrangeP0", GeoShape::Triangle) => Arc::new(TriangleP0),
        ("LagrangeP1", GeoShape::Triangle) => Arc::new(TriangleP1),
        ("LagrangeP2", GeoShape::Triangle) => Arc::new(TriangleP2),
        ("LagrangeP0", GeoShape::Quad) => Arc::new(QuadP0),
        ("LagrangeP1", GeoShape::Quad) => Arc::new(QuadP1),
        ("LagrangeP2", GeoShape::Quad) => Arc::new(QuadP2),
        _ => return Err(MeshError::not_found("shape function", format!("{bare}.{}", shape.name()))),
    };
    Ok(sf)
}

/// The linear Lagrange element of a shape, used as the geometric element of entity groups.
pub fn geometric<T: Real>(shape: GeoShape) -> Arc<dyn ShapeFunction<T>> {
    match shape {
        GeoShape::Line => Arc::new(LineP1),
        GeoShape::Triangle => Arc::new(TriangleP1),
        GeoShape::Quad => Arc::new(QuadP1),
    }
}
