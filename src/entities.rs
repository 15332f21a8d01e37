//! Groups of elements sharing one element type.
use crate::connectivity::Connectivity;
use crate::field::Field;
use crate::quadrature::QuadratureRule;
use crate::shape_function::{geometric, GeoShape, ShapeFunction};
use crate::{MeshError, Real};
use nalgebra::{DMatrix, DVector};
use std::fmt;
use std::sync::Arc;

/// Stable identifier of an entity group within its mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntitiesId(pub(crate) usize);

impl EntitiesId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntitiesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric shape function of an element together with the dimension it is embedded in.
#[derive(Debug, Clone)]
pub struct ElementType<T: Real> {
    shape_function: Arc<dyn ShapeFunction<T>>,
    dimension: usize,
}

impl<T: Real> ElementType<T> {
    /// The linear Lagrange element of `shape` embedded in `dimension` spatial dimensions.
    pub fn lagrange_p1(shape: GeoShape, dimension: usize) -> Self {
        Self::new(geometric(shape), dimension)
    }

    pub fn new(shape_function: Arc<dyn ShapeFunction<T>>, dimension: usize) -> Self {
        Self {
            shape_function,
            dimension,
        }
    }

    pub fn shape_function(&self) -> &Arc<dyn ShapeFunction<T>> {
        &self.shape_function
    }

    pub fn shape(&self) -> GeoShape {
        self.shape_function.shape()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn dimensionality(&self) -> usize {
        self.shape_function.dimensionality()
    }

    pub fn nb_nodes(&self) -> usize {
        self.shape_function.nb_nodes()
    }

    /// E.g. `LagrangeP1.Quad2D`.
    pub fn name(&self) -> String {
        format!("{}{}D", self.shape_function.name(), self.dimension)
    }

    pub fn is_cell(&self) -> bool {
        self.dimension == self.dimensionality()
    }

    /// Same test as [`is_cell`](Self::is_cell), matching [`crate::predicates::IsFaceType`].
    pub fn is_face(&self) -> bool {
        self.dimension == self.dimensionality()
    }

    /// Same test as [`is_cell`](Self::is_cell), matching [`crate::predicates::IsEdgeType`].
    pub fn is_edge(&self) -> bool {
        self.dimension == self.dimensionality()
    }

    pub fn is_compatible_with(&self, other: &ElementType<T>) -> bool {
        self.dimension == other.dimension && self.shape() == other.shape()
    }
}

/// A named group of elements of one type, described by their node connectivity.
#[derive(Debug)]
pub struct Entities<T: Real> {
    id: EntitiesId,
    name: String,
    element_type: ElementType<T>,
    node_connectivity: Connectivity,
}

impl<T: Real> Entities<T> {
    pub(crate) fn new(
        id: EntitiesId,
        name: &str,
        element_type: ElementType<T>,
        node_connectivity: Connectivity,
    ) -> Result<Self, MeshError> {
        let nb_nodes = element_type.nb_nodes();
        if let Some(e) = (0..node_connectivity.size()).find(|&e| node_connectivity.row_len(e) != Some(nb_nodes)) {
            return Err(MeshError::inconsistent(format!(
                "element {e} of \"{name}\" does not have {nb_nodes} nodes as required by {}",
                element_type.name()
            )));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            element_type,
            node_connectivity,
        })
    }

    pub fn id(&self) -> EntitiesId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &ElementType<T> {
        &self.element_type
    }

    pub fn geometry_shape_function(&self) -> &Arc<dyn ShapeFunction<T>> {
        self.element_type.shape_function()
    }

    pub fn node_connectivity(&self) -> &Connectivity {
        &self.node_connectivity
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.node_connectivity.size()
    }

    /// Gathers the coordinates of the nodes of element `e`, one row per node.
    pub fn get_coordinates(&self, e: usize, coordinates: &Field<T>) -> Result<DMatrix<T>, MeshError> {
        let nodes = self.node_connectivity.try_row(e)?;
        let dim = coordinates.row_size();
        let mut x = DMatrix::zeros(nodes.len(), dim);
        for (i, &node) in nodes.iter().enumerate() {
            let row = coordinates.try_row(node)?;
            for d in 0..dim {
                x[(i, d)] = row[d];
            }
        }
        Ok(x)
    }

    /// Maps every row of `xi` from reference coordinates to physical coordinates of element `e`.
    pub fn map_reference_coords(
        &self,
        e: usize,
        xi: &DMatrix<T>,
        coordinates: &Field<T>,
    ) -> Result<DMatrix<T>, MeshError> {
        let x = self.get_coordinates(e, coordinates)?;
        let sf = self.geometry_shape_function();
        let mut n = DMatrix::zeros(xi.nrows(), sf.nb_nodes());
        let mut values = vec![T::zero(); sf.nb_nodes()];
        for p in 0..xi.nrows() {
            let point: Vec<T> = xi.row(p).iter().copied().collect();
            sf.evaluate_value(&point, &mut values);
            n.row_mut(p).copy_from_slice(&values);
        }
        Ok(n * x)
    }

    /// Measure of element `e`: length, area or volume depending on its dimensionality.
    pub fn element_volume(&self, e: usize, coordinates: &Field<T>) -> Result<T, MeshError> {
        let x = self.get_coordinates(e, coordinates)?;
        let sf = self.geometry_shape_function();
        let quadrature = QuadratureRule::for_shape(sf.shape(), 2 * sf.order())?;
        let mut gradients = DMatrix::zeros(sf.dimensionality(), sf.nb_nodes());
        let mut volume = T::zero();
        for (w, xi) in quadrature.iter() {
            sf.evaluate_gradient(xi, &mut gradients);
            let jacobian = &gradients * &x;
            volume += w * measure_factor(&jacobian);
        }
        Ok(volume)
    }

    /// Centroid of the nodes of element `e`.
    pub fn centroid(&self, e: usize, coordinates: &Field<T>) -> Result<DVector<T>, MeshError> {
        let x = self.get_coordinates(e, coordinates)?;
        let n: T = nalgebra::convert(x.nrows() as f64);
        Ok(x.row_sum().transpose() / n)
    }
}

/// Volume scaling of the reference-to-physical map for a `dimensionality x dimension`
/// Jacobian.
pub(crate) fn measure_factor<T: Real>(jacobian: &DMatrix<T>) -> T {
    if jacobian.is_square() {
        jacobian.determinant().abs()
    } else {
        (jacobian * jacobian.transpose()).determinant().abs().sqrt()
    }
}
