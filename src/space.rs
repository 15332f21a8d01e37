//! The binding of a shape function to one entity group inside a dictionary.
use crate::connectivity::Connectivity;
use crate::entities::Entities;
use crate::shape_function::ShapeFunction;
use crate::{MeshError, Real};
use std::iter::Copied;
use std::slice;
use std::sync::Arc;

/// Maps every element of an entity group to the DOF indices of its shape-function nodes in
/// the owning dictionary.
#[derive(Debug, Clone)]
pub struct Space<T: Real> {
    entities: Arc<Entities<T>>,
    shape_function: Arc<dyn ShapeFunction<T>>,
    connectivity: Connectivity,
    bound: bool,
}

impl<T: Real> Space<T> {
    /// A standalone space that is not part of any dictionary.
    pub fn new(
        entities: Arc<Entities<T>>,
        shape_function: Arc<dyn ShapeFunction<T>>,
        connectivity: Connectivity,
    ) -> Result<Self, MeshError> {
        if connectivity.size() != entities.size() {
            return Err(MeshError::inconsistent(format!(
                "space for \"{}\" has {} rows but the group has {} elements",
                entities.name(),
                connectivity.size(),
                entities.size()
            )));
        }
        let nb_nodes = shape_function.nb_nodes();
        if let Some((e, row)) = connectivity
            .rows()
            .enumerate()
            .find(|(_, row)| row.len() != nb_nodes)
        {
            return Err(MeshError::inconsistent(format!(
                "element {e} of \"{}\" has {} DOFs but {} expects {nb_nodes}",
                entities.name(),
                row.len(),
                shape_function.name()
            )));
        }
        Ok(Self {
            entities,
            shape_function,
            connectivity,
            bound: false,
        })
    }

    pub(crate) fn bound(
        entities: Arc<Entities<T>>,
        shape_function: Arc<dyn ShapeFunction<T>>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            entities,
            shape_function,
            connectivity,
            bound: true,
        }
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Whether the DOFs of this space are stored in fields of the owning dictionary.
    pub fn is_bound_to_fields(&self) -> bool {
        self.bound
    }

    pub fn entities(&self) -> &Arc<Entities<T>> {
        &self.entities
    }

    pub fn shape_function(&self) -> &Arc<dyn ShapeFunction<T>> {
        &self.shape_function
    }

    /// Number of elements covered by the space.
    pub fn size(&self) -> usize {
        self.connectivity.size()
    }

    pub fn nb_dofs_per_element(&self) -> usize {
        self.shape_function.nb_nodes()
    }

    /// Iterates over the DOF indices of element `e`.
    ///
    /// The returned iterator can be cloned to restart the traversal.
    pub fn indexes_for_element(&self, e: usize) -> Result<Copied<slice::Iter<'_, usize>>, MeshError> {
        let size = self.entities.size();
        if e >= size {
            return Err(MeshError::OutOfRange { index: e, size });
        }
        Ok(self.connectivity.try_row(e)?.iter().copied())
    }
}
