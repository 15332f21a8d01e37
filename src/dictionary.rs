//! Global degree-of-freedom numberings over the entity groups of a mesh.
use crate::connectivity::Connectivity;
use crate::descriptor::VariablesDescriptor;
use crate::entities::{Entities, EntitiesId};
use crate::field::Field;
use crate::shape_function::ShapeFunction;
use crate::space::Space;
use crate::{MeshError, Real};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Name of the field holding the physical location of every DOF.
pub const COORDINATES: &str = "coordinates";

/// Identifies a shape-function node independently of the element it is seen from: the sorted
/// global vertices of the entity carrying it plus its position among the nodes on that entity.
type PointKey = (Vec<usize>, usize);

/// Simultaneous borrows of the spaces and of several fields of one dictionary.
#[derive(Debug)]
pub struct DictionaryView<'a, T: Real> {
    pub spaces: &'a [Space<T>],
    pub inputs: Vec<&'a Field<T>>,
    pub outputs: Vec<&'a mut Field<T>>,
}

fn fill_slots<F>(slots: Vec<Option<F>>, names: &[&str]) -> Result<Vec<F>, MeshError> {
    slots
        .into_iter()
        .zip(names)
        .map(|(slot, &name)| slot.ok_or_else(|| MeshError::not_found("field", name)))
        .collect()
}

/// A single DOF numbering shared by all fields created on it.
///
/// The numbering is built from one [`Space`] per entity group. In a continuous dictionary,
/// shape-function nodes that coincide topologically between neighbouring elements share one
/// DOF; in a discontinuous dictionary every element owns its DOFs. Indices are always dense,
/// starting at zero.
#[derive(Debug)]
pub struct Dictionary<T: Real> {
    tag: String,
    family: String,
    continuous: bool,
    geometry: bool,
    dimension: usize,
    size: usize,
    spaces: Vec<Space<T>>,
    space_index: FxHashMap<EntitiesId, usize>,
    fields: Vec<Field<T>>,
    point_keys: FxHashMap<PointKey, usize>,
}

impl<T: Real> Dictionary<T> {
    pub(crate) fn new(tag: &str, family: &str, continuous: bool, dimension: usize) -> Result<Self, MeshError> {
        let mut dict = Self {
            tag: tag.to_string(),
            family: family.to_string(),
            continuous,
            geometry: false,
            dimension,
            size: 0,
            spaces: Vec::new(),
            space_index: FxHashMap::default(),
            fields: Vec::new(),
            point_keys: FxHashMap::default(),
        };
        dict.create_field(COORDINATES, "coords[v]")?;
        Ok(dict)
    }

    /// The dictionary of mesh nodes: continuous, with DOF `i` being node `i`.
    pub(crate) fn geometry(tag: &str, dimension: usize, coordinates: &[T]) -> Result<Self, MeshError> {
        let mut dict = Self::new(tag, "LagrangeP1", true, dimension)?;
        dict.geometry = true;
        dict.resize(coordinates.len() / dimension);
        dict.fields[0].as_mut_slice().copy_from_slice(coordinates);
        Ok(dict)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Shape function family used for every entity group, e.g. `LagrangeP2`.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Spatial dimension of the mesh the dictionary belongs to.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total number of DOFs.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn spaces(&self) -> &[Space<T>] {
        &self.spaces
    }

    pub fn space(&self, entities: &Entities<T>) -> Result<&Space<T>, MeshError> {
        self.space_index
            .get(&entities.id())
            .map(|&i| &self.spaces[i])
            .ok_or_else(|| MeshError::not_found("space", format!("{} in {}", entities.name(), self.tag)))
    }

    /// The entity groups the dictionary is defined on, in registration order.
    pub fn entities_range(&self) -> impl '_ + ExactSizeIterator<Item = &Arc<Entities<T>>> {
        self.spaces.iter().map(Space::entities)
    }

    pub fn coordinates(&self) -> &Field<T> {
        &self.fields[0]
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&Field<T>, MeshError> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| MeshError::not_found("field", name))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field<T>, MeshError> {
        self.fields
            .iter_mut()
            .find(|field| field.name() == name)
            .ok_or_else(|| MeshError::not_found("field", name))
    }

    /// Mutable access to several distinct fields at once, in the order of `names`.
    pub fn field_set_mut(&mut self, names: &[&str]) -> Result<Vec<&mut Field<T>>, MeshError> {
        Ok(self.split_fields_mut(&[], names)?.outputs)
    }

    /// Borrows the `inputs` fields immutably and the `outputs` fields mutably, together with
    /// the spaces of the dictionary. All names must be distinct.
    pub fn split_fields_mut(&mut self, inputs: &[&str], outputs: &[&str]) -> Result<DictionaryView<'_, T>, MeshError> {
        if let Some(name) = inputs.iter().chain(outputs).duplicates().next() {
            return Err(MeshError::inconsistent(format!("field \"{name}\" requested twice")));
        }
        let mut input_slots: Vec<Option<&Field<T>>> = vec![None; inputs.len()];
        let mut output_slots: Vec<Option<&mut Field<T>>> = outputs.iter().map(|_| None).collect();
        for field in self.fields.iter_mut() {
            if let Some(pos) = outputs.iter().position(|&name| name == field.name()) {
                output_slots[pos] = Some(field);
            } else if let Some(pos) = inputs.iter().position(|&name| name == field.name()) {
                input_slots[pos] = Some(&*field);
            }
        }
        let inputs = fill_slots(input_slots, inputs)?;
        let outputs = fill_slots(output_slots, outputs)?;
        Ok(DictionaryView {
            spaces: &self.spaces,
            inputs,
            outputs,
        })
    }

    /// Creates a zero-initialised field on this dictionary.
    ///
    /// An empty descriptor declares a single scalar named after the field.
    pub fn create_field(&mut self, name: &str, descriptor: &str) -> Result<&mut Field<T>, MeshError> {
        if self.fields.iter().any(|field| field.name() == name) {
            return Err(MeshError::inconsistent(format!(
                "field \"{name}\" already exists in dictionary \"{}\"",
                self.tag
            )));
        }
        let descriptor = if descriptor.trim().is_empty() {
            VariablesDescriptor::scalar(name, self.dimension)?
        } else {
            VariablesDescriptor::parse(descriptor, self.dimension)?
        };
        let index = self.fields.len();
        self.fields
            .push(Field::zeros(name, &self.tag, descriptor, self.size));
        Ok(&mut self.fields[index])
    }

    pub fn remove_field(&mut self, name: &str) -> Result<Field<T>, MeshError> {
        if name == COORDINATES {
            return Err(MeshError::inconsistent("the coordinates field can not be removed"));
        }
        let pos = self
            .fields
            .iter()
            .position(|field| field.name() == name)
            .ok_or_else(|| MeshError::not_found("field", name))?;
        Ok(self.fields.remove(pos))
    }

    fn resize(&mut self, size: usize) {
        self.size = size;
        for field in &mut self.fields {
            field.resize(size);
        }
    }

    fn check_new_group(&self, entities: &Entities<T>, shape_function: &dyn ShapeFunction<T>) -> Result<(), MeshError> {
        if self.space_index.contains_key(&entities.id()) {
            return Err(MeshError::inconsistent(format!(
                "\"{}\" is already part of dictionary \"{}\"",
                entities.name(),
                self.tag
            )));
        }
        if shape_function.shape() != entities.element_type().shape() {
            return Err(MeshError::unsupported(
                shape_function.name(),
                format!("\"{}\" has elements of shape {:?}", entities.name(), entities.element_type().shape()),
            ));
        }
        Ok(())
    }

    /// Adds an entity group to the geometry dictionary, using node indices as DOFs.
    pub(crate) fn add_geometry_entities(&mut self, entities: Arc<Entities<T>>) -> Result<(), MeshError> {
        let shape_function = entities.geometry_shape_function().clone();
        self.check_new_group(&entities, shape_function.as_ref())?;
        if let Some(max) = entities.node_connectivity().max_index() {
            if max >= self.size {
                return Err(MeshError::OutOfRange {
                    index: max,
                    size: self.size,
                });
            }
        }
        let connectivity = entities.node_connectivity().clone();
        self.push_space(Space::bound(entities, shape_function, connectivity));
        Ok(())
    }

    /// Extends the numbering with the nodes of `shape_function` on every element of `entities`.
    ///
    /// Continuous dictionaries reuse the DOFs of nodes already numbered through previously added
    /// groups. All fields are resized, and the coordinates of the new DOFs are computed from the
    /// node coordinates in `geometry_coordinates`.
    pub(crate) fn add_entities(
        &mut self,
        entities: Arc<Entities<T>>,
        shape_function: Arc<dyn ShapeFunction<T>>,
        geometry_coordinates: &Field<T>,
    ) -> Result<(), MeshError> {
        if self.geometry {
            return self.add_geometry_entities(entities);
        }
        self.check_new_group(&entities, shape_function.as_ref())?;

        let nb_geometry_nodes = geometry_coordinates.size();
        if let Some(max) = entities.node_connectivity().max_index() {
            if max >= nb_geometry_nodes {
                return Err(MeshError::OutOfRange {
                    index: max,
                    size: nb_geometry_nodes,
                });
            }
        }

        let nb_nodes = shape_function.nb_nodes();
        let supports = (0..nb_nodes)
            .map(|node| shape_function.node_support(node))
            .collect_vec();
        let local_coordinates = shape_function.local_coordinates();

        let mut connectivity = Connectivity::new();
        // (dof, element, local node) for every DOF introduced by this group
        let mut new_points = Vec::new();
        let mut next_dof = self.size;
        let mut row = Vec::with_capacity(nb_nodes);
        for (e, vertices) in entities.node_connectivity().rows().enumerate() {
            row.clear();
            for (node, support) in supports.iter().enumerate() {
                let existing = if self.continuous {
                    let key = point_key(vertices, &support.vertices, support.child, support.siblings);
                    match self.point_keys.entry(key) {
                        Entry::Occupied(entry) => Some(*entry.get()),
                        Entry::Vacant(entry) => {
                            entry.insert(next_dof);
                            None
                        }
                    }
                } else {
                    None
                };
                let dof = existing.unwrap_or_else(|| {
                    new_points.push((next_dof, e, node));
                    next_dof += 1;
                    next_dof - 1
                });
                row.push(dof);
            }
            connectivity.push_row(&row);
        }

        // Locate the new DOFs by mapping their reference position through the geometry
        let mut located = Vec::with_capacity(new_points.len());
        for (e, points) in &new_points.into_iter().group_by(|&(_, e, _)| e) {
            let physical = entities.map_reference_coords(e, &local_coordinates, geometry_coordinates)?;
            located.extend(points.map(|(dof, _, node)| (dof, physical.row(node).iter().copied().collect_vec())));
        }

        self.resize(next_dof);
        let coordinates = &mut self.fields[0];
        for (dof, x) in located {
            coordinates.row_mut(dof).copy_from_slice(&x);
        }

        log::debug!(
            "dictionary \"{}\": added {} elements of \"{}\" with {}, size is now {}",
            self.tag,
            entities.size(),
            entities.name(),
            shape_function.name(),
            self.size
        );
        self.push_space(Space::bound(entities, shape_function, connectivity));
        Ok(())
    }

    fn push_space(&mut self, space: Space<T>) {
        self.space_index
            .insert(space.entities().id(), self.spaces.len());
        self.spaces.push(space);
    }

    /// Verifies the structural invariants of the dictionary and its fields.
    pub fn check_sanity(&self) -> Result<(), MeshError> {
        for field in &self.fields {
            if field.size() != self.size {
                return Err(MeshError::inconsistent(format!(
                    "field \"{}\" has {} rows but dictionary \"{}\" has size {}",
                    field.name(),
                    field.size(),
                    self.tag,
                    self.size
                )));
            }
            if field.row_size() != field.descriptor().size() {
                return Err(MeshError::inconsistent(format!(
                    "field \"{}\" has row size {} but its descriptor declares {} components",
                    field.name(),
                    field.row_size(),
                    field.descriptor().size()
                )));
            }
        }

        let mut owners = vec![0usize; self.size];
        for space in &self.spaces {
            let entities = space.entities();
            if space.connectivity().size() != entities.size() {
                return Err(MeshError::inconsistent(format!(
                    "space of \"{}\" has {} rows for {} elements",
                    entities.name(),
                    space.connectivity().size(),
                    entities.size()
                )));
            }
            for (e, row) in space.connectivity().rows().enumerate() {
                if row.len() != space.nb_dofs_per_element() {
                    return Err(MeshError::inconsistent(format!(
                        "element {e} of \"{}\" has {} DOFs instead of {}",
                        entities.name(),
                        row.len(),
                        space.nb_dofs_per_element()
                    )));
                }
                for &dof in row {
                    let count = owners.get_mut(dof).ok_or_else(|| {
                        MeshError::inconsistent(format!(
                            "element {e} of \"{}\" refers to DOF {dof} beyond size {}",
                            entities.name(),
                            self.size
                        ))
                    })?;
                    *count += 1;
                }
            }
        }

        if !self.continuous {
            if let Some(dof) = owners.iter().position(|&count| count != 1) {
                return Err(MeshError::inconsistent(format!(
                    "DOF {dof} of discontinuous dictionary \"{}\" is used by {} elements",
                    self.tag, owners[dof]
                )));
            }
        }
        Ok(())
    }
}

/// Builds the key of a shape-function node attached to `support` (local vertex indices) of an
/// element with geometric node row `element_nodes`.
///
/// Nodes strung along an edge are numbered from its lower to its higher global vertex, so both
/// elements sharing the edge agree on `child`.
fn point_key(element_nodes: &[usize], support: &[usize], child: usize, siblings: usize) -> PointKey {
    let global = support.iter().map(|&v| element_nodes[v]).collect_vec();
    let child = match global.as_slice() {
        [first, last] if siblings > 1 && first > last => siblings - 1 - child,
        _ => child,
    };
    let mut vertices = global;
    vertices.sort_unstable();
    (vertices, child)
}
