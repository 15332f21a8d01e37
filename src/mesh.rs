//! Meshes: nodes, entity groups and the dictionaries defined over them.
use crate::connectivity::Connectivity;
use crate::dictionary::Dictionary;
use crate::entities::{ElementType, Entities, EntitiesId};
use crate::shape_function::{lagrange, ShapeFunction};
use crate::{MeshError, Real};
use std::sync::Arc;

pub mod procedural;
pub mod wall_distance;

/// Tag of the dictionary holding the mesh nodes.
pub const GEOMETRY: &str = "geometry";

/// A mesh of entity groups embedded in `dimension`-dimensional space.
///
/// The mesh owns the entity groups and every dictionary defined on them. The geometry
/// dictionary always exists and numbers the mesh nodes.
#[derive(Debug)]
pub struct Mesh<T: Real> {
    dimension: usize,
    entities: Vec<Arc<Entities<T>>>,
    geometry: Dictionary<T>,
    dictionaries: Vec<Dictionary<T>>,
}

impl<T: Real> Mesh<T> {
    /// Creates a mesh without elements from node coordinates stored `dimension` per node.
    pub fn from_nodes(dimension: usize, coordinates: Vec<T>) -> Result<Self, MeshError> {
        if dimension == 0 || coordinates.len() % dimension != 0 {
            return Err(MeshError::inconsistent(format!(
                "{} coordinates can not describe nodes of dimension {dimension}",
                coordinates.len()
            )));
        }
        Ok(Self {
            dimension,
            entities: Vec::new(),
            geometry: Dictionary::geometry(GEOMETRY, dimension, &coordinates)?,
            dictionaries: Vec::new(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn nb_nodes(&self) -> usize {
        self.geometry.size()
    }

    /// Adds an entity group and extends every dictionary of the mesh with it.
    pub fn add_entities(
        &mut self,
        name: &str,
        element_type: ElementType<T>,
        node_connectivity: Connectivity,
    ) -> Result<Arc<Entities<T>>, MeshError> {
        if element_type.dimension() != self.dimension {
            return Err(MeshError::inconsistent(format!(
                "element type {} does not fit a mesh of dimension {}",
                element_type.name(),
                self.dimension
            )));
        }
        if self.entities.iter().any(|entities| entities.name() == name) {
            return Err(MeshError::inconsistent(format!("entity group \"{name}\" already exists")));
        }

        let shape = element_type.shape();
        let id = EntitiesId(self.entities.len());
        let entities = Arc::new(Entities::new(id, name, element_type, node_connectivity)?);

        // Resolve all shape functions first so a failed lookup leaves the mesh untouched
        let shape_functions = self
            .dictionaries
            .iter()
            .map(|dict| lagrange::<T>(dict.family(), shape))
            .collect::<Result<Vec<_>, _>>()?;

        self.geometry.add_geometry_entities(entities.clone())?;
        for (dict, sf) in self.dictionaries.iter_mut().zip(shape_functions) {
            dict.add_entities(entities.clone(), sf, self.geometry.coordinates())?;
        }
        self.entities.push(entities.clone());
        Ok(entities)
    }

    pub fn entities(&self) -> &[Arc<Entities<T>>] {
        &self.entities
    }

    pub fn entities_by_name(&self, name: &str) -> Result<&Arc<Entities<T>>, MeshError> {
        self.entities
            .iter()
            .find(|entities| entities.name() == name)
            .ok_or_else(|| MeshError::not_found("entity group", name))
    }

    /// Entity groups whose elements fill the space of the mesh.
    pub fn cells(&self) -> impl '_ + Iterator<Item = &Arc<Entities<T>>> {
        self.entities
            .iter()
            .filter(|entities| entities.element_type().is_cell())
    }

    /// Entity groups of lower dimensionality than the mesh, e.g. boundary edges in 2D.
    pub fn boundary_entities(&self) -> impl '_ + Iterator<Item = &Arc<Entities<T>>> {
        self.entities
            .iter()
            .filter(|entities| entities.element_type().dimensionality() < self.dimension)
    }

    pub fn geometry_fields(&self) -> &Dictionary<T> {
        &self.geometry
    }

    pub fn geometry_fields_mut(&mut self) -> &mut Dictionary<T> {
        &mut self.geometry
    }

    pub fn dictionaries(&self) -> impl '_ + Iterator<Item = &Dictionary<T>> {
        std::iter::once(&self.geometry).chain(&self.dictionaries)
    }

    pub fn dictionary(&self, tag: &str) -> Result<&Dictionary<T>, MeshError> {
        self.dictionaries()
            .find(|dict| dict.tag() == tag)
            .ok_or_else(|| MeshError::not_found("dictionary", tag))
    }

    pub fn dictionary_mut(&mut self, tag: &str) -> Result<&mut Dictionary<T>, MeshError> {
        if tag == GEOMETRY {
            return Ok(&mut self.geometry);
        }
        self.dictionaries
            .iter_mut()
            .find(|dict| dict.tag() == tag)
            .ok_or_else(|| MeshError::not_found("dictionary", tag))
    }

    /// The geometry dictionary together with another dictionary of the mesh.
    pub fn geometry_and_dictionary_mut(&mut self, tag: &str) -> Result<(&Dictionary<T>, &mut Dictionary<T>), MeshError> {
        let dict = self
            .dictionaries
            .iter_mut()
            .find(|dict| dict.tag() == tag)
            .ok_or_else(|| MeshError::not_found("dictionary", tag))?;
        Ok((&self.geometry, dict))
    }

    /// Creates a dictionary in which nodes shared between elements share one DOF.
    pub fn create_continuous_space(&mut self, tag: &str, family: &str) -> Result<&mut Dictionary<T>, MeshError> {
        self.create_space(tag, family, true)
    }

    /// Creates a dictionary in which every element owns its DOFs.
    pub fn create_discontinuous_space(&mut self, tag: &str, family: &str) -> Result<&mut Dictionary<T>, MeshError> {
        self.create_space(tag, family, false)
    }

    fn create_space(&mut self, tag: &str, family: &str, continuous: bool) -> Result<&mut Dictionary<T>, MeshError> {
        if self.dictionaries().any(|dict| dict.tag() == tag) {
            return Err(MeshError::inconsistent(format!("dictionary \"{tag}\" already exists")));
        }

        let mut dict = Dictionary::new(tag, family, continuous, self.dimension)?;
        for entities in &self.entities {
            let sf: Arc<dyn ShapeFunction<T>> = lagrange(family, entities.element_type().shape())?;
            dict.add_entities(entities.clone(), sf, self.geometry.coordinates())?;
        }
        log::debug!(
            "created {} dictionary \"{tag}\" with {family}: {} DOFs over {} entity groups",
            if continuous { "continuous" } else { "discontinuous" },
            dict.size(),
            self.entities.len()
        );

        let index = self.dictionaries.len();
        self.dictionaries.push(dict);
        Ok(&mut self.dictionaries[index])
    }
}
