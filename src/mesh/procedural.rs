//! Structured mesh generation on axis-aligned boxes.
use crate::connectivity::Connectivity;
use crate::entities::ElementType;
use crate::mesh::Mesh;
use crate::shape_function::GeoShape;
use crate::Real;
use eyre::{eyre, WrapErr};
use nalgebra::convert;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellShape {
    #[default]
    Quad,
    /// Every quadrilateral split into two triangles along its diagonal from the lower left
    /// corner.
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGeneratorSettings {
    /// Extent of the box along each axis.
    pub lengths: Vec<f64>,
    /// Number of cells along each axis.
    pub nb_cells: Vec<usize>,
    /// Position of the lower corner of the box.
    pub offsets: Vec<f64>,
    pub cell_shape: CellShape,
}

impl Default for MeshGeneratorSettings {
    fn default() -> Self {
        Self {
            lengths: vec![1.0, 1.0],
            nb_cells: vec![10, 10],
            offsets: vec![0.0, 0.0],
            cell_shape: CellShape::Quad,
        }
    }
}

/// Generates line meshes in 1D and rectangle meshes in 2D.
///
/// In 2D the mesh has the cell group `interior` and the boundary groups `bottom`, `right`,
/// `top` and `left`. Cells are counter-clockwise, and boundary edges run counter-clockwise
/// around the domain so that the outward normal is on their right.
#[derive(Debug, Clone, Default)]
pub struct SimpleMeshGenerator {
    settings: MeshGeneratorSettings,
}

impl SimpleMeshGenerator {
    pub fn new(settings: MeshGeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MeshGeneratorSettings {
        &self.settings
    }

    pub fn generate<T: Real>(&self) -> eyre::Result<Mesh<T>> {
        let MeshGeneratorSettings {
            lengths,
            nb_cells,
            offsets,
            cell_shape,
        } = &self.settings;
        let dim = lengths.len();
        if nb_cells.len() != dim {
            return Err(eyre!("got {} lengths but {} cell counts", dim, nb_cells.len()));
        }
        if nb_cells.iter().any(|&n| n == 0) {
            return Err(eyre!("cell counts must be positive, got {nb_cells:?}"));
        }
        let offset = |d: usize| offsets.get(d).copied().unwrap_or(0.0);
        let coordinate = |d: usize, i: usize| -> T { convert(offset(d) + lengths[d] * i as f64 / nb_cells[d] as f64) };

        let mesh = match dim {
            1 => self.generate_line(nb_cells[0], |i| coordinate(0, i)),
            2 => self.generate_rectangle(nb_cells[0], nb_cells[1], *cell_shape, &coordinate),
            _ => return Err(eyre!("meshes of dimension {dim} can not be generated")),
        }
        .wrap_err("failed to generate structured mesh")?;

        log::info!(
            "generated {}D mesh with {} nodes and {} entity groups",
            dim,
            mesh.nb_nodes(),
            mesh.entities().len()
        );
        Ok(mesh)
    }

    fn generate_line<T: Real>(&self, nx: usize, x: impl Fn(usize) -> T) -> eyre::Result<Mesh<T>> {
        let coordinates = (0..=nx).map(x).collect();
        let mut mesh = Mesh::from_nodes(1, coordinates)?;
        let cells = Connectivity::from_rows((0..nx).map(|i| [i, i + 1]));
        mesh.add_entities("interior", ElementType::lagrange_p1(GeoShape::Line, 1), cells)?;
        Ok(mesh)
    }

    fn generate_rectangle<T: Real>(
        &self,
        nx: usize,
        ny: usize,
        cell_shape: CellShape,
        coordinate: impl Fn(usize, usize) -> T,
    ) -> eyre::Result<Mesh<T>> {
        let node = |i: usize, j: usize| j * (nx + 1) + i;

        let mut coordinates = Vec::with_capacity(2 * (nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                coordinates.push(coordinate(0, i));
                coordinates.push(coordinate(1, j));
            }
        }
        let mut mesh = Mesh::from_nodes(2, coordinates)?;

        let mut cells = Connectivity::new();
        for j in 0..ny {
            for i in 0..nx {
                let quad = [node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)];
                match cell_shape {
                    CellShape::Quad => cells.push_row(&quad),
                    CellShape::Triangle => {
                        cells.push_row(&[quad[0], quad[1], quad[2]]);
                        cells.push_row(&[quad[0], quad[2], quad[3]]);
                    }
                }
            }
        }
        let shape = match cell_shape {
            CellShape::Quad => GeoShape::Quad,
            CellShape::Triangle => GeoShape::Triangle,
        };
        mesh.add_entities("interior", ElementType::lagrange_p1(shape, 2), cells)?;

        let boundaries = [
            ("bottom", (0..nx).map(|i| [node(i, 0), node(i + 1, 0)]).collect::<Vec<_>>()),
            ("right", (0..ny).map(|j| [node(nx, j), node(nx, j + 1)]).collect()),
            ("top", (0..nx).rev().map(|i| [node(i + 1, ny), node(i, ny)]).collect()),
            ("left", (0..ny).rev().map(|j| [node(0, j + 1), node(0, j)]).collect()),
        ];
        for (name, edges) in boundaries {
            mesh.add_entities(name, ElementType::lagrange_p1(GeoShape::Line, 2), Connectivity::from_rows(edges))?;
        }
        Ok(mesh)
    }
}
