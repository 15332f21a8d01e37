//! Strategies for property-based tests of shape functions, element kernels and descriptors.
use crate::descriptor::VariableKind;
use crate::mesh::procedural::{CellShape, MeshGeneratorSettings};
use crate::shape_function::GeoShape;
use ::proptest::collection::{btree_set, vec};
use ::proptest::prelude::*;
use nalgebra::DMatrix;

/// A point in the interior or on the boundary of the reference element of `shape`.
pub fn reference_point(shape: GeoShape) -> impl Strategy<Value = Vec<f64>> {
    let range = -1.0..=1.0;
    match shape {
        GeoShape::Line => range.prop_map(|x| vec![x]).boxed(),
        GeoShape::Quad => [range.clone(), range].prop_map(|[x, y]| vec![x, y]).boxed(),
        // Map the unit square onto the reference triangle by folding the upper half
        GeoShape::Triangle => [0.0..=1.0, 0.0..=1.0]
            .prop_map(|[s, t]: [f64; 2]| {
                let (s, t) = if s + t > 1.0 { (1.0 - s, 1.0 - t) } else { (s, t) };
                vec![2.0 * s - 1.0, 2.0 * t - 1.0]
            })
            .boxed(),
    }
}

/// Node coordinates (`3 x 2`) of a counter-clockwise triangle with a minimum angle bounded
/// away from zero.
pub fn triangle_coordinates() -> impl Strategy<Value = DMatrix<f64>> {
    let coord = -10.0..10.0;
    (
        [coord.clone(), coord],
        0.5..5.0,
        0.0..std::f64::consts::TAU,
        0.3..2.5,
        0.5..2.0,
    )
        .prop_map(|([x0, y0], length, rotation, angle, ratio): ([f64; 2], f64, f64, f64, f64)| {
            let (a_x, a_y) = (length * rotation.cos(), length * rotation.sin());
            let (b_x, b_y) = (
                ratio * length * (rotation + angle).cos(),
                ratio * length * (rotation + angle).sin(),
            );
            DMatrix::from_row_slice(3, 2, &[x0, y0, x0 + a_x, y0 + a_y, x0 + b_x, y0 + b_y])
        })
}

/// Node coordinates (`4 x 2`) of a convex counter-clockwise quadrilateral, obtained by
/// perturbing the corners of a scaled and translated square.
pub fn convex_quad_coordinates() -> impl Strategy<Value = DMatrix<f64>> {
    let coord = -10.0..10.0;
    let perturbation = -0.2..0.2;
    ([coord.clone(), coord], 0.5..5.0, vec(perturbation, 8)).prop_map(
        |([x0, y0], size, delta): ([f64; 2], f64, Vec<f64>)| {
            let corners = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
            let mut coordinates = DMatrix::zeros(4, 2);
            for (i, corner) in corners.iter().enumerate() {
                coordinates[(i, 0)] = x0 + size * (corner[0] + delta[2 * i]);
                coordinates[(i, 1)] = y0 + size * (corner[1] + delta[2 * i + 1]);
            }
            coordinates
        },
    )
}

pub fn variable_kind() -> impl Strategy<Value = VariableKind> {
    prop_oneof![
        Just(VariableKind::Scalar),
        Just(VariableKind::Vector),
        (1..5usize).prop_map(VariableKind::Array),
    ]
}

/// A well-formed descriptor text with up to five distinct variables, together with the
/// expected row size in dimension `dimension`.
pub fn descriptor_text(dimension: usize) -> impl Strategy<Value = (String, usize)> {
    btree_set("[a-zA-Z][a-zA-Z0-9_]{0,6}", 1..=5)
        .prop_flat_map(|names| {
            let n = names.len();
            (Just(names), vec(variable_kind(), n))
        })
        .prop_map(move |(names, kinds)| {
            let mut size = 0;
            let tokens: Vec<String> = names
                .iter()
                .zip(kinds)
                .map(|(name, kind)| match kind {
                    VariableKind::Scalar => {
                        size += 1;
                        format!("{name}[s]")
                    }
                    VariableKind::Vector => {
                        size += dimension;
                        format!("{name}[v]")
                    }
                    VariableKind::Array(n) => {
                        size += n;
                        format!("{name}[{n}]")
                    }
                })
                .collect();
            (tokens.join(","), size)
        })
}

/// Small structured mesh settings in two dimensions.
pub fn mesh_generator_settings_2d() -> impl Strategy<Value = MeshGeneratorSettings> {
    (
        [1..5usize, 1..5usize],
        [0.5..3.0, 0.5..3.0],
        [-2.0..2.0, -2.0..2.0],
        prop_oneof![Just(CellShape::Quad), Just(CellShape::Triangle)],
    )
        .prop_map(|(nb_cells, lengths, offsets, cell_shape): ([usize; 2], [f64; 2], [f64; 2], CellShape)| {
            MeshGeneratorSettings {
                lengths: lengths.to_vec(),
                nb_cells: nb_cells.to_vec(),
                offsets: offsets.to_vec(),
                cell_shape,
            }
        })
}
