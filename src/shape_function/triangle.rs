use crate::shape_function::{GeoShape, NodeSupport, ShapeFunction};
use crate::Real;
use nalgebra::{convert, DMatrix};
use numeric_literals::replace_float_literals;

#[derive(Debug, Copy, Clone, Default)]
pub struct TriangleP0;

#[derive(Debug, Copy, Clone, Default)]
pub struct TriangleP1;

/// Six-node quadratic triangle. Edge nodes follow the vertices in the order
/// `(0, 1)`, `(1, 2)`, `(2, 0)`.
#[derive(Debug, Copy, Clone, Default)]
pub struct TriangleP2;

/// Corners of each edge of the reference triangle, counter-clockwise.
const TRIANGLE_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn barycentric<T: Real>(xi: &[T]) -> [T; 3] {
    [-0.5 * (xi[0] + xi[1]), 0.5 * (1.0 + xi[0]), 0.5 * (1.0 + xi[1])]
}

#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn barycentric_gradients<T: Real>() -> [[T; 2]; 3] {
    [
        [-0.5, -0.5],
        [ 0.5,  0.0],
        [ 0.0,  0.5],
    ]
}

fn triangle_coordinates<T: Real>(points: &[[f64; 2]]) -> DMatrix<T> {
    DMatrix::from_fn(points.len(), 2, |i, j| convert(points[i][j]))
}

impl<T: Real> ShapeFunction<T> for TriangleP0 {
    fn family(&self) -> &'static str {
        "LagrangeP0"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Triangle
    }

    fn order(&self) -> usize {
        0
    }

    fn nb_nodes(&self) -> usize {
        1
    }

    fn evaluate_value(&self, _xi: &[T], values: &mut [T]) {
        values[0] = T::one();
    }

    fn evaluate_gradient(&self, _xi: &[T], gradients: &mut DMatrix<T>) {
        gradients.fill(T::zero());
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        triangle_coordinates(&[[-1.0 / 3.0, -1.0 / 3.0]])
    }

    fn node_support(&self, _node: usize) -> NodeSupport {
        NodeSupport::entity(&[0, 1, 2], 0, 1)
    }
}

impl<T: Real> ShapeFunction<T> for TriangleP1 {
    fn family(&self) -> &'static str {
        "LagrangeP1"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Triangle
    }

    fn order(&self) -> usize {
        1
    }

    fn nb_nodes(&self) -> usize {
        3
    }

    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        values[..3].copy_from_slice(&barycentric(xi));
    }

    fn evaluate_gradient(&self, _xi: &[T], gradients: &mut DMatrix<T>) {
        for (node, grad) in barycentric_gradients::<T>().iter().enumerate() {
            gradients[(0, node)] = grad[0];
            gradients[(1, node)] = grad[1];
        }
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        triangle_coordinates(&[[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        NodeSupport::vertex(node)
    }
}

impl<T: Real> ShapeFunction<T> for TriangleP2 {
    fn family(&self) -> &'static str {
        "LagrangeP2"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Triangle
    }

    fn order(&self) -> usize {
        2
    }

    fn nb_nodes(&self) -> usize {
        6
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        let psi = barycentric(xi);
        for i in 0..3 {
            values[i] = psi[i] * (2.0 * psi[i] - 1.0);
        }
        for (k, [i, j]) in TRIANGLE_EDGES.into_iter().enumerate() {
            values[3 + k] = 4.0 * psi[i] * psi[j];
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>) {
        let psi = barycentric(xi);
        let g = barycentric_gradients::<T>();
        for d in 0..2 {
            for i in 0..3 {
                gradients[(d, i)] = (4.0 * psi[i] - 1.0) * g[i][d];
            }
            for (k, [i, j]) in TRIANGLE_EDGES.into_iter().enumerate() {
                gradients[(d, 3 + k)] = 4.0 * (psi[i] * g[j][d] + psi[j] * g[i][d]);
            }
        }
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        triangle_coordinates(&[
            [-1.0, -1.0],
            [1.0, -1.0],
            [-1.0, 1.0],
            [0.0, -1.0],
            [0.0, 0.0],
            [-1.0, 0.0],
        ])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        match node {
            0..=2 => NodeSupport::vertex(node),
            _ => NodeSupport::entity(&TRIANGLE_EDGES[node - 3], 0, 1),
        }
    }
}
