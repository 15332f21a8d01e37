use crate::shape_function::{GeoShape, NodeSupport, ShapeFunction};
use crate::Real;
use nalgebra::{convert, DMatrix};
use numeric_literals::replace_float_literals;

#[derive(Debug, Copy, Clone, Default)]
pub struct QuadP0;

#[derive(Debug, Copy, Clone, Default)]
pub struct QuadP1;

/// Nine-node biquadratic quadrilateral: corners, edge midpoints, then the center.
#[derive(Debug, Copy, Clone, Default)]
pub struct QuadP2;

const QUAD_EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

/// Reference coordinates `(alpha, beta)` of the nine biquadratic nodes.
#[rustfmt::skip]
const QUAD9_NODES: [[f64; 2]; 9] = [
    [-1.0, -1.0], [ 1.0, -1.0], [ 1.0,  1.0], [-1.0,  1.0],
    [ 0.0, -1.0], [ 1.0,  0.0], [ 0.0,  1.0], [-1.0,  0.0],
    [ 0.0,  0.0],
];

fn quad_coordinates<T: Real>(points: &[[f64; 2]]) -> DMatrix<T> {
    DMatrix::from_fn(points.len(), 2, |i, j| convert(points[i][j]))
}

/// One-dimensional quadratic Lagrange polynomial which is one at `alpha` and zero at the other
/// two nodes of `{-1, 0, 1}`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quad9_phi_1d<T: Real>(alpha: T, x: T) -> T {
    let alpha2 = alpha * alpha;
    let a = (3.0 / 2.0) * alpha2 - 1.0;
    let b = alpha / 2.0;
    let c = 1.0 - alpha2;
    a * x * x + b * x + c
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quad9_phi_grad_1d<T: Real>(alpha: T, x: T) -> T {
    let alpha2 = alpha * alpha;
    let a = (3.0 / 2.0) * alpha2 - 1.0;
    let b = alpha / 2.0;
    2.0 * a * x + b
}

impl<T: Real> ShapeFunction<T> for QuadP0 {
    fn family(&self) -> &'static str {
        "LagrangeP0"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Quad
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
        quad_coordinates(&[[0.0, 0.0]])
    }

    fn node_support(&self, _node: usize) -> NodeSupport {
        NodeSupport::entity(&[0, 1, 2, 3], 0, 1)
    }
}

impl<T: Real> ShapeFunction<T> for QuadP1 {
    fn family(&self) -> &'static str {
        "LagrangeP1"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Quad
    }

    fn order(&self) -> usize {
        1
    }

    fn nb_nodes(&self) -> usize {
        4
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        // N_{alpha, beta}([alpha, beta]) = 1 with alpha, beta = 1 or -1
        for (node, [alpha, beta]) in QUAD9_NODES[..4].iter().enumerate() {
            let (alpha, beta): (T, T) = (convert(*alpha), convert(*beta));
            values[node] = (1.0 + alpha * xi[0]) * (1.0 + beta * xi[1]) / 4.0;
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>) {
        for (node, [alpha, beta]) in QUAD9_NODES[..4].iter().enumerate() {
            let (alpha, beta): (T, T) = (convert(*alpha), convert(*beta));
            gradients[(0, node)] = alpha * (1.0 + beta * xi[1]) / 4.0;
            gradients[(1, node)] = beta * (1.0 + alpha * xi[0]) / 4.0;
        }
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        quad_coordinates(&QUAD9_NODES[..4])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        NodeSupport::vertex(node)
    }
}

impl<T: Real> ShapeFunction<T> for QuadP2 {
    fn family(&self) -> &'static str {
        "LagrangeP2"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Quad
    }

    fn order(&self) -> usize {
        2
    }

    fn nb_nodes(&self) -> usize {
        9
    }

    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        for (node, [alpha, beta]) in QUAD9_NODES.iter().enumerate() {
            values[node] = quad9_phi_1d(convert(*alpha), xi[0]) * quad9_phi_1d(convert(*beta), xi[1]);
        }
    }

    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>) {
        for (node, [alpha, beta]) in QUAD9_NODES.iter().enumerate() {
            let (alpha, beta): (T, T) = (convert(*alpha), convert(*beta));
            gradients[(0, node)] = quad9_phi_grad_1d(alpha, xi[0]) * quad9_phi_1d(beta, xi[1]);
            gradients[(1, node)] = quad9_phi_1d(alpha, xi[0]) * quad9_phi_grad_1d(beta, xi[1]);
        }
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        quad_coordinates(&QUAD9_NODES)
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        match node {
            0..=3 => NodeSupport::vertex(node),
            4..=7 => NodeSupport::entity(&QUAD_EDGES[node - 4], 0, 1),
            _ => NodeSupport::entity(&[0, 1, 2, 3], 0, 1),
        }
    }
}
