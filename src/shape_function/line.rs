use crate::shape_function::{GeoShape, NodeSupport, ShapeFunction};
use crate::Real;
use nalgebra::{convert, DMatrix};
use numeric_literals::replace_float_literals;

/// Piecewise constant on the reference line.
#[derive(Debug, Copy, Clone, Default)]
pub struct LineP0;

#[derive(Debug, Copy, Clone, Default)]
pub struct LineP1;

/// Quadratic line with nodes at `-1`, `1` and `0`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LineP2;

/// Cubic line with nodes at `-1`, `1`, `-1/3` and `1/3`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LineP3;

fn line_coordinates<T: Real>(points: &[f64]) -> DMatrix<T> {
    DMatrix::from_iterator(points.len(), 1, points.iter().map(|&x| convert(x)))
}

impl<T: Real> ShapeFunction<T> for LineP0 {
    fn family(&self) -> &'static str {
        "LagrangeP0"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Line
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
        line_coordinates(&[0.0])
    }

    fn node_support(&self, _node: usize) -> NodeSupport {
        NodeSupport::entity(&[0, 1], 0, 1)
    }
}

impl<T: Real> ShapeFunction<T> for LineP1 {
    fn family(&self) -> &'static str {
        "LagrangeP1"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Line
    }

    fn order(&self) -> usize {
        1
    }

    fn nb_nodes(&self) -> usize {
        2
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        values[0] = (1.0 - xi[0]) / 2.0;
        values[1] = (1.0 + xi[0]) / 2.0;
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_gradient(&self, _xi: &[T], gradients: &mut DMatrix<T>) {
        gradients[(0, 0)] = -0.5;
        gradients[(0, 1)] = 0.5;
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        line_coordinates(&[-1.0, 1.0])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        NodeSupport::vertex(node)
    }
}

impl<T: Real> ShapeFunction<T> for LineP2 {
    fn family(&self) -> &'static str {
        "LagrangeP2"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Line
    }

    fn order(&self) -> usize {
        2
    }

    fn nb_nodes(&self) -> usize {
        3
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        let x = xi[0];
        values[0] = 0.5 * x * (x - 1.0);
        values[1] = 0.5 * x * (x + 1.0);
        values[2] = 1.0 - x * x;
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>) {
        let x = xi[0];
        gradients[(0, 0)] = x - 0.5;
        gradients[(0, 1)] = x + 0.5;
        gradients[(0, 2)] = -2.0 * x;
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        line_coordinates(&[-1.0, 1.0, 0.0])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        match node {
            0 | 1 => NodeSupport::vertex(node),
            _ => NodeSupport::entity(&[0, 1], 0, 1),
        }
    }
}

impl<T: Real> ShapeFunction<T> for LineP3 {
    fn family(&self) -> &'static str {
        "LagrangeP3"
    }

    fn shape(&self) -> GeoShape {
        GeoShape::Line
    }

    fn order(&self) -> usize {
        3
    }

    fn nb_nodes(&self) -> usize {
        4
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_value(&self, xi: &[T], values: &mut [T]) {
        let x = xi[0];
        let third = 1.0 / 3.0;
        values[0] = -(9.0 / 16.0) * (x * x - third * third) * (x - 1.0);
        values[1] =  (9.0 / 16.0) * (x * x - third * third) * (x + 1.0);
        values[2] =  (27.0 / 16.0) * (x * x - 1.0) * (x - third);
        values[3] = -(27.0 / 16.0) * (x * x - 1.0) * (x + third);
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_gradient(&self, xi: &[T], gradients: &mut DMatrix<T>) {
        // d/dx [(x^2 - a) (x - b)] = 2x (x - b) + x^2 - a
        let x = xi[0];
        let third = 1.0 / 3.0;
        gradients[(0, 0)] = -(9.0 / 16.0) * (2.0 * x * (x - 1.0) + x * x - third * third);
        gradients[(0, 1)] =  (9.0 / 16.0) * (2.0 * x * (x + 1.0) + x * x - third * third);
        gradients[(0, 2)] =  (27.0 / 16.0) * (2.0 * x * (x - third) + x * x - 1.0);
        gradients[(0, 3)] = -(27.0 / 16.0) * (2.0 * x * (x + third) + x * x - 1.0);
    }

    fn local_coordinates(&self) -> DMatrix<T> {
        line_coordinates(&[-1.0, 1.0, -1.0 / 3.0, 1.0 / 3.0])
    }

    fn node_support(&self, node: usize) -> NodeSupport {
        match node {
            0 | 1 => NodeSupport::vertex(node),
            _ => NodeSupport::entity(&[0, 1], node - 2, 2),
        }
    }
}
