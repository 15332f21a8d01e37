//! Quadrature rules on the reference elements of the shape function catalogue.
use crate::shape_function::GeoShape;
use crate::{MeshError, Real};
use fenris_quadrature::{polyquad, tensor, univariate};
use nalgebra::{convert, Scalar};

/// Weights and points of a quadrature rule of a fixed reference dimension.
///
/// Points are stored back to back, `dim` coordinates per point.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule<T: Scalar> {
    weights: Vec<T>,
    points: Vec<T>,
    dim: usize,
}

fn convert_rule<T: Real, const D: usize>(rule: fenris_quadrature::Rule<D>) -> QuadratureRule<T> {
    let (weights, points) = rule;
    QuadratureRule {
        weights: weights.into_iter().map(convert).collect(),
        points: points.into_iter().flatten().map(convert).collect(),
        dim: D,
    }
}

impl<T: Real> QuadratureRule<T> {
    /// # Panics
    ///
    /// Panics if the number of coordinates does not match `dim` times the number of weights.
    pub fn from_parts(weights: Vec<T>, points: Vec<T>, dim: usize) -> Self {
        assert_eq!(weights.len() * dim, points.len(), "Every weight needs one point of dimension {dim}.");
        Self { weights, points, dim }
    }

    /// Gauss-Legendre rule with `num_points` points on `[-1, 1]`.
    pub fn gauss_line(num_points: usize) -> Self {
        convert_rule(univariate::gauss(num_points))
    }

    /// Tensor product Gauss rule on `[-1, 1]^2`.
    pub fn gauss_quad(num_points_per_dim: usize) -> Self {
        convert_rule(tensor::quadrilateral_gauss(num_points_per_dim))
    }

    /// A rule on the reference triangle that integrates polynomials of total degree `strength`
    /// exactly.
    pub fn triangle(strength: usize) -> Result<Self, MeshError> {
        let rule = polyquad::triangle(strength)
            .map_err(|_| MeshError::not_found("quadrature rule", format!("Triangle of strength {strength}")))?;
        Ok(convert_rule(rule))
    }

    /// A rule for `shape` that is exact for polynomials of degree `order`.
    pub fn for_shape(shape: GeoShape, order: usize) -> Result<Self, MeshError> {
        // n Gauss points integrate degree 2n - 1 exactly
        let num_gauss_points = order / 2 + 1;
        match shape {
            GeoShape::Line => Ok(Self::gauss_line(num_gauss_points)),
            GeoShape::Quad => Ok(Self::gauss_quad(num_gauss_points)),
            GeoShape::Triangle => Self::triangle(order.max(1)),
        }
    }

    pub fn integrate(&self, f: impl Fn(&[T]) -> T) -> T {
        self.iter()
            .fold(T::zero(), |integral, (w, xi)| integral + f(xi) * w)
    }
}

impl<T: Scalar> QuadratureRule<T> {
    pub fn num_points(&self) -> usize {
        self.weights.len()
    }

    /// Dimension of the reference domain.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn point(&self, q: usize) -> &[T] {
        &self.points[q * self.dim..(q + 1) * self.dim]
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (T, &[T])> {
        self.weights
            .iter()
            .cloned()
            .zip(self.points.chunks_exact(self.dim.max(1)))
    }
}
