//! Physical models providing the flux Jacobians needed by the element kernels.
use crate::Real;
use nalgebra::{DMatrix, DVector};
use std::fmt::Debug;

/// A system of `NEQS` conservation laws in `NDIM` dimensions,
/// `dU/dt + sum_d dF_d(U)/dx_d = 0`.
pub trait PhysicsModel<T: Real>: Clone + Debug + Send + Sync {
    const NEQS: usize;
    const NDIM: usize;

    /// Pointwise state derived from the position, the solution and its gradient.
    type Properties: Clone + Debug + Send + Sync;

    fn default_properties(&self) -> Self::Properties;

    /// Descriptor of the solution variables, e.g. `U[s]`.
    fn solution_descriptor(&self) -> &'static str;

    /// Evaluates the properties at a point with coordinates `x`, solution `u` and solution
    /// gradient `dudx` (`NEQS x NDIM`).
    fn compute_properties(&self, x: &DVector<T>, u: &DVector<T>, dudx: &DMatrix<T>, props: &mut Self::Properties);

    /// Writes the flux Jacobian `dF_d/dU` (`NEQS x NEQS`) for every dimension `d`.
    fn flux_jacobians(&self, props: &Self::Properties, dfdu: &mut [DMatrix<T>]);

    /// The quasi-linear operator `L(U) = sum_d dF_d/dU dU/dx_d`.
    fn lu(&self, _props: &Self::Properties, dfdu: &[DMatrix<T>], dudx: &DMatrix<T>, lu: &mut DVector<T>) {
        lu.fill(T::zero());
        for (d, jacobian) in dfdu.iter().enumerate() {
            lu.gemv(T::one(), jacobian, &dudx.column(d), T::one());
        }
    }
}

/// Advection velocity at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvectionProperties<T: Real> {
    pub velocity: [T; 2],
}

impl<T: Real> Default for AdvectionProperties<T> {
    fn default() -> Self {
        Self {
            velocity: [T::zero(); 2],
        }
    }
}

fn advection_jacobians<T: Real>(props: &AdvectionProperties<T>, dfdu: &mut [DMatrix<T>]) {
    for (jacobian, &a) in dfdu.iter_mut().zip(&props.velocity) {
        jacobian[(0, 0)] = a;
    }
}

/// Scalar advection with a constant velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearAdv2D<T: Real> {
    pub velocity: [T; 2],
}

impl<T: Real> LinearAdv2D<T> {
    pub fn new(velocity: [T; 2]) -> Self {
        Self { velocity }
    }
}

impl<T: Real> PhysicsModel<T> for LinearAdv2D<T> {
    const NEQS: usize = 1;
    const NDIM: usize = 2;

    type Properties = AdvectionProperties<T>;

    fn default_properties(&self) -> Self::Properties {
        AdvectionProperties::default()
    }

    fn solution_descriptor(&self) -> &'static str {
        "U[s]"
    }

    fn compute_properties(&self, _x: &DVector<T>, _u: &DVector<T>, _dudx: &DMatrix<T>, props: &mut Self::Properties) {
        props.velocity = self.velocity;
    }

    fn flux_jacobians(&self, props: &Self::Properties, dfdu: &mut [DMatrix<T>]) {
        advection_jacobians(props, dfdu);
    }
}

/// Scalar advection by the solid-body rotation `a(x, y) = (y, -x)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationAdv2D;

impl<T: Real> PhysicsModel<T> for RotationAdv2D {
    const NEQS: usize = 1;
    const NDIM: usize = 2;

    type Properties = AdvectionProperties<T>;

    fn default_properties(&self) -> Self::Properties {
        AdvectionProperties::default()
    }

    fn solution_descriptor(&self) -> &'static str {
        "U[s]"
    }

    fn compute_properties(&self, x: &DVector<T>, _u: &DVector<T>, _dudx: &DMatrix<T>, props: &mut Self::Properties) {
        props.velocity = [x[1], -x[0]];
    }

    fn flux_jacobians(&self, props: &Self::Properties, dfdu: &mut [DMatrix<T>]) {
        advection_jacobians(props, dfdu);
    }
}
