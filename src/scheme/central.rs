use crate::physics::PhysicsModel;
use crate::scheme::{ElementScheme, SchemeBase};
use crate::Real;
use nalgebra::DMatrix;

/// Galerkin distribution `Phi_i = sum_q N_i(q) LU(q) wj(q)`.
///
/// The nodal wave speed is `sum_q wj(q) |K_i(q)|` with `K_i = sum_d dF_d/dU dN_i/dx_d`, where
/// `|K|` is the maximum absolute row sum, an upper bound of the spectral radius that is exact
/// for scalar equations.
#[derive(Debug, Clone)]
pub struct CentralScheme<T: Real> {
    k: DMatrix<T>,
}

impl<T: Real> Default for CentralScheme<T> {
    fn default() -> Self {
        Self { k: DMatrix::zeros(0, 0) }
    }
}

impl<T: Real, P: PhysicsModel<T>> ElementScheme<T, P> for CentralScheme<T> {
    fn name(&self) -> &'static str {
        "Central"
    }

    fn execute(&mut self, base: &mut SchemeBase<T, P>) {
        let neqs = P::NEQS;
        if self.k.shape() != (neqs, neqs) {
            self.k = DMatrix::zeros(neqs, neqs);
        }
        for q in 0..base.nb_qdpts() {
            base.compute_physics(q);
            let wj = base.wj[q];
            for i in 0..base.nb_nodes() {
                let ni = base.Ni[(q, i)];
                for v in 0..neqs {
                    base.Phi_n[(i, v)] += ni * base.LU[v] * wj;
                }

                self.k.fill(T::zero());
                for (d, jacobian) in base.dFdU.iter().enumerate() {
                    self.k += jacobian * base.dNdX[d][(q, i)];
                }
                let radius = self
                    .k
                    .row_iter()
                    .map(|row| row.iter().fold(T::zero(), |acc, k| acc + k.abs()))
                    .fold(T::zero(), |a, b| a.max(b));
                base.wave_speed_n[i] += wj * radius;
            }
        }
    }
}
