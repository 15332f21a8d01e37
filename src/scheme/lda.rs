use crate::physics::PhysicsModel;
use crate::scheme::{ElementScheme, SchemeBase};
use crate::{MeshError, Real};
use nalgebra::DVector;

/// Low Diffusion A scheme for scalar equations.
///
/// With the upwind parameters `k_i = sum_q wj(q) sum_d dF_d/dU dN_i/dx_d` and the element
/// residual `Phi = sum_q LU(q) wj(q)`, node `i` receives `k_i^+ / sum_j k_j^+ * Phi`. Every node
/// of the element gets the wave speed `sum_j k_j^+`.
#[derive(Debug, Clone)]
pub struct LdaScheme<T: Real> {
    k: DVector<T>,
}

impl<T: Real> Default for LdaScheme<T> {
    fn default() -> Self {
        Self { k: DVector::zeros(0) }
    }
}

impl<T: Real, P: PhysicsModel<T>> ElementScheme<T, P> for LdaScheme<T> {
    fn name(&self) -> &'static str {
        "LDA"
    }

    fn prepare(&mut self, base: &SchemeBase<T, P>) -> Result<(), MeshError> {
        if P::NEQS != 1 {
            return Err(MeshError::inconsistent(format!(
                "the LDA scheme is implemented for scalar equations, got {} equations",
                P::NEQS
            )));
        }
        self.k = DVector::zeros(base.nb_nodes());
        Ok(())
    }

    fn execute(&mut self, base: &mut SchemeBase<T, P>) {
        let nb_nodes = base.nb_nodes();
        if self.k.len() != nb_nodes {
            self.k = DVector::zeros(nb_nodes);
        }
        self.k.fill(T::zero());

        let mut phi = T::zero();
        for q in 0..base.nb_qdpts() {
            base.compute_physics(q);
            let wj = base.wj[q];
            phi += base.LU[0] * wj;
            for i in 0..nb_nodes {
                let mut ki = T::zero();
                for (d, jacobian) in base.dFdU.iter().enumerate() {
                    ki += jacobian[(0, 0)] * base.dNdX[d][(q, i)];
                }
                self.k[i] += ki * wj;
            }
        }

        let sum_k_plus = self
            .k
            .iter()
            .fold(T::zero(), |acc, &k| acc + k.max(T::zero()));
        for i in 0..nb_nodes {
            if sum_k_plus > T::zero() {
                base.Phi_n[(i, 0)] = self.k[i].max(T::zero()) / sum_k_plus * phi;
            }
            base.wave_speed_n[i] = sum_k_plus;
        }
    }
}
