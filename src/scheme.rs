//! Residual distribution schemes and the element kernel they build on.
use crate::physics::PhysicsModel;
use crate::{MeshError, Real};
use std::fmt::Debug;

mod base;
mod central;
mod lda;

pub use base::SchemeBase;
pub use central::CentralScheme;
pub use lda::LdaScheme;

/// Distributes the residual of one element to its nodes.
///
/// `execute` is called after [`SchemeBase::interpolate`] and writes `Phi_n` and
/// `wave_speed_n` of the kernel.
pub trait ElementScheme<T: Real, P: PhysicsModel<T>>: Clone + Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Prepares the scheme for a newly (re)built kernel.
    fn prepare(&mut self, _base: &SchemeBase<T, P>) -> Result<(), MeshError> {
        Ok(())
    }

    fn execute(&mut self, base: &mut SchemeBase<T, P>);
}
