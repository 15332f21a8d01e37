use crate::dictionary::{Dictionary, COORDINATES};
use crate::solver::FieldNames;
use crate::{MeshError, Real};
use eyre::{eyre, WrapErr};
use rustc_hash::FxHashSet;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type BoundaryFunction<T> = Arc<dyn Fn(&[T]) -> Vec<T> + Send + Sync>;

/// Strong Dirichlet condition on the DOFs of named entity groups.
///
/// The solution at every constrained DOF is set to the value of a function of the DOF
/// coordinates, and the residual there is cleared so the update leaves it in place.
#[derive(Clone)]
pub struct BcDirichlet<T> {
    regions: Vec<String>,
    function: BoundaryFunction<T>,
}

impl<T> Debug for BcDirichlet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BcDirichlet")
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}

impl<T: Real> BcDirichlet<T> {
    pub fn new(regions: &[&str], function: impl Fn(&[T]) -> Vec<T> + Send + Sync + 'static) -> Self {
        Self {
            regions: regions.iter().map(|name| name.to_string()).collect(),
            function: Arc::new(function),
        }
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// The DOFs of `dict` covered by the regions, sorted.
    pub fn constrained_dofs(&self, dict: &Dictionary<T>) -> Result<Vec<usize>, MeshError> {
        let mut dofs = FxHashSet::default();
        for region in &self.regions {
            let space = dict
                .spaces()
                .iter()
                .find(|space| space.entities().name() == region)
                .ok_or_else(|| MeshError::not_found("region", format!("{region} in {}", dict.tag())))?;
            dofs.extend(space.connectivity().indices());
        }
        let mut dofs: Vec<_> = dofs.into_iter().collect();
        dofs.sort_unstable();
        Ok(dofs)
    }

    /// Imposes the condition on the solution field and clears the residual at the
    /// constrained DOFs.
    pub fn apply(&self, dict: &mut Dictionary<T>, names: &FieldNames) -> eyre::Result<()> {
        let dofs = self
            .constrained_dofs(dict)
            .wrap_err("failed to collect Dirichlet DOFs")?;
        let view = dict.split_fields_mut(&[COORDINATES], &[&names.solution, &names.residual])?;
        let coordinates = view.inputs[0];
        let mut outputs = view.outputs.into_iter();
        let (solution, residual) = match (outputs.next(), outputs.next()) {
            (Some(solution), Some(residual)) => (solution, residual),
            _ => return Err(eyre!("missing solution or residual field")),
        };

        for dof in dofs {
            let value = (self.function)(coordinates.row(dof));
            let row = solution.row_mut(dof);
            if value.len() != row.len() {
                let error = MeshError::ShapeMismatch {
                    expected: (1, row.len()),
                    actual: (1, value.len()),
                };
                return Err(eyre::Report::new(error).wrap_err(format!("boundary value for field \"{}\"", names.solution)));
            }
            row.copy_from_slice(&value);
            residual.row_mut(dof).fill(T::zero());
        }
        Ok(())
    }
}
