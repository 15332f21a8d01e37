use crate::dictionary::Dictionary;
use crate::mesh::Mesh;
use crate::physics::PhysicsModel;
use crate::scheme::ElementScheme;
use crate::solver::{BcDirichlet, DomainTerm, FieldNames};
use crate::Real;
use eyre::{eyre, WrapErr};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationSettings {
    /// Pseudo-time step as a fraction of the local stability limit.
    pub cfl: f64,
    pub max_iter: usize,
    /// Convergence threshold on the L2 norm of the residual.
    pub tolerance: f64,
    /// Whether domain terms run through [`DomainTerm::execute_par`].
    pub parallel: bool,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            cfl: 0.9,
            max_iter: 100,
            tolerance: 1e-10,
            parallel: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IterationReport {
    /// Number of residual evaluations performed.
    pub iterations: usize,
    /// L2 norm of the last evaluated residual.
    pub residual_norm: f64,
    pub converged: bool,
}

/// Explicit local pseudo-time stepping towards a steady state.
///
/// Every iteration clears the residual and wave speed, adds the contributions of all domain
/// terms, imposes the Dirichlet conditions and then updates
/// `u_i <- u_i - cfl * R_i / ws_i` on every DOF with a positive wave speed.
#[derive(Debug)]
pub struct SteadyExplicit<T: Real, P: PhysicsModel<T>, S: ElementScheme<T, P>> {
    settings: IterationSettings,
    fields: FieldNames,
    domain_terms: Vec<DomainTerm<T, P, S>>,
    boundary_conditions: Vec<BcDirichlet<T>>,
}

impl<T, P, S> SteadyExplicit<T, P, S>
where
    T: Real,
    P: PhysicsModel<T>,
    S: ElementScheme<T, P>,
{
    pub fn new(settings: IterationSettings) -> Self {
        Self {
            settings,
            fields: FieldNames::default(),
            domain_terms: Vec::new(),
            boundary_conditions: Vec::new(),
        }
    }

    /// Uses `fields` for all terms, including those added before.
    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.domain_terms = self
            .domain_terms
            .into_iter()
            .map(|term| term.with_fields(fields.clone()))
            .collect();
        self.fields = fields;
        self
    }

    pub fn settings(&self) -> &IterationSettings {
        &self.settings
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub fn add_domain_term(&mut self, term: DomainTerm<T, P, S>) -> &mut Self {
        self.domain_terms
            .push(term.with_fields(self.fields.clone()));
        self
    }

    pub fn add_boundary_condition(&mut self, bc: BcDirichlet<T>) -> &mut Self {
        self.boundary_conditions.push(bc);
        self
    }

    pub fn domain_terms(&self) -> &[DomainTerm<T, P, S>] {
        &self.domain_terms
    }

    /// Creates the solution, residual and wave speed fields of `dict` that do not exist yet.
    ///
    /// The solution and residual use the variables of the physics of the first domain term.
    pub fn prepare(&self, dict: &mut Dictionary<T>) -> eyre::Result<()> {
        let term = self
            .domain_terms
            .first()
            .ok_or_else(|| eyre!("steady iteration needs at least one domain term"))?;
        let descriptor = term.physics().solution_descriptor();
        for (name, descriptor) in [
            (&self.fields.solution, descriptor),
            (&self.fields.residual, descriptor),
            (&self.fields.wave_speed, ""),
        ] {
            if dict.field(name).is_err() {
                dict.create_field(name, descriptor)
                    .wrap_err_with(|| format!("failed to create field \"{name}\""))?;
            }
        }
        Ok(())
    }

    /// Iterates on the dictionary `dict_tag` of `mesh` until the residual norm drops below the
    /// tolerance or the maximum number of iterations is reached.
    ///
    /// Not converging is reported through [`IterationReport::converged`]; an error is only
    /// returned if a term fails or the residual stops being finite.
    pub fn solve(&mut self, mesh: &mut Mesh<T>, dict_tag: &str) -> eyre::Result<IterationReport> {
        let dict = mesh.dictionary_mut(dict_tag)?;
        self.prepare(dict)?;
        for bc in &self.boundary_conditions {
            bc.apply(dict, &self.fields)?;
        }

        let cfl: T = nalgebra::convert(self.settings.cfl);
        let mut report = IterationReport {
            iterations: 0,
            residual_norm: f64::INFINITY,
            converged: false,
        };

        while report.iterations < self.settings.max_iter {
            report.iterations += 1;
            let iteration = report.iterations;

            for field in dict.field_set_mut(&[&self.fields.residual, &self.fields.wave_speed])? {
                field.fill(T::zero());
            }
            for term in &mut self.domain_terms {
                if self.settings.parallel {
                    term.execute_par(dict)?;
                } else {
                    term.execute(dict)?;
                }
            }
            for bc in &self.boundary_conditions {
                bc.apply(dict, &self.fields)?;
            }

            let norm = dict
                .field(&self.fields.residual)?
                .norm_l2()
                .to_subset()
                .unwrap_or(f64::NAN);
            report.residual_norm = norm;
            debug!("iteration {iteration}: residual norm {norm:e}");
            if !norm.is_finite() {
                return Err(eyre!("residual norm is not finite at iteration {iteration}"));
            }
            if norm <= self.settings.tolerance {
                report.converged = true;
                break;
            }

            let skipped = self.update(dict, cfl)?;
            if skipped > 0 {
                warn!("iteration {iteration}: {skipped} DOFs with a residual but no wave speed were not updated");
            }
        }

        if report.converged {
            info!(
                "converged after {} iterations, residual norm {:e}",
                report.iterations, report.residual_norm
            );
        } else {
            info!(
                "not converged after {} iterations, residual norm {:e}",
                report.iterations, report.residual_norm
            );
        }
        Ok(report)
    }

    /// Applies one pseudo-time step and returns the number of DOFs that could not be updated.
    fn update(&self, dict: &mut Dictionary<T>, cfl: T) -> eyre::Result<usize> {
        let mut view = dict.split_fields_mut(&[&self.fields.residual, &self.fields.wave_speed], &[&self.fields.solution])?;
        let (residual, wave_speed) = (view.inputs[0], view.inputs[1]);
        let solution = &mut view.outputs[0];

        let mut skipped = 0;
        for (dof, (r, ws)) in residual.rows().zip(wave_speed.rows()).enumerate() {
            let ws = ws[0];
            if ws > T::zero() {
                let dt = cfl / ws;
                for (u, &r) in solution.row_mut(dof).iter_mut().zip(r) {
                    *u -= dt * r;
                }
            } else if r.iter().any(|r| !r.is_zero()) {
                skipped += 1;
            }
        }
        Ok(skipped)
    }
}
