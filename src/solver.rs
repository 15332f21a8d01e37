//! Drivers assembling residuals over a mesh and iterating towards a steady state.
use serde::{Deserialize, Serialize};

mod bc;
pub mod coloring;
mod domain_term;
mod steady_explicit;

pub use bc::BcDirichlet;
pub use domain_term::DomainTerm;
pub use steady_explicit::{IterationReport, IterationSettings, SteadyExplicit};

/// Names of the fields the solver reads and writes in the solution dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub solution: String,
    pub residual: String,
    pub wave_speed: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            solution: "solution".to_string(),
            residual: "residual".to_string(),
            wave_speed: "wave_speed".to_string(),
        }
    }
}
