//! Layout of the named variables stored in each row of a field.
//!
//! A descriptor is written as a comma-separated list of `name[kind]` tokens, for example
//! `"rho[s],V[v],p[s]"`. The kind is `s` for a scalar (one component), `v` for a vector with
//! one component per spatial dimension, or a positive integer giving the component count
//! explicitly.
use crate::MeshError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Scalar,
    Vector,
    Array(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    size: usize,
    offset: usize,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Number of components of the variable.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Position of the first component of the variable within a field row.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablesDescriptor {
    variables: Vec<Variable>,
    dimension: usize,
}

impl VariablesDescriptor {
    /// Parses a descriptor for a mesh of the given spatial dimension.
    pub fn parse(description: &str, dimension: usize) -> Result<Self, MeshError> {
        if description.trim().is_empty() {
            return Err(MeshError::invalid_descriptor(description, "descriptor is empty"));
        }

        let mut variables: Vec<Variable> = Vec::new();
        let mut offset = 0;
        for token in description.split(',').map(str::trim) {
            let (name, kind) = parse_token(description, token)?;
            if variables.iter().any(|var| var.name == name) {
                return Err(MeshError::invalid_descriptor(
                    description,
                    format!("variable \"{name}\" is declared twice"),
                ));
            }
            let size = match kind {
                VariableKind::Scalar => 1,
                VariableKind::Vector => dimension,
                VariableKind::Array(n) => n,
            };
            if size == 0 {
                return Err(MeshError::invalid_descriptor(
                    description,
                    format!("variable \"{name}\" has no components"),
                ));
            }
            variables.push(Variable {
                name: name.to_string(),
                kind,
                size,
                offset,
            });
            offset += size;
        }

        Ok(Self { variables, dimension })
    }

    /// A descriptor holding a single scalar variable.
    pub fn scalar(name: &str, dimension: usize) -> Result<Self, MeshError> {
        Self::parse(&format!("{name}[s]"), dimension)
    }

    /// Total number of components, i.e. the row size of a field using this descriptor.
    pub fn size(&self) -> usize {
        self.variables.iter().map(Variable::size).sum()
    }

    pub fn nb_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Result<&Variable, MeshError> {
        self.variables
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| MeshError::not_found("variable", name))
    }

    pub fn offset(&self, name: &str) -> Result<usize, MeshError> {
        self.variable(name).map(Variable::offset)
    }

    /// The canonical textual form of the descriptor.
    pub fn description(&self) -> String {
        self.to_string()
    }

    pub fn prefix_variable_names(&mut self, prefix: &str) {
        for var in &mut self.variables {
            var.name.insert_str(0, prefix);
        }
    }
}

impl Display for VariablesDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, var) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match var.kind {
                VariableKind::Scalar => write!(f, "{}[s]", var.name)?,
                VariableKind::Vector => write!(f, "{}[v]", var.name)?,
                VariableKind::Array(n) => write!(f, "{}[{}]", var.name, n)?,
            }
        }
        Ok(())
    }
}

fn parse_token<'a>(description: &str, token: &'a str) -> Result<(&'a str, VariableKind), MeshError> {
    let (name, rest) = token
        .split_once('[')
        .ok_or_else(|| MeshError::invalid_descriptor(description, format!("\"{token}\" has no kind")))?;
    let kind = rest
        .strip_suffix(']')
        .ok_or_else(|| MeshError::invalid_descriptor(description, format!("\"{token}\" is missing ']'")))?
        .trim();
    let name = name.trim();
    if name.is_empty() {
        return Err(MeshError::invalid_descriptor(description, "variable without a name"));
    }

    let kind = match kind {
        "s" => VariableKind::Scalar,
        "v" => VariableKind::Vector,
        count => count
            .parse::<usize>()
            .map(VariableKind::Array)
            .map_err(|_| MeshError::invalid_descriptor(description, format!("unknown kind \"{count}\"")))?,
    };
    Ok((name, kind))
}
