//! Domain error types

use std::fmt;

use thiserror::Error;

/// One or more dependency cycles, each recorded as the ordered sequence of
/// field names forming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleList(pub Vec<Vec<String>>);

impl CycleList {
    /// Number of cycles recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded cycles.
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.0
    }
}

impl fmt::Display for CycleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|cycle| {
                let mut names = cycle.clone();
                // Close the loop for readability: [a, b] renders a -> b -> a.
                if let Some(first) = cycle.first() {
                    names.push(first.clone());
                }
                names.join(" -> ")
            })
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

/// Errors raised while constructing a fixup spec.
///
/// These are developer-time contract violations, not runtime input problems:
/// construction fails before any call-time evaluation can be attempted
/// against the broken spec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("duplicate field declaration: {name}")]
    DuplicateField { name: String },

    #[error("field '{field}' requires undeclared field '{reference}'")]
    UnknownRequirement { field: String, reference: String },

    #[error("field '{field}' is influenced by undeclared field '{reference}'")]
    UnknownInfluence { field: String, reference: String },

    #[error("dependency cycle detected: {cycles}")]
    DependencyCycle { cycles: CycleList },
}

impl SpecError {
    /// Check if this error reports one or more dependency cycles.
    pub fn is_cycle(&self) -> bool {
        matches!(self, SpecError::DependencyCycle { .. })
    }
}
