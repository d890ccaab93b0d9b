//! Output shape port.
//!
//! Separates "which fields make up the tool input" (domain) from "proving
//! the assembled value matches the declared shape" (infrastructure). The
//! port is consumed only when producing the final accepted value; a
//! mismatch turns into a top-level rejection reason instead of an
//! acceptance.

use std::fmt;

use serde_json::{Map, Value};

/// Mismatch between an assembled value and the declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Human-readable problems, one per offending member.
    pub problems: Vec<String>,
}

impl ShapeMismatch {
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value does not match declared shape: {}",
            self.problems.join("; ")
        )
    }
}

impl std::error::Error for ShapeMismatch {}

/// Port for the schema/type layer that proves a fully-populated value
/// matches the declared input shape.
pub trait ShapeCheckPort: Send + Sync {
    /// Check `value` against the declared shape.
    fn check(&self, value: &Map<String, Value>) -> Result<(), ShapeMismatch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display_joins_problems() {
        let mismatch = ShapeMismatch::new(vec![
            "member 'a' is missing".to_string(),
            "member 'b' is not a string".to_string(),
        ]);
        assert_eq!(
            mismatch.to_string(),
            "value does not match declared shape: member 'a' is missing; member 'b' is not a string"
        );
    }
}
