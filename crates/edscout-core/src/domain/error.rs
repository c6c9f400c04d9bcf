//! Domain-level error taxonomy for EdScout.
//!
//! Only structural problems surface here. Collaborator failures (search,
//! scoring, gate review) are absorbed into degraded-but-valid data by the
//! stages that encounter them and never reach this taxonomy.

use crate::domain::record::Category;

/// EdScout domain errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("category {category} already scored for candidate {candidate}")]
    DuplicateFinding {
        candidate: String,
        category: Category,
    },

    #[error("category {category} not yet scored for candidate {candidate}")]
    MissingFinding {
        candidate: String,
        category: Category,
    },

    #[error("verdict already recorded for candidate {0}")]
    VerdictAlreadySet(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for EdScout domain operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_error_display() {
        let err = EvalError::InvalidConfig("weights sum to 0.9".to_string());
        assert!(err.to_string().contains("invalid engine config"));

        let err = EvalError::DuplicateFinding {
            candidate: "AlphaEd".to_string(),
            category: Category::Market,
        };
        assert!(err.to_string().contains("already scored"));
        assert!(err.to_string().contains("market"));

        let err = EvalError::VerdictAlreadySet("AlphaEd".to_string());
        assert!(err.to_string().contains("verdict already recorded"));
    }
}
