//! Error types for judging operations.
//!
//! Every stage of the pipeline (alignment, intention matching, measurement and
//! scoring) reports failures through [`JudgeError`]. Nothing is caught and
//! hidden between stages.

use thiserror::Error;

/// Main error type for judging operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JudgeError {
    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A sequence that must hold samples was empty.
    #[error("Empty sequence: {0}")]
    EmptySequence(String),

    /// Two sequences (or a sequence and its labels) have mismatched lengths.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Timestamps are not strictly increasing.
    #[error("Timestamps must be strictly increasing at index {index}")]
    NonMonotonicTime { index: usize },

    /// Numerical computation resulted in NaN, Inf or division by zero.
    #[error("Numerical instability: {context}")]
    NumericalInstability { context: String },

    /// An element whose geometry cannot be generated or fitted.
    #[error("Degenerate element {id}: {reason}")]
    DegenerateElement { id: String, reason: String },

    /// No flown samples carry the label of an element.
    #[error("No samples labelled for element {0}")]
    MissingElement(String),

    /// Two entries of an ordered collection share an id.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// A ratio comparison was asked to divide by a zero reference.
    #[error("Zero reference value at position {index} in ratio comparison")]
    ZeroReference { index: usize },

    /// A least-squares fit did not produce a usable solution.
    #[error("Fit failed: {0}")]
    FitFailed(String),

    /// A criterion was evaluated on input of the wrong shape.
    #[error("{criterion} criterion cannot evaluate {input}")]
    CriterionMismatch {
        criterion: &'static str,
        input: &'static str,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for judging operations.
pub type Result<T> = std::result::Result<T, JudgeError>;

impl JudgeError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an empty sequence error.
    #[must_use]
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptySequence(what.into())
    }

    /// Create a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create a numerical instability error.
    #[must_use]
    pub fn numerical_instability(context: impl Into<String>) -> Self {
        Self::NumericalInstability {
            context: context.into(),
        }
    }

    /// Create a degenerate element error.
    #[must_use]
    pub fn degenerate(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateElement {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing element error.
    #[must_use]
    pub fn missing_element(id: impl Into<String>) -> Self {
        Self::MissingElement(id.into())
    }

    /// Create a fit failure error.
    #[must_use]
    pub fn fit_failed(msg: impl Into<String>) -> Self {
        Self::FitFailed(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JudgeError::length_mismatch(10, 5);
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("5"));

        let err = JudgeError::degenerate("e1", "zero radius");
        assert!(err.to_string().contains("e1"));
        assert!(err.to_string().contains("zero radius"));
    }

    #[test]
    fn test_error_constructors() {
        let _ = JudgeError::invalid_input("test");
        let _ = JudgeError::empty("flown");
        let _ = JudgeError::numerical_instability("nan in ratio");
        let _ = JudgeError::missing_element("e3");
        let _ = JudgeError::fit_failed("collinear points");
        let _ = JudgeError::invalid_config("radius");
        assert_eq!(
            JudgeError::ZeroReference { index: 0 }.to_string(),
            "Zero reference value at position 0 in ratio comparison"
        );
    }
}
