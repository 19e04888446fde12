//! Error types for the scenario model
//!
//! Every failure of the scenario engine is reported through [`ScenarioError`]:
//! - Rejected parameter values (previous value stays in effect)
//! - Lookups before any enumeration happened
//! - Scenario numbers or subscripts outside the enumerated space
//! - Linear indices that do not address a realized scenario
//! - Enumeration policies that cannot build a consistent table

use crate::index::Subscript;

/// Main scenario model error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    /// A setter received an out-of-domain value
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the rejected field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Index lookup before any scenario was enumerated
    #[error("no scenarios have been enumerated")]
    NotEnumerated,

    /// 1-based scenario number outside `[1, total]`
    #[error("scenario number {number} out of range [1, {total}]")]
    OutOfRange {
        /// Requested scenario number
        number: usize,
        /// Number of enumerated scenarios
        total: usize,
    },

    /// Subscript outside the index space dimensions
    #[error("subscript {subscript} outside index space {dims:?}")]
    SubscriptOutOfBounds {
        /// Requested subscript
        subscript: Subscript,
        /// Index space dimensions (ct, shift, range)
        dims: [usize; 3],
    },

    /// Linear index does not correspond to a realized scenario
    #[error("linear index {linear_index} is not a realized scenario")]
    NotFound {
        /// Requested linear index
        linear_index: usize,
    },

    /// Policy could not produce a consistent scenario table
    #[error("enumeration failed: {0}")]
    Enumeration(String),

    /// No policy registered under this name
    #[error("unknown scenario policy: {0}")]
    UnknownPolicy(String),

    /// Configuration could not be read or converted
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScenarioError {
    /// Create invalid parameter error
    #[inline]
    #[must_use]
    pub fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Create enumeration error
    #[inline]
    #[must_use]
    pub fn enumeration(message: impl Into<String>) -> Self {
        Self::Enumeration(message.into())
    }

    /// Check if error came from parameter validation
    #[inline]
    #[must_use]
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Check if error is a lookup failure (out of range, not found, not enumerated)
    #[inline]
    #[must_use]
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::NotEnumerated
                | Self::OutOfRange { .. }
                | Self::SubscriptOutOfBounds { .. }
                | Self::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_display_names_field() {
        let err = ScenarioError::invalid_parameter("rangeRelSD", "must be a non-negative scalar");
        assert_eq!(
            err.to_string(),
            "invalid parameter `rangeRelSD`: must be a non-negative scalar"
        );
        assert!(err.is_parameter_error());
        assert!(!err.is_lookup_error());
    }

    #[test]
    fn lookup_errors_classified() {
        assert!(ScenarioError::NotEnumerated.is_lookup_error());
        assert!(ScenarioError::OutOfRange { number: 5, total: 2 }.is_lookup_error());
        assert!(ScenarioError::NotFound { linear_index: 3 }.is_lookup_error());
        assert!(!ScenarioError::enumeration("x").is_lookup_error());
    }

    #[test]
    fn out_of_range_display() {
        let err = ScenarioError::OutOfRange { number: 0, total: 9 };
        assert!(err.to_string().contains("[1, 9]"));
    }
}
