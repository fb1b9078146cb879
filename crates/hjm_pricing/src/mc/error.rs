//! Errors of the Monte Carlo configuration.

use thiserror::Error;

/// Rejected path budget or batch layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No path budget was given to the builder.
    #[error("Path count must be specified")]
    MissingPathCount,

    /// Path budget of zero.
    #[error("At least one path is required")]
    NoPaths,

    /// Path budget above the supported maximum.
    #[error("{paths} paths exceed the limit of {max}")]
    TooManyPaths {
        /// Requested path count
        paths: usize,
        /// Maximum supported path count
        max: usize,
    },

    /// Batch size of zero.
    #[error("Batch size must be positive")]
    EmptyBatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ConfigError::NoPaths.to_string(), "At least one path is required");
        assert_eq!(
            ConfigError::TooManyPaths { paths: 20, max: 10 }.to_string(),
            "20 paths exceed the limit of 10"
        );
    }
}
