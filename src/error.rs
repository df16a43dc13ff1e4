//! Errors produced by the numeric parts of the planner.

use thiserror::Error;

/// Failure to fit a curve to a set of samples.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("a cubic fit needs at least 4 samples, got {count}")]
    TooFewPoints { count: usize },

    #[error("a cubic fit needs at least 4 distinct x-values, got {distinct}")]
    Degenerate { distinct: usize },

    #[error("the normal equations of the fit are singular")]
    Singular,
}

/// A route which cannot be followed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("a path needs at least 2 waypoints, got {len}")]
    TooShort { len: usize },
}
