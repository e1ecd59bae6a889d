//! Error types for the rltoolbox crate

use thiserror::Error;

/// Main error type for the rltoolbox crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cannot approximate when there are no state variables to approximate")]
    NoStateVariables,

    #[error(
        "expected one cut-point range per state variable ({expected}), got {got} \
         (use an empty range to ignore a variable)"
    )]
    RangeCountMismatch { expected: usize, got: usize },

    #[error("number of CMAC layers must be at least 2, got {n_layers}")]
    TooFewLayers { n_layers: usize },

    #[error(
        "state variable range must be divided into equal intervals, \
         e.g. [-2.0, 0.0, 2.0]; got {range:?}"
    )]
    UnequalRangeIntervals { range: Vec<f64> },

    #[error(
        "number of approximated state variables ({variables}) and state shape \
         length ({shape}) must be equal"
    )]
    StateShapeLengthMismatch { variables: usize, shape: usize },

    #[error(
        "approximated state variable {index} has value {value}, which exceeds \
         its state shape bound {bound}"
    )]
    StateExceedsShape {
        index: usize,
        value: usize,
        bound: usize,
    },

    #[error("cannot create a membership function from {got} points, must be 3 or 4")]
    MembershipFunctionArity { got: usize },

    #[error("membership function points must be non-decreasing, got {points:?}")]
    UnorderedMembershipPoints { points: Vec<f64> },

    #[error("expected one fuzzy set per state variable ({expected}), got {got}")]
    FuzzySetCountMismatch { expected: usize, got: usize },

    #[error("agent cannot be placed in position ({row}, {column})")]
    InvalidGridPosition { row: usize, column: usize },

    #[error("invalid hyperparameter '{name}': {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
