use std::path::PathBuf;

/// Errors raised while resolving configuration and generating populations.
///
/// All of these are fatal at start-up: the scene is never built from a
/// configuration that failed to parse or validate.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A tree or scatter dimension is NaN, infinite, zero or negative.
    #[error("{field} must be finite and positive, got {value}")]
    InvalidDimension { field: &'static str, value: f32 },

    /// A population count exceeds what the renderer can hold.
    #[error("{population} count {count} exceeds the limit of {limit}")]
    PopulationTooLarge {
        population: &'static str,
        count: usize,
        limit: usize,
    },

    /// Interpolation rates are fractions per tick.
    #[error("interpolation rate for {population} must lie in [0, 1], got {rate}")]
    RateOutOfRange { population: &'static str, rate: f32 },

    /// The per-entity arrays handed to a population disagree in length.
    #[error("{population} arrays disagree in length: expected {expected}, got {actual}")]
    LengthMismatch {
        population: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The configuration file exists but could not be read as a tree config.
    #[error("Config parse error for {path}: {message}")]
    MalformedConfig { path: PathBuf, message: String },
}
