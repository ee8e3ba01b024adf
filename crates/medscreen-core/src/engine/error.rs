use thiserror::Error;

use crate::core::chem::ChemError;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    #[error("Unknown chemical group '{0}'")]
    UnknownGroup(String),

    #[error("Stage '{0}' needs at least one entry")]
    EmptySelection(&'static str),

    #[error("Invalid range for {name}: minimum {min} is greater than maximum {max}")]
    InvalidRange { name: &'static str, min: f64, max: f64 },

    #[error("Value for {0} must be a finite number")]
    NonFinite(&'static str),

    #[error("Constraint stage requested without any constraint")]
    EmptyConstraints,

    #[error("Invalid job count {0}: use -1 for all cores or a positive number")]
    InvalidJobCount(i64),

    #[error("Alert catalog could not be loaded: {0}")]
    Catalog(#[from] ChemError),
}

/// A single stage failed. Its columns are left out of the result table; the
/// run continues with the remaining stages.
#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("Stage '{stage}' failed on molecule {index}: {source}")]
    Molecule {
        stage: &'static str,
        index: usize,
        #[source]
        source: ChemError,
    },

    #[error("Stage '{stage}' could not start its worker pool: {reason}")]
    WorkerPool { stage: &'static str, reason: String },

    #[error("Stage '{stage}' was given an empty molecule set")]
    EmptyInput { stage: &'static str },
}

impl StageError {
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Molecule { stage, .. }
            | StageError::WorkerPool { stage, .. }
            | StageError::EmptyInput { stage } => stage,
        }
    }
}

/// Result blocks could not be combined. Always an internal contract violation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MergeError {
    #[error("Stage '{stage}' produced {found} rows, expected {expected}")]
    LengthMismatch {
        stage: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' is declared by both '{first}' and '{second}' with different contents")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },
}

/// Errors that abort a whole screening run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to merge stage results: {0}")]
    Merge(#[from] MergeError),

    #[error("No valid molecules to screen")]
    EmptyMoleculeSet,
}
