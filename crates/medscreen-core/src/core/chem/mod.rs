//! Chemistry computations behind the filter stages.
//!
//! Everything here works on a single [`Molecule`](crate::core::models::molecule::Molecule)
//! at a time and knows nothing about stages, result tables or parallelism.
//! The engine treats these functions as opaque: a stage calls one of them per
//! molecule and turns the outcome into row values.

pub mod alerts;
pub mod complexity;
pub mod constraints;
pub mod descriptors;
pub mod groups;
pub mod rules;
pub mod substructure;

use crate::core::io::smiles::SmilesError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChemError {
    #[error("Substructure search exceeded its budget of {budget} steps")]
    SearchBudgetExceeded { budget: usize },

    #[error("Invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: SmilesError,
    },

    #[error("Alert catalog error: {0}")]
    Catalog(String),
}
