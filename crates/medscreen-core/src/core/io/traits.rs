use super::smiles::SmilesError;
use crate::core::models::molecule::MoleculeError;
use crate::core::models::record::MoleculeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Fatal loading failure. No molecule set is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported file format '{extension}' (supported: .csv, .tsv, .sdf, .txt)")]
    UnsupportedFormat { extension: String },

    #[error("Column '{column}' not found. Available columns: {}", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Malformed delimited input: {0}")]
    Csv(#[from] csv::Error),
}

/// A single record that could not be turned into a molecule.
///
/// Record errors never abort a load; they are collected into a [`LoadReport`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record {record}: invalid SMILES '{smiles}': {source}")]
    Smiles {
        record: usize,
        smiles: String,
        #[source]
        source: SmilesError,
    },

    #[error("record {record}: malformed molfile: {reason}")]
    Molfile { record: usize, reason: String },

    #[error("record {record}: {source}")]
    Structure {
        record: usize,
        #[source]
        source: MoleculeError,
    },
}

/// Accounting for one load: how many records were seen and which were dropped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_records: usize,
    pub dropped: Vec<RecordError>,
}

impl LoadReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn kept_count(&self) -> usize {
        self.total_records - self.dropped.len()
    }
}

/// Options shared by every compound reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Column holding SMILES in delimited input.
    pub smiles_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            smiles_column: "smiles".to_string(),
        }
    }
}

/// Defines the interface for reading compound libraries.
///
/// Implementors parse one source format into a [`MoleculeSet`], dropping
/// unparseable records and accounting for them in the returned [`LoadReport`].
pub trait CompoundSource {
    /// Reads a compound library from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the source as a whole is unusable. Individual bad
    /// records are reported, not raised.
    fn read_from(
        &self,
        reader: &mut impl BufRead,
        options: &LoadOptions,
    ) -> Result<(MoleculeSet, LoadReport), LoadError>;

    /// Reads a compound library from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the source is unusable.
    fn read_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        options: &LoadOptions,
    ) -> Result<(MoleculeSet, LoadReport), LoadError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader, options)
    }
}
