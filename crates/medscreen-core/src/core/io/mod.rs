//! Provides input functionality for compound libraries.
//!
//! Each supported source format implements [`traits::CompoundSource`]; the
//! format is picked from the file extension by [`CompoundFormat::from_path`].
//! SMILES notation itself lives in [`smiles`], which the loaders and the
//! substructure patterns share.

pub mod delimited;
pub mod sdf;
pub mod smiles;
pub mod text;
pub mod traits;

use delimited::DelimitedFile;
use sdf::SdfFile;
use std::path::Path;
use text::SmilesListFile;
use tracing::{info, instrument, warn};
use traits::{CompoundSource, LoadError, LoadOptions, LoadReport};

use crate::core::models::record::MoleculeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundFormat {
    Csv,
    Tsv,
    Sdf,
    Text,
}

impl CompoundFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(CompoundFormat::Csv),
            "tsv" => Ok(CompoundFormat::Tsv),
            "sdf" => Ok(CompoundFormat::Sdf),
            "txt" => Ok(CompoundFormat::Text),
            _ => Err(LoadError::UnsupportedFormat {
                extension: format!(".{extension}"),
            }),
        }
    }
}

/// Loads a compound library, choosing the reader from the file extension.
///
/// Unparseable records are dropped and logged; the surviving records keep
/// their source order.
#[instrument(skip_all, name = "load_compounds", fields(path = %path.display()))]
pub fn load_compounds(
    path: &Path,
    options: &LoadOptions,
) -> Result<(MoleculeSet, LoadReport), LoadError> {
    let format = CompoundFormat::from_path(path)?;
    info!(?format, "Loading compound library.");

    let (set, report) = match format {
        CompoundFormat::Csv => DelimitedFile::CSV.read_from_path(path, options)?,
        CompoundFormat::Tsv => DelimitedFile::TSV.read_from_path(path, options)?,
        CompoundFormat::Sdf => SdfFile.read_from_path(path, options)?,
        CompoundFormat::Text => SmilesListFile.read_from_path(path, options)?,
    };

    if report.dropped_count() > 0 {
        warn!("{} invalid molecules removed", report.dropped_count());
        for error in &report.dropped {
            warn!("{error}");
        }
    }
    info!(valid = set.len(), "Loaded {} valid molecules.", set.len());
    Ok((set, report))
}
