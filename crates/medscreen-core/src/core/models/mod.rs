//! # Core Models Module
//!
//! Data structures for the compounds flowing through a screening run.
//!
//! ## Key Components
//!
//! - [`element`] - Periodic-table data needed for valence and mass calculations
//! - [`molecule`] - Heavy-atom molecular graph with hydrogen perception and ring queries
//! - [`record`] - Loaded compounds with their source metadata, gathered into an ordered [`record::MoleculeSet`]
//!
//! A [`record::MoleculeSet`] is immutable once built; its record order is the row
//! order of every result produced from it.

pub mod element;
pub mod molecule;
pub mod record;
