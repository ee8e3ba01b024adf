//! # Core Module
//!
//! The foundation layer of medscreen: molecule models, the chemistry
//! computations each filter stage wraps, and file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Elements, molecular graphs and the loaded compound set
//! - **Chemistry** ([`chem`]) - Descriptors, rule sets, structural alerts, complexity scores,
//!   property constraints and functional-group detection
//! - **File I/O** ([`io`]) - SMILES notation, compound loaders and result writers
//!
//! Nothing in this layer knows about stages or result tables; the [`crate::engine`]
//! layer calls into it one molecule at a time.

pub mod chem;
pub mod io;
pub mod models;
