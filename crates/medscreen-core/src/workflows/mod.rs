//! # Workflows Module
//!
//! High-level entry points that run a complete screening job.
//!
//! ## Overview
//!
//! A workflow takes an already-loaded [`MoleculeSet`](crate::core::models::record::MoleculeSet)
//! and a validated configuration, executes every requested stage in order, and hands back the
//! merged result table together with its summary. A stage that fails is logged and reported
//! without stopping the others; only configuration and merge problems abort the run.
//!
//! - **Screening Workflow** ([`screen`]) - stage execution, merging, verdict aggregation,
//!   optional output filtering, and writing results to delimited files.

pub mod screen;
