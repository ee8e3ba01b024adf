//! # medscreen Core Library
//!
//! A library for screening compound libraries against medicinal-chemistry filters:
//! drug-likeness rules, structural alert catalogs, molecular complexity, property
//! constraints and functional-group detection.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout, each depending only on the ones below it.
//!
//! - **[`core`]: The Foundation.** Stateless molecule models, the SMILES reader and writer,
//!   compound file loaders, and the chemistry itself (descriptors, rules, alerts, complexity,
//!   groups). Nothing here knows about stages or tables.
//!
//! - **[`engine`]: The Logic Core.** Turns a validated [`engine::config::ScreeningConfig`]
//!   into an execution plan, runs each stage over a molecule set on a bounded worker pool,
//!   and merges the per-stage column blocks into one row-aligned result table with a derived
//!   overall verdict and a summary report.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into complete
//!   screening runs, including writing the result table and its summary to disk.

pub mod core;
pub mod engine;
pub mod workflows;
