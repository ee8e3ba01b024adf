//! # Engine Module
//!
//! The filter pipeline: it turns a validated [`config::ScreeningConfig`] into a
//! fixed [`plan::ExecutionPlan`], runs each stage over the molecule set and
//! folds the per-stage blocks into one result table.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Stage options, concurrency and the validating builder
//! - **Stages** ([`stages`]) - Rule, alert, complexity, constraint and group stages with declared schemas
//! - **Planning** ([`plan`]) - Resolves stages once and rejects conflicting column declarations
//! - **Execution** ([`executor`]) - Runs one stage with bounded parallelism, preserving row order
//! - **Composition** ([`merge`], [`verdict`]) - Column-wise merge, overall verdict and output filter
//! - **Reporting** ([`summary`]) - Category-level pass counts, percentages and means
//! - **Data** ([`schema`], [`table`]) - Typed cells, fields, result blocks and the result table
//! - **Progress Monitoring** ([`progress`]) - Advisory progress callbacks
//! - **Error Handling** ([`error`]) - Configuration, stage and merge errors
//!
//! Stages run one after another. Within a stage molecules are independent, so
//! any failure is attributed to the stage as a whole and only its columns are
//! lost.

pub mod config;
pub mod error;
pub mod executor;
pub mod merge;
pub mod plan;
pub mod progress;
pub mod schema;
pub mod stages;
pub mod summary;
pub mod table;
pub mod verdict;
