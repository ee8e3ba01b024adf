use crate::core::models::record::MoleculeSet;
use crate::engine::config::ScreeningConfig;
use crate::engine::error::{EngineError, StageError};
use crate::engine::executor;
use crate::engine::merge::merge;
use crate::engine::plan::ExecutionPlan;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::summary::{SummaryReport, summarize};
use crate::engine::table::{ResultBlock, ResultTable};
use crate::engine::verdict;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct ScreeningOutcome {
    /// Final table, restricted to passing rows when output filtering is on.
    pub table: ResultTable,
    pub summary: SummaryReport,
    /// Stages whose columns are missing from the table.
    pub failed_stages: Vec<StageError>,
    /// Molecules screened before any output filtering.
    pub screened: usize,
}

/// Runs every configured stage over `set` and assembles the result table.
///
/// Stage failures are collected, not raised. Configuration and merge problems
/// abort the run.
#[instrument(skip_all, name = "screening_workflow")]
pub fn run(
    set: &MoleculeSet,
    config: &ScreeningConfig,
    reporter: &ProgressReporter,
) -> Result<ScreeningOutcome, EngineError> {
    if set.is_empty() {
        return Err(EngineError::EmptyMoleculeSet);
    }
    let plan = ExecutionPlan::build(config)?;
    info!(
        molecules = set.len(),
        stages = plan.len(),
        "Starting screening run."
    );

    let mut blocks: Vec<ResultBlock> = Vec::with_capacity(plan.len());
    let mut failed_stages = Vec::new();
    for (index, stage) in plan.stages().iter().enumerate() {
        reporter.report(Progress::PhaseStart {
            name: stage.name(),
            index,
            total: plan.len(),
        });
        match executor::execute(stage, set, config.concurrency, reporter) {
            Ok(block) => blocks.push(block),
            Err(e) => {
                warn!("{e}. Its columns are left out of the results.");
                reporter.report(Progress::Message(format!("Stage '{}' failed", stage.name())));
                failed_stages.push(e);
            }
        }
        reporter.report(Progress::PhaseFinish);
    }

    let table = verdict::aggregate(merge(ResultTable::from_base(set), blocks)?)?;
    let table = if config.filter_output {
        let restricted = verdict::restrict(table);
        info!(kept = restricted.len(), "Output restricted to molecules passing all filters.");
        restricted
    } else {
        table
    };

    let summary = summarize(&table, &failed_stages);
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        failed = failed_stages.len(),
        "Screening run complete."
    );
    Ok(ScreeningOutcome {
        table,
        summary,
        failed_stages,
        screened: set.len(),
    })
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write table '{path}': {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub table: PathBuf,
    pub summary: Option<PathBuf>,
}

/// `<dir>/<stem>_summary.txt` next to the table file.
pub fn summary_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_summary.txt"))
}

/// Writes the table (tab-delimited for `.tsv`, comma-delimited otherwise) and,
/// if requested, the summary beside it. Missing parent directories are created.
pub fn write_outputs(
    outcome: &ScreeningOutcome,
    output: &Path,
    with_summary: bool,
) -> Result<OutputPaths, OutputError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| OutputError::Io { path, source }
    };

    let delimiter = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let file = File::create(output).map_err(io_error(output))?;
    outcome
        .table
        .write_delimited(BufWriter::new(file), delimiter)
        .map_err(|source| OutputError::Table {
            path: output.to_path_buf(),
            source,
        })?;
    info!(path = %output.display(), "Results written.");

    let summary = if with_summary {
        let path = summary_path(output);
        let mut writer = BufWriter::new(File::create(&path).map_err(io_error(&path))?);
        write!(writer, "{}", outcome.summary)
            .and_then(|_| writer.flush())
            .map_err(io_error(&path))?;
        info!(path = %path.display(), "Summary report written.");
        Some(path)
    } else {
        None
    };

    Ok(OutputPaths {
        table: output.to_path_buf(),
        summary,
    })
}
