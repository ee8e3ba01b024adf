use super::config::Concurrency;
use super::error::StageError;
use super::progress::{Progress, ProgressReporter};
use super::schema::Value;
use super::stages::Stage;
use super::table::ResultBlock;
use crate::core::chem::ChemError;
use crate::core::models::record::{CompoundRecord, MoleculeSet};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type RowResult = Result<Vec<Value>, ChemError>;

/// Runs one stage over every molecule and returns its block in set order.
///
/// Molecules are evaluated independently, on up to `concurrency` workers of a
/// pool owned by this call. The first failing molecule (by index) fails the
/// whole stage.
#[instrument(skip_all, name = "stage_executor", fields(stage = stage.name()))]
pub fn execute(
    stage: &Stage,
    set: &MoleculeSet,
    concurrency: Concurrency,
    reporter: &ProgressReporter,
) -> Result<ResultBlock, StageError> {
    if set.is_empty() {
        return Err(StageError::EmptyInput { stage: stage.name() });
    }

    info!(molecules = set.len(), "Running stage.");
    reporter.report(Progress::TaskStart {
        total_steps: set.len() as u64,
    });

    let evaluate = |record: &CompoundRecord| {
        let row = stage.evaluate(record.molecule());
        reporter.report(Progress::TaskIncrement);
        row
    };

    let results: Vec<RowResult> = if concurrency.is_sequential() {
        set.iter().map(evaluate).collect()
    } else {
        evaluate_in_pool(stage, set, concurrency, &evaluate)?
    };

    reporter.report(Progress::TaskFinish);

    let rows = results
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|source| StageError::Molecule {
                stage: stage.name(),
                index,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(rows = rows.len(), "Stage finished.");
    Ok(ResultBlock::from_rows(stage.name(), stage.schema(), rows))
}

#[cfg(feature = "parallel")]
fn evaluate_in_pool<F>(
    stage: &Stage,
    set: &MoleculeSet,
    concurrency: Concurrency,
    evaluate: &F,
) -> Result<Vec<RowResult>, StageError>
where
    F: Fn(&CompoundRecord) -> RowResult + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.threads())
        .thread_name(|i| format!("medscreen-worker-{i}"))
        .build()
        .map_err(|e| StageError::WorkerPool {
            stage: stage.name(),
            reason: e.to_string(),
        })?;
    debug!(workers = pool.current_num_threads(), "Worker pool ready.");

    // Indexed collection writes each row into its own slot, so order is kept.
    Ok(pool.install(|| set.records().par_iter().map(evaluate).collect()))
}

#[cfg(not(feature = "parallel"))]
fn evaluate_in_pool<F>(
    _stage: &Stage,
    set: &MoleculeSet,
    _concurrency: Concurrency,
    evaluate: &F,
) -> Result<Vec<RowResult>, StageError>
where
    F: Fn(&CompoundRecord) -> RowResult + Sync,
{
    Ok(set.iter().map(evaluate).collect())
}
