use super::error::MergeError;
use super::table::{ResultBlock, ResultTable};
use tracing::debug;

/// Appends each block's columns to `base`, in block order.
///
/// Every block must have exactly `base.len()` rows. A column name already
/// present is accepted only when the incoming column is identical to the
/// existing one, in which case it is skipped.
pub fn merge(base: ResultTable, blocks: Vec<ResultBlock>) -> Result<ResultTable, MergeError> {
    let mut table = base;
    for block in blocks {
        let stage = block.stage().to_string();
        check_length(&stage, table.len(), block.len())?;

        for column in block.into_columns() {
            check_length(&stage, table.len(), column.values.len())?;
            match table.position(column.name()) {
                Some(idx) if table.columns()[idx] == column => {
                    debug!(stage = %stage, column = column.name(), "Identical column already merged.");
                }
                Some(idx) => {
                    return Err(MergeError::ColumnCollision {
                        column: column.name().to_string(),
                        first: table.source_of(idx).unwrap_or_default().to_string(),
                        second: stage,
                    });
                }
                None => table.push_column(column, stage.as_str()),
            }
        }
    }
    Ok(table)
}

fn check_length(stage: &str, expected: usize, found: usize) -> Result<(), MergeError> {
    if expected == found {
        Ok(())
    } else {
        Err(MergeError::LengthMismatch {
            stage: stage.to_string(),
            expected,
            found,
        })
    }
}
