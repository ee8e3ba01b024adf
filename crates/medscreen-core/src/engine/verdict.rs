use super::error::MergeError;
use super::schema::{Field, Value};
use super::table::{Column, ResultTable};

/// Prefix marking a column as a pass/fail signal.
pub const PASS_MARKER: &str = "passes_";

/// Name of the derived overall verdict column.
pub const VERDICT_COLUMN: &str = "passes_all_filters";

const VERDICT_SOURCE: &str = "verdict";

pub fn is_pass_marker(name: &str) -> bool {
    name.starts_with(PASS_MARKER) && name != VERDICT_COLUMN
}

/// Row-wise AND over every pass marker column, or `None` when there is none.
///
/// Anything other than `true` in a marker column, including nulls and
/// non-boolean values, makes that row fail.
pub fn verdicts(table: &ResultTable) -> Option<Vec<bool>> {
    let markers: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| is_pass_marker(c.name()))
        .collect();
    if markers.is_empty() {
        return None;
    }
    Some(
        (0..table.len())
            .map(|row| {
                markers
                    .iter()
                    .all(|c| c.values.get(row).and_then(Value::as_bool) == Some(true))
            })
            .collect(),
    )
}

fn verdict_position(table: &ResultTable) -> Option<usize> {
    let idx = table.position(VERDICT_COLUMN)?;
    (table.source_of(idx) == Some(VERDICT_SOURCE)).then_some(idx)
}

/// Recomputes the verdict column from the current marker columns.
///
/// A verdict column computed earlier is dropped first; a new one is appended
/// only when at least one marker column exists. A column of the same name
/// from any other source is left alone, unless a new verdict would replace
/// it, which is a [`MergeError::ColumnCollision`].
pub fn aggregate(mut table: ResultTable) -> Result<ResultTable, MergeError> {
    if verdict_position(&table).is_some() {
        table.remove_column(VERDICT_COLUMN);
    }
    let Some(verdicts) = verdicts(&table) else {
        return Ok(table);
    };
    if let Some(idx) = table.position(VERDICT_COLUMN) {
        return Err(MergeError::ColumnCollision {
            column: VERDICT_COLUMN.to_string(),
            first: table.source_of(idx).unwrap_or_default().to_string(),
            second: VERDICT_SOURCE.to_string(),
        });
    }
    table.push_column(
        Column {
            field: Field::bool(VERDICT_COLUMN),
            values: verdicts.into_iter().map(Value::Bool).collect(),
        },
        VERDICT_SOURCE,
    );
    Ok(table)
}

/// Keeps only rows whose computed verdict is `true`. Without a verdict column
/// the table is returned unchanged.
pub fn restrict(mut table: ResultTable) -> ResultTable {
    let Some(idx) = verdict_position(&table) else {
        return table;
    };
    let verdict = &table.columns()[idx];
    let keep: Vec<bool> = verdict
        .values
        .iter()
        .map(|v| v.as_bool() == Some(true))
        .collect();
    table.retain_rows(&keep);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[(&str, &[Value])]) -> ResultTable {
        let rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut table = ResultTable::with_rows(rows);
        for (name, values) in columns {
            table.push_column(
                Column {
                    field: Field::bool(*name),
                    values: values.to_vec(),
                },
                "test",
            );
        }
        table
    }

    const T: Value = Value::Bool(true);
    const F: Value = Value::Bool(false);

    fn verdict_of(table: &ResultTable) -> Vec<Value> {
        table.column(VERDICT_COLUMN).unwrap().values.clone()
    }

    #[test]
    fn verdict_is_the_and_of_all_markers() {
        let t = aggregate(table(&[
            ("passes_a", &[T, T, F, T]),
            ("has_x", &[F, F, F, F]),
            ("passes_b", &[T, F, T, T]),
        ]))
        .unwrap();
        assert_eq!(verdict_of(&t), vec![T, F, F, T]);
        assert_eq!(t.column_names().last(), Some(VERDICT_COLUMN));
    }

    #[test]
    fn flipping_one_marker_flips_the_verdict() {
        let before = aggregate(table(&[("passes_a", &[T, T]), ("passes_b", &[T, T])])).unwrap();
        let after = aggregate(table(&[("passes_a", &[T, T]), ("passes_b", &[T, F])])).unwrap();
        assert_eq!(verdict_of(&before), vec![T, T]);
        assert_eq!(verdict_of(&after), vec![T, F]);
    }

    #[test]
    fn null_and_non_boolean_markers_fail_closed() {
        let t = aggregate(table(&[(
            "passes_a",
            &[T, Value::Null, Value::Text("True".into())],
        )]))
        .unwrap();
        assert_eq!(verdict_of(&t), vec![T, F, F]);
    }

    #[test]
    fn no_markers_means_no_verdict() {
        let t = aggregate(table(&[("has_alcohol", &[T, F])])).unwrap();
        assert!(t.column(VERDICT_COLUMN).is_none());
        assert!(verdicts(&t).is_none());
    }

    #[test]
    fn recomputation_ignores_the_previous_verdict() {
        let once = aggregate(table(&[("passes_a", &[T, F])])).unwrap();
        let twice = aggregate(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.columns().len(), 2);
    }

    #[test]
    fn restrict_keeps_passing_rows_in_order() {
        let t = restrict(aggregate(table(&[
            ("passes_a", &[T, F, T, T]),
            ("rank", &[F, T, T, F]),
        ]))
        .unwrap());
        assert_eq!(t.len(), 3);
        assert_eq!(t.column("rank").unwrap().values, vec![F, T, F]);
    }

    #[test]
    fn restrict_without_verdict_is_a_no_op() {
        let original = table(&[("has_x", &[T, F])]);
        assert_eq!(restrict(original.clone()), original);
    }

    #[test]
    fn verdict_from_another_source_is_kept_when_nothing_replaces_it() {
        let original = table(&[(VERDICT_COLUMN, &[F, T]), ("has_x", &[T, T])]);
        let t = aggregate(original.clone()).unwrap();
        assert_eq!(t, original);
        assert_eq!(restrict(t).len(), 2);
    }

    #[test]
    fn verdict_from_another_source_collides_with_a_new_one() {
        let err = aggregate(table(&[(VERDICT_COLUMN, &[T]), ("passes_a", &[T])])).unwrap_err();
        match err {
            MergeError::ColumnCollision { column, first, second } => {
                assert_eq!(column, VERDICT_COLUMN);
                assert_eq!(first, "test");
                assert_eq!(second, "verdict");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
