use super::schema::{Field, Value};
use crate::core::models::record::MoleculeSet;
use std::io::Write;

/// Owner label for columns carried over from the input file.
pub const INPUT_SOURCE: &str = "input";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub field: Field,
    pub values: Vec<Value>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.field.name
    }
}

/// The output of one stage: one column per declared field, one row per molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBlock {
    stage: String,
    columns: Vec<Column>,
    rows: usize,
}

impl ResultBlock {
    /// Transposes row-major stage output into columns following `schema`.
    ///
    /// Rows are expected to have one value per field; missing trailing values
    /// are filled with [`Value::Null`].
    pub fn from_rows(stage: impl Into<String>, schema: &[Field], rows: Vec<Vec<Value>>) -> Self {
        let len = rows.len();
        let mut columns: Vec<Column> = schema
            .iter()
            .map(|field| Column {
                field: field.clone(),
                values: Vec::with_capacity(len),
            })
            .collect();
        for row in rows {
            let mut values = row.into_iter();
            for column in &mut columns {
                column.values.push(values.next().unwrap_or(Value::Null));
            }
        }
        Self {
            stage: stage.into(),
            columns,
            rows: len,
        }
    }

    /// Builds a block directly from columns. The row count is taken from the
    /// first column; mismatched columns are caught when the block is merged.
    pub fn from_columns(stage: impl Into<String>, columns: Vec<Column>) -> Self {
        let rows = columns.first().map_or(0, |c| c.values.len());
        Self {
            stage: stage.into(),
            columns,
            rows,
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

/// Base metadata plus every merged stage block, row-aligned by molecule index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<Column>,
    sources: Vec<String>,
    rows: usize,
}

impl ResultTable {
    /// Starts a table from the molecule set's metadata columns.
    ///
    /// A column whose every cell is a boolean literal (`True`/`False` in any of
    /// the usual spellings) is carried as booleans, so a previous run's pass
    /// columns keep their meaning; everything else stays text.
    pub fn from_base(set: &MoleculeSet) -> Self {
        let columns = set
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| metadata_column(name, set.column_values(idx).collect()))
            .collect::<Vec<_>>();
        Self {
            sources: vec![INPUT_SOURCE.to_string(); columns.len()],
            columns,
            rows: set.len(),
        }
    }

    /// An empty table with a fixed row count, for callers without metadata.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Stage (or [`INPUT_SOURCE`]) that contributed the column at `idx`.
    pub fn source_of(&self, idx: usize) -> Option<&str> {
        self.sources.get(idx).map(String::as_str)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub(crate) fn push_column(&mut self, column: Column, source: impl Into<String>) {
        debug_assert_eq!(column.values.len(), self.rows);
        self.columns.push(column);
        self.sources.push(source.into());
    }

    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.position(name)?;
        self.sources.remove(idx);
        Some(self.columns.remove(idx))
    }

    /// Keeps the rows whose mask entry is `true`, preserving their order.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut mask = keep.iter();
            column.values.retain(|_| mask.next().copied().unwrap_or(false));
        }
        self.rows = keep.iter().take(self.rows).filter(|&&k| k).count();
    }

    /// Writes the table with a header row. Booleans are written `True`/`False`
    /// and nulls as empty cells.
    pub fn write_delimited<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), csv::Error> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        out.write_record(self.column_names())?;
        for row in 0..self.rows {
            out.write_record(self.columns.iter().map(|c| c.values[row].to_string()))?;
        }
        out.flush()?;
        Ok(())
    }
}

fn parse_flag(cell: &str) -> Option<bool> {
    match cell {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn metadata_column(name: &str, cells: Vec<&str>) -> Column {
    let flags: Option<Vec<bool>> = if cells.is_empty() {
        None
    } else {
        cells.iter().map(|c| parse_flag(c)).collect()
    };
    match flags {
        Some(flags) => Column {
            field: Field::bool(name),
            values: flags.into_iter().map(Value::Bool).collect(),
        },
        None => Column {
            field: Field::text(name),
            values: cells.into_iter().map(|c| Value::Text(c.to_string())).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;
    use crate::engine::schema::FieldKind;

    fn bools(name: &str, values: &[bool]) -> Column {
        Column {
            field: Field::bool(name),
            values: values.iter().map(|&b| Value::Bool(b)).collect(),
        }
    }

    #[test]
    fn block_from_rows_transposes_into_schema_order() {
        let schema = [Field::float("score"), Field::bool("passes_x")];
        let block = ResultBlock::from_rows(
            "x",
            &schema,
            vec![
                vec![Value::Float(1.0), Value::Bool(true)],
                vec![Value::Float(2.0)],
            ],
        );
        assert_eq!(block.len(), 2);
        assert_eq!(block.columns()[0].values, vec![Value::Float(1.0), Value::Float(2.0)]);
        assert_eq!(block.columns()[1].values, vec![Value::Bool(true), Value::Null]);
    }

    #[test]
    fn base_table_carries_metadata_as_text() {
        let set = MoleculeSet::new(
            vec!["smiles".into(), "id".into()],
            vec![(vec!["CCO".into(), "7".into()], smiles::parse("CCO").unwrap())],
        );
        let table = ResultTable::from_base(&set);
        assert_eq!(table.len(), 1);
        assert_eq!(table.column("id").unwrap().values, vec![Value::Text("7".into())]);
        assert_eq!(table.source_of(0), Some(INPUT_SOURCE));
    }

    #[test]
    fn boolean_metadata_columns_are_typed() {
        let set = MoleculeSet::new(
            vec!["smiles".into(), "passes_qc".into(), "flag".into()],
            vec![
                (
                    vec!["CCO".into(), "True".into(), "true".into()],
                    smiles::parse("CCO").unwrap(),
                ),
                (
                    vec!["CC".into(), "False".into(), "maybe".into()],
                    smiles::parse("CC").unwrap(),
                ),
            ],
        );
        let table = ResultTable::from_base(&set);
        let qc = table.column("passes_qc").unwrap();
        assert_eq!(qc.field.kind, FieldKind::Bool);
        assert_eq!(qc.values, vec![Value::Bool(true), Value::Bool(false)]);
        assert_eq!(
            table.column("flag").unwrap().values,
            vec![Value::Text("true".into()), Value::Text("maybe".into())]
        );
    }

    #[test]
    fn retain_rows_keeps_order() {
        let mut table = ResultTable::with_rows(4);
        table.push_column(bools("passes_a", &[true, false, true, true]), "a");
        table.retain_rows(&[false, true, true, false]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column("passes_a").unwrap().values,
            vec![Value::Bool(false), Value::Bool(true)]
        );
    }

    #[test]
    fn writes_python_style_booleans_and_empty_nulls() {
        let mut table = ResultTable::with_rows(2);
        table.push_column(bools("passes_a", &[true, false]), "a");
        table.push_column(
            Column {
                field: Field::float("score"),
                values: vec![Value::Float(1.5), Value::Null],
            },
            "a",
        );
        let mut out = Vec::new();
        table.write_delimited(&mut out, b'\t').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "passes_a\tscore\nTrue\t1.5\nFalse\t\n"
        );
    }
}
