use super::molecule::Molecule;

/// One loaded compound: its parsed structure plus the metadata fields carried
/// from the source, aligned with [`MoleculeSet::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundRecord {
    index: usize,
    fields: Vec<String>,
    molecule: Molecule,
}

impl CompoundRecord {
    /// Position in the owning set. This is the join key across all stages.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[inline]
    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }
}

/// An ordered, immutable set of valid compounds sharing one metadata schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeSet {
    columns: Vec<String>,
    records: Vec<CompoundRecord>,
}

impl MoleculeSet {
    /// Builds a set from `(fields, molecule)` pairs in source order.
    ///
    /// Records are indexed `0..n` in the order given. Rows shorter than the
    /// column list are padded with empty fields; longer rows are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<(Vec<String>, Molecule)>) -> Self {
        let width = columns.len();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, (mut fields, molecule))| {
                fields.resize(width, String::new());
                CompoundRecord {
                    index,
                    fields,
                    molecule,
                }
            })
            .collect();
        Self { columns, records }
    }

    /// Base metadata column names, in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CompoundRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&CompoundRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CompoundRecord> {
        self.records.iter()
    }

    /// Values of one metadata column, top to bottom.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .map(move |r| r.fields.get(column).map_or("", String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    fn mol(s: &str) -> Molecule {
        smiles::parse(s).unwrap()
    }

    #[test]
    fn records_are_indexed_in_source_order() {
        let set = MoleculeSet::new(
            vec!["smiles".into(), "id".into()],
            vec![
                (vec!["CCO".into(), "a".into()], mol("CCO")),
                (vec!["CCN".into(), "b".into()], mol("CCN")),
            ],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().index(), 1);
        assert_eq!(set.column_values(1).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn short_rows_are_padded_to_the_schema() {
        let set = MoleculeSet::new(
            vec!["smiles".into(), "id".into()],
            vec![(vec!["C".into()], mol("C"))],
        );
        assert_eq!(set.records()[0].fields(), ["C".to_string(), String::new()]);
    }

    #[test]
    fn default_set_is_empty() {
        let set = MoleculeSet::default();
        assert!(set.is_empty());
        assert_eq!(set.iter().len(), 0);
    }
}
