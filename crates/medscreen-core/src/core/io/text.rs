use super::smiles;
use super::traits::{CompoundSource, LoadError, LoadOptions, LoadReport, RecordError};
use crate::core::models::record::MoleculeSet;
use std::io::BufRead;

/// One SMILES per line. Blank lines are skipped and do not count as records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmilesListFile;

impl CompoundSource for SmilesListFile {
    fn read_from(
        &self,
        reader: &mut impl BufRead,
        _options: &LoadOptions,
    ) -> Result<(MoleculeSet, LoadReport), LoadError> {
        let mut rows = Vec::new();
        let mut report = LoadReport::default();

        for line in reader.lines() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            report.total_records += 1;
            match smiles::parse(text) {
                Ok(molecule) => rows.push((vec![text.to_string()], molecule)),
                Err(source) => report.dropped.push(RecordError::Smiles {
                    record: report.total_records,
                    smiles: text.to_string(),
                    source,
                }),
            }
        }

        Ok((MoleculeSet::new(vec!["smiles".to_string()], rows), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_one_smiles_per_line_skipping_blanks() {
        let content = "CCO\n\n  c1ccccc1  \nnot_a_smiles\n";
        let (set, report) = SmilesListFile
            .read_from(&mut Cursor::new(content), &LoadOptions::default())
            .unwrap();
        assert_eq!(set.columns(), ["smiles"]);
        assert_eq!(set.column_values(0).collect::<Vec<_>>(), vec!["CCO", "c1ccccc1"]);
        assert_eq!(report.total_records, 3);
        assert!(matches!(report.dropped[0], RecordError::Smiles { record: 3, .. }));
    }
}
