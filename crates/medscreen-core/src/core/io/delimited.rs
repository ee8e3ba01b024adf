use super::smiles;
use super::traits::{CompoundSource, LoadError, LoadOptions, LoadReport, RecordError};
use crate::core::models::record::MoleculeSet;
use std::io::BufRead;

/// Comma- or tab-separated tables with a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedFile {
    delimiter: u8,
}

impl DelimitedFile {
    pub const CSV: DelimitedFile = DelimitedFile { delimiter: b',' };
    pub const TSV: DelimitedFile = DelimitedFile { delimiter: b'\t' };
}

impl CompoundSource for DelimitedFile {
    fn read_from(
        &self,
        reader: &mut impl BufRead,
        options: &LoadOptions,
    ) -> Result<(MoleculeSet, LoadReport), LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
        let smiles_idx = columns
            .iter()
            .position(|c| c == &options.smiles_column)
            .ok_or_else(|| LoadError::MissingColumn {
                column: options.smiles_column.clone(),
                available: columns.clone(),
            })?;

        let mut rows = Vec::new();
        let mut report = LoadReport::default();
        for (record, result) in csv_reader.records().enumerate() {
            let row = result?;
            report.total_records += 1;
            let text = row.get(smiles_idx).unwrap_or("").trim();
            match smiles::parse(text) {
                Ok(molecule) => rows.push((row.iter().map(String::from).collect(), molecule)),
                Err(source) => report.dropped.push(RecordError::Smiles {
                    record: record + 1,
                    smiles: text.to_string(),
                    source,
                }),
            }
        }

        Ok((MoleculeSet::new(columns, rows), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(file: DelimitedFile, content: &str, column: &str) -> Result<(MoleculeSet, LoadReport), LoadError> {
        let options = LoadOptions {
            smiles_column: column.to_string(),
        };
        file.read_from(&mut Cursor::new(content.as_bytes()), &options)
    }

    #[test]
    fn reads_csv_and_keeps_every_column() {
        let (set, report) = read(
            DelimitedFile::CSV,
            "id,smiles,activity\nm1,CCO,1.5\nm2,c1ccccc1,2.0\n",
            "smiles",
        )
        .unwrap();
        assert_eq!(set.columns(), ["id", "smiles", "activity"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[1].fields()[0], "m2");
        assert_eq!(report.total_records, 2);
        assert_eq!(report.dropped_count(), 0);
    }

    #[test]
    fn invalid_smiles_are_dropped_and_counted() {
        let (set, report) = read(
            DelimitedFile::TSV,
            "SMILES\tname\nCCO\tethanol\nC1CC\tbroken\nCCN\tethylamine\n",
            "SMILES",
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[1].fields()[1], "ethylamine");
        assert_eq!(set.records()[1].index(), 1);
        assert_eq!(report.dropped_count(), 1);
        assert!(matches!(
            report.dropped[0],
            RecordError::Smiles { record: 2, ref smiles, .. } if smiles == "C1CC"
        ));
    }

    #[test]
    fn missing_smiles_column_lists_available_columns() {
        let err = read(DelimitedFile::CSV, "id,structure\n1,CCO\n", "smiles").unwrap_err();
        match err {
            LoadError::MissingColumn { column, available } => {
                assert_eq!(column, "smiles");
                assert_eq!(available, vec!["id", "structure"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_cell_counts_as_invalid_record() {
        let (set, report) = read(DelimitedFile::CSV, "smiles,id\n,1\nC,2\n", "smiles").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(report.dropped_count(), 1);
    }

    #[test]
    fn out_of_range_bracket_atom_drops_only_its_record() {
        let (set, report) = read(
            DelimitedFile::CSV,
            "smiles\n[C-2147483648]\nCCO\n[N+256]\n",
            "smiles",
        )
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(report.dropped_count(), 2);
    }
}
