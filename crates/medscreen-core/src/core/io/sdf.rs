use super::smiles;
use super::traits::{CompoundSource, LoadError, LoadOptions, LoadReport, RecordError};
use crate::core::models::element::Element;
use crate::core::models::molecule::{Atom, Bond, BondOrder, Molecule, MoleculeError};
use crate::core::models::record::MoleculeSet;
use std::collections::HashMap;
use std::io::BufRead;

const RECORD_DELIMITER: &str = "$$$$";
const SMILES_FIELD: &str = "smiles";

/// MDL structure-data files holding V2000 connection tables.
///
/// Data items (`> <NAME>`) become metadata columns, in first-seen order across
/// the file, followed by a `smiles` column written from each parsed structure.
/// A `smiles` data item in the file is replaced by the written one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SdfFile;

#[derive(Debug, Default)]
struct SdfRecord {
    molfile: Vec<String>,
    properties: Vec<(String, String)>,
}

impl CompoundSource for SdfFile {
    fn read_from(
        &self,
        reader: &mut impl BufRead,
        _options: &LoadOptions,
    ) -> Result<(MoleculeSet, LoadReport), LoadError> {
        let mut columns: Vec<String> = Vec::new();
        let mut parsed: Vec<(Vec<(String, String)>, Molecule)> = Vec::new();
        let mut report = LoadReport::default();

        for raw in split_records(reader)? {
            report.total_records += 1;
            match parse_molfile(&raw.molfile) {
                Ok(molecule) => {
                    let mut properties = raw.properties;
                    properties.retain(|(name, _)| name != SMILES_FIELD);
                    for (name, _) in &properties {
                        if !columns.contains(name) {
                            columns.push(name.clone());
                        }
                    }
                    properties.push((SMILES_FIELD.to_string(), smiles::write(&molecule)));
                    parsed.push((properties, molecule));
                }
                Err(reason) => report
                    .dropped
                    .push(reason.into_record_error(report.total_records)),
            }
        }
        columns.push(SMILES_FIELD.to_string());

        let position: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let rows = parsed
            .into_iter()
            .map(|(properties, molecule)| {
                let mut fields = vec![String::new(); position.len()];
                for (name, value) in properties {
                    if let Some(&i) = position.get(name.as_str()) {
                        fields[i] = value;
                    }
                }
                (fields, molecule)
            })
            .collect();

        Ok((MoleculeSet::new(columns, rows), report))
    }
}

fn split_records(reader: &mut impl BufRead) -> Result<Vec<SdfRecord>, LoadError> {
    let mut records = Vec::new();
    let mut current = SdfRecord::default();
    let mut in_data = false;
    let mut pending_property: Option<(String, Vec<String>)> = None;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_end();

        if trimmed == RECORD_DELIMITER {
            if let Some((name, value)) = pending_property.take() {
                current.properties.push((name, value.join("\n")));
            }
            records.push(std::mem::take(&mut current));
            in_data = false;
            continue;
        }

        if !in_data {
            current.molfile.push(trimmed.to_string());
            if trimmed.starts_with("M  END") {
                in_data = true;
            }
            continue;
        }

        if let Some(name) = property_name(trimmed) {
            if let Some((name, value)) = pending_property.take() {
                current.properties.push((name, value.join("\n")));
            }
            pending_property = Some((name, Vec::new()));
        } else if trimmed.is_empty() {
            if let Some((name, value)) = pending_property.take() {
                current.properties.push((name, value.join("\n")));
            }
        } else if let Some((_, value)) = pending_property.as_mut() {
            value.push(trimmed.to_string());
        }
    }

    // A trailing record without a closing delimiter still counts.
    if current.molfile.iter().any(|l| !l.is_empty()) {
        if let Some((name, value)) = pending_property.take() {
            current.properties.push((name, value.join("\n")));
        }
        records.push(current);
    }
    Ok(records)
}

/// Extracts `NAME` from a data header such as `>  <NAME>  (12)`.
fn property_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix('>')?;
    let start = rest.find('<')? + 1;
    let end = start + rest[start..].find('>')?;
    Some(rest[start..end].to_string())
}

enum MolfileError {
    Malformed(String),
    Structure(MoleculeError),
}

impl MolfileError {
    fn into_record_error(self, record: usize) -> RecordError {
        match self {
            MolfileError::Malformed(reason) => RecordError::Molfile { record, reason },
            MolfileError::Structure(source) => RecordError::Structure { record, source },
        }
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_count(line: &str, start: usize, end: usize, what: &str) -> Result<usize, MolfileError> {
    let field = slice_and_trim(line, start, end);
    field
        .parse()
        .map_err(|_| MolfileError::Malformed(format!("invalid {what} '{field}'")))
}

/// Parses the header, counts line, atom block, bond block and `M  CHG` lines.
fn parse_molfile(lines: &[String]) -> Result<Molecule, MolfileError> {
    let counts = lines
        .get(3)
        .ok_or_else(|| MolfileError::Malformed("missing counts line".to_string()))?;
    if counts.contains("V3000") {
        return Err(MolfileError::Malformed(
            "V3000 connection tables are not supported".to_string(),
        ));
    }
    let atom_count = parse_count(counts, 0, 3, "atom count")?;
    let bond_count = parse_count(counts, 3, 6, "bond count")?;

    let atom_lines = lines
        .get(4..4 + atom_count)
        .ok_or_else(|| MolfileError::Malformed("truncated atom block".to_string()))?;
    let bond_lines = lines
        .get(4 + atom_count..4 + atom_count + bond_count)
        .ok_or_else(|| MolfileError::Malformed("truncated bond block".to_string()))?;

    let mut elements = Vec::with_capacity(atom_count);
    let mut charges = vec![0i8; atom_count];
    for (idx, line) in atom_lines.iter().enumerate() {
        let symbol = slice_and_trim(line, 31, 34);
        let element = Element::from_symbol(symbol)
            .ok_or_else(|| MolfileError::Malformed(format!("unknown element '{symbol}'")))?;
        charges[idx] = match slice_and_trim(line, 36, 39) {
            "1" => 3,
            "2" => 2,
            "3" => 1,
            "5" => -1,
            "6" => -2,
            "7" => -3,
            _ => 0,
        };
        elements.push(element);
    }

    let mut edges = Vec::with_capacity(bond_count);
    let mut aromatic = vec![false; atom_count];
    for line in bond_lines {
        let begin = parse_count(line, 0, 3, "bond atom")?;
        let end = parse_count(line, 3, 6, "bond atom")?;
        if begin == 0 || end == 0 || begin > atom_count || end > atom_count {
            return Err(MolfileError::Malformed(format!(
                "bond references atom outside 1..={atom_count}"
            )));
        }
        let order = match slice_and_trim(line, 6, 9) {
            "1" => BondOrder::Single,
            "2" => BondOrder::Double,
            "3" => BondOrder::Triple,
            "4" => BondOrder::Aromatic,
            other => {
                return Err(MolfileError::Malformed(format!(
                    "unsupported bond type '{other}'"
                )));
            }
        };
        if order == BondOrder::Aromatic {
            aromatic[begin - 1] = true;
            aromatic[end - 1] = true;
        }
        edges.push((begin - 1, end - 1, order));
    }

    // `M  CHG` supersedes the atom-block charge field.
    let properties = &lines[(4 + atom_count + bond_count).min(lines.len())..];
    let mut charge_block_seen = false;
    for line in properties.iter().filter(|l| l.starts_with("M  CHG")) {
        if !charge_block_seen {
            charges.iter_mut().for_each(|c| *c = 0);
            charge_block_seen = true;
        }
        let tokens: Vec<&str> = line.split_whitespace().skip(3).collect();
        for pair in tokens.chunks(2) {
            if let [atom, value] = pair {
                let atom: usize = atom
                    .parse()
                    .map_err(|_| MolfileError::Malformed(format!("invalid charge atom '{atom}'")))?;
                let value: i8 = value
                    .parse()
                    .map_err(|_| MolfileError::Malformed(format!("invalid charge '{value}'")))?;
                if let Some(slot) = atom.checked_sub(1).and_then(|i| charges.get_mut(i)) {
                    *slot = value;
                }
            }
        }
    }

    build_heavy_atom_graph(&elements, &charges, &aromatic, &edges).map_err(MolfileError::Structure)
}

/// Folds explicit hydrogen atoms into their heavy neighbours and builds the graph.
fn build_heavy_atom_graph(
    elements: &[Element],
    charges: &[i8],
    aromatic: &[bool],
    edges: &[(usize, usize, BondOrder)],
) -> Result<Molecule, MoleculeError> {
    let is_folded_h = |idx: usize| {
        elements[idx].is_hydrogen()
            && charges[idx] == 0
            && edges
                .iter()
                .filter(|&&(a, b, _)| a == idx || b == idx)
                .count()
                == 1
    };
    let has_explicit_h = (0..elements.len()).any(is_folded_h);

    let mut remap = vec![usize::MAX; elements.len()];
    let mut heavy = Vec::new();
    for idx in 0..elements.len() {
        if !is_folded_h(idx) {
            remap[idx] = heavy.len();
            heavy.push(idx);
        }
    }

    let mut h_count = vec![0u8; elements.len()];
    let mut bonds = Vec::new();
    for &(a, b, order) in edges {
        match (remap[a], remap[b]) {
            (usize::MAX, usize::MAX) => {}
            (usize::MAX, _) => h_count[b] += 1,
            (_, usize::MAX) => h_count[a] += 1,
            (ra, rb) => bonds.push(Bond::new(ra, rb, order)),
        }
    }

    let atoms = heavy
        .iter()
        .map(|&idx| {
            let atom = Atom::new(elements[idx])
                .aromatic(aromatic[idx])
                .with_charge(charges[idx]);
            if has_explicit_h {
                atom.with_hydrogens(h_count[idx])
            } else if charges[idx] != 0 {
                let used: u8 = edges
                    .iter()
                    .filter(|&&(a, b, _)| a == idx || b == idx)
                    .map(|&(_, _, order)| order.valence_units())
                    .sum();
                atom.with_hydrogens(charged_hydrogens(elements[idx], charges[idx], used))
            } else {
                atom
            }
        })
        .collect();

    Molecule::new(atoms, bonds)
}

/// Implicit hydrogens on a charged atom: pnictogens and chalcogens gain a bond
/// per positive charge, everything else loses one per unit of charge.
fn charged_hydrogens(element: Element, charge: i8, used: u8) -> u8 {
    let Some(&base) = element.valences.first() else {
        return 0;
    };
    let base = base as i16;
    let charge = charge as i16;
    let target = if matches!(element.atomic_number, 7 | 8 | 15 | 16) {
        base + charge
    } else {
        base - charge.abs()
    };
    (target - used as i16).clamp(0, u8::MAX as i16) as u8
}
