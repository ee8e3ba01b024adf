use super::ChemError;
use super::substructure::{DEFAULT_STEP_BUDGET, SubstructureMatcher};
use crate::core::io::smiles;
use crate::core::models::molecule::Molecule;
use phf::phf_ordered_map;

/// Functional-group definitions. A group is present when any of its patterns matches.
static GROUPS: phf::OrderedMap<&'static str, &'static [&'static str]> = phf_ordered_map! {
    "alcohol" => &["C[OH]"],
    "phenol" => &["c[OH]"],
    "carboxylic_acid" => &["*C(=O)[OH]"],
    "ester" => &["*C(=O)OC", "*C(=O)Oc"],
    "ketone" => &["CC(=O)C", "cC(=O)C", "cC(=O)c"],
    "aldehyde" => &["*[CH]=O", "[CH2]=O"],
    "amide" => &["*C(=O)N"],
    "primary_amine" => &["C[NH2]", "c[NH2]"],
    "secondary_amine" => &["C[NH]C", "c[NH]C", "c[NH]c"],
    "nitrile" => &["C#N"],
    "nitro" => &["[N+](=O)[O-]", "N(=O)=O"],
    "halide" => &["*F", "*Cl", "*Br", "*I"],
    "ether" => &["COC", "cOC", "cOc"],
    "thiol" => &["*[SH]"],
    "sulfonamide" => &["S(=O)(=O)N"],
    "urea" => &["NC(=O)N"],
    "phenyl" => &["c1ccccc1"],
    "pyridine" => &["n1ccccc1"],
    "alkene" => &["C=C"],
    "alkyne" => &["C#C"],
};

pub fn known_groups() -> impl Iterator<Item = &'static str> {
    GROUPS.keys().copied()
}

pub fn is_known_group(name: &str) -> bool {
    GROUPS.contains_key(name)
}

/// A compiled functional group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalGroup {
    pub name: String,
    queries: Vec<Molecule>,
}

impl ChemicalGroup {
    /// Compiles a built-in group by name. Returns `None` for unknown names.
    pub fn builtin(name: &str) -> Option<Result<Self, ChemError>> {
        let patterns = GROUPS.get(name)?;
        let compiled = patterns
            .iter()
            .map(|pattern| {
                smiles::parse_query(pattern).map_err(|source| ChemError::InvalidPattern {
                    name: name.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|queries| Self {
                name: name.to_string(),
                queries,
            });
        Some(compiled)
    }

    pub fn is_present(&self, molecule: &Molecule) -> Result<bool, ChemError> {
        for query in &self.queries {
            if SubstructureMatcher::new(query, DEFAULT_STEP_BUDGET).is_match(molecule)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(group: &str, smi: &str) -> bool {
        let group = ChemicalGroup::builtin(group).unwrap().unwrap();
        group.is_present(&smiles::parse(smi).unwrap()).unwrap()
    }

    #[test]
    fn every_builtin_group_compiles() {
        for name in known_groups() {
            assert!(ChemicalGroup::builtin(name).unwrap().is_ok(), "{name}");
        }
    }

    #[test]
    fn detects_groups_in_aspirin() {
        let aspirin = "CC(=O)Oc1ccccc1C(=O)O";
        assert!(present("carboxylic_acid", aspirin));
        assert!(present("ester", aspirin));
        assert!(present("phenyl", aspirin));
        assert!(!present("amide", aspirin));
        assert!(!present("halide", aspirin));
    }

    #[test]
    fn unknown_group_is_none() {
        assert!(ChemicalGroup::builtin("unobtainium").is_none());
        assert!(!is_known_group("unobtainium"));
        assert!(is_known_group("nitrile"));
    }
}
