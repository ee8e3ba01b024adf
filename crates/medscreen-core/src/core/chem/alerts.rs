use super::ChemError;
use super::substructure::{DEFAULT_STEP_BUDGET, SubstructureMatcher};
use crate::core::io::smiles;
use crate::core::models::molecule::Molecule;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const BUILTIN_CATALOG: &str = include_str!("../../../data/alerts.toml");

/// Demerit total at which a molecule fails the Lilly filter.
pub const LILLY_DEMERIT_CUTOFF: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertSet {
    Common,
    Nibr,
    Lilly,
    Pains,
}

impl AlertSet {
    pub const ALL: [AlertSet; 4] = [
        AlertSet::Common,
        AlertSet::Nibr,
        AlertSet::Lilly,
        AlertSet::Pains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSet::Common => "common",
            AlertSet::Nibr => "nibr",
            AlertSet::Lilly => "lilly",
            AlertSet::Pains => "pains",
        }
    }
}

impl fmt::Display for AlertSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(AlertSet::Common),
            "nibr" => Ok(AlertSet::Nibr),
            "lilly" => Ok(AlertSet::Lilly),
            "pains" => Ok(AlertSet::Pains),
            other => Err(format!(
                "unknown alert set '{other}' (expected common, nibr, lilly or pains)"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlert {
    name: String,
    pattern: String,
    #[serde(default)]
    demerits: u32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    common: Vec<RawAlert>,
    #[serde(default)]
    nibr: Vec<RawAlert>,
    #[serde(default)]
    lilly: Vec<RawAlert>,
    #[serde(default)]
    pains: Vec<RawAlert>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub name: String,
    pub pattern: String,
    pub demerits: u32,
    query: Molecule,
}

/// Compiled structural alerts grouped by set.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCatalog {
    sets: HashMap<AlertSet, Vec<Alert>>,
    step_budget: usize,
}

impl AlertCatalog {
    /// A catalog without any alerts.
    pub fn empty() -> Self {
        Self {
            sets: HashMap::new(),
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    pub fn builtin() -> Result<Self, ChemError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, ChemError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChemError::Catalog(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ChemError> {
        let raw: RawCatalog =
            toml::from_str(content).map_err(|e| ChemError::Catalog(e.to_string()))?;

        let mut sets = HashMap::new();
        for (set, alerts) in [
            (AlertSet::Common, raw.common),
            (AlertSet::Nibr, raw.nibr),
            (AlertSet::Lilly, raw.lilly),
            (AlertSet::Pains, raw.pains),
        ] {
            let compiled = alerts
                .into_iter()
                .map(compile)
                .collect::<Result<Vec<_>, _>>()?;
            sets.insert(set, compiled);
        }

        Ok(Self {
            sets,
            step_budget: DEFAULT_STEP_BUDGET,
        })
    }

    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget;
        self
    }

    pub fn alerts(&self, set: AlertSet) -> &[Alert] {
        self.sets.get(&set).map_or(&[], Vec::as_slice)
    }

    /// Alerts of `set` present in `molecule`, in catalog order.
    pub fn scan(&self, set: AlertSet, molecule: &Molecule) -> Result<Vec<&Alert>, ChemError> {
        let mut hits = Vec::new();
        for alert in self.alerts(set) {
            if SubstructureMatcher::new(&alert.query, self.step_budget).is_match(molecule)? {
                hits.push(alert);
            }
        }
        Ok(hits)
    }
}

fn compile(raw: RawAlert) -> Result<Alert, ChemError> {
    let query = smiles::parse_query(&raw.pattern).map_err(|source| ChemError::InvalidPattern {
        name: raw.name.clone(),
        source,
    })?;
    Ok(Alert {
        name: raw.name,
        pattern: raw.pattern,
        demerits: raw.demerits,
        query,
    })
}
