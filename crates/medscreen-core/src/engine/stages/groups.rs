use crate::core::chem::ChemError;
use crate::core::chem::groups::ChemicalGroup;
use crate::core::models::molecule::Molecule;
use crate::engine::error::ConfigError;
use crate::engine::schema::{Field, Value};

/// Detects functional groups; one `has_<group>` column each.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStage {
    groups: Vec<ChemicalGroup>,
    schema: Vec<Field>,
}

impl GroupStage {
    pub fn new(names: &[String]) -> Result<Self, ConfigError> {
        let groups = names
            .iter()
            .map(|name| match ChemicalGroup::builtin(name) {
                Some(compiled) => compiled.map_err(ConfigError::from),
                None => Err(ConfigError::UnknownGroup(name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let schema = groups
            .iter()
            .map(|g| Field::bool(format!("has_{}", g.name)))
            .collect();
        Ok(Self { groups, schema })
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        self.groups
            .iter()
            .map(|g| g.is_present(molecule).map(Value::Bool))
            .collect()
    }
}
