use crate::core::chem::ChemError;
use crate::core::chem::descriptors::Descriptors;
use crate::core::chem::rules::Rule;
use crate::core::models::molecule::Molecule;
use crate::engine::error::ConfigError;
use crate::engine::schema::{Field, Value};

pub const ALL_RULES_COLUMN: &str = "passes_all_rules";

/// One boolean column per rule, then their conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleStage {
    rules: Vec<&'static Rule>,
    schema: Vec<Field>,
}

impl RuleStage {
    pub fn new(names: &[String]) -> Result<Self, ConfigError> {
        let rules = names
            .iter()
            .map(|name| Rule::lookup(name).ok_or_else(|| ConfigError::UnknownRule(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let schema = rules
            .iter()
            .map(|rule| Field::bool(rule.name))
            .chain([Field::bool(ALL_RULES_COLUMN)])
            .collect();
        Ok(Self { rules, schema })
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        let descriptors = Descriptors::compute(molecule);
        let verdicts: Vec<bool> = self.rules.iter().map(|r| r.passes(&descriptors)).collect();
        let all = verdicts.iter().all(|&v| v);
        Ok(verdicts
            .into_iter()
            .chain([all])
            .map(Value::Bool)
            .collect())
    }
}
