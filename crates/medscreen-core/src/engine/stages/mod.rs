//! Filter stages: each variant wraps one chemistry computation and declares the
//! columns it produces before it runs.
//!
//! A [`Stage`] is resolved once from its [`StageConfig`] when the execution
//! plan is built; evaluation then only maps one molecule to one row of values
//! in schema order.

pub mod alerts;
pub mod complexity;
pub mod constraints;
pub mod groups;
pub mod rules;

use super::config::StageConfig;
use super::error::ConfigError;
use super::schema::{Field, Value};
use crate::core::chem::ChemError;
use crate::core::chem::alerts::AlertCatalog;
use crate::core::models::molecule::Molecule;
use std::sync::Arc;

pub use alerts::AlertStage;
pub use complexity::ComplexityStage;
pub use constraints::ConstraintStage;
pub use groups::GroupStage;
pub use rules::RuleStage;

#[derive(Debug, Clone, PartialEq)]
enum StageKind {
    Rules(RuleStage),
    Alerts(AlertStage),
    Complexity(ComplexityStage),
    Constraints(ConstraintStage),
    Groups(GroupStage),
}

/// A resolved, ready-to-run filter stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    config: StageConfig,
    kind: StageKind,
}

impl Stage {
    /// Resolves a validated configuration. Alert stages share `catalog`.
    pub fn resolve(config: &StageConfig, catalog: &Arc<AlertCatalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        let kind = match config {
            StageConfig::Rules { rules } => StageKind::Rules(RuleStage::new(rules)?),
            StageConfig::Alerts { set } => StageKind::Alerts(AlertStage::new(*set, Arc::clone(catalog))),
            StageConfig::Complexity { method, max } => {
                StageKind::Complexity(ComplexityStage::new(*method, *max))
            }
            StageConfig::Constraints(c) => StageKind::Constraints(ConstraintStage::new(c.clone())),
            StageConfig::Groups { groups } => StageKind::Groups(GroupStage::new(groups)?),
        };
        Ok(Self {
            config: config.clone(),
            kind,
        })
    }

    pub fn name(&self) -> &'static str {
        self.config.name()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn schema(&self) -> &[Field] {
        match &self.kind {
            StageKind::Rules(s) => s.schema(),
            StageKind::Alerts(s) => s.schema(),
            StageKind::Complexity(s) => s.schema(),
            StageKind::Constraints(s) => s.schema(),
            StageKind::Groups(s) => s.schema(),
        }
    }

    /// Evaluates one molecule into a row with one value per schema field.
    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        match &self.kind {
            StageKind::Rules(s) => s.evaluate(molecule),
            StageKind::Alerts(s) => s.evaluate(molecule),
            StageKind::Complexity(s) => s.evaluate(molecule),
            StageKind::Constraints(s) => s.evaluate(molecule),
            StageKind::Groups(s) => s.evaluate(molecule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::alerts::AlertSet;
    use crate::core::chem::complexity::ComplexityMethod;
    use crate::core::io::smiles;

    fn catalog() -> Arc<AlertCatalog> {
        Arc::new(AlertCatalog::builtin().unwrap())
    }

    #[test]
    fn every_stage_row_matches_its_schema() {
        let configs = [
            StageConfig::Rules {
                rules: vec!["rule_of_five".into(), "rule_of_veber".into()],
            },
            StageConfig::Alerts { set: AlertSet::Common },
            StageConfig::Alerts { set: AlertSet::Nibr },
            StageConfig::Alerts { set: AlertSet::Lilly },
            StageConfig::Alerts { set: AlertSet::Pains },
            StageConfig::Complexity {
                method: ComplexityMethod::Bertz,
                max: 250.0,
            },
            StageConfig::Constraints(crate::core::chem::constraints::PropertyConstraints {
                tpsa_max: Some(140.0),
                ..Default::default()
            }),
            StageConfig::Groups {
                groups: vec!["ester".into()],
            },
        ];
        let molecule = smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let catalog = catalog();
        for config in &configs {
            let stage = Stage::resolve(config, &catalog).unwrap();
            let row = stage.evaluate(&molecule).unwrap();
            assert_eq!(row.len(), stage.schema().len(), "{}", stage.name());
            for (value, field) in row.iter().zip(stage.schema()) {
                assert!(value.matches_kind(field.kind), "{}: {}", stage.name(), field.name);
            }
        }
    }

    #[test]
    fn resolve_revalidates_configuration() {
        let err = Stage::resolve(
            &StageConfig::Rules {
                rules: vec!["rule_of_nine".into()],
            },
            &catalog(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownRule("rule_of_nine".into()));
    }
}
