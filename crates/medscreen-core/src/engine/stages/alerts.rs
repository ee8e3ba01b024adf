use crate::core::chem::ChemError;
use crate::core::chem::alerts::{AlertCatalog, AlertSet, LILLY_DEMERIT_CUTOFF};
use crate::core::models::molecule::Molecule;
use crate::engine::schema::{Field, Value};
use std::sync::Arc;

/// Screens against one structural-alert set of a shared catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertStage {
    set: AlertSet,
    catalog: Arc<AlertCatalog>,
    schema: Vec<Field>,
}

impl AlertStage {
    pub fn new(set: AlertSet, catalog: Arc<AlertCatalog>) -> Self {
        let schema = match set {
            AlertSet::Common => vec![
                Field::bool("has_common_alerts"),
                Field::int("num_common_alerts"),
                Field::text("common_alert_details"),
            ],
            AlertSet::Nibr => vec![Field::bool("passes_nibr")],
            AlertSet::Lilly => vec![
                Field::int("lilly_demerits").score_like(),
                Field::bool("passes_lilly"),
                Field::text("lilly_patterns"),
            ],
            AlertSet::Pains => vec![Field::bool("passes_pains")],
        };
        Self {
            set,
            catalog,
            schema,
        }
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    pub fn evaluate(&self, molecule: &Molecule) -> Result<Vec<Value>, ChemError> {
        let hits = self.catalog.scan(self.set, molecule)?;
        let names = || {
            hits.iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Ok(match self.set {
            AlertSet::Common => vec![
                Value::Bool(!hits.is_empty()),
                Value::Int(hits.len() as i64),
                Value::Text(names()),
            ],
            AlertSet::Nibr | AlertSet::Pains => vec![Value::Bool(hits.is_empty())],
            AlertSet::Lilly => {
                let demerits: u32 = hits.iter().map(|a| a.demerits).sum();
                vec![
                    Value::Int(demerits as i64),
                    Value::Bool(demerits < LILLY_DEMERIT_CUTOFF),
                    Value::Text(names()),
                ]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles;

    fn stage(set: AlertSet) -> AlertStage {
        AlertStage::new(set, Arc::new(AlertCatalog::builtin().unwrap()))
    }

    #[test]
    fn common_alerts_report_count_and_names() {
        let row = stage(AlertSet::Common)
            .evaluate(&smiles::parse("CC(=O)Cl").unwrap())
            .unwrap();
        assert_eq!(
            row,
            vec![
                Value::Bool(true),
                Value::Int(1),
                Value::Text("acyl_chloride".into())
            ]
        );
    }

    #[test]
    fn clean_molecule_passes_pains() {
        let row = stage(AlertSet::Pains)
            .evaluate(&smiles::parse("CCO").unwrap())
            .unwrap();
        assert_eq!(row, vec![Value::Bool(true)]);
    }

    #[test]
    fn exhausted_search_budget_is_a_chem_error() {
        let catalog = AlertCatalog::builtin().unwrap().with_step_budget(1);
        let stage = AlertStage::new(AlertSet::Common, Arc::new(catalog));
        let err = stage
            .evaluate(&smiles::parse("CC(=O)Oc1ccccc1C(=O)O").unwrap())
            .unwrap_err();
        assert!(matches!(err, ChemError::SearchBudgetExceeded { budget: 1 }));
    }

    #[test]
    fn lilly_demerits_are_score_like() {
        let stage = stage(AlertSet::Lilly);
        assert!(stage.schema()[0].score);
        assert_eq!(stage.schema()[1].name, "passes_lilly");
    }
}
