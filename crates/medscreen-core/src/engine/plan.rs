use super::config::{ScreeningConfig, StageConfig};
use super::error::{ConfigError, EngineError, MergeError};
use super::stages::Stage;
use crate::core::chem::alerts::AlertCatalog;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The fixed sequence of stages for one run, resolved and checked up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    stages: Vec<Stage>,
}

impl ExecutionPlan {
    /// Resolves every stage and rejects plans whose stages would produce
    /// conflicting columns.
    ///
    /// Two stages may declare the same column only when their configurations
    /// are identical; such duplicates produce identical columns and collapse
    /// when merged.
    pub fn build(config: &ScreeningConfig) -> Result<Self, EngineError> {
        let catalog = Arc::new(load_catalog(config)?);

        let stages = config
            .stages
            .iter()
            .map(|stage| Stage::resolve(stage, &catalog))
            .collect::<Result<Vec<_>, _>>()?;

        let mut owners: HashMap<&str, &Stage> = HashMap::new();
        for stage in &stages {
            for field in stage.schema() {
                match owners.get(field.name.as_str()) {
                    Some(owner) if owner.config() != stage.config() => {
                        return Err(MergeError::ColumnCollision {
                            column: field.name.clone(),
                            first: owner.name().to_string(),
                            second: stage.name().to_string(),
                        }
                        .into());
                    }
                    Some(_) => {
                        debug!(stage = stage.name(), column = %field.name, "Duplicate stage column.");
                    }
                    None => {
                        owners.insert(&field.name, stage);
                    }
                }
            }
        }

        info!(
            stages = stages.len(),
            "Execution plan: [{}]",
            stages.iter().map(Stage::name).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn load_catalog(config: &ScreeningConfig) -> Result<AlertCatalog, ConfigError> {
    let needs_alerts = config
        .stages
        .iter()
        .any(|s| matches!(s, StageConfig::Alerts { .. }));
    if !needs_alerts {
        return Ok(AlertCatalog::empty());
    }

    let catalog = match &config.alert_catalog {
        Some(path) => AlertCatalog::load(path)?,
        None => AlertCatalog::builtin()?,
    };
    Ok(match config.search_step_budget {
        Some(budget) => catalog.with_step_budget(budget),
        None => catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::alerts::AlertSet;
    use crate::core::chem::complexity::ComplexityMethod;
    use crate::engine::config::ScreeningConfigBuilder;

    #[test]
    fn plan_preserves_requested_order() {
        let config = ScreeningConfigBuilder::new()
            .complexity(ComplexityMethod::Bertz, 400.0)
            .alerts(AlertSet::Nibr)
            .build()
            .unwrap();
        let plan = ExecutionPlan::build(&config).unwrap();
        let names: Vec<_> = plan.stages().iter().map(Stage::name).collect();
        assert_eq!(names, vec!["complexity", "nibr"]);
    }

    #[test]
    fn identical_duplicate_stages_are_allowed() {
        let config = ScreeningConfigBuilder::new()
            .alerts(AlertSet::Pains)
            .alerts(AlertSet::Pains)
            .build()
            .unwrap();
        assert_eq!(ExecutionPlan::build(&config).unwrap().len(), 2);
    }

    #[test]
    fn conflicting_configurations_collide_statically() {
        let config = ScreeningConfigBuilder::new()
            .complexity(ComplexityMethod::Bertz, 400.0)
            .complexity(ComplexityMethod::Bertz, 300.0)
            .build()
            .unwrap();
        let err = ExecutionPlan::build(&config).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Merge(MergeError::ColumnCollision { ref column, .. }) if column == "complexity_score"
        ));
    }

    #[test]
    fn disjoint_group_stages_do_not_collide() {
        let config = ScreeningConfigBuilder::new()
            .groups(["alcohol"])
            .groups(["nitrile"])
            .build()
            .unwrap();
        assert!(ExecutionPlan::build(&config).is_ok());
    }

    #[test]
    fn missing_catalog_file_is_a_config_error() {
        let config = ScreeningConfigBuilder::new()
            .alerts(AlertSet::Common)
            .alert_catalog("/nonexistent/alerts.toml".into())
            .build()
            .unwrap();
        assert!(matches!(
            ExecutionPlan::build(&config),
            Err(EngineError::Config(ConfigError::Catalog(_)))
        ));
    }
}
