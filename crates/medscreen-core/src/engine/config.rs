use super::error::ConfigError;
use crate::core::chem::alerts::AlertSet;
use crate::core::chem::complexity::ComplexityMethod;
use crate::core::chem::constraints::PropertyConstraints;
use crate::core::chem::groups;
use crate::core::chem::rules::Rule;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Options for one requested stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageConfig {
    Rules { rules: Vec<String> },
    Alerts { set: AlertSet },
    Complexity { method: ComplexityMethod, max: f64 },
    Constraints(PropertyConstraints),
    Groups { groups: Vec<String> },
}

impl StageConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StageConfig::Rules { .. } => "rules",
            StageConfig::Alerts { set } => match set {
                AlertSet::Common => "common_alerts",
                AlertSet::Nibr => "nibr",
                AlertSet::Lilly => "lilly",
                AlertSet::Pains => "pains",
            },
            StageConfig::Complexity { .. } => "complexity",
            StageConfig::Constraints(_) => "constraints",
            StageConfig::Groups { .. } => "groups",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StageConfig::Rules { rules } => {
                if rules.is_empty() {
                    return Err(ConfigError::EmptySelection("rules"));
                }
                if let Some(unknown) = rules.iter().find(|r| Rule::lookup(r).is_none()) {
                    return Err(ConfigError::UnknownRule(unknown.clone()));
                }
            }
            StageConfig::Alerts { .. } => {}
            StageConfig::Complexity { max, .. } => {
                if !max.is_finite() {
                    return Err(ConfigError::NonFinite("complexity threshold"));
                }
            }
            StageConfig::Constraints(constraints) => validate_constraints(constraints)?,
            StageConfig::Groups { groups: names } => {
                if names.is_empty() {
                    return Err(ConfigError::EmptySelection("groups"));
                }
                if let Some(unknown) = names.iter().find(|g| !groups::is_known_group(g)) {
                    return Err(ConfigError::UnknownGroup(unknown.clone()));
                }
            }
        }
        Ok(())
    }
}

fn validate_constraints(c: &PropertyConstraints) -> Result<(), ConfigError> {
    if c.is_empty() {
        return Err(ConfigError::EmptyConstraints);
    }
    for (name, range) in [("mw-range", c.mw_range), ("logp-range", c.logp_range)] {
        if let Some((min, max)) = range {
            if !min.is_finite() || !max.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
            if min > max {
                return Err(ConfigError::InvalidRange { name, min, max });
            }
        }
    }
    if c.tpsa_max.is_some_and(|t| !t.is_finite()) {
        return Err(ConfigError::NonFinite("tpsa-max"));
    }
    Ok(())
}

/// Degree of parallelism inside one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One worker per available core.
    #[default]
    All,
    Fixed(NonZeroUsize),
}

impl Concurrency {
    pub const SEQUENTIAL: Concurrency = Concurrency::Fixed(NonZeroUsize::MIN);

    /// Interprets a job count: `-1` for all cores, `n >= 1` for `n` workers.
    pub fn from_jobs(jobs: i64) -> Result<Self, ConfigError> {
        match jobs {
            -1 => Ok(Concurrency::All),
            n if n >= 1 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Concurrency::Fixed)
                .ok_or(ConfigError::InvalidJobCount(n)),
            n => Err(ConfigError::InvalidJobCount(n)),
        }
    }

    pub fn is_sequential(&self) -> bool {
        *self == Self::SEQUENTIAL
    }

    /// Worker count to request from a thread pool. Zero means "pool default".
    pub fn threads(&self) -> usize {
        match self {
            Concurrency::All => 0,
            Concurrency::Fixed(n) => n.get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningConfig {
    /// Stages in the order their columns appear in the result table.
    pub stages: Vec<StageConfig>,
    pub concurrency: Concurrency,
    /// Keep only rows that pass every filter.
    pub filter_output: bool,
    /// Replaces the embedded structural-alert catalog.
    pub alert_catalog: Option<PathBuf>,
    /// Overrides the per-molecule substructure search budget for alert stages.
    pub search_step_budget: Option<usize>,
}

#[derive(Default)]
pub struct ScreeningConfigBuilder {
    stages: Vec<StageConfig>,
    jobs: Option<i64>,
    filter_output: bool,
    alert_catalog: Option<PathBuf>,
    search_step_budget: Option<usize>,
}

impl ScreeningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: StageConfig) -> Self {
        self.stages.push(stage);
        self
    }
    pub fn rules<S: Into<String>>(self, rules: impl IntoIterator<Item = S>) -> Self {
        self.stage(StageConfig::Rules {
            rules: rules.into_iter().map(Into::into).collect(),
        })
    }
    pub fn alerts(self, set: AlertSet) -> Self {
        self.stage(StageConfig::Alerts { set })
    }
    pub fn complexity(self, method: ComplexityMethod, max: f64) -> Self {
        self.stage(StageConfig::Complexity { method, max })
    }
    pub fn constraints(self, constraints: PropertyConstraints) -> Self {
        self.stage(StageConfig::Constraints(constraints))
    }
    pub fn groups<S: Into<String>>(self, groups: impl IntoIterator<Item = S>) -> Self {
        self.stage(StageConfig::Groups {
            groups: groups.into_iter().map(Into::into).collect(),
        })
    }
    pub fn jobs(mut self, jobs: i64) -> Self {
        self.jobs = Some(jobs);
        self
    }
    pub fn filter_output(mut self, enabled: bool) -> Self {
        self.filter_output = enabled;
        self
    }
    pub fn alert_catalog(mut self, path: PathBuf) -> Self {
        self.alert_catalog = Some(path);
        self
    }
    pub fn search_step_budget(mut self, budget: usize) -> Self {
        self.search_step_budget = Some(budget);
        self
    }

    /// Validates every stage and the job count. Nothing runs before this succeeds.
    pub fn build(self) -> Result<ScreeningConfig, ConfigError> {
        for stage in &self.stages {
            stage.validate()?;
        }
        let concurrency = match self.jobs {
            Some(jobs) => Concurrency::from_jobs(jobs)?,
            None => Concurrency::default(),
        };
        Ok(ScreeningConfig {
            stages: self.stages,
            concurrency,
            filter_output: self.filter_output,
            alert_catalog: self.alert_catalog,
            search_step_budget: self.search_step_budget,
        })
    }
}
