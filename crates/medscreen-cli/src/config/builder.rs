use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{ScreenArgs, parse_range};
use crate::error::{CliError, Result};
use medscreen::core::chem::alerts::AlertSet;
use medscreen::core::chem::constraints::PropertyConstraints;
use medscreen::core::io::traits::LoadOptions;
use medscreen::engine::config::ScreeningConfigBuilder;
use std::str::FromStr;
use tracing::{debug, warn};

/// Resolves defaults, the optional config file and command-line flags, in
/// increasing order of precedence, into one validated configuration.
pub fn build_config(args: &ScreenArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;
    debug!("Effective file configuration: {:?}", file_config);

    let input_file = file_config.input.unwrap_or_default();
    let alerts_file = file_config.alerts.unwrap_or_default();
    let complexity_file = file_config.complexity.unwrap_or_default();
    let concurrency_file = file_config.concurrency.unwrap_or_default();
    let output_file = file_config.output.unwrap_or_default();

    let smiles_column = args
        .smiles_column
        .clone()
        .or(input_file.smiles_column)
        .unwrap_or(defaults.smiles_column);

    // Stage order is fixed regardless of flag order.
    let mut builder = ScreeningConfigBuilder::new();
    if let Some(rules) = args.rules.clone().or(file_config.rules) {
        builder = builder.rules(rules);
    }
    for (set, cli_flag, file_flag) in [
        (AlertSet::Common, args.common_alerts, alerts_file.common),
        (AlertSet::Nibr, args.nibr, alerts_file.nibr),
        (AlertSet::Lilly, args.lilly, alerts_file.lilly),
        (AlertSet::Pains, args.pains, alerts_file.pains),
    ] {
        if cli_flag || file_flag {
            builder = builder.alerts(set);
        }
    }

    let method = args
        .complexity_method
        .or(complexity_file.method)
        .unwrap_or(defaults.complexity_method);
    match args.complexity.or(complexity_file.max) {
        Some(max) => builder = builder.complexity(method, max),
        None if args.complexity_method.is_some() || complexity_file.method.is_some() => {
            warn!("A complexity method was given without a threshold; the complexity stage is skipped.");
        }
        None => {}
    }

    let constraints = merge_constraints(args, file_config.constraints.unwrap_or_default());
    if !constraints.is_empty() {
        builder = builder.constraints(constraints);
    }

    if let Some(groups) = args.groups.clone().or(file_config.groups) {
        builder = builder.groups(groups);
    }

    let jobs = args
        .n_jobs
        .or(concurrency_file.jobs)
        .unwrap_or(defaults.jobs);
    let filter_output =
        args.filter_output || output_file.filter.unwrap_or(defaults.filter_output);
    let write_summary =
        !args.no_summary && output_file.summary.unwrap_or(defaults.write_summary);

    builder = builder.jobs(jobs).filter_output(filter_output);
    if let Some(path) = alerts_file.catalog {
        builder = builder.alert_catalog(path);
    }
    if let Some(budget) = alerts_file.search_step_budget {
        builder = builder.search_step_budget(budget);
    }

    let screening = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        load_options: LoadOptions { smiles_column },
        screening,
        write_summary,
    })
}

fn merge_constraints(args: &ScreenArgs, file: PropertyConstraints) -> PropertyConstraints {
    PropertyConstraints {
        mw_range: args.mw_range.or(file.mw_range),
        logp_range: args.logp_range.or(file.logp_range),
        tpsa_max: args.tpsa_max.or(file.tpsa_max),
        hbd_max: args.hbd_max.or(file.hbd_max),
        hba_max: args.hba_max.or(file.hba_max),
        rotatable_bonds_max: args.rotatable_bonds_max.or(file.rotatable_bonds_max),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        let key = key.trim();

        match key {
            "input.smiles-column" => {
                config.input.get_or_insert_with(Default::default).smiles_column =
                    Some(value.trim().to_string());
            }
            "rules" => config.rules = Some(parse_list(value)),
            "groups" => config.groups = Some(parse_list(value)),
            "alerts.common" | "alerts.nibr" | "alerts.lilly" | "alerts.pains" => {
                let enabled = parse_value(key, value, "boolean")?;
                let alerts = config.alerts.get_or_insert_with(Default::default);
                match key {
                    "alerts.common" => alerts.common = enabled,
                    "alerts.nibr" => alerts.nibr = enabled,
                    "alerts.lilly" => alerts.lilly = enabled,
                    _ => alerts.pains = enabled,
                }
            }
            "alerts.catalog" => {
                config.alerts.get_or_insert_with(Default::default).catalog =
                    Some(value.trim().into());
            }
            "alerts.search-step-budget" => {
                config
                    .alerts
                    .get_or_insert_with(Default::default)
                    .search_step_budget = Some(parse_value(key, value, "integer")?);
            }
            "complexity.method" => {
                config.complexity.get_or_insert_with(Default::default).method =
                    Some(parse_value(key, value, "method")?);
            }
            "complexity.max" => {
                config.complexity.get_or_insert_with(Default::default).max =
                    Some(parse_value(key, value, "float")?);
            }
            "constraints.mw-range" | "constraints.logp-range" => {
                let range = parse_range(value).map_err(|e| {
                    CliError::Config(format!("Invalid range value for {}: {}", key, e))
                })?;
                let constraints = config.constraints.get_or_insert_with(Default::default);
                if key == "constraints.mw-range" {
                    constraints.mw_range = Some(range);
                } else {
                    constraints.logp_range = Some(range);
                }
            }
            "constraints.tpsa-max" => {
                config.constraints.get_or_insert_with(Default::default).tpsa_max =
                    Some(parse_value(key, value, "float")?);
            }
            "constraints.hbd-max" => {
                config.constraints.get_or_insert_with(Default::default).hbd_max =
                    Some(parse_value(key, value, "integer")?);
            }
            "constraints.hba-max" => {
                config.constraints.get_or_insert_with(Default::default).hba_max =
                    Some(parse_value(key, value, "integer")?);
            }
            "constraints.rotatable-bonds-max" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .rotatable_bonds_max = Some(parse_value(key, value, "integer")?);
            }
            "concurrency.jobs" => {
                config.concurrency.get_or_insert_with(Default::default).jobs =
                    Some(parse_value(key, value, "integer")?);
            }
            "output.summary" => {
                config.output.get_or_insert_with(Default::default).summary =
                    Some(parse_value(key, value, "boolean")?);
            }
            "output.filter" => {
                config.output.get_or_insert_with(Default::default).filter =
                    Some(parse_value(key, value, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medscreen::core::chem::complexity::ComplexityMethod;
    use medscreen::engine::config::{Concurrency, StageConfig};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_screen_args() -> ScreenArgs {
        ScreenArgs {
            input: PathBuf::from("lib.csv"),
            output: PathBuf::from("out.csv"),
            ..Default::default()
        }
    }

    fn stage_names(app: &AppConfig) -> Vec<&'static str> {
        app.screening.stages.iter().map(StageConfig::name).collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let app = build_config(&base_screen_args()).expect("build ok");
        assert_eq!(app.load_options.smiles_column, "smiles");
        assert!(app.screening.stages.is_empty());
        assert_eq!(app.screening.concurrency, Concurrency::All);
        assert!(app.write_summary);
        assert!(!app.screening.filter_output);
    }

    #[test]
    fn stages_follow_the_fixed_order() {
        let mut args = base_screen_args();
        args.groups = Some(vec!["alcohol".into()]);
        args.pains = true;
        args.complexity = Some(300.0);
        args.common_alerts = true;
        args.rules = Some(vec!["rule_of_five".into()]);
        args.hbd_max = Some(5);

        let app = build_config(&args).expect("build ok");
        assert_eq!(
            stage_names(&app),
            vec!["rules", "common_alerts", "pains", "complexity", "constraints", "groups"]
        );
        assert_eq!(
            app.screening.stages[3],
            StageConfig::Complexity {
                method: ComplexityMethod::Bertz,
                max: 300.0
            }
        );
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        let toml = r#"
            rules = ["rule_of_three"]
            [input]
            smiles-column = "SMILES"
            [complexity]
            method = "whitlock"
            max = 10.0
            [constraints]
            mw-range = [100.0, 300.0]
            tpsa-max = 90.0
            [concurrency]
            jobs = 2
            [output]
            summary = false
            "#;
        fs::write(&cfg_path, toml).unwrap();

        let mut args = base_screen_args();
        args.config = Some(cfg_path);
        args.complexity = Some(25.0);
        args.mw_range = Some((150.0, 450.0));
        args.n_jobs = Some(1);

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.load_options.smiles_column, "SMILES");
        assert!(app.screening.concurrency.is_sequential());
        assert!(!app.write_summary);
        assert_eq!(stage_names(&app), vec!["rules", "complexity", "constraints"]);
        assert_eq!(
            app.screening.stages[1],
            StageConfig::Complexity {
                method: ComplexityMethod::Whitlock,
                max: 25.0
            }
        );
        assert_eq!(
            app.screening.stages[2],
            StageConfig::Constraints(PropertyConstraints {
                mw_range: Some((150.0, 450.0)),
                tpsa_max: Some(90.0),
                ..Default::default()
            })
        );
    }

    #[test]
    fn set_values_override_the_file() {
        let mut args = base_screen_args();
        args.set_values = vec![
            "complexity.max=400".to_string(),
            "complexity.method=barone".to_string(),
            "alerts.lilly=true".to_string(),
            "constraints.logp-range=-1,5".to_string(),
            "concurrency.jobs=3".to_string(),
            "output.filter=true".to_string(),
            "groups=alcohol, ester".to_string(),
        ];

        let app = build_config(&args).expect("build ok");
        assert_eq!(
            stage_names(&app),
            vec!["lilly", "complexity", "constraints", "groups"]
        );
        assert_eq!(app.screening.concurrency.threads(), 3);
        assert!(app.screening.filter_output);
        assert_eq!(
            app.screening.stages[3],
            StageConfig::Groups {
                groups: vec!["alcohol".into(), "ester".into()]
            }
        );
    }

    #[test]
    fn bad_set_values_are_rejected() {
        for bad in ["complexity.max", "nope.key=1", "concurrency.jobs=many"] {
            let mut args = base_screen_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn invalid_configurations_fail_before_running() {
        let mut args = base_screen_args();
        args.rules = Some(vec!["rule_of_eleven".into()]);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_screen_args();
        args.n_jobs = Some(0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_screen_args();
        args.mw_range = Some((500.0, 100.0));
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn method_without_threshold_skips_complexity() {
        let mut args = base_screen_args();
        args.complexity_method = Some(ComplexityMethod::Whitlock);
        let app = build_config(&args).expect("build ok");
        assert!(app.screening.stages.is_empty());
    }
}
