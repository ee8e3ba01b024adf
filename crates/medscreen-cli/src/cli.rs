use clap::{Args, Parser, Subcommand};
use medscreen::core::chem::complexity::ComplexityMethod;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "medscreen - screen compound libraries against medicinal-chemistry rules, structural alerts, complexity and property filters.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected filters over a compound file and write the annotated table.
    Screen(ScreenArgs),
    /// List the rules, alert sets, complexity methods and chemical groups that can be requested.
    Catalog,
}

/// Arguments for the `screen` subcommand.
#[derive(Args, Debug, Default)]
pub struct ScreenArgs {
    // --- Input / Output ---
    /// Compound file to screen (.csv, .tsv, .sdf or .txt).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Result table path. A `.tsv` extension selects tab-delimited output.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Column holding SMILES in delimited input.
    #[arg(long, value_name = "NAME")]
    pub smiles_column: Option<String>,

    /// Optional TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Stages ---
    /// Comma-separated drug-likeness rules (e.g. rule_of_five,rule_of_veber).
    #[arg(long, value_name = "RULES", value_delimiter = ',')]
    pub rules: Option<Vec<String>>,

    /// Flag molecules carrying common structural alerts.
    #[arg(long)]
    pub common_alerts: bool,

    /// Apply the NIBR structural filters.
    #[arg(long)]
    pub nibr: bool,

    /// Apply the Lilly demerit filters.
    #[arg(long)]
    pub lilly: bool,

    /// Apply the PAINS filters.
    #[arg(long)]
    pub pains: bool,

    /// Maximum allowed complexity score. Enables the complexity stage.
    #[arg(long, value_name = "MAX")]
    pub complexity: Option<f64>,

    /// Complexity scoring method (bertz, whitlock or barone).
    #[arg(long, value_name = "METHOD")]
    pub complexity_method: Option<ComplexityMethod>,

    /// Molecular-weight window, e.g. 200,500.
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_range)]
    pub mw_range: Option<(f64, f64)>,

    /// Estimated logP window, e.g. -1,5.
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_range, allow_hyphen_values = true)]
    pub logp_range: Option<(f64, f64)>,

    /// Maximum topological polar surface area.
    #[arg(long, value_name = "FLOAT")]
    pub tpsa_max: Option<f64>,

    /// Maximum number of hydrogen-bond donors.
    #[arg(long, value_name = "INT")]
    pub hbd_max: Option<u32>,

    /// Maximum number of hydrogen-bond acceptors.
    #[arg(long, value_name = "INT")]
    pub hba_max: Option<u32>,

    /// Maximum number of rotatable bonds.
    #[arg(long, value_name = "INT")]
    pub rotatable_bonds_max: Option<u32>,

    /// Comma-separated chemical groups to detect (e.g. alcohol,ester).
    #[arg(long, value_name = "GROUPS", value_delimiter = ',')]
    pub groups: Option<Vec<String>>,

    // --- Execution / Output Overrides ---
    /// Worker threads per stage. -1 uses every core, 1 runs sequentially.
    #[arg(short = 'j', long = "n-jobs", value_name = "NUM", allow_negative_numbers = true)]
    pub n_jobs: Option<i64>,

    /// Do not write the `<stem>_summary.txt` report.
    #[arg(long)]
    pub no_summary: bool,

    /// Keep only molecules that pass every filter.
    #[arg(long)]
    pub filter_output: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S complexity.max=400
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Parses `MIN,MAX` into a pair of floats.
pub fn parse_range(value: &str) -> Result<(f64, f64), String> {
    let (min, max) = value
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX but got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", s.trim()))
    };
    Ok((parse(min)?, parse(max)?))
}
