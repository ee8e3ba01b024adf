use crate::cli::ScreenArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use medscreen::{core::io::load_compounds, engine::progress::ProgressReporter, workflows};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: ScreenArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app = build_config(&args)?;

    if !app.input_path.is_file() {
        return Err(CliError::Argument(format!(
            "Input file does not exist: {}",
            app.input_path.display()
        )));
    }

    info!("Loading compounds from {:?}", &app.input_path);
    let (set, report) =
        load_compounds(&app.input_path, &app.load_options).map_err(|source| CliError::Load {
            path: app.input_path.clone(),
            source,
        })?;
    if report.dropped_count() > 0 {
        println!(
            "Loaded {} molecules ({} invalid removed).",
            set.len(),
            report.dropped_count()
        );
    } else {
        println!("Loaded {} molecules.", set.len());
    }

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Screening with {} stage(s)...",
        app.screening.stages.len()
    );
    let outcome = tokio::task::block_in_place(|| {
        workflows::screen::run(&set, &app.screening, &reporter)
    })?;

    for failure in &outcome.failed_stages {
        warn!("{}", failure);
        println!("Warning: stage '{}' failed and was skipped.", failure.stage());
    }

    let paths = workflows::screen::write_outputs(&outcome, &app.output_path, app.write_summary)?;
    println!(
        "✓ {} of {} molecules written to: {}",
        outcome.table.len(),
        outcome.screened,
        paths.table.display()
    );
    if let Some(summary_path) = &paths.summary {
        println!("✓ Summary written to: {}", summary_path.display());
    }
    print!("{}", outcome.summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(input: PathBuf, output: PathBuf) -> ScreenArgs {
        ScreenArgs {
            input,
            output,
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn screen_writes_table_and_summary() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("library.csv");
        fs::write(&input, "name,smiles\nethanol,CCO\nbroken,C1CC(\nbenzene,c1ccccc1\n").unwrap();
        let output = dir.path().join("hits.csv");

        let mut screen_args = args(input, output.clone());
        screen_args.complexity = Some(5.0);
        screen_args.complexity_method = Some(medscreen::core::chem::complexity::ComplexityMethod::Whitlock);
        screen_args.filter_output = true;
        screen_args.n_jobs = Some(1);

        let (sender, _receiver) = mpsc::channel(1024);
        run(screen_args, sender).await.unwrap();

        let table = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines[0],
            "name,smiles,complexity_score,passes_complexity,passes_all_filters"
        );
        assert_eq!(lines[1..], ["ethanol,CCO,1,True,True"]);

        let summary = fs::read_to_string(dir.path().join("hits_summary.txt")).unwrap();
        assert!(summary.contains("Total molecules processed: 1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_input_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let (sender, _receiver) = mpsc::channel(8);
        let err = run(
            args(dir.path().join("absent.csv"), dir.path().join("out.csv")),
            sender,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_smiles_column_is_a_load_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("library.tsv");
        fs::write(&input, "id\tstructure\n1\tCCO\n").unwrap();
        let (sender, _receiver) = mpsc::channel(8);
        let err = run(args(input, dir.path().join("out.tsv")), sender)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Load { .. }));
        assert!(err.to_string().contains("Available columns: id, structure"));
    }
}
