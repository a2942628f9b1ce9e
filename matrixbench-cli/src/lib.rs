#![warn(missing_docs)]
//! matrixbench CLI Library
//!
//! Command-line front end for running a benchmark matrix and reporting the
//! results. `matrixbench run` measures and saves, `matrixbench report`
//! re-renders a saved results file.
//!
//! # Example
//!
//! ```text
//! $ matrixbench init > matrixbench.toml
//! $ matrixbench list --operation Serialize
//! $ matrixbench run -n 5
//! $ matrixbench report --format csv
//! ```

mod config;
mod planner;
mod runner;

pub use config::*;
pub use planner::{ExecutionPlan, PlannedGroup, PlannedJob, build_plan, format_plan};
pub use runner::{JobOutcome, MatrixRunner, RunError, RunSummary, format_run_summary};

use clap::{Args, Parser, Subcommand};
use matrixbench_core::{CommandProcess, Matrix};
use matrixbench_report::{OutputFormat, load_results, render_report};
use std::io::Write;
use std::path::{Path, PathBuf};

/// matrixbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "matrixbench")]
#[command(
    author,
    version,
    about = "Run a benchmark program across an operation × payload × mechanism matrix"
)]
pub struct Cli {
    /// Subcommand; defaults to `report`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: matrixbench.toml, searched upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Results JSON file to write (run) or read (report)
    #[arg(long, global = true)]
    pub results: Option<PathBuf>,

    /// Report format: table, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the matrix, save results, print the report
    Run(RunArgs),
    /// Print the report for a saved results file
    Report(SelectArgs),
    /// List the jobs a run would execute
    List(SelectArgs),
    /// Print a default matrixbench.toml
    Init,
}

/// Narrow the matrix to some entries of each dimension
#[derive(Args, Debug, Default, Clone)]
pub struct SelectArgs {
    /// Only this operation (repeatable)
    #[arg(long = "operation")]
    pub operations: Vec<String>,

    /// Only this payload type (repeatable)
    #[arg(long = "payload-type")]
    pub payload_types: Vec<String>,

    /// Only this mechanism (repeatable); the baseline must stay included
    #[arg(long = "mechanism")]
    pub mechanisms: Vec<String>,
}

/// Options for `run`
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub select: SelectArgs,

    /// Samples per job (overrides runner.repetitions)
    #[arg(short = 'n', long)]
    pub repetitions: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Run the matrixbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or the first error that aborted the command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the matrixbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // init does not read the existing configuration, which may be broken
    let config = || resolve_config(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run(ref args)) => run_matrix(&cli, &config()?, args),
        Some(Commands::Report(ref select)) => report_results(&cli, &config()?, select),
        Some(Commands::List(ref select)) => list_jobs(&cli, &config()?, select),
        Some(Commands::Init) => write_output(&cli, &MatrixConfig::default_toml()),
        None => report_results(&cli, &config()?, &SelectArgs::default()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "matrixbench=debug"
    } else {
        "matrixbench=info"
    };
    // try_init: a subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the configuration from `--config`, discovery, or defaults, then validate it.
fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<MatrixConfig> {
    let config = match explicit {
        Some(path) => MatrixConfig::load(path)?,
        None => match MatrixConfig::discover_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered configuration");
                MatrixConfig::load(&path)?
            }
            None => MatrixConfig::default(),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Configured matrix narrowed by the CLI selection
fn build_matrix(config: &MatrixConfig, select: &SelectArgs) -> anyhow::Result<Matrix> {
    let matrix = config.matrix.to_matrix().narrowed(
        &select.operations,
        &select.payload_types,
        &select.mechanisms,
    );
    matrix.validate()?;
    Ok(matrix)
}

fn build_process(config: &MatrixConfig) -> CommandProcess {
    let process = CommandProcess::new(config.runner.program.clone())
        .with_args(config.runner.args.iter().cloned());
    match &config.runner.working_dir {
        Some(dir) => process.with_working_dir(dir),
        None => process,
    }
}

/// Results path: CLI value > config value
fn results_path(cli: &Cli, config: &MatrixConfig) -> PathBuf {
    cli.results
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.results_path))
}

/// Output format: CLI value > config value
fn output_format(cli: &Cli, config: &MatrixConfig) -> anyhow::Result<OutputFormat> {
    let raw = cli.format.as_deref().unwrap_or(&config.output.format);
    raw.parse::<OutputFormat>().map_err(|e| anyhow::anyhow!(e))
}

fn write_output(cli: &Cli, output: &str) -> anyhow::Result<()> {
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        eprintln!("Written to: {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn run_matrix(cli: &Cli, config: &MatrixConfig, args: &RunArgs) -> anyhow::Result<()> {
    let matrix = build_matrix(config, &args.select)?;
    let format = output_format(cli, config)?;
    let repetitions = args.repetitions.unwrap_or(config.runner.repetitions);
    let path = results_path(cli, config);

    let working_dir = config.runner.working_dir.as_deref().map(Path::new);
    let reset = config.reset.to_reset(working_dir);
    let process = build_process(config);

    eprintln!(
        "Running {} jobs × {} repetitions ({})...\n",
        matrix.len(),
        repetitions,
        process.command_line(&["<operation>", "<mechanism>", "<payload-type>"])
    );

    let summary = MatrixRunner::new(process, reset, repetitions)
        .with_progress(!args.no_progress)
        .run_and_save(&matrix, &path)?;

    eprintln!("\n{}", format_run_summary(&summary));
    eprintln!("Results saved to: {}\n", path.display());

    // report from what was persisted, not from memory
    let results = load_results(&path)?;
    let report = render_report(&results, &matrix, format)?;
    write_output(cli, &report)
}

fn report_results(cli: &Cli, config: &MatrixConfig, select: &SelectArgs) -> anyhow::Result<()> {
    let matrix = build_matrix(config, select)?;
    let format = output_format(cli, config)?;
    let path = results_path(cli, config);

    let results = load_results(&path)?;
    tracing::debug!(path = %path.display(), entries = results.len(), "loaded results");

    let report = render_report(&results, &matrix, format)?;
    write_output(cli, &report)
}

fn list_jobs(cli: &Cli, config: &MatrixConfig, select: &SelectArgs) -> anyhow::Result<()> {
    let matrix = build_matrix(config, select)?;
    let plan = build_plan(&matrix, &build_process(config), config.runner.repetitions);
    write_output(cli, &format_plan(&plan, &matrix.baseline))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("matrixbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_run_with_selection() {
        let cli = parse(&[
            "run",
            "-n",
            "3",
            "--operation",
            "Serialize",
            "--mechanism",
            "Default",
            "--mechanism",
            "Jil",
            "--no-progress",
            "--results",
            "out.json",
        ]);
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.repetitions, Some(3));
        assert!(args.no_progress);
        assert_eq!(args.select.operations, vec!["Serialize"]);
        assert_eq!(args.select.mechanisms, vec!["Default", "Jil"]);
        assert_eq!(cli.results, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_default_command_is_report() {
        let cli = parse(&["--format", "csv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.format.as_deref(), Some("csv"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = parse(&["report", "--results", "mine.json", "--format", "json"]);
        let config = MatrixConfig::default();
        assert_eq!(results_path(&cli, &config), PathBuf::from("mine.json"));
        assert_eq!(output_format(&cli, &config).unwrap(), OutputFormat::Json);

        let cli = parse(&["report"]);
        assert_eq!(
            results_path(&cli, &config),
            PathBuf::from("start_up_results_with_other_libs.json")
        );
        assert_eq!(output_format(&cli, &config).unwrap(), OutputFormat::Table);

        let cli = parse(&["report", "--format", "yaml"]);
        assert!(output_format(&cli, &config).is_err());
    }

    #[test]
    fn test_build_matrix_selection() {
        let config = MatrixConfig::default();
        let select = SelectArgs {
            payload_types: vec!["Location".to_string()],
            mechanisms: vec!["Default".to_string(), "AOT_Raw".to_string()],
            ..Default::default()
        };
        let matrix = build_matrix(&config, &select).unwrap();
        assert_eq!(matrix.len(), 4);

        let without_baseline = SelectArgs {
            mechanisms: vec!["Jil".to_string()],
            ..Default::default()
        };
        assert!(build_matrix(&config, &without_baseline).is_err());
    }

    #[test]
    fn test_build_process_command_line() {
        let process = build_process(&MatrixConfig::default());
        assert_eq!(
            process.command_line(&["Deserialize", "Jil", "Location"]),
            "dotnet run Benchmarks Deserialize Jil Location"
        );
    }

    const SMALL_CONFIG: &str = r#"
[matrix]
operations = ["Serialize"]
payload_types = ["Location"]
mechanisms = ["Jil", "Default"]
baseline = "Default"

[runner]
program = "./bench"
repetitions = 4
"#;

    /// Scratch directory holding a config and a results file for it
    fn workspace() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config, SMALL_CONFIG).unwrap();
        let results = tmp.path().join("results.json");
        std::fs::write(
            &results,
            r#"{"Serialize Location Jil": 50, "Serialize Location Default": 100}"#,
        )
        .unwrap();
        (tmp, config, results)
    }

    fn run_args(args: &[&str]) -> anyhow::Result<()> {
        run_with_cli(parse(args))
    }

    #[test]
    fn test_report_command_writes_table() {
        let (tmp, config, results) = workspace();
        let out = tmp.path().join("report.txt");

        run_args(&[
            "report",
            "--config",
            config.to_str().unwrap(),
            "--results",
            results.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let expected = "\
Summary
=======

Serialize Location

| Test    | Mean (us) | Ratio |
|---------|-----------|-------|
| Jil     | 50        | 0.50  |
| Default | 100       | 1.00  |

";
        assert_eq!(std::fs::read_to_string(&out).unwrap(), expected);
    }

    #[test]
    fn test_default_command_writes_csv() {
        let (tmp, config, results) = workspace();
        let out = tmp.path().join("report.csv");

        run_args(&[
            "--config",
            config.to_str().unwrap(),
            "--results",
            results.to_str().unwrap(),
            "--format",
            "csv",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let csv = std::fs::read_to_string(&out).unwrap();
        assert!(csv.starts_with("operation,payload_type,mechanism,mean_us,ratio\n"));
        assert!(csv.contains("Serialize,Location,Jil,50,0.50\n"));
        assert!(csv.contains("Serialize,Location,Default,100,1.00\n"));
    }

    #[test]
    fn test_report_command_missing_results_fails() {
        let (tmp, config, _) = workspace();
        let missing = tmp.path().join("nope.json");
        let out = tmp.path().join("report.txt");

        let result = run_args(&[
            "report",
            "--config",
            config.to_str().unwrap(),
            "--results",
            missing.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_list_command_writes_plan() {
        let (tmp, config, _) = workspace();
        let out = tmp.path().join("plan.txt");

        run_args(&[
            "list",
            "--config",
            config.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();

        let plan = std::fs::read_to_string(&out).unwrap();
        assert!(plan.starts_with("matrixbench plan:\n├── Serialize Location\n"));
        assert!(plan.contains("│   ├── Serialize Location Default (baseline)\n"));
        assert!(plan.contains("$ ./bench Serialize Jil Location\n"));
        assert!(plan.ends_with("2 jobs × 4 repetitions = 8 invocations.\n"));
    }

    #[test]
    fn test_init_command_writes_default_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join(CONFIG_FILE_NAME);

        run_args(&["init", "--output", out.to_str().unwrap()]).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, MatrixConfig::default_toml());
        assert!(MatrixConfig::load(&out).unwrap().validate().is_ok());
    }

    #[test]
    fn test_init_ignores_broken_config() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("broken.toml");
        std::fs::write(&broken, "[runner]\nrepetitions = 0\n").unwrap();
        let out = tmp.path().join("fresh.toml");

        run_args(&[
            "init",
            "--config",
            broken.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            MatrixConfig::default_toml()
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (tmp, _, results) = workspace();
        let config = tmp.path().join("zero.toml");
        std::fs::write(&config, SMALL_CONFIG.replace("repetitions = 4", "repetitions = 0"))
            .unwrap();
        let out = tmp.path().join("report.txt");

        let err = run_args(&[
            "report",
            "--config",
            config.to_str().unwrap(),
            "--results",
            results.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroRepetitions)
        );
        assert!(!out.exists());
    }
}
