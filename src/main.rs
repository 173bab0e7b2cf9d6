use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use phpantom_refactor::config::Config;
use phpantom_refactor::rule::AssertIssetToSpecificMethodRule;
use phpantom_refactor::{FileReport, RefactorError, Workspace, runner};

#[derive(Parser)]
#[command(
    name = "phpantom-refactor",
    version,
    about = "Turns assertTrue(isset(...)) / assertFalse(isset(...)) in PHPUnit tests into the specific assertion"
)]
struct Cli {
    /// Files or directories to process (default: `paths` from the config).
    paths: Vec<PathBuf>,

    /// Project root holding composer.json (default: current directory).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/phpantom-refactor.toml, then the user
    /// config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report what would change without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Describe the available rule and exit.
    #[arg(long)]
    list_rules: bool,

    /// More log output (-v debug, -vv trace).  RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let directive = match verbose {
        0 => "warn",
        1 => "phpantom_refactor=debug",
        _ => "phpantom_refactor=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn list_rules(json: bool) -> Result<(), RefactorError> {
    let definition = AssertIssetToSpecificMethodRule::describe();
    if json {
        println!("{}", serde_json::to_string_pretty(&[definition])?);
        return Ok(());
    }

    println!("{}", definition.name);
    println!("    {}", definition.description);
    for sample in &definition.samples {
        println!();
        println!("    - {}", sample.before);
        println!("    + {}", sample.after);
    }
    Ok(())
}

fn print_reports(reports: &[FileReport], json: bool, dry_run: bool) -> Result<(), RefactorError> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    let mut total = 0;
    for report in reports {
        for rewrite in &report.rewrites {
            println!("{}:{}", report.path.display(), rewrite.line);
            println!("    - {}", rewrite.before);
            println!("    + {}", rewrite.after);
            total += 1;
        }
    }
    let verb = if dry_run { "would rewrite" } else { "rewrote" };
    println!("{} {} call(s) in {} file(s)", verb, total, reports.len());
    Ok(())
}

fn run(cli: Cli) -> Result<(), RefactorError> {
    if cli.list_rules {
        return list_rules(cli.json);
    }

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().map_err(|e| RefactorError::io(".", e))?,
    };
    let config = Config::load(cli.config.as_deref(), &root)?;
    let paths = if cli.paths.is_empty() {
        config.paths.clone()
    } else {
        cli.paths
    };

    let workspace =
        Workspace::with_root(&root).with_test_case_classes(config.test_case_classes.clone());
    let files = runner::discover_files(&root, &paths, &config)?;
    tracing::info!("processing {} file(s)", files.len());

    let reports = runner::run(&workspace, &files, cli.dry_run)?;
    print_reports(&reports, cli.json, cli.dry_run)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
