use anyhow::Result;
use clap::Parser;
use levelwatch::config::Config;
use levelwatch::service::{run_checks, worst_state};
use levelwatch::snapshot::Snapshot;
use levelwatch::store::{file, FileStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "levelwatch", about = "Filesystem capacity and temperature checks", version)]
struct Cli {
    /// JSON snapshot of filesystems and sensors ("-" reads stdin). Default: mounted filesystems of this machine
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Config file (default: <config dir>/levelwatch/levelwatch.toml)
    #[arg(short = 'c', long)]
    config_file: Option<PathBuf>,

    /// Value store for trends (default: <data dir>/levelwatch/value_store.json)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Print the service results as JSON instead of plugin text
    #[arg(long)]
    json: bool,

    /// Print config file path and effective values, then exit
    #[arg(long)]
    print_config: bool,

    /// Run the checks without saving the value store
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("LEVELWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::load(cli.config_file.as_deref())?;
    if cli.print_config {
        return run_print_config(&cli, &cfg);
    }

    let code = run_check(&cli, &cfg)?;
    std::process::exit(code);
}

fn run_print_config(cli: &Cli, cfg: &Config) -> Result<()> {
    let path = cli.config_file.clone()
        .or_else(Config::config_path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("# Config: {}", path);
    println!("# Value store: {}", state_path(cli, cfg).map(|p| p.display().to_string()).unwrap_or_else(|| "(none)".into()));
    println!();
    print!("{}", cfg.to_toml()?);
    Ok(())
}

fn state_path(cli: &Cli, cfg: &Config) -> Option<PathBuf> {
    cli.state_file.clone()
        .or_else(|| cfg.general.state_file.clone())
        .or_else(file::default_path)
}

/// One-shot check: prints one line per service and returns the exit code
/// of the worst state (0 OK, 1 WARN, 2 CRIT, 3 UNKNOWN).
fn run_check(cli: &Cli, cfg: &Config) -> Result<i32> {
    let snapshot = match &cli.input {
        Some(path) => Snapshot::from_path(path)?,
        None       => Snapshot::local(&cfg.general.exclude)?,
    };

    let mut store = match state_path(cli, cfg) {
        Some(path) => FileStore::load(&path),
        None       => FileStore::default(),
    };
    let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    let reports = run_checks(&snapshot, cfg, &mut store, now)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        println!("UNKNOWN - nothing to check");
        return Ok(3);
    } else {
        for report in &reports {
            println!("{}", report.render());
        }
    }

    if !cli.dry_run {
        if let Err(e) = store.save() {
            tracing::warn!(error = %e, "could not save value store");
        }
    }
    tracing::debug!(entries = store.len(), "value store updated");
    Ok(worst_state(&reports).exit_code())
}
