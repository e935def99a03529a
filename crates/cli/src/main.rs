mod doctor_commands;

use std::path::Path;

use {
    argus_config::{Severity, SuiteConfig},
    argus_runner::Pipeline,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "argus", about = "Visual regression testing for web pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides the argus.{toml,yaml,json} discovery).
    #[arg(long, global = true, env = "ARGUS_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Restrict the run to a single page id from the catalog.
    #[arg(long, global = true)]
    page: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every cataloged page and compare it against the baseline set
    /// (default when no subcommand is provided).
    Compare,
    /// Capture the baseline snapshot set the next runs compare against.
    Baseline,
    /// Environment health check: config, browser, snapshot coverage.
    Doctor,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load and validate the suite config for a run.
///
/// Unlike [`argus_config::discover_and_load`], a broken or missing config is
/// a hard error here: both `baseline` and `compare` are useless without a
/// page catalog, so failing early beats running an empty suite.
fn load_suite(explicit: Option<&Path>) -> anyhow::Result<SuiteConfig> {
    let discovered;
    let path = match explicit {
        Some(p) => Some(p),
        None => {
            discovered = argus_config::find_config_file();
            discovered.as_deref()
        },
    };

    let Some(path) = path else {
        anyhow::bail!(
            "no config file found (argus.toml, argus.yaml, or argus.json); \
             create one with a [[pages]] catalog or pass --config"
        );
    };

    let result = argus_config::validate::validate(Some(path));
    if result.has_errors() {
        for d in &result.diagnostics {
            if d.severity != Severity::Error {
                continue;
            }
            if d.path.is_empty() {
                eprintln!("error: {}", d.message);
            } else {
                eprintln!("error: {}: {}", d.path, d.message);
            }
        }
        anyhow::bail!("invalid config: {}", path.display());
    }

    argus_config::load_config(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "argus starting");

    match cli.command {
        // Default: compare when no subcommand is provided.
        None | Some(Commands::Compare) => {
            let config = load_suite(cli.config.as_deref())?;
            let pipeline = Pipeline::new(&config);
            let records = pipeline.run_compare(cli.page.as_deref()).await?;

            let changed = records.iter().filter(|r| r.changed()).count();
            println!("Compared {} page(s): {changed} changed.", records.len());
            println!(
                "Report: {}",
                pipeline.store().report_path(&config.report.path).display()
            );
            Ok(())
        },
        Some(Commands::Baseline) => {
            let config = load_suite(cli.config.as_deref())?;
            let pipeline = Pipeline::new(&config);
            pipeline.capture_baseline(cli.page.as_deref()).await?;

            let dir = config.snapshots.root.join(&config.snapshots.baseline_dir);
            println!("Baseline snapshots written under {}.", dir.display());
            Ok(())
        },
        Some(Commands::Doctor) => doctor_commands::handle_doctor(cli.config.as_deref()).await,
    }
}
