mod artifacts;
mod config;
mod report;

use {
    crate::config::{Config, ReportFormat},
    abacus_checker::{AlloyReader, CoreInvariantChecker},
    anyhow::bail,
    clap::Parser,
    config_parser::parse_config,
    std::path::PathBuf,
    tracing::metadata::LevelFilter,
};

/// Checks that the Abacus core contracts deployed on every domain agree with
/// each other.
#[derive(Parser)]
#[command(author, version, about, next_display_order = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "abacus.toml")]
    config: PathBuf,

    /// Deployment records to check [default: from the config file]
    #[arg(long)]
    deployments: Option<PathBuf>,

    /// Directory to write verification inputs to [default: from the config file]
    #[arg(long)]
    verification_dir: Option<PathBuf>,

    /// How to print the report [default: from the config file]
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The `.env` file is optional.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut cfg: Config = parse_config(&cli.config)?;
    cfg.deployments = cli.deployments.unwrap_or(cfg.deployments);
    cfg.verification_dir = cli.verification_dir.or(cfg.verification_dir);
    cfg.format = cli.format.unwrap_or(cfg.format);

    // Logs go to stderr so that a JSON report on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_max_level(cfg.log_level.parse::<LevelFilter>()?)
        .with_writer(std::io::stderr)
        .init();

    let deploys = artifacts::load_deploys(&cfg.deployments)?;

    tracing::info!(
        path = %cfg.deployments.display(),
        domains = deploys.len(),
        "Loaded deployment records"
    );

    let reader = AlloyReader::connect_http(&deploys, &cfg.rpc_urls);
    let checker = CoreInvariantChecker::core(reader, deploys);

    if let Some(dir) = &cfg.verification_dir {
        artifacts::write_verification_inputs(&checker, dir)?;
    }

    let report = checker.run_all().await?;

    match cfg.format {
        ReportFormat::Text => print!("{}", report::render_text(&report, checker.deploys())),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.is_consistent() {
        bail!("deployment is inconsistent: {} violation(s)", report.len());
    }

    Ok(())
}
