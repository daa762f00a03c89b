//! warescan - samples warehouse tables, scans them for PI, and reports.

use tracing::{error, info, warn};
use warescan::cli::Cli;
use warescan::config::{load_table_list, Credentials};
use warescan::error::Result;
use warescan::pipeline::Pipeline;
use warescan::scan::HttpScanService;
use warescan::{logging, report, warehouse};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.to_run_config()?;

    let credentials = Credentials::load(&cli.credentials)?;
    let tables = load_table_list(&cli.tables)?;
    info!(
        "Scanning {} table(s) from {}",
        tables.len(),
        credentials.display_string()
    );

    let warehouse = warehouse::connect(&credentials).await?;
    let scanner = HttpScanService::new(&config.base_url, &credentials.api_key)?;

    let pipeline = Pipeline::new(warehouse.as_ref(), &scanner, &config);
    let details = pipeline.run(&tables).await?;

    warehouse.close().await?;

    if cli.output.exists() {
        warn!("Overwriting existing report file {}", cli.output.display());
    }
    report::write_report(&details, &cli.output)?;

    info!("All tables processed successfully");
    Ok(())
}
