use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phyto_baseline::config::PipelineConfig;
use phyto_baseline::logging::{self, Stage};
use phyto_baseline::{pipeline, table};

/// Aggregate phytoplankton samples and find the most stable five-year period.
#[derive(Debug, Parser)]
#[command(name = "phyto_baseline", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "PHYTO_CONFIG")]
    config: PathBuf,

    /// CSV file of sample records.
    #[arg(long, env = "PHYTO_RECORDS")]
    records: PathBuf,

    /// Directory for aggregated_cells.csv and baseline_report.json.
    #[arg(long, env = "PHYTO_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match PipelineConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = config.logging();
    if let Err(e) = logging::init_logger(options.level, options.file.as_deref(), options.timestamps) {
        eprintln!("✗ failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(Stage::System, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let records = table::read_records(&cli.records)?;
    let report = pipeline::run(&records, config)?;
    // Window failures were already logged; the outputs are still written.
    table::write_outputs(&cli.output_dir, &report)?;
    Ok(())
}
