use bank_match::config::LoggingSettings;
use bank_match::etl::convert_json_to_csv;
use bank_match::telemetry;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "convert-json-to-csv",
    about = "Convert research JSON to the normalized product CSV",
    version
)]
struct Cli {
    /// Path to input JSON file
    input: PathBuf,
    /// Path to output CSV file
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init_cli(&LoggingSettings::default()) {
        eprintln!("[ERROR] {}", e);
        return ExitCode::FAILURE;
    }

    match convert_json_to_csv(&cli.input, &cli.output) {
        Ok(count) => {
            println!("Converted {} products into {}", count, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
