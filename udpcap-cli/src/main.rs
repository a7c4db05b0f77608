//! udpcap entry point

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use udpcap_cli::{config, driver, Cli, Commands};
use udpcap_core::{Error, Result};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // stdout may carry the capture, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()),
        )
        .init();

    match execute(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("udpcap: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<ExitCode> {
    if let Some(Commands::Inspect { file }) = &cli.command {
        let reader = BufReader::new(open_input(file)?);
        let mut out = io::stdout().lock();
        let summary = driver::inspect(reader, &mut out)?;
        out.flush()?;

        return Ok(if summary.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let options = config::resolve(cli)?;

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(BufReader::new(open_input(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(create_output(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = driver::run(input, output, &options)?;
    info!(
        records = stats.records_written,
        bytes = stats.file_bytes(),
        "capture written"
    );
    Ok(ExitCode::SUCCESS)
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::stream_open(format!("input {}", path.display()), e))
}

fn create_output(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| Error::stream_open(format!("output {}", path.display()), e))
}
