use anyhow::Result;
use std::process::ExitCode;
use std::thread;
use tokencook::error::CANCELLED_EXIT_CODE;
use tokencook::{Config, Pipeline, ProgressSink, RunError, RunOutcome, Tokenizer};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_cli();
    match run(config) {
        Ok(RunOutcome::Completed(summary)) => {
            println!("Output directory: {}", summary.output_dir.display());
            println!("Manifest: {}", summary.manifest_path.display());
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Cancelled) => {
            eprintln!("cancelled: processing was cancelled, no output written");
            ExitCode::from(CANCELLED_EXIT_CODE as u8)
        }
        Err(err) => {
            match err.downcast_ref::<RunError>() {
                Some(run_err) => {
                    eprintln!("error [{}]: {run_err}", run_err.category());
                    ExitCode::from(run_err.exit_code() as u8)
                }
                None => {
                    eprintln!("error [internal]: {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Run the pipeline on a worker thread while this thread drains progress.
fn run(config: Config) -> Result<RunOutcome> {
    config.validate()?;
    let tokenizer = Tokenizer::from_encoding(&config.encoding)?;
    let (sink, events) = ProgressSink::channel();
    let quiet = config.quiet;

    let worker = thread::spawn(move || Pipeline::new(&config, &tokenizer).with_progress(sink).run());
    for event in events {
        if quiet {
            continue;
        }
        match (event.current, event.total) {
            (Some(cur), Some(total)) => eprintln!("[{cur}/{total}] {}", event.message),
            _ => eprintln!("{}", event.message),
        }
    }
    let outcome = worker
        .join()
        .map_err(|_| anyhow::anyhow!("pipeline thread panicked"))??;
    Ok(outcome)
}
