//! querymeter - synthetic statement workload runner.
//!
//! Replays a catalogue of statements across worker threads through an
//! instrumented timing collector and prints the resulting registry.

mod config;
mod formatter;
mod workload;

use clap::Parser;
use querymeter_core::new_shared_registry;

use config::Args;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querymeter=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let format = args.format;
    let config = args.into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        duration_unit = %config.collector.duration_unit,
        rate_unit = %config.collector.rate_unit,
        "configuration loaded"
    );

    let registry = new_shared_registry();
    let summary = workload::run(&config, registry.clone())?;

    let formatter = formatter::create_formatter(format);
    println!("{}", formatter.format_metrics(&registry.grouped_metrics()));

    tracing::info!(
        statements = summary.statements,
        elapsed_ms = summary.elapsed_ms as u64,
        "done"
    );
    Ok(())
}
