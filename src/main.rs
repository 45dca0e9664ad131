use reelvault::{
    cli::Cli,
    config,
    controller::{Controller, RunReport},
};
use reelvault_av::SystemRunner;
use reelvault_core::Error;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::sync::Arc;

async fn run(config: config::RunConfig) -> reelvault_core::Result<RunReport> {
    let mut controller = Controller::new(config, Arc::new(SystemRunner))?;
    controller.run().await
}

fn print_usage() {
    println!("{}", Cli::command().render_help());
    println!();
}

fn report_failure(err: &Error) -> ExitCode {
    if err.is_configuration() {
        print_usage();
    }
    eprintln!("{err}");
    ExitCode::from(err.exit_code())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelvault=debug,reelvault_av=debug,reelvault_core=debug".to_string()
        } else {
            "reelvault=info,reelvault_av=info,reelvault_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = match config::resolve(&cli) {
        Ok(config) => config,
        Err(err) => return Ok(report_failure(&err)),
    };

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(run(config)) {
        Ok(report) => {
            tracing::info!(
                "Ingested {} file(s), ignored {}, encodes {} {}",
                report.processed,
                report.ignored,
                if report.ephemeral { "were staged in" } else { "kept in" },
                report.workspace.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(report_failure(&err)),
    }
}
