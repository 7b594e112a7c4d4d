use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use stockta::adapters::file_config_adapter::FileConfigAdapter;
use stockta::cli::{run, Cli};
use stockta::ports::config_port::ConfigPort;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `[logging] level` from the config, else `warn`.
fn init_logging(config_path: &Path) {
    let level = FileConfigAdapter::from_file(config_path)
        .ok()
        .and_then(|config| config.get_string("logging", "level"))
        .unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.command.config_path());
    run(cli)
}
