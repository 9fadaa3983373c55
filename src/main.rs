use std::process::ExitCode;

use clap::Parser;
use sff_notes::cli::{self, Cli};
use sff_notes::NotesError;
use sff_notes::config::ConfigSource;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = ConfigSource::select(cli.config_path.as_deref(), cli.shipped_configs);
    let config = match source.load() {
        Ok(config) => config,
        Err(e) => {
            let e = NotesError::Config(e);
            eprintln!("Configuration error ({}): {}", source, e);
            return ExitCode::from(e.kind().exit_code());
        }
    };

    let level = if cli.verbose {
        log::LevelFilter::Debug.max(config.log_level.to_level_filter())
    } else {
        config.log_level.to_level_filter()
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("Using configuration from {}", source);

    match cli::run(cli, config, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.kind().exit_code())
        }
    }
}
