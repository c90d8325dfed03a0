use anyhow::Result;
use clap::Parser;
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use takeout_sync::takeout_core::exif::exiftool_available;
use takeout_sync::takeout_core::{
    Cli, Commands, ExifToolStore, Pipeline, RunConfig, RunStats, Settings, TakeoutError,
};

const LOG_DIR: &str = "logs";

fn log_file_path() -> PathBuf {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    PathBuf::from(LOG_DIR).join(format!("takeout-sync-{}.log", seconds))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        fs::create_dir_all(LOG_DIR)?;
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create(log_file_path())?,
        ));
    }

    CombinedLogger::init(loggers)?;

    match cli.command {
        Commands::Run(args) => {
            let config = match Settings::discover(cli.settings.as_deref())
                .and_then(|settings| RunConfig::resolve(&settings, args.overrides()))
            {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };

            if !config.taggable_extensions.is_empty() && !exiftool_available() {
                log::warn!("exiftool not found in PATH, embedded dates cannot be updated");
            }

            let mut stats = RunStats::default();
            let result = Pipeline::new(&config, ExifToolStore::new()).run(&mut stats);

            match result {
                Ok(()) => {
                    println!("{}", stats);
                    Ok(ExitCode::SUCCESS)
                }
                Err(TakeoutError::NoFilesFound(dir)) => {
                    log::warn!("No files to process in {}", dir.display());
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => {
                    log::error!("Run aborted: {}", e);
                    println!("{}", stats);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
