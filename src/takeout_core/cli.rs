use crate::takeout_core::settings::RunOverrides;
use clap::{Args, Parser, Subcommand};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconcile a Google Photos Takeout export: deduplicate, fix capture dates, archive sidecars"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable file logging under logs/
    #[arg(long = "log", global = true)]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug, global = true)]
    pub log_level: LevelFilter,

    /// Settings file (defaults to ./settings.json when present)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deduplicate, synchronize and archive the files of an export folder
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Folder to be deep-searched (defaults to DEFAULT_TARGET_DIR)
    pub directory: Option<PathBuf>,

    /// Find and archive duplicates
    #[arg(long, overrides_with = "no_dedup")]
    pub dedup: bool,

    /// Skip the deduplication phase
    #[arg(long, overrides_with = "dedup")]
    pub no_dedup: bool,

    /// Synchronize capture dates from sidecars and archive the sidecars
    #[arg(long, overrides_with = "no_update")]
    pub update: bool,

    /// Skip the update phase
    #[arg(long, overrides_with = "update")]
    pub no_update: bool,

    /// Archive files listed in FILES_TO_ARCHIVE
    #[arg(long, overrides_with = "no_archive")]
    pub archive: bool,

    /// Skip the archive phase
    #[arg(long, overrides_with = "archive")]
    pub no_archive: bool,

    /// Interpret sidecar timestamps in UTC instead of local time
    #[arg(long)]
    pub utc: bool,
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl RunArgs {
    /// Values that take precedence over the settings file.
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            directory: self.directory.clone(),
            dedup: toggle(self.dedup, self.no_dedup),
            update: toggle(self.update, self.no_update),
            archive: toggle(self.archive, self.no_archive),
            utc: self.utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Run(args) => args,
        }
    }

    #[test]
    fn test_toggles_default_to_settings() {
        let overrides = run_args(&["takeout-sync", "run"]).overrides();
        assert_eq!(overrides.directory, None);
        assert_eq!(overrides.dedup, None);
        assert_eq!(overrides.update, None);
        assert_eq!(overrides.archive, None);
        assert!(!overrides.utc);
    }

    #[test]
    fn test_toggles_override_settings() {
        let overrides =
            run_args(&["takeout-sync", "run", "/photos", "--no-dedup", "--update", "--utc"]).overrides();
        assert_eq!(overrides.directory, Some(PathBuf::from("/photos")));
        assert_eq!(overrides.dedup, Some(false));
        assert_eq!(overrides.update, Some(true));
        assert_eq!(overrides.archive, None);
        assert!(overrides.utc);
    }

    #[test]
    fn test_last_toggle_wins() {
        let overrides = run_args(&["takeout-sync", "run", "--dedup", "--no-dedup"]).overrides();
        assert_eq!(overrides.dedup, Some(false));
        let overrides = run_args(&["takeout-sync", "run", "--no-archive", "--archive"]).overrides();
        assert_eq!(overrides.archive, Some(true));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "takeout-sync",
            "run",
            "--log",
            "--log-level",
            "info",
            "--settings",
            "my.json",
        ])
        .unwrap();
        assert!(cli.log);
        assert_eq!(cli.log_level, LevelFilter::Info);
        assert_eq!(cli.settings, Some(PathBuf::from("my.json")));
    }
}
