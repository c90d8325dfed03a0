use crate::takeout_core::archive::archive_file;
use crate::takeout_core::catalog::Catalog;
use crate::takeout_core::dedup::DuplicateResolver;
use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::exif::TagStore;
use crate::takeout_core::progress::{Stepper, phase_bar};
use crate::takeout_core::settings::RunConfig;
use crate::takeout_core::sync::Synchronizer;
use std::path::PathBuf;

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub deduplicated: usize,
    pub updated: usize,
    pub skipped: usize,
    pub archived: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} deduplicated files, {} updated files, {} skipped files, {} archived files",
            self.deduplicated, self.updated, self.skipped, self.archived
        )
    }
}

/// Runs catalog -> dedup -> synchronize -> archive over the target directory.
pub struct Pipeline<'a, T: TagStore> {
    config: &'a RunConfig,
    synchronizer: Synchronizer<'a, T>,
}

impl<'a, T: TagStore> Pipeline<'a, T> {
    pub fn new(config: &'a RunConfig, tags: T) -> Self {
        Self {
            config,
            synchronizer: Synchronizer::new(config, tags),
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer<'a, T> {
        &self.synchronizer
    }

    /// Run all enabled phases, counting into `stats`.
    ///
    /// Counters are updated as work completes, so on error `stats` reflects
    /// everything done up to the failure.
    pub fn run(&mut self, stats: &mut RunStats) -> Result<()> {
        let root = self.config.target_dir();
        log::info!("Processing {}", root.display());

        let catalog = Catalog::scan(self.config)?;
        if catalog.is_empty() {
            return Err(TakeoutError::NoFilesFound(root.to_path_buf()));
        }
        println!("{} files to process", catalog.len());
        log::info!("{} files to process", catalog.len());

        let phases = self.config.phases;
        let mut stepper = Stepper::new(phases.enabled_count());
        let mut working = catalog.files_to_update();

        if phases.dedup {
            let bar = phase_bar(working.len(), stepper.next_label("Deduplicating files..."));
            working = DuplicateResolver::new(self.config).resolve(working, stats, &bar)?;
            bar.finish_and_clear();
            log::info!("Deduplication done: {} files left", working.len());
        }

        if phases.update {
            let label = stepper.next_label("Updating files...");
            self.update_files(&working, stats, label)?;
        }

        if phases.archive {
            // Re-walk: phase 2 has moved sidecars around since the first scan.
            let to_archive = Catalog::scan(self.config)?.files_to_archive();
            let label = stepper.next_label("Archiving files...");
            self.archive_files(&to_archive, stats, label)?;
        }

        log::info!("Run complete: {}", stats);
        Ok(())
    }

    /// Synchronize each file with its sidecar, then archive the sidecar.
    fn update_files(&mut self, files: &[PathBuf], stats: &mut RunStats, label: String) -> Result<()> {
        let bar = phase_bar(files.len(), label);

        for file in files {
            log::info!("Updating {}", file.display());

            match self.synchronizer.synchronize(file) {
                Ok(outcome) => {
                    if outcome.is_updated() {
                        stats.updated += 1;
                    } else {
                        stats.skipped += 1;
                    }
                    if let Some(sidecar) = outcome.sidecar() {
                        if archive_file(sidecar, &self.config.layout)? {
                            stats.archived += 1;
                        }
                    }
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {}: {}", file.display(), e);
                    stats.skipped += 1;
                }
                Err(e) => {
                    bar.abandon();
                    log::error!("Update phase stopped at {}: {}", file.display(), e);
                    return Err(e);
                }
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        Ok(())
    }

    /// Move archive-only files into the archive tree.
    fn archive_files(&self, files: &[PathBuf], stats: &mut RunStats, label: String) -> Result<()> {
        let bar = phase_bar(files.len(), label);

        for file in files {
            log::info!("Archiving {}", file.display());
            let archived = archive_file(file, &self.config.layout).inspect_err(|e| {
                log::error!("Archive phase stopped at {}: {}", file.display(), e);
            })?;
            if archived {
                stats.archived += 1;
            } else {
                stats.skipped += 1;
            }
            bar.inc(1);
        }

        bar.finish_and_clear();
        Ok(())
    }
}
