use crate::takeout_core::archive::archive_file;
use crate::takeout_core::error::Result;
use crate::takeout_core::paths::is_bulk_folder;
use crate::takeout_core::pipeline::RunStats;
use crate::takeout_core::settings::RunConfig;
use crate::takeout_core::sidecar::locate_sidecar;
use indicatif::ProgressBar;
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// What to do with one group of same-named files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupDecision {
    /// Only one file carries this name.
    Unique,
    /// Exactly one copy lives outside the bulk folders; the bulk copies are redundant.
    Archive {
        canonical: PathBuf,
        redundant: Vec<PathBuf>,
    },
    /// No single canonical copy can be told apart. Leave the group alone.
    Ambiguous,
}

/// Group files by exact (case sensitive) file name, ignoring their directory.
pub fn group_by_name(files: &[PathBuf]) -> BTreeMap<OsString, Vec<PathBuf>> {
    let mut groups: BTreeMap<OsString, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        if let Some(name) = file.file_name() {
            groups.entry(name.to_os_string()).or_default().push(file.clone());
        }
    }
    groups
}

/// Decide a group's fate from its composition alone.
pub fn decide(group: &[PathBuf], bulk_marker: &str) -> DedupDecision {
    if group.len() < 2 {
        return DedupDecision::Unique;
    }

    let (redundant, curated): (Vec<PathBuf>, Vec<PathBuf>) = group
        .iter()
        .cloned()
        .partition(|f| f.parent().is_some_and(|p| is_bulk_folder(p, bulk_marker)));

    match <[PathBuf; 1]>::try_from(curated) {
        Ok([canonical]) => DedupDecision::Archive {
            canonical,
            redundant,
        },
        Err(_) => DedupDecision::Ambiguous,
    }
}

/// Removes redundant bulk-folder copies from the working set.
pub struct DuplicateResolver<'a> {
    config: &'a RunConfig,
}

impl<'a> DuplicateResolver<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Archive redundant duplicates (and their sidecars) and return the
    /// remaining files in their original order.
    pub fn resolve(
        &self,
        files: Vec<PathBuf>,
        stats: &mut RunStats,
        bar: &ProgressBar,
    ) -> Result<Vec<PathBuf>> {
        let groups = group_by_name(&files);
        bar.set_length(groups.len() as u64);

        let mut removed: HashSet<PathBuf> = HashSet::new();

        for (name, group) in &groups {
            match decide(group, &self.config.bulk_marker) {
                DedupDecision::Unique => {}
                DedupDecision::Ambiguous => {
                    log::info!(
                        "{} copies of {:?} but no single canonical copy, leaving them",
                        group.len(),
                        name
                    );
                }
                DedupDecision::Archive {
                    canonical,
                    redundant,
                } => {
                    log::info!(
                        "{} duplicates of {}",
                        redundant.len(),
                        canonical.display()
                    );
                    for duplicate in redundant {
                        self.archive_duplicate(&duplicate, stats)?;
                        removed.insert(duplicate);
                    }
                }
            }
            bar.inc(1);
        }

        Ok(files.into_iter().filter(|f| !removed.contains(f)).collect())
    }

    /// Archive a duplicate, then its sidecar if it has one.
    fn archive_duplicate(&self, duplicate: &Path, stats: &mut RunStats) -> Result<()> {
        let layout = &self.config.layout;
        let sidecar = locate_sidecar(duplicate, layout)?;

        if archive_file(duplicate, layout)? {
            stats.deduplicated += 1;
        }
        if let Some(sidecar) = sidecar {
            if archive_file(&sidecar, layout)? {
                stats.archived += 1;
            }
        }
        Ok(())
    }
}
