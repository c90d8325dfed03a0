use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::exif::CaptureZone;
use crate::takeout_core::media::ExtensionSet;
use crate::takeout_core::paths::ArchiveLayout;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the current directory when none is given.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Defaults loaded from the JSON settings file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Settings {
    /// Extensions whose capture time is synchronized from the sidecar.
    pub files_to_update: Vec<String>,
    /// Extensions that are only moved into the archive.
    pub files_to_archive: Vec<String>,
    /// Extensions carrying embedded EXIF date tags.
    pub taggable_files: Vec<String>,
    pub archive_folder_name: String,
    pub default_target_dir: Option<PathBuf>,
    /// Substring identifying bulk export folders, e.g. "Photos from 2020".
    pub bulk_folder_marker: String,
    pub deduplicate_files: bool,
    pub update_files: bool,
    pub archive_files: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            files_to_update: [".jpg", ".jpeg", ".png", ".heic", ".gif", ".mp4", ".mov"]
                .map(String::from)
                .to_vec(),
            files_to_archive: Vec::new(),
            taggable_files: vec![".jpg".to_string(), ".jpeg".to_string()],
            archive_folder_name: "Archive".to_string(),
            default_target_dir: None,
            bulk_folder_marker: "Photos from".to_string(),
            deduplicate_files: true,
            update_files: true,
            archive_files: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| TakeoutError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings: Settings =
            serde_json::from_str(&contents).map_err(|e| TakeoutError::Settings {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        settings.validate(path)?;
        Ok(settings)
    }

    /// Use `explicit` if given, otherwise `settings.json` in the current
    /// directory if present, otherwise the built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(SETTINGS_FILE_NAME);
                if local.is_file() {
                    log::info!("Loading settings from {}", local.display());
                    Self::load(local)
                } else {
                    log::debug!("No {} found, using default settings", SETTINGS_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let name = self.archive_folder_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(TakeoutError::Settings {
                path: path.to_path_buf(),
                reason: format!(
                    "ARCHIVE_FOLDER_NAME must be a single folder name, got {:?}",
                    self.archive_folder_name
                ),
            });
        }
        Ok(())
    }
}

/// Which pipeline phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phases {
    pub dedup: bool,
    pub update: bool,
    pub archive: bool,
}

impl Phases {
    pub fn enabled_count(&self) -> usize {
        [self.dedup, self.update, self.archive]
            .into_iter()
            .filter(|on| *on)
            .count()
    }
}

/// Command line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub directory: Option<PathBuf>,
    pub dedup: Option<bool>,
    pub update: Option<bool>,
    pub archive: Option<bool>,
    pub utc: bool,
}

/// Fully resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: ArchiveLayout,
    pub update_extensions: ExtensionSet,
    pub archive_extensions: ExtensionSet,
    pub taggable_extensions: ExtensionSet,
    pub bulk_marker: String,
    pub phases: Phases,
    /// Zone used to turn sidecar timestamps into EXIF date strings.
    pub zone: CaptureZone,
}

impl RunConfig {
    /// Resolve settings and overrides into a run configuration.
    /// Fails before any I/O other than checking the target directory.
    pub fn resolve(settings: &Settings, overrides: RunOverrides) -> Result<Self> {
        let directory = overrides
            .directory
            .or_else(|| settings.default_target_dir.clone())
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or(TakeoutError::MissingTarget)?;

        if !directory.is_dir() {
            return Err(TakeoutError::InvalidTarget(directory));
        }
        let target_dir = directory
            .canonicalize()
            .map_err(|_| TakeoutError::InvalidTarget(directory.clone()))?;

        let layout = ArchiveLayout::new(&target_dir, settings.archive_folder_name.trim())?;

        Ok(Self {
            layout,
            update_extensions: ExtensionSet::new(&settings.files_to_update),
            archive_extensions: ExtensionSet::new(&settings.files_to_archive),
            taggable_extensions: ExtensionSet::new(&settings.taggable_files),
            bulk_marker: settings.bulk_folder_marker.clone(),
            phases: Phases {
                dedup: overrides.dedup.unwrap_or(settings.deduplicate_files),
                update: overrides.update.unwrap_or(settings.update_files),
                archive: overrides.archive.unwrap_or(settings.archive_files),
            },
            zone: if overrides.utc {
                CaptureZone::Utc
            } else {
                CaptureZone::Local
            },
        })
    }

    pub fn target_dir(&self) -> &Path {
        self.layout.working_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("settings.json");
        file.write_str(
            r#"{
                "FILES_TO_UPDATE": [".jpg", ".mp4"],
                "FILES_TO_ARCHIVE": [".html"],
                "ARCHIVE_FOLDER_NAME": "ToDelete",
                "DEDUPLICATE_FILES": false
            }"#,
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.files_to_update, vec![".jpg", ".mp4"]);
        assert_eq!(settings.files_to_archive, vec![".html"]);
        assert_eq!(settings.archive_folder_name, "ToDelete");
        assert!(!settings.deduplicate_files);
        assert!(settings.update_files);
        assert_eq!(settings.bulk_folder_marker, "Photos from");
        assert_eq!(settings.default_target_dir, None);
    }

    #[test]
    fn test_malformed_settings() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("settings.json");
        file.write_str("{ nope").unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(TakeoutError::Settings { .. })
        ));

        file.write_str(r#"{"ARCHIVE_FOLDER_NAME": "a/b"}"#).unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(TakeoutError::Settings { .. })
        ));

        assert!(Settings::load(&temp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_resolve_requires_target() {
        let err = RunConfig::resolve(&Settings::default(), RunOverrides::default()).unwrap_err();
        assert!(matches!(err, TakeoutError::MissingTarget));

        let temp = TempDir::new().unwrap();
        let overrides = RunOverrides {
            directory: Some(temp.path().join("nope")),
            ..Default::default()
        };
        let err = RunConfig::resolve(&Settings::default(), overrides).unwrap_err();
        assert!(matches!(err, TakeoutError::InvalidTarget(_)));
    }

    #[test]
    fn test_resolve_uses_default_target_and_overrides() {
        let temp = TempDir::new().unwrap();
        temp.child("Takeout").create_dir_all().unwrap();

        let settings = Settings {
            default_target_dir: Some(temp.path().join("Takeout")),
            archive_files: false,
            ..Default::default()
        };
        let overrides = RunOverrides {
            dedup: Some(false),
            utc: true,
            ..Default::default()
        };

        let config = RunConfig::resolve(&settings, overrides).unwrap();
        let root = temp.path().canonicalize().unwrap();
        assert_eq!(config.target_dir(), root.join("Takeout"));
        assert_eq!(config.layout.archive_root(), root.join("Archive"));
        assert_eq!(
            config.phases,
            Phases {
                dedup: false,
                update: true,
                archive: false
            }
        );
        assert_eq!(config.phases.enabled_count(), 1);
        assert_eq!(config.zone, CaptureZone::Utc);
        assert!(config.taggable_extensions.matches(Path::new("a.JPG")));
    }
}
