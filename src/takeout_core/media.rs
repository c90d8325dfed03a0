use std::collections::BTreeSet;
use std::path::Path;

/// What the pipeline does with a cataloged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Capture time is synchronized from the sidecar, then the sidecar is archived.
    Update,
    /// Only relocated into the archive tree.
    ArchiveOnly,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Update => "update",
            MediaKind::ArchiveOnly => "archive-only",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A set of lower-case file extensions, stored without the leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Build a set from settings entries such as ".jpg", "JPG" or "jpeg".
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = entries
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Check whether the final extension of `path` is in the set (case insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }
}

/// Lower-cased final extension of a path, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Classify a file against the configured extension sets.
/// The update set wins when an extension is listed in both.
pub fn classify(path: &Path, update: &ExtensionSet, archive_only: &ExtensionSet) -> Option<MediaKind> {
    if update.matches(path) {
        Some(MediaKind::Update)
    } else if archive_only.matches(path) {
        Some(MediaKind::ArchiveOnly)
    } else {
        None
    }
}
