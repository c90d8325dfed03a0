use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::paths::ArchiveLayout;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Sidecar extension appended to the full media file name.
pub const SIDECAR_EXTENSION: &str = "json";

/// The parts of a Takeout sidecar that matter here. Everything else in the
/// document is ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SidecarRecord {
    #[serde(default)]
    photo_taken_time: Option<TakenTime>,
}

#[derive(Deserialize, Debug)]
struct TakenTime {
    timestamp: Value, // Either "1577880000" or 1577880000
}

impl SidecarRecord {
    /// Read and parse a sidecar from disk.
    ///
    /// Failing to read the file is an I/O error; anything wrong with its
    /// contents, bad encoding included, is a per-file metadata error.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read(path)?;
        Self::parse(&contents).map_err(|reason| TakeoutError::metadata(path, reason))
    }

    fn parse(contents: impl AsRef<[u8]>) -> std::result::Result<Self, String> {
        serde_json::from_slice(contents.as_ref()).map_err(|e| e.to_string())
    }

    /// Capture time in Unix seconds, if the sidecar carries a usable one.
    pub fn photo_taken_time(&self) -> Option<i64> {
        self.photo_taken_time
            .as_ref()
            .and_then(|t| value_to_i64(&t.timestamp))
    }
}

/// Helper to extract i64 from Value (handles both string and number)
fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the capture timestamp recorded in a sidecar.
pub fn read_photo_taken_time(path: &Path) -> Result<i64> {
    SidecarRecord::read(path)?
        .photo_taken_time()
        .ok_or_else(|| TakeoutError::metadata(path, "missing or invalid photoTakenTime.timestamp"))
}

/// Sidecar path next to a media file.
///
/// Example: "Album/photo.jpg" -> "Album/photo.jpg.json"
pub fn sidecar_path_for(media_path: &Path) -> Option<PathBuf> {
    let name = media_path.file_name()?.to_str()?;
    let parent = media_path.parent().unwrap_or_else(|| Path::new(""));
    Some(parent.join(format!("{}.{}", name, SIDECAR_EXTENSION)))
}

/// Find the sidecar of a media file.
///
/// Looks next to the media file first, then in the media file's archive
/// directory where an earlier run may already have moved it. `None` means the
/// media file has no sidecar.
pub fn locate_sidecar(media_path: &Path, layout: &ArchiveLayout) -> Result<Option<PathBuf>> {
    let Some(candidate) = sidecar_path_for(media_path) else {
        return Ok(None);
    };

    if candidate.is_file() {
        return Ok(Some(candidate));
    }

    let Some(name) = candidate.file_name() else {
        return Ok(None);
    };
    let archived = layout.archive_dir(media_path)?.join(name);
    if archived.is_file() {
        log::debug!("Sidecar of {} found in archive", media_path.display());
        return Ok(Some(archived));
    }

    Ok(None)
}
