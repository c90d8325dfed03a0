use crate::takeout_core::error::{Result, TakeoutError};
use chrono::TimeZone as _;
use exiftool::ExifTool;
use serde::Deserialize;
use std::path::Path;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Date format used in EXIF data.
pub const EXIF_DATE_FORMAT: &[time::format_description::FormatItem] =
    time::macros::format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

const EXIF_DAY_FORMAT: &[time::format_description::FormatItem] =
    time::macros::format_description!("[year]:[month]:[day]");

/// Tags requested from exiftool when reading. Without group prefixes in the
/// output they come back as ModifyDate, DateTimeOriginal and CreateDate.
const READ_ARGS: &[&str] = &["-IFD0:ModifyDate", "-ExifIFD:DateTimeOriginal", "-ExifIFD:CreateDate"];

/// The moment a photo was taken, pinned to the offset used for EXIF values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime(OffsetDateTime);

impl CaptureTime {
    /// Convert Unix seconds into a capture time at `offset`.
    pub fn from_unix(seconds: i64, offset: UtcOffset) -> Result<Self> {
        let utc = OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|e| TakeoutError::InvalidDate(e.to_string()))?;
        utc.checked_to_offset(offset)
            .map(CaptureTime)
            .ok_or_else(|| TakeoutError::InvalidDate(format!("{} out of range", seconds)))
    }

    /// Convert Unix seconds into a capture time in `zone`.
    pub fn from_unix_in(seconds: i64, zone: CaptureZone) -> Result<Self> {
        Self::from_unix(seconds, zone.offset_at(seconds))
    }

    /// Parse an EXIF date string, interpreting it at `offset`.
    pub fn parse_exif(value: &str, offset: UtcOffset) -> Result<Self> {
        let date_time = PrimitiveDateTime::parse(value.trim(), EXIF_DATE_FORMAT)
            .map_err(|e| TakeoutError::InvalidDate(e.to_string()))?;
        Ok(CaptureTime(date_time.assume_offset(offset)))
    }

    /// Format as `YYYY:MM:DD HH:MM:SS`.
    pub fn to_exif_string(&self) -> Result<String> {
        self.0
            .format(EXIF_DATE_FORMAT)
            .map_err(|e| TakeoutError::InvalidDate(e.to_string()))
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn date(&self) -> Date {
        self.0.date()
    }
}

/// Zone in which sidecar timestamps become wall-clock EXIF values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureZone {
    Utc,
    /// The system zone (`TZ` or /etc/localtime), daylight saving included.
    Local,
}

impl CaptureZone {
    /// Offset in effect at `seconds`, so a winter photo gets the winter
    /// offset whatever the date of the run.
    pub fn offset_at(self, seconds: i64) -> UtcOffset {
        match self {
            CaptureZone::Utc => UtcOffset::UTC,
            CaptureZone::Local => local_offset_at(seconds).unwrap_or_else(|| {
                log::warn!("No local UTC offset for timestamp {}, using UTC", seconds);
                UtcOffset::UTC
            }),
        }
    }
}

fn local_offset_at(seconds: i64) -> Option<UtcOffset> {
    let local = chrono::Local.timestamp_opt(seconds, 0).single()?;
    UtcOffset::from_whole_seconds(local.offset().local_minus_utc()).ok()
}

/// The three EXIF date/time tags kept in sync with the sidecar.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CaptureTags {
    /// IFD0 DateTime, called ModifyDate by exiftool.
    #[serde(default)]
    pub modify_date: Option<String>,
    #[serde(default)]
    pub date_time_original: Option<String>,
    /// ExifIFD DateTimeDigitized, called CreateDate by exiftool.
    #[serde(default)]
    pub create_date: Option<String>,
}

impl CaptureTags {
    /// All three tags set to the same value.
    pub fn uniform(value: &str) -> Self {
        Self {
            modify_date: Some(value.to_string()),
            date_time_original: Some(value.to_string()),
            create_date: Some(value.to_string()),
        }
    }

    /// True only if all three tags exist and fall on `day`.
    /// Unparseable values count as a mismatch.
    pub fn all_on_day(&self, day: Date) -> bool {
        [&self.modify_date, &self.date_time_original, &self.create_date]
            .into_iter()
            .all(|tag| tag.as_deref().and_then(tag_day) == Some(day))
    }
}

fn tag_day(value: &str) -> Option<Date> {
    let day = value.trim().get(..10)?;
    Date::parse(day, EXIF_DAY_FORMAT).ok()
}

/// Read/write access to the capture date tags embedded in image files.
pub trait TagStore {
    /// Read the tag block. Missing tags are `None`; failing to read the file
    /// at all is an error.
    fn read_tags(&mut self, path: &Path) -> Result<CaptureTags>;

    /// Write `value` into all three tags and persist them into the file.
    fn write_tags(&mut self, path: &Path, value: &str) -> Result<()>;
}

/// `TagStore` backed by a persistent exiftool process, started on first use.
#[derive(Default)]
pub struct ExifToolStore {
    exiftool: Option<ExifTool>,
}

impl ExifToolStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut ExifTool> {
        if self.exiftool.is_none() {
            let exiftool = ExifTool::new().map_err(|e| TakeoutError::Exiftool(e.to_string()))?;
            self.exiftool = Some(exiftool);
        }
        self.exiftool
            .as_mut()
            .ok_or_else(|| TakeoutError::Exiftool("exiftool process unavailable".to_string()))
    }
}

impl TagStore for ExifToolStore {
    fn read_tags(&mut self, path: &Path) -> Result<CaptureTags> {
        self.handle()?
            .read_metadata(path, READ_ARGS)
            .map_err(|e| TakeoutError::metadata(path, e))
    }

    fn write_tags(&mut self, path: &Path, value: &str) -> Result<()> {
        let args = write_args(path, value)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let lines = self
            .handle()?
            .execute_lines(&args)
            .map_err(|e| TakeoutError::metadata(path, e))?;

        if lines
            .iter()
            .any(|l| l.trim_start().starts_with("1 image files updated"))
        {
            Ok(())
        } else {
            Err(TakeoutError::metadata(path, lines.join("; ")))
        }
    }
}

/// Arguments for one exiftool invocation writing all three tags in place.
pub fn write_args(path: &Path, value: &str) -> Result<Vec<String>> {
    let path_str = path
        .to_str()
        .ok_or_else(|| TakeoutError::metadata(path, "path is not valid UTF-8"))?;

    Ok(vec![
        "-overwrite_original".to_string(),
        format!("-IFD0:ModifyDate={}", value),
        format!("-ExifIFD:DateTimeOriginal={}", value),
        format!("-ExifIFD:CreateDate={}", value),
        path_str.to_string(),
    ])
}

/// Check if exiftool is available on the system.
pub fn exiftool_available() -> bool {
    std::process::Command::new("exiftool")
        .arg("-ver")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;

    /// In-memory tag store for tests that should not depend on exiftool.
    #[derive(Default)]
    pub(crate) struct MemoryTagStore {
        pub tags: HashMap<PathBuf, CaptureTags>,
        pub writes: Vec<PathBuf>,
        pub unreadable: HashSet<PathBuf>,
    }

    impl TagStore for MemoryTagStore {
        fn read_tags(&mut self, path: &Path) -> Result<CaptureTags> {
            if self.unreadable.contains(path) {
                return Err(TakeoutError::metadata(path, "corrupt tag block"));
            }
            Ok(self.tags.get(path).cloned().unwrap_or_default())
        }

        fn write_tags(&mut self, path: &Path, value: &str) -> Result<()> {
            self.tags.insert(path.to_path_buf(), CaptureTags::uniform(value));
            self.writes.push(path.to_path_buf());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use time::macros::{date, offset};

    #[test]
    fn test_format_capture_time() {
        let t = CaptureTime::from_unix(1_577_880_000, UtcOffset::UTC).unwrap();
        assert_eq!(t.to_exif_string().unwrap(), "2020:01:01 12:00:00");
        assert_eq!(t.date(), date!(2020 - 01 - 01));

        let t = CaptureTime::from_unix(1_577_880_000, offset!(+13)).unwrap();
        assert_eq!(t.to_exif_string().unwrap(), "2020:01:02 01:00:00");
        assert_eq!(t.date(), date!(2020 - 01 - 02));
    }

    #[test]
    fn test_timestamp_round_trip() {
        for seconds in [0, 1_577_880_000, 1_700_000_001, 951_782_399] {
            for off in [UtcOffset::UTC, offset!(+9), offset!(-5:30)] {
                let t = CaptureTime::from_unix(seconds, off).unwrap();
                let parsed = CaptureTime::parse_exif(&t.to_exif_string().unwrap(), off).unwrap();
                assert_eq!(parsed.unix_timestamp(), seconds);
            }
        }
    }

    #[test]
    fn test_parse_exif_rejects_garbage() {
        assert!(CaptureTime::parse_exif("", UtcOffset::UTC).is_err());
        assert!(CaptureTime::parse_exif("0000:00:00 00:00:00", UtcOffset::UTC).is_err());
        assert!(CaptureTime::parse_exif("2020-01-01 12:00:00", UtcOffset::UTC).is_err());
    }

    #[test]
    fn test_tags_compare_at_day_granularity() {
        let day = date!(2020 - 01 - 01);
        assert!(CaptureTags::uniform("2020:01:01 23:59:59").all_on_day(day));

        let mixed = CaptureTags {
            modify_date: Some("2020:01:01 08:00:00".to_string()),
            date_time_original: Some("2020:01:01 09:30:00".to_string()),
            create_date: Some("2020:01:01 10:00:00".to_string()),
        };
        assert!(mixed.all_on_day(day));

        let off_by_one = CaptureTags {
            create_date: Some("2020:01:02 00:00:00".to_string()),
            ..mixed.clone()
        };
        assert!(!off_by_one.all_on_day(day));
    }

    #[test]
    fn test_missing_or_invalid_tag_is_a_mismatch() {
        let day = date!(2020 - 01 - 01);
        assert!(!CaptureTags::default().all_on_day(day));

        let missing_one = CaptureTags {
            create_date: None,
            ..CaptureTags::uniform("2020:01:01 12:00:00")
        };
        assert!(!missing_one.all_on_day(day));

        let zeroed = CaptureTags {
            modify_date: Some("0000:00:00 00:00:00".to_string()),
            ..CaptureTags::uniform("2020:01:01 12:00:00")
        };
        assert!(!zeroed.all_on_day(day));
    }

    #[test]
    fn test_capture_tags_from_exiftool_json() {
        let json = r#"{
            "SourceFile": "photo.jpg",
            "ModifyDate": "2020:01:01 12:00:00",
            "DateTimeOriginal": "2020:01:01 12:00:00"
        }"#;
        let tags: CaptureTags = serde_json::from_str(json).unwrap();
        assert_eq!(tags.modify_date.as_deref(), Some("2020:01:01 12:00:00"));
        assert_eq!(tags.create_date, None);
    }

    #[test]
    fn test_write_args() {
        let args = write_args(Path::new("/t/photo.jpg"), "2020:01:01 12:00:00").unwrap();
        assert_eq!(args[0], "-overwrite_original");
        assert!(args.contains(&"-IFD0:ModifyDate=2020:01:01 12:00:00".to_string()));
        assert!(args.contains(&"-ExifIFD:DateTimeOriginal=2020:01:01 12:00:00".to_string()));
        assert!(args.contains(&"-ExifIFD:CreateDate=2020:01:01 12:00:00".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/t/photo.jpg"));
    }

    /// Smallest well-formed 1x1 grayscale JPEG, without any EXIF block.
    fn tiny_jpeg() -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend([0xFF, 0xDB, 0x00, 0x43, 0x00]);
        jpeg.extend([1u8; 64]);
        jpeg.extend([0xFF, 0xC9, 0x00, 0x0B, 0x08, 0x00, 0x01, 0x00, 0x01, 0x01, 0x01, 0x11, 0x00]);
        jpeg.extend([0xFF, 0xCC, 0x00, 0x06, 0x00, 0x10, 0x10, 0x05]);
        jpeg.extend([0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        jpeg.extend([0xD2, 0xCF, 0x20]);
        jpeg.extend([0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn test_exiftool_store_writes_and_reads_back() {
        if !exiftool_available() {
            eprintln!("exiftool not found, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        let photo = temp.child("photo.jpg");
        photo.write_binary(&tiny_jpeg()).unwrap();

        let mut store = ExifToolStore::new();
        let blank = store.read_tags(photo.path()).unwrap();
        assert_eq!(blank, CaptureTags::default());
        assert!(!blank.all_on_day(date!(2020 - 01 - 01)));

        store.write_tags(photo.path(), "2020:01:01 13:00:00").unwrap();
        let tags = store.read_tags(photo.path()).unwrap();
        assert_eq!(tags, CaptureTags::uniform("2020:01:01 13:00:00"));
        assert!(tags.all_on_day(date!(2020 - 01 - 01)));
    }

    #[test]
    fn test_exiftool_store_reports_unwritable_file() {
        if !exiftool_available() {
            eprintln!("exiftool not found, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        let fake = temp.child("fake.jpg");
        fake.write_str("not an image").unwrap();

        let err = ExifToolStore::new()
            .write_tags(fake.path(), "2020:01:01 13:00:00")
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_utc_zone_has_no_offset() {
        assert_eq!(CaptureZone::Utc.offset_at(1_577_880_000), UtcOffset::UTC);
        assert_eq!(CaptureZone::Utc.offset_at(1_593_604_800), UtcOffset::UTC);
        let t = CaptureTime::from_unix_in(1_593_604_800, CaptureZone::Utc).unwrap();
        assert_eq!(t.to_exif_string().unwrap(), "2020:07:01 12:00:00");
    }
}
