pub mod archive;
pub mod catalog;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod exif;
pub mod media;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod settings;
pub mod sidecar;
pub mod sync;

pub use cli::{Cli, Commands, RunArgs};
pub use error::{Result, TakeoutError};
pub use exif::{CaptureTags, CaptureTime, ExifToolStore, TagStore};
pub use paths::{ArchiveLayout, is_bulk_folder};
pub use pipeline::{Pipeline, RunStats};
pub use settings::{RunConfig, RunOverrides, Settings};
