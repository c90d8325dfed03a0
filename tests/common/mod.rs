use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

/// 2020-01-01 12:00:00 UTC
pub const TAKEN: i64 = 1_577_880_000;

pub fn sidecar_json(seconds: i64) -> String {
    format!(
        r#"{{"title": "p.mp4", "photoTakenTime": {{"timestamp": "{}", "formatted": "Jan 1, 2020"}}}}"#,
        seconds
    )
}

/// Command running in `temp` so no stray settings.json or logs/ leak in.
pub fn takeout_sync(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("takeout-sync").unwrap();
    cmd.current_dir(temp.path());
    cmd
}

/// A small export: one curated album copy with a sidecar, and two bulk copies
/// of the same clip, one of them with its own sidecar.
pub fn setup_takeout(temp: &TempDir) -> ChildPath {
    let takeout = temp.child("Takeout");
    takeout.child("Album/p.mp4").write_str("clip").unwrap();
    takeout
        .child("Album/p.mp4.json")
        .write_str(&sidecar_json(TAKEN))
        .unwrap();
    takeout.child("Photos from 2020/p.mp4").write_str("clip").unwrap();
    takeout
        .child("Photos from 2020/p.mp4.json")
        .write_str(&sidecar_json(TAKEN))
        .unwrap();
    takeout.child("Photos from 2021/p.mp4").write_str("clip").unwrap();
    takeout
}
