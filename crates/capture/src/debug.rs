//! Optional persistence of intermediate captures.

use image::RgbaImage;
use log::{trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Receives every intermediate capture of a stitching run.
///
/// Sinks must not influence the capture: failures are theirs to log.
pub trait DebugScreenshotSink {
    fn save(&mut self, image: &RgbaImage, label: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDebugSink;

impl DebugScreenshotSink for NullDebugSink {
    fn save(&mut self, _image: &RgbaImage, _label: &str) {}
}

/// Writes captures as `<prefix><n>_<label>.png` into a directory.
#[derive(Debug, Clone)]
pub struct FileDebugSink {
    dir: PathBuf,
    prefix: String,
    counter: usize,
}

impl FileDebugSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_owned(),
            counter: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, label: &str) -> String {
        let label: String = label
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
            .collect();
        format!("{}{}_{label}.png", self.prefix, self.counter)
    }
}

impl DebugScreenshotSink for FileDebugSink {
    fn save(&mut self, image: &RgbaImage, label: &str) {
        self.counter += 1;
        let path = self.dir.join(self.file_name(label));
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!("Cannot create debug directory {}: {err}", self.dir.display());
            return;
        }
        if let Err(err) = image.save(&path) {
            warn!("Cannot save debug capture {}: {err}", path.display());
            return;
        }
        trace!("Saved debug capture {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Files are numbered in save order and labels are made file-safe.
    ///
    /// # Panics
    /// Panics if the expected files are missing.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileDebugSink::new(dir.path().join("debug"), "run-");
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        sink.save(&image, "original");
        sink.save(&image, "part 0/1");
        assert!(dir.path().join("debug/run-1_original.png").is_file());
        assert!(dir.path().join("debug/run-2_part_0_1.png").is_file());
    }

    /// An unwritable target does not fail the caller.
    ///
    /// # Panics
    /// Panics if saving panics.
    #[test]
    #[allow(clippy::unwrap_used, reason = "Test code may use unwrap for simplicity")]
    fn unwritable_target_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let mut sink = FileDebugSink::new(blocker.join("nested"), "");
        sink.save(&RgbaImage::new(1, 1), "original");
        assert!(!blocker.join("nested").exists());
    }
}
