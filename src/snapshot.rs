//! Snapshot storage.
//!
//! Frames are written as JPEG into a fixed directory named
//! `image_<YYYYMMDD-HHMMSS>.jpg` by local time. The directory must already
//! exist; it is never created here. Two snapshots in the same second share a
//! name and the later one wins.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::ImageFormat;
use tracing::{info, warn};

use crate::error::Result;
use crate::vision::Frame;

/// Writes snapshot images into one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !dir.is_dir() {
            warn!(
                "Snapshot directory {} does not exist; snapshots will fail",
                dir.display()
            );
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a snapshot taken at `at`.
    pub fn file_name(at: DateTime<Local>) -> String {
        format!("image_{}.jpg", at.format("%Y%m%d-%H%M%S"))
    }

    /// Write `frame` stamped with `at` and return its path.
    pub fn save_at(&self, frame: &Frame, at: DateTime<Local>) -> Result<PathBuf> {
        let path = self.dir.join(Self::file_name(at));
        frame.save_with_format(&path, ImageFormat::Jpeg)?;
        info!("Image saved: {}", path.display());
        Ok(path)
    }

    /// Write `frame` stamped with the current local time.
    pub fn save(&self, frame: &Frame) -> Result<PathBuf> {
        self.save_at(frame, Local::now())
    }
}
