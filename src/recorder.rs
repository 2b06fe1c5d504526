//! Frame recording.
//!
//! Each recording session gets a timestamped directory under the
//! configured recording root and receives sequentially numbered JPEG
//! frames. The annotated frame is recorded; the on-screen recording
//! indicator is not.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logger;
use crate::types::Frame;

pub struct Recorder {
    root: PathBuf,
    active: Option<ActiveRecording>,
}

struct ActiveRecording {
    dir: PathBuf,
    frame_index: u64,
}

impl Recorder {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Start or stop recording, returning whether recording is now on.
    pub fn toggle(&mut self) -> Result<bool> {
        match self.active.take() {
            Some(rec) => {
                logger::info(&format!(
                    "Recording stopped. {} frames saved to {}",
                    rec.frame_index,
                    rec.dir.display()
                ));
                Ok(false)
            }
            None => {
                let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
                let dir = self.root.join(stamp);
                fs::create_dir_all(&dir).with_context(|| {
                    format!("cannot create recording directory '{}'", dir.display())
                })?;
                logger::info(&format!("Recording started. Saving to {}", dir.display()));
                self.active = Some(ActiveRecording {
                    dir,
                    frame_index: 0,
                });
                Ok(true)
            }
        }
    }

    /// Write one frame if recording is active. A write failure stops
    /// the recording rather than silently dropping frames.
    pub fn write_frame(&mut self, frame: &Frame) {
        let Some(rec) = self.active.as_mut() else {
            return;
        };
        let path = rec.dir.join(format!("frame_{:06}.jpg", rec.frame_index));
        rec.frame_index += 1;
        if let Err(e) = frame.save(&path) {
            logger::error(&format!(
                "Failed to write frame '{}': {}. Stopping recording.",
                path.display(),
                e
            ));
            self.active = None;
        }
    }
}
