//! Frame acquisition.
//!
//! `FrameSource` hides whether frames come from a live camera or a
//! recorded session. Replay sources loop forever; a live camera that
//! stops producing frames is fatal and ends the session.

use anyhow::{anyhow, bail, Context, Result};
use image::imageops::FilterType;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};
use std::path::{Path, PathBuf};

use crate::config::{VideoCaptureConfig, VideoSource};
use crate::types::Frame;

pub trait FrameSource {
    fn name(&self) -> String;
    /// Nominal display rate. Replay sources pace the loop with this;
    /// live cameras are drained as fast as they deliver.
    fn fps_hint(&self) -> Option<f64>;
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Build the configured source, normalizing every frame to the
/// configured dimensions.
pub fn open(config: &VideoCaptureConfig) -> Result<Box<dyn FrameSource>> {
    let inner: Box<dyn FrameSource> = match &config.source {
        VideoSource::Camera(index) => Box::new(CameraSource::new(*index)?),
        VideoSource::Replay(path) => Box::new(ReplaySource::new(path)?),
    };
    Ok(Box::new(Resized {
        inner,
        width: config.width,
        height: config.height,
    }))
}

struct Resized {
    inner: Box<dyn FrameSource>,
    width: u32,
    height: u32,
}

impl FrameSource for Resized {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn fps_hint(&self) -> Option<f64> {
        self.inner.fps_hint()
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let frame = self.inner.next_frame()?;
        if frame.width() == self.width && frame.height() == self.height {
            return Ok(frame);
        }
        Ok(image::imageops::resize(
            &frame,
            self.width,
            self.height,
            FilterType::Triangle,
        ))
    }
}

pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    pub fn new(index: u32) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .context("Failed to create camera instance")?;
        camera
            .open_stream()
            .map_err(|e| anyhow!(e))
            .context("Failed to open camera stream")?;
        Ok(Self { camera })
    }
}

impl FrameSource for CameraSource {
    fn name(&self) -> String {
        self.camera.info().human_name()
    }

    fn fps_hint(&self) -> Option<f64> {
        None
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| anyhow!(e))
            .context("Failed to read frame from camera")?;
        frame
            .decode_image::<RgbFormat>()
            .map_err(|e| anyhow!(e))
            .context("Failed to decode camera frame")
    }
}

/// Plays the image files of a directory in sorted order and loops back
/// to the first frame at the end.
pub struct ReplaySource {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
}

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

impl ReplaySource {
    pub fn new(dir: &Path) -> Result<Self> {
        let mut frames: Vec<PathBuf> = fs_read_dir(dir)?
            .into_iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();
        if frames.is_empty() {
            bail!("replay directory '{}' contains no frames", dir.display());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            frames,
            cursor: 0,
        })
    }
}

fn fs_read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot open replay directory '{}'", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry?.path());
    }
    Ok(paths)
}

impl FrameSource for ReplaySource {
    fn name(&self) -> String {
        format!("replay: {}", self.dir.display())
    }

    fn fps_hint(&self) -> Option<f64> {
        Some(30.0)
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if self.cursor >= self.frames.len() {
            crate::logger::log("End of replay. Restarting...");
            self.cursor = 0;
        }
        let path = &self.frames[self.cursor];
        self.cursor += 1;
        let img = image::open(path)
            .with_context(|| format!("failed to load replay frame '{}'", path.display()))?;
        Ok(img.to_rgb8())
    }
}
