//! YAML configuration.
//!
//! Every field has a default so a missing file or a sparse file still
//! yields a runnable setup (with warnings). Invalid *values* are a
//! different matter: they abort startup before any component is built.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::logger;
use crate::wire::WireFormat;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub video_capture: VideoCaptureConfig,
    pub video_recording: VideoRecordingConfig,
    pub udp_communication: UdpConfig,
}

/// Camera index or a directory of replay frames. YAML integers select
/// a camera, strings a replay path, mirroring the original tool's
/// int-or-string source field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VideoSource {
    Camera(u32),
    Replay(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoCaptureConfig {
    pub source: VideoSource,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoCaptureConfig {
    fn default() -> Self {
        Self {
            source: VideoSource::Camera(0),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoRecordingConfig {
    pub directory: PathBuf,
    pub fps: u32,
}

impl Default for VideoRecordingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("recordings"),
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    pub sender_ip: Ipv4Addr,
    pub sender_port: u16,
    pub receiver_ip: Ipv4Addr,
    pub receiver_port: u16,
    pub format: String,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            sender_ip: Ipv4Addr::LOCALHOST,
            sender_port: 60511,
            receiver_ip: Ipv4Addr::LOCALHOST,
            receiver_port: 60522,
            format: ">dd".to_string(),
        }
    }
}

impl UdpConfig {
    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::from((self.sender_ip, self.sender_port))
    }

    pub fn remote_addr(&self) -> SocketAddr {
        SocketAddr::from((self.receiver_ip, self.receiver_port))
    }

    pub fn wire_format(&self) -> Result<WireFormat> {
        self.format
            .parse()
            .with_context(|| format!("invalid udp_communication.format '{}'", self.format))
    }
}

impl AppConfig {
    /// Load from a YAML file. A missing or unreadable file falls back
    /// to the defaults with a warning; bad values abort.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => {
                logger::warn("No configuration file specified. Using default configuration.");
                Self::default()
            }
            Some(path) => Self::load_file(path),
        };
        config.validate()?;
        config.print();
        Ok(config)
    }

    fn load_file(path: &Path) -> Self {
        logger::info(&format!("Loading configuration from '{}'...", path.display()));
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if !is_yaml {
            logger::error(&format!(
                "The file '{}' does not have a valid YAML extension. Using default configuration.",
                path.display()
            ));
            return Self::default();
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                logger::error(&format!(
                    "Cannot read '{}': {}. Using default configuration.",
                    path.display(),
                    e
                ));
                return Self::default();
            }
        };
        match serde_yaml::from_str::<AppConfig>(&content) {
            Ok(c) => {
                logger::log("Configuration loaded successfully.");
                c
            }
            Err(e) => {
                logger::error(&format!(
                    "The file '{}' is not a valid configuration: {}. Using default configuration.",
                    path.display(),
                    e
                ));
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.video_capture.width == 0 || self.video_capture.height == 0 {
            bail!("video_capture.width and .height must be positive");
        }
        if self.video_recording.fps == 0 {
            bail!("video_recording.fps must be positive");
        }
        self.udp_communication.wire_format()?;
        Ok(())
    }

    fn print(&self) {
        logger::log("The following configuration will be used:");
        logger::log("=================================================");
        match &self.video_capture.source {
            VideoSource::Camera(idx) => logger::info(&format!("video source: camera {}", idx)),
            VideoSource::Replay(path) => {
                logger::info(&format!("video source: replay '{}'", path.display()))
            }
        }
        logger::info(&format!(
            "frame size: {}x{}",
            self.video_capture.width, self.video_capture.height
        ));
        logger::info(&format!(
            "recording: '{}' at {} fps",
            self.video_recording.directory.display(),
            self.video_recording.fps
        ));
        logger::info(&format!(
            "udp: {} -> {} (format '{}')",
            self.udp_communication.local_addr(),
            self.udp_communication.remote_addr(),
            self.udp_communication.format
        ));
        logger::log("=================================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.udp_communication.local_addr().port(), 60511);
        assert_eq!(config.udp_communication.remote_addr().port(), 60522);
        assert_eq!(
            config.udp_communication.wire_format().unwrap(),
            WireFormat::default()
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let yaml = "video_capture:\n  source: 2\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.video_capture.source,
            VideoSource::Camera(2)
        ));
        assert_eq!(config.video_capture.width, 1024);
        assert_eq!(config.video_recording.fps, 60);
    }

    #[test]
    fn string_source_selects_replay() {
        let yaml = "video_capture:\n  source: recordings/bk5000\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.video_capture.source,
            VideoSource::Replay(_)
        ));
    }

    #[test]
    fn bad_wire_format_fails_validation() {
        let yaml = "udp_communication:\n  format: iii\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_fps_fails_validation() {
        let yaml = "video_recording:\n  fps: 0\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
video_capture:
  source: recordings/bk5000
  width: 800
  height: 600
video_recording:
  directory: captures
  fps: 30
udp_communication:
  sender_ip: 127.0.0.1
  sender_port: 50001
  receiver_ip: 192.168.1.20
  receiver_port: 50002
  format: "<ff"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.video_capture.width, 800);
        assert_eq!(
            config.udp_communication.remote_addr().to_string(),
            "192.168.1.20:50002"
        );
    }
}
