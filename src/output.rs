//! Display window.
//!
//! Thin wrapper over minifb: converts the RGB8 display buffer to the
//! packed u32 format the window wants and exposes the input queries
//! the capture loop needs.

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode};
use std::time::Duration;

pub struct WindowOutput {
    window: minifb::Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize, fps: Option<f64>) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("Failed to create window: {}", e))?;

        let frame_time = fps.map(|f| 1.0 / f).unwrap_or(1.0 / 60.0);
        window.limit_update_rate(Some(Duration::from_secs_f64(frame_time)));

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::No)
    }

    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.window.get_mouse_down(button)
    }

    /// Push one RGB8 frame to the screen.
    pub fn update(&mut self, rgb: &[u8]) -> Result<()> {
        for (i, chunk) in rgb.chunks_exact(3).enumerate() {
            if i >= self.buffer.len() {
                break;
            }
            let r = chunk[0] as u32;
            let g = chunk[1] as u32;
            let b = chunk[2] as u32;
            self.buffer[i] = (r << 16) | (g << 8) | b;
        }
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| anyhow!("Window update failed: {}", e))
    }
}
