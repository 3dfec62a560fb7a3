//! Peripheral data types.
//!
//! - `GroundReading` - One sample of the downward reflectance array
//! - `Wheel` - Left/right wheel selector
//! - `Indicators` - Status light bitflags
//! - `CameraConfig` - One-time camera setup applied before the loop starts

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::GROUND_CHANNELS;

/// One ground-sensor sample: five reflectance values, edge 0 to edge 4.
///
/// Low values mean a dark surface (the guide line), high values a
/// reflective floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroundReading {
    /// Per-channel reflectance.
    pub delta: [u16; GROUND_CHANNELS],
}

impl GroundReading {
    /// Build a reading from raw channel values.
    pub const fn new(delta: [u16; GROUND_CHANNELS]) -> Self {
        Self { delta }
    }

    /// Reading with every channel set to `value`.
    pub const fn uniform(value: u16) -> Self {
        Self {
            delta: [value; GROUND_CHANNELS],
        }
    }

    /// Value of channel `idx` (0..5).
    #[inline]
    pub const fn channel(&self, idx: usize) -> u16 {
        self.delta[idx]
    }

    /// `true` if any channel reads below `threshold`.
    #[inline]
    pub fn any_below(&self, threshold: u16) -> bool {
        self.delta.iter().any(|&v| v < threshold)
    }

    /// `true` if every listed channel reads above `threshold`.
    #[inline]
    pub fn all_above(&self, channels: &[usize], threshold: u16) -> bool {
        channels.iter().all(|&c| self.delta[c] > threshold)
    }
}

/// Wheel selector for the differential drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wheel {
    /// Left wheel.
    Left,
    /// Right wheel.
    Right,
}

impl Wheel {
    /// The other wheel.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Array index (left = 0, right = 1).
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

bitflags! {
    /// Status indicator lights.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Indicators: u8 {
        /// Body light (blinks while following the line).
        const BODY = 1 << 0;
        /// Front light (blinks while searching for the line).
        const FRONT = 1 << 1;
        /// Ring lights, only ever cleared by the core.
        const RING = 1 << 2;
    }
}

/// Camera pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// One byte per pixel.
    #[default]
    Greyscale,
    /// Two bytes per pixel.
    Rgb565,
}

/// Frame delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Exactly one frame per explicit trigger.
    #[default]
    OneShot,
    /// Frames are produced back to back.
    Continuous,
}

fn default_window_x() -> u16 {
    315
}

fn default_window_y() -> u16 {
    235
}

fn default_window_size() -> u16 {
    10
}

fn default_subsampling() -> u8 {
    1
}

fn default_exposure() -> u16 {
    512
}

/// Camera setup applied once before the control loop starts.
///
/// The default frames a small window around the image center where the
/// dock's charge indicator appears when the contacts touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Pixel format.
    #[serde(default)]
    pub format: PixelFormat,
    /// Window origin column.
    #[serde(default = "default_window_x")]
    pub x: u16,
    /// Window origin row.
    #[serde(default = "default_window_y")]
    pub y: u16,
    /// Window width [px].
    #[serde(default = "default_window_size")]
    pub width: u16,
    /// Window height [px].
    #[serde(default = "default_window_size")]
    pub height: u16,
    /// Horizontal subsampling factor.
    #[serde(default = "default_subsampling")]
    pub subsampling_x: u8,
    /// Vertical subsampling factor.
    #[serde(default = "default_subsampling")]
    pub subsampling_y: u8,
    /// Fixed exposure value.
    #[serde(default = "default_exposure")]
    pub exposure: u16,
    /// Frame delivery mode.
    #[serde(default)]
    pub capture_mode: CaptureMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            format: PixelFormat::Greyscale,
            x: default_window_x(),
            y: default_window_y(),
            width: default_window_size(),
            height: default_window_size(),
            subsampling_x: default_subsampling(),
            subsampling_y: default_subsampling(),
            exposure: default_exposure(),
            capture_mode: CaptureMode::OneShot,
        }
    }
}

impl CameraConfig {
    /// Sensor width [px].
    pub const SENSOR_WIDTH: u16 = 640;
    /// Sensor height [px].
    pub const SENSOR_HEIGHT: u16 = 480;

    /// Bytes in one captured frame.
    pub fn frame_len(&self) -> usize {
        let bpp = match self.format {
            PixelFormat::Greyscale => 1,
            PixelFormat::Rgb565 => 2,
        };
        let w = (self.width / self.subsampling_x.max(1) as u16) as usize;
        let h = (self.height / self.subsampling_y.max(1) as u16) as usize;
        w * h * bpp
    }

    /// Check the window fits on the sensor and the subsampling is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("camera window must not be empty".to_string());
        }
        if self.x as u32 + self.width as u32 > Self::SENSOR_WIDTH as u32
            || self.y as u32 + self.height as u32 > Self::SENSOR_HEIGHT as u32
        {
            return Err(format!(
                "camera window {}x{} at ({}, {}) exceeds sensor {}x{}",
                self.width,
                self.height,
                self.x,
                self.y,
                Self::SENSOR_WIDTH,
                Self::SENSOR_HEIGHT
            ));
        }
        if !matches!(self.subsampling_x, 1 | 2 | 4) || !matches!(self.subsampling_y, 1 | 2 | 4) {
            return Err("camera subsampling must be 1, 2 or 4".to_string());
        }
        Ok(())
    }
}
