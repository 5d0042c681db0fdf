//! Error types for the slideshow.
//!
//! Only configuration problems can stop the program from starting. Everything
//! that goes wrong once playback runs is logged and recovered from.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a motion descriptor is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    #[error("scale {0} must be a positive finite number")]
    InvalidScale(f32),

    #[error("corner flag {0} must lie within [0, 1]")]
    FlagOutOfRange(f32),

    #[error("duration must be greater than zero")]
    ZeroDuration,

    /// Start and end corners are identical, the slide would only zoom in place.
    #[error("start and end corners are identical")]
    NoMovement,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no usable slides configured")]
    NoSlides,

    #[error("invalid motion for slide `{slide}`: {error}")]
    InvalidMotion { slide: String, error: MotionError },

    #[error("invalid easing curve: control x values must lie within [0, 1]")]
    InvalidEasing,

    #[error("invalid scale range {min}..{max}")]
    InvalidScaleRange { min: f32, max: f32 },

    #[error("slide duration must be greater than zero")]
    ZeroDuration,
}

/// Main error type for slideshow operations.
#[derive(Error, Debug)]
pub enum SlideshowError {
    /// A slide's image could not be turned into something displayable
    #[error("could not load image {slide}: {reason}")]
    Load { slide: String, reason: String },

    #[error("could not read {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("invalid manifest {}: {error}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    #[error("no image files found in directory {}", .0.display())]
    NoImages(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither animation backend can run on this host
    #[error("no usable animation backend")]
    CapabilityUnavailable,
}

impl SlideshowError {
    pub fn load(slide: impl Into<String>, reason: impl ToString) -> Self {
        Self::Load {
            slide: slide.into(),
            reason: reason.to_string(),
        }
    }
}
