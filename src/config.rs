//! Slideshow configuration.
//!
//! Values are layered: command line first, then the manifest, then the
//! built-in defaults. The result is validated once and never changes.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::easing::Easing;
use crate::error::{ConfigError, SlideshowError};
use crate::motion::MotionDescriptor;

/// Timing shared by every slide.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    fade: Duration,
    pause: Duration,
    easing: Easing,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(DEFAULT_FADE_MS),
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            easing: Easing::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn new(fade_ms: u64, pause_ms: u64, easing: Easing) -> Result<Self, ConfigError> {
        easing.validate()?;
        Ok(Self {
            fade: Duration::from_millis(fade_ms),
            pause: Duration::from_millis(pause_ms),
            easing,
        })
    }

    pub fn fade(&self) -> Duration {
        self.fade
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }
}

/// One slide before it is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideConfig {
    pub source: PathBuf,
    pub motion: MotionDescriptor,
}

/// How motions are generated for slides that do not specify one.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionDefaults {
    pub scales: RangeInclusive<f32>,
    pub duration_ms: u64,
}

impl Default for MotionDefaults {
    fn default() -> Self {
        Self {
            scales: DEFAULT_MIN_SCALE..=DEFAULT_MAX_SCALE,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

impl MotionDefaults {
    pub fn new(min_scale: f32, max_scale: f32, duration_ms: u64) -> Result<Self, ConfigError> {
        let valid = min_scale.is_finite() && max_scale.is_finite() && min_scale > 0.0 && min_scale <= max_scale;
        if !valid {
            return Err(ConfigError::InvalidScaleRange { min: min_scale, max: max_scale });
        }
        if duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(Self { scales: min_scale..=max_scale, duration_ms })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> MotionDescriptor {
        MotionDescriptor::random(rng, self.scales.clone(), self.duration_ms)
    }
}

/// Validated configuration the engine is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowConfig {
    pub playback: PlaybackConfig,
    pub slides: Vec<SlideConfig>,
}

impl SlideshowConfig {
    /// Drops slides with a malformed motion (logging each one) and fails only
    /// when nothing usable is left.
    pub fn new(playback: PlaybackConfig, slides: Vec<SlideConfig>) -> Result<Self, ConfigError> {
        let slides: Vec<SlideConfig> = slides
            .into_iter()
            .filter(|slide| match slide.motion.validate() {
                Ok(()) => true,
                Err(error) => {
                    let error = ConfigError::InvalidMotion {
                        slide: slide.source.display().to_string(),
                        error,
                    };
                    warn!("Skipping slide: {}", error);
                    false
                }
            })
            .collect();

        if slides.is_empty() {
            return Err(ConfigError::NoSlides);
        }
        Ok(Self { playback, slides })
    }
}

/// JSON slide list.
///
/// ```json
/// { "fade_ms": 400, "slides": [ { "source": "a.jpg" }, { "source": "b.jpg", "motion": { ... } } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub fade_ms: Option<u64>,
    #[serde(default)]
    pub pause_ms: Option<u64>,
    #[serde(default)]
    pub easing: Option<Easing>,
    pub slides: Vec<ManifestSlide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSlide {
    pub source: PathBuf,
    #[serde(default)]
    pub motion: Option<MotionDescriptor>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, SlideshowError> {
        let text = fs::read_to_string(path).map_err(|error| SlideshowError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        serde_json::from_str(&text).map_err(|error| SlideshowError::Manifest {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Turns manifest entries into slide configs. Relative sources are taken
    /// relative to `base`; missing motions are drawn from `defaults`.
    pub fn resolve<R: Rng + ?Sized>(&self, base: &Path, defaults: &MotionDefaults, rng: &mut R) -> Vec<SlideConfig> {
        self.slides
            .iter()
            .map(|slide| SlideConfig {
                source: if slide.source.is_absolute() {
                    slide.source.clone()
                } else {
                    base.join(&slide.source)
                },
                motion: slide.motion.clone().unwrap_or_else(|| defaults.draw(rng)),
            })
            .collect()
    }
}

/// Sorted image files of a directory, each with a freshly drawn motion.
pub fn slides_from_directory<R: Rng + ?Sized>(
    dir: &Path,
    defaults: &MotionDefaults,
    rng: &mut R,
) -> Result<Vec<SlideConfig>, SlideshowError> {
    let paths = load_sorted_image_paths(dir)?;
    Ok(paths
        .into_iter()
        .map(|source| SlideConfig { source, motion: defaults.draw(rng) })
        .collect())
}

pub fn load_sorted_image_paths(dir: &Path) -> Result<Vec<PathBuf>, SlideshowError> {
    let io_error = |error| SlideshowError::Io { path: dir.to_path_buf(), error };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if is_image {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if paths.is_empty() {
        Err(SlideshowError::NoImages(dir.to_path_buf()))
    } else {
        Ok(paths)
    }
}

/// Picks the first value that is set, falling back to `default`.
pub fn layered<T: Copy>(cli: Option<T>, manifest: Option<T>, default: T) -> T {
    cli.or(manifest).unwrap_or(default)
}
