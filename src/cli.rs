use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use rand::Rng;

use crate::animator::Capability;
use crate::config::*;
use crate::constants::*;
use crate::error::{ConfigError, SlideshowError};

#[derive(Parser, Debug)]
#[command(name = "kenburns", about = "Cycles images with a pan/zoom transition")]
pub struct Args {
    /// Directory with the images to show, in file name order
    #[arg(required_unless_present = "manifest")]
    pub directory: Option<PathBuf>,

    /// JSON slide list instead of a directory
    #[arg(long, conflicts_with = "directory")]
    pub manifest: Option<PathBuf>,

    /// Cross-fade duration between slides [default: 500]
    #[arg(long)]
    pub fade_ms: Option<u64>,

    /// Hold time after a slide's motion ends [default: 500]
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Motion duration for slides without an explicit motion
    #[arg(long, default_value_t = DEFAULT_DURATION_MS)]
    pub duration_ms: u64,

    #[arg(long, default_value_t = DEFAULT_MIN_SCALE)]
    pub min_scale: f32,

    #[arg(long, default_value_t = DEFAULT_MAX_SCALE)]
    pub max_scale: f32,

    /// Animation backend; `auto` probes the GPU
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub backend: Backend,

    /// Seed for the generated motions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial window size, e.g. 1280x720
    #[arg(long, value_parser = parse_window_size, default_value = "960x540")]
    pub windowed_size: (i32, i32),
}

fn parse_window_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: i32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: i32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w <= 0 || h <= 0 {
        return Err(format!("window size must be positive, got {w}x{h}"));
    }
    Ok((w, h))
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Auto,
    Transform,
    Compat,
    None,
}

impl Backend {
    /// Resolves the requested backend against whether a render texture could
    /// be created.
    pub fn capability(self, render_target_available: bool) -> Capability {
        match self {
            Backend::None => Capability::Unavailable,
            Backend::Compat => Capability::Compatibility,
            Backend::Transform | Backend::Auto if render_target_available => Capability::Transform,
            Backend::Transform | Backend::Auto => Capability::Compatibility,
        }
    }
}

impl Args {
    pub fn slideshow_config<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SlideshowConfig, SlideshowError> {
        let defaults = MotionDefaults::new(self.min_scale, self.max_scale, self.duration_ms)?;

        let (manifest, slides) = match (&self.manifest, &self.directory) {
            (Some(path), _) => {
                let manifest = Manifest::load(path)?;
                let base = path.parent().unwrap_or(Path::new("."));
                let slides = manifest.resolve(base, &defaults, rng);
                (manifest, slides)
            }
            (None, Some(dir)) => (Manifest::default(), slides_from_directory(dir, &defaults, rng)?),
            // clap enforces one of the two
            (None, None) => return Err(ConfigError::NoSlides.into()),
        };

        let playback = PlaybackConfig::new(
            layered(self.fade_ms, manifest.fade_ms, DEFAULT_FADE_MS),
            layered(self.pause_ms, manifest.pause_ms, DEFAULT_PAUSE_MS),
            manifest.easing.unwrap_or_default(),
        )?;
        Ok(SlideshowConfig::new(playback, slides)?)
    }
}
