use std::time::Duration;

pub const RENDER_WIDTH: i32 = 1920;           // Width of the render texture
pub const RENDER_HEIGHT: i32 = 1080;          // Height of the render texture
pub const FPS: u32 = 60;                      // Frames per second

pub const DEFAULT_FADE_MS: u64 = 500;         // Cross-fade between two slides
pub const DEFAULT_PAUSE_MS: u64 = 500;        // Extra hold after a slide's motion ends
pub const DEFAULT_DURATION_MS: u64 = 6000;    // Pan/zoom duration for generated motions
pub const DEFAULT_MIN_SCALE: f32 = 1.0;
pub const DEFAULT_MAX_SCALE: f32 = 1.25;

// cubic-bezier(.81, 0, .26, 1)
pub const DEFAULT_EASE_CURVE: [f32; 4] = [0.81, 0.0, 0.26, 1.0];

// Delay between sending the outgoing slide to the back and clearing its opacity
pub const RETIRE_FADE_DELAY: Duration = Duration::from_millis(20);

pub const LOADER_THREADS: usize = 4;
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];
