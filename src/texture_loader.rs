use raylib::prelude::*;

use crate::error::SlideshowError;
use crate::loader::FetchedImage;

// --- Decode fetched bytes, apply EXIF rotation, create texture ---
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    fetched: &FetchedImage,
) -> Result<Texture2D, SlideshowError> {
    let source = fetched.source.display().to_string();

    // Provide extension hint for loading from memory
    let mut image = Image::load_image_from_mem(&format!(".{}", fetched.extension), &fetched.bytes)
        .map_err(|e| SlideshowError::load(&source, format!("failed to decode image data: {}", e)))?;

    // 1 = Top-left (Normal)
    // 3 = Bottom-right (180 deg)
    // 6 = Top-right (90 deg clockwise)
    // 8 = Bottom-left (270 deg clockwise / 90 deg counter-clockwise)
    // Others involve flips, ignored here.
    match fetched.orientation {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }

    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| SlideshowError::load(&source, format!("failed to create texture: {}", e)))?;

    // CPU copy is no longer needed once the texture lives on the GPU
    drop(image);

    Ok(texture)
}
