//! One-shot screen capture.
//!
//! Grabs a single frame from the primary monitor, downscales it, and encodes
//! it as JPEG. No capture state outlives the call, so there is nothing to
//! release on the error paths.

use base64::{engine::general_purpose::STANDARD, Engine};
use shared::error::AssistError;
use std::io::Cursor;

/// Longest edge we inline into a vision request.
const MAX_WIDTH: u32 = 1280;

#[derive(Debug, Clone)]
pub struct ScreenCapture {
    pub base64_jpeg: String,
    pub width: u32,
    pub height: u32,
}

fn map_xcap_error(e: xcap::XCapError) -> AssistError {
    let msg = e.to_string();
    if msg.to_lowercase().contains("permission") {
        AssistError::PermissionDenied("Screen")
    } else {
        AssistError::Capture(msg)
    }
}

/// Target size after clamping the width to [`MAX_WIDTH`].
fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scale = max_width as f64 / width as f64;
    (max_width, (height as f64 * scale) as u32)
}

/// Capture one frame from the primary monitor as base64 JPEG.
pub fn capture_primary() -> Result<ScreenCapture, AssistError> {
    let monitors = xcap::Monitor::all().map_err(map_xcap_error)?;
    let monitor = monitors
        .first()
        .ok_or_else(|| AssistError::Capture("no monitors found".to_string()))?;

    let frame = monitor.capture_image().map_err(map_xcap_error)?;
    let (width, height) = (frame.width(), frame.height());
    tracing::debug!(width, height, "captured screen frame");

    let (out_w, out_h) = scaled_dimensions(width, height, MAX_WIDTH);
    let frame = if out_w != width {
        image::imageops::resize(&frame, out_w, out_h, image::imageops::FilterType::Triangle)
    } else {
        frame
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = image::DynamicImage::ImageRgba8(frame).to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buffer, image::ImageFormat::Jpeg)
        .map_err(|e| AssistError::Capture(e.to_string()))?;

    Ok(ScreenCapture {
        base64_jpeg: STANDARD.encode(buffer.into_inner()),
        width: out_w,
        height: out_h,
    })
}
