// SPDX-License-Identifier: MPL-2.0

//! Rotation normalization for captured stills and preview frames
//!
//! Camera buffers arrive in sensor orientation with rows that may carry
//! padding. Both are resolved here:
//! - Strided rows repacked to `width * 4` bytes
//! - Clockwise rotation by the sensor angle (0/90/180/270)
//!
//! Rotation is a pure pixel permutation: no cropping and no resampling.

use super::CapturedImage;
use crate::backends::camera::types::{CameraFrame, SensorRotation, StillCapture};
use crate::errors::{AppResult, CaptureError};
use image::{RgbaImage, imageops};
use tracing::debug;

/// Copy a camera frame into a tightly packed RGBA image
pub fn frame_to_rgba(frame: &CameraFrame) -> Result<RgbaImage, CaptureError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::InvalidFrame(format!(
            "empty frame {}x{}",
            frame.width, frame.height
        )));
    }

    let row_bytes = frame.width as usize * 4;
    let stride = frame.stride as usize;
    let height = frame.height as usize;

    if stride < row_bytes {
        return Err(CaptureError::InvalidFrame(format!(
            "stride {} shorter than row of {} bytes",
            stride, row_bytes
        )));
    }

    // The last row may omit its padding
    let required = stride * (height - 1) + row_bytes;
    if frame.data.len() < required {
        return Err(CaptureError::InvalidFrame(format!(
            "RGBA data too small: expected {}, got {}",
            required,
            frame.data.len()
        )));
    }

    let pixels = if frame.is_padded() {
        debug!(stride, row_bytes, "Repacking strided frame");
        frame
            .data
            .chunks(stride)
            .take(height)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    } else {
        frame.data[..row_bytes * height].to_vec()
    };

    RgbaImage::from_raw(frame.width, frame.height, pixels).ok_or_else(|| {
        CaptureError::InvalidFrame("Failed to create RGBA image from frame".to_string())
    })
}

/// Rotate an image clockwise by `rotation`
pub fn rotate_upright(image: RgbaImage, rotation: SensorRotation) -> RgbaImage {
    match rotation {
        SensorRotation::None => image,
        SensorRotation::Rotate90 => imageops::rotate90(&image),
        SensorRotation::Rotate180 => imageops::rotate180(&image),
        SensorRotation::Rotate270 => imageops::rotate270(&image),
    }
}

/// Repack `frame` and turn it upright for a sensor mounted at `rotation`
pub fn upright_rgba(
    frame: &CameraFrame,
    rotation: SensorRotation,
) -> Result<RgbaImage, CaptureError> {
    frame_to_rgba(frame).map(|rgba| rotate_upright(rgba, rotation))
}

/// Turn a still capture into an upright display image on a blocking worker
pub async fn normalize_capture(still: StillCapture) -> AppResult<CapturedImage> {
    let image = tokio::task::spawn_blocking(move || {
        let upright = upright_rgba(&still.frame, still.rotation)?;
        debug!(
            rotation = %still.rotation,
            width = upright.width(),
            height = upright.height(),
            "Still normalized"
        );
        Ok::<_, CaptureError>(CapturedImage::new(upright))
    })
    .await
    .map_err(|e| CaptureError::ProcessingFailed(e.to_string()))??;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    const ROTATIONS: [SensorRotation; 4] = [
        SensorRotation::None,
        SensorRotation::Rotate90,
        SensorRotation::Rotate180,
        SensorRotation::Rotate270,
    ];

    /// 3x2 image where every pixel is distinct
    fn sample() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, (x + 3 * y) as u8, 255]))
    }

    #[test]
    fn test_rotate_then_inverse_restores_original() {
        for rotation in ROTATIONS {
            let rotated = rotate_upright(sample(), rotation);
            let restored = rotate_upright(rotated, rotation.inverse());
            assert_eq!(restored, sample(), "rotation {}", rotation);
        }
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        for rotation in ROTATIONS {
            let rotated = rotate_upright(sample(), rotation);
            let expected = if rotation.swaps_dimensions() { (2, 3) } else { (3, 2) };
            assert_eq!(rotated.dimensions(), expected, "rotation {}", rotation);
        }
    }

    #[test]
    fn test_rotate90_is_clockwise() {
        // A B      C A
        // C D  ->  D B
        let a = image::Rgba([1, 0, 0, 255]);
        let b = image::Rgba([2, 0, 0, 255]);
        let c = image::Rgba([3, 0, 0, 255]);
        let d = image::Rgba([4, 0, 0, 255]);
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, a);
        src.put_pixel(1, 0, b);
        src.put_pixel(0, 1, c);
        src.put_pixel(1, 1, d);

        let rotated = rotate_upright(src, SensorRotation::Rotate90);
        assert_eq!(*rotated.get_pixel(0, 0), c);
        assert_eq!(*rotated.get_pixel(1, 0), a);
        assert_eq!(*rotated.get_pixel(0, 1), d);
        assert_eq!(*rotated.get_pixel(1, 1), b);
    }

    #[test]
    fn test_strided_frame_is_repacked() {
        // 2x2 RGBA with 4 bytes of padding per row
        let data: Vec<u8> = vec![
            1, 1, 1, 1, 2, 2, 2, 2, 0xEE, 0xEE, 0xEE, 0xEE, //
            3, 3, 3, 3, 4, 4, 4, 4, 0xEE, 0xEE, 0xEE, 0xEE,
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data),
            stride: 12,
            captured_at: Instant::now(),
        };

        let image = frame_to_rgba(&frame).unwrap();
        assert_eq!(
            image.as_raw(),
            &vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]
        );
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let frame = CameraFrame {
            width: 4,
            height: 4,
            data: Arc::from(vec![0u8; 10]),
            stride: 16,
            captured_at: Instant::now(),
        };
        assert!(matches!(
            frame_to_rgba(&frame),
            Err(CaptureError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_upright_frame_matches_rotated_still() {
        // 4x2 landscape buffer from a sensor mounted at 90°
        let raw = RgbaImage::from_fn(4, 2, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        let frame = CameraFrame {
            width: 4,
            height: 2,
            data: Arc::from(raw.as_raw().as_slice()),
            stride: 16,
            captured_at: Instant::now(),
        };

        let upright = upright_rgba(&frame, SensorRotation::Rotate90).unwrap();
        assert_eq!(upright.dimensions(), (2, 4));
        assert_eq!(upright, rotate_upright(raw.clone(), SensorRotation::Rotate90));

        let unrotated = upright_rgba(&frame, SensorRotation::None).unwrap();
        assert_eq!(unrotated, raw);
    }
}
