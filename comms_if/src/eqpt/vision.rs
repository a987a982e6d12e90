//! # Vision Equipment Communications Module
//!
//! Frames arrive from the imaging collaborator already thresholded and edge-filtered. The drive
//! core never sees the colour image.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use image::{GrayImage, ImageBuffer};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A serialisable edge image frame.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EdgeFrame {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,

    /// The 8 bit edge image, row major, encoded in base64.
    pub b64_data: String,

    /// Lines already extracted from this frame by the imaging collaborator, if any.
    #[serde(default)]
    pub lines: Option<Vec<LineSpec>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A detected line in one of the two forms produced by line extractors.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum LineSpec {
    /// Two endpoints in image coordinates
    Endpoints { x1: i32, y1: i32, x2: i32, y2: i32 },

    /// Polar form as output by a standard Hough transform, `theta` in radians
    Polar { rho: f64, theta: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum EdgeFrameError {
    #[error("Could not decode the frame data: {0}")]
    DecodeError(base64::DecodeError),

    #[error("Frame data has {0} bytes but a {1}x{2} image was declared")]
    SizeMismatch(usize, u32, u32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EdgeFrame {
    /// Build a frame from an edge image, optionally carrying pre-extracted lines.
    pub fn from_image(
        timestamp: DateTime<Utc>,
        image: &GrayImage,
        lines: Option<Vec<LineSpec>>,
    ) -> Self {
        Self {
            timestamp,
            width: image.width(),
            height: image.height(),
            b64_data: base64::encode(image.as_raw()),
            lines,
        }
    }

    /// Decode the frame data into an image. The data must hold exactly one byte per pixel.
    pub fn to_image(&self) -> Result<GrayImage, EdgeFrameError> {
        let bytes = base64::decode(&self.b64_data).map_err(EdgeFrameError::DecodeError)?;
        let len = bytes.len();

        if len != self.width as usize * self.height as usize {
            return Err(EdgeFrameError::SizeMismatch(len, self.width, self.height));
        }

        ImageBuffer::from_raw(self.width, self.height, bytes)
            .ok_or(EdgeFrameError::SizeMismatch(len, self.width, self.height))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_image_size_checked() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(2, 1, image::Luma([255]));

        let frame = EdgeFrame::from_image(Utc::now(), &img, None);
        let decoded = frame.to_image().unwrap();
        assert_eq!(decoded.get_pixel(2, 1).0[0], 255);
        assert_eq!(decoded.get_pixel(0, 0).0[0], 0);

        let bad = EdgeFrame {
            width: 5,
            ..frame.clone()
        };
        assert!(matches!(
            bad.to_image(),
            Err(EdgeFrameError::SizeMismatch(12, 5, 3))
        ));

        // Trailing data is not silently dropped
        let oversized = EdgeFrame { width: 2, ..frame };
        assert!(matches!(
            oversized.to_image(),
            Err(EdgeFrameError::SizeMismatch(12, 2, 3))
        ));
    }

    #[test]
    fn test_lines_optional_in_json() {
        let json = r#"{"timestamp": 0, "width": 1, "height": 1, "b64_data": "AA=="}"#;
        let frame: EdgeFrame = serde_json::from_str(json).unwrap();
        assert!(frame.lines.is_none());
        assert_eq!(frame.to_image().unwrap().get_pixel(0, 0).0[0], 0);
    }
}
