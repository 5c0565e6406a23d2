//! Input preprocessing for the classifier
//!
//! Clients send raw pixel intensities in the 0-255 range; the network wants a
//! flat column of f32 values scaled to 0-1.

use ndarray::Array1;
use serde::Deserialize;

use crate::{Error, Result};

/// Side length of the input image.
pub const IMAGE_SIDE: usize = 28;

/// Total pixel count of the input image.
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Divisor mapping 0-255 intensities into the unit interval.
pub const INTENSITY_SCALE: f32 = 255.0;

/// Pixel payload as clients send it: either a flat 784-element array or
/// 28 rows of 28 columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageData {
    Flat(Vec<f32>),
    Grid(Vec<Vec<f32>>),
}

impl ImageData {
    /// Flatten, validate, and scale intensities into the network input vector.
    pub fn into_input(self) -> Result<Array1<f32>> {
        let pixels = match self {
            ImageData::Flat(pixels) => pixels,
            ImageData::Grid(rows) => {
                if rows.len() != IMAGE_SIDE {
                    return Err(Error::invalid_input(format!(
                        "expected {} rows, got {}",
                        IMAGE_SIDE,
                        rows.len()
                    )));
                }
                let mut flat = Vec::with_capacity(IMAGE_PIXELS);
                for (i, row) in rows.into_iter().enumerate() {
                    if row.len() != IMAGE_SIDE {
                        return Err(Error::invalid_input(format!(
                            "row {} has {} columns, expected {}",
                            i,
                            row.len(),
                            IMAGE_SIDE
                        )));
                    }
                    flat.extend(row);
                }
                flat
            }
        };

        if pixels.len() != IMAGE_PIXELS {
            return Err(Error::invalid_input(format!(
                "expected {} pixels, got {}",
                IMAGE_PIXELS,
                pixels.len()
            )));
        }

        if let Some(bad) = pixels.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid_input(format!(
                "non-finite pixel value: {}",
                bad
            )));
        }

        Ok(Array1::from_iter(
            pixels.into_iter().map(|v| v / INTENSITY_SCALE),
        ))
    }
}
