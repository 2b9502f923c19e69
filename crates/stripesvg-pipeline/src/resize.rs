//! Resizing the pixel grid to the requested output size.
//!
//! The requested size is resolved against the source aspect ratio by an
//! [`AspectPolicy`], then the grid is resampled with an area-averaging
//! (box) filter from `fast_image_resize`. Box filtering keeps every
//! destination pixel close to the mean of the source area it covers, so
//! block brightness statistics survive the resize. Nearest-neighbour
//! would alias fine patterns into misleading block means.

use std::fmt;

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GrayImage, PixelGrid, RgbImage, StripeError};

/// How a requested width/height pair is reconciled with the source
/// aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectPolicy {
    /// Use the requested width and height as given.
    Free,
    /// Keep the requested width; derive the height from the aspect ratio.
    #[default]
    FitWidth,
    /// Keep the requested height; derive the width from the aspect ratio.
    FitHeight,
}

impl fmt::Display for AspectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("Free"),
            Self::FitWidth => f.write_str("FitWidth"),
            Self::FitHeight => f.write_str("FitHeight"),
        }
    }
}

/// A requested output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    /// Requested width in pixels.
    pub width: u32,
    /// Requested height in pixels.
    pub height: u32,
    /// How to reconcile the request with the source aspect ratio.
    pub aspect: AspectPolicy,
}

impl TargetSize {
    /// Resolve the final output dimensions for a source of size `source`.
    ///
    /// Derived dimensions are rounded to the nearest pixel (halves away
    /// from zero).
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::InvalidDimensions`] if the source or the
    /// resolved size has a zero dimension.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve(&self, source: Dimensions) -> Result<Dimensions, StripeError> {
        if source.width == 0 || source.height == 0 {
            return Err(StripeError::InvalidDimensions {
                width: source.width,
                height: source.height,
            });
        }

        let ratio = f64::from(source.width) / f64::from(source.height);
        let derive = |value: f64| value.round().clamp(0.0, f64::from(u32::MAX)) as u32;

        let resolved = match self.aspect {
            AspectPolicy::Free => Dimensions {
                width: self.width,
                height: self.height,
            },
            AspectPolicy::FitWidth => Dimensions {
                width: self.width,
                height: derive(f64::from(self.width) / ratio),
            },
            AspectPolicy::FitHeight => Dimensions {
                width: derive(f64::from(self.height) * ratio),
                height: self.height,
            },
        };

        if resolved.width == 0 || resolved.height == 0 {
            return Err(StripeError::InvalidDimensions {
                width: resolved.width,
                height: resolved.height,
            });
        }
        Ok(resolved)
    }
}

/// Resize a pixel grid to `target` using area averaging.
///
/// Returns a copy of the grid if it already has the target size.
///
/// # Errors
///
/// Returns [`StripeError::InvalidDimensions`] if the resolved size has a
/// zero dimension, and [`StripeError::Resize`] if resampling fails.
pub fn resize(grid: &PixelGrid, target: &TargetSize) -> Result<PixelGrid, StripeError> {
    let source = grid.dimensions();
    let size = target.resolve(source)?;

    if size == source {
        return Ok(grid.clone());
    }

    tracing::debug!(
        from_width = source.width,
        from_height = source.height,
        to_width = size.width,
        to_height = size.height,
        aspect = %target.aspect,
        "box resampling"
    );

    Ok(match grid {
        PixelGrid::Gray(img) => PixelGrid::Gray(resize_gray(img, size)?),
        PixelGrid::Rgb(img) => PixelGrid::Rgb(resize_rgb(img, size)?),
    })
}

/// Box-filter `buffer` from `from` to `to` with `fast_image_resize`.
fn box_resize(
    buffer: Vec<u8>,
    from: Dimensions,
    to: Dimensions,
    pixel_type: PixelType,
) -> Result<Vec<u8>, StripeError> {
    let src = Image::from_vec_u8(from.width, from.height, buffer, pixel_type)
        .map_err(|e| StripeError::Resize(e.to_string()))?;
    let mut dst = Image::new(to.width, to.height, pixel_type);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box));
    let mut resizer = Resizer::new();
    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|e| StripeError::Resize(e.to_string()))?;
    Ok(dst.into_vec())
}

fn resize_gray(img: &GrayImage, to: Dimensions) -> Result<GrayImage, StripeError> {
    let (width, height) = img.dimensions();
    let from = Dimensions { width, height };
    let data = box_resize(img.as_raw().clone(), from, to, PixelType::U8)?;
    GrayImage::from_raw(to.width, to.height, data)
        .ok_or_else(|| StripeError::Resize("resized buffer has the wrong length".to_string()))
}

fn resize_rgb(img: &RgbImage, to: Dimensions) -> Result<RgbImage, StripeError> {
    let (width, height) = img.dimensions();
    let from = Dimensions { width, height };
    let data = box_resize(img.as_raw().clone(), from, to, PixelType::U8x3)?;
    RgbImage::from_raw(to.width, to.height, data)
        .ok_or_else(|| StripeError::Resize("resized buffer has the wrong length".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn default_policy_is_fit_width() {
        assert_eq!(AspectPolicy::default(), AspectPolicy::FitWidth);
    }

    #[test]
    fn free_policy_uses_request_verbatim() {
        let target = TargetSize {
            width: 300,
            height: 50,
            aspect: AspectPolicy::Free,
        };
        assert_eq!(target.resolve(dims(100, 100)).unwrap(), dims(300, 50));
    }

    #[test]
    fn fit_width_derives_height() {
        let target = TargetSize {
            width: 200,
            height: 1,
            aspect: AspectPolicy::FitWidth,
        };
        // 640x480 -> ratio 4/3, 200 / (4/3) = 150
        assert_eq!(target.resolve(dims(640, 480)).unwrap(), dims(200, 150));
    }

    #[test]
    fn fit_height_derives_width() {
        let target = TargetSize {
            width: 1,
            height: 90,
            aspect: AspectPolicy::FitHeight,
        };
        // 300x200 -> ratio 1.5, 90 * 1.5 = 135
        assert_eq!(target.resolve(dims(300, 200)).unwrap(), dims(135, 90));
    }

    #[test]
    fn derived_dimension_rounds_to_nearest() {
        let target = TargetSize {
            width: 10,
            height: 0,
            aspect: AspectPolicy::FitWidth,
        };
        // 10 / (3/1) = 3.33 -> 3
        assert_eq!(target.resolve(dims(3, 1)).unwrap(), dims(10, 3));
    }

    #[test]
    fn degenerate_target_is_rejected() {
        let target = TargetSize {
            width: 1,
            height: 100,
            aspect: AspectPolicy::FitWidth,
        };
        // 1 / 10 = 0.1 -> 0 rows
        let result = target.resolve(dims(1000, 100));
        assert!(matches!(
            result,
            Err(StripeError::InvalidDimensions {
                width: 1,
                height: 0
            })
        ));
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let target = TargetSize {
            width: 10,
            height: 10,
            aspect: AspectPolicy::Free,
        };
        assert!(target.resolve(dims(0, 10)).is_err());
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let grid = PixelGrid::Gray(GrayImage::from_pixel(37, 23, image::Luma([128])));
        let target = TargetSize {
            width: 12,
            height: 9,
            aspect: AspectPolicy::Free,
        };
        let PixelGrid::Gray(out) = resize(&grid, &target).unwrap() else {
            panic!("expected a gray grid");
        };
        assert_eq!(out.dimensions(), (12, 9));
        assert!(out.pixels().all(|p| p.0[0].abs_diff(128) <= 1));
    }

    #[test]
    fn halving_averages_pixel_pairs() {
        // Columns alternate 0 / 200; halving the width averages each pair.
        let img = GrayImage::from_fn(4, 2, |x, _| image::Luma([if x % 2 == 0 { 0 } else { 200 }]));
        let out = resize_gray(&img, dims(2, 2)).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert!(out.pixels().all(|p| p.0[0].abs_diff(100) <= 1), "{out:?}");
    }

    #[test]
    fn fractional_downscale_stays_between_neighbours() {
        let img = GrayImage::from_fn(3, 1, |x, _| image::Luma([[0, 90, 180][x as usize]]));
        let out = resize_gray(&img, dims(2, 1)).unwrap();
        let (left, right) = (out.get_pixel(0, 0).0[0], out.get_pixel(1, 0).0[0]);
        assert!(left < 90, "left {left}");
        assert!(right > 90, "right {right}");
        assert!(left < right);
    }

    #[test]
    fn rgb_channels_resize_independently() {
        let img = RgbImage::from_pixel(6, 6, image::Rgb([10, 20, 30]));
        let out = resize_rgb(&img, dims(4, 2)).unwrap();
        assert_eq!(out.dimensions(), (4, 2));
        for p in out.pixels() {
            for (got, want) in p.0.iter().zip([10_u8, 20, 30]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", p.0);
            }
        }
    }

    #[test]
    fn upscaling_is_supported() {
        let img = GrayImage::from_fn(2, 1, |x, _| image::Luma([if x == 0 { 0 } else { 255 }]));
        let out = resize_gray(&img, dims(4, 1)).unwrap();
        assert_eq!(out.dimensions(), (4, 1));
        assert!(out.get_pixel(0, 0).0[0] <= 1);
        assert!(out.get_pixel(3, 0).0[0] >= 254);
    }

    #[test]
    fn resized_grid_keeps_its_kind() {
        let grid = PixelGrid::Rgb(RgbImage::from_pixel(8, 4, image::Rgb([1, 2, 3])));
        let target = TargetSize {
            width: 4,
            height: 0,
            aspect: AspectPolicy::FitWidth,
        };
        let out = resize(&grid, &target).unwrap();
        assert!(matches!(out, PixelGrid::Rgb(_)));
        assert_eq!(out.dimensions(), dims(4, 2));
    }

    #[test]
    fn same_size_is_a_copy() {
        let grid = PixelGrid::Gray(GrayImage::from_pixel(5, 5, image::Luma([7])));
        let target = TargetSize {
            width: 5,
            height: 5,
            aspect: AspectPolicy::Free,
        };
        assert_eq!(resize(&grid, &target).unwrap(), grid);
    }
}
