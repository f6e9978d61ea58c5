// SPDX-License-Identifier: LGPL-3.0-only
//! Crop and scale a decoded image to an exact thumbnail size.

use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::ThumbnailSize;
use image::imageops::FilterType;
use image::DynamicImage;

const FILTER: FilterType = FilterType::CatmullRom;

/// Which geometric path a source takes to reach the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCase {
    /// Source already has the target size.
    Unchanged,
    /// Square source.
    Square,
    /// At least as large as the target on both axes.
    CropThenScale,
    /// Larger on one axis, smaller or equal on the other.
    ScaleThenCrop,
    /// Smaller than the target on both axes.
    Enlarge,
}

/// Pick the resize path for a `width` x `height` source. Checks run in order.
pub fn classify(width: u32, height: u32, target: ThumbnailSize) -> ResizeCase {
    let (tw, th) = (target.width, target.height);

    if width == tw && height == th {
        ResizeCase::Unchanged
    } else if width == height {
        ResizeCase::Square
    } else if width >= tw && height >= th {
        ResizeCase::CropThenScale
    } else if (width <= tw && height >= th) || (width >= tw && height <= th) {
        ResizeCase::ScaleThenCrop
    } else {
        ResizeCase::Enlarge
    }
}

/// Produce an image of exactly `target` size from `image`.
///
/// Crops are always centered on the axis being reduced. A square source
/// going to a square target is only scaled; every other case crops the
/// source to the target's aspect ratio and scales the crop to the target.
pub fn resize_to_thumbnail(
    image: &DynamicImage,
    target: ThumbnailSize,
) -> Result<DynamicImage, ThumbnailError> {
    if !target.is_valid() {
        return Err(ThumbnailError::InvalidSize {
            width: target.width,
            height: target.height,
        });
    }
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ThumbnailError::InvalidSize { width, height });
    }

    let case = classify(width, height, target);
    log::trace!("Resizing {}x{} to {} via {:?}", width, height, target, case);

    // Crop before scaling: the only scaled image is the target itself.
    let resized = match case {
        ResizeCase::Unchanged => image.clone(),
        ResizeCase::Square if target.width == target.height => {
            image.resize_exact(target.width, target.height, FILTER)
        },
        ResizeCase::Square
        | ResizeCase::Enlarge
        | ResizeCase::CropThenScale
        | ResizeCase::ScaleThenCrop => {
            let cropped = crop_to_aspect(image, target);
            cropped.resize_exact(target.width, target.height, FILTER)
        },
    };

    debug_assert_eq!(ThumbnailSize::of(&resized), target);
    Ok(resized)
}

/// Centered crop of the longer relative axis to the target's aspect ratio.
fn crop_to_aspect(image: &DynamicImage, target: ThumbnailSize) -> DynamicImage {
    let (w, h) = (u64::from(image.width()), u64::from(image.height()));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));

    let (crop_w, crop_h) = if w * th > h * tw {
        let crop_w = ((h * tw + th / 2) / th).clamp(1, w);
        (crop_w as u32, image.height())
    } else {
        let crop_h = ((w * th + tw / 2) / tw).clamp(1, h);
        (image.width(), crop_h as u32)
    };

    let x = (image.width() - crop_w) / 2;
    let y = (image.height() - crop_h) / 2;
    image.crop_imm(x, y, crop_w, crop_h)
}
