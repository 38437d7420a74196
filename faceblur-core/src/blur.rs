// ============================================================================
// faceblur-core/src/blur.rs
// ============================================================================
//
// REGION BLURRER: Redaction of Detected Regions
//
// Given a detection box and the run's blur style, this module expands the
// box, clamps it to the frame, sizes a blur kernel from the region and writes
// the blurred pixels back into the frame. It is a pure image transform: the
// only side effect is on the frame passed in, and the same frame, box and
// style always produce the same output.
//
// KEY COMPONENTS:
// - RegionBlurrer: Applies the run's single blur style to boxes
// - expanded_roi: Box expansion and clamping
// - kernel_size / gaussian_sigma: Kernel sizing from region dimensions
//
// AI-ASSISTANT-INFO: Region expansion, kernel sizing and blur dispatch

// ---- Internal crate imports ----
use crate::detection::DetectionBox;
use crate::pipeline::Frame;
use crate::profile::BlurStyle;

// ---- External crate imports ----
use image::{GrayImage, Luma, Rgb, RgbImage, imageops};
use imageproc::drawing::draw_filled_ellipse_mut;
use imageproc::filter::{box_filter, gaussian_blur_f32};

/// Smallest Gaussian kernel used, in pixels.
pub const MIN_KERNEL_SIZE: u32 = 51;

/// Side of the flat kernel used by [`BlurStyle::BoxBlur`].
pub const BOX_BLUR_KERNEL: u32 = 51;

/// Clamped region of a frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Expands `bbox` by `scale` around its centre and clamps it to the frame.
///
/// The expanded width is truncated to whole pixels and the left/top edge is
/// pulled back by half the growth (floored), then clamped at zero; the far
/// edge is clamped at the frame size. Returns `None` when either dimension
/// of the result is not positive.
#[must_use]
pub fn expanded_roi(frame_width: u32, frame_height: u32, bbox: &DetectionBox, scale: f64) -> Option<Roi> {
    let width = bbox.width();
    let height = bbox.height();
    let new_width = (width as f64 * scale) as i64;
    let new_height = (height as f64 * scale) as i64;
    if new_width <= 0 || new_height <= 0 {
        return None;
    }

    let x1 = (i64::from(bbox.x1) - (new_width - width).div_euclid(2)).max(0);
    let y1 = (i64::from(bbox.y1) - (new_height - height).div_euclid(2)).max(0);
    let x2 = (x1 + new_width).min(i64::from(frame_width));
    let y2 = (y1 + new_height).min(i64::from(frame_height));

    let roi_width = x2 - x1;
    let roi_height = y2 - y1;
    if roi_width <= 0 || roi_height <= 0 {
        return None;
    }

    Some(Roi {
        x: x1 as u32,
        y: y1 as u32,
        width: roi_width as u32,
        height: roi_height as u32,
    })
}

/// Odd Gaussian kernel size for a region: `max(51, floor(min/10)*4 + 1)`.
#[must_use]
pub fn kernel_size(width: u32, height: u32) -> u32 {
    MIN_KERNEL_SIZE.max((width.min(height) / 10) * 4 + 1)
}

/// Standard deviation matching a Gaussian kernel of side `kernel`.
#[must_use]
pub fn gaussian_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Applies one blur style to every box it is given.
#[derive(Debug, Clone, Copy)]
pub struct RegionBlurrer {
    style: BlurStyle,
}

impl RegionBlurrer {
    #[must_use]
    pub fn new(style: BlurStyle) -> Self {
        Self { style }
    }

    #[must_use]
    pub fn style(&self) -> BlurStyle {
        self.style
    }

    /// Blurs the region around `bbox` in place.
    pub fn apply(&self, frame: &mut Frame, bbox: &DetectionBox) {
        blur_region(frame, bbox, self.style);
    }
}

/// Blurs the region around `bbox` in place using `style`.
///
/// Degenerate boxes and boxes entirely outside the frame are skipped.
pub fn blur_region(frame: &mut Frame, bbox: &DetectionBox, style: BlurStyle) {
    let Some(roi) = expanded_roi(frame.width(), frame.height(), bbox, style.scale_factor()) else {
        log::trace!("Skipping degenerate box {:?}", bbox);
        return;
    };

    let region = imageops::crop_imm(&*frame, roi.x, roi.y, roi.width, roi.height).to_image();
    let patch = match style {
        BlurStyle::BoxBlur => box_blur(&region, BOX_BLUR_KERNEL / 2),
        BlurStyle::RectGaussian => {
            gaussian_blur_f32(&region, gaussian_sigma(kernel_size(roi.width, roi.height)))
        }
        BlurStyle::EllipseGaussian => {
            let blurred =
                gaussian_blur_f32(&region, gaussian_sigma(kernel_size(roi.width, roi.height)));
            composite_ellipse(&region, &blurred)
        }
    };

    imageops::replace(frame, &patch, i64::from(roi.x), i64::from(roi.y));
}

/// Flat box blur, run per channel.
fn box_blur(region: &RgbImage, radius: u32) -> RgbImage {
    let (width, height) = region.dimensions();
    let planes: Vec<GrayImage> = (0..3)
        .map(|channel| {
            let plane = GrayImage::from_fn(width, height, |x, y| Luma([region.get_pixel(x, y)[channel]]));
            box_filter(&plane, radius, radius)
        })
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            planes[0].get_pixel(x, y)[0],
            planes[1].get_pixel(x, y)[0],
            planes[2].get_pixel(x, y)[0],
        ])
    })
}

/// Blurred pixels inside the inscribed ellipse, original pixels outside.
fn composite_ellipse(original: &RgbImage, blurred: &RgbImage) -> RgbImage {
    let (width, height) = original.dimensions();
    let mut mask = GrayImage::new(width, height);
    let center = ((width / 2) as i32, (height / 2) as i32);
    draw_filled_ellipse_mut(&mut mask, center, (width / 2) as i32, (height / 2) as i32, Luma([255u8]));

    RgbImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] == 255 {
            *blurred.get_pixel(x, y)
        } else {
            *original.get_pixel(x, y)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Frame {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn bbox(x1: i32, y1: i32, x2: i32, y2: i32) -> DetectionBox {
        DetectionBox {
            x1,
            y1,
            x2,
            y2,
            class_id: 0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_kernel_size_formula() {
        assert_eq!(kernel_size(40, 300), 51);
        assert_eq!(kernel_size(200, 200), 81);
        assert_eq!(kernel_size(1000, 209), 81);
        assert_eq!(kernel_size(1, 1), 51);
        for side in [0, 13, 57, 131, 640, 999] {
            assert_eq!(kernel_size(side, side) % 2, 1, "kernel must be odd for {side}");
        }
    }

    #[test]
    fn test_gaussian_sigma() {
        assert!((gaussian_sigma(51) - 7.7).abs() < 1e-4);
        assert!((gaussian_sigma(81) - 12.2).abs() < 1e-4);
    }

    #[test]
    fn test_expanded_roi_inside_frame() {
        let roi = expanded_roi(640, 480, &bbox(100, 100, 150, 200), 1.6).unwrap();
        assert_eq!(
            roi,
            Roi {
                x: 85,
                y: 70,
                width: 80,
                height: 160
            }
        );
    }

    #[test]
    fn test_expanded_roi_clamps_at_edges() {
        let roi = expanded_roi(100, 100, &bbox(0, 0, 50, 50), 1.6).unwrap();
        assert_eq!((roi.x, roi.y, roi.width, roi.height), (0, 0, 80, 80));

        let roi = expanded_roi(100, 100, &bbox(60, 60, 100, 100), 1.6).unwrap();
        assert_eq!((roi.x, roi.y), (48, 48));
        assert_eq!((roi.width, roi.height), (52, 52));
    }

    #[test]
    fn test_no_expansion_for_scale_one() {
        let roi = expanded_roi(640, 480, &bbox(10, 20, 60, 90), 1.0).unwrap();
        assert_eq!(
            roi,
            Roi {
                x: 10,
                y: 20,
                width: 50,
                height: 70
            }
        );
    }

    #[test]
    fn test_degenerate_boxes_are_skipped() {
        assert!(expanded_roi(100, 100, &bbox(50, 50, 50, 60), 1.6).is_none());
        assert!(expanded_roi(100, 100, &bbox(50, 50, 40, 60), 1.6).is_none());
        assert!(expanded_roi(100, 100, &bbox(150, 150, 170, 170), 1.6).is_none());

        for style in [BlurStyle::EllipseGaussian, BlurStyle::RectGaussian, BlurStyle::BoxBlur] {
            let original = checkerboard(100, 100);
            let mut frame = original.clone();
            blur_region(&mut frame, &bbox(30, 30, 30, 40), style);
            assert_eq!(frame, original, "{style} modified the frame for a degenerate box");
        }
    }

    #[test]
    fn test_box_spanning_coordinate_range_covers_frame() {
        let roi = expanded_roi(64, 48, &bbox(i32::MIN + 1, 0, i32::MAX, 10), 1.6).unwrap();
        assert_eq!((roi.x, roi.width), (0, 64));
        assert!(expanded_roi(64, 48, &bbox(i32::MAX, 0, i32::MIN, 10), 1.6).is_none());

        for style in [BlurStyle::EllipseGaussian, BlurStyle::RectGaussian, BlurStyle::BoxBlur] {
            let mut frame = checkerboard(64, 48);
            blur_region(&mut frame, &bbox(i32::MIN, i32::MIN, i32::MAX, i32::MAX), style);
            assert_ne!(frame, checkerboard(64, 48), "{style} left the frame untouched");
        }
    }

    #[test]
    fn test_blur_is_deterministic() {
        for style in [BlurStyle::EllipseGaussian, BlurStyle::RectGaussian, BlurStyle::BoxBlur] {
            let blurrer = RegionBlurrer::new(style);
            let mut first = checkerboard(120, 90);
            let mut second = checkerboard(120, 90);
            blurrer.apply(&mut first, &bbox(30, 20, 80, 70));
            blurrer.apply(&mut second, &bbox(30, 20, 80, 70));
            assert_eq!(first, second);
            assert_ne!(first, checkerboard(120, 90));
        }
    }

    #[test]
    fn test_pixels_outside_roi_untouched() {
        let original = checkerboard(200, 200);
        let mut frame = original.clone();
        blur_region(&mut frame, &bbox(80, 80, 120, 120), BlurStyle::RectGaussian);
        // Expanded ROI is (68, 68) .. (132, 132).
        for (x, y) in [(0, 0), (67, 100), (100, 67), (132, 100), (199, 199)] {
            assert_eq!(frame.get_pixel(x, y), original.get_pixel(x, y));
        }
        assert_ne!(frame.get_pixel(100, 100), original.get_pixel(100, 100));
    }

    #[test]
    fn test_ellipse_keeps_roi_corners() {
        let original = checkerboard(200, 200);

        let mut ellipse = original.clone();
        blur_region(&mut ellipse, &bbox(80, 80, 120, 120), BlurStyle::EllipseGaussian);
        let mut rect = original.clone();
        blur_region(&mut rect, &bbox(80, 80, 120, 120), BlurStyle::RectGaussian);

        // ROI corner (68, 68) lies outside the inscribed ellipse.
        assert_eq!(ellipse.get_pixel(68, 68), original.get_pixel(68, 68));
        assert_ne!(rect.get_pixel(68, 68), original.get_pixel(68, 68));
        // The centre is blurred the same way in both styles.
        assert_eq!(ellipse.get_pixel(100, 100), rect.get_pixel(100, 100));
    }

    #[test]
    fn test_box_blur_stays_inside_raw_box() {
        let original = checkerboard(200, 200);
        let mut frame = original.clone();
        blur_region(&mut frame, &bbox(80, 80, 120, 120), BlurStyle::BoxBlur);
        assert_eq!(frame.get_pixel(79, 100), original.get_pixel(79, 100));
        assert_eq!(frame.get_pixel(120, 100), original.get_pixel(120, 100));
        assert_ne!(frame.get_pixel(100, 100), original.get_pixel(100, 100));
    }
}
