use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::ImageRecord;

/// Pixel value treated as border padding and left out of the mean
const PURE_WHITE: [u8; 3] = [255, 255, 255];

const MAX_CHANNEL: f64 = 255.0;

/// Why an image could not be evaluated
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No content pixels in {} (every pixel is pure white or unreadable)", path.display())]
    NoContent { path: PathBuf },
}

impl EvaluationError {
    pub fn path(&self) -> &Path {
        match self {
            EvaluationError::Open { path, .. }
            | EvaluationError::Decode { path, .. }
            | EvaluationError::NoContent { path } => path,
        }
    }
}

/// Computes the shade score of an image file
#[derive(Debug, Clone, Copy)]
pub struct ShadeEvaluator {
    batches: u32,
}

impl ShadeEvaluator {
    pub fn new(batches: u32) -> Self {
        Self { batches }
    }

    /// Decode `path` and evaluate it. The file is closed on every return path.
    pub fn evaluate(&self, path: &Path) -> Result<ImageRecord, EvaluationError> {
        let open_error = |source| EvaluationError::Open {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .map_err(open_error)?
            .with_guessed_format()
            .map_err(open_error)?
            .decode()
            .map_err(|source| EvaluationError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        self.evaluate_image(path, &image)
    }

    /// Evaluate an already decoded image
    pub fn evaluate_image(
        &self,
        path: &Path,
        image: &DynamicImage,
    ) -> Result<ImageRecord, EvaluationError> {
        let (width, height) = image.dimensions();
        let rgb = image.to_rgb8();

        let raw = raw_shade(rgb.as_raw()).ok_or_else(|| EvaluationError::NoContent {
            path: path.to_path_buf(),
        })?;

        Ok(ImageRecord {
            filepath: path.to_path_buf(),
            shade: normalize(raw, self.batches),
            is_square: width == height,
        })
    }
}

/// Mean of the channel values of one pixel, or `None` when the pixel must
/// not count: it is pure white, or its channels could not all be read.
pub fn pixel_shade(channels: &[u8]) -> Option<f64> {
    let [red, green, blue]: [u8; 3] = channels.try_into().ok()?;
    if [red, green, blue] == PURE_WHITE {
        return None;
    }
    Some(round2(
        (f64::from(red) + f64::from(green) + f64::from(blue)) / 3.0,
    ))
}

/// Mean pixel shade over packed 8-bit RGB samples, in `[0, 255]`.
///
/// Returns `None` when no pixel counts toward the mean.
pub fn raw_shade(samples: &[u8]) -> Option<f64> {
    let (sum, count) = samples
        .chunks(3)
        .filter_map(pixel_shade)
        .fold((0.0_f64, 0_u64), |(sum, count), shade| (sum + shade, count + 1));

    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

/// Map a raw `[0, 255]` shade onto `[0, batches]`
pub fn normalize(raw: f64, batches: u32) -> f64 {
    round2(raw / (MAX_CHANNEL / f64::from(batches)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    #[test]
    fn test_pixel_shade() {
        assert_eq!(pixel_shade(&[30, 60, 90]), Some(60.0));
        assert_eq!(pixel_shade(&[1, 2, 2]), Some(1.67));
        assert_eq!(pixel_shade(&[255, 255, 255]), None);
        assert_eq!(pixel_shade(&[255, 255, 254]), Some(254.67));
        // Incomplete pixel
        assert_eq!(pixel_shade(&[10, 20]), None);
    }

    #[test]
    fn test_raw_shade_skips_partial_trailing_pixel() {
        let samples = [10, 10, 10, 20, 20, 20, 99];
        assert_eq!(raw_shade(&samples), Some(15.0));
    }

    #[test]
    fn test_raw_shade_all_white_has_no_content() {
        assert_eq!(raw_shade(&[255; 12]), None);
        assert_eq!(raw_shade(&[]), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(255.0, 10), 10.0);
        assert_eq!(normalize(0.0, 10), 0.0);
        assert_eq!(normalize(127.0, 10), 4.98);
        assert_eq!(normalize(255.0, 4), 4.0);
        assert_eq!(normalize(25.5, 10), 1.0);
    }

    #[test]
    fn test_white_border_is_ignored() {
        // Left half pure white, right half pure black
        let image = ImageBuffer::from_fn(10, 10, |x, _| {
            if x < 5 { Rgb([255u8; 3]) } else { Rgb([0u8; 3]) }
        });
        let record = ShadeEvaluator::new(10)
            .evaluate_image(Path::new("half.jpg"), &DynamicImage::ImageRgb8(image))
            .unwrap();
        assert_eq!(record.shade, 0.0);
    }

    #[test]
    fn test_white_border_around_gray_content() {
        let image = ImageBuffer::from_fn(20, 20, |x, y| {
            if x < 2 || y < 2 || x >= 18 || y >= 18 {
                Rgb([255u8; 3])
            } else {
                Rgb([102u8; 3])
            }
        });
        let record = ShadeEvaluator::new(10)
            .evaluate_image(Path::new("framed.jpg"), &DynamicImage::ImageRgb8(image))
            .unwrap();
        assert_eq!(record.shade, 4.0);
    }

    #[test]
    fn test_full_white_image_is_not_evaluable() {
        let result = ShadeEvaluator::new(10).evaluate_image(Path::new("white.jpg"), &solid(4, 4, 255));
        assert!(matches!(result, Err(EvaluationError::NoContent { .. })));
    }

    #[test]
    fn test_pure_black_normalizes_to_zero() {
        let record = ShadeEvaluator::new(10)
            .evaluate_image(Path::new("black.jpg"), &solid(3, 3, 0))
            .unwrap();
        assert_eq!(record.shade, 0.0);
    }

    #[test]
    fn test_is_square() {
        let evaluator = ShadeEvaluator::new(10);
        let square = evaluator.evaluate_image(Path::new("s.jpg"), &solid(8, 8, 50)).unwrap();
        let wide = evaluator.evaluate_image(Path::new("w.jpg"), &solid(8, 4, 50)).unwrap();
        assert!(square.is_square);
        assert!(!wide.is_square);
    }

    #[test]
    fn test_grayscale_images_are_supported() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 5, Luma([51])));
        let record = ShadeEvaluator::new(10)
            .evaluate_image(Path::new("gray.jpg"), &image)
            .unwrap();
        assert_eq!(record.shade, 2.0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let image = ImageBuffer::from_fn(16, 9, |x, y| Rgb([(x * 13) as u8, (y * 17) as u8, 77]));
        let image = DynamicImage::ImageRgb8(image);
        let evaluator = ShadeEvaluator::new(10);
        let first = evaluator.evaluate_image(Path::new("p.jpg"), &image).unwrap();
        let second = evaluator.evaluate_image(Path::new("p.jpg"), &image).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_file_by_content() {
        let temp_dir = TempDir::new().unwrap();
        // PNG content behind a .jpg name is still decoded
        let path = temp_dir.path().join("mislabeled.jpg");
        let mut bytes = std::io::Cursor::new(Vec::new());
        solid(6, 6, 204)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        fs::write(&path, bytes.into_inner()).unwrap();

        let record = ShadeEvaluator::new(10).evaluate(&path).unwrap();
        assert_eq!(record.shade, 8.0);
        assert!(record.is_square);
        assert_eq!(record.filepath, path);
    }

    #[test]
    fn test_undecodable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not an image").unwrap();

        let error = ShadeEvaluator::new(10).evaluate(&path).unwrap_err();
        assert!(matches!(error, EvaluationError::Decode { .. }));
        assert_eq!(error.path(), path.as_path());
        assert!(error.to_string().contains("broken.jpg"));
    }

    #[test]
    fn test_missing_file() {
        let error = ShadeEvaluator::new(10)
            .evaluate(Path::new("/no/such/photo.jpg"))
            .unwrap_err();
        assert!(matches!(error, EvaluationError::Open { .. }));
    }
}
