//! Instagram framer
//!
//! Places each photo, scaled to fit and outlined in black, on a square
//! white canvas, then saves it as a high quality JPEG next to its siblings
//! in the destination directory.

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::FrameConfig;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Size and position of a photo on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub hoffset: u32,
    pub voffset: u32,
}

impl FrameLayout {
    /// Fit a `width × height` photo inside `canvas - border`, centred.
    ///
    /// Photos already small enough keep their size. Scaled sides are
    /// truncated, and never drop below one pixel.
    pub fn compute(width: u32, height: u32, canvas: u32, border: u32) -> Self {
        let inner = canvas.saturating_sub(border);
        let shim = border / 2;
        let max_dimension = width.max(height).max(1);

        let (width, height) = if max_dimension > inner {
            let scale = |side: u32| {
                ((u64::from(side) * u64::from(inner)) / u64::from(max_dimension)).max(1) as u32
            };
            (scale(width), scale(height))
        } else {
            (width, height)
        };

        Self {
            width,
            height,
            hoffset: inner.saturating_sub(width) / 2 + shim,
            voffset: inner.saturating_sub(height) / 2 + shim,
        }
    }
}

/// Frames photos according to a [`FrameConfig`]
#[derive(Debug, Clone)]
pub struct Framer {
    config: FrameConfig,
}

impl Framer {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Output path for `source` inside `destination`
    pub fn destination_for(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        let Some(basename) = source.file_name() else {
            bail!("Cannot frame {}: path has no file name", source.display());
        };
        let mut name = OsString::from(&self.config.prefix);
        name.push(basename);
        Ok(destination.join(name))
    }

    /// Render the framed canvas for a decoded photo
    pub fn frame_image(&self, image: &DynamicImage) -> RgbImage {
        let (width, height) = image.dimensions();
        let layout = FrameLayout::compute(width, height, self.config.canvas, self.config.border);

        let resized = if (layout.width, layout.height) == (width, height) {
            image.to_rgb8()
        } else {
            image
                .resize_exact(layout.width, layout.height, FilterType::Lanczos3)
                .to_rgb8()
        };

        let outline = self.config.outline;
        let mut outlined = RgbImage::from_pixel(
            layout.width + 2 * outline,
            layout.height + 2 * outline,
            BLACK,
        );
        imageops::overlay(&mut outlined, &resized, i64::from(outline), i64::from(outline));

        let mut canvas = RgbImage::from_pixel(self.config.canvas, self.config.canvas, WHITE);
        imageops::overlay(
            &mut canvas,
            &outlined,
            i64::from(layout.hoffset),
            i64::from(layout.voffset),
        );
        canvas
    }

    /// Frame one file and write the result into `destination`
    pub fn frame_file(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        let image = ImageReader::open(source)
            .with_context(|| format!("Failed to open {}", source.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to read {}", source.display()))?
            .decode()
            .with_context(|| format!("Failed to decode {}", source.display()))?;

        let canvas = self.frame_image(&image);
        let output = self.destination_for(source, destination)?;

        let writer = BufWriter::new(
            File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?,
        );
        canvas
            .write_with_encoder(JpegEncoder::new_with_quality(writer, self.config.quality))
            .with_context(|| format!("Failed to encode {}", output.display()))?;

        debug!("Framed {} as {}", source.display(), output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_config() -> FrameConfig {
        FrameConfig {
            canvas: 200,
            border: 20,
            outline: 1,
            quality: 95,
            prefix: "Final-".to_string(),
        }
    }

    #[test]
    fn test_layout_scales_large_photos() {
        let layout = FrameLayout::compute(2000, 1000, 1080, 20);
        assert_eq!(
            layout,
            FrameLayout {
                width: 1060,
                height: 530,
                hoffset: 10,
                voffset: 275
            }
        );
    }

    #[test]
    fn test_layout_keeps_small_photos() {
        let layout = FrameLayout::compute(500, 400, 1080, 20);
        assert_eq!((layout.width, layout.height), (500, 400));
        assert_eq!((layout.hoffset, layout.voffset), (290, 340));
    }

    #[test]
    fn test_layout_never_collapses_a_side() {
        let layout = FrameLayout::compute(10_000, 1, 1080, 20);
        assert_eq!((layout.width, layout.height), (1060, 1));
    }

    #[test]
    fn test_frame_image_places_photo() {
        let framer = Framer::new(small_config());
        let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([128, 128, 128])));
        let canvas = framer.frame_image(&photo);

        assert_eq!(canvas.dimensions(), (200, 200));
        assert_eq!(canvas.get_pixel(0, 0), &WHITE);
        // hoffset = (180 - 100) / 2 + 10, voffset = (180 - 50) / 2 + 10
        assert_eq!(canvas.get_pixel(50, 75), &BLACK);
        assert_eq!(canvas.get_pixel(51, 76), &Rgb([128, 128, 128]));
        assert_eq!(canvas.get_pixel(150, 125), &Rgb([128, 128, 128]));
        assert_eq!(canvas.get_pixel(151, 126), &BLACK);
        assert_eq!(canvas.get_pixel(199, 199), &WHITE);
    }

    #[test]
    fn test_frame_file_writes_prefixed_jpeg() {
        let source_dir = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let source = source_dir.path().join("wide.png");
        RgbImage::from_pixel(400, 100, Rgb([10, 20, 30]))
            .save(&source)
            .unwrap();

        let framer = Framer::new(small_config());
        let output = framer.frame_file(&source, destination.path()).unwrap();

        assert_eq!(output, destination.path().join("Final-wide.png"));
        let framed = ImageReader::open(&output)
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(framed.format(), Some(image::ImageFormat::Jpeg));
        assert_eq!(framed.decode().unwrap().dimensions(), (200, 200));
    }

    #[test]
    fn test_frame_file_rejects_garbage() {
        let source_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("junk.jpg");
        std::fs::write(&source, b"junk").unwrap();

        let framer = Framer::new(small_config());
        assert!(framer.frame_file(&source, source_dir.path()).is_err());
    }

    #[test]
    fn test_destination_keeps_basename() {
        let framer = Framer::new(small_config());
        assert_eq!(
            framer
                .destination_for(Path::new("/in/pier.jpg"), Path::new("/out"))
                .unwrap(),
            PathBuf::from("/out/Final-pier.jpg")
        );
        assert!(framer.destination_for(Path::new("/"), Path::new("/out")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_destination_keeps_non_utf8_basename() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let framer = Framer::new(small_config());
        let source = Path::new("/in").join(OsStr::from_bytes(b"caf\xE9.jpg"));
        let output = framer.destination_for(&source, Path::new("/out")).unwrap();
        assert_eq!(
            output.file_name().unwrap().as_bytes(),
            b"Final-caf\xE9.jpg"
        );
    }
}
