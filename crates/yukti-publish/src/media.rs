//! Upload validation, resizing and staging for post media.
//!
//! Validation fails closed. Optimization is best-effort: any decode or encode
//! error hands back the original file as [`Optimized::Original`].

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};
use thiserror::Error;

use yukti_core::AppConfig;

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;

const JPEG_QUALITY: u8 = 85;

/// Why a media file was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaRejection {
    #[error("file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("extension '{0}' is not allowed")]
    DisallowedExtension(String),

    #[error("could not read file metadata: {0}")]
    Unreadable(String),
}

/// Result of [`MediaHandler::optimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optimized {
    Written(PathBuf),
    /// Optimization failed; the untouched input is used instead.
    Original { path: PathBuf, reason: String },
}

impl Optimized {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Optimized::Written(path) | Optimized::Original { path, .. } => path,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Optimized::Original { .. })
    }
}

/// Lowercased text after the last dot of the file name.
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone)]
pub struct MediaHandler {
    max_bytes: u64,
}

impl MediaHandler {
    #[must_use]
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_upload_bytes)
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks existence, type, size and extension, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first [`MediaRejection`] that applies.
    pub fn check(&self, path: &Path) -> Result<(), MediaRejection> {
        if !path.exists() {
            return Err(MediaRejection::NotFound(path.to_path_buf()));
        }
        let metadata = fs::metadata(path).map_err(|e| MediaRejection::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(MediaRejection::NotAFile(path.to_path_buf()));
        }
        if metadata.len() > self.max_bytes {
            return Err(MediaRejection::TooLarge {
                size: metadata.len(),
                max: self.max_bytes,
            });
        }
        let ext = extension_of(path).unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(MediaRejection::DisallowedExtension(ext));
        }
        Ok(())
    }

    /// `true` when `path` passes [`MediaHandler::check`]; rejections are logged.
    #[must_use]
    pub fn validate(&self, path: &Path) -> bool {
        match self.check(path) {
            Ok(()) => true,
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "media rejected");
                false
            }
        }
    }

    /// Shrinks the image to fit 1920×1080 and re-encodes it.
    ///
    /// Writes to `output`, or `optimized_{filename}` beside the input. Images
    /// already within bounds are re-encoded at their original size.
    #[must_use]
    pub fn optimize(&self, path: &Path, output: Option<&Path>) -> Optimized {
        let output = output.map_or_else(|| optimized_path(path), Path::to_path_buf);

        match write_optimized(path, &output) {
            Ok(()) => {
                tracing::debug!(
                    input = %path.display(),
                    output = %output.display(),
                    "media optimized",
                );
                Optimized::Written(output)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "media optimization failed, using original",
                );
                Optimized::Original {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Copies an uploaded file into `dir` as `{YYYYmmdd_HHMMSS}_{filename}`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `src` has no file name, `dir` cannot be
    /// created, or the copy fails.
    pub fn stage_upload(&self, src: &Path, dir: &Path) -> io::Result<PathBuf> {
        let filename = src.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no file name in {}", src.display()),
            )
        })?;
        fs::create_dir_all(dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let dest = dir.join(format!("{stamp}_{}", filename.to_string_lossy()));
        fs::copy(src, &dest)?;

        tracing::debug!(src = %src.display(), dest = %dest.display(), "upload staged");
        Ok(dest)
    }
}

fn optimized_path(path: &Path) -> PathBuf {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("optimized_{filename}"))
}

fn fit_within_bounds(img: DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= MAX_WIDTH && height <= MAX_HEIGHT {
        return img;
    }
    img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3)
}

fn write_optimized(input: &Path, output: &Path) -> Result<(), ImageError> {
    let img = fit_within_bounds(image::open(input)?);

    match extension_of(output).as_deref() {
        Some("jpg" | "jpeg") => {
            let mut writer = BufWriter::new(File::create(output)?);
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))?;
            writer.flush()?;
        }
        Some("png") => {
            let mut writer = BufWriter::new(File::create(output)?);
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Best,
                PngFilter::Adaptive,
            ))?;
            writer.flush()?;
        }
        _ => img.save(output)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::RgbImage;
    use tempfile::TempDir;

    use super::*;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
            .save(&path)
            .unwrap();
        path
    }

    fn dimensions(path: &Path) -> (u32, u32) {
        image::image_dimensions(path).unwrap()
    }

    #[test]
    fn accepts_small_png() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "banner.png", 8, 8);
        assert!(MediaHandler::new(10_485_760).validate(&path));
    }

    #[test]
    fn rejects_nonexistent_path() {
        let handler = MediaHandler::new(10_485_760);
        let path = Path::new("/definitely/not/here.png");
        assert!(!handler.validate(path));
        assert_eq!(handler.check(path), Err(MediaRejection::NotFound(path.to_path_buf())));
    }

    #[test]
    fn rejects_oversize_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.png");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        let handler = MediaHandler::new(1024);
        assert_eq!(
            handler.check(&path),
            Err(MediaRejection::TooLarge { size: 2048, max: 1024 })
        );
        assert!(!handler.validate(&path));
    }

    #[test]
    fn rejects_disallowed_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.bmp");
        fs::write(&path, b"BM").unwrap();

        assert_eq!(
            MediaHandler::new(10_485_760).check(&path),
            Err(MediaRejection::DisallowedExtension("bmp".to_string()))
        );
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("PHOTO.JPG");
        fs::write(&path, b"jpeg-ish").unwrap();
        assert!(MediaHandler::new(10_485_760).validate(&path));
    }

    #[test]
    fn rejects_directory() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder.png");
        fs::create_dir(&sub).unwrap();
        assert_eq!(MediaHandler::new(10_485_760).check(&sub), Err(MediaRejection::NotAFile(sub)));
    }

    #[test]
    fn optimize_shrinks_large_image_preserving_aspect() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "wide.png", 3840, 1920);

        let result = MediaHandler::new(u64::MAX).optimize(&path, None);

        assert_eq!(result, Optimized::Written(dir.path().join("optimized_wide.png")));
        assert_eq!(dimensions(result.path()), (1920, 960));
    }

    #[test]
    fn optimize_never_upscales() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "small.png", 120, 60);
        let output = dir.path().join("small.jpg");

        let result = MediaHandler::new(u64::MAX).optimize(&path, Some(&output));

        assert_eq!(result, Optimized::Written(output.clone()));
        assert_eq!(dimensions(&output), (120, 60));
    }

    #[test]
    fn optimize_degrades_on_undecodable_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();

        let result = MediaHandler::new(u64::MAX).optimize(&path, None);

        assert!(result.is_degraded());
        assert_eq!(result.path(), path.as_path());
    }

    #[test]
    fn stage_upload_prefixes_timestamp() {
        let src_dir = TempDir::new().unwrap();
        let upload_dir = TempDir::new().unwrap();
        let src = write_png(&src_dir, "launch.png", 4, 4);

        let staged = MediaHandler::new(u64::MAX)
            .stage_upload(&src, &upload_dir.path().join("uploads"))
            .unwrap();

        let name = staged.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_launch.png"), "got {name}");
        let stamp = name.trim_end_matches("_launch.png");
        assert_eq!(stamp.len(), "20240101_120000".len());
        assert!(staged.exists());
    }
}
