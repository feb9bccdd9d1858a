//! Image selection
//!
//! Attaching a photo to a session goes through the [`ImagePicker`] trait:
//! ask for permission, then let the user pick one image. The picker hands
//! back a local URI, or reports that the user cancelled.
//!
//! [`FileImagePicker`] is the terminal implementation. It takes a source
//! file (given up front or typed at a prompt), optionally centre-crops it
//! to the requested aspect ratio, re-encodes it as JPEG into the images
//! directory and returns a `file://` URI to the copy.

use crate::config::ImagesConfig;
use crate::error::{Result, TallyError};
use crate::prompt::read_line;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Outcome of a pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    /// Local reference to the picked image
    Picked { uri: String },
    /// The user backed out without choosing
    Cancelled,
}

/// How a picked image is prepared
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickOptions {
    /// Crop to `aspect` before returning
    pub allows_editing: bool,
    /// Width:height ratio used when cropping
    pub aspect: (u32, u32),
    /// Encoding quality in (0.0, 1.0]
    pub quality: f32,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            allows_editing: true,
            aspect: (4, 3),
            quality: 0.8,
        }
    }
}

impl From<&ImagesConfig> for PickOptions {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            allows_editing: config.allow_editing,
            aspect: (config.aspect_width, config.aspect_height),
            quality: config.quality,
        }
    }
}

/// Source of user-chosen images
#[async_trait::async_trait]
pub trait ImagePicker: Send + Sync {
    /// Ask for access to the image library
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Let the user choose a single image
    async fn pick(&self, options: &PickOptions) -> Result<PickResult>;

    /// Release an image this picker produced that is no longer referenced
    ///
    /// URIs the picker did not produce are left alone.
    async fn discard(&self, uri: &str) -> Result<()>;
}

/// Picks images from the local filesystem
#[derive(Debug, Clone)]
pub struct FileImagePicker {
    source: Option<PathBuf>,
    images_dir: PathBuf,
}

impl FileImagePicker {
    /// Create a picker that copies into `images_dir`
    ///
    /// With `source == None` the user is prompted for a path when picking;
    /// an empty answer cancels.
    pub fn new(source: Option<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            images_dir: images_dir.into(),
        }
    }

    async fn choose_source(&self) -> Result<Option<PathBuf>> {
        if let Some(source) = &self.source {
            return Ok(Some(source.clone()));
        }
        let answer = read_line("Image path (empty to cancel): ".to_string()).await?;
        Ok(answer
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .map(PathBuf::from))
    }
}

#[async_trait::async_trait]
impl ImagePicker for FileImagePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        if let Err(e) = std::fs::create_dir_all(&self.images_dir) {
            if e.kind() == ErrorKind::PermissionDenied {
                tracing::warn!(dir = %self.images_dir.display(), "Images directory not writable");
                return Ok(PermissionStatus::Denied);
            }
            return Err(TallyError::Io(e).into());
        }

        if let Some(source) = &self.source {
            if let Err(e) = std::fs::File::open(source) {
                if e.kind() == ErrorKind::PermissionDenied {
                    tracing::warn!(source = %source.display(), "Image not readable");
                    return Ok(PermissionStatus::Denied);
                }
            }
        }

        Ok(PermissionStatus::Granted)
    }

    async fn pick(&self, options: &PickOptions) -> Result<PickResult> {
        let Some(source) = self.choose_source().await? else {
            tracing::debug!("Image pick cancelled");
            return Ok(PickResult::Cancelled);
        };

        let images_dir = self.images_dir.clone();
        let options = *options;
        let dest = tokio::task::spawn_blocking(move || import_image(&source, &images_dir, &options))
            .await
            .map_err(|e| TallyError::Image(format!("Image import task failed: {}", e)))??;

        let uri = Url::from_file_path(&dest)
            .map_err(|_| {
                TallyError::Image(format!("Not an absolute path: {}", dest.display()))
            })?
            .to_string();
        tracing::info!(uri = %uri, "Image imported");
        Ok(PickResult::Picked { uri })
    }

    async fn discard(&self, uri: &str) -> Result<()> {
        let Some(path) = Url::parse(uri).ok().and_then(|u| u.to_file_path().ok()) else {
            return Ok(());
        };
        let (Ok(path), Ok(images_dir)) = (path.canonicalize(), self.images_dir.canonicalize())
        else {
            return Ok(());
        };
        if !path.starts_with(&images_dir) {
            tracing::debug!(uri, "Not an imported image, keeping it");
            return Ok(());
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(uri, "Discarded image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TallyError::Io(e).into()),
        }
    }
}

/// Decode `source`, prepare it per `options` and write it into `images_dir`
///
/// # Returns
///
/// Absolute path of the written JPEG
fn import_image(source: &Path, images_dir: &Path, options: &PickOptions) -> Result<PathBuf> {
    let img = image::open(source)
        .map_err(|e| TallyError::Image(format!("Failed to open {}: {}", source.display(), e)))?;

    let img = if options.allows_editing {
        crop_to_aspect(&img, options.aspect)
    } else {
        img
    };

    std::fs::create_dir_all(images_dir)?;
    let dest = images_dir
        .canonicalize()?
        .join(format!("{}.jpg", Uuid::new_v4()));

    let file = std::fs::File::create(&dest)?;
    if let Err(e) = encode_jpeg(&img, file, jpeg_quality(options.quality)) {
        let _ = std::fs::remove_file(&dest);
        return Err(e);
    }

    Ok(dest)
}

/// Encode `img` as JPEG into `out`, surfacing errors from the final flush
fn encode_jpeg<W: Write>(img: &DynamicImage, out: W, quality: u8) -> Result<()> {
    let mut writer = BufWriter::new(out);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&img.to_rgb8())
        .map_err(|e| TallyError::Image(format!("Failed to encode image: {}", e)))?;

    writer
        .into_inner()
        .map_err(|e| TallyError::Io(e.into_error()))?;
    Ok(())
}

/// Largest centred region of `img` with the given width:height ratio
pub fn crop_to_aspect(img: &DynamicImage, aspect: (u32, u32)) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let (aw, ah) = (u64::from(aspect.0.max(1)), u64::from(aspect.1.max(1)));

    let (crop_w, crop_h) = if u64::from(width) * ah > u64::from(height) * aw {
        ((u64::from(height) * aw / ah) as u32, height)
    } else {
        (width, (u64::from(width) * ah / aw) as u32)
    };
    let (crop_w, crop_h) = (crop_w.max(1), crop_h.max(1));

    img.crop_imm(
        (width - crop_w) / 2,
        (height - crop_h) / 2,
        crop_w,
        crop_h,
    )
}

fn jpeg_quality(quality: f32) -> u8 {
    // NaN casts to 0
    ((quality * 100.0).round().clamp(1.0, 100.0) as u8).max(1)
}
