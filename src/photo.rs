use crate::error::UploadError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::fmt;

pub const PHOTO_FILE_NAME: &str = "harvest.jpg";
pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// Progress of the photo upload, as shown next to the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Processing,
    Uploading,
    Ready(String),
    ApiError,
    NetworkError,
    Unreadable,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Processing => f.write_str("Processing..."),
            UploadStatus::Uploading => f.write_str("Uploading (Small Size)..."),
            UploadStatus::Ready(url) => write!(f, "✅ Ready: {url}"),
            UploadStatus::ApiError => f.write_str("❌ API Error."),
            UploadStatus::NetworkError => f.write_str("❌ Network Error."),
            UploadStatus::Unreadable => f.write_str("❌ Could not read photo."),
        }
    }
}

impl UploadStatus {
    pub fn from_error(e: &UploadError) -> Self {
        match e {
            UploadError::Rejected => UploadStatus::ApiError,
            UploadError::Transport(_) => UploadStatus::NetworkError,
            UploadError::Image(_) => UploadStatus::Unreadable,
        }
    }
}

/// Shrink a photo to at most `max_width` pixels wide and re-encode it as
/// JPEG. Smaller images keep their size.
pub fn prepare_photo(bytes: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>, UploadError> {
    let img = image::load_from_memory(bytes)?;

    let img = if img.width() > max_width {
        let scale = f64::from(max_width) / f64::from(img.width());
        let height = ((f64::from(img.height()) * scale).round() as u32).max(1);
        img.resize_exact(max_width, height, FilterType::Triangle)
    } else {
        img
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&img.to_rgb8())?;
    Ok(jpeg)
}
