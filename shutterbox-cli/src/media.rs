use std::path::Path;

use shutterbox::upload::{SelectedFile, UploadForm};
use shutterbox::validation::ImageMediaType;

/// Media type of an image, going by its magic bytes rather than its file name.
pub fn sniff_media_type(bytes: &[u8]) -> Option<ImageMediaType> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some(ImageMediaType::Jpeg),
        image::ImageFormat::Png => Some(ImageMediaType::Png),
        image::ImageFormat::Gif => Some(ImageMediaType::Gif),
        image::ImageFormat::WebP => Some(ImageMediaType::Webp),
        format => {
            log::debug!("Detected non-web image format: {:?}", format);
            None
        },
    }
}

pub fn read_upload_form(
    path: &Path,
    title: Option<String>,
    description: Option<String>,
) -> std::io::Result<UploadForm> {
    let bytes = std::fs::read(path)?;
    let content_type = sniff_media_type(&bytes).map(|media_type| media_type.as_mime().to_string());
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(UploadForm {
        photo: SelectedFile {
            file_name,
            content_type,
            bytes,
        },
        title,
        description,
    })
}
