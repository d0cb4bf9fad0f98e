use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::AppError;

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Clone)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    filename: Option<String>,
    content_type: Option<String>,
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("len", &self.bytes.len())
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, filename: Option<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            filename,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Media type to declare in the data URI.
    ///
    /// A declared `image/*` type decides; otherwise the filename extension does;
    /// with neither, JPEG is assumed. Only JPEG and PNG are accepted.
    pub fn media_type(&self) -> Result<&'static str, AppError> {
        let declared = self
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/"));

        if let Some(declared) = declared {
            return match declared.as_str() {
                "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok("image/jpeg"),
                "image/png" => Ok("image/png"),
                _ => Err(AppError::UnsupportedImage(declared)),
            };
        }

        let ext = self
            .filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg" | "jpeg") => Ok("image/jpeg"),
            Some("png") => Ok("image/png"),
            Some(other) => Err(AppError::UnsupportedImage(format!(".{other}"))),
            None => Ok(FALLBACK_MEDIA_TYPE),
        }
    }

    pub fn data_uri(&self) -> Result<String, AppError> {
        let media_type = self.media_type()?;
        Ok(format!(
            "data:{media_type};base64,{}",
            STANDARD.encode(&self.bytes)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(filename: Option<&str>, content_type: Option<&str>) -> UploadedImage {
        UploadedImage::new(
            vec![0xFF, 0xD8, 0xFF],
            filename.map(str::to_owned),
            content_type.map(str::to_owned),
        )
    }

    #[test]
    fn declared_type_wins() {
        assert_eq!(
            image(Some("photo.jpg"), Some("image/png")).media_type(),
            Ok("image/png")
        );
        assert_eq!(
            image(None, Some("image/jpg; charset=binary")).media_type(),
            Ok("image/jpeg")
        );
    }

    #[test]
    fn extension_used_for_generic_types() {
        assert_eq!(
            image(Some("Photo.PNG"), Some("application/octet-stream")).media_type(),
            Ok("image/png")
        );
        assert_eq!(image(Some("a.jpeg"), None).media_type(), Ok("image/jpeg"));
    }

    #[test]
    fn unknown_everything_falls_back_to_jpeg() {
        assert_eq!(image(Some("upload"), None).media_type(), Ok("image/jpeg"));
        assert_eq!(image(None, None).media_type(), Ok("image/jpeg"));
    }

    #[test]
    fn other_formats_are_unsupported() {
        assert_eq!(
            image(None, Some("image/gif")).media_type(),
            Err(AppError::UnsupportedImage("image/gif".into()))
        );
        assert_eq!(
            image(Some("notes.txt"), Some("text/plain")).media_type(),
            Err(AppError::UnsupportedImage(".txt".into()))
        );
    }

    #[test]
    fn data_uri_is_base64() {
        assert_eq!(
            image(Some("a.jpg"), None).data_uri().unwrap(),
            "data:image/jpeg;base64,/9j/"
        );
    }
}
