//! Photo intake: type detection and inline encoding for the vision API.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use url::Url;

use crate::error::{PhotocalError, PhotocalResult};

/// Image formats the vision API accepts inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageType {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Gif => "image/gif",
            ImageType::Webp => "image/webp",
        }
    }

    /// Detect from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageType::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageType::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageType::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageType::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "gif" => Some(ImageType::Gif),
            "webp" => Some(ImageType::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

/// A photo handed to the extraction pipeline.
#[derive(Clone)]
pub struct ImageSource {
    bytes: Vec<u8>,
    image_type: ImageType,
    path: Option<PathBuf>,
}

impl ImageSource {
    /// Read a photo from disk.
    pub fn from_path(path: &Path) -> PhotocalResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PhotocalError::Encoding(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str());
        let mut source = Self::from_bytes(bytes, ext)?;
        source.path = Some(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        Ok(source)
    }

    /// Wrap in-memory image data. The extension is only consulted when the
    /// signature isn't recognized.
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<&str>) -> PhotocalResult<Self> {
        if bytes.is_empty() {
            return Err(PhotocalError::Encoding("image is empty".into()));
        }

        let image_type = ImageType::sniff(&bytes)
            .or_else(|| extension.and_then(ImageType::from_extension))
            .ok_or_else(|| {
                PhotocalError::Encoding(
                    "unsupported image type (expected JPEG, PNG, GIF or WebP)".into(),
                )
            })?;

        Ok(ImageSource {
            bytes,
            image_type,
            path: None,
        })
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL suitable for an `image_url` content part.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.image_type.mime(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// `file://` handle to the original photo, when it came from disk.
    pub fn handle(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        Url::from_file_path(path).ok().map(String::from)
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("image_type", &self.image_type)
            .field("len", &self.bytes.len())
            .field("path", &self.path)
            .finish()
    }
}
