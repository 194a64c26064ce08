//! Checks applied to image files before they reach the image store.
//!
//! Every rejection here happens before any network call.

/// MIME types the image store accepts.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const MB: u64 = 1024 * 1024;

/// Reasons a file or batch is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The file has no content.
    #[error("{file_name} is empty")]
    EmptyFile { file_name: String },

    /// The file exceeds the size limit of the call site.
    #[error("{file_name} is {size} bytes, the limit is {max} bytes")]
    TooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    /// The file is not one of [`ALLOWED_MIME_TYPES`].
    #[error("{file_name} has unsupported type {mime_type} (JPG, PNG, GIF or WebP only)")]
    UnsupportedType {
        file_name: String,
        mime_type: String,
    },

    /// The batch would push the gallery over its image limit.
    #[error("at most {max} images allowed ({current} present, {incoming} added)")]
    TooManyImages {
        max: usize,
        current: usize,
        incoming: usize,
    },
}

/// An image file waiting to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type guessed from the file extension.
    #[must_use]
    pub fn mime_from_extension(file_name: &str) -> Option<&'static str> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            _ => None,
        }
    }
}

// Bytes are omitted; a multi-megabyte dump in a log line helps nobody.
impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size())
            .finish()
    }
}

/// Folder an image is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFolder {
    Products,
    Sections,
}

impl ImageFolder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "esther/products",
            Self::Sections => "esther/sections",
        }
    }
}

impl std::fmt::Display for ImageFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits of one upload call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub max_images: usize,
    pub folder: ImageFolder,
}

impl UploadPolicy {
    /// General images of a product.
    pub const PRODUCT_GALLERY: Self = Self {
        max_bytes: 5 * MB,
        max_images: 5,
        folder: ImageFolder::Products,
    };

    /// Images of one color variant.
    pub const COLOR_GALLERY: Self = Self {
        max_bytes: 5 * MB,
        max_images: 8,
        folder: ImageFolder::Products,
    };

    /// Banner image of a section.
    pub const SECTION_IMAGE: Self = Self {
        max_bytes: 10 * MB,
        max_images: 1,
        folder: ImageFolder::Sections,
    };

    /// Check a single file against this policy.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the file is empty, too large or not an
    /// allowed image type.
    pub fn validate(&self, file: &ImageFile) -> Result<(), UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::EmptyFile {
                file_name: file.file_name.clone(),
            });
        }

        let mime = file.mime_type.to_ascii_lowercase();
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UploadError::UnsupportedType {
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size() > self.max_bytes {
            return Err(UploadError::TooLarge {
                file_name: file.file_name.clone(),
                size: file.size(),
                max: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Check that `incoming` more images fit next to `current` existing ones.
    ///
    /// Single-image call sites replace their image, so they never overflow.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooManyImages`] when the limit would be exceeded.
    pub const fn check_capacity(&self, current: usize, incoming: usize) -> Result<(), UploadError> {
        if self.max_images > 1 && current + incoming > self.max_images {
            return Err(UploadError::TooManyImages {
                max: self.max_images,
                current,
                incoming,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, size: usize) -> ImageFile {
        ImageFile::new(name, mime, vec![0; size])
    }

    #[test]
    fn test_accepts_allowed_types_within_limit() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(UploadPolicy::PRODUCT_GALLERY.validate(&file("a", mime, 10)).is_ok());
        }
    }

    #[test]
    fn test_rejects_oversized_file() {
        let six_mb = file("big.jpg", "image/jpeg", 6 * 1024 * 1024);
        assert!(matches!(
            UploadPolicy::PRODUCT_GALLERY.validate(&six_mb),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(UploadPolicy::SECTION_IMAGE.validate(&six_mb).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_type_and_empty_file() {
        assert!(matches!(
            UploadPolicy::PRODUCT_GALLERY.validate(&file("a.svg", "image/svg+xml", 10)),
            Err(UploadError::UnsupportedType { .. })
        ));
        assert!(matches!(
            UploadPolicy::PRODUCT_GALLERY.validate(&file("a.png", "image/png", 0)),
            Err(UploadError::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_capacity() {
        assert!(UploadPolicy::PRODUCT_GALLERY.check_capacity(3, 2).is_ok());
        assert!(matches!(
            UploadPolicy::PRODUCT_GALLERY.check_capacity(4, 2),
            Err(UploadError::TooManyImages { max: 5, .. })
        ));
        assert!(UploadPolicy::COLOR_GALLERY.check_capacity(4, 4).is_ok());
        assert!(UploadPolicy::SECTION_IMAGE.check_capacity(1, 1).is_ok());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(ImageFile::mime_from_extension("photo.JPG"), Some("image/jpeg"));
        assert_eq!(ImageFile::mime_from_extension("photo.tiff"), None);
        assert_eq!(ImageFile::mime_from_extension("noext"), None);
    }

    #[test]
    fn test_debug_omits_bytes() {
        let debug = format!("{:?}", file("a.png", "image/png", 3));
        assert!(debug.contains("size: 3"));
        assert!(!debug.contains("bytes"));
    }
}
