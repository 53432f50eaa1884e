//! Inbound image uploads and their admission rule.

/// Content types admitted for detection.
const ADMITTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Whether `content_type` is on the admitted list.
///
/// Parameters after `;` are ignored and the comparison is case-insensitive.
#[must_use]
pub fn is_admitted_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ADMITTED_CONTENT_TYPES
        .iter()
        .any(|admitted| admitted.eq_ignore_ascii_case(essence))
}

/// Raw bytes submitted for detection.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Path or name identifying the upload.
    pub path: String,
    /// Content type declared by the sender; used only for admission.
    pub declared_type: Option<String>,
    /// Raw container bytes.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Creates an upload without a declared content type.
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            declared_type: None,
            bytes,
        }
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_declared_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_type = Some(content_type.into());
        self
    }

    /// Whether the upload passes admission.
    ///
    /// An upload without a declared type is admitted and left to the
    /// decoder, which sniffs the container from the bytes.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        match self.declared_type.as_deref() {
            Some(content_type) => is_admitted_type(content_type),
            None => true,
        }
    }

    /// Size of the upload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the upload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admitted_types() {
        assert!(is_admitted_type("image/png"));
        assert!(is_admitted_type("IMAGE/JPEG"));
        assert!(is_admitted_type("image/jpg"));
        assert!(is_admitted_type("image/webp; q=0.9"));
        assert!(!is_admitted_type("image/tiff"));
        assert!(!is_admitted_type("image/svg+xml"));
        assert!(!is_admitted_type("text/plain"));
        assert!(!is_admitted_type(""));
    }

    #[test]
    fn test_upload_admission_follows_declared_type() {
        let upload = ImageUpload::new("a", vec![1]);
        assert!(upload.is_admitted());
        assert!(upload.clone().with_declared_type("image/gif").is_admitted());
        assert!(!upload.with_declared_type("application/pdf").is_admitted());
    }
}
