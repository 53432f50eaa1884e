//! Filesystem adapter for reading image uploads.

use anyhow::Result;
use qr_scan_core::{is_admitted_type, ImageSource, ImageUpload, SkippedInput};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Content type declared for each known extension.
///
/// Admission is decided on the content type, so extensions mapping to
/// non-image or unsupported image types are listed too.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
];

/// A path found while walking the inputs.
#[derive(Debug)]
enum Entry {
    Admitted(PathBuf, &'static str),
    Rejected(PathBuf, &'static str),
}

/// Filesystem image source adapter.
///
/// Explicitly named files that fail admission are reported as
/// [`SkippedInput`] errors so the caller can mark them skipped; files inside
/// directories are filtered silently. Inputs are walked once, on first use.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
    entries: OnceLock<Vec<Entry>>,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            paths,
            recursive,
            entries: OnceLock::new(),
        }
    }

    fn entries(&self) -> &[Entry] {
        self.entries.get_or_init(|| {
            let entries = self.collect();
            debug!("Found {} candidate files", entries.len());
            entries
        })
    }

    fn collect(&self) -> Vec<Entry> {
        let mut entries = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                match admitted_type(path) {
                    Some(content_type) => entries.push(Entry::Admitted(path.clone(), content_type)),
                    None => {
                        warn!("Unsupported file type: {}", path.display());
                        entries.push(Entry::Rejected(path.clone(), "unsupported file type"));
                    }
                }
            } else if path.is_dir() {
                let mut found = Vec::new();
                self.collect_from_dir(path, &mut found);
                found.sort_by(|a, b| a.0.cmp(&b.0));
                entries.extend(
                    found
                        .into_iter()
                        .map(|(path, content_type)| Entry::Admitted(path, content_type)),
                );
            } else {
                warn!("Path does not exist: {}", path.display());
                entries.push(Entry::Rejected(path.clone(), "path does not exist"));
            }
        }

        entries
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<(PathBuf, &'static str)>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if let Some(content_type) = admitted_type(&path) {
                    files.push((path, content_type));
                }
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn uploads(&self) -> Box<dyn Iterator<Item = Result<ImageUpload>> + Send + '_> {
        Box::new(self.entries().iter().map(|entry| match entry {
            Entry::Admitted(path, content_type) => read_upload(path, content_type),
            Entry::Rejected(path, reason) => {
                Err(SkippedInput::new(path.to_string_lossy(), *reason).into())
            }
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.entries().len())
    }
}

/// Content type declared by a path's extension, if known.
#[must_use]
pub fn declared_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, content_type)| *content_type)
}

/// The declared content type of `path`, if it passes admission.
fn admitted_type(path: &Path) -> Option<&'static str> {
    declared_type(path).filter(|content_type| is_admitted_type(content_type))
}

/// Checks if a path declares an admitted image content type.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    admitted_type(path).is_some()
}

/// Reads an upload from the filesystem.
fn read_upload(path: &Path, content_type: &str) -> Result<ImageUpload> {
    let name = path.to_string_lossy();
    let bytes = std::fs::read(path)
        .map_err(|e| SkippedInput::new(name.as_ref(), format!("failed to read file ({e})")))?;

    Ok(ImageUpload::new(name, bytes).with_declared_type(content_type))
}
