//! Image source port for reading uploads from various sources.

use crate::domain::ImageUpload;

/// Port for reading image uploads from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over uploads from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if an upload cannot be read. Sources
    /// report inputs they reject as a [`SkippedInput`] so callers can name
    /// the path.
    ///
    /// [`SkippedInput`]: crate::domain::SkippedInput
    fn uploads(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageUpload>> + Send + '_>;

    /// Returns the total number of uploads, if known.
    fn count_hint(&self) -> Option<usize>;
}
