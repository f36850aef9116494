//! Dataset-level metadata: the ordered list of image entries.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ReaderError;
use crate::meta::image::ImageMetadata;

/// Shared handle to a dataset's metadata.
///
/// Readers expose their metadata through this handle; filters either alias
/// it or replace it with a wrapped view. Cloning the handle aliases the same
/// storage.
pub type SharedDataset = Arc<RwLock<DatasetMetadata>>;

/// Wrap a dataset in a shared handle.
pub fn shared(dataset: DatasetMetadata) -> SharedDataset {
    Arc::new(RwLock::new(dataset))
}

/// Ordered collection of per-image metadata entries.
///
/// Insertion order is the series index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetMetadata {
    entries: Vec<ImageMetadata>,
}

impl DatasetMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; its series index is the previous entry count.
    pub fn push(&mut self, entry: ImageMetadata) {
        self.entries.push(entry);
    }

    pub fn get(&self, index: usize) -> Option<&ImageMetadata> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ImageMetadata> {
        self.entries.get_mut(index)
    }

    /// The entry for `index`, or `ImageOutOfRange`.
    pub fn entry(&self, index: usize) -> Result<&ImageMetadata, ReaderError> {
        self.entries.get(index).ok_or(ReaderError::ImageOutOfRange {
            index,
            count: self.entries.len(),
        })
    }

    pub fn image_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageMetadata> {
        self.entries.iter()
    }

    /// Copy with independent side tables in every entry.
    pub fn deep_clone(&self) -> Self {
        Self {
            entries: self.entries.iter().map(ImageMetadata::deep_clone).collect(),
        }
    }
}
