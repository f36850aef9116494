//! The reader capability interface.
//!
//! `Reader` is the seam between format implementations, the filter chain,
//! and callers: a synchronous, blocking contract for attaching a source,
//! opening planes, and exposing dataset metadata. Filters implement the same
//! trait and delegate to a parent, so a chain is itself a `Reader`.
//!
//! A reader instance is not safe for concurrent use; callers sharing one
//! across threads must hold their own synchronization for the full duration
//! of any call sequence that depends on prior state.

pub mod plane;
pub mod synthetic;

use crate::error::ReaderError;
use crate::meta::dataset::SharedDataset;

pub use plane::{Plane, Region};
pub use synthetic::SyntheticReader;

/// Planar extents of one entry in a shared dataset: the first spatial planar
/// axis is the width, the remaining planar axes collapse into the height.
/// Leading interleaved axes hold per-sample components, not spatial extent,
/// and are skipped.
pub fn planar_extents(meta: &SharedDataset, image_index: usize) -> Result<(u64, u64), ReaderError> {
    let meta = meta.read();
    let entry = meta.entry(image_index)?;
    let planar = entry.axes_lengths_planar();
    let spatial = &planar[entry.interleaved_axis_count().min(planar.len())..];
    let width = spatial.first().copied().unwrap_or(1);
    let height = spatial.iter().skip(1).product::<u64>().max(1);
    Ok((width, height))
}

/// Capability set consumed from format readers and exposed by filter chains.
///
/// `set_source` may perform blocking I/O (format probing) and may take
/// non-trivial time; there is no built-in cancellation or timeout. Source
/// attach failures are propagated unchanged, never retried internally.
pub trait Reader {
    /// Short name of this reader, for logs and compatibility checks.
    fn name(&self) -> &'static str;

    /// Attach the reader to a source identifier, probing it for
    /// compatibility and populating metadata.
    fn set_source(&mut self, id: &str) -> Result<(), ReaderError>;

    /// Open one full plane.
    fn open_plane(&mut self, image_index: usize, plane_index: u64) -> Result<Plane, ReaderError>;

    /// Open a sub-region of one plane.
    fn open_plane_region(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
    ) -> Result<Plane, ReaderError>;

    /// Open a downsampled thumbnail of one plane.
    fn open_thumb_plane(
        &mut self,
        image_index: usize,
        plane_index: u64,
    ) -> Result<Plane, ReaderError>;

    /// Read a sub-region of one plane into an existing plane's buffer.
    fn read_plane_into(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
        plane: &mut Plane,
    ) -> Result<(), ReaderError>;

    /// The metadata view exposed at this point of the chain. For a filter
    /// with an installed wrapper this is the wrapped view, never the
    /// parent's raw metadata.
    fn metadata(&self) -> SharedDataset;

    /// Replace the exposed metadata.
    fn set_metadata(&mut self, meta: SharedDataset) -> Result<(), ReaderError>;

    /// Release the source. With `file_only`, metadata is retained and only
    /// the underlying resource is dropped. Closing an already-closed reader
    /// is a no-op.
    fn close(&mut self, file_only: bool) -> Result<(), ReaderError>;

    /// Number of planes in the given series.
    fn plane_count(&self, image_index: usize) -> Result<u64, ReaderError>;

    /// Number of series in the dataset.
    fn image_count(&self) -> usize;

    /// Identifier of the currently attached source, if any.
    fn current_file(&self) -> Option<String>;
}
