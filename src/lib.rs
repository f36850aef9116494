//! # ndimage-reader
//!
//! Read N-dimensional scientific imaging data (microscopy formats) through a
//! uniform abstraction, independent of each vendor's on-disk layout.
//!
//! The crate centers on three pieces:
//!
//! - **Dimensional metadata model** with plane-indexing arithmetic: ordered,
//!   typed axes per series, a planar prefix separating within-plane from
//!   across-plane dimensions, and mixed-radix conversion between N-D
//!   coordinates and linear plane indices.
//! - **Legacy bridge**: lossy, deterministic conversion between the N-D
//!   model and the fixed 5-axis (X, Y, Z, Channel, Time) representation with
//!   its validated dimension-order string.
//! - **Reader filter chain**: decorators wrapping a base format reader so
//!   cross-cutting behaviors (channel synthesis, cropping, metadata
//!   adaptation) compose without modifying it, each filter wrapping its
//!   parent's metadata via a registry-discovered wrapper or aliasing it
//!   unchanged.
//!
//! ## Modules
//!
//! - [`meta`] - axes, per-series entries, dataset metadata, plane indexing
//! - [`legacy`] - the fixed-5-axis record and dimension-order handling
//! - [`reader`] - the reader capability trait, plane/region types, and the
//!   synthetic base reader
//! - [`filter`] - filter nodes, the wrapper registry, and shipped filters
//! - [`error`] - typed failures for metadata, reader, and discovery paths
//!
//! ## Example
//!
//! ```
//! use ndimage_reader::filter::{ChannelFiller, FilterNode, WrapperRegistry};
//! use ndimage_reader::reader::{Reader, SyntheticReader};
//!
//! # fn main() -> Result<(), ndimage_reader::ReaderError> {
//! let base = SyntheticReader::open(
//!     "sample&axes=X,Y,Z,Channel,Time&lengths=64,64,3,2,5&indexed=true.synthetic",
//! )?;
//!
//! let registry = WrapperRegistry::with_defaults();
//! let mut chain = FilterNode::attach(ChannelFiller::new(), Box::new(base), &registry)?;
//!
//! // The chain is itself a reader; the filler's wrapper reports the
//! // synthesized channels while planes come back expanded.
//! let plane = chain.open_plane(0, 0)?;
//! assert_eq!(plane.data().len(), 64 * 64 * 3);
//! # Ok(())
//! # }
//! ```
//!
//! All readers are synchronous and blocking; a chain is not safe for
//! concurrent use without external synchronization.

pub mod error;
pub mod filter;
pub mod legacy;
pub mod meta;
pub mod reader;

// Re-export commonly used types
pub use error::{DiscoveryError, MetadataError, ReaderError};
pub use filter::{
    ChannelFiller, CropFilter, FilterBehavior, FilterNode, MetadataWrapper, WrapperDescriptor,
    WrapperRegistry,
};
pub use legacy::{infer_order, CoreRecord, DimensionOrder};
pub use meta::{
    position_to_raster, raster_to_position, shared, Axis, AxisType, DatasetMetadata,
    ImageMetadata, MetaTable, SharedDataset,
};
pub use reader::{Plane, Reader, Region, SyntheticReader};
