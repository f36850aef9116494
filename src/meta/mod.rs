//! Dimensional metadata model.
//!
//! - [`axis`] - typed axes and the composite Channel axis
//! - [`image`] - per-series metadata entries with the planar prefix and
//!   derived plane count
//! - [`dataset`] - the ordered entry collection and its shared handle
//! - [`raster`] - mixed-radix plane indexing over the non-planar axes

pub mod axis;
pub mod dataset;
pub mod image;
pub mod raster;

pub use axis::{Axis, AxisType};
pub use dataset::{shared, DatasetMetadata, SharedDataset};
pub use image::{new_meta_table, ImageMetadata, MetaTable};
pub use raster::{position_to_raster, raster_to_position};
