//! Bridge to the legacy fixed-5-axis metadata representation.
//!
//! The legacy model knows exactly five dimensions - X, Y, Z, Channel, Time -
//! in an order fixed by a validated 5-letter string, with X and Y always
//! planar. Converting an N-D entry forward narrows it to that subset:
//! extension axes are discarded, missing canonical axes default to length 1,
//! and planar prefixes other than XY are forgotten. This is accepted lossy
//! behavior; the conversion is deterministic and the round trip is exact
//! precisely for entries that already fit the legacy shape.
//!
//! The side table is aliased, not copied, in both directions.

pub mod order;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::meta::axis::{Axis, AxisType};
use crate::meta::image::{new_meta_table, ImageMetadata, MetaTable};

pub use order::{infer_order, DimensionOrder, CANONICAL_LETTERS};

// =============================================================================
// CoreRecord
// =============================================================================

/// Fixed 5-axis legacy metadata record for one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreRecord {
    pub size_x: u64,
    pub size_y: u64,
    pub size_z: u64,
    pub size_c: u64,
    pub size_t: u64,

    /// Storage order of the five dimensions.
    pub dimension_order: DimensionOrder,

    /// Lengths of each sub-dimension of a composite Channel axis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_lengths: Vec<u64>,

    /// Names of each sub-dimension of a composite Channel axis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<String>,

    pub interleaved_axis_count: usize,
    pub order_certain: bool,
    pub little_endian: bool,
    pub indexed: bool,
    pub false_color: bool,
    pub metadata_complete: bool,
    pub thumbnail: bool,
    pub resolution_count: usize,

    /// Aliased side table, shared with any entry this record was converted
    /// from or to.
    #[serde(skip, default = "new_meta_table")]
    pub table: MetaTable,
}

impl Default for CoreRecord {
    fn default() -> Self {
        Self {
            size_x: 1,
            size_y: 1,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            dimension_order: DimensionOrder::default(),
            channel_lengths: Vec::new(),
            channel_types: Vec::new(),
            interleaved_axis_count: 0,
            order_certain: false,
            little_endian: true,
            indexed: false,
            false_color: true,
            metadata_complete: false,
            thumbnail: false,
            resolution_count: 1,
            table: new_meta_table(),
        }
    }
}

impl CoreRecord {
    /// Narrow an N-D entry to the legacy 5-axis record.
    ///
    /// Scans the axis sequence once, recording the length of the first X, Y,
    /// Z, Channel, Time axis found and defaulting any missing one to 1. The
    /// dimension order is inferred from the observed axis-type sequence.
    /// Extension axes and non-XY planar prefixes are discarded. The side
    /// table is aliased.
    pub fn from_entry(entry: &ImageMetadata) -> Self {
        let mut record = CoreRecord {
            table: entry.table(),
            ..CoreRecord::default()
        };

        let mut types = Vec::with_capacity(entry.axis_count());
        for axis in entry.axes() {
            let slot = match axis.axis_type() {
                AxisType::X => &mut record.size_x,
                AxisType::Y => &mut record.size_y,
                AxisType::Z => &mut record.size_z,
                AxisType::Channel => {
                    record.channel_lengths = axis.sub_lengths().to_vec();
                    record.channel_types = axis.sub_types().to_vec();
                    &mut record.size_c
                }
                AxisType::Time => &mut record.size_t,
                AxisType::Custom(_) => {
                    types.push(axis.axis_type().clone());
                    continue;
                }
            };
            *slot = axis.length();
            types.push(axis.axis_type().clone());
        }
        record.dimension_order = infer_order(&types);

        record.interleaved_axis_count = entry.interleaved_axis_count();
        record.order_certain = entry.is_order_certain();
        record.little_endian = entry.is_little_endian();
        record.indexed = entry.is_indexed();
        record.false_color = entry.is_false_color();
        record.metadata_complete = entry.is_metadata_complete();
        record.thumbnail = entry.is_thumbnail();
        record.resolution_count = entry.resolution_count();
        record
    }

    /// Rebuild an N-D entry from this record.
    ///
    /// Iterates the dimension order left to right, assigning each position
    /// the stored size for its letter. X and Y are always planar in the
    /// legacy model, so the planar axis count is 2 and the plane count is
    /// the product of the remaining sizes. The side table is aliased.
    pub fn to_entry(&self) -> ImageMetadata {
        let mut entry = ImageMetadata::new();
        let mut axes = Vec::with_capacity(5);
        for axis_type in self.dimension_order.axis_types() {
            axes.push(match axis_type {
                AxisType::X => Axis::new(AxisType::X, self.size_x),
                AxisType::Y => Axis::new(AxisType::Y, self.size_y),
                AxisType::Z => Axis::new(AxisType::Z, self.size_z),
                AxisType::Channel => {
                    if self.channel_lengths.is_empty() {
                        Axis::new(AxisType::Channel, self.size_c)
                    } else {
                        Axis::composite_channel(
                            self.channel_lengths.clone(),
                            self.channel_types.clone(),
                        )
                    }
                }
                // DimensionOrder is validated; only Time remains.
                _ => Axis::new(AxisType::Time, self.size_t),
            });
        }
        entry.set_axes(axes);
        entry.set_planar_axis_count(2);

        entry.set_interleaved_axis_count(self.interleaved_axis_count);
        entry.set_order_certain(self.order_certain);
        entry.set_little_endian(self.little_endian);
        entry.set_indexed(self.indexed);
        entry.set_false_color(self.false_color);
        entry.set_metadata_complete(self.metadata_complete);
        entry.set_thumbnail(self.thumbnail);
        entry.set_resolution_count(self.resolution_count);
        entry.set_table(self.table.clone());
        entry
    }

    /// Rebuild an entry from legacy scalar fields and an order string that
    /// has not been validated yet.
    ///
    /// # Errors
    ///
    /// `InvalidDimensionOrder` if `order` is not a permutation of exactly
    /// X, Y, Z, C, T.
    pub fn entry_from_raw(
        sizes: [u64; 5],
        order: &str,
    ) -> Result<ImageMetadata, MetadataError> {
        let [size_x, size_y, size_z, size_c, size_t] = sizes;
        let record = CoreRecord {
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
            dimension_order: DimensionOrder::parse(order)?,
            ..CoreRecord::default()
        };
        Ok(record.to_entry())
    }
}
