//! Per-image (series) dimensional metadata.
//!
//! `ImageMetadata` owns an ordered axis sequence plus the flags describing
//! how samples are laid out. Axis order is load-bearing: the first
//! `planar_axis_count` axes are iterated within one plane, the remaining
//! axes, in order, index across planes. The derived plane count is kept
//! current by every mutation that can change it, so the getter is O(1).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::MetadataError;
use crate::meta::axis::{Axis, AxisType};

// =============================================================================
// Side Table
// =============================================================================

/// Auxiliary string-keyed metadata attached to an entry.
///
/// The table is shared *by reference* when an entry is copied or converted:
/// mutations through one view are visible through every other. Callers that
/// need an independent copy must ask for one via
/// [`ImageMetadata::deep_clone`].
pub type MetaTable = Arc<RwLock<HashMap<String, Value>>>;

/// Create an empty, unshared side table.
pub fn new_meta_table() -> MetaTable {
    Arc::new(RwLock::new(HashMap::new()))
}

// =============================================================================
// ImageMetadata
// =============================================================================

/// Full dimensional description of one image/series.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    /// Ordered axis sequence. Position is semantically significant.
    axes: Vec<Axis>,

    /// How many leading axes are iterated within one plane.
    planar_axis_count: usize,

    /// How many leading planar axes are considered interleaved. A flag for
    /// consumers; setting it does not reorder axes.
    interleaved_axis_count: usize,

    /// Derived: product of the lengths of axes beyond the planar prefix.
    plane_count: u64,

    /// Whether the axis ordering is known to be correct.
    order_certain: bool,

    /// Whether sample bytes are little-endian.
    little_endian: bool,

    /// Whether samples are palette indices rather than direct values.
    indexed: bool,

    /// Whether the color map, if present, can be ignored.
    false_color: bool,

    /// Whether all metadata in the source has been parsed.
    metadata_complete: bool,

    /// Whether this series is a lower-resolution copy of another series.
    thumbnail: bool,

    /// Number of resolutions in this series.
    resolution_count: usize,

    /// Aliased auxiliary metadata.
    table: MetaTable,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageMetadata {
    /// Create an empty entry with no axes.
    pub fn new() -> Self {
        Self {
            axes: Vec::new(),
            planar_axis_count: 0,
            interleaved_axis_count: 0,
            plane_count: 1,
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

    // =========================================================================
    // Axis queries
    // =========================================================================

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Length of the first axis with the given type, or `None` if absent.
    pub fn axis_length(&self, axis_type: &AxisType) -> Option<u64> {
        self.axes
            .iter()
            .find(|a| a.axis_type() == axis_type)
            .map(Axis::length)
    }

    /// Positional index of the first axis with the given type, or `None` if
    /// absent.
    pub fn axis_index(&self, axis_type: &AxisType) -> Option<usize> {
        self.axes.iter().position(|a| a.axis_type() == axis_type)
    }

    /// Length of the axis at a literal position.
    ///
    /// Unlike the by-type lookup, an empty slot here is an error, not an
    /// absence.
    pub fn axis_length_at(&self, position: usize) -> Result<u64, MetadataError> {
        self.axes
            .get(position)
            .map(Axis::length)
            .ok_or(MetadataError::IndexOutOfRange {
                operation: "axis_length_at",
                index: position,
                count: self.axes.len(),
            })
    }

    /// The axis at a literal position.
    pub fn axis_at(&self, position: usize) -> Result<&Axis, MetadataError> {
        self.axes.get(position).ok_or(MetadataError::IndexOutOfRange {
            operation: "axis_at",
            index: position,
            count: self.axes.len(),
        })
    }

    /// Lengths of the axes beyond the planar prefix, in stored order.
    /// These are the radices for plane indexing.
    pub fn axes_lengths_non_planar(&self) -> Vec<u64> {
        self.axes
            .iter()
            .skip(self.planar_axis_count)
            .map(Axis::length)
            .collect()
    }

    /// Lengths of the planar-prefix axes, in stored order.
    pub fn axes_lengths_planar(&self) -> Vec<u64> {
        self.axes
            .iter()
            .take(self.planar_axis_count)
            .map(Axis::length)
            .collect()
    }

    // =========================================================================
    // Axis mutation
    // =========================================================================

    /// Set the length of the first axis with the given type, appending a new
    /// axis at the end of the sequence if none exists.
    pub fn set_axis_length(&mut self, axis_type: AxisType, length: u64) {
        match self.axes.iter_mut().find(|a| *a.axis_type() == axis_type) {
            Some(axis) => axis.set_length(length),
            None => self.axes.push(Axis::new(axis_type, length)),
        }
        self.recompute_plane_count();
    }

    /// Retype the axis at `position` in place. Does not reorder.
    pub fn set_axis_type(
        &mut self,
        position: usize,
        axis_type: AxisType,
    ) -> Result<(), MetadataError> {
        let count = self.axes.len();
        let axis = self
            .axes
            .get_mut(position)
            .ok_or(MetadataError::IndexOutOfRange {
                operation: "set_axis_type",
                index: position,
                count,
            })?;
        axis.set_type(axis_type);
        Ok(())
    }

    /// Append an axis at the end of the sequence.
    pub fn add_axis(&mut self, axis: Axis) {
        self.axes.push(axis);
        self.recompute_plane_count();
    }

    /// Replace the whole axis sequence.
    pub fn set_axes(&mut self, axes: Vec<Axis>) {
        self.axes = axes;
        self.recompute_plane_count();
    }

    // =========================================================================
    // Planar prefix and derived state
    // =========================================================================

    pub fn planar_axis_count(&self) -> usize {
        self.planar_axis_count
    }

    /// Move the planar/non-planar boundary. Recomputes the plane count
    /// immediately; no re-parse of the source is involved.
    pub fn set_planar_axis_count(&mut self, count: usize) {
        self.planar_axis_count = count;
        self.recompute_plane_count();
    }

    pub fn interleaved_axis_count(&self) -> usize {
        self.interleaved_axis_count
    }

    pub fn set_interleaved_axis_count(&mut self, count: usize) {
        self.interleaved_axis_count = count;
    }

    /// Number of planes: the product of the non-planar axis lengths.
    pub fn plane_count(&self) -> u64 {
        self.plane_count
    }

    /// True iff a Channel axis sits beyond the planar prefix, i.e. channel
    /// varies across planes rather than within one.
    pub fn is_multichannel(&self) -> bool {
        match self.axis_index(&AxisType::Channel) {
            Some(index) => index >= self.planar_axis_count,
            None => false,
        }
    }

    /// True iff any leading planar axes are flagged interleaved.
    pub fn is_interleaved(&self) -> bool {
        self.interleaved_axis_count > 0
    }

    fn recompute_plane_count(&mut self) {
        self.plane_count = self
            .axes
            .iter()
            .skip(self.planar_axis_count)
            .map(Axis::length)
            .product();
    }

    // =========================================================================
    // Flags
    // =========================================================================

    pub fn is_order_certain(&self) -> bool {
        self.order_certain
    }

    pub fn set_order_certain(&mut self, certain: bool) {
        self.order_certain = certain;
    }

    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    pub fn set_little_endian(&mut self, little: bool) {
        self.little_endian = little;
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn set_indexed(&mut self, indexed: bool) {
        self.indexed = indexed;
    }

    pub fn is_false_color(&self) -> bool {
        self.false_color
    }

    pub fn set_false_color(&mut self, false_color: bool) {
        self.false_color = false_color;
    }

    pub fn is_metadata_complete(&self) -> bool {
        self.metadata_complete
    }

    pub fn set_metadata_complete(&mut self, complete: bool) {
        self.metadata_complete = complete;
    }

    pub fn is_thumbnail(&self) -> bool {
        self.thumbnail
    }

    pub fn set_thumbnail(&mut self, thumbnail: bool) {
        self.thumbnail = thumbnail;
    }

    pub fn resolution_count(&self) -> usize {
        self.resolution_count
    }

    pub fn set_resolution_count(&mut self, count: usize) {
        self.resolution_count = count;
    }

    // =========================================================================
    // Side table
    // =========================================================================

    /// The aliased side table. Cloning the returned handle shares storage.
    pub fn table(&self) -> MetaTable {
        self.table.clone()
    }

    /// Replace the table handle, aliasing `table`'s storage.
    pub fn set_table(&mut self, table: MetaTable) {
        self.table = table;
    }

    /// Insert an auxiliary value.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.table.write().insert(key.into(), value);
    }

    /// Read an auxiliary value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.table.read().get(key).cloned()
    }

    /// Copy of this entry with an *independent* side table.
    ///
    /// `clone()` shares the table by reference; this is the explicit escape
    /// hatch for callers that need isolation.
    pub fn deep_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.table = Arc::new(RwLock::new(self.table.read().clone()));
        copy
    }
}

impl PartialEq for ImageMetadata {
    /// Structural equality. Side tables compare by content, not identity.
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes
            && self.planar_axis_count == other.planar_axis_count
            && self.interleaved_axis_count == other.interleaved_axis_count
            && self.order_certain == other.order_certain
            && self.little_endian == other.little_endian
            && self.indexed == other.indexed
            && self.false_color == other.false_color
            && self.metadata_complete == other.metadata_complete
            && self.thumbnail == other.thumbnail
            && self.resolution_count == other.resolution_count
            && *self.table.read() == *other.table.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 7-axis entry used by the N-D tests:
    /// X,Y,Z,Channel,Time,Lifetime,Spectra = 256,128,2,6,10,4,8, planar XY.
    fn nd_entry() -> ImageMetadata {
        let mut m = ImageMetadata::new();
        m.set_axes(vec![
            Axis::new(AxisType::X, 256),
            Axis::new(AxisType::Y, 128),
            Axis::new(AxisType::Z, 2),
            Axis::new(AxisType::Channel, 6),
            Axis::new(AxisType::Time, 10),
            Axis::new(AxisType::Custom("Lifetime".into()), 4),
            Axis::new(AxisType::Custom("Spectra".into()), 8),
        ]);
        m.set_planar_axis_count(2);
        m
    }

    #[test]
    fn test_fresh_entry_has_absent_axes() {
        let m = ImageMetadata::new();
        assert_eq!(m.axis_length(&AxisType::X), None);
        assert_eq!(m.axis_index(&AxisType::X), None);
        assert!(m.axis_length_at(0).is_err());
    }

    #[test]
    fn test_set_axis_length_appends_when_missing() {
        let mut m = ImageMetadata::new();
        m.set_axis_length(AxisType::X, 100);
        assert_eq!(m.axis_index(&AxisType::X), Some(0));
        assert_eq!(m.axis_length(&AxisType::X), Some(100));

        // Updating an existing axis does not append a second one.
        m.set_axis_length(AxisType::X, 200);
        assert_eq!(m.axis_count(), 1);
        assert_eq!(m.axis_length(&AxisType::X), Some(200));
    }

    #[test]
    fn test_positional_lookup_is_distinct_from_type_lookup() {
        let mut m = ImageMetadata::new();
        m.set_axis_length(AxisType::X, 620);
        assert_eq!(m.axis_length_at(0).unwrap(), 620);
        let err = m.axis_length_at(1).unwrap_err();
        assert!(matches!(err, MetadataError::IndexOutOfRange { index: 1, .. }));
        // By-type lookup of an absent axis is a None, never an error.
        assert_eq!(m.axis_length(&AxisType::Z), None);
    }

    #[test]
    fn test_nd_plane_count_tracks_planar_axis_count() {
        let mut m = nd_entry();
        assert_eq!(m.plane_count(), 2 * 6 * 10 * 4 * 8);

        m.set_planar_axis_count(3);
        assert_eq!(m.plane_count(), 6 * 10 * 4 * 8);

        m.set_planar_axis_count(4);
        assert_eq!(m.plane_count(), 10 * 4 * 8);
    }

    #[test]
    fn test_nd_axis_lengths() {
        let m = nd_entry();
        assert_eq!(m.axis_length(&AxisType::Custom("Spectra".into())), Some(8));
        assert_eq!(m.axis_length(&AxisType::Custom("Lifetime".into())), Some(4));
        assert_eq!(m.axis_length(&AxisType::Time), Some(10));
        assert_eq!(m.axis_length(&AxisType::Channel), Some(6));
        assert_eq!(m.axis_length(&AxisType::Z), Some(2));
        assert_eq!(m.axes_lengths_non_planar(), vec![2, 6, 10, 4, 8]);
    }

    #[test]
    fn test_multichannel_follows_planar_boundary() {
        let mut m = nd_entry();
        // Channel at position 3, planar prefix 2: varies across planes.
        assert!(m.is_multichannel());

        // Swallow the Channel axis into the planar prefix.
        m.set_planar_axis_count(4);
        assert!(!m.is_multichannel());

        m.set_planar_axis_count(3);
        assert!(m.is_multichannel());
    }

    #[test]
    fn test_interleaved_flags() {
        let mut m = nd_entry();
        assert!(!m.is_interleaved());

        // Retype axis 0 to Channel and declare one interleaved axis: CXY.
        m.set_axis_type(0, AxisType::Channel).unwrap();
        m.set_interleaved_axis_count(1);
        assert!(m.is_interleaved());
        assert_eq!(m.axis_index(&AxisType::X), None);
        assert_eq!(m.axis_index(&AxisType::Channel), Some(0));
    }

    #[test]
    fn test_set_axis_type_out_of_range() {
        let mut m = ImageMetadata::new();
        assert!(m.set_axis_type(0, AxisType::X).is_err());
    }

    #[test]
    fn test_side_table_aliases_on_clone() {
        let m = nd_entry();
        let copy = m.clone();
        m.put("stage-position", json!([1.5, 2.5]));
        assert_eq!(copy.get("stage-position"), Some(json!([1.5, 2.5])));

        // deep_clone detaches the table.
        let detached = m.deep_clone();
        m.put("exposure-ms", json!(40));
        assert_eq!(detached.get("exposure-ms"), None);
        assert_eq!(detached.get("stage-position"), Some(json!([1.5, 2.5])));
    }
}
