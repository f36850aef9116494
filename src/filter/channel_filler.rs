//! Channel synthesis for indexed-color images.
//!
//! Palette-indexed sources store one index per sample and a color lookup
//! table on the side. Downstream consumers mostly want real channel data, so
//! this filter expands every index into an RGB triple: through the lookup
//! table stored under the `"lut"` side-table key when one is present, or a
//! grayscale ramp otherwise. Its metadata wrapper prepends an interleaved
//! planar Channel axis and clears the `indexed` flag, keeping the exposed
//! metadata consistent with the expanded planes; the plane count is
//! unchanged because the components are filled within each plane.

use bytes::Bytes;

use crate::error::ReaderError;
use crate::filter::registry::MetadataWrapper;
use crate::filter::FilterBehavior;
use crate::meta::axis::{Axis, AxisType};
use crate::meta::dataset::{shared, DatasetMetadata, SharedDataset};
use crate::meta::image::ImageMetadata;
use crate::reader::Plane;

/// Capability tag of this filter.
pub const TAG: &str = "channel-filler";

/// Registry id of the matching wrapper.
pub const WRAPPER_ID: &str = "channel-filler-wrapper";

/// Side-table key holding the color lookup table: an array of
/// `[r, g, b]` byte triples indexed by sample value.
pub const LUT_KEY: &str = "lut";

/// Components per filled sample.
const COMPONENTS: u64 = 3;

// =============================================================================
// Behavior
// =============================================================================

/// Expands palette indices into channel samples.
#[derive(Debug, Default)]
pub struct ChannelFiller;

impl ChannelFiller {
    pub fn new() -> Self {
        Self
    }

    /// Parse the entry's lookup table, if any.
    fn lut_for(entry: &ImageMetadata) -> Option<Vec<[u8; 3]>> {
        let value = entry.get(LUT_KEY)?;
        let rows = value.as_array()?;
        let mut lut = Vec::with_capacity(rows.len());
        for row in rows {
            let triple = row.as_array()?;
            if triple.len() != 3 {
                return None;
            }
            let mut rgb = [0u8; 3];
            for (slot, component) in rgb.iter_mut().zip(triple) {
                *slot = component.as_u64()? as u8;
            }
            lut.push(rgb);
        }
        Some(lut)
    }

    /// Expand one plane of indices into interleaved RGB samples.
    fn fill(plane: &Plane, lut: Option<&[[u8; 3]]>) -> Bytes {
        let mut data = Vec::with_capacity(plane.data().len() * COMPONENTS as usize);
        for &index in plane.data() {
            let rgb = lut
                .and_then(|l| l.get(index as usize).copied())
                .unwrap_or([index, index, index]);
            data.extend_from_slice(&rgb);
        }
        Bytes::from(data)
    }
}

impl FilterBehavior for ChannelFiller {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn transform_plane(
        &mut self,
        parent_meta: &SharedDataset,
        plane: Plane,
    ) -> Result<Plane, ReaderError> {
        let lut = {
            let meta = parent_meta.read();
            let entry = meta.entry(plane.image_index())?;
            if !entry.is_indexed() {
                return Ok(plane);
            }
            Self::lut_for(entry)
        };

        let data = Self::fill(&plane, lut.as_deref());
        Ok(Plane::new(
            plane.image_index(),
            plane.plane_index(),
            plane.region(),
            data,
        ))
    }
}

// =============================================================================
// Wrapper
// =============================================================================

/// Metadata view with synthesized channels.
#[derive(Debug)]
pub struct ChannelFillerWrapper {
    view: SharedDataset,
}

/// Registry constructor.
pub fn new_wrapper() -> Box<dyn MetadataWrapper> {
    Box::new(ChannelFillerWrapper {
        view: shared(DatasetMetadata::new()),
    })
}

impl MetadataWrapper for ChannelFillerWrapper {
    fn id(&self) -> &'static str {
        WRAPPER_ID
    }

    fn wrap(&mut self, parent: SharedDataset) {
        // Entry clones alias the parent's side tables; only the axis model
        // and flags are rewritten.
        let mut derived = parent.read().clone();
        for index in 0..derived.image_count() {
            if let Some(entry) = derived.get_mut(index) {
                if !entry.is_indexed() {
                    continue;
                }
                // The synthesized components live inside each plane,
                // interleaved per sample, so the Channel axis goes at the
                // front of the planar prefix and the plane count stays the
                // parent's. An existing planar Channel axis folds into it;
                // a non-planar one keeps indexing across planes.
                let planar = entry.planar_axis_count();
                let mut filled = COMPONENTS;
                let mut folded = 0;
                let mut axes = Vec::with_capacity(entry.axis_count() + 1);
                for (position, axis) in entry.axes().iter().enumerate() {
                    if position < planar && *axis.axis_type() == AxisType::Channel {
                        filled *= axis.length();
                        folded += 1;
                        continue;
                    }
                    axes.push(axis.clone());
                }
                axes.insert(0, Axis::new(AxisType::Channel, filled));
                entry.set_axes(axes);
                entry.set_planar_axis_count(planar - folded + 1);
                entry.set_interleaved_axis_count(1);
                entry.set_indexed(false);
            }
        }
        // Replace contents in place so earlier view handles stay current.
        *self.view.write() = derived;
    }

    fn view(&self) -> SharedDataset {
        self.view.clone()
    }
}
