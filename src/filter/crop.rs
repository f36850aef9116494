//! Cropping filter: constrains every read to a fixed planar region.
//!
//! The crop region is expressed in the parent's coordinate frame. Reads
//! through the filter use crop-relative coordinates; the filter offsets them
//! before forwarding. Its metadata wrapper rewrites the X and Y axis lengths
//! to the crop dimensions so consumers of the exposed metadata see the
//! cropped extents.

use tracing::warn;

use crate::filter::registry::MetadataWrapper;
use crate::filter::FilterBehavior;
use crate::meta::axis::AxisType;
use crate::meta::dataset::{shared, DatasetMetadata, SharedDataset};
use crate::reader::{Reader, Region};

/// Capability tag of this filter.
pub const TAG: &str = "crop";

/// Registry id of the matching wrapper.
pub const WRAPPER_ID: &str = "crop-wrapper";

// =============================================================================
// Behavior
// =============================================================================

/// Restricts reads to a fixed region of each plane.
#[derive(Debug, Clone, Copy)]
pub struct CropFilter {
    region: Region,
}

impl CropFilter {
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

impl FilterBehavior for CropFilter {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn is_compatible(&self, parent: &dyn Reader) -> bool {
        // Cropping is planar; it needs a parent whose entries have at least
        // a two-axis planar prefix. An unattached parent is acceptable, its
        // entries show up on set_source.
        let meta = parent.metadata();
        let meta = meta.read();
        meta.is_empty() || meta.iter().all(|e| e.planar_axis_count() >= 2)
    }

    fn wrapper_params(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.region).ok()
    }

    /// Offset into the parent frame, then clamp to the crop bounds so a
    /// request can never read outside the crop.
    fn map_region(&self, region: Region) -> Region {
        let shifted = Region::new(
            self.region.x + region.x,
            self.region.y + region.y,
            region.width,
            region.height,
        );
        shifted
            .intersect(&self.region)
            .unwrap_or(Region::new(self.region.x, self.region.y, 0, 0))
    }
}

// =============================================================================
// Wrapper
// =============================================================================

/// Metadata view with the planar extents cut down to the crop region.
#[derive(Debug)]
pub struct CropWrapper {
    crop: Option<Region>,
    view: SharedDataset,
}

/// Registry constructor.
pub fn new_wrapper() -> Box<dyn MetadataWrapper> {
    Box::new(CropWrapper {
        crop: None,
        view: shared(DatasetMetadata::new()),
    })
}

impl MetadataWrapper for CropWrapper {
    fn id(&self) -> &'static str {
        WRAPPER_ID
    }

    fn configure(&mut self, params: &serde_json::Value) {
        match serde_json::from_value::<Region>(params.clone()) {
            Ok(region) => self.crop = Some(region),
            Err(err) => {
                warn!(error = %err, "ignoring malformed crop wrapper parameters");
            }
        }
    }

    fn wrap(&mut self, parent: SharedDataset) {
        let mut derived = parent.read().clone();
        if let Some(crop) = self.crop {
            for index in 0..derived.image_count() {
                if let Some(entry) = derived.get_mut(index) {
                    entry.set_axis_length(AxisType::X, crop.width);
                    entry.set_axis_length(AxisType::Y, crop.height);
                }
            }
        }
        *self.view.write() = derived;
    }

    fn view(&self) -> SharedDataset {
        self.view.clone()
    }
}
