//! Composable reader filters.
//!
//! A filter wraps exactly one parent reader and implements the same reader
//! capability interface, so filters stack into a chain: all read operations
//! flow from the outermost filter down to the base reader. Each filter may
//! wrap its parent's metadata with a registry-discovered wrapper; when
//! discovery finds nothing (or fails), the filter exposes the parent's
//! metadata aliased and unwrapped.
//!
//! Readers have several call shapes per operation family (full plane,
//! sub-region, thumbnail, into-buffer). A filter's cross-cutting behavior
//! must intercept all of them uniformly, so [`FilterNode`] calls one hook
//! per family before forwarding, whatever shape the caller used - a
//! behavior cannot "miss" a call by only handling one shape.
//!
//! - [`registry`] - wrapper discovery
//! - [`channel_filler`] - synthesizes channel data for indexed-color images
//! - [`crop`] - constrains reads to a fixed region

pub mod channel_filler;
pub mod crop;
pub mod registry;

use tracing::{debug, warn};

use crate::error::ReaderError;
use crate::meta::dataset::SharedDataset;
use crate::reader::{planar_extents, Plane, Reader, Region};

pub use channel_filler::ChannelFiller;
pub use crop::CropFilter;
pub use registry::{MetadataWrapper, WrapperCtor, WrapperDescriptor, WrapperRegistry};

// =============================================================================
// FilterBehavior
// =============================================================================

/// The pluggable part of a filter: hooks and transforms injected into the
/// uniform forwarding done by [`FilterNode`].
///
/// Every method has a no-op default; a concrete filter overrides only what
/// it needs.
pub trait FilterBehavior {
    /// Capability tag, consulted in the wrapper registry at attach time.
    fn tag(&self) -> &'static str;

    /// Whether this filter may legally wrap the given parent. Checked by
    /// chain assembly before anything is stored.
    fn is_compatible(&self, parent: &dyn Reader) -> bool {
        let _ = parent;
        true
    }

    /// Parameters handed to a discovered wrapper before its first wrap.
    fn wrapper_params(&self) -> Option<serde_json::Value> {
        None
    }

    /// Called once per `open_plane` family call (full, region, thumbnail),
    /// before forwarding.
    fn pre_open_plane(&mut self, image_index: usize, plane_index: u64) {
        let _ = (image_index, plane_index);
    }

    /// Called once per `read_plane_into` call, before forwarding.
    fn pre_read_plane(&mut self) {}

    /// Called once per `set_source` call with the normalized identifier,
    /// before forwarding.
    fn pre_set_source(&mut self, id: &str) {
        let _ = id;
    }

    /// Map a requested region (in this filter's coordinate frame) into the
    /// parent's frame.
    fn map_region(&self, region: Region) -> Region {
        region
    }

    /// Transform a plane on its way back up the chain. `parent_meta` is the
    /// parent's (pre-transformation) metadata view.
    fn transform_plane(
        &mut self,
        parent_meta: &SharedDataset,
        plane: Plane,
    ) -> Result<Plane, ReaderError> {
        let _ = parent_meta;
        Ok(plane)
    }
}

// =============================================================================
// FilterNode
// =============================================================================

/// One link of a filter chain: a behavior plus the parent it decorates.
///
/// Construction goes through [`FilterNode::attach`], which performs the
/// compatibility check and wrapper discovery. A node is itself a [`Reader`],
/// so nodes nest: `FilterNode::attach(f2, Box::new(node1), ...)`.
pub struct FilterNode<F: FilterBehavior> {
    behavior: F,
    parent: Box<dyn Reader>,
    wrapper: Option<Box<dyn MetadataWrapper>>,
    /// Fallback view when no wrapper is installed: the parent's metadata,
    /// aliased.
    aliased: SharedDataset,
}

impl<F: FilterBehavior> FilterNode<F> {
    /// Attach a filter behavior to a parent reader.
    ///
    /// Consults the registry for a wrapper descriptor targeting the
    /// behavior's tag. On a match the wrapper is instantiated, configured,
    /// and wrapped around the parent's metadata; on no match, or on a
    /// discovery failure, the node falls back to aliasing the parent's
    /// metadata directly. The fallback is logged, not fatal.
    ///
    /// # Errors
    ///
    /// `IncompatibleParent` if the behavior rejects the parent.
    pub fn attach(
        behavior: F,
        parent: Box<dyn Reader>,
        registry: &WrapperRegistry,
    ) -> Result<Self, ReaderError> {
        if !behavior.is_compatible(parent.as_ref()) {
            return Err(ReaderError::IncompatibleParent {
                filter: behavior.tag(),
                parent: parent.name().to_string(),
            });
        }

        let aliased = parent.metadata();
        let wrapper = match registry.lookup(behavior.tag()) {
            Some(descriptor) => match registry.instantiate(&descriptor) {
                Ok(mut wrapper) => {
                    if let Some(params) = behavior.wrapper_params() {
                        wrapper.configure(&params);
                    }
                    wrapper.wrap(aliased.clone());
                    debug!(
                        filter = behavior.tag(),
                        wrapper = wrapper.id(),
                        "installed metadata wrapper"
                    );
                    Some(wrapper)
                }
                Err(err) => {
                    warn!(
                        filter = behavior.tag(),
                        error = %err,
                        "wrapper discovery failed, aliasing parent metadata"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            behavior,
            parent,
            wrapper,
            aliased,
        })
    }

    /// The behavior driving this node.
    pub fn behavior(&self) -> &F {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut F {
        &mut self.behavior
    }

    /// The decorated parent reader.
    pub fn parent(&self) -> &dyn Reader {
        self.parent.as_ref()
    }

    /// Whether a metadata wrapper is installed (vs. aliasing fallback).
    pub fn has_wrapper(&self) -> bool {
        self.wrapper.is_some()
    }

    /// Normalized form of a source identifier, as handed to the
    /// `pre_set_source` hook: scheme prefix stripped, whitespace trimmed.
    fn normalize_id(id: &str) -> &str {
        id.trim().strip_prefix("file://").unwrap_or(id.trim())
    }

    /// Re-derive the exposed metadata after the parent's changed.
    fn refresh_metadata(&mut self) {
        let parent_meta = self.parent.metadata();
        match &mut self.wrapper {
            Some(wrapper) => wrapper.wrap(parent_meta),
            None => self.aliased = parent_meta,
        }
    }
}

impl<F: FilterBehavior + std::fmt::Debug> std::fmt::Debug for FilterNode<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterNode")
            .field("behavior", &self.behavior)
            .field("parent", &self.parent.name())
            .field("wrapper", &self.wrapper.as_ref().map(|w| w.id()))
            .finish()
    }
}

impl<F: FilterBehavior> Reader for FilterNode<F> {
    fn name(&self) -> &'static str {
        self.behavior.tag()
    }

    fn set_source(&mut self, id: &str) -> Result<(), ReaderError> {
        self.behavior.pre_set_source(Self::normalize_id(id));
        self.parent.set_source(id)?;
        self.refresh_metadata();
        Ok(())
    }

    fn open_plane(&mut self, image_index: usize, plane_index: u64) -> Result<Plane, ReaderError> {
        self.behavior.pre_open_plane(image_index, plane_index);
        // Full extent in this filter's frame, then mapped into the parent's.
        let (width, height) = planar_extents(&self.metadata(), image_index)?;
        let region = self.behavior.map_region(Region::full(width, height));
        let plane = self
            .parent
            .open_plane_region(image_index, plane_index, region)?;
        self.behavior.transform_plane(&self.parent.metadata(), plane)
    }

    fn open_plane_region(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
    ) -> Result<Plane, ReaderError> {
        self.behavior.pre_open_plane(image_index, plane_index);
        let region = self.behavior.map_region(region);
        let plane = self
            .parent
            .open_plane_region(image_index, plane_index, region)?;
        self.behavior.transform_plane(&self.parent.metadata(), plane)
    }

    fn open_thumb_plane(
        &mut self,
        image_index: usize,
        plane_index: u64,
    ) -> Result<Plane, ReaderError> {
        self.behavior.pre_open_plane(image_index, plane_index);
        let plane = self.parent.open_thumb_plane(image_index, plane_index)?;
        self.behavior.transform_plane(&self.parent.metadata(), plane)
    }

    fn read_plane_into(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
        plane: &mut Plane,
    ) -> Result<(), ReaderError> {
        self.behavior.pre_read_plane();
        let mapped = self.behavior.map_region(region);
        self.parent
            .read_plane_into(image_index, plane_index, mapped, plane)?;
        let transformed = self
            .behavior
            .transform_plane(&self.parent.metadata(), plane.clone())?;
        *plane = transformed;
        Ok(())
    }

    fn metadata(&self) -> SharedDataset {
        match &self.wrapper {
            Some(wrapper) => wrapper.view(),
            None => self.aliased.clone(),
        }
    }

    fn set_metadata(&mut self, meta: SharedDataset) -> Result<(), ReaderError> {
        // Parent first, then the local view.
        self.parent.set_metadata(meta.clone())?;
        match &mut self.wrapper {
            Some(wrapper) => wrapper.wrap(meta),
            None => self.aliased = meta,
        }
        Ok(())
    }

    fn close(&mut self, file_only: bool) -> Result<(), ReaderError> {
        // Idempotency is guaranteed down the chain by the base reader.
        self.parent.close(file_only)
    }

    fn plane_count(&self, image_index: usize) -> Result<u64, ReaderError> {
        let meta = self.metadata();
        let meta = meta.read();
        Ok(meta.entry(image_index)?.plane_count())
    }

    fn image_count(&self) -> usize {
        self.metadata().read().image_count()
    }

    fn current_file(&self) -> Option<String> {
        self.parent.current_file()
    }
}
