//! Metadata-wrapper capability registry.
//!
//! Filters do not hardcode their metadata wrappers; at attach time they ask
//! the registry for a wrapper descriptor matching their capability tag. The
//! registry is a static table resolved at startup: descriptors map a filter
//! tag to a wrapper id, and a second table maps wrapper ids to constructors.
//! A descriptor naming a wrapper with no registered constructor is the
//! recoverable discovery failure: the filter logs it and falls back to
//! aliasing its parent's metadata.

use std::collections::HashMap;

use crate::error::DiscoveryError;
use crate::meta::dataset::SharedDataset;

// =============================================================================
// MetadataWrapper
// =============================================================================

/// Decorating view over a parent's dataset metadata.
///
/// A wrapper derives its exposed view from the parent metadata it wraps,
/// adjusting whatever its filter transforms (axis lengths, flags) while
/// keeping each entry's side table aliased to the parent's. Re-wrapping
/// re-derives the view; filters call it whenever the parent metadata
/// changes.
pub trait MetadataWrapper: std::fmt::Debug {
    /// Identifier of this wrapper kind within the registry.
    fn id(&self) -> &'static str;

    /// Apply filter-specific parameters before the first wrap.
    fn configure(&mut self, params: &serde_json::Value) {
        let _ = params;
    }

    /// Derive the exposed view from `parent`. May be called repeatedly.
    fn wrap(&mut self, parent: SharedDataset);

    /// The view exposed upward. Only valid after `wrap`.
    fn view(&self) -> SharedDataset;
}

/// Nullary constructor for a wrapper kind.
pub type WrapperCtor = fn() -> Box<dyn MetadataWrapper>;

// =============================================================================
// Descriptors and Registry
// =============================================================================

/// One registry entry: which wrapper serves which filter tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperDescriptor {
    /// Capability tag of the filter this wrapper targets.
    pub target: &'static str,
    /// Id of the wrapper to instantiate.
    pub wrapper: &'static str,
}

/// Static lookup from filter capability tags to constructible wrappers.
#[derive(Default)]
pub struct WrapperRegistry {
    descriptors: Vec<WrapperDescriptor>,
    constructors: HashMap<&'static str, WrapperCtor>,
}

impl WrapperRegistry {
    /// Empty registry: every filter falls back to metadata aliasing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry wired with the wrappers shipped by this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            WrapperDescriptor {
                target: crate::filter::channel_filler::TAG,
                wrapper: crate::filter::channel_filler::WRAPPER_ID,
            },
            crate::filter::channel_filler::new_wrapper,
        );
        registry.register(
            WrapperDescriptor {
                target: crate::filter::crop::TAG,
                wrapper: crate::filter::crop::WRAPPER_ID,
            },
            crate::filter::crop::new_wrapper,
        );
        registry
    }

    /// Register a descriptor together with its constructor.
    pub fn register(&mut self, descriptor: WrapperDescriptor, ctor: WrapperCtor) {
        self.descriptors.push(descriptor);
        self.constructors.insert(descriptor.wrapper, ctor);
    }

    /// Register a descriptor whose wrapper is expected to be provided
    /// elsewhere. If no constructor for it ever shows up, instantiation
    /// fails with a discovery error.
    pub fn register_descriptor(&mut self, descriptor: WrapperDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Find the first descriptor targeting the given filter tag.
    pub fn lookup(&self, filter_tag: &str) -> Option<WrapperDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.target == filter_tag)
            .copied()
    }

    /// Construct the wrapper named by a descriptor.
    ///
    /// # Errors
    ///
    /// `UnresolvedWrapper` if the descriptor's wrapper id has no registered
    /// constructor.
    pub fn instantiate(
        &self,
        descriptor: &WrapperDescriptor,
    ) -> Result<Box<dyn MetadataWrapper>, DiscoveryError> {
        let ctor = self.constructors.get(descriptor.wrapper).ok_or_else(|| {
            DiscoveryError::UnresolvedWrapper {
                id: descriptor.wrapper.to_string(),
            }
        })?;
        Ok(ctor())
    }
}

impl std::fmt::Debug for WrapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperRegistry")
            .field("descriptors", &self.descriptors)
            .field("constructors", &self.constructors.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_resolves_shipped_wrappers() {
        let registry = WrapperRegistry::with_defaults();
        for tag in [
            crate::filter::channel_filler::TAG,
            crate::filter::crop::TAG,
        ] {
            let descriptor = registry.lookup(tag).expect("descriptor for shipped filter");
            assert!(registry.instantiate(&descriptor).is_ok());
        }
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let registry = WrapperRegistry::with_defaults();
        assert!(registry.lookup("no-such-filter").is_none());
    }

    #[test]
    fn test_unresolvable_descriptor_is_discovery_error() {
        let mut registry = WrapperRegistry::new();
        registry.register_descriptor(WrapperDescriptor {
            target: "some-filter",
            wrapper: "missing-wrapper",
        });

        let descriptor = registry.lookup("some-filter").unwrap();
        let err = registry.instantiate(&descriptor).unwrap_err();
        assert!(matches!(err, DiscoveryError::UnresolvedWrapper { .. }));
    }
}
