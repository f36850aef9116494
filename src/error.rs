use thiserror::Error;

/// Errors raised by the dimensional metadata model and plane indexing.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    /// A literal axis position was queried beyond the axis sequence.
    ///
    /// This is distinct from looking up an axis *type* that is absent; type
    /// lookups return `None` instead of failing.
    #[error("axis position out of range in {operation}: index {index}, axis count {count}")]
    IndexOutOfRange {
        operation: &'static str,
        index: usize,
        count: usize,
    },

    /// A coordinate or raster index exceeded the lengths it is indexed by.
    #[error("{operation}: value {value} exceeds limit {limit} at dimension {dimension}")]
    OutOfRange {
        operation: &'static str,
        value: u64,
        limit: u64,
        dimension: usize,
    },

    /// Coordinate vector length does not match the length vector.
    #[error("{operation}: position has {position_len} components, lengths has {lengths_len}")]
    DimensionMismatch {
        operation: &'static str,
        position_len: usize,
        lengths_len: usize,
    },

    /// A dimension order string is not a permutation of exactly X,Y,Z,C,T.
    #[error("invalid dimension order {order:?}: {reason}")]
    InvalidDimensionOrder { order: String, reason: String },
}

/// Errors raised by readers and filter chains.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The underlying source could not be attached (malformed identifier,
    /// failed format probe). Propagated unchanged to the caller, never
    /// retried internally.
    #[error("failed to attach source {id:?}: {reason}")]
    SourceAttach { id: String, reason: String },

    /// I/O failure from the underlying resource.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata-level failure surfaced through a reader operation.
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// A read was issued before any source was attached.
    #[error("no source attached")]
    NoSource,

    /// Image (series) index beyond the dataset's entry count.
    #[error("image index {index} out of range, dataset has {count} entries")]
    ImageOutOfRange { index: usize, count: usize },

    /// Plane index beyond the entry's plane count.
    #[error("plane index {index} out of range for image {image}, plane count {count}")]
    PlaneOutOfRange { image: usize, index: u64, count: u64 },

    /// Requested region falls outside the planar extents.
    #[error("region {region} outside planar extents {width}x{height}")]
    RegionOutOfBounds {
        region: String,
        width: u64,
        height: u64,
    },

    /// Chain assembly rejected the parent reader.
    #[error("filter {filter} is not compatible with parent reader {parent}")]
    IncompatibleParent {
        filter: &'static str,
        parent: String,
    },
}

/// Errors from metadata-wrapper discovery.
///
/// Discovery failures are recoverable by contract: the filter logs the error
/// and falls back to aliasing its parent's metadata.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// A descriptor named a wrapper with no registered constructor.
    #[error("wrapper {id:?} has no registered constructor")]
    UnresolvedWrapper { id: String },
}
