//! Plane indexing: mixed-radix conversion between N-D coordinates and
//! linear plane indices.
//!
//! Both functions operate over the *non-planar* axis lengths of an entry,
//! with axis 0 the fastest-varying dimension: strides accumulate
//! left-to-right, so `raster = p[0] + p[1]*l[0] + p[2]*l[0]*l[1] + ...`.
//! They are exact inverses for every in-range input.

use crate::error::MetadataError;

/// Encode an N-D coordinate vector as a linear plane index.
///
/// # Errors
///
/// `DimensionMismatch` if `position` and `lengths` differ in length;
/// `OutOfRange` if any component reaches its axis length.
pub fn position_to_raster(lengths: &[u64], position: &[u64]) -> Result<u64, MetadataError> {
    if position.len() != lengths.len() {
        return Err(MetadataError::DimensionMismatch {
            operation: "position_to_raster",
            position_len: position.len(),
            lengths_len: lengths.len(),
        });
    }

    let mut raster = 0u64;
    let mut stride = 1u64;
    for (dimension, (&pos, &len)) in position.iter().zip(lengths.iter()).enumerate() {
        if pos >= len {
            return Err(MetadataError::OutOfRange {
                operation: "position_to_raster",
                value: pos,
                limit: len,
                dimension,
            });
        }
        raster += pos * stride;
        stride *= len;
    }
    Ok(raster)
}

/// Decode a linear plane index back into an N-D coordinate vector.
///
/// # Errors
///
/// `OutOfRange` if `raster` is not below the product of the lengths.
pub fn raster_to_position(lengths: &[u64], raster: u64) -> Result<Vec<u64>, MetadataError> {
    let total: u64 = lengths.iter().product();
    if raster >= total {
        return Err(MetadataError::OutOfRange {
            operation: "raster_to_position",
            value: raster,
            limit: total,
            dimension: lengths.len(),
        });
    }

    let mut position = Vec::with_capacity(lengths.len());
    let mut remaining = raster;
    for &len in lengths {
        position.push(remaining % len);
        remaining /= len;
    }
    Ok(position)
}
