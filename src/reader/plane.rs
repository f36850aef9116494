//! Plane and region value types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// =============================================================================
// Region
// =============================================================================

/// Rectangular sub-region of a plane, in samples, over the first two planar
/// axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
}

impl Region {
    pub fn new(x: u64, y: u64, width: u64, height: u64) -> Self {
        Self { x, y, width, height }
    }

    /// Full-extent region for the given planar dimensions.
    pub fn full(width: u64, height: u64) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether this region lies entirely within `width` x `height`.
    pub fn fits_within(&self, width: u64, height: u64) -> bool {
        self.x.checked_add(self.width).is_some_and(|right| right <= width)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= height)
    }

    /// Intersection with another region, or `None` if disjoint.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right > x && bottom > y {
            Some(Region::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.width * self.height
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

// =============================================================================
// Plane
// =============================================================================

/// One decoded plane: pixel payload plus the coordinates it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    image_index: usize,
    plane_index: u64,
    region: Region,
    data: Bytes,
}

impl Plane {
    pub fn new(image_index: usize, plane_index: u64, region: Region, data: Bytes) -> Self {
        Self {
            image_index,
            plane_index,
            region,
            data,
        }
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn plane_index(&self) -> u64 {
        self.plane_index
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Pixel payload, row-major within the region; one byte per sample, or
    /// per sample component when leading planar axes are interleaved.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Replace the payload and the region it covers.
    pub fn fill(&mut self, region: Region, data: Bytes) {
        self.region = region;
        self.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_fits_within() {
        let r = Region::new(10, 20, 30, 40);
        assert!(r.fits_within(40, 60));
        assert!(!r.fits_within(39, 60));
        assert!(!r.fits_within(40, 59));
    }

    #[test]
    fn test_region_intersect() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Region::new(5, 5, 5, 5)));

        let c = Region::new(10, 10, 5, 5);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_plane_fill() {
        let mut plane = Plane::new(0, 3, Region::full(4, 4), Bytes::from(vec![0u8; 16]));
        plane.fill(Region::new(1, 1, 2, 2), Bytes::from(vec![9u8; 4]));
        assert_eq!(plane.region(), Region::new(1, 1, 2, 2));
        assert_eq!(plane.data().len(), 4);
        assert_eq!(plane.plane_index(), 3);
    }
}
