//! Synthetic base reader.
//!
//! Parses identifiers that encode the dataset's shape directly, e.g.
//!
//! ```text
//! testImg&axes=X,Y,Time,Z,Channel&lengths=620,512,5,1,1.synthetic
//! ```
//!
//! and generates deterministic pixel data on demand. Supported parameters:
//! `axes` and `lengths` (required, comma-separated, equal counts),
//! `planar` (planar axis count, default 2), `interleaved` (interleaved axis
//! count, default 0), `indexed` (palette-indexed samples, default false),
//! `series` (number of identical series, default 1).
//!
//! This is the attachment target for filter chains in tests and the
//! reference implementation of the reader contract: malformed identifiers
//! fail `set_source` with `SourceAttach`, and nothing is retried.

use bytes::Bytes;
use tracing::debug;

use crate::error::ReaderError;
use crate::meta::axis::{Axis, AxisType};
use crate::meta::dataset::{shared, DatasetMetadata, SharedDataset};
use crate::meta::image::ImageMetadata;
use crate::reader::plane::{Plane, Region};
use crate::reader::Reader;

/// Identifier suffix recognized by this reader.
pub const SUFFIX: &str = ".synthetic";

/// Maximum edge length of a thumbnail plane.
pub const THUMBNAIL_EDGE: u64 = 128;

// Sample values cycle modulo a prime so neighboring planes differ.
const SAMPLE_MODULUS: u64 = 251;

/// Base reader over synthetic identifier-described data.
#[derive(Debug)]
pub struct SyntheticReader {
    meta: SharedDataset,
    current: Option<String>,
}

impl Default for SyntheticReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticReader {
    pub fn new() -> Self {
        Self {
            meta: shared(DatasetMetadata::new()),
            current: None,
        }
    }

    /// Convenience: construct and attach in one step.
    pub fn open(id: &str) -> Result<Self, ReaderError> {
        let mut reader = Self::new();
        reader.set_source(id)?;
        Ok(reader)
    }

    fn attach_err(id: &str, reason: impl Into<String>) -> ReaderError {
        ReaderError::SourceAttach {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Parse one identifier into a dataset description.
    fn parse_identifier(id: &str) -> Result<DatasetMetadata, ReaderError> {
        let body = id
            .strip_suffix(SUFFIX)
            .ok_or_else(|| Self::attach_err(id, format!("missing {SUFFIX} suffix")))?;

        let mut axes: Option<Vec<AxisType>> = None;
        let mut lengths: Option<Vec<u64>> = None;
        let mut planar: usize = 2;
        let mut interleaved: usize = 0;
        let mut indexed = false;
        let mut series: usize = 1;

        // First token is the dataset name; the rest are key=value pairs.
        for token in body.split('&').skip(1) {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| Self::attach_err(id, format!("malformed parameter {token:?}")))?;
            match key {
                "axes" => {
                    axes = Some(
                        value
                            .split(',')
                            .filter(|s| !s.is_empty())
                            .map(AxisType::parse)
                            .collect(),
                    );
                }
                "lengths" => {
                    let parsed: Result<Vec<u64>, _> = value
                        .split(',')
                        .filter(|s| !s.is_empty())
                        .map(str::parse)
                        .collect();
                    lengths = Some(parsed.map_err(|e| {
                        Self::attach_err(id, format!("bad length in {value:?}: {e}"))
                    })?);
                }
                "planar" => {
                    planar = value
                        .parse()
                        .map_err(|e| Self::attach_err(id, format!("bad planar count: {e}")))?;
                }
                "interleaved" => {
                    interleaved = value.parse().map_err(|e| {
                        Self::attach_err(id, format!("bad interleaved count: {e}"))
                    })?;
                }
                "indexed" => {
                    indexed = value
                        .parse()
                        .map_err(|e| Self::attach_err(id, format!("bad indexed flag: {e}")))?;
                }
                "series" => {
                    series = value
                        .parse()
                        .map_err(|e| Self::attach_err(id, format!("bad series count: {e}")))?;
                }
                _ => {
                    return Err(Self::attach_err(id, format!("unknown parameter {key:?}")));
                }
            }
        }

        let axes = axes.ok_or_else(|| Self::attach_err(id, "missing axes parameter"))?;
        let lengths = lengths.ok_or_else(|| Self::attach_err(id, "missing lengths parameter"))?;
        if axes.len() != lengths.len() {
            return Err(Self::attach_err(
                id,
                format!("{} axes but {} lengths", axes.len(), lengths.len()),
            ));
        }
        if planar > axes.len() {
            return Err(Self::attach_err(
                id,
                format!("planar count {planar} exceeds {} axes", axes.len()),
            ));
        }

        let mut dataset = DatasetMetadata::new();
        for _ in 0..series.max(1) {
            let mut entry = ImageMetadata::new();
            entry.set_axes(
                axes.iter()
                    .zip(lengths.iter())
                    .map(|(t, &l)| Axis::new(t.clone(), l))
                    .collect(),
            );
            entry.set_planar_axis_count(planar);
            entry.set_interleaved_axis_count(interleaved);
            entry.set_indexed(indexed);
            entry.set_order_certain(true);
            entry.set_metadata_complete(true);
            dataset.push(entry);
        }
        Ok(dataset)
    }

    fn planar_extents(&self, image_index: usize) -> Result<(u64, u64), ReaderError> {
        crate::reader::planar_extents(&self.meta, image_index)
    }

    fn require_source(&self) -> Result<(), ReaderError> {
        if self.current.is_none() {
            return Err(ReaderError::NoSource);
        }
        Ok(())
    }

    fn check_plane_index(&self, image_index: usize, plane_index: u64) -> Result<(), ReaderError> {
        let count = self.plane_count(image_index)?;
        if plane_index >= count {
            return Err(ReaderError::PlaneOutOfRange {
                image: image_index,
                index: plane_index,
                count,
            });
        }
        Ok(())
    }

    fn sample(plane_index: u64, x: u64, y: u64) -> u8 {
        ((plane_index + x + y) % SAMPLE_MODULUS) as u8
    }

    /// Generate the payload for a region of one plane.
    fn generate(plane_index: u64, region: Region) -> Bytes {
        let mut data = Vec::with_capacity(region.sample_count() as usize);
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                data.push(Self::sample(plane_index, x, y));
            }
        }
        Bytes::from(data)
    }

    fn open_region_checked(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
    ) -> Result<Plane, ReaderError> {
        self.require_source()?;
        self.check_plane_index(image_index, plane_index)?;
        let (width, height) = self.planar_extents(image_index)?;
        if !region.fits_within(width, height) {
            return Err(ReaderError::RegionOutOfBounds {
                region: region.to_string(),
                width,
                height,
            });
        }
        Ok(Plane::new(
            image_index,
            plane_index,
            region,
            Self::generate(plane_index, region),
        ))
    }
}

impl Reader for SyntheticReader {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn set_source(&mut self, id: &str) -> Result<(), ReaderError> {
        let dataset = Self::parse_identifier(id)?;
        debug!(id, series = dataset.image_count(), "attached synthetic source");
        // Mutate in place so aliased views observe the new dataset.
        *self.meta.write() = dataset;
        self.current = Some(id.to_string());
        Ok(())
    }

    fn open_plane(&mut self, image_index: usize, plane_index: u64) -> Result<Plane, ReaderError> {
        let (width, height) = {
            self.require_source()?;
            self.planar_extents(image_index)?
        };
        self.open_region_checked(image_index, plane_index, Region::full(width, height))
    }

    fn open_plane_region(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
    ) -> Result<Plane, ReaderError> {
        self.open_region_checked(image_index, plane_index, region)
    }

    fn open_thumb_plane(
        &mut self,
        image_index: usize,
        plane_index: u64,
    ) -> Result<Plane, ReaderError> {
        self.require_source()?;
        self.check_plane_index(image_index, plane_index)?;
        let (width, height) = self.planar_extents(image_index)?;
        let thumb_w = width.min(THUMBNAIL_EDGE).max(1);
        let thumb_h = height.min(THUMBNAIL_EDGE).max(1);

        // Nearest-neighbor downsample of the generated data.
        let mut data = Vec::with_capacity((thumb_w * thumb_h) as usize);
        for ty in 0..thumb_h {
            for tx in 0..thumb_w {
                let sx = tx * width / thumb_w;
                let sy = ty * height / thumb_h;
                data.push(Self::sample(plane_index, sx, sy));
            }
        }
        Ok(Plane::new(
            image_index,
            plane_index,
            Region::full(thumb_w, thumb_h),
            Bytes::from(data),
        ))
    }

    fn read_plane_into(
        &mut self,
        image_index: usize,
        plane_index: u64,
        region: Region,
        plane: &mut Plane,
    ) -> Result<(), ReaderError> {
        let fresh = self.open_region_checked(image_index, plane_index, region)?;
        plane.fill(region, fresh.data().clone());
        Ok(())
    }

    fn metadata(&self) -> SharedDataset {
        self.meta.clone()
    }

    fn set_metadata(&mut self, meta: SharedDataset) -> Result<(), ReaderError> {
        self.meta = meta;
        Ok(())
    }

    fn close(&mut self, file_only: bool) -> Result<(), ReaderError> {
        if self.current.is_none() {
            // Already closed; idempotent by contract.
            return Ok(());
        }
        debug!(file_only, "closing synthetic reader");
        self.current = None;
        if !file_only {
            *self.meta.write() = DatasetMetadata::new();
        }
        Ok(())
    }

    fn plane_count(&self, image_index: usize) -> Result<u64, ReaderError> {
        let meta = self.meta.read();
        Ok(meta.entry(image_index)?.plane_count())
    }

    fn image_count(&self) -> usize {
        self.meta.read().image_count()
    }

    fn current_file(&self) -> Option<String> {
        self.current.clone()
    }
}
