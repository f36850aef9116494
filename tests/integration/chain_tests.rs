//! Filter-chain integration tests.
//!
//! Assembles real chains over the synthetic base reader and checks that
//! region mapping, plane transformation, and wrapped metadata views stay
//! consistent from the outermost filter down.

use ndimage_reader::meta::AxisType;
use ndimage_reader::reader::{Reader, Region, SyntheticReader};
use ndimage_reader::{
    ChannelFiller, CropFilter, FilterNode, ReaderError, WrapperDescriptor, WrapperRegistry,
};

const BASE_ID: &str = "img&axes=X,Y,Z&lengths=100,80,4.synthetic";
const INDEXED_ID: &str = "img&axes=X,Y,Z&lengths=100,80,4&indexed=true.synthetic";

const CROP: Region = Region {
    x: 10,
    y: 20,
    width: 30,
    height: 40,
};

fn base(id: &str) -> Box<dyn Reader> {
    Box::new(SyntheticReader::open(id).unwrap())
}

// =============================================================================
// Crop over synthetic
// =============================================================================

#[test]
fn test_crop_rewrites_exposed_extents() {
    let registry = WrapperRegistry::with_defaults();
    let node = FilterNode::attach(CropFilter::new(CROP), base(BASE_ID), &registry).unwrap();

    assert!(node.has_wrapper());
    let meta = node.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();
    assert_eq!(entry.axis_length(&AxisType::X), Some(30));
    assert_eq!(entry.axis_length(&AxisType::Y), Some(40));
    assert_eq!(entry.axis_length(&AxisType::Z), Some(4));
    assert_eq!(entry.plane_count(), 4);

    // The base reader's own metadata is untouched.
    let parent = node.parent().metadata();
    assert_eq!(parent.read().get(0).unwrap().axis_length(&AxisType::X), Some(100));
}

#[test]
fn test_crop_full_plane_equals_parent_region_read() {
    let registry = WrapperRegistry::with_defaults();
    let mut node = FilterNode::attach(CropFilter::new(CROP), base(BASE_ID), &registry).unwrap();

    let cropped = node.open_plane(0, 1).unwrap();
    assert_eq!(cropped.data().len(), (30 * 40) as usize);

    let mut direct = SyntheticReader::open(BASE_ID).unwrap();
    let expected = direct.open_plane_region(0, 1, CROP).unwrap();
    assert_eq!(cropped.data(), expected.data());
}

#[test]
fn test_crop_region_read_offsets_into_parent_frame() {
    let registry = WrapperRegistry::with_defaults();
    let mut node = FilterNode::attach(CropFilter::new(CROP), base(BASE_ID), &registry).unwrap();

    let sub = node.open_plane_region(0, 0, Region::new(5, 5, 8, 8)).unwrap();

    let mut direct = SyntheticReader::open(BASE_ID).unwrap();
    let expected = direct
        .open_plane_region(0, 0, Region::new(15, 25, 8, 8))
        .unwrap();
    assert_eq!(sub.data(), expected.data());
}

#[test]
fn test_crop_rejects_parent_without_planar_plane() {
    let registry = WrapperRegistry::with_defaults();
    let parent = base("img&axes=X,Y&lengths=8,8&planar=1.synthetic");
    let err = FilterNode::attach(CropFilter::new(CROP), parent, &registry).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::IncompatibleParent { filter: "crop", .. }
    ));
}

// =============================================================================
// Stacked filters
// =============================================================================

#[test]
fn test_channel_filler_over_crop() {
    let registry = WrapperRegistry::with_defaults();
    let crop = FilterNode::attach(CropFilter::new(CROP), base(INDEXED_ID), &registry).unwrap();
    let mut chain =
        FilterNode::attach(ChannelFiller::new(), Box::new(crop), &registry).unwrap();

    // The outer view sees cropped extents with a synthesized interleaved
    // channel axis; the plane count is still the parent's.
    {
        let meta = chain.metadata();
        let meta = meta.read();
        let entry = meta.get(0).unwrap();
        assert_eq!(entry.axis_length(&AxisType::X), Some(30));
        assert_eq!(entry.axis_length(&AxisType::Y), Some(40));
        assert_eq!(entry.axis_length(&AxisType::Channel), Some(3));
        assert_eq!(entry.axis_index(&AxisType::Channel), Some(0));
        assert!(!entry.is_indexed());
        assert_eq!(entry.plane_count(), 4);
    }

    // Cropped indices, expanded to grayscale triples.
    let plane = chain.open_plane(0, 0).unwrap();
    assert_eq!(plane.data().len(), (30 * 40 * 3) as usize);

    let mut direct = SyntheticReader::open(INDEXED_ID).unwrap();
    let indices = direct.open_plane_region(0, 0, CROP).unwrap();
    for (i, &index) in indices.data().iter().enumerate() {
        assert_eq!(&plane.data()[i * 3..i * 3 + 3], &[index, index, index]);
    }
}

#[test]
fn test_filler_plane_count_matches_readable_planes() {
    let registry = WrapperRegistry::with_defaults();
    let mut node =
        FilterNode::attach(ChannelFiller::new(), base(INDEXED_ID), &registry).unwrap();

    // Every advertised plane opens; one past the end does not.
    let count = node.plane_count(0).unwrap();
    assert_eq!(count, 4);
    for plane_index in 0..count {
        let plane = node.open_plane(0, plane_index).unwrap();
        assert_eq!(plane.data().len(), (100 * 80 * 3) as usize);
    }
    assert!(matches!(
        node.open_plane(0, count).unwrap_err(),
        ReaderError::PlaneOutOfRange { .. }
    ));
}

#[test]
fn test_channel_filler_expands_thumbnails() {
    let registry = WrapperRegistry::with_defaults();
    let parent = base("img&axes=X,Y,Z&lengths=512,256,2&indexed=true.synthetic");
    let mut node = FilterNode::attach(ChannelFiller::new(), parent, &registry).unwrap();

    let thumb = node.open_thumb_plane(0, 1).unwrap();
    assert_eq!(thumb.region().width, 128);
    assert_eq!(thumb.region().height, 128);
    assert_eq!(thumb.data().len(), (128 * 128 * 3) as usize);
}

// =============================================================================
// Discovery fallback and lifecycle
// =============================================================================

#[test]
fn test_unresolved_wrapper_falls_back_to_aliasing() {
    // A descriptor pointing at a wrapper nobody registered: discovery fails,
    // the filter aliases the parent's metadata and keeps working.
    let mut registry = WrapperRegistry::new();
    registry.register_descriptor(WrapperDescriptor {
        target: "crop",
        wrapper: "crop-wrapper-from-some-other-build",
    });

    let mut node = FilterNode::attach(CropFilter::new(CROP), base(BASE_ID), &registry).unwrap();
    assert!(!node.has_wrapper());

    // Exposed extents are the parent's, unwrapped.
    let meta = node.metadata();
    assert_eq!(meta.read().get(0).unwrap().axis_length(&AxisType::X), Some(100));

    // Region mapping still applies on the read path.
    let sub = node.open_plane_region(0, 0, Region::new(0, 0, 10, 10)).unwrap();
    let mut direct = SyntheticReader::open(BASE_ID).unwrap();
    let expected = direct
        .open_plane_region(0, 0, Region::new(10, 20, 10, 10))
        .unwrap();
    assert_eq!(sub.data(), expected.data());
}

#[test]
fn test_set_source_rewraps_through_the_chain() {
    let registry = WrapperRegistry::with_defaults();
    let mut node = FilterNode::attach(CropFilter::new(CROP), base(BASE_ID), &registry).unwrap();

    node.set_source("other&axes=X,Y,Time&lengths=200,160,6.synthetic")
        .unwrap();

    // The wrapper re-derived its view from the new dataset: crop extents on
    // top of the new non-planar shape.
    let meta = node.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();
    assert_eq!(entry.axis_length(&AxisType::X), Some(30));
    assert_eq!(entry.axis_length(&AxisType::Time), Some(6));
    assert_eq!(entry.plane_count(), 6);
}

#[test]
fn test_close_propagates_and_stays_idempotent() {
    let registry = WrapperRegistry::with_defaults();
    let crop = FilterNode::attach(CropFilter::new(CROP), base(INDEXED_ID), &registry).unwrap();
    let mut chain =
        FilterNode::attach(ChannelFiller::new(), Box::new(crop), &registry).unwrap();

    chain.close(false).unwrap();
    assert_eq!(chain.current_file(), None);
    assert!(matches!(
        chain.open_plane(0, 0).unwrap_err(),
        ReaderError::NoSource
    ));

    // Closing an already-closed chain is a no-op.
    chain.close(false).unwrap();
}
