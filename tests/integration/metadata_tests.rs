//! Metadata model integration tests.
//!
//! Drives the axis model, plane indexing, and legacy bridge through a
//! reader, the way library consumers see them.

use ndimage_reader::legacy::CoreRecord;
use ndimage_reader::meta::{position_to_raster, raster_to_position, AxisType};
use ndimage_reader::reader::{Reader, SyntheticReader};
use ndimage_reader::MetadataError;

const ID: &str = "testImg&axes=X,Y,Time,Z,Channel&lengths=620,512,5,1,1.synthetic";

const ND_ID: &str =
    "ndImg&axes=X,Y,Z,Channel,Time,Lifetime,Spectra&lengths=256,128,2,6,10,4,8.synthetic";

// =============================================================================
// Axis model through a reader
// =============================================================================

#[test]
fn test_down_the_middle() {
    let reader = SyntheticReader::open(ID).unwrap();
    let meta = reader.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();

    // Axis types by position.
    assert_eq!(entry.axis_at(0).unwrap().axis_type(), &AxisType::X);
    assert_eq!(entry.axis_at(1).unwrap().axis_type(), &AxisType::Y);
    assert_eq!(entry.axis_at(2).unwrap().axis_type(), &AxisType::Time);
    assert_eq!(entry.axis_at(3).unwrap().axis_type(), &AxisType::Z);
    assert_eq!(entry.axis_at(4).unwrap().axis_type(), &AxisType::Channel);

    // Lengths by position.
    assert_eq!(entry.axis_length_at(0).unwrap(), 620);
    assert_eq!(entry.axis_length_at(1).unwrap(), 512);
    assert_eq!(entry.axis_length_at(2).unwrap(), 5);
    assert_eq!(entry.axis_length_at(3).unwrap(), 1);
    assert_eq!(entry.axis_length_at(4).unwrap(), 1);

    // Lengths and indices by type.
    assert_eq!(entry.axis_length(&AxisType::Time), Some(5));
    assert_eq!(entry.axis_index(&AxisType::X), Some(0));
    assert_eq!(entry.axis_index(&AxisType::Channel), Some(4));
}

#[test]
fn test_positional_query_fails_beyond_axes() {
    let reader = SyntheticReader::open(ID).unwrap();
    let meta = reader.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();

    assert!(matches!(
        entry.axis_length_at(5),
        Err(MetadataError::IndexOutOfRange { index: 5, .. })
    ));
}

#[test]
fn test_nd_plane_count_and_raster_lookups() {
    let reader = SyntheticReader::open(ND_ID).unwrap();
    let meta = reader.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();

    assert_eq!(entry.plane_count(), 2 * 6 * 10 * 4 * 8);
    let lengths = entry.axes_lengths_non_planar();

    assert_eq!(position_to_raster(&lengths, &[1, 3, 5, 0, 0]).unwrap(), 67);
    let expected = (3 * 6 * 2) + (3 * 10 * 6 * 2) + (7 * 4 * 10 * 6 * 2);
    assert_eq!(
        position_to_raster(&lengths, &[0, 0, 3, 3, 7]).unwrap(),
        expected
    );

    // And back.
    assert_eq!(raster_to_position(&lengths, 67).unwrap(), vec![1, 3, 5, 0, 0]);
}

#[test]
fn test_plane_count_tracks_planar_boundary_without_reattach() {
    let reader = SyntheticReader::open(ND_ID).unwrap();
    let meta = reader.metadata();

    meta.write().get_mut(0).unwrap().set_planar_axis_count(3);
    assert_eq!(reader.plane_count(0).unwrap(), 6 * 10 * 4 * 8);

    meta.write().get_mut(0).unwrap().set_planar_axis_count(4);
    assert_eq!(reader.plane_count(0).unwrap(), 10 * 4 * 8);
}

#[test]
fn test_multichannel_flag_through_reader_metadata() {
    let reader = SyntheticReader::open(ND_ID).unwrap();
    let meta = reader.metadata();

    // Channel sits at position 3, planar prefix is XY: multichannel.
    assert!(meta.read().get(0).unwrap().is_multichannel());

    meta.write().get_mut(0).unwrap().set_planar_axis_count(4);
    assert!(!meta.read().get(0).unwrap().is_multichannel());
}

// =============================================================================
// Legacy bridge over reader metadata
// =============================================================================

#[test]
fn test_legacy_round_trip_of_parsed_entry() {
    let reader = SyntheticReader::open(ID).unwrap();
    let meta = reader.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();

    let record = CoreRecord::from_entry(entry);
    assert_eq!(record.dimension_order.as_str(), "XYTZC");
    assert_eq!(record.size_x, 620);
    assert_eq!(record.size_t, 5);

    // Exactly the five canonical axes with an XY planar prefix: exact.
    let back = record.to_entry();
    assert_eq!(&back, entry);
}

#[test]
fn test_legacy_narrows_nd_entry() {
    let reader = SyntheticReader::open(ND_ID).unwrap();
    let meta = reader.metadata();
    let meta = meta.read();
    let entry = meta.get(0).unwrap();

    let record = CoreRecord::from_entry(entry);
    assert_eq!(record.size_c, 6);
    assert_eq!(record.dimension_order.as_str(), "XYZCT");

    let back = record.to_entry();
    assert_eq!(back.axis_count(), 5);
    assert_ne!(&back, entry);
    // Z*C*T planes remain once the extension axes are gone.
    assert_eq!(back.plane_count(), 2 * 6 * 10);
}
