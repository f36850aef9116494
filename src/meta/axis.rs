//! Axis model: typed, ordered dimensions of an image.
//!
//! An axis pairs a type tag (X, Y, Z, Channel, Time, or an extension tag)
//! with a sample length. The *position* of an axis inside its owning entry is
//! semantically significant: the leading `planar_axis_count` axes are
//! iterated within a single plane, the rest index across planes.

use serde::{Deserialize, Serialize};

// =============================================================================
// AxisType
// =============================================================================

/// Type tag for one dimension of an image.
///
/// The five canonical tags map onto the legacy X/Y/Z/C/T model; everything
/// else (lifetime, spectra, polarization, ...) travels as `Custom` and is
/// narrowed away by the legacy bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisType {
    X,
    Y,
    Z,
    Channel,
    Time,
    /// Extension tag for non-canonical dimensions.
    Custom(String),
}

impl AxisType {
    /// The legacy dimension-order letter for a canonical type; `None` for
    /// extension tags.
    pub fn letter(&self) -> Option<char> {
        match self {
            AxisType::X => Some('X'),
            AxisType::Y => Some('Y'),
            AxisType::Z => Some('Z'),
            AxisType::Channel => Some('C'),
            AxisType::Time => Some('T'),
            AxisType::Custom(_) => None,
        }
    }

    /// Parse an axis tag name, case-insensitively.
    ///
    /// Unrecognized names produce `Custom` rather than failing; identifiers
    /// routinely carry vendor-specific tags.
    pub fn parse(name: &str) -> AxisType {
        match name.to_ascii_uppercase().as_str() {
            "X" => AxisType::X,
            "Y" => AxisType::Y,
            "Z" => AxisType::Z,
            "C" | "CHANNEL" => AxisType::Channel,
            "T" | "TIME" => AxisType::Time,
            _ => AxisType::Custom(name.to_string()),
        }
    }

    /// Human-readable tag name.
    pub fn name(&self) -> &str {
        match self {
            AxisType::X => "X",
            AxisType::Y => "Y",
            AxisType::Z => "Z",
            AxisType::Channel => "Channel",
            AxisType::Time => "Time",
            AxisType::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for AxisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Axis
// =============================================================================

/// One named dimension with a sample length.
///
/// A Channel axis may be composite: a stack of sub-dimensions (e.g. emission
/// wavelength x excitation wavelength) flattened into a single axis. The
/// sub-lengths multiply to the axis length; sub-types name each slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    axis_type: AxisType,
    length: u64,

    /// Lengths of each sub-dimension of a composite Channel axis.
    /// Empty for simple axes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_lengths: Vec<u64>,

    /// Names of each sub-dimension of a composite Channel axis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_types: Vec<String>,
}

impl Axis {
    /// Create a simple axis.
    pub fn new(axis_type: AxisType, length: u64) -> Self {
        Self {
            axis_type,
            length,
            sub_lengths: Vec::new(),
            sub_types: Vec::new(),
        }
    }

    /// Create a composite Channel axis from its sub-dimension lengths and
    /// names. The axis length is the product of the sub-lengths.
    pub fn composite_channel(sub_lengths: Vec<u64>, sub_types: Vec<String>) -> Self {
        let length = sub_lengths.iter().product();
        Self {
            axis_type: AxisType::Channel,
            length,
            sub_lengths,
            sub_types,
        }
    }

    pub fn axis_type(&self) -> &AxisType {
        &self.axis_type
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn set_length(&mut self, length: u64) {
        self.length = length;
    }

    /// Retype this axis in place. Does not reorder anything.
    pub fn set_type(&mut self, axis_type: AxisType) {
        self.axis_type = axis_type;
    }

    pub fn sub_lengths(&self) -> &[u64] {
        &self.sub_lengths
    }

    pub fn sub_types(&self) -> &[String] {
        &self.sub_types
    }
}
