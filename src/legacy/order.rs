//! The legacy 5-letter dimension order and its inference from an axis
//! sequence.
//!
//! A dimension order is exactly the letters X, Y, Z, C, T, each once, in
//! some order. Input is case-insensitive and normalized to uppercase;
//! anything else is rejected.

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::meta::axis::AxisType;

/// The canonical letters, in canonical order.
pub const CANONICAL_LETTERS: [char; 5] = ['X', 'Y', 'Z', 'C', 'T'];

/// Validated 5-letter dimension order, stored in uppercase normal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionOrder(String);

impl DimensionOrder {
    /// Parse and validate an order string.
    ///
    /// # Errors
    ///
    /// `InvalidDimensionOrder` if the string is not a permutation of exactly
    /// X, Y, Z, C, T (wrong length, unknown letter, or repeated letter).
    pub fn parse(order: &str) -> Result<Self, MetadataError> {
        let normalized = order.to_ascii_uppercase();

        if normalized.len() != CANONICAL_LETTERS.len() {
            return Err(MetadataError::InvalidDimensionOrder {
                order: order.to_string(),
                reason: format!("expected 5 letters, got {}", normalized.len()),
            });
        }

        let mut seen = [false; 5];
        for ch in normalized.chars() {
            let slot = CANONICAL_LETTERS.iter().position(|&c| c == ch).ok_or_else(|| {
                MetadataError::InvalidDimensionOrder {
                    order: order.to_string(),
                    reason: format!("letter {ch:?} is not one of X, Y, Z, C, T"),
                }
            })?;
            if seen[slot] {
                return Err(MetadataError::InvalidDimensionOrder {
                    order: order.to_string(),
                    reason: format!("letter {ch:?} appears more than once"),
                });
            }
            seen[slot] = true;
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Letters in stored order.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }

    /// Axis types in stored order.
    pub fn axis_types(&self) -> [AxisType; 5] {
        let mut types = [
            AxisType::X,
            AxisType::Y,
            AxisType::Z,
            AxisType::Channel,
            AxisType::Time,
        ];
        for (slot, ch) in self.letters().enumerate() {
            types[slot] = match ch {
                'X' => AxisType::X,
                'Y' => AxisType::Y,
                'Z' => AxisType::Z,
                'C' => AxisType::Channel,
                // Validated at construction.
                _ => AxisType::Time,
            };
        }
        types
    }
}

impl Default for DimensionOrder {
    fn default() -> Self {
        Self("XYZCT".to_string())
    }
}

impl std::fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DimensionOrder {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DimensionOrder> for String {
    fn from(order: DimensionOrder) -> Self {
        order.0
    }
}

/// Infer the nearest valid dimension order from an observed axis-type
/// sequence.
///
/// The first occurrence of each canonical type contributes its letter in
/// observed order; non-canonical types are skipped; any canonical letter not
/// observed is appended in X, Y, Z, C, T order. The result is always a valid
/// permutation, so an entry with arbitrary axes still narrows to a legal
/// legacy order.
pub fn infer_order(axis_types: &[AxisType]) -> DimensionOrder {
    let mut letters = String::with_capacity(5);
    for axis_type in axis_types {
        if let Some(letter) = axis_type.letter() {
            if !letters.contains(letter) {
                letters.push(letter);
            }
        }
    }
    for letter in CANONICAL_LETTERS {
        if !letters.contains(letter) {
            letters.push(letter);
        }
    }
    DimensionOrder(letters)
}
