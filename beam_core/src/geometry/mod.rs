//! # Beam Geometry
//!
//! Span definitions and support conditions of a straight continuous beam.
//!
//! ## Notation
//!
//! A beam is an optional left cantilever, one or more interior fields and an
//! optional right cantilever, walked left to right:
//!
//! ```text
//!   left cantilever   field 0      field 1    right cantilever
//!  ├──────────────△────────────△────────────△──────────────┤
//!   free tip    boundary 0   boundary 1   boundary 2    free tip
//! ```
//!
//! N fields have N+1 field boundaries. Every boundary is a support; by default
//! a pinned one (translation rigid, rotation free).
//!
//! ## Example
//!
//! ```rust
//! use beam_core::geometry::{SpanLayout, Support};
//!
//! // 1.2 m overhang, two 5 m fields, right end clamped into a wall
//! let layout = SpanLayout::new(vec![5.0, 5.0])
//!     .with_left_cantilever(1.2)
//!     .with_boundary_supports(vec![Support::pinned(), Support::pinned(), Support::clamped()]);
//!
//! assert_eq!(layout.field_count(), 2);
//! assert!((layout.total_length() - 11.2).abs() < 1e-12);
//! assert!(layout.validate().is_ok());
//! ```

pub mod mesher;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

pub use mesher::{mesh, Mesh, MeshElement, MeshSegment};

// =============================================================================
// RESTRAINTS & SUPPORTS
// =============================================================================

/// Restraint of one degree of freedom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum Restraint {
    /// No restraint
    #[default]
    Free,
    /// Rigid restraint (displacement forced to zero)
    Rigid,
    /// Elastic spring; stiffness in kN/m (translation) or kNm/rad (rotation)
    Spring { stiffness: f64 },
}

impl Restraint {
    /// Returns true unless the DOF is free
    pub fn is_restrained(&self) -> bool {
        !matches!(self, Restraint::Free)
    }

    /// Spring stiffness, or None for free/rigid restraints
    pub fn spring_stiffness(&self) -> Option<f64> {
        match self {
            Restraint::Spring { stiffness } => Some(*stiffness),
            _ => None,
        }
    }
}

/// Support condition of one node: a (translation, rotation) restraint pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Support {
    /// Vertical translation restraint
    pub translation: Restraint,
    /// Rotation restraint
    pub rotation: Restraint,
}

impl Support {
    /// Unsupported node
    pub fn free() -> Self {
        Support {
            translation: Restraint::Free,
            rotation: Restraint::Free,
        }
    }

    /// Pinned support - restrains vertical displacement, allows rotation
    pub fn pinned() -> Self {
        Support {
            translation: Restraint::Rigid,
            rotation: Restraint::Free,
        }
    }

    /// Clamped support - restrains displacement and rotation
    pub fn clamped() -> Self {
        Support {
            translation: Restraint::Rigid,
            rotation: Restraint::Rigid,
        }
    }

    /// Elastic vertical spring (kN/m), rotation free
    pub fn spring(stiffness: f64) -> Self {
        Support {
            translation: Restraint::Spring { stiffness },
            rotation: Restraint::Free,
        }
    }

    /// Builder: replace the rotation restraint
    pub fn with_rotation(mut self, rotation: Restraint) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns true if either DOF is restrained
    pub fn is_support(&self) -> bool {
        self.translation.is_restrained() || self.rotation.is_restrained()
    }

    fn validate(&self, field: &str) -> CalcResult<()> {
        for restraint in [self.translation, self.rotation] {
            if let Some(k) = restraint.spring_stiffness() {
                if !(k.is_finite() && k > 0.0) {
                    return Err(CalcError::invalid_input(
                        field,
                        k.to_string(),
                        "Spring stiffness must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// SPAN LAYOUT
// =============================================================================

/// Kind of a beam segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Overhang left of the first support
    LeftCantilever,
    /// Interior field, numbered from 0 left to right
    Field(usize),
    /// Overhang right of the last support
    RightCantilever,
}

impl SegmentKind {
    /// Returns true for either cantilever
    pub fn is_cantilever(&self) -> bool {
        matches!(self, SegmentKind::LeftCantilever | SegmentKind::RightCantilever)
    }

    /// Field index, or None for cantilevers
    pub fn field_index(&self) -> Option<usize> {
        match self {
            SegmentKind::Field(i) => Some(*i),
            _ => None,
        }
    }

    /// Short label for reports ("K_l", "F1", "K_r")
    pub fn label(&self) -> String {
        match self {
            SegmentKind::LeftCantilever => "K_l".to_string(),
            SegmentKind::Field(i) => format!("F{}", i + 1),
            SegmentKind::RightCantilever => "K_r".to_string(),
        }
    }
}

/// One segment of the beam in global coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment kind
    pub kind: SegmentKind,
    /// Start position from the left beam end (m)
    pub start: f64,
    /// Segment length (m)
    pub length: f64,
}

impl Segment {
    /// End position from the left beam end (m)
    pub fn end(&self) -> f64 {
        self.start + self.length
    }
}

/// Ordered span definition of a continuous beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanLayout {
    /// Left overhang length (m); None or 0.0 means no cantilever
    #[serde(default)]
    pub left_cantilever: Option<f64>,

    /// Interior field lengths (m), left to right
    #[serde(default)]
    pub fields: Vec<f64>,

    /// Right overhang length (m); None or 0.0 means no cantilever
    #[serde(default)]
    pub right_cantilever: Option<f64>,

    /// Support at each field boundary (length `fields.len() + 1`).
    ///
    /// Empty means pinned everywhere.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boundary_supports: Vec<Support>,
}

impl SpanLayout {
    /// Create a layout of interior fields without cantilevers
    pub fn new(fields: Vec<f64>) -> Self {
        SpanLayout {
            left_cantilever: None,
            fields,
            right_cantilever: None,
            boundary_supports: Vec::new(),
        }
    }

    /// Builder: add a left cantilever
    pub fn with_left_cantilever(mut self, length: f64) -> Self {
        self.left_cantilever = Some(length);
        self
    }

    /// Builder: add a right cantilever
    pub fn with_right_cantilever(mut self, length: f64) -> Self {
        self.right_cantilever = Some(length);
        self
    }

    /// Builder: set the support at every field boundary
    pub fn with_boundary_supports(mut self, supports: Vec<Support>) -> Self {
        self.boundary_supports = supports;
        self
    }

    /// Number of interior fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn effective_left(&self) -> Option<f64> {
        self.left_cantilever.filter(|l| *l > 0.0)
    }

    fn effective_right(&self) -> Option<f64> {
        self.right_cantilever.filter(|l| *l > 0.0)
    }

    /// Segments left to right in global coordinates.
    ///
    /// Zero-length cantilevers are omitted.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.fields.len() + 2);
        let mut position = 0.0;

        if let Some(length) = self.effective_left() {
            segments.push(Segment {
                kind: SegmentKind::LeftCantilever,
                start: position,
                length,
            });
            position += length;
        }
        for (i, length) in self.fields.iter().enumerate() {
            segments.push(Segment {
                kind: SegmentKind::Field(i),
                start: position,
                length: *length,
            });
            position += length;
        }
        if let Some(length) = self.effective_right() {
            segments.push(Segment {
                kind: SegmentKind::RightCantilever,
                start: position,
                length,
            });
        }
        segments
    }

    /// Total beam length (m)
    pub fn total_length(&self) -> f64 {
        self.segments().iter().map(|s| s.length).sum()
    }

    /// Validate the layout
    pub fn validate(&self) -> CalcResult<()> {
        for (name, value) in [("left_cantilever", self.left_cantilever), ("right_cantilever", self.right_cantilever)] {
            if let Some(length) = value {
                if !(length.is_finite() && length >= 0.0) {
                    return Err(CalcError::invalid_input(
                        name,
                        length.to_string(),
                        "Cantilever length must be zero or positive",
                    ));
                }
            }
        }

        for (i, length) in self.fields.iter().enumerate() {
            if !(length.is_finite() && *length > 0.0) {
                return Err(CalcError::invalid_input(
                    format!("fields[{}]", i),
                    length.to_string(),
                    "Field length must be positive",
                ));
            }
        }

        if self.fields.is_empty() && self.effective_left().is_none() && self.effective_right().is_none() {
            return Err(CalcError::configuration(
                "Beam has no fields and no cantilevers - at least one segment is required",
            ));
        }

        if !self.boundary_supports.is_empty() {
            if self.fields.is_empty() {
                return Err(CalcError::configuration(
                    "Boundary supports given for a beam without interior fields",
                ));
            }
            if self.boundary_supports.len() != self.fields.len() + 1 {
                return Err(CalcError::configuration(format!(
                    "Expected {} boundary supports for {} fields, got {}",
                    self.fields.len() + 1,
                    self.fields.len(),
                    self.boundary_supports.len()
                )));
            }
            for (i, support) in self.boundary_supports.iter().enumerate() {
                support.validate(&format!("boundary_supports[{}]", i))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_with_cantilevers() {
        let layout = SpanLayout::new(vec![4.0, 5.0])
            .with_left_cantilever(1.0)
            .with_right_cantilever(1.5);

        let segments = layout.segments();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].kind, SegmentKind::LeftCantilever);
        assert_eq!(segments[1].kind, SegmentKind::Field(0));
        assert_eq!(segments[2].start, 5.0);
        assert_eq!(segments[3].kind, SegmentKind::RightCantilever);
        assert_eq!(segments[3].end(), 11.5);
    }

    #[test]
    fn test_zero_length_cantilever_omitted() {
        let layout = SpanLayout::new(vec![4.0]).with_left_cantilever(0.0);
        let segments = layout.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0.0);
    }

    #[test]
    fn test_empty_layout_is_configuration_error() {
        let layout = SpanLayout::new(vec![]).with_right_cantilever(0.0);
        assert!(matches!(layout.validate(), Err(CalcError::Configuration { .. })));
    }

    #[test]
    fn test_cantilever_only_is_valid() {
        let layout = SpanLayout::new(vec![]).with_left_cantilever(2.0);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_negative_field_is_invalid_input() {
        let layout = SpanLayout::new(vec![4.0, -1.0]);
        assert!(matches!(layout.validate(), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_boundary_support_count_mismatch() {
        let layout = SpanLayout::new(vec![4.0, 4.0]).with_boundary_supports(vec![Support::pinned()]);
        assert!(matches!(layout.validate(), Err(CalcError::Configuration { .. })));
    }

    #[test]
    fn test_non_positive_spring_rejected() {
        let layout = SpanLayout::new(vec![4.0])
            .with_boundary_supports(vec![Support::pinned(), Support::spring(0.0)]);
        assert!(matches!(layout.validate(), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_support_constructors() {
        assert!(!Support::free().is_support());
        assert!(Support::pinned().translation.is_restrained());
        assert!(!Support::pinned().rotation.is_restrained());
        assert_eq!(Support::clamped().rotation, Restraint::Rigid);
        assert_eq!(Support::spring(500.0).translation.spring_stiffness(), Some(500.0));
    }

    #[test]
    fn test_layout_serialization() {
        let layout = SpanLayout::new(vec![5.0, 5.0]).with_right_cantilever(1.0);
        let json = serde_json::to_string(&layout).unwrap();
        let parsed: SpanLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, layout);
    }
}
