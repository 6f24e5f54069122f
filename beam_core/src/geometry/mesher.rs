//! # Geometry Mesher
//!
//! Turns a [`SpanLayout`] into a chain of beam elements and one
//! [`Support`] per node.
//!
//! ## Discretization
//!
//! Every segment - field or cantilever - is split into
//! `max(min_elements_per_segment, ceil(length · elements_per_meter))`
//! elements of equal length. The total is capped by
//! [`AnalysisSettings::max_elements`].
//!
//! ## Supports
//!
//! Field boundaries carry the layout's boundary supports (pinned by
//! default). The outermost nodes are therefore translation-fixed unless a
//! cantilever extends past them; in that case the cantilever tip is free and
//! the constraint sits at the adjacent field boundary. A beam made only of
//! cantilevers is clamped at their common root.

use std::ops::Range;

use log::debug;

use super::{Segment, SegmentKind, SpanLayout, Support};
use crate::errors::{CalcError, CalcResult};
use crate::settings::AnalysisSettings;

/// One element of the mesh (geometry only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshElement {
    /// Element length (m)
    pub length: f64,
    /// Start position from the left beam end (m)
    pub start: f64,
    /// Index into [`Mesh::segments`]
    pub segment: usize,
}

/// A segment together with the elements that discretize it
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSegment {
    /// The segment
    pub segment: Segment,
    /// Element indices covering the segment
    pub elements: Range<usize>,
}

/// Discretized beam: elements, node positions and supports
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Segments left to right with their element ranges
    pub segments: Vec<MeshSegment>,
    /// Elements left to right
    pub elements: Vec<MeshElement>,
    /// Node positions from the left beam end (m); `elements.len() + 1` entries
    pub node_positions: Vec<f64>,
    /// Support per node; `elements.len() + 1` entries
    pub supports: Vec<Support>,
}

impl Mesh {
    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of nodes (always element_count + 1)
    pub fn node_count(&self) -> usize {
        self.node_positions.len()
    }

    /// Number of interior fields
    pub fn field_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.segment.kind.field_index().is_some())
            .count()
    }

    /// Segment kind an element belongs to
    pub fn element_kind(&self, element: usize) -> SegmentKind {
        self.segments[self.elements[element].segment].segment.kind
    }

    /// Indices of nodes that carry a support
    pub fn supported_nodes(&self) -> Vec<usize> {
        self.supports
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_support())
            .map(|(i, _)| i)
            .collect()
    }

    /// Total beam length (m)
    pub fn total_length(&self) -> f64 {
        self.node_positions.last().copied().unwrap_or(0.0)
    }
}

/// Number of elements used for a segment of the given length
///
/// # Errors
///
/// `Configuration` if the segment alone needs more than `max_elements`.
pub fn elements_for_length(length: f64, settings: &AnalysisSettings) -> CalcResult<usize> {
    let by_density = (length * settings.elements_per_meter).ceil();
    // Also rejects NaN and infinite products before the cast
    if !(by_density <= settings.max_elements as f64) {
        return Err(CalcError::configuration(format!(
            "A segment of {} m at {} elements/m exceeds the ceiling of {} elements",
            length, settings.elements_per_meter, settings.max_elements
        )));
    }
    Ok((by_density as usize).max(settings.min_elements_per_segment))
}

/// Discretize a span layout.
///
/// # Errors
///
/// * `Configuration` - no fields and no cantilevers, inconsistent boundary
///   supports, more than `max_elements` elements, or invalid settings
/// * `InvalidInput` - a non-positive field length or negative cantilever
pub fn mesh(layout: &SpanLayout, settings: &AnalysisSettings) -> CalcResult<Mesh> {
    layout.validate()?;
    settings.validate()?;

    let segments = layout.segments();
    let counts = segments
        .iter()
        .map(|s| elements_for_length(s.length, settings))
        .collect::<CalcResult<Vec<usize>>>()?;
    let total: usize = counts.iter().sum();
    if total > settings.max_elements {
        return Err(CalcError::configuration(format!(
            "Beam needs {} elements, the ceiling is {}",
            total, settings.max_elements
        )));
    }

    let mut mesh_segments = Vec::with_capacity(segments.len());
    let mut elements = Vec::with_capacity(total);
    let mut node_positions = Vec::with_capacity(total + 1);
    node_positions.push(0.0);
    // Node index at the start of each segment, plus the final node
    let mut segment_start_nodes = Vec::with_capacity(segments.len() + 1);

    for (segment_index, (segment, &count)) in segments.iter().zip(&counts).enumerate() {
        segment_start_nodes.push(elements.len());
        let element_length = segment.length / count as f64;
        let first = elements.len();

        for k in 0..count {
            let start = segment.start + element_length * k as f64;
            elements.push(MeshElement {
                length: element_length,
                start,
                segment: segment_index,
            });
            // Exact segment end avoids drift from repeated addition
            let end = if k + 1 == count {
                segment.end()
            } else {
                segment.start + element_length * (k + 1) as f64
            };
            node_positions.push(end);
        }

        mesh_segments.push(MeshSegment {
            segment: *segment,
            elements: first..elements.len(),
        });
    }
    segment_start_nodes.push(elements.len());

    let mut supports = vec![Support::free(); node_positions.len()];
    let field_segments: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind.field_index().is_some())
        .map(|(i, _)| i)
        .collect();

    if let Some(&last_field) = field_segments.last() {
        // Field boundaries: start node of every field plus the end of the last one
        let boundary_nodes: Vec<usize> = field_segments
            .iter()
            .map(|&s| segment_start_nodes[s])
            .chain(std::iter::once(segment_start_nodes[last_field + 1]))
            .collect();

        for (k, node) in boundary_nodes.iter().enumerate() {
            supports[*node] = layout
                .boundary_supports
                .get(k)
                .copied()
                .unwrap_or_else(Support::pinned);
        }
    } else {
        // Cantilevers only: clamp the common root
        let root = match segments.first().map(|s| s.kind) {
            Some(SegmentKind::LeftCantilever) => segment_start_nodes[1],
            _ => 0,
        };
        supports[root] = Support::clamped();
    }

    debug!(
        "meshed {} segments into {} elements ({} supported nodes)",
        mesh_segments.len(),
        elements.len(),
        supports.iter().filter(|s| s.is_support()).count()
    );

    Ok(Mesh {
        segments: mesh_segments,
        elements,
        node_positions,
        supports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;
    use crate::geometry::Restraint;

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            elements_per_meter: 2.0,
            min_elements_per_segment: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_node_count_is_element_count_plus_one() {
        let layouts = [
            SpanLayout::new(vec![5.0]),
            SpanLayout::new(vec![5.0, 3.3, 4.1]),
            SpanLayout::new(vec![4.0]).with_left_cantilever(1.3).with_right_cantilever(0.7),
            SpanLayout::new(vec![]).with_left_cantilever(2.0),
        ];
        for layout in &layouts {
            let mesh = mesh(layout, &settings()).unwrap();
            assert_eq!(mesh.node_count(), mesh.element_count() + 1);
            assert_eq!(mesh.supports.len(), mesh.node_count());
        }
    }

    #[test]
    fn test_simple_span_supports() {
        let mesh = mesh(&SpanLayout::new(vec![5.0]), &settings()).unwrap();
        // 5 m * 2 / m = 10 elements
        assert_eq!(mesh.element_count(), 10);
        assert_eq!(mesh.supported_nodes(), vec![0, 10]);
        assert_eq!(mesh.supports[0], Support::pinned());
        assert_eq!(mesh.supports[10], Support::pinned());
    }

    #[test]
    fn test_two_fields_interior_support() {
        let mesh = mesh(&SpanLayout::new(vec![5.0, 5.0]), &settings()).unwrap();
        assert_eq!(mesh.supported_nodes(), vec![0, 10, 20]);
        assert!((mesh.node_positions[10] - 5.0).abs() < 1e-12);
        assert_eq!(mesh.field_count(), 2);
    }

    #[test]
    fn test_cantilever_frees_outer_end() {
        let layout = SpanLayout::new(vec![4.0])
            .with_left_cantilever(1.0)
            .with_right_cantilever(1.5);
        let mesh = mesh(&layout, &settings()).unwrap();

        let last = mesh.node_count() - 1;
        assert_eq!(mesh.supports[0], Support::free());
        assert_eq!(mesh.supports[last], Support::free());
        // Left cantilever: max(2, ceil(2.0)) = 2 elements, field: 8 elements
        assert_eq!(mesh.supported_nodes(), vec![2, 10]);
        assert_eq!(mesh.element_kind(0), SegmentKind::LeftCantilever);
        assert_eq!(mesh.element_kind(last - 1), SegmentKind::RightCantilever);
    }

    #[test]
    fn test_min_elements_applies_to_short_cantilever() {
        let layout = SpanLayout::new(vec![4.0]).with_right_cantilever(0.2);
        let mesh = mesh(&layout, &settings()).unwrap();
        let cantilever = mesh.segments.last().unwrap();
        assert_eq!(cantilever.elements.len(), 2);
    }

    #[test]
    fn test_cantilever_only_is_clamped_at_root() {
        let mesh = mesh(&SpanLayout::new(vec![]).with_left_cantilever(2.0), &settings()).unwrap();
        let root = mesh.node_count() - 1;
        assert_eq!(mesh.supports[root], Support::clamped());
        assert_eq!(mesh.supported_nodes(), vec![root]);

        let mesh = mesh_right_only();
        assert_eq!(mesh.supports[0], Support::clamped());
    }

    fn mesh_right_only() -> Mesh {
        mesh(&SpanLayout::new(vec![]).with_right_cantilever(2.0), &settings()).unwrap()
    }

    #[test]
    fn test_boundary_support_overrides() {
        let layout = SpanLayout::new(vec![3.0, 3.0]).with_boundary_supports(vec![
            Support::clamped(),
            Support::spring(1000.0),
            Support::pinned(),
        ]);
        let mesh = mesh(&layout, &settings()).unwrap();
        assert_eq!(mesh.supports[0].rotation, Restraint::Rigid);
        assert_eq!(mesh.supports[6].translation, Restraint::Spring { stiffness: 1000.0 });
    }

    #[test]
    fn test_no_segments_fails() {
        let result = mesh(&SpanLayout::new(vec![]), &settings());
        assert!(matches!(result, Err(CalcError::Configuration { .. })));
    }

    #[test]
    fn test_element_ceiling() {
        let huge = SpanLayout::new(vec![1.0e300]);
        assert!(matches!(mesh(&huge, &settings()), Err(CalcError::Configuration { .. })));

        // 3 fields of 10 elements each against a ceiling of 25
        let capped = AnalysisSettings {
            max_elements: 25,
            ..settings()
        };
        let result = mesh(&SpanLayout::new(vec![5.0, 5.0, 5.0]), &capped);
        assert!(matches!(result, Err(CalcError::Configuration { .. })));
        assert_eq!(mesh(&SpanLayout::new(vec![5.0, 7.0]), &capped).unwrap().element_count(), 24);
    }

    #[test]
    fn test_node_positions_end_exactly() {
        let layout = SpanLayout::new(vec![3.3, 4.7]).with_right_cantilever(1.1);
        let mesh = mesh(&layout, &settings()).unwrap();
        assert_eq!(mesh.total_length(), 3.3 + 4.7 + 1.1);
        for pair in mesh.node_positions.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}
