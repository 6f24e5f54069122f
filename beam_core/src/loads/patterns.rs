//! Pattern loading of interior fields
//!
//! The leading variable action of a continuous beam is placed on every
//! non-empty subset of the interior fields, because partial loading governs
//! both the field moments and the support moments. Cantilevers always carry
//! the leading action and are not varied.
//!
//! Patterns are enumerated as bit masks `1..2^N` in ascending order (bit `i`
//! set = field `i` loaded), so the order is stable across runs.
//!
//! | Fields N | Patterns |
//! |----------|----------|
//! | 0        | 1 (cantilevers only, nothing to vary) |
//! | 1        | 1 (the field loaded) |
//! | N > 1    | 2^N - 1 |

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Which interior fields carry the leading action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    /// Position in the generated sequence
    pub index: usize,
    /// One flag per interior field
    pub loaded: Vec<bool>,
}

impl Pattern {
    /// Pattern with every field loaded
    pub fn full(field_count: usize) -> Self {
        Pattern {
            index: 0,
            loaded: vec![true; field_count],
        }
    }

    /// Whether field `field` carries the leading action
    pub fn is_loaded(&self, field: usize) -> bool {
        self.loaded.get(field).copied().unwrap_or(false)
    }

    /// Number of loaded fields
    pub fn loaded_count(&self) -> usize {
        self.loaded.iter().filter(|l| **l).count()
    }

    /// Whether all fields are loaded
    pub fn is_full(&self) -> bool {
        self.loaded.iter().all(|l| *l)
    }

    /// Report label: loaded fields as "F1+F3", "all" for full loading
    pub fn label(&self) -> String {
        if self.is_full() {
            return "all".to_string();
        }
        self.loaded
            .iter()
            .enumerate()
            .filter(|(_, l)| **l)
            .map(|(i, _)| format!("F{}", i + 1))
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Enumerate the loading patterns for `field_count` interior fields.
///
/// # Errors
///
/// `Configuration` if `field_count` exceeds `max_fields`.
///
/// # Example
/// ```
/// use beam_core::loads::generate_patterns;
///
/// let patterns = generate_patterns(3, 10).unwrap();
/// assert_eq!(patterns.len(), 7);
/// assert_eq!(patterns[0].label(), "F1");
/// assert_eq!(patterns[6].label(), "all");
/// ```
pub fn generate_patterns(field_count: usize, max_fields: usize) -> CalcResult<Vec<Pattern>> {
    if field_count > max_fields {
        return Err(CalcError::configuration(format!(
            "{} interior fields exceed the pattern-loading ceiling of {} ({} patterns per combination)",
            field_count,
            max_fields,
            pattern_count(field_count)
        )));
    }

    if field_count <= 1 {
        return Ok(vec![Pattern::full(field_count)]);
    }

    let patterns = (1..(1u64 << field_count))
        .enumerate()
        .map(|(index, mask)| Pattern {
            index,
            loaded: (0..field_count).map(|bit| mask & (1 << bit) != 0).collect(),
        })
        .collect();
    Ok(patterns)
}

/// Number of patterns [`generate_patterns`] yields for `field_count` fields
pub fn pattern_count(field_count: usize) -> u128 {
    if field_count <= 1 {
        1
    } else {
        (1u128 << field_count.min(127)) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pattern_counts() {
        for n in 2..=8 {
            let patterns = generate_patterns(n, 10).unwrap();
            assert_eq!(patterns.len(), (1 << n) - 1);
            let distinct: HashSet<_> = patterns.iter().map(|p| p.loaded.clone()).collect();
            assert_eq!(distinct.len(), patterns.len());
            assert!(patterns.iter().all(|p| p.loaded_count() > 0));
        }
    }

    #[test]
    fn test_single_and_no_field() {
        let one = generate_patterns(1, 10).unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].is_loaded(0));

        let none = generate_patterns(0, 10).unwrap();
        assert_eq!(none.len(), 1);
        assert_eq!(none[0].loaded_count(), 0);
    }

    #[test]
    fn test_stable_order() {
        let patterns = generate_patterns(2, 10).unwrap();
        assert_eq!(patterns[0].loaded, vec![true, false]);
        assert_eq!(patterns[1].loaded, vec![false, true]);
        assert_eq!(patterns[2].loaded, vec![true, true]);
        assert_eq!(patterns, generate_patterns(2, 10).unwrap());
        assert_eq!(patterns[1].index, 1);
    }

    #[test]
    fn test_labels() {
        let patterns = generate_patterns(3, 10).unwrap();
        // mask 0b101
        assert_eq!(patterns[4].label(), "F1+F3");
        assert_eq!(patterns[6].to_string(), "all");
    }

    #[test]
    fn test_ceiling() {
        let result = generate_patterns(12, 10);
        assert!(matches!(result, Err(CalcError::Configuration { .. })));
        assert_eq!(pattern_count(12), 4095);
    }
}
