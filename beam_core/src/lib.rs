//! # beam_core - Continuous Timber Beam Analysis
//!
//! `beam_core` computes bending moment, shear and deflection along continuous
//! multi-span beams with optional cantilevers, enumerates EN 1990 load
//! combinations under pattern loading, and envelopes the results per limit
//! state. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All input and result types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Deterministic**: Parallel and sequential runs produce identical envelopes
//!
//! ## Quick Start
//!
//! ```rust
//! use beam_core::{analyze, AnalysisSettings, BeamInput};
//! use beam_core::geometry::SpanLayout;
//! use beam_core::loads::{ActionCase, PsiTable};
//!
//! let input = BeamInput::new("B1", SpanLayout::new(vec![4.0]), 1.1e7, 1.0e-4)
//!     .with_action(ActionCase::permanent_line("G", 5.0));
//!
//! let analysis = analyze(&input, PsiTable::en1990(), &AnalysisSettings::default(), None).unwrap();
//! let peak = analysis.ultimate.as_ref().unwrap().max_moment().unwrap();
//! assert!((peak.value - 1.35 * 5.0 * 16.0 / 8.0).abs() < 1e-9);
//!
//! let json = serde_json::to_string_pretty(&analysis).unwrap();
//! assert!(json.contains("GZT-1"));
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Span layout, supports and the mesher
//! - [`fem`] - Beam elements, global solver and field postprocessing
//! - [`loads`] - Actions, ψ factors, load combinations and loading patterns
//! - [`materials`] - Timber strength classes, kmod and kdef
//! - [`calculations`] - Combination runner, envelopes, analysis and verification
//! - [`equations`] - Closed-form fixed-end and section formulas
//! - [`settings`] - Analysis settings
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod fem;
pub mod geometry;
pub mod loads;
pub mod materials;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{analyze, verify_timber, BeamAnalysis, BeamInput, CancellationToken, Envelope};
pub use errors::{CalcError, CalcResult};
pub use settings::AnalysisSettings;
