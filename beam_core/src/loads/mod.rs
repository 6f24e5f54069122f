//! Actions, load combinations and pattern loading per EN 1990
//!
//! # Overview
//!
//! - [`ActionCase`] - One declared characteristic action (category + load shape)
//! - [`CoefficientSource`] / [`PsiTable`] - ψ factors and load-duration classes
//! - [`LoadCombinationGenerator`] - GZT and GZG combinations
//! - [`generate_patterns`] - Field subsets carrying the leading action
//!
//! # Example
//!
//! ```
//! use beam_core::loads::{
//!     generate_patterns, ActionCase, ActionCategory, ActionLoad, LoadCombinationGenerator,
//!     PsiTable, SafetyFactors,
//! };
//!
//! let actions = vec![
//!     ActionCase::permanent_line("Self-weight", 0.5),
//!     ActionCase::new("Live", ActionCategory::ImposedA, ActionLoad::Area { q: 2.0 }),
//! ];
//!
//! let generator = LoadCombinationGenerator::new(PsiTable::en1990(), SafetyFactors::default(), 0.625);
//! let combinations = generator.generate(&actions).unwrap();
//! assert!(combinations.iter().any(|c| c.name == "GZT-2/Live"));
//!
//! // Two fields: F1, F2 and both loaded
//! assert_eq!(generate_patterns(2, 10).unwrap().len(), 3);
//! ```

pub mod actions;
pub mod coefficients;
pub mod combinations;
pub mod patterns;

pub use actions::{ActionCase, ActionCategory, ActionLoad, DesignLoad, LoadDurationClass};
pub use coefficients::{CoefficientSource, PsiFactors, PsiTable};
pub use combinations::{
    generate_combinations,
    Combination,
    CombinationKind,
    LimitState,
    LoadCombinationGenerator,
    LoadComponent,
    SafetyFactors,
};
pub use patterns::{generate_patterns, pattern_count, Pattern};
