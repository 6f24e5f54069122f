//! # Structural Engineering Equations
//!
//! Closed-form formulas used by the finite-element model and the timber
//! checks. Keeping them in one place makes them easy to verify against the
//! reference tables independently of the solver.
//!
//! ## Modules
//!
//! - [`fixed_end`] - Clamped-element reactions and internal forces per load type
//! - [`section`] - Rectangular cross-section properties
//!
//! ## Sign Conventions
//!
//! - **Loads**: Positive downward (gravity direction)
//! - **Moment**: Positive causes tension on bottom fiber (sagging)
//! - **Shear**: V = dM/dx, positive when left side moves up relative to right
//! - **Deflection**: Reported positive downward
//! - **Reactions**: Positive upward (resisting gravity)

pub mod fixed_end;
pub mod section;

pub use fixed_end::{
    moment_fixed_end_reactions,
    patch_fixed_end_reactions,
    point_fixed_end_reactions,
    uniform_fixed_end_reactions,
};
pub use section::RectangularSection;
