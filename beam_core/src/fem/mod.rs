//! # Finite-Element Core
//!
//! One-dimensional Euler-Bernoulli beam model:
//!
//! - [`element`] - Element stiffness and fixed-end load vectors
//! - [`solver`] - Global assembly, support conditions and linear solve
//! - [`postprocess`] - Hermite interpolation of deflection, slope, moment and shear
//!
//! ## Example
//!
//! ```rust
//! use beam_core::fem::{BeamElement, ElementLoad, FieldPostprocessor};
//! use beam_core::geometry::Support;
//!
//! // 4 m simply supported beam, two elements, 5 kN/m
//! let elements: Vec<BeamElement> = (0..2)
//!     .map(|_| {
//!         BeamElement::new(2.0, 1.1e7, 1.0e-4)
//!             .unwrap()
//!             .with_load(ElementLoad::Uniform { w: 5.0 })
//!     })
//!     .collect();
//!
//! let mut post = FieldPostprocessor::new(elements, vec![0.0, 2.0, 4.0]).unwrap();
//! post.solve(&[Support::pinned(), Support::free(), Support::pinned()]).unwrap();
//!
//! let mid = post.point_at(2.0).unwrap();
//! assert!((mid.moment - 10.0).abs() < 1e-9); // wL²/8
//! ```

pub mod element;
pub mod postprocess;
pub mod solver;

pub use element::{BeamElement, ElementLoad};
pub use postprocess::{FieldPoint, FieldPostprocessor, FieldSamples};
pub use solver::{check_stability, solve, GlobalSystem, NodeReaction, Solution};
