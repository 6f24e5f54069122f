//! # Cross-Section Property Formulas
//!
//! Geometric properties of solid rectangular timber sections. Dimensions are
//! entered in millimetres (as sections are specified in practice) and the
//! properties are returned in metres so they plug straight into the solver.
//!
//! ## Notation
//!
//! - `b` = Width of section
//! - `h` = Height (depth) of section
//! - `A` = Cross-sectional area
//! - `I` = Second moment of area about the strong axis
//! - `W` = Elastic section modulus (I / (h/2))
//!
//! ## References
//!
//! - EN 1995-1-1, 6.1.6 (bending) and 6.1.7 (shear)

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

const MM_TO_M: f64 = 1.0e-3;

/// Cross-sectional area A = b·h
#[inline]
pub fn rectangular_area(b: f64, h: f64) -> f64 {
    b * h
}

/// Second moment of area I = b·h³/12 (strong axis)
///
/// # Example
/// ```rust
/// use beam_core::equations::section::rectangular_moment_of_inertia;
///
/// // 100 x 200 mm
/// let i = rectangular_moment_of_inertia(0.1, 0.2);
/// assert!((i - 6.6667e-5).abs() < 1e-8);
/// ```
#[inline]
pub fn rectangular_moment_of_inertia(b: f64, h: f64) -> f64 {
    b * h.powi(3) / 12.0
}

/// Elastic section modulus W = b·h²/6
#[inline]
pub fn rectangular_section_modulus(b: f64, h: f64) -> f64 {
    b * h * h / 6.0
}

/// Solid rectangular section, width × height in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangularSection {
    /// Width b (mm)
    pub width_mm: f64,
    /// Height h (mm)
    pub height_mm: f64,
}

impl RectangularSection {
    /// Create a new section
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        RectangularSection { width_mm, height_mm }
    }

    /// Width in metres
    pub fn width_m(&self) -> f64 {
        self.width_mm * MM_TO_M
    }

    /// Height in metres
    pub fn height_m(&self) -> f64 {
        self.height_mm * MM_TO_M
    }

    /// Area (m²)
    pub fn area_m2(&self) -> f64 {
        rectangular_area(self.width_m(), self.height_m())
    }

    /// Second moment of area (m⁴)
    pub fn moment_of_inertia_m4(&self) -> f64 {
        rectangular_moment_of_inertia(self.width_m(), self.height_m())
    }

    /// Section modulus (m³)
    pub fn section_modulus_m3(&self) -> f64 {
        rectangular_section_modulus(self.width_m(), self.height_m())
    }

    /// Validate dimensions
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            return Err(CalcError::invalid_input(
                "width_mm",
                self.width_mm.to_string(),
                "Section width must be positive",
            ));
        }
        if !(self.height_mm.is_finite() && self.height_mm > 0.0) {
            return Err(CalcError::invalid_input(
                "height_mm",
                self.height_mm.to_string(),
                "Section height must be positive",
            ));
        }
        Ok(())
    }
}
