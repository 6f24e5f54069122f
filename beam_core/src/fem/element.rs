//! # Beam Element
//!
//! Two-node Euler-Bernoulli bending element with DOF order `(v1, θ1, v2, θ2)`:
//! v positive upward, θ = dv/dx positive counter-clockwise.
//!
//! ```text
//!        v1          v2
//!        ↑           ↑
//!   θ1 ↺ ●───────────● ↺ θ2
//!        ←─── L ────→
//! ```
//!
//! The element owns its loads; each load knows its fixed-end reactions and
//! its contribution to the clamped-element internal forces.

use nalgebra::{Matrix4, Vector4};
use serde::{Deserialize, Serialize};

use crate::equations::fixed_end::{
    moment_cut_effect, moment_fixed_end_reactions, patch_cut_effect, patch_fixed_end_reactions,
    point_cut_effect, point_fixed_end_reactions, uniform_cut_effect, uniform_fixed_end_reactions,
};
use crate::errors::{CalcError, CalcResult};

/// A load applied to one element, positions local to the element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementLoad {
    /// Uniform line load over the whole element (kN/m, downward)
    Uniform { w: f64 },
    /// Point load (kN, downward) at `offset` from the element start
    Point { p: f64, offset: f64 },
    /// Uniform line load (kN/m, downward) over [start, end]
    Patch { w: f64, start: f64, end: f64 },
    /// Concentrated couple (kNm, counter-clockwise) at `offset`
    Moment { m: f64, offset: f64 },
}

impl ElementLoad {
    /// Check the load against an element of the given length
    pub fn validate(&self, length: f64) -> CalcResult<()> {
        let check_offset = |field: &str, offset: f64| {
            if !(offset.is_finite() && (0.0..=length).contains(&offset)) {
                return Err(CalcError::invalid_input(
                    field,
                    offset.to_string(),
                    format!("Offset must lie within the element [0, {}]", length),
                ));
            }
            Ok(())
        };

        let magnitude = match *self {
            ElementLoad::Uniform { w } => w,
            ElementLoad::Point { p, offset } => {
                check_offset("offset", offset)?;
                p
            }
            ElementLoad::Patch { w, start, end } => {
                check_offset("start", start)?;
                check_offset("end", end)?;
                if end <= start {
                    return Err(CalcError::invalid_input(
                        "end",
                        end.to_string(),
                        format!("Patch end must be greater than its start {}", start),
                    ));
                }
                w
            }
            ElementLoad::Moment { m, offset } => {
                check_offset("offset", offset)?;
                m
            }
        };

        if !magnitude.is_finite() {
            return Err(CalcError::invalid_input(
                "magnitude",
                magnitude.to_string(),
                "Load magnitude must be finite",
            ));
        }
        Ok(())
    }

    /// Fixed-end reactions `[V1, M1, V2, M2]` on an element of length `length`
    pub fn fixed_end_reactions(&self, length: f64) -> CalcResult<[f64; 4]> {
        self.validate(length)?;
        Ok(match *self {
            ElementLoad::Uniform { w } => uniform_fixed_end_reactions(w, length),
            ElementLoad::Point { p, offset } => point_fixed_end_reactions(p, offset, length),
            ElementLoad::Patch { w, start, end } => patch_fixed_end_reactions(w, start, end, length),
            ElementLoad::Moment { m, offset } => moment_fixed_end_reactions(m, offset, length),
        })
    }

    /// Moment and shear of the loads left of a cut at local x
    pub fn cut_effect(&self, x: f64) -> (f64, f64) {
        match *self {
            ElementLoad::Uniform { w } => uniform_cut_effect(w, x),
            ElementLoad::Point { p, offset } => point_cut_effect(p, offset, x),
            ElementLoad::Patch { w, start, end } => patch_cut_effect(w, start, end, x),
            ElementLoad::Moment { m, offset } => moment_cut_effect(m, offset, x),
        }
    }

    /// Total vertical force of the load on an element of length `length` (kN)
    pub fn resultant(&self, length: f64) -> f64 {
        match *self {
            ElementLoad::Uniform { w } => w * length,
            ElementLoad::Point { p, .. } => p,
            ElementLoad::Patch { w, start, end } => w * (end - start),
            ElementLoad::Moment { .. } => 0.0,
        }
    }
}

/// Euler-Bernoulli beam element
#[derive(Debug, Clone, PartialEq)]
pub struct BeamElement {
    /// Length (m)
    pub length: f64,
    /// Modulus of elasticity (kN/m²)
    pub e: f64,
    /// Second moment of area (m⁴)
    pub i: f64,
    /// Loads acting on this element
    pub loads: Vec<ElementLoad>,
}

impl BeamElement {
    /// Create an unloaded element.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the length, E or I is not positive.
    pub fn new(length: f64, e: f64, i: f64) -> CalcResult<Self> {
        for (field, value) in [("length", length), ("e", e), ("i", i)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Element length, E and I must be positive",
                ));
            }
        }
        Ok(BeamElement {
            length,
            e,
            i,
            loads: Vec::new(),
        })
    }

    /// Builder: add a load
    pub fn with_load(mut self, load: ElementLoad) -> Self {
        self.loads.push(load);
        self
    }

    /// Add a load
    pub fn add_load(&mut self, load: ElementLoad) {
        self.loads.push(load);
    }

    /// Flexural stiffness EI (kNm²)
    pub fn ei(&self) -> f64 {
        self.e * self.i
    }

    /// Local stiffness matrix
    ///
    /// ```text
    ///        ┌  kfv   kmv  -kfv   kmv ┐
    ///  K  =  │  kmv   kmt  -kmv   kmth│
    ///        │ -kfv  -kmv   kfv  -kmv │
    ///        └  kmv   kmth -kmv   kmt ┘
    /// ```
    /// with kfv = 12EI/L³, kmv = 6EI/L², kmt = 4EI/L, kmth = 2EI/L.
    pub fn stiffness(&self) -> Matrix4<f64> {
        let ei = self.ei();
        let l = self.length;
        let kfv = 12.0 * ei / l.powi(3);
        let kmv = 6.0 * ei / (l * l);
        let kmt = 4.0 * ei / l;
        let kmth = 2.0 * ei / l;

        Matrix4::new(
            kfv, kmv, -kfv, kmv,
            kmv, kmt, -kmv, kmth,
            -kfv, -kmv, kfv, -kmv,
            kmv, kmth, -kmv, kmt,
        )
    }

    /// Sum of the fixed-end reactions of all loads
    pub fn fixed_end_reactions(&self) -> CalcResult<Vector4<f64>> {
        let mut total = Vector4::zeros();
        for load in &self.loads {
            let r = load.fixed_end_reactions(self.length)?;
            total += Vector4::from(r);
        }
        Ok(total)
    }

    /// Moment and shear at local x with both ends clamped
    ///
    /// `M(x) = V1·x - M1 - ΣΔM(x)`, `V(x) = V1 - ΣΔV(x)`
    pub fn clamped_internal_forces(&self, reactions: &Vector4<f64>, x: f64) -> (f64, f64) {
        let (dm, dv) = self
            .loads
            .iter()
            .map(|load| load.cut_effect(x))
            .fold((0.0, 0.0), |(m, v), (dm, dv)| (m + dm, v + dv));
        (reactions[0] * x - reactions[1] - dm, reactions[0] - dv)
    }

    /// Total downward load on the element (kN)
    pub fn total_load(&self) -> f64 {
        self.loads.iter().map(|l| l.resultant(self.length)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_element_rejects_non_positive_length() {
        assert!(matches!(
            BeamElement::new(0.0, 1.0e7, 1.0e-4),
            Err(CalcError::InvalidInput { .. })
        ));
        assert!(BeamElement::new(-1.0, 1.0e7, 1.0e-4).is_err());
        assert!(BeamElement::new(1.0, 0.0, 1.0e-4).is_err());
    }

    #[test]
    fn test_stiffness_symmetry_and_rigid_body() {
        let element = BeamElement::new(2.0, 1.1e7, 1.0e-4).unwrap();
        let k = element.stiffness();
        for r in 0..4 {
            for c in 0..4 {
                assert_relative_eq!(k[(r, c)], k[(c, r)]);
            }
        }
        // Rigid translation produces no forces
        let translation = k * Vector4::new(1.0, 0.0, 1.0, 0.0);
        assert!(translation.norm() < 1e-6);
        // Rigid rotation about the left node: v = x, θ = 1
        let rotation = k * Vector4::new(0.0, 1.0, 2.0, 1.0);
        assert!(rotation.norm() < 1e-6);
    }

    #[test]
    fn test_stiffness_coefficients() {
        let element = BeamElement::new(2.0, 1.0, 1.0).unwrap();
        let k = element.stiffness();
        assert_relative_eq!(k[(0, 0)], 1.5);
        assert_relative_eq!(k[(0, 1)], 1.5);
        assert_relative_eq!(k[(1, 1)], 2.0);
        assert_relative_eq!(k[(1, 3)], 1.0);
    }

    #[test]
    fn test_point_offset_outside_element() {
        let load = ElementLoad::Point { p: 1.0, offset: 2.5 };
        assert!(matches!(
            load.fixed_end_reactions(2.0),
            Err(CalcError::InvalidInput { .. })
        ));
        let load = ElementLoad::Moment { m: 1.0, offset: -0.1 };
        assert!(load.fixed_end_reactions(2.0).is_err());
    }

    #[test]
    fn test_patch_requires_positive_width() {
        let load = ElementLoad::Patch { w: 1.0, start: 1.0, end: 1.0 };
        assert!(load.validate(2.0).is_err());
    }

    #[test]
    fn test_superposed_reactions() {
        let element = BeamElement::new(4.0, 1.0e7, 1.0e-4)
            .unwrap()
            .with_load(ElementLoad::Uniform { w: 2.0 })
            .with_load(ElementLoad::Point { p: 8.0, offset: 2.0 });
        let r = element.fixed_end_reactions().unwrap();
        // 2·4/2 + 8/2
        assert_relative_eq!(r[0], 8.0, epsilon = 1e-12);
        // 2·16/12 + 8·4/8
        assert_relative_eq!(r[1], 32.0 / 12.0 + 4.0, epsilon = 1e-12);
        assert_relative_eq!(element.total_load(), 16.0);
    }

    #[test]
    fn test_clamped_internal_forces_at_ends() {
        let element = BeamElement::new(3.0, 1.0e7, 1.0e-4)
            .unwrap()
            .with_load(ElementLoad::Patch { w: 4.0, start: 0.5, end: 2.0 });
        let r = element.fixed_end_reactions().unwrap();

        let (m0, v0) = element.clamped_internal_forces(&r, 0.0);
        assert_relative_eq!(m0, -r[1], epsilon = 1e-12);
        assert_relative_eq!(v0, r[0], epsilon = 1e-12);

        // At the right end the internal moment equals the right clamp moment
        let (ml, vl) = element.clamped_internal_forces(&r, 3.0);
        assert_relative_eq!(ml, r[3], epsilon = 1e-10);
        assert_relative_eq!(vl, -r[2], epsilon = 1e-12);
    }
}
