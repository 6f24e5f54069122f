//! # Field Postprocessor
//!
//! Interpolates deflection, slope, bending moment and shear along the solved
//! element chain.
//!
//! ## Hermite Shape Functions
//!
//! For ξ = x/L and DOFs `(v1, θ1, v2, θ2)`:
//!
//! ```text
//! N1 = 1 - 3ξ² + 2ξ³        N2 = x·(1 - ξ)²
//! N3 = 3ξ² - 2ξ³            N4 = x·(ξ² - ξ)
//! ```
//!
//! Slope is the first derivative, M = EI·N''·d and V = EI·N'''·d. The moment
//! and shear of the element's own loads with both ends clamped are added on
//! top, so internal forces are exact between nodes as well. Deflection and
//! slope use the nodal interpolation only.
//!
//! ## Reporting Convention
//!
//! Deflection is reported positive downward, moment positive sagging,
//! shear as V = dM/dx.

use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

use super::element::BeamElement;
use super::solver::{self, Solution};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::Support;

/// Field values at one point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    /// Position from the left beam end (m)
    pub x: f64,
    /// Deflection (m), positive downward
    pub deflection: f64,
    /// Slope dv/dx (rad), counter-clockwise positive
    pub slope: f64,
    /// Bending moment (kNm), sagging positive
    pub moment: f64,
    /// Shear force (kN)
    pub shear: f64,
}

/// Continuous sampled fields along the whole beam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSamples {
    /// Sample positions from the left beam end (m)
    pub positions: Vec<f64>,
    /// Deflection (m), positive downward
    pub deflection: Vec<f64>,
    /// Slope (rad)
    pub slope: Vec<f64>,
    /// Bending moment (kNm)
    pub moment: Vec<f64>,
    /// Shear force (kN)
    pub shear: Vec<f64>,
}

impl FieldSamples {
    fn with_capacity(capacity: usize) -> Self {
        FieldSamples {
            positions: Vec::with_capacity(capacity),
            deflection: Vec::with_capacity(capacity),
            slope: Vec::with_capacity(capacity),
            moment: Vec::with_capacity(capacity),
            shear: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, point: FieldPoint) {
        self.positions.push(point.x);
        self.deflection.push(point.deflection);
        self.slope.push(point.slope);
        self.moment.push(point.moment);
        self.shear.push(point.shear);
    }

    /// Number of sample points
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no samples
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Largest sagging moment (kNm)
    pub fn max_moment(&self) -> f64 {
        self.moment.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Largest hogging moment (most negative, kNm)
    pub fn min_moment(&self) -> f64 {
        self.moment.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest shear magnitude (kN)
    pub fn max_abs_shear(&self) -> f64 {
        self.shear.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Largest deflection magnitude (m)
    pub fn max_abs_deflection(&self) -> f64 {
        self.deflection.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// Interpolates field values over a chain of elements.
///
/// Holds the elements and node positions of one evaluation; results become
/// available after [`FieldPostprocessor::solve`] or
/// [`FieldPostprocessor::with_solution`].
#[derive(Debug, Clone)]
pub struct FieldPostprocessor {
    elements: Vec<BeamElement>,
    node_positions: Vec<f64>,
    solution: Option<Solution>,
}

impl FieldPostprocessor {
    /// Create an unsolved postprocessor.
    ///
    /// # Errors
    ///
    /// `Configuration` if `node_positions` does not have one entry more than
    /// `elements`.
    pub fn new(elements: Vec<BeamElement>, node_positions: Vec<f64>) -> CalcResult<Self> {
        if elements.is_empty() || node_positions.len() != elements.len() + 1 {
            return Err(CalcError::configuration(format!(
                "{} elements need {} node positions, got {}",
                elements.len(),
                elements.len() + 1,
                node_positions.len()
            )));
        }
        Ok(FieldPostprocessor {
            elements,
            node_positions,
            solution: None,
        })
    }

    /// Attach an existing solution
    pub fn with_solution(mut self, solution: Solution) -> Self {
        self.solution = Some(solution);
        self
    }

    /// Assemble and solve the element chain with the given supports.
    ///
    /// A failed solve discards any earlier solution.
    pub fn solve(&mut self, supports: &[Support]) -> CalcResult<&Solution> {
        self.solution = None;
        self.solution = Some(solver::solve(&self.elements, supports)?);
        self.require_solution()
    }

    /// The solution, if solved
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Elements of the chain
    pub fn elements(&self) -> &[BeamElement] {
        &self.elements
    }

    fn require_solution(&self) -> CalcResult<&Solution> {
        self.solution
            .as_ref()
            .ok_or_else(|| CalcError::precompute("Fields requested before a successful solve"))
    }

    /// Field values at local coordinate `x` of one element
    pub fn element_point(&self, element: usize, x: f64) -> CalcResult<FieldPoint> {
        let solution = self.require_solution()?;
        let beam = self.elements.get(element).ok_or_else(|| {
            CalcError::invalid_input(
                "element",
                element.to_string(),
                format!("Beam has {} elements", self.elements.len()),
            )
        })?;
        let reactions = beam.fixed_end_reactions()?;
        Ok(evaluate(
            beam,
            &solution.element_dofs(element),
            &reactions,
            self.node_positions[element],
            x,
        ))
    }

    /// Field values at a global position along the beam
    ///
    /// A position on a node is evaluated at the end of the element left of it.
    pub fn point_at(&self, position: f64) -> CalcResult<FieldPoint> {
        let total = self.node_positions[self.node_positions.len() - 1];
        if !(position.is_finite() && (0.0..=total).contains(&position)) {
            return Err(CalcError::invalid_input(
                "position",
                position.to_string(),
                format!("Position must lie within the beam [0, {}]", total),
            ));
        }
        let element = self.node_positions[1..]
            .iter()
            .position(|end| position <= *end)
            .unwrap_or(self.elements.len() - 1);
        let local = (position - self.node_positions[element]).clamp(0.0, self.elements[element].length);
        self.element_point(element, local)
    }

    /// Sample all fields with `per_element` linearly spaced points per element
    /// (ends included). The duplicate start point of every element after the
    /// first is dropped, giving one continuous sequence.
    ///
    /// # Errors
    ///
    /// * `Precompute` - called before a successful solve
    /// * `Configuration` - fewer than two points per element
    pub fn sample(&self, per_element: usize) -> CalcResult<FieldSamples> {
        let solution = self.require_solution()?;
        if per_element < 2 {
            return Err(CalcError::configuration(
                "At least two samples per element are required",
            ));
        }

        let mut samples = FieldSamples::with_capacity(self.elements.len() * (per_element - 1) + 1);
        for (e, element) in self.elements.iter().enumerate() {
            let dofs = solution.element_dofs(e);
            let reactions = element.fixed_end_reactions()?;
            let start = self.node_positions[e];
            let first = if e == 0 { 0 } else { 1 };

            for k in first..per_element {
                let x = element.length * k as f64 / (per_element - 1) as f64;
                samples.push(evaluate(element, &dofs, &reactions, start, x));
            }
        }
        Ok(samples)
    }
}

/// Hermite field plus the clamped-element load contribution at local x
fn evaluate(
    element: &BeamElement,
    d: &[f64; 4],
    reactions: &Vector4<f64>,
    start: f64,
    x: f64,
) -> FieldPoint {
    let l = element.length;
    let xi = x / l;
    let ei = element.ei();

    let n = [
        1.0 - 3.0 * xi * xi + 2.0 * xi.powi(3),
        x * (1.0 - xi).powi(2),
        3.0 * xi * xi - 2.0 * xi.powi(3),
        x * (xi * xi - xi),
    ];
    let dn = [
        (-6.0 * xi + 6.0 * xi * xi) / l,
        1.0 - 4.0 * xi + 3.0 * xi * xi,
        (6.0 * xi - 6.0 * xi * xi) / l,
        3.0 * xi * xi - 2.0 * xi,
    ];
    let ddn = [
        (-6.0 + 12.0 * xi) / (l * l),
        (-4.0 + 6.0 * xi) / l,
        (6.0 - 12.0 * xi) / (l * l),
        (-2.0 + 6.0 * xi) / l,
    ];
    let dddn = [12.0 / l.powi(3), 6.0 / (l * l), -12.0 / l.powi(3), 6.0 / (l * l)];

    let dot = |f: &[f64; 4]| f.iter().zip(d.iter()).map(|(a, b)| a * b).sum::<f64>();
    let (m_load, v_load) = element.clamped_internal_forces(reactions, x);

    FieldPoint {
        x: start + x,
        deflection: -dot(&n),
        slope: dot(&dn),
        moment: ei * dot(&ddn) + m_load,
        shear: ei * dot(&dddn) + v_load,
    }
}
