//! # Global Beam Solver
//!
//! Assembles element stiffness matrices and fixed-end load vectors into one
//! dense system, applies the support conditions and solves for the nodal
//! displacements.
//!
//! ## Boundary Conditions
//!
//! The system keeps its full size `2·(n+1)`:
//!
//! - rigid DOF: row and column zeroed, diagonal set to 1, load entry set to 0
//! - spring DOF: stiffness added to the diagonal
//!
//! ## Singularity
//!
//! A support set that leaves a rigid-body mode is rejected before the
//! factorization. The LU result and the solution vector are checked as well,
//! so a singular system never yields NaN or Inf displacements.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::element::BeamElement;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Restraint, Support};

/// Number of DOFs per node (v, θ)
pub const DOFS_PER_NODE: usize = 2;

/// Assembled global system
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// Global stiffness matrix
    pub stiffness: DMatrix<f64>,
    /// Global load vector (negative sum of fixed-end reactions)
    pub loads: DVector<f64>,
}

/// Support reaction at one node, forces on the beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeReaction {
    /// Node index
    pub node: usize,
    /// Vertical reaction (kN), positive upward
    pub force: f64,
    /// Reaction moment (kNm), positive counter-clockwise
    pub moment: f64,
}

/// Solved nodal displacements and support reactions
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// `(v, θ)` per node; v positive upward (m), θ counter-clockwise (rad)
    pub displacements: DVector<f64>,
    /// Reactions at every restrained node, left to right
    pub reactions: Vec<NodeReaction>,
}

impl Solution {
    /// Vertical displacement of a node (m, positive upward)
    pub fn translation(&self, node: usize) -> f64 {
        self.displacements[DOFS_PER_NODE * node]
    }

    /// Rotation of a node (rad)
    pub fn rotation(&self, node: usize) -> f64 {
        self.displacements[DOFS_PER_NODE * node + 1]
    }

    /// Element DOF vector `(v1, θ1, v2, θ2)`
    pub fn element_dofs(&self, element: usize) -> [f64; 4] {
        let base = DOFS_PER_NODE * element;
        [
            self.displacements[base],
            self.displacements[base + 1],
            self.displacements[base + 2],
            self.displacements[base + 3],
        ]
    }
}

impl GlobalSystem {
    /// Assemble the global stiffness matrix and load vector.
    ///
    /// Element `e` connects nodes `e` and `e + 1`, so its 4×4 block lands on
    /// global DOFs `2e..2e+4`.
    pub fn assemble(elements: &[BeamElement]) -> CalcResult<Self> {
        if elements.is_empty() {
            return Err(CalcError::configuration("Cannot assemble a beam without elements"));
        }

        let dofs = DOFS_PER_NODE * (elements.len() + 1);
        let mut stiffness = DMatrix::zeros(dofs, dofs);
        let mut loads = DVector::zeros(dofs);

        for (e, element) in elements.iter().enumerate() {
            let k = element.stiffness();
            let fer = element.fixed_end_reactions()?;
            let base = DOFS_PER_NODE * e;

            for r in 0..4 {
                for c in 0..4 {
                    stiffness[(base + r, base + c)] += k[(r, c)];
                }
                loads[base + r] -= fer[r];
            }
        }

        Ok(GlobalSystem { stiffness, loads })
    }

    /// Number of global DOFs
    pub fn dof_count(&self) -> usize {
        self.loads.len()
    }

    /// Apply the support conditions and solve.
    ///
    /// # Errors
    ///
    /// * `Configuration` - support count does not match the node count
    /// * `SingularSystem` - rigid-body motion is not prevented, or the
    ///   factorization fails
    pub fn solve(self, supports: &[Support]) -> CalcResult<Solution> {
        let node_count = self.dof_count() / DOFS_PER_NODE;
        if supports.len() != node_count {
            return Err(CalcError::configuration(format!(
                "Expected {} supports for {} nodes, got {}",
                node_count,
                node_count,
                supports.len()
            )));
        }
        check_stability(supports)?;

        let original = self.stiffness.clone();
        let mut stiffness = self.stiffness;
        let mut loads = self.loads.clone();

        for (node, support) in supports.iter().enumerate() {
            let restraints = [support.translation, support.rotation];
            for (offset, restraint) in restraints.iter().enumerate() {
                let dof = DOFS_PER_NODE * node + offset;
                match restraint {
                    Restraint::Free => {}
                    Restraint::Rigid => {
                        stiffness.row_mut(dof).fill(0.0);
                        stiffness.column_mut(dof).fill(0.0);
                        stiffness[(dof, dof)] = 1.0;
                        loads[dof] = 0.0;
                    }
                    Restraint::Spring { stiffness: k } => {
                        stiffness[(dof, dof)] += k;
                    }
                }
            }
        }

        let displacements = stiffness.lu().solve(&loads).ok_or_else(|| {
            CalcError::singular_system("Global stiffness matrix is singular after applying supports")
        })?;

        if displacements.iter().any(|d| !d.is_finite()) {
            return Err(CalcError::singular_system(
                "Solve produced non-finite displacements",
            ));
        }

        // Forces the supports exert: K·d - F at the restrained DOFs
        let residual = &original * &displacements - &self.loads;
        let reactions = supports
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_support())
            .map(|(node, _)| NodeReaction {
                node,
                force: residual[DOFS_PER_NODE * node],
                moment: residual[DOFS_PER_NODE * node + 1],
            })
            .collect();

        debug!(
            "solved {} DOFs, max |v| = {:.3e} m",
            displacements.len(),
            displacements
                .iter()
                .step_by(DOFS_PER_NODE)
                .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        );

        Ok(Solution {
            displacements,
            reactions,
        })
    }
}

/// Reject support sets that leave a rigid-body mode.
///
/// A straight beam without hinges is stable with two translation restraints,
/// or one translation and one rotation restraint.
pub fn check_stability(supports: &[Support]) -> CalcResult<()> {
    let translations = supports.iter().filter(|s| s.translation.is_restrained()).count();
    let rotations = supports.iter().filter(|s| s.rotation.is_restrained()).count();

    if translations >= 2 || (translations >= 1 && rotations >= 1) {
        return Ok(());
    }
    Err(CalcError::singular_system(format!(
        "Supports allow rigid-body motion ({} translation and {} rotation restraints)",
        translations, rotations
    )))
}

/// Assemble and solve in one step
pub fn solve(elements: &[BeamElement], supports: &[Support]) -> CalcResult<Solution> {
    GlobalSystem::assemble(elements)?.solve(supports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fem::element::ElementLoad;
    use approx::assert_relative_eq;

    const E: f64 = 1.1e7;
    const I: f64 = 2.0e-4;

    fn chain(length: f64, count: usize, load: Option<ElementLoad>) -> Vec<BeamElement> {
        (0..count)
            .map(|_| {
                let element = BeamElement::new(length / count as f64, E, I).unwrap();
                match load {
                    Some(l) => element.with_load(l),
                    None => element,
                }
            })
            .collect()
    }

    fn supports(count: usize, at: &[(usize, Support)]) -> Vec<Support> {
        let mut supports = vec![Support::free(); count];
        for (node, support) in at {
            supports[*node] = *support;
        }
        supports
    }

    #[test]
    fn test_assembly_size_and_symmetry() {
        let elements = chain(6.0, 3, Some(ElementLoad::Uniform { w: 2.0 }));
        let system = GlobalSystem::assemble(&elements).unwrap();
        assert_eq!(system.dof_count(), 8);
        assert_relative_eq!(system.stiffness, system.stiffness.transpose(), epsilon = 1e-6);
        // Total load is -wL
        let total: f64 = system.loads.iter().step_by(2).sum();
        assert_relative_eq!(total, -12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simply_supported_uniform() {
        let (w, l) = (5.0, 6.0);
        let elements = chain(l, 4, Some(ElementLoad::Uniform { w }));
        let supports = supports(5, &[(0, Support::pinned()), (4, Support::pinned())]);
        let solution = solve(&elements, &supports).unwrap();

        let expected = 5.0 * w * l.powi(4) / (384.0 * E * I);
        assert_relative_eq!(-solution.translation(2), expected, max_relative = 1e-9);
        assert_eq!(solution.reactions.len(), 2);
        assert_relative_eq!(solution.reactions[0].force, w * l / 2.0, max_relative = 1e-9);
        assert_relative_eq!(solution.reactions[1].force, w * l / 2.0, max_relative = 1e-9);
        assert!(solution.translation(0).abs() < 1e-15);
    }

    #[test]
    fn test_cantilever_point_load() {
        let (p, l) = (3.0, 2.0);
        let mut elements = chain(l, 2, None);
        elements[1].add_load(ElementLoad::Point { p, offset: 1.0 });
        let supports = supports(3, &[(0, Support::clamped())]);
        let solution = solve(&elements, &supports).unwrap();

        assert_relative_eq!(-solution.translation(2), p * l.powi(3) / (3.0 * E * I), max_relative = 1e-9);
        let root = solution.reactions[0];
        assert_relative_eq!(root.force, p, max_relative = 1e-9);
        // Clamp resists the clockwise load moment
        assert_relative_eq!(root.moment, p * l, max_relative = 1e-9);
    }

    #[test]
    fn test_spring_support() {
        let (p, k) = (10.0, 1.0e3);
        let mut elements = chain(4.0, 2, None);
        elements[0].add_load(ElementLoad::Point { p, offset: 2.0 });
        // Spring at the loaded node of a simply supported beam carries part of P
        let supports = supports(
            3,
            &[(0, Support::pinned()), (1, Support::spring(k)), (2, Support::pinned())],
        );
        let solution = solve(&elements, &supports).unwrap();
        let spring = solution.reactions[1];
        assert_relative_eq!(spring.force, -k * solution.translation(1), max_relative = 1e-9);
        let total: f64 = solution.reactions.iter().map(|r| r.force).sum();
        assert_relative_eq!(total, p, max_relative = 1e-9);
    }

    #[test]
    fn test_single_pin_is_singular() {
        let elements = chain(4.0, 2, Some(ElementLoad::Uniform { w: 1.0 }));
        let supports = supports(3, &[(1, Support::pinned())]);
        let result = solve(&elements, &supports);
        assert!(matches!(result, Err(CalcError::SingularSystem { .. })));
    }

    #[test]
    fn test_unsupported_is_singular() {
        let elements = chain(4.0, 2, None);
        let result = solve(&elements, &[Support::free(); 3]);
        assert!(matches!(result, Err(CalcError::SingularSystem { .. })));
    }

    #[test]
    fn test_pin_and_rotation_restraint_is_stable() {
        let supports = [
            Support::pinned(),
            Support::free(),
            Support::free().with_rotation(Restraint::Rigid),
        ];
        assert!(check_stability(&supports).is_ok());
    }

    #[test]
    fn test_support_count_mismatch() {
        let elements = chain(4.0, 2, None);
        let result = solve(&elements, &[Support::pinned(), Support::pinned()]);
        assert!(matches!(result, Err(CalcError::Configuration { .. })));
    }
}
