//! # Timber Verification (EN 1995-1-1)
//!
//! Unity checks of a rectangular timber member from the results of an
//! analysis.
//!
//! ## Checks
//!
//! | Check | Demand | Resistance |
//! |-------|--------|------------|
//! | Bending (6.1.6) | σ_m = \|M\| / W | kmod · f_m,k / γ_M |
//! | Shear (6.1.7) | τ = 1.5 · \|V\| / (k_cr · b · h) | kmod · f_v,k / γ_M |
//! | Instantaneous deflection | w_inst (characteristic) | L / 300 |
//! | Final deflection | w_inst + k_def · w_qp | L / 200 |
//!
//! kmod follows the load-duration class of each ultimate combination, so a
//! short-term combination can govern with a higher stress than a permanent
//! one. Cantilevers are checked against twice their length.

use serde::{Deserialize, Serialize};

use super::continuous_beam::BeamAnalysis;
use super::envelope::{Envelope, Provenance, QuantityEnvelope};
use super::runner::EvaluationSummary;
use crate::equations::RectangularSection;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::SegmentKind;
use crate::loads::LimitState;
use crate::materials::{kdef, kmod, MaterialCatalog, ServiceClass, TimberProperties};

/// Crack factor for shear, EN 1995-1-1 6.1.7(2)
pub const K_CR: f64 = 0.67;

/// Span-to-deflection ratio for the instantaneous deflection
pub const INSTANTANEOUS_LIMIT_RATIO: f64 = 300.0;

/// Span-to-deflection ratio for the final deflection
pub const FINAL_LIMIT_RATIO: f64 = 200.0;

/// A timber member to verify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberMember {
    /// Strength class, e.g. "C24"
    pub strength_class: String,
    /// Cross-section
    pub section: RectangularSection,
    /// Service class
    #[serde(default)]
    pub service_class: ServiceClass,
}

impl TimberMember {
    /// Create a member in service class 1
    pub fn new(strength_class: impl Into<String>, section: RectangularSection) -> Self {
        TimberMember {
            strength_class: strength_class.into(),
            section,
            service_class: ServiceClass::default(),
        }
    }

    /// Builder: set the service class
    pub fn with_service_class(mut self, service_class: ServiceClass) -> Self {
        self.service_class = service_class;
        self
    }
}

/// Governing stress check over all ultimate combinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressCheck {
    /// Design stress (kN/m²)
    pub stress: f64,
    /// Design strength (kN/m²)
    pub strength: f64,
    /// kmod used for the strength
    pub kmod: f64,
    /// stress / strength
    pub unity: f64,
    /// Position of the governing stress (m)
    pub position: f64,
    /// Governing combination and pattern
    pub governing: Provenance,
}

/// Deflection checks of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionCheck {
    /// Segment label ("F1", "K_r", ...)
    pub segment: String,
    /// Reference length: field length, or twice the cantilever length (m)
    pub reference_length: f64,
    /// Instantaneous deflection under characteristic combinations (m)
    pub w_inst: f64,
    /// Limit for w_inst (m)
    pub w_inst_limit: f64,
    /// Final deflection including creep (m)
    pub w_fin: f64,
    /// Limit for w_fin (m)
    pub w_fin_limit: f64,
}

impl DeflectionCheck {
    /// Instantaneous unity ratio
    pub fn inst_unity(&self) -> f64 {
        self.w_inst / self.w_inst_limit
    }

    /// Final unity ratio
    pub fn fin_unity(&self) -> f64 {
        self.w_fin / self.w_fin_limit
    }

    /// Larger of the two ratios
    pub fn unity(&self) -> f64 {
        self.inst_unity().max(self.fin_unity())
    }
}

/// Result of a timber verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberVerification {
    /// Properties of the strength class
    pub material: TimberProperties,
    /// Service class
    pub service_class: ServiceClass,
    /// Creep factor
    pub kdef: f64,
    /// Bending check
    pub bending: StressCheck,
    /// Shear check
    pub shear: StressCheck,
    /// Deflection checks per segment, left to right
    pub deflection: Vec<DeflectionCheck>,
}

impl TimberVerification {
    /// Bending unity ratio
    pub fn bending_unity(&self) -> f64 {
        self.bending.unity
    }

    /// Shear unity ratio
    pub fn shear_unity(&self) -> f64 {
        self.shear.unity
    }

    /// Worst deflection unity ratio over all segments
    pub fn deflection_unity(&self) -> f64 {
        self.deflection.iter().map(|d| d.unity()).fold(0.0, f64::max)
    }

    /// Check if all unity checks pass (≤ 1.0)
    pub fn passes(&self) -> bool {
        self.governing_unity() <= 1.0
    }

    /// Get the governing (highest) unity ratio
    pub fn governing_unity(&self) -> f64 {
        self.bending_unity().max(self.shear_unity()).max(self.deflection_unity())
    }

    /// Get a description of what governs the design
    pub fn governing_condition(&self) -> &'static str {
        let (bending, shear, deflection) = (self.bending_unity(), self.shear_unity(), self.deflection_unity());
        if bending >= shear && bending >= deflection {
            "Bending"
        } else if shear >= deflection {
            "Shear"
        } else {
            "Deflection"
        }
    }
}

/// Verify a timber member against an analysis
///
/// # Errors
///
/// * `InvalidInput` - invalid section
/// * `MissingCoefficient` - unknown strength class
/// * `Precompute` - the analysis has no ultimate or no serviceability results
pub fn verify_timber(
    analysis: &BeamAnalysis,
    member: &TimberMember,
    catalog: &dyn MaterialCatalog,
) -> CalcResult<TimberVerification> {
    member.section.validate()?;
    let material = catalog.properties(&member.strength_class)?;
    let service_class = member.service_class;

    let ultimate: Vec<&EvaluationSummary> = analysis
        .evaluations
        .iter()
        .filter(|r| r.limit_state == LimitState::Ultimate)
        .collect();
    if ultimate.is_empty() {
        return Err(CalcError::precompute("Analysis has no ultimate results"));
    }

    let w = member.section.section_modulus_m3();
    let shear_area = K_CR * member.section.width_m() * member.section.height_m();

    let bending = governing_stress(&ultimate, service_class, material.f_m_k, material.gamma_m, |r| {
        (r.peak_moment.magnitude / w, r.peak_moment.position)
    })?;
    let shear = governing_stress(&ultimate, service_class, material.f_v_k, material.gamma_m, |r| {
        (1.5 * r.peak_shear.magnitude / shear_area, r.peak_shear.position)
    })?;

    let kdef = kdef(service_class);
    let deflection = deflection_checks(analysis, kdef)?;

    Ok(TimberVerification {
        material,
        service_class,
        kdef,
        bending,
        shear,
        deflection,
    })
}

fn governing_stress(
    results: &[&EvaluationSummary],
    service_class: ServiceClass,
    characteristic: f64,
    gamma_m: f64,
    demand: impl Fn(&EvaluationSummary) -> (f64, f64),
) -> CalcResult<StressCheck> {
    let mut governing: Option<StressCheck> = None;
    for &result in results {
        let (stress, position) = demand(result);
        let kmod = kmod(service_class, result.duration);
        let strength = kmod * characteristic / gamma_m;
        let unity = stress / strength;
        if governing.as_ref().map_or(true, |g| unity > g.unity) {
            governing = Some(StressCheck {
                stress,
                strength,
                kmod,
                unity,
                position,
                governing: result.provenance(),
            });
        }
    }
    governing.ok_or_else(|| CalcError::precompute("Analysis has no ultimate results"))
}

fn deflection_checks(analysis: &BeamAnalysis, kdef: f64) -> CalcResult<Vec<DeflectionCheck>> {
    let (Some(characteristic), Some(quasi_permanent)) = (&analysis.characteristic, &analysis.quasi_permanent) else {
        return Err(CalcError::precompute("Analysis has no serviceability results"));
    };

    let inst = magnitudes(&characteristic.deflection);
    let creep = magnitudes(&quasi_permanent.deflection);

    Ok(analysis
        .segments
        .iter()
        .map(|segment| {
            let reference_length = match segment.kind {
                SegmentKind::Field(_) => segment.length,
                SegmentKind::LeftCantilever | SegmentKind::RightCantilever => 2.0 * segment.length,
            };
            let (mut w_inst, mut w_fin) = (0.0_f64, 0.0_f64);
            for i in samples_within(&characteristic, segment.start, segment.end()) {
                w_inst = w_inst.max(inst[i]);
                w_fin = w_fin.max(inst[i] + kdef * creep[i]);
            }
            DeflectionCheck {
                segment: segment.kind.label(),
                reference_length,
                w_inst,
                w_inst_limit: reference_length / INSTANTANEOUS_LIMIT_RATIO,
                w_fin,
                w_fin_limit: reference_length / FINAL_LIMIT_RATIO,
            }
        })
        .collect())
}

/// Per-sample magnitude over both envelope curves
fn magnitudes(envelope: &QuantityEnvelope) -> Vec<f64> {
    envelope
        .max
        .iter()
        .zip(&envelope.min)
        .map(|(max, min)| max.abs().max(min.abs()))
        .collect()
}

fn samples_within(envelope: &Envelope, start: f64, end: f64) -> impl Iterator<Item = usize> + '_ {
    let tolerance = 1e-9 * (1.0 + end.abs());
    envelope
        .positions
        .iter()
        .enumerate()
        .filter(move |(_, x)| **x >= start - tolerance && **x <= end + tolerance)
        .map(|(i, _)| i)
}
