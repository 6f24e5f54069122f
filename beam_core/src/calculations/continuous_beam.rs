//! # Continuous Beam Analysis
//!
//! Top-level entry point: one beam, its declared actions, and every EN 1990
//! combination evaluated under pattern loading.
//!
//! ## Pipeline
//!
//! 1. Validate the span layout, stiffness and actions
//! 2. Mesh the layout ([`crate::geometry::mesh`])
//! 3. Generate combinations and loading patterns
//! 4. Evaluate every (combination, pattern) pair ([`CombinationRunner`]) and
//!    fold it into the envelopes ([`super::envelope::EnvelopeCollector`])
//!
//! The result keeps the envelopes and one [`EvaluationSummary`] per pair.
//! Sampled curves per pair are kept only with
//! [`AnalysisSettings::keep_curves`].
//!
//! ## Example
//!
//! ```rust
//! use beam_core::calculations::{analyze, BeamInput};
//! use beam_core::geometry::SpanLayout;
//! use beam_core::loads::{ActionCase, ActionCategory, ActionLoad, PsiTable};
//! use beam_core::settings::AnalysisSettings;
//!
//! // Two fields of 5 m, E = 11 000 N/mm², I for 100 x 240 mm
//! let input = BeamInput::new("Floor joist", SpanLayout::new(vec![5.0, 5.0]), 1.1e7, 1.152e-4)
//!     .with_action(ActionCase::permanent_line("Self-weight", 1.0))
//!     .with_action(ActionCase::new("Live", ActionCategory::ImposedA, ActionLoad::Line { w: 2.0 }));
//!
//! let analysis = analyze(&input, PsiTable::en1990(), &AnalysisSettings::default(), None).unwrap();
//! let ultimate = analysis.ultimate.as_ref().unwrap();
//!
//! // Hogging over the middle support is governed by a fully loaded pattern
//! let hogging = ultimate.min_moment().unwrap();
//! assert!((hogging.position - 5.0).abs() < 1e-9);
//! assert_eq!(ultimate.source(hogging.source).pattern, "all");
//! ```

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::envelope::{Envelope, Envelopes};
use super::runner::{CancellationToken, CombinationRunner, EvaluationResult, EvaluationSummary, FailedEvaluation};
use crate::equations::RectangularSection;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{mesh, Segment, SpanLayout};
use crate::loads::{
    generate_patterns, ActionCase, CoefficientSource, Combination, LimitState, LoadCombinationGenerator, Pattern,
    SafetyFactors,
};
use crate::materials::TimberProperties;
use crate::settings::AnalysisSettings;

// =============================================================================
// BEAM INPUT
// =============================================================================

fn default_tributary_width() -> f64 {
    1.0
}

/// Input for a continuous beam analysis
///
/// Positions of positioned actions are measured from the left beam end,
/// including a left cantilever.
///
/// ```text
///  K_l     F1          F2        K_r
/// |----△----------△----------△----|
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamInput {
    /// User label for this beam
    pub label: String,

    /// Fields, cantilevers and boundary supports
    pub layout: SpanLayout,

    /// Modulus of elasticity (kN/m²), constant along the beam
    pub e_modulus: f64,

    /// Second moment of area (m⁴), constant along the beam
    pub moment_of_inertia: f64,

    /// Declared characteristic actions
    #[serde(default)]
    pub actions: Vec<ActionCase>,

    /// Partial safety factors
    #[serde(default)]
    pub safety_factors: SafetyFactors,

    /// Width (m) that converts area loads into line loads
    #[serde(default = "default_tributary_width")]
    pub tributary_width: f64,
}

impl BeamInput {
    /// Create an input without actions
    pub fn new(label: impl Into<String>, layout: SpanLayout, e_modulus: f64, moment_of_inertia: f64) -> Self {
        BeamInput {
            label: label.into(),
            layout,
            e_modulus,
            moment_of_inertia,
            actions: Vec::new(),
            safety_factors: SafetyFactors::default(),
            tributary_width: default_tributary_width(),
        }
    }

    /// Create an input from a rectangular timber section
    pub fn timber(
        label: impl Into<String>,
        layout: SpanLayout,
        section: &RectangularSection,
        material: &TimberProperties,
    ) -> Self {
        Self::new(label, layout, material.e_mean, section.moment_of_inertia_m4())
    }

    /// Builder: add an action
    pub fn with_action(mut self, action: ActionCase) -> Self {
        self.actions.push(action);
        self
    }

    /// Builder: add the self-weight of a timber section as a permanent line load
    pub fn with_self_weight(self, section: &RectangularSection, material: &TimberProperties) -> Self {
        let w = material.unit_weight() * section.area_m2();
        self.with_action(ActionCase::permanent_line("Self-weight", w))
    }

    /// Builder: set the partial safety factors
    pub fn with_safety_factors(mut self, factors: SafetyFactors) -> Self {
        self.safety_factors = factors;
        self
    }

    /// Builder: set the tributary width (m)
    pub fn with_tributary_width(mut self, width: f64) -> Self {
        self.tributary_width = width;
        self
    }

    /// Parse an input from JSON
    pub fn from_json(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(|e| CalcError::configuration(format!("Invalid beam input JSON: {}", e)))
    }

    /// Total beam length (m)
    pub fn total_length(&self) -> f64 {
        self.layout.total_length()
    }

    /// Validate layout, stiffness and actions
    pub fn validate(&self) -> CalcResult<()> {
        self.layout.validate()?;
        for (field, value) in [("e_modulus", self.e_modulus), ("moment_of_inertia", self.moment_of_inertia)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        let length = self.total_length();
        for action in &self.actions {
            action.validate(length)?;
        }
        Ok(())
    }
}

// =============================================================================
// ANALYSIS RESULT
// =============================================================================

/// Result of a continuous beam analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamAnalysis {
    /// Run identifier
    pub id: Uuid,
    /// Time the analysis was started (UTC)
    pub created_at: DateTime<Utc>,
    /// Label of the analysed beam
    pub label: String,
    /// Segments of the beam, left to right
    pub segments: Vec<Segment>,
    /// Number of finite elements used
    pub element_count: usize,
    /// All generated combinations
    pub combinations: Vec<Combination>,
    /// All loading patterns
    pub patterns: Vec<Pattern>,
    /// Summary of every successful evaluation in run order
    pub evaluations: Vec<EvaluationSummary>,
    /// Sampled curves in run order, only with `keep_curves`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curves: Vec<EvaluationResult>,
    /// Pairs excluded from the envelopes
    pub failures: Vec<FailedEvaluation>,
    /// GZT envelope, None if no ultimate evaluation succeeded
    pub ultimate: Option<Envelope>,
    /// GZG envelope, None if no serviceability evaluation succeeded
    pub serviceability: Option<Envelope>,
    /// GZG characteristic envelope (instantaneous deflection)
    pub characteristic: Option<Envelope>,
    /// GZG quasi-permanent envelope (creep deflection)
    pub quasi_permanent: Option<Envelope>,
}

impl BeamAnalysis {
    /// Envelope of one limit state
    pub fn envelope(&self, limit_state: LimitState) -> Option<&Envelope> {
        match limit_state {
            LimitState::Ultimate => self.ultimate.as_ref(),
            LimitState::Serviceability => self.serviceability.as_ref(),
        }
    }

    /// Combination by name
    pub fn combination(&self, name: &str) -> Option<&Combination> {
        self.combinations.iter().find(|c| c.name == name)
    }

    /// Summary of one (combination, pattern) pair
    pub fn evaluation(&self, combination: &str, pattern: &str) -> Option<&EvaluationSummary> {
        self.evaluations
            .iter()
            .find(|e| e.combination == combination && e.pattern == pattern)
    }

    /// Sampled curves of one pair, if they were kept
    pub fn curve(&self, combination: &str, pattern: &str) -> Option<&EvaluationResult> {
        self.curves
            .iter()
            .find(|r| r.combination == combination && r.pattern == pattern)
    }

    /// Returns true if any pair was excluded
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalcError::internal(format!("Failed to serialize analysis: {}", e)))
    }
}

// =============================================================================
// CALCULATION FUNCTION
// =============================================================================

/// Analyse a continuous beam
///
/// # Errors
///
/// * `InvalidInput` / `Configuration` - invalid beam, actions or settings
/// * `MissingCoefficient` / `NotSupported` - combination generation failed
/// * `Cancelled` - the token was cancelled during the run
///
/// Singular evaluations do not fail the analysis; they are listed in
/// [`BeamAnalysis::failures`].
pub fn analyze(
    input: &BeamInput,
    coefficients: &dyn CoefficientSource,
    settings: &AnalysisSettings,
    cancel: Option<&CancellationToken>,
) -> CalcResult<BeamAnalysis> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    input.validate()?;
    settings.validate()?;

    let mesh = mesh(&input.layout, settings)?;
    let segments: Vec<Segment> = mesh.segments.iter().map(|s| s.segment).collect();
    let element_count = mesh.element_count();

    let combinations = LoadCombinationGenerator::new(coefficients, input.safety_factors, input.tributary_width)
        .generate(&input.actions)?;
    let patterns = generate_patterns(mesh.field_count(), settings.max_pattern_fields)?;

    let runner = CombinationRunner::new(mesh, input.e_modulus, input.moment_of_inertia, settings.clone())?;
    let output = runner.run(&combinations, &patterns, cancel)?;
    let Envelopes {
        ultimate,
        serviceability,
        characteristic,
        quasi_permanent,
    } = output.envelopes;

    info!(
        "analysis {} of '{}': {} combinations, {} patterns, {} evaluations, {} failures",
        id,
        input.label,
        combinations.len(),
        patterns.len(),
        output.summaries.len(),
        output.failures.len()
    );

    Ok(BeamAnalysis {
        id,
        created_at,
        label: input.label.clone(),
        segments,
        element_count,
        combinations,
        patterns,
        evaluations: output.summaries,
        curves: output.curves,
        failures: output.failures,
        ultimate,
        serviceability,
        characteristic,
        quasi_permanent,
    })
}
