//! # Combination Runner
//!
//! Evaluates every (combination, pattern) pair of one beam through the
//! finite-element solver and the field postprocessor.
//!
//! ## Load Placement
//!
//! For each element of a pair:
//!
//! - the summed permanent line load `g_sum`, positioned permanent loads and
//!   accompanying variable actions act everywhere
//! - the leading action acts on cantilevers and on the fields the pattern
//!   marks as loaded
//!
//! Combinations without a leading load do not depend on the pattern and are
//! evaluated once, with the fully loaded pattern.
//!
//! ## Reduction
//!
//! Pairs run in batches of a few pairs per worker thread. Each batch is
//! folded into the envelopes in pair order before the next one starts, so
//! only the envelopes and one [`EvaluationSummary`] per pair outlive a batch.
//! The sampled curves are kept only with [`AnalysisSettings::keep_curves`].
//!
//! ## Failures
//!
//! Errors that only concern one pair (see [`CalcError::is_evaluation_local`])
//! are logged and reported in [`RunOutput::failures`]; the other pairs still
//! produce results. Any other error aborts the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::envelope::{EnvelopeCollector, Envelopes, Provenance};
use crate::errors::{CalcError, CalcResult};
use crate::fem::{BeamElement, ElementLoad, FieldPostprocessor, FieldSamples};
use crate::geometry::{Mesh, SegmentKind};
use crate::loads::{
    Combination, CombinationKind, DesignLoad, LimitState, LoadDurationClass, Pattern,
};
use crate::settings::AnalysisSettings;

/// Cooperative cancellation flag, checked between pairs
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; pairs already running finish normally
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Support reaction of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportReaction {
    /// Node index
    pub node: usize,
    /// Position from the left beam end (m)
    pub position: f64,
    /// Vertical reaction (kN), positive upward
    pub force: f64,
    /// Reaction moment (kNm), counter-clockwise positive
    pub moment: f64,
}

/// Pairs per worker thread folded into the envelopes at a time
const BATCH_PER_THREAD: usize = 4;

/// Largest magnitude of one quantity along the beam
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Largest |value|
    pub magnitude: f64,
    /// Position from the left beam end (m); the first sample wins a tie
    pub position: f64,
}

impl Peak {
    fn of(values: &[f64], positions: &[f64]) -> Self {
        let mut peak = Peak::default();
        for (value, x) in values.iter().zip(positions) {
            if value.abs() > peak.magnitude {
                peak = Peak {
                    magnitude: value.abs(),
                    position: *x,
                };
            }
        }
        peak
    }
}

/// Scalar outcome of one pair, kept after its curves are folded into the
/// envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Combination name
    pub combination: String,
    /// Pattern label
    pub pattern: String,
    /// Limit state of the combination
    pub limit_state: LimitState,
    /// Combination family
    pub kind: CombinationKind,
    /// Load-duration class of the combination
    pub duration: LoadDurationClass,
    /// Largest sagging moment (kNm)
    pub max_moment: f64,
    /// Largest hogging moment (kNm, most negative)
    pub min_moment: f64,
    /// Largest |M| (kNm)
    pub peak_moment: Peak,
    /// Largest |V| (kN)
    pub peak_shear: Peak,
    /// Largest |w| (m)
    pub peak_deflection: Peak,
}

impl EvaluationSummary {
    /// The pair this summary belongs to
    pub fn provenance(&self) -> Provenance {
        Provenance {
            combination: self.combination.clone(),
            pattern: self.pattern.clone(),
        }
    }
}

/// Fields and reactions of one (combination, pattern) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Combination name
    pub combination: String,
    /// Pattern label
    pub pattern: String,
    /// Limit state of the combination
    pub limit_state: LimitState,
    /// Combination family
    pub kind: CombinationKind,
    /// Load-duration class of the combination
    pub duration: LoadDurationClass,
    /// Sampled fields along the beam
    pub samples: FieldSamples,
    /// Reactions at restrained nodes
    pub reactions: Vec<SupportReaction>,
}

impl EvaluationResult {
    /// Scalar summary of the sampled fields
    pub fn summary(&self) -> EvaluationSummary {
        let samples = &self.samples;
        EvaluationSummary {
            combination: self.combination.clone(),
            pattern: self.pattern.clone(),
            limit_state: self.limit_state,
            kind: self.kind,
            duration: self.duration,
            max_moment: samples.max_moment(),
            min_moment: samples.min_moment(),
            peak_moment: Peak::of(&samples.moment, &samples.positions),
            peak_shear: Peak::of(&samples.shear, &samples.positions),
            peak_deflection: Peak::of(&samples.deflection, &samples.positions),
        }
    }
}

/// A pair that was excluded from the envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEvaluation {
    /// Combination name
    pub combination: String,
    /// Pattern label
    pub pattern: String,
    /// Why the pair failed
    pub error: CalcError,
}

/// Results of a run in pair order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Summary of every successful evaluation
    pub summaries: Vec<EvaluationSummary>,
    /// Excluded pairs
    pub failures: Vec<FailedEvaluation>,
    /// Envelopes of all successful evaluations
    pub envelopes: Envelopes,
    /// Sampled curves, only with [`AnalysisSettings::keep_curves`]
    pub curves: Vec<EvaluationResult>,
}

enum Outcome {
    Done(Box<EvaluationResult>),
    Failed(FailedEvaluation),
    Skipped,
}

/// Evaluates combinations and patterns on one meshed beam
#[derive(Debug, Clone)]
pub struct CombinationRunner {
    mesh: Mesh,
    e: f64,
    i: f64,
    settings: AnalysisSettings,
}

impl CombinationRunner {
    /// Create a runner for a meshed beam with constant E (kN/m²) and I (m⁴)
    pub fn new(mesh: Mesh, e: f64, i: f64, settings: AnalysisSettings) -> CalcResult<Self> {
        settings.validate()?;
        for (field, value) in [("e_modulus", e), ("moment_of_inertia", i)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        Ok(CombinationRunner { mesh, e, i, settings })
    }

    /// The mesh this runner evaluates
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Build the loaded element chain for one pair
    pub fn build_elements(&self, combination: &Combination, pattern: &Pattern) -> CalcResult<Vec<BeamElement>> {
        let positions = &self.mesh.node_positions;
        let last = self.mesh.element_count().saturating_sub(1);

        self.mesh
            .elements
            .iter()
            .enumerate()
            .map(|(e, geometry)| {
                let mut element = BeamElement::new(geometry.length, self.e, self.i)?;
                let span = (positions[e], positions[e + 1], e == last);

                if combination.g_sum != 0.0 {
                    element.add_load(ElementLoad::Uniform { w: combination.g_sum });
                }
                for component in combination.fixed_loads() {
                    if let Some(load) = place(&component.load, span, geometry.length) {
                        element.add_load(load);
                    }
                }
                if let Some(leading) = &combination.leading_load {
                    let carries_leading = match self.mesh.element_kind(e) {
                        SegmentKind::Field(field) => pattern.is_loaded(field),
                        SegmentKind::LeftCantilever | SegmentKind::RightCantilever => true,
                    };
                    if carries_leading {
                        if let Some(load) = place(&leading.load, span, geometry.length) {
                            element.add_load(load);
                        }
                    }
                }
                Ok(element)
            })
            .collect()
    }

    /// Solve and sample one pair
    pub fn evaluate(&self, combination: &Combination, pattern: &Pattern) -> CalcResult<EvaluationResult> {
        let elements = self.build_elements(combination, pattern)?;
        let mut post = FieldPostprocessor::new(elements, self.mesh.node_positions.clone())?;

        let reactions = post
            .solve(&self.mesh.supports)?
            .reactions
            .iter()
            .map(|r| SupportReaction {
                node: r.node,
                position: self.mesh.node_positions[r.node],
                force: r.force,
                moment: r.moment,
            })
            .collect();
        let samples = post.sample(self.settings.samples_per_element)?;

        Ok(EvaluationResult {
            combination: combination.name.clone(),
            pattern: pattern.label(),
            limit_state: combination.limit_state,
            kind: combination.kind,
            duration: combination.duration,
            samples,
            reactions,
        })
    }

    /// (combination, pattern) index pairs in evaluation order
    pub fn pairs(&self, combinations: &[Combination], patterns: &[Pattern]) -> CalcResult<Vec<(usize, usize)>> {
        let field_count = self.mesh.field_count();
        if patterns.is_empty() {
            return Err(CalcError::configuration("At least one loading pattern is required"));
        }
        if let Some(bad) = patterns.iter().find(|p| p.loaded.len() != field_count) {
            return Err(CalcError::configuration(format!(
                "Pattern '{}' covers {} fields, the beam has {}",
                bad.label(),
                bad.loaded.len(),
                field_count
            )));
        }

        let full = patterns.iter().position(|p| p.is_full());
        let mut pairs = Vec::new();
        for (c, combination) in combinations.iter().enumerate() {
            match full {
                Some(p) if !combination.is_pattern_dependent() => pairs.push((c, p)),
                _ => pairs.extend((0..patterns.len()).map(|p| (c, p))),
            }
        }
        Ok(pairs)
    }

    /// Evaluate all pairs and fold them into the envelopes.
    ///
    /// # Errors
    ///
    /// * `Cancelled` - the token was cancelled before every pair ran
    /// * any error that is not local to one pair
    pub fn run(
        &self,
        combinations: &[Combination],
        patterns: &[Pattern],
        cancel: Option<&CancellationToken>,
    ) -> CalcResult<RunOutput> {
        let pairs = self.pairs(combinations, patterns)?;
        let total = pairs.len();
        let started = Instant::now();

        let evaluate_pair = |&(c, p): &(usize, usize)| -> CalcResult<Outcome> {
            if cancel.is_some_and(|t| t.is_cancelled()) {
                return Ok(Outcome::Skipped);
            }
            let (combination, pattern) = (&combinations[c], &patterns[p]);
            match self.evaluate(combination, pattern) {
                Ok(result) => Ok(Outcome::Done(Box::new(result))),
                Err(error) if error.is_evaluation_local() => {
                    warn!(
                        "excluding combination {} with pattern {}: {}",
                        combination.name,
                        pattern.label(),
                        error
                    );
                    Ok(Outcome::Failed(FailedEvaluation {
                        combination: combination.name.clone(),
                        pattern: pattern.label(),
                        error,
                    }))
                }
                Err(error) => Err(error),
            }
        };

        let batch = if self.settings.parallel {
            rayon::current_num_threads().max(1) * BATCH_PER_THREAD
        } else {
            BATCH_PER_THREAD
        };

        let mut output = RunOutput::default();
        let mut collector = EnvelopeCollector::new();
        let mut skipped = 0;
        for chunk in pairs.chunks(batch) {
            let outcomes: Vec<Outcome> = if self.settings.parallel {
                chunk.par_iter().map(&evaluate_pair).collect::<CalcResult<_>>()?
            } else {
                chunk.iter().map(&evaluate_pair).collect::<CalcResult<_>>()?
            };

            for outcome in outcomes {
                match outcome {
                    Outcome::Done(result) => {
                        collector.add(&result)?;
                        output.summaries.push(result.summary());
                        if self.settings.keep_curves {
                            output.curves.push(*result);
                        }
                    }
                    Outcome::Failed(failure) => output.failures.push(failure),
                    Outcome::Skipped => skipped += 1,
                }
            }
            if skipped > 0 {
                break;
            }
        }

        if skipped > 0 {
            let completed = output.summaries.len() + output.failures.len();
            debug!("run cancelled after {} of {} pairs", completed, total);
            return Err(CalcError::Cancelled { completed, total });
        }
        output.envelopes = collector.finish();

        info!(
            "evaluated {} pairs ({} failed) in {:.1} ms",
            total,
            output.failures.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(output)
    }
}

/// Part of a design load acting on the element spanning `[start, end]`.
///
/// Point loads and couples belong to the element whose span contains them,
/// the right end only for the last element.
fn place(load: &DesignLoad, (start, end, is_last): (f64, f64, bool), length: f64) -> Option<ElementLoad> {
    let contains = |x: f64| x >= start && (x < end || (is_last && x <= end));
    match *load {
        DesignLoad::Uniform { w } => Some(ElementLoad::Uniform { w }),
        DesignLoad::Point { p, position } => contains(position).then(|| ElementLoad::Point {
            p,
            offset: (position - start).clamp(0.0, length),
        }),
        DesignLoad::Moment { m, position } => contains(position).then(|| ElementLoad::Moment {
            m,
            offset: (position - start).clamp(0.0, length),
        }),
        DesignLoad::Patch { w, start: a, end: b } => {
            let lo = a.max(start);
            let hi = b.min(end);
            if hi - lo <= 1e-12 * length {
                return None;
            }
            if lo <= start && hi >= end {
                return Some(ElementLoad::Uniform { w });
            }
            let from = (lo - start).clamp(0.0, length);
            let to = (hi - start).clamp(0.0, length);
            (to > from).then_some(ElementLoad::Patch { w, start: from, end: to })
        }
    }
}
