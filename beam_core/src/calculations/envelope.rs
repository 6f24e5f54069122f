//! # Envelope Builder
//!
//! Reduces the evaluations of one limit state to per-sample maximum and
//! minimum curves, one evaluation at a time. Every bound remembers which
//! (combination, pattern) pair produced it. Comparisons are strict, so the
//! first evaluation in run order wins a tie and the envelope is identical for
//! sequential and parallel runs.

use serde::{Deserialize, Serialize};

use super::runner::EvaluationResult;
use crate::errors::{CalcError, CalcResult};
use crate::loads::{CombinationKind, LimitState};

/// The (combination, pattern) pair that produced a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Combination name
    pub combination: String,
    /// Pattern label
    pub pattern: String,
}

/// Running max/min of one scalar with source indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Largest value
    pub max: f64,
    /// Index into [`Envelope::sources`] of the largest value
    pub max_source: usize,
    /// Smallest value
    pub min: f64,
    /// Index into [`Envelope::sources`] of the smallest value
    pub min_source: usize,
}

impl Bounds {
    fn new(value: f64, source: usize) -> Self {
        Bounds {
            max: value,
            max_source: source,
            min: value,
            min_source: source,
        }
    }

    fn update(&mut self, value: f64, source: usize) {
        if value > self.max {
            self.max = value;
            self.max_source = source;
        }
        if value < self.min {
            self.min = value;
            self.min_source = source;
        }
    }
}

/// Largest magnitude of a quantity anywhere along the beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    /// Signed value
    pub value: f64,
    /// Position from the left beam end (m)
    pub position: f64,
    /// Index into [`Envelope::sources`]
    pub source: usize,
}

/// Envelope curves of one quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityEnvelope {
    /// Per-sample maximum
    pub max: Vec<f64>,
    /// Per-sample minimum
    pub min: Vec<f64>,
    /// Source of each maximum
    pub max_source: Vec<usize>,
    /// Source of each minimum
    pub min_source: Vec<usize>,
}

impl QuantityEnvelope {
    fn from_bounds(bounds: &[Bounds]) -> Self {
        QuantityEnvelope {
            max: bounds.iter().map(|b| b.max).collect(),
            min: bounds.iter().map(|b| b.min).collect(),
            max_source: bounds.iter().map(|b| b.max_source).collect(),
            min_source: bounds.iter().map(|b| b.min_source).collect(),
        }
    }

    /// Peak of the maximum curve
    pub fn peak_max(&self, positions: &[f64]) -> Option<Extreme> {
        let mut best: Option<Extreme> = None;
        for (i, value) in self.max.iter().enumerate() {
            if best.map_or(true, |b| *value > b.value) {
                best = Some(Extreme {
                    value: *value,
                    position: positions[i],
                    source: self.max_source[i],
                });
            }
        }
        best
    }

    /// Trough of the minimum curve
    pub fn peak_min(&self, positions: &[f64]) -> Option<Extreme> {
        let mut best: Option<Extreme> = None;
        for (i, value) in self.min.iter().enumerate() {
            if best.map_or(true, |b| *value < b.value) {
                best = Some(Extreme {
                    value: *value,
                    position: positions[i],
                    source: self.min_source[i],
                });
            }
        }
        best
    }

    /// Largest magnitude over both curves; the maximum wins a tie
    pub fn absolute(&self, positions: &[f64]) -> Option<Extreme> {
        match (self.peak_max(positions), self.peak_min(positions)) {
            (Some(max), Some(min)) if min.value.abs() > max.value.abs() => Some(min),
            (max, _) => max,
        }
    }
}

/// Reaction bounds at one support
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionEnvelope {
    /// Node index
    pub node: usize,
    /// Position from the left beam end (m)
    pub position: f64,
    /// Vertical reaction (kN), positive upward
    pub force: Bounds,
    /// Reaction moment (kNm)
    pub moment: Bounds,
}

/// Envelope of all evaluations of one limit state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Limit state
    pub limit_state: LimitState,
    /// Sample positions (m)
    pub positions: Vec<f64>,
    /// Evaluations in run order; bounds refer to them by index
    pub sources: Vec<Provenance>,
    /// Bending moment (kNm)
    pub moment: QuantityEnvelope,
    /// Shear force (kN)
    pub shear: QuantityEnvelope,
    /// Deflection (m, positive downward)
    pub deflection: QuantityEnvelope,
    /// Reactions per support, left to right
    pub reactions: Vec<ReactionEnvelope>,
}

impl Envelope {
    /// Provenance of a source index
    pub fn source(&self, index: usize) -> &Provenance {
        &self.sources[index]
    }

    /// Largest sagging moment
    pub fn max_moment(&self) -> Option<Extreme> {
        self.moment.peak_max(&self.positions)
    }

    /// Largest hogging moment (most negative)
    pub fn min_moment(&self) -> Option<Extreme> {
        self.moment.peak_min(&self.positions)
    }

    /// Largest shear magnitude
    pub fn max_abs_shear(&self) -> Option<Extreme> {
        self.shear.absolute(&self.positions)
    }

    /// Largest deflection magnitude
    pub fn max_abs_deflection(&self) -> Option<Extreme> {
        self.deflection.absolute(&self.positions)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true when there are no samples
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Running bounds of an envelope that is still being built
#[derive(Debug, Clone)]
struct Partial {
    positions: Vec<f64>,
    sources: Vec<Provenance>,
    moment: Vec<Bounds>,
    shear: Vec<Bounds>,
    deflection: Vec<Bounds>,
    reactions: Vec<ReactionEnvelope>,
}

impl Partial {
    fn seed(result: &EvaluationResult, provenance: Provenance) -> Self {
        let seed = |values: &[f64]| -> Vec<Bounds> { values.iter().map(|v| Bounds::new(*v, 0)).collect() };
        Partial {
            positions: result.samples.positions.clone(),
            sources: vec![provenance],
            moment: seed(&result.samples.moment),
            shear: seed(&result.samples.shear),
            deflection: seed(&result.samples.deflection),
            reactions: result
                .reactions
                .iter()
                .map(|r| ReactionEnvelope {
                    node: r.node,
                    position: r.position,
                    force: Bounds::new(r.force, 0),
                    moment: Bounds::new(r.moment, 0),
                })
                .collect(),
        }
    }

    fn update(&mut self, result: &EvaluationResult, provenance: Provenance) -> CalcResult<()> {
        if result.samples.positions != self.positions {
            return Err(CalcError::internal(format!(
                "Sample positions of {} differ from {}",
                result.combination, self.sources[0].combination
            )));
        }

        let source = self.sources.len();
        self.sources.push(provenance);
        for (bounds, values) in [
            (&mut self.moment, &result.samples.moment),
            (&mut self.shear, &result.samples.shear),
            (&mut self.deflection, &result.samples.deflection),
        ] {
            for (b, v) in bounds.iter_mut().zip(values) {
                b.update(*v, source);
            }
        }
        for (envelope, reaction) in self.reactions.iter_mut().zip(&result.reactions) {
            envelope.force.update(reaction.force, source);
            envelope.moment.update(reaction.moment, source);
        }
        Ok(())
    }
}

/// Folds evaluation results into one envelope.
///
/// Results are added one at a time in run order; only the running bounds are
/// kept, never the curves.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    limit_state: LimitState,
    kinds: Vec<CombinationKind>,
    partial: Option<Partial>,
}

impl EnvelopeBuilder {
    /// Builder for one limit state
    pub fn new(limit_state: LimitState) -> Self {
        EnvelopeBuilder {
            limit_state,
            kinds: Vec::new(),
            partial: None,
        }
    }

    /// Builder: restrict the envelope to some combination families
    pub fn only(mut self, kinds: &[CombinationKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    fn includes(&self, result: &EvaluationResult) -> bool {
        result.limit_state == self.limit_state && (self.kinds.is_empty() || self.kinds.contains(&result.kind))
    }

    /// Fold one result into the envelope; returns false if the filter
    /// excludes it.
    ///
    /// # Errors
    ///
    /// `Internal` if the result was sampled at other positions than the
    /// results before it.
    pub fn add(&mut self, result: &EvaluationResult) -> CalcResult<bool> {
        if !self.includes(result) {
            return Ok(false);
        }
        let provenance = Provenance {
            combination: result.combination.clone(),
            pattern: result.pattern.clone(),
        };
        match self.partial.as_mut() {
            Some(partial) => partial.update(result, provenance)?,
            None => self.partial = Some(Partial::seed(result, provenance)),
        }
        Ok(true)
    }

    /// The finished envelope, or None if no result was included
    pub fn finish(self) -> Option<Envelope> {
        let limit_state = self.limit_state;
        self.partial.map(|p| Envelope {
            limit_state,
            positions: p.positions,
            sources: p.sources,
            moment: QuantityEnvelope::from_bounds(&p.moment),
            shear: QuantityEnvelope::from_bounds(&p.shear),
            deflection: QuantityEnvelope::from_bounds(&p.deflection),
            reactions: p.reactions,
        })
    }

    /// Envelope of a slice of results, or None if the filter excludes all.
    ///
    /// # Errors
    ///
    /// `Internal` if two results were sampled at different positions.
    pub fn build(&self, results: &[EvaluationResult]) -> CalcResult<Option<Envelope>> {
        let mut builder = EnvelopeBuilder::new(self.limit_state).only(&self.kinds);
        for result in results {
            builder.add(result)?;
        }
        Ok(builder.finish())
    }
}

/// Envelopes of one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelopes {
    /// All ultimate combinations
    pub ultimate: Option<Envelope>,
    /// All serviceability combinations
    pub serviceability: Option<Envelope>,
    /// Characteristic and permanent-only serviceability combinations
    pub characteristic: Option<Envelope>,
    /// Quasi-permanent and permanent-only serviceability combinations
    pub quasi_permanent: Option<Envelope>,
}

/// Feeds every result to the builders of all [`Envelopes`]
#[derive(Debug, Clone)]
pub struct EnvelopeCollector {
    ultimate: EnvelopeBuilder,
    serviceability: EnvelopeBuilder,
    characteristic: EnvelopeBuilder,
    quasi_permanent: EnvelopeBuilder,
}

impl Default for EnvelopeCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeCollector {
    /// Collector with empty builders
    pub fn new() -> Self {
        use CombinationKind::*;
        EnvelopeCollector {
            ultimate: EnvelopeBuilder::new(LimitState::Ultimate),
            serviceability: EnvelopeBuilder::new(LimitState::Serviceability),
            characteristic: EnvelopeBuilder::new(LimitState::Serviceability).only(&[Characteristic, PermanentOnly]),
            quasi_permanent: EnvelopeBuilder::new(LimitState::Serviceability).only(&[QuasiPermanent, PermanentOnly]),
        }
    }

    /// Fold one result into every envelope that includes it
    pub fn add(&mut self, result: &EvaluationResult) -> CalcResult<()> {
        for builder in [
            &mut self.ultimate,
            &mut self.serviceability,
            &mut self.characteristic,
            &mut self.quasi_permanent,
        ] {
            builder.add(result)?;
        }
        Ok(())
    }

    /// The finished envelopes
    pub fn finish(self) -> Envelopes {
        Envelopes {
            ultimate: self.ultimate.finish(),
            serviceability: self.serviceability.finish(),
            characteristic: self.characteristic.finish(),
            quasi_permanent: self.quasi_permanent.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::runner::SupportReaction;
    use crate::fem::FieldSamples;
    use crate::loads::LoadDurationClass;

    fn result(name: &str, limit_state: LimitState, moment: Vec<f64>, reaction: f64) -> EvaluationResult {
        let n = moment.len();
        let samples = FieldSamples {
            positions: (0..n).map(|i| i as f64).collect(),
            deflection: moment.iter().map(|m| m / 100.0).collect(),
            slope: vec![0.0; n],
            shear: vec![1.0; n],
            moment,
        };
        EvaluationResult {
            combination: name.to_string(),
            pattern: "all".to_string(),
            limit_state,
            kind: CombinationKind::SingleVariable,
            duration: LoadDurationClass::MediumTerm,
            samples,
            reactions: vec![SupportReaction {
                node: 0,
                position: 0.0,
                force: reaction,
                moment: 0.0,
            }],
        }
    }

    #[test]
    fn test_pointwise_bounds_and_provenance() {
        let results = vec![
            result("A", LimitState::Ultimate, vec![0.0, 5.0, -1.0], 3.0),
            result("B", LimitState::Ultimate, vec![0.0, 4.0, -6.0], 7.0),
        ];
        let envelope = EnvelopeBuilder::new(LimitState::Ultimate).build(&results).unwrap().unwrap();

        assert_eq!(envelope.moment.max, vec![0.0, 5.0, -1.0]);
        assert_eq!(envelope.moment.min, vec![0.0, 4.0, -6.0]);
        assert_eq!(envelope.source(envelope.moment.max_source[1]).combination, "A");
        assert_eq!(envelope.source(envelope.moment.min_source[2]).combination, "B");

        let hogging = envelope.min_moment().unwrap();
        assert_eq!(hogging.value, -6.0);
        assert_eq!(hogging.position, 2.0);
        assert_eq!(envelope.max_moment().unwrap().value, 5.0);
        assert_eq!(envelope.moment.absolute(&envelope.positions).unwrap().value, -6.0);

        assert_eq!(envelope.reactions[0].force.max, 7.0);
        assert_eq!(envelope.reactions[0].force.min, 3.0);
        assert_eq!(envelope.source(envelope.reactions[0].force.max_source).combination, "B");
    }

    #[test]
    fn test_ties_keep_first_source() {
        let results = vec![
            result("first", LimitState::Ultimate, vec![2.0, 2.0], 1.0),
            result("second", LimitState::Ultimate, vec![2.0, 2.0], 1.0),
        ];
        let envelope = EnvelopeBuilder::new(LimitState::Ultimate).build(&results).unwrap().unwrap();
        assert!(envelope.moment.max_source.iter().all(|s| *s == 0));
        assert!(envelope.moment.min_source.iter().all(|s| *s == 0));
        assert_eq!(envelope.max_moment().unwrap().position, 0.0);
    }

    #[test]
    fn test_filters_by_limit_state() {
        let results = vec![
            result("GZT", LimitState::Ultimate, vec![10.0], 1.0),
            result("GZG", LimitState::Serviceability, vec![3.0], 1.0),
        ];
        let service = EnvelopeBuilder::new(LimitState::Serviceability).build(&results).unwrap().unwrap();
        assert_eq!(service.sources.len(), 1);
        assert_eq!(service.moment.max, vec![3.0]);

        let none = EnvelopeBuilder::new(LimitState::Ultimate).build(&results[1..]).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_filters_by_kind() {
        let mut quasi = result("GZG-qp/Q", LimitState::Serviceability, vec![1.0], 1.0);
        quasi.kind = CombinationKind::QuasiPermanent;
        let results = vec![result("GZG-char/Q", LimitState::Serviceability, vec![4.0], 1.0), quasi];

        let envelope = EnvelopeBuilder::new(LimitState::Serviceability)
            .only(&[CombinationKind::QuasiPermanent])
            .build(&results)
            .unwrap()
            .unwrap();
        assert_eq!(envelope.sources[0].combination, "GZG-qp/Q");
        assert_eq!(envelope.moment.max, vec![1.0]);
    }

    #[test]
    fn test_incremental_add_matches_build() {
        let results = vec![
            result("A", LimitState::Ultimate, vec![0.0, 5.0, -1.0], 3.0),
            result("GZG", LimitState::Serviceability, vec![9.0, 9.0, 9.0], 1.0),
            result("B", LimitState::Ultimate, vec![1.0, 4.0, -6.0], 7.0),
        ];
        let mut builder = EnvelopeBuilder::new(LimitState::Ultimate);
        let included: Vec<bool> = results.iter().map(|r| builder.add(r).unwrap()).collect();
        assert_eq!(included, vec![true, false, true]);

        let built = EnvelopeBuilder::new(LimitState::Ultimate).build(&results).unwrap();
        assert_eq!(builder.finish(), built);
        assert!(EnvelopeBuilder::new(LimitState::Ultimate).finish().is_none());
    }

    #[test]
    fn test_collector_splits_families() {
        let mut characteristic = result("GZG-char/Q", LimitState::Serviceability, vec![4.0], 1.0);
        characteristic.kind = CombinationKind::Characteristic;
        let mut quasi = result("GZG-qp/Q", LimitState::Serviceability, vec![1.0], 1.0);
        quasi.kind = CombinationKind::QuasiPermanent;
        let mut permanent = result("GZG-G", LimitState::Serviceability, vec![0.5], 1.0);
        permanent.kind = CombinationKind::PermanentOnly;

        let mut collector = EnvelopeCollector::new();
        for r in [&characteristic, &quasi, &permanent] {
            collector.add(r).unwrap();
        }
        let envelopes = collector.finish();

        assert!(envelopes.ultimate.is_none());
        assert_eq!(envelopes.serviceability.unwrap().sources.len(), 3);
        let char_sources: Vec<String> =
            envelopes.characteristic.unwrap().sources.into_iter().map(|s| s.combination).collect();
        assert_eq!(char_sources, vec!["GZG-char/Q", "GZG-G"]);
        let qp = envelopes.quasi_permanent.unwrap();
        assert_eq!(qp.moment.max, vec![1.0]);
        assert_eq!(qp.source(qp.moment.min_source[0]).combination, "GZG-G");
    }

    #[test]
    fn test_mismatched_positions() {
        let mut results = vec![
            result("A", LimitState::Ultimate, vec![1.0, 2.0], 1.0),
            result("B", LimitState::Ultimate, vec![1.0, 2.0], 1.0),
        ];
        results[1].samples.positions[1] = 1.5;
        let error = EnvelopeBuilder::new(LimitState::Ultimate).build(&results).unwrap_err();
        assert!(matches!(error, CalcError::Internal { .. }));
    }
}
