//! # Analysis Settings
//!
//! Numerical knobs shared by every evaluation of one beam. Settings are plain
//! data: they serialize to JSON alongside the beam input and every field has
//! a default, so a partial JSON object is a valid configuration.
//!
//! ```rust
//! use beam_core::settings::AnalysisSettings;
//!
//! let settings: AnalysisSettings =
//!     serde_json::from_str(r#"{ "elements_per_meter": 20.0 }"#).unwrap();
//! assert_eq!(settings.elements_per_meter, 20.0);
//! assert_eq!(settings.max_pattern_fields, 10);
//! assert!(settings.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Discretization, sampling and scheduling settings for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Element density along the beam (elements per metre).
    ///
    /// The same density applies to interior fields and cantilevers.
    pub elements_per_meter: f64,

    /// Lower bound on the number of elements in any field or cantilever
    pub min_elements_per_segment: usize,

    /// Sample points per element, both element ends included
    pub samples_per_element: usize,

    /// Ceiling on the total number of elements of one beam
    pub max_elements: usize,

    /// Largest number of interior fields for which pattern loading is
    /// enumerated (2^N - 1 patterns)
    pub max_pattern_fields: usize,

    /// Evaluate (combination, pattern) pairs on the rayon thread pool
    pub parallel: bool,

    /// Keep the sampled curves of every pair in the result.
    ///
    /// Off by default: the curves are folded into the envelopes and dropped,
    /// since their number grows with 2^N patterns.
    pub keep_curves: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            elements_per_meter: 10.0,
            min_elements_per_segment: 4,
            samples_per_element: 5,
            max_elements: 2_000,
            max_pattern_fields: 10,
            parallel: true,
            keep_curves: false,
        }
    }
}

impl AnalysisSettings {
    /// Hard ceiling for `max_pattern_fields` (2^20 - 1 patterns)
    pub const PATTERN_FIELD_LIMIT: usize = 20;

    /// Builder: set the element density
    pub fn with_density(mut self, elements_per_meter: f64) -> Self {
        self.elements_per_meter = elements_per_meter;
        self
    }

    /// Builder: set sample points per element
    pub fn with_samples_per_element(mut self, samples: usize) -> Self {
        self.samples_per_element = samples;
        self
    }

    /// Builder: run pairs sequentially on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Builder: keep the sampled curves of every pair
    pub fn with_curves(mut self) -> Self {
        self.keep_curves = true;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.elements_per_meter.is_finite() && self.elements_per_meter > 0.0) {
            return Err(CalcError::configuration(format!(
                "elements_per_meter must be a positive number, got {}",
                self.elements_per_meter
            )));
        }
        if self.min_elements_per_segment == 0 {
            return Err(CalcError::configuration(
                "min_elements_per_segment must be at least 1",
            ));
        }
        if self.max_elements < self.min_elements_per_segment {
            return Err(CalcError::configuration(format!(
                "max_elements {} is below min_elements_per_segment {}",
                self.max_elements, self.min_elements_per_segment
            )));
        }
        if self.samples_per_element < 2 {
            return Err(CalcError::configuration(format!(
                "samples_per_element must include both element ends (>= 2), got {}",
                self.samples_per_element
            )));
        }
        if self.max_pattern_fields > Self::PATTERN_FIELD_LIMIT {
            return Err(CalcError::configuration(format!(
                "max_pattern_fields {} exceeds the hard limit of {}",
                self.max_pattern_fields,
                Self::PATTERN_FIELD_LIMIT
            )));
        }
        Ok(())
    }
}
