//! # Beam Calculations
//!
//! Everything above the finite-element model: evaluating combinations under
//! pattern loading, enveloping the results and verifying a timber member.
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Analysis` / `*Verification` - Results (JSON-serializable)
//! - a pure function returning `CalcResult<..>`
//!
//! ## Available Calculations
//!
//! - [`continuous_beam`] - Top-level analysis of a continuous beam ([`analyze`])
//! - [`runner`] - Evaluation of (combination, pattern) pairs
//! - [`envelope`] - Max/min envelopes with provenance
//! - [`verification`] - EN 1995 timber checks ([`verify_timber`])

pub mod continuous_beam;
pub mod envelope;
pub mod runner;
pub mod verification;

pub use continuous_beam::{analyze, BeamAnalysis, BeamInput};
pub use envelope::{
    Bounds,
    Envelope,
    EnvelopeBuilder,
    EnvelopeCollector,
    Envelopes,
    Extreme,
    Provenance,
    QuantityEnvelope,
    ReactionEnvelope,
};
pub use runner::{
    CancellationToken,
    CombinationRunner,
    EvaluationResult,
    EvaluationSummary,
    FailedEvaluation,
    Peak,
    RunOutput,
    SupportReaction,
};
pub use verification::{verify_timber, DeflectionCheck, StressCheck, TimberMember, TimberVerification};
