//! Tunable parameters threaded through the engine
//!
//! Mirrors the small `*Config` structs the teacher passes through its
//! subsystems (`FailoverConfig`, `VllmConfig`) instead of hardcoding
//! magic numbers at the call site.

use serde::{Deserialize, Serialize};

/// Weights used by the contextual-load and benefit functions (`a`, `b` in the spec).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Weight on load/cost terms
    pub a: f64,
    /// Weight on survivability/completion terms
    pub b: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self { a: 0.1, b: 0.9 }
    }
}

/// Top-level knobs for a single run of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Fraction of agents injected with a functional fault (`p` in the spec, default 0.3)
    pub fault_ratio: f64,

    /// Weights used by the evaluator's `targetOpt` composite score
    pub eval_weights: WeightConfig,

    /// Weights used by HGTM's contextual load / benefit functions
    pub hgtm_weights: WeightConfig,

    /// MPFTM's travel-vs-congestion balance (`alpha` in the spec's gradient descent)
    pub mpftm_alpha: f64,

    /// RNG seed for the two-valued interaction-level draw (the only randomness in the engine)
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fault_ratio: 0.3,
            eval_weights: WeightConfig::default(),
            hgtm_weights: WeightConfig::default(),
            mpftm_alpha: 0.5,
            seed: 0,
        }
    }
}
