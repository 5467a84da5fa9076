#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Tuning constants for the SID pipeline and the `SidConfig` runtime parameter set.
//!
//! The constants reproduce the reference defaults; `SidConfig` carries the same
//! values as runtime parameters so that experiments can override them per solve
//! without any semantic change.

/// Maximum number of full survey-update sweeps before SP is declared diverged.
pub const SP_MAX_ITERATIONS: u32 = 1000;

/// Convergence threshold: a sweep converges when every survey changed by less
/// than this amount.
pub const SP_EPSILON: f64 = 0.01;

/// Number of random restarts WalkSAT performs before giving up.
pub const WS_MAX_TRIES: u32 = 10;

/// Flip budget per WalkSAT try, scaled by the number of variables in the graph.
pub const WS_FLIPS_PER_VARIABLE: u32 = 100;

/// WalkSAT noise: probability of flipping a random clause variable instead of
/// the variable with the lowest break-count.
pub const WS_NOISE: f64 = 0.57;

/// Fraction of the unassigned variables fixed per decimation round.
pub const DEFAULT_FRACTION: f64 = 0.04;

/// Number of CNF instances per experiment data point.
pub const CNF_INSTANCES: u32 = 50;

/// Decimation fractions swept by the experiment harness, most aggressive first.
pub const EXPERIMENT_FRACTIONS: [f64; 6] = [0.04, 0.02, 0.01, 0.005, 0.0025, 0.001_25];

/// Runtime parameters for a single SID solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SidConfig {
    /// Cap on survey-update sweeps per SP call.
    pub sp_max_iterations: u32,
    /// Per-edge convergence threshold for SP.
    pub sp_epsilon: f64,
    /// WalkSAT restart budget.
    pub ws_max_tries: u32,
    /// WalkSAT flip budget per try, per variable.
    pub ws_flips_per_variable: u32,
    /// WalkSAT noise probability.
    pub ws_noise: f64,
    /// Fraction of unassigned variables decimated per round (at least one
    /// variable is always fixed).
    pub fraction: f64,
}

impl Default for SidConfig {
    fn default() -> Self {
        Self {
            sp_max_iterations: SP_MAX_ITERATIONS,
            sp_epsilon: SP_EPSILON,
            ws_max_tries: WS_MAX_TRIES,
            ws_flips_per_variable: WS_FLIPS_PER_VARIABLE,
            ws_noise: WS_NOISE,
            fraction: DEFAULT_FRACTION,
        }
    }
}

impl SidConfig {
    /// Returns the default configuration with a different decimation fraction.
    #[must_use]
    pub fn with_fraction(fraction: f64) -> Self {
        Self {
            fraction,
            ..Self::default()
        }
    }
}
