//! This crate implements Survey Inspired Decimation (SID), a statistical-physics-derived
//! solver for random k-SAT instances near the satisfiability threshold.
//!
//! SID combines Survey Propagation (a message-passing fixed-point iteration over a
//! factor graph), Unit Propagation (classical Boolean constraint propagation), and
//! WalkSAT (randomized local search) into a single solve loop driven by fractional
//! bias-guided decimation.

/// The `sid` module implements the solver core: the factor graph, the
/// message-passing and propagation algorithms, and the decimation driver.
pub mod sid;
