#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The Survey Inspired Decimation driver.
//!
//! One round: run Survey Propagation; if it diverged, give up. If every
//! survey is exactly zero the surveys carry no information and the residual
//! graph goes to WalkSAT. Otherwise evaluate every unassigned variable's
//! bias, fix the most polarized fraction of them, simplify, and close under
//! Unit Propagation; a contradiction ends the run, a satisfied graph ends it
//! successfully, anything else starts the next round.

use crate::sid::config::SidConfig;
use crate::sid::graph::{FactorGraph, VariableId};
use crate::sid::propagation::{simplify_assigned, unit_propagation, Propagation};
use crate::sid::random::SolverRng;
use crate::sid::survey::survey_propagation;
use crate::sid::walksat::walksat;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::time::Instant;
use tracing::{debug, info};

/// The result record of one SID run.
#[derive(Debug, Clone, Copy)]
pub struct SidResult {
    /// Whether a satisfying assignment was found. `false` covers SP
    /// divergence, UP contradictions and WalkSAT exhaustion alike.
    pub sat: bool,
    /// Total SP sweeps accumulated over every round.
    pub total_sp_iterations: u32,
    /// Monotonic timestamp taken when the solve started.
    pub begin: Instant,
    /// Monotonic timestamp taken when the solve finished.
    pub end: Instant,
}

impl SidResult {
    /// Wall-clock duration of the solve.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.end.duration_since(self.begin)
    }
}

/// A single-use SID solver owning the factor graph for the duration of the
/// solve.
#[derive(Debug)]
pub struct Solver {
    graph: FactorGraph,
    rng: SolverRng,
    config: SidConfig,
}

impl Solver {
    /// Creates a solver with the default configuration.
    #[must_use]
    pub fn new(graph: FactorGraph, seed: u64) -> Self {
        Self::with_config(graph, seed, SidConfig::default())
    }

    /// Creates a solver with an explicit configuration.
    #[must_use]
    pub fn with_config(graph: FactorGraph, seed: u64, config: SidConfig) -> Self {
        Self {
            graph,
            rng: SolverRng::from_seed(seed),
            config,
        }
    }

    /// Borrows the graph (assignment extraction after a successful solve).
    #[must_use]
    pub fn graph(&self) -> &FactorGraph {
        &self.graph
    }

    /// Consumes the solver and returns the graph in its final state.
    #[must_use]
    pub fn into_graph(self) -> FactorGraph {
        self.graph
    }

    /// Runs Survey Inspired Decimation to completion.
    pub fn solve(&mut self) -> SidResult {
        let begin = Instant::now();
        let mut total_sp_iterations = 0;

        let sat = loop {
            let sp = survey_propagation(&mut self.graph, &mut self.rng, &self.config);
            total_sp_iterations += sp.iterations;
            if !sp.converged {
                info!(
                    iterations = sp.iterations,
                    "survey propagation did not converge"
                );
                break false;
            }

            if all_surveys_trivial(&self.graph) {
                let sat = walksat(&mut self.graph, &mut self.rng, &self.config);
                if sat {
                    info!("solved with walksat");
                } else {
                    info!("walksat exhausted its flip budget");
                }
                break sat;
            }

            let decimated = self.decimate();
            debug!(decimated, "decimation round complete");

            match unit_propagation(&mut self.graph) {
                Propagation::Contradiction => {
                    info!("unit propagation found a contradiction");
                    break false;
                }
                Propagation::Fixpoint => {
                    if self.graph.is_sat() {
                        info!("solved with unit propagation");
                        break true;
                    }
                }
            }
        };

        SidResult {
            sat,
            total_sp_iterations,
            begin,
            end: Instant::now(),
        }
    }

    /// Evaluates every unassigned variable's bias, then fixes the
    /// `max(1, ⌊n·fraction⌋)` most polarized ones to the sign of their bias
    /// and simplifies around them. Returns the number of variables fixed.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn decimate(&mut self) -> usize {
        let mut unassigned = self.graph.unassigned_variables();
        for &v in &unassigned {
            let bias = evaluate_variable(&self.graph, v);
            self.graph.variable_mut(v).bias = bias;
        }

        let count = ((unassigned.len() as f64 * self.config.fraction) as usize).max(1);
        let graph = &self.graph;
        unassigned.sort_by_key(|&v| Reverse(OrderedFloat(graph.variable(v).bias.abs())));

        for &v in unassigned.iter().take(count) {
            let value = self.graph.variable(v).bias > 0.0;
            self.graph.assign(v, value);
            simplify_assigned(&mut self.graph, v);
        }
        count.min(unassigned.len())
    }
}

/// Whether every effectively-present edge carries a bitwise-zero survey.
#[allow(clippy::float_cmp)]
fn all_surveys_trivial(graph: &FactorGraph) -> bool {
    graph
        .enabled_edges()
        .iter()
        .all(|&e| graph.edge(e).survey == 0.0)
}

/// Computes `W+ − W−` for a variable from the surveys on its enabled edges.
///
/// `PV+`/`PV−` are the products of `1 − η` over the positive/negative
/// occurrences, `PV0` over all of them. A NaN bias (the variable has no
/// enabled edges, or every product collapsed) is coerced to 0.
#[must_use]
pub fn evaluate_variable(graph: &FactorGraph, v: VariableId) -> f64 {
    let mut positive = 1.0;
    let mut negative = 1.0;
    let mut total = 1.0;
    for e in graph.enabled_variable_edges(v) {
        let edge = graph.edge(e);
        if edge.polarity {
            positive *= 1.0 - edge.survey;
        } else {
            negative *= 1.0 - edge.survey;
        }
        total *= 1.0 - edge.survey;
    }

    let towards_true = (1.0 - positive) * negative;
    let towards_false = (1.0 - negative) * positive;
    let unconstrained = total;

    let norm = towards_true + towards_false + unconstrained;
    let w_plus = towards_true / norm;
    let w_minus = towards_false / norm;
    if w_plus.is_nan() || w_minus.is_nan() {
        0.0
    } else {
        w_plus - w_minus
    }
}
