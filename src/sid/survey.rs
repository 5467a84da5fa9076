#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Survey Propagation: the message-passing fixed-point iteration at the heart
//! of SID.
//!
//! Each clause→variable edge carries a survey η, the probability that the
//! clause sends a warning to the variable. Surveys are initialized uniformly
//! at random and updated sequentially, in a freshly shuffled edge order every
//! sweep, with the Mézard–Parisi–Zecchina equations (26) and (27) for random
//! k-SAT. The iteration stops when every survey moved by less than
//! `sp_epsilon` in a sweep, or after `sp_max_iterations` sweeps.
//!
//! Non-convergence is not an error: the driver treats it as a signal to give
//! up on the current run.

use crate::sid::config::SidConfig;
use crate::sid::graph::{EdgeId, FactorGraph};
use crate::sid::random::SolverRng;

/// Outcome of one Survey Propagation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpResult {
    /// Whether every survey settled within `sp_epsilon`.
    pub converged: bool,
    /// Number of full sweeps performed.
    pub iterations: u32,
}

/// Runs Survey Propagation on the graph's current enabled-edge set.
///
/// SP never enables or disables anything, so the edge list is collected once
/// and stays valid for the whole call. Updates are in-place: each edge's new
/// survey is visible to the edges updated after it in the same sweep.
pub fn survey_propagation(
    graph: &mut FactorGraph,
    rng: &mut SolverRng,
    config: &SidConfig,
) -> SpResult {
    let mut edges = graph.enabled_edges();
    for &e in &edges {
        graph.edge_mut(e).survey = rng.real01();
    }

    let mut converged = false;
    let mut iterations = 0;
    while iterations < config.sp_max_iterations && !converged {
        rng.shuffle(&mut edges);

        converged = true;
        for &e in &edges {
            let previous = graph.edge(e).survey;
            let updated = update_survey(graph, e);
            graph.edge_mut(e).survey = updated;
            if (updated - previous).abs() >= config.sp_epsilon {
                converged = false;
            }
        }

        iterations += 1;
    }

    SpResult {
        converged,
        iterations,
    }
}

/// Computes the new survey for edge `a→i` from the current surveys of the
/// neighbouring edges.
///
/// For every other enabled edge `a→j` of the same clause, the cavity products
/// over the edges `b→j` of variable `j` (excluding `a→j` itself) yield the
/// probabilities that `j` is forced towards (`Pu`), forced away from (`Ps`),
/// or unconstrained by (`P0`) the clause. The survey is the product over `j`
/// of `Pu / (Pu + Ps + P0)`.
///
/// A `0/0` ratio collapses the whole survey to the trivial value 0; the
/// driver's WalkSAT-fallback branch tests for exactly that bitwise zero.
fn update_survey(graph: &FactorGraph, ai: EdgeId) -> f64 {
    let clause = graph.edge(ai).clause;
    let mut survey = 1.0;

    for aj in graph.enabled_clause_edges(clause) {
        if aj == ai {
            continue;
        }
        let j = graph.edge(aj).variable;
        let aj_polarity = graph.edge(aj).polarity;

        let mut unsatisfying = 1.0;
        let mut satisfying = 1.0;
        let mut total = 1.0;
        for bj in graph.enabled_variable_edges(j) {
            if bj == aj {
                continue;
            }
            let edge = graph.edge(bj);
            if edge.polarity == aj_polarity {
                satisfying *= 1.0 - edge.survey;
            } else {
                unsatisfying *= 1.0 - edge.survey;
            }
            total *= 1.0 - edge.survey;
        }

        let forced_towards = (1.0 - unsatisfying) * satisfying;
        let forced_away = (1.0 - satisfying) * unsatisfying;
        let unconstrained = total;

        let ratio = forced_towards / (forced_towards + forced_away + unconstrained);
        if ratio.is_nan() {
            return 0.0;
        }
        survey *= ratio;
    }

    survey
}
