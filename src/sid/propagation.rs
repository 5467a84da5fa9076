#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit Propagation: the classical Boolean constraint propagation closure.
//!
//! The loop alternates two phases until fixpoint: assign every variable
//! forced by a unit clause (an enabled clause with exactly one enabled edge),
//! then simplify by disabling clauses that gained a satisfied literal and
//! edges whose literal became false. A contradiction is an enabled clause
//! with zero enabled edges, or a forced assignment conflicting with an
//! existing one.
//!
//! Termination is guaranteed: every pass that does not return strictly
//! decreases the number of enabled edges.

use crate::sid::graph::{FactorGraph, VariableId};
use itertools::Itertools;

/// Outcome of a propagation closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// No unit clauses remain and no conflict was found.
    Fixpoint,
    /// An empty clause or a conflicting forced assignment was derived.
    Contradiction,
}

/// Runs the unit-propagation closure on the graph.
///
/// Assignments made here are permanent for the solve; the caller decides what
/// a contradiction means (for the SID driver it ends the run with `SAT=false`).
pub fn unit_propagation(graph: &mut FactorGraph) -> Propagation {
    loop {
        // Unit collection. An enabled clause that already has no enabled
        // edges is an empty clause: decimation can produce one without ever
        // creating a unit, so it must be caught here and not only in the
        // cleanup phase below.
        let mut units = Vec::new();
        for c in graph.enabled_clauses() {
            let mut edges = graph.enabled_clause_edges(c);
            match (edges.next(), edges.next()) {
                (None, _) => return Propagation::Contradiction,
                (Some(e), None) => units.push(e),
                _ => {}
            }
        }
        if units.is_empty() {
            return Propagation::Fixpoint;
        }

        // Forced assignments. Two units over the same variable with opposite
        // signs conflict.
        for e in units {
            let variable = graph.edge(e).variable;
            let polarity = graph.edge(e).polarity;
            if graph.variable(variable).assigned {
                if graph.variable(variable).value != polarity {
                    return Propagation::Contradiction;
                }
            } else {
                graph.assign(variable, polarity);
            }
        }

        // Cleanup: a satisfied literal disables its whole clause (remaining
        // edges are left as they are); a falsified literal disables just its
        // edge. A clause that stays enabled but runs out of edges is empty.
        for c in graph.enabled_clauses() {
            for e in graph.enabled_clause_edges(c).collect_vec() {
                let polarity = graph.edge(e).polarity;
                let variable = graph.variable(graph.edge(e).variable);
                if !variable.assigned {
                    continue;
                }
                if variable.value == polarity {
                    graph.disable_clause(c);
                    break;
                }
                graph.disable_edge(e);
            }
            if graph.clause(c).enabled && graph.enabled_clause_edges(c).next().is_none() {
                return Propagation::Contradiction;
            }
        }
    }
}

/// Simplifies the graph around a variable that was just assigned: clauses
/// containing the now-true literal are disabled, edges carrying the now-false
/// literal are disabled.
///
/// This is the same reduction unit propagation's cleanup applies, exposed for
/// the decimation step, which fixes variables directly from their biases.
pub fn simplify_assigned(graph: &mut FactorGraph, v: VariableId) {
    let value = graph.variable(v).value;
    for e in graph.enabled_variable_edges(v).collect_vec() {
        if graph.edge(e).polarity == value {
            let clause = graph.edge(e).clause;
            graph.disable_clause(clause);
        } else {
            graph.disable_edge(e);
        }
    }
}
