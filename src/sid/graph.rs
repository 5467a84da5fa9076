#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::cast_possible_truncation)]
//! The mutable bipartite factor graph the whole pipeline operates on.
//!
//! Variables and clauses are the two node kinds; edges carry the sign of the
//! literal connecting them and the current survey message. All three are kept
//! in parallel arenas addressed by 32-bit ids, with per-node adjacency lists of
//! `EdgeId`, so the cyclic variable/clause/edge cross-references never turn
//! into cyclic ownership.
//!
//! Clauses and edges are logically removed by flipping an `enabled` flag; the
//! arenas are never shrunk during a solve. "Enabled view" queries filter on
//! those flags: an edge is effectively present iff it is enabled and its
//! clause is enabled. Disabling is monotone within a solve, which is what
//! guarantees termination of the propagation loops.

use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::Display;

/// Index of a variable in the graph's variable arena (0-based; the matching
/// DIMACS id is one greater).
pub type VariableId = u32;

/// Index of a clause in the graph's clause arena.
pub type ClauseId = u32;

/// Index of an edge in the graph's edge arena.
pub type EdgeId = u32;

/// A variable node.
///
/// `value` is meaningful only while `assigned` is true. `bias` caches the
/// latest SP-derived evaluation (`W+ − W−`) for the decimation sort.
#[derive(Debug, Clone, Default)]
pub struct Variable {
    /// Current truth value, valid only when `assigned`.
    pub value: bool,
    /// Whether the variable has been fixed by decimation, UP or WalkSAT.
    pub assigned: bool,
    /// Latest bias estimate in `[-1, 1]`.
    pub bias: f64,
    edges: Vec<EdgeId>,
}

/// A clause node. Disabled clauses are logically removed (satisfied).
#[derive(Debug, Clone)]
pub struct Clause {
    /// Whether the clause still participates in solving.
    pub enabled: bool,
    edges: SmallVec<[EdgeId; 4]>,
}

/// A signed incidence between exactly one clause and one variable.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The clause side of the incidence.
    pub clause: ClauseId,
    /// The variable side of the incidence.
    pub variable: VariableId,
    /// `true` when the variable appears unnegated in the clause.
    pub polarity: bool,
    /// Whether the literal is still part of the reduced formula.
    pub enabled: bool,
    /// The SP message (η) from the clause to the variable, in `[0, 1]`.
    pub survey: f64,
}

/// The factor graph. Owns every variable, clause and edge for the lifetime of
/// a solve; other components refer to them by id.
#[derive(Debug, Clone, Default)]
pub struct FactorGraph {
    variables: Vec<Variable>,
    clauses: Vec<Clause>,
    edges: Vec<Edge>,
}

impl FactorGraph {
    /// Creates a graph with `num_variables` unassigned variables and no clauses.
    #[must_use]
    pub fn with_variables(num_variables: usize) -> Self {
        Self {
            variables: vec![Variable::default(); num_variables],
            clauses: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Appends a clause over `literals`, each a `(variable, polarity)` pair.
    ///
    /// One edge is created per literal with `survey = 0` and everything
    /// enabled. Callers are responsible for validating the literals (the
    /// DIMACS parser rejects out-of-range and duplicate variables before
    /// reaching this point).
    ///
    /// # Panics
    ///
    /// Panics if a literal names a variable the graph does not hold.
    pub fn push_clause(&mut self, literals: &[(VariableId, bool)]) -> ClauseId {
        let clause_id = self.clauses.len() as ClauseId;
        let mut clause_edges = SmallVec::new();
        for &(variable, polarity) in literals {
            assert!(
                (variable as usize) < self.variables.len(),
                "literal names variable {variable} outside the graph"
            );
            let edge_id = self.edges.len() as EdgeId;
            self.edges.push(Edge {
                clause: clause_id,
                variable,
                polarity,
                enabled: true,
                survey: 0.0,
            });
            self.variables[variable as usize].edges.push(edge_id);
            clause_edges.push(edge_id);
        }
        self.clauses.push(Clause {
            enabled: true,
            edges: clause_edges,
        });
        clause_id
    }

    /// Number of variables in the arena (assigned or not).
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of clauses in the arena (enabled or not).
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Number of edges in the arena (enabled or not).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Borrows a variable.
    #[must_use]
    pub fn variable(&self, v: VariableId) -> &Variable {
        &self.variables[v as usize]
    }

    /// Mutably borrows a variable (bias updates).
    pub fn variable_mut(&mut self, v: VariableId) -> &mut Variable {
        &mut self.variables[v as usize]
    }

    /// Borrows a clause.
    #[must_use]
    pub fn clause(&self, c: ClauseId) -> &Clause {
        &self.clauses[c as usize]
    }

    /// Borrows an edge.
    #[must_use]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e as usize]
    }

    /// Mutably borrows an edge (survey updates).
    pub fn edge_mut(&mut self, e: EdgeId) -> &mut Edge {
        &mut self.edges[e as usize]
    }

    /// Ids of all enabled clauses, materialized so callers may mutate the
    /// graph while iterating. The sequence reflects the flags at call time.
    #[must_use]
    pub fn enabled_clauses(&self) -> Vec<ClauseId> {
        self.clauses
            .iter()
            .enumerate()
            .filter(|(_, clause)| clause.enabled)
            .map(|(c, _)| c as ClauseId)
            .collect_vec()
    }

    /// Ids of all effectively-present edges: edge enabled and clause enabled.
    #[must_use]
    pub fn enabled_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.enabled && self.clauses[edge.clause as usize].enabled)
            .map(|(e, _)| e as EdgeId)
            .collect_vec()
    }

    /// Enabled edges of one clause, in adjacency order.
    ///
    /// Filters on the edge flag only; whether the clause itself is enabled is
    /// the caller's concern (propagation needs to inspect the edges of a
    /// clause it is about to disable).
    pub fn enabled_clause_edges(&self, c: ClauseId) -> impl Iterator<Item = EdgeId> + '_ {
        self.clauses[c as usize]
            .edges
            .iter()
            .copied()
            .filter(|&e| self.edges[e as usize].enabled)
    }

    /// Enabled edges incident to one variable: edge enabled and its clause
    /// enabled, in adjacency order.
    pub fn enabled_variable_edges(&self, v: VariableId) -> impl Iterator<Item = EdgeId> + '_ {
        self.variables[v as usize]
            .edges
            .iter()
            .copied()
            .filter(|&e| {
                let edge = &self.edges[e as usize];
                edge.enabled && self.clauses[edge.clause as usize].enabled
            })
    }

    /// Ids of the variables not yet fixed.
    #[must_use]
    pub fn unassigned_variables(&self) -> Vec<VariableId> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, variable)| !variable.assigned)
            .map(|(v, _)| v as VariableId)
            .collect_vec()
    }

    /// Logically removes one literal occurrence. Never re-enabled in a solve.
    pub fn disable_edge(&mut self, e: EdgeId) {
        self.edges[e as usize].enabled = false;
    }

    /// Logically removes a clause (proven satisfied). Never re-enabled in a
    /// solve.
    pub fn disable_clause(&mut self, c: ClauseId) {
        self.clauses[c as usize].enabled = false;
    }

    /// Fixes a variable to `value`. Does not propagate; simplification is the
    /// caller's job.
    pub fn assign(&mut self, v: VariableId, value: bool) {
        let variable = &mut self.variables[v as usize];
        variable.assigned = true;
        variable.value = value;
    }

    /// Clears a variable's assignment. Used by WalkSAT to restore the
    /// entering assignment when it exhausts its flip budget.
    pub fn unassign(&mut self, v: VariableId) {
        self.variables[v as usize].assigned = false;
    }

    /// Toggles the value of an assigned variable (local-search flip).
    pub fn flip(&mut self, v: VariableId) {
        let variable = &mut self.variables[v as usize];
        variable.value = !variable.value;
    }

    /// Whether `c` currently contains a satisfied literal: an enabled edge
    /// whose variable is assigned with `value == polarity`.
    #[must_use]
    pub fn clause_is_satisfied(&self, c: ClauseId) -> bool {
        self.clauses[c as usize].edges.iter().any(|&e| {
            let edge = &self.edges[e as usize];
            let variable = &self.variables[edge.variable as usize];
            edge.enabled && variable.assigned && variable.value == edge.polarity
        })
    }

    /// Whether every originally created clause is either disabled (satisfied
    /// by construction of the algorithms) or contains a satisfied literal.
    #[must_use]
    pub fn is_sat(&self) -> bool {
        (0..self.clauses.len() as ClauseId)
            .all(|c| !self.clauses[c as usize].enabled || self.clause_is_satisfied(c))
    }

    /// Re-checks the current assignment against the original formula,
    /// ignoring every enabled flag. This is the soundness check: a disabled
    /// clause was only ever disabled because some literal satisfied it, and
    /// this verifies that claim from scratch.
    #[must_use]
    pub fn is_model(&self) -> bool {
        self.clauses.iter().all(|clause| {
            clause.edges.iter().any(|&e| {
                let edge = &self.edges[e as usize];
                let variable = &self.variables[edge.variable as usize];
                variable.assigned && variable.value == edge.polarity
            })
        })
    }

    /// The current assignment, one entry per variable.
    #[must_use]
    pub fn assignment(&self) -> Vec<Option<bool>> {
        self.variables
            .iter()
            .map(|variable| variable.assigned.then_some(variable.value))
            .collect_vec()
    }

    /// Count of effectively-present edges; used by the monotonicity checks.
    #[must_use]
    pub fn enabled_edge_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.enabled && self.clauses[edge.clause as usize].enabled)
            .count()
    }

    /// Count of enabled clauses.
    #[must_use]
    pub fn enabled_clause_count(&self) -> usize {
        self.clauses.iter().filter(|clause| clause.enabled).count()
    }
}

impl Display for FactorGraph {
    /// Serializes the original (un-decimated) topology in DIMACS CNF format.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "c generated by survey_sat")?;
        writeln!(f, "p cnf {} {}", self.variables.len(), self.clauses.len())?;
        for clause in &self.clauses {
            for &e in &clause.edges {
                let edge = &self.edges[e as usize];
                let id = i64::from(edge.variable) + 1;
                write!(f, "{} ", if edge.polarity { id } else { -id })?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::dimacs::parse_dimacs_text;

    fn three_clause_graph() -> FactorGraph {
        // (x1 v x2 v x3) & (!x1 v x2) & (!x2 v !x3)
        let mut graph = FactorGraph::with_variables(3);
        graph.push_clause(&[(0, true), (1, true), (2, true)]);
        graph.push_clause(&[(0, false), (1, true)]);
        graph.push_clause(&[(1, false), (2, false)]);
        graph
    }

    #[test]
    fn adjacency_is_wired_both_ways() {
        let graph = three_clause_graph();
        assert_eq!(graph.num_variables(), 3);
        assert_eq!(graph.num_clauses(), 3);
        assert_eq!(graph.num_edges(), 7);
        assert_eq!(graph.enabled_variable_edges(1).count(), 3);
        assert_eq!(graph.enabled_clause_edges(0).count(), 3);
    }

    #[test]
    fn enabled_views_follow_the_flags() {
        let mut graph = three_clause_graph();
        assert_eq!(graph.enabled_edges().len(), 7);

        graph.disable_clause(0);
        // The clause's three edges drop out of the global and variable views.
        assert_eq!(graph.enabled_edges().len(), 4);
        assert_eq!(graph.enabled_clauses(), vec![1, 2]);
        assert_eq!(graph.enabled_variable_edges(0).count(), 1);

        let falsified = graph.enabled_variable_edges(0).next().unwrap();
        graph.disable_edge(falsified);
        assert_eq!(graph.enabled_variable_edges(0).count(), 0);
        assert_eq!(graph.enabled_edges().len(), 3);
    }

    #[test]
    fn disabling_is_monotone() {
        let mut graph = three_clause_graph();
        let mut edges = graph.enabled_edge_count();
        let mut clauses = graph.enabled_clause_count();
        for e in 0..graph.num_edges() as EdgeId {
            graph.disable_edge(e);
            assert!(graph.enabled_edge_count() <= edges);
            edges = graph.enabled_edge_count();
        }
        for c in 0..graph.num_clauses() as ClauseId {
            graph.disable_clause(c);
            assert!(graph.enabled_clause_count() <= clauses);
            clauses = graph.enabled_clause_count();
        }
    }

    #[test]
    fn sat_requires_every_clause_handled() {
        let mut graph = three_clause_graph();
        assert!(!graph.is_sat());

        graph.assign(0, false);
        graph.assign(1, true);
        graph.assign(2, false);
        // x1=F, x2=T, x3=F satisfies all three clauses without any disabling.
        assert!(graph.is_sat());
        assert!(graph.is_model());

        graph.flip(1);
        assert!(!graph.is_sat());
        assert!(!graph.is_model());
    }

    #[test]
    fn disabled_clauses_count_as_satisfied_for_is_sat_only() {
        let mut graph = three_clause_graph();
        graph.disable_clause(0);
        graph.disable_clause(1);
        graph.disable_clause(2);
        assert!(graph.is_sat());
        // No assignment exists, so the model re-check must fail.
        assert!(!graph.is_model());
    }

    #[test]
    fn assignment_reports_partial_state() {
        let mut graph = three_clause_graph();
        graph.assign(1, true);
        assert_eq!(graph.assignment(), vec![None, Some(true), None]);
        assert_eq!(graph.unassigned_variables(), vec![0, 2]);
    }

    #[test]
    fn dimacs_round_trip() {
        let graph = three_clause_graph();
        let text = graph.to_string();
        let reparsed = parse_dimacs_text(&text).expect("round-trip parse");

        assert_eq!(reparsed.num_variables(), graph.num_variables());
        assert_eq!(reparsed.num_clauses(), graph.num_clauses());
        assert_eq!(reparsed.num_edges(), graph.num_edges());
        for c in 0..graph.num_clauses() as ClauseId {
            let original: Vec<(VariableId, bool)> = graph
                .enabled_clause_edges(c)
                .map(|e| (graph.edge(e).variable, graph.edge(e).polarity))
                .collect();
            let round_tripped: Vec<(VariableId, bool)> = reparsed
                .enabled_clause_edges(c)
                .map(|e| (reparsed.edge(e).variable, reparsed.edge(e).polarity))
                .collect();
            assert_eq!(original, round_tripped);
        }
    }
}
