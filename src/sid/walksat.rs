#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! WalkSAT: randomized break-count-minimizing local search over complete
//! assignments of the residual graph.
//!
//! Each try assigns every still-unassigned variable a random value (decimated
//! assignments are kept fixed) and then flips variables of randomly chosen
//! unsatisfied clauses, preferring the variable whose flip breaks the fewest
//! currently-satisfied clauses. With probability `ws_noise` a random clause
//! variable is flipped instead of the best one.
//!
//! On failure the entering assignment is restored: variables that were
//! unassigned when the search started are unassigned again, so a later caller
//! never observes a half-finished random completion.

use crate::sid::config::SidConfig;
use crate::sid::graph::FactorGraph;
use crate::sid::random::SolverRng;
use itertools::Itertools;

/// Runs WalkSAT on the residual graph. Returns `true` iff a satisfying
/// completion was found; the satisfying assignment is left on the graph.
#[allow(clippy::cast_possible_truncation)]
pub fn walksat(graph: &mut FactorGraph, rng: &mut SolverRng, config: &SidConfig) -> bool {
    let free = graph.unassigned_variables();
    let max_flips = (graph.num_variables() as u32).saturating_mul(config.ws_flips_per_variable);

    for _ in 0..config.ws_max_tries {
        for &v in &free {
            let value = rng.next_bool();
            graph.assign(v, value);
        }

        for _ in 0..max_flips {
            if graph.is_sat() {
                return true;
            }

            let (satisfied, unsatisfied): (Vec<_>, Vec<_>) = graph
                .enabled_clauses()
                .into_iter()
                .partition(|&c| graph.clause_is_satisfied(c));

            let Some(&selected) = rng.choose(&unsatisfied) else {
                // Unreachable while the graph is not SAT; bail out rather
                // than loop on nothing.
                break;
            };
            let candidates = graph.enabled_clause_edges(selected).collect_vec();

            // Break-count of each candidate: flip it, count the satisfied
            // clauses that become unsatisfied, flip it back. The first
            // variable reaching the minimum wins; a zero break-count stops
            // the scan early.
            let mut best = None;
            let mut best_break = satisfied.len() + 1;
            for &e in &candidates {
                let v = graph.edge(e).variable;
                graph.flip(v);
                let break_count = satisfied
                    .iter()
                    .filter(|&&c| !graph.clause_is_satisfied(c))
                    .count();
                graph.flip(v);

                if best.is_none() || break_count < best_break {
                    best = Some(v);
                    best_break = break_count;
                }
                if break_count == 0 {
                    break;
                }
            }
            let Some(best) = best else { break };

            if best_break == 0 || rng.real01() > config.ws_noise {
                graph.flip(best);
            } else {
                let e = candidates[rng.uniform(0, candidates.len() - 1)];
                let v = graph.edge(e).variable;
                graph.flip(v);
            }
        }
    }

    for &v in &free {
        graph.unassign(v);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sid::dimacs::parse_dimacs_text;

    #[test]
    fn solves_a_small_satisfiable_residual() {
        let text = "p cnf 3 4\n1 2 0\n-1 3 0\n-2 -3 1 0\n2 3 0\n";
        let mut graph = parse_dimacs_text(text).unwrap();
        let mut rng = SolverRng::from_seed(1234);
        assert!(walksat(&mut graph, &mut rng, &SidConfig::default()));
        assert!(graph.is_sat());
        assert!(graph.is_model());
    }

    #[test]
    fn keeps_decimated_assignments_fixed() {
        // x1 is decimated to false before the search; only x2 and x3 float.
        let text = "p cnf 3 2\n-1 2 0\n-2 3 0\n";
        let mut graph = parse_dimacs_text(text).unwrap();
        graph.assign(0, false);
        let mut rng = SolverRng::from_seed(7);
        assert!(walksat(&mut graph, &mut rng, &SidConfig::default()));
        assert!(graph.variable(0).assigned);
        assert!(!graph.variable(0).value);
        assert!(graph.is_model());
    }

    #[test]
    fn failure_restores_the_entering_assignment() {
        // Unsatisfiable residual: all four sign patterns over two variables.
        let text = "p cnf 2 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n";
        let mut graph = parse_dimacs_text(text).unwrap();
        let mut rng = SolverRng::from_seed(5);
        let config = SidConfig {
            ws_max_tries: 2,
            ws_flips_per_variable: 10,
            ..SidConfig::default()
        };
        assert!(!walksat(&mut graph, &mut rng, &config));
        assert_eq!(graph.assignment(), vec![None, None]);
    }

    #[test]
    fn failure_keeps_decimated_variables() {
        let text = "p cnf 3 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n";
        let mut graph = parse_dimacs_text(text).unwrap();
        graph.assign(2, true);
        let mut rng = SolverRng::from_seed(11);
        let config = SidConfig {
            ws_max_tries: 1,
            ws_flips_per_variable: 5,
            ..SidConfig::default()
        };
        assert!(!walksat(&mut graph, &mut rng, &config));
        assert_eq!(graph.assignment(), vec![None, None, Some(true)]);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let text = "p cnf 4 5\n1 2 3 0\n-1 2 4 0\n1 -2 -4 0\n-3 2 4 0\n-1 -2 3 0\n";
        let mut first = parse_dimacs_text(text).unwrap();
        let mut second = parse_dimacs_text(text).unwrap();
        let mut rng1 = SolverRng::from_seed(99);
        let mut rng2 = SolverRng::from_seed(99);
        let r1 = walksat(&mut first, &mut rng1, &SidConfig::default());
        let r2 = walksat(&mut second, &mut rng2, &SidConfig::default());
        assert_eq!(r1, r2);
        assert_eq!(first.assignment(), second.assignment());
    }
}
