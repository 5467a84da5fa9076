#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Uniform random k-SAT instance generation for the experiment harness.
//!
//! Each clause draws `k` distinct variables and a fair sign for every
//! occurrence, matching the `random` generator family the original experiment
//! data came from. The produced graph serializes to DIMACS through the factor
//! graph's `Display` implementation.

use crate::sid::graph::{FactorGraph, VariableId};
use crate::sid::random::SolverRng;
use thiserror::Error;

/// Invalid generation parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// A clause cannot hold more distinct variables than the formula has.
    #[error("clause size {clause_size} exceeds variable count {num_variables}")]
    ClauseTooWide {
        /// Requested literals per clause.
        clause_size: usize,
        /// Available variables.
        num_variables: usize,
    },
    /// Zero-variable or zero-width requests are meaningless.
    #[error("variable count and clause size must both be positive")]
    EmptyParameters,
}

/// Generates a uniform random k-SAT factor graph.
///
/// # Errors
///
/// Returns `GenerateError` when `clause_size` is zero, `num_variables` is
/// zero, or a clause would need more distinct variables than exist.
pub fn random_ksat(
    num_variables: usize,
    num_clauses: usize,
    clause_size: usize,
    rng: &mut SolverRng,
) -> Result<FactorGraph, GenerateError> {
    if num_variables == 0 || clause_size == 0 {
        return Err(GenerateError::EmptyParameters);
    }
    if clause_size > num_variables {
        return Err(GenerateError::ClauseTooWide {
            clause_size,
            num_variables,
        });
    }

    let mut graph = FactorGraph::with_variables(num_variables);
    let mut literals: Vec<(VariableId, bool)> = Vec::with_capacity(clause_size);
    for _ in 0..num_clauses {
        literals.clear();
        while literals.len() < clause_size {
            #[allow(clippy::cast_possible_truncation)]
            let variable = rng.uniform(0, num_variables - 1) as VariableId;
            if literals.iter().any(|&(v, _)| v == variable) {
                continue;
            }
            let polarity = rng.next_bool();
            literals.push((variable, polarity));
        }
        graph.push_clause(&literals);
    }
    Ok(graph)
}

/// File name for a generated instance, matching the experiment layout:
/// `<generator>_3SAT_<N>N_<alpha>R_<index>.cnf`.
#[must_use]
pub fn instance_file_name(generator: &str, num_variables: usize, alpha: f64, index: u32) -> String {
    format!("{generator}_3SAT_{num_variables}N_{alpha}R_{index}.cnf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_the_requested_shape() {
        let mut rng = SolverRng::from_seed(1234);
        let graph = random_ksat(20, 85, 3, &mut rng).expect("generate");
        assert_eq!(graph.num_variables(), 20);
        assert_eq!(graph.num_clauses(), 85);
        assert_eq!(graph.num_edges(), 85 * 3);
    }

    #[test]
    fn clauses_hold_distinct_in_range_variables() {
        let mut rng = SolverRng::from_seed(99);
        let graph = random_ksat(10, 40, 3, &mut rng).expect("generate");
        for c in graph.enabled_clauses() {
            let variables: Vec<_> = graph
                .enabled_clause_edges(c)
                .map(|e| graph.edge(e).variable)
                .collect();
            assert_eq!(variables.len(), 3);
            for &v in &variables {
                assert!((v as usize) < 10);
            }
            let mut deduped = variables.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), 3);
        }
    }

    #[test]
    fn generation_is_deterministic_under_seed() {
        let mut rng1 = SolverRng::from_seed(7);
        let mut rng2 = SolverRng::from_seed(7);
        let first = random_ksat(15, 60, 3, &mut rng1).expect("generate");
        let second = random_ksat(15, 60, 3, &mut rng2).expect("generate");
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn generated_dimacs_reparses() {
        let mut rng = SolverRng::from_seed(5);
        let graph = random_ksat(12, 50, 3, &mut rng).expect("generate");
        let reparsed = crate::sid::dimacs::parse_dimacs_text(&graph.to_string()).expect("reparse");
        assert_eq!(reparsed.num_clauses(), 50);
        assert_eq!(reparsed.num_edges(), 150);
    }

    #[test]
    fn rejects_impossible_parameters() {
        let mut rng = SolverRng::from_seed(1);
        assert!(matches!(
            random_ksat(2, 5, 3, &mut rng),
            Err(GenerateError::ClauseTooWide {
                clause_size: 3,
                num_variables: 2
            })
        ));
        assert!(matches!(
            random_ksat(0, 5, 3, &mut rng),
            Err(GenerateError::EmptyParameters)
        ));
    }

    #[test]
    fn file_names_match_the_experiment_layout() {
        assert_eq!(
            instance_file_name("random", 100, 4.2, 1),
            "random_3SAT_100N_4.2R_1.cnf"
        );
    }
}
