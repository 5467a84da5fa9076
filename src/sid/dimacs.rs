#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format, producing a `FactorGraph`.
//!
//! The format:
//! - Comment lines starting with `c` are ignored.
//! - The first non-comment line must be the problem line
//!   `p cnf <num_variables> <num_clauses>`.
//! - Clauses follow as whitespace-separated signed integers terminated by `0`.
//!   The terminator is `0`, not the newline, so clauses may span lines.
//! - A line starting with `%` ends the data (competition convention).
//!
//! The parser cross-validates the header against the content: the clause count
//! must match, every literal must name a declared variable, and empty clauses
//! are rejected, as are duplicate (or complementary) literals within one
//! clause.

use crate::sid::graph::{FactorGraph, VariableId};
use rustc_hash::FxHashSet;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

/// Everything that can go wrong while loading a DIMACS stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The stream ended (or a clause appeared) before a `p cnf` line.
    #[error("missing 'p cnf' header line")]
    MissingHeader,

    /// The problem line did not match `p cnf <vars> <clauses>`.
    #[error("malformed problem line: '{0}'")]
    MalformedHeader(String),

    /// A token where a literal was expected could not be parsed.
    #[error("invalid literal token '{0}'")]
    InvalidLiteral(String),

    /// A literal names a variable above the declared count.
    #[error("literal {literal} exceeds declared variable count {num_variables}")]
    VariableOutOfRange {
        /// The offending literal as written.
        literal: i32,
        /// The declared variable count.
        num_variables: usize,
    },

    /// A clause contained no literals before its `0` terminator.
    #[error("clause {index} is empty")]
    EmptyClause {
        /// Zero-based index of the clause.
        index: usize,
    },

    /// A variable occurred twice in one clause (either sign).
    #[error("variable {variable} occurs twice in clause {index}")]
    DuplicateLiteral {
        /// DIMACS id of the repeated variable.
        variable: usize,
        /// Zero-based index of the clause.
        index: usize,
    },

    /// The number of parsed clauses disagrees with the header.
    #[error("header declares {declared} clauses but the stream holds {found}")]
    ClauseCountMismatch {
        /// Count from the problem line.
        declared: usize,
        /// Count actually parsed.
        found: usize,
    },

    /// The stream ended in the middle of a clause.
    #[error("stream ended inside a clause ({pending} literals without a terminating 0)")]
    UnterminatedClause {
        /// Literals collected for the unterminated clause.
        pending: usize,
    },

    /// The underlying reader failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parses DIMACS data from any `BufRead` source into a factor graph.
///
/// Every edge starts with `survey = 0` and everything enabled.
///
/// # Errors
///
/// Returns a `ParseError` describing the first problem encountered; the graph
/// is not partially constructed on failure.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<FactorGraph, ParseError> {
    let mut header: Option<(usize, usize)> = None;
    let mut graph = FactorGraph::default();
    let mut clause: Vec<(VariableId, bool)> = Vec::new();
    let mut seen: FxHashSet<usize> = FxHashSet::default();
    let mut clauses_parsed = 0usize;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_start();
        if trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let Some((num_variables, _)) = header else {
            let (num_variables, declared_clauses) = parse_header(trimmed)?;
            header = Some((num_variables, declared_clauses));
            graph = FactorGraph::with_variables(num_variables);
            continue;
        };

        for token in trimmed.split_whitespace() {
            let literal: i32 = token
                .parse()
                .map_err(|_| ParseError::InvalidLiteral(token.to_string()))?;

            if literal == 0 {
                if clause.is_empty() {
                    return Err(ParseError::EmptyClause {
                        index: clauses_parsed,
                    });
                }
                graph.push_clause(&clause);
                clauses_parsed += 1;
                clause.clear();
                seen.clear();
                continue;
            }

            let variable = literal.unsigned_abs() as usize;
            if variable > num_variables {
                return Err(ParseError::VariableOutOfRange {
                    literal,
                    num_variables,
                });
            }
            if !seen.insert(variable) {
                return Err(ParseError::DuplicateLiteral {
                    variable,
                    index: clauses_parsed,
                });
            }
            #[allow(clippy::cast_possible_truncation)]
            clause.push(((variable - 1) as VariableId, literal > 0));
        }
    }

    let Some((_, declared_clauses)) = header else {
        return Err(ParseError::MissingHeader);
    };
    if !clause.is_empty() {
        return Err(ParseError::UnterminatedClause {
            pending: clause.len(),
        });
    }
    if clauses_parsed != declared_clauses {
        return Err(ParseError::ClauseCountMismatch {
            declared: declared_clauses,
            found: clauses_parsed,
        });
    }

    Ok(graph)
}

/// Parses DIMACS data held in a string. Convenience wrapper for tests and
/// inline input.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_dimacs_text(text: &str) -> Result<FactorGraph, ParseError> {
    parse_dimacs(io::Cursor::new(text))
}

/// Opens `path`, wraps it in a `BufReader` and parses it.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read, and any
/// other `ParseError` for malformed content.
pub fn parse_file(path: &Path) -> Result<FactorGraph, ParseError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

fn parse_header(line: &str) -> Result<(usize, usize), ParseError> {
    let mut parts = line.split_whitespace();
    let (p, cnf) = (parts.next(), parts.next());
    if p != Some("p") {
        return Err(ParseError::MissingHeader);
    }
    if cnf != Some("cnf") {
        return Err(ParseError::MalformedHeader(line.to_string()));
    }
    let num_variables = parts
        .next()
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
    let num_clauses = parts
        .next()
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
    if parts.next().is_some() {
        return Err(ParseError::MalformedHeader(line.to_string()));
    }
    Ok((num_variables, num_clauses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_file() {
        let text = "c a comment\n\
                    p cnf 3 2\n\
                    1 -2 0\n\
                    2 3 0\n";
        let graph = parse_dimacs_text(text).expect("parse");
        assert_eq!(graph.num_variables(), 3);
        assert_eq!(graph.num_clauses(), 2);
        assert_eq!(graph.num_edges(), 4);

        let edges: Vec<_> = graph.enabled_clause_edges(0).collect();
        assert_eq!(graph.edge(edges[0]).variable, 0);
        assert!(graph.edge(edges[0]).polarity);
        assert_eq!(graph.edge(edges[1]).variable, 1);
        assert!(!graph.edge(edges[1]).polarity);
    }

    #[test]
    fn accepts_clauses_spanning_lines() {
        let text = "p cnf 4 2\n1 2\n3 0 -2\n-4 0\n";
        let graph = parse_dimacs_text(text).expect("parse");
        assert_eq!(graph.num_clauses(), 2);
        assert_eq!(graph.enabled_clause_edges(0).count(), 3);
        assert_eq!(graph.enabled_clause_edges(1).count(), 2);
    }

    #[test]
    fn percent_line_ends_the_stream() {
        let text = "p cnf 2 2\n1 0\n-2 0\n%\nthis is not dimacs\n";
        let graph = parse_dimacs_text(text).expect("parse");
        assert_eq!(graph.num_clauses(), 2);
    }

    #[test]
    fn rejects_missing_header() {
        let text = "1 -2 0\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::MissingHeader)
        ));
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(matches!(
            parse_dimacs_text("p cnf 3\n"),
            Err(ParseError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_dimacs_text("p sat 3 2\n"),
            Err(ParseError::MalformedHeader(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_literal() {
        let text = "p cnf 2 1\n1 3 0\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::VariableOutOfRange {
                literal: 3,
                num_variables: 2
            })
        ));
    }

    #[test]
    fn rejects_empty_clause() {
        let text = "p cnf 2 2\n1 0\n0\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::EmptyClause { index: 1 })
        ));
    }

    #[test]
    fn rejects_duplicate_and_complementary_literals() {
        assert!(matches!(
            parse_dimacs_text("p cnf 2 1\n1 1 0\n"),
            Err(ParseError::DuplicateLiteral {
                variable: 1,
                index: 0
            })
        ));
        assert!(matches!(
            parse_dimacs_text("p cnf 2 1\n1 -1 0\n"),
            Err(ParseError::DuplicateLiteral {
                variable: 1,
                index: 0
            })
        ));
    }

    #[test]
    fn rejects_clause_count_mismatch() {
        let text = "p cnf 2 3\n1 0\n-2 0\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::ClauseCountMismatch {
                declared: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn rejects_unterminated_clause() {
        let text = "p cnf 2 1\n1 -2\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::UnterminatedClause { pending: 2 })
        ));
    }

    #[test]
    fn rejects_garbage_tokens() {
        let text = "p cnf 2 1\n1 two 0\n";
        assert!(matches!(
            parse_dimacs_text(text),
            Err(ParseError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn unused_variables_still_get_arena_slots() {
        let text = "p cnf 5 1\n1 -3 0\n";
        let graph = parse_dimacs_text(text).expect("parse");
        assert_eq!(graph.num_variables(), 5);
        assert_eq!(graph.unassigned_variables().len(), 5);
    }
}
