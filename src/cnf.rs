// SPDX-License-Identifier: Apache-2.0

//! Clause containers and the sinks that clauses are forwarded to.
//!
//! A `ClauseSink` is the solver-side interface of the compiler: every clause
//! a gate encoder emits is handed to `add_clause` once, in emission order.
//! Nothing here deduplicates or simplifies clauses.

use std::io::{self, Write};

use crate::literal::{Literal, reserved_constant_clauses};

pub type Clause = Vec<Literal>;

/// Receiver of emitted clauses.
pub trait ClauseSink {
    fn add_clause(&mut self, clause: &[Literal]);
}

/// Ordered sequence of clauses emitted for one gate (or a batch of gates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
}

impl ClauseSet {
    pub fn new() -> Self {
        ClauseSet {
            clauses: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn append(&mut self, other: ClauseSet) {
        self.clauses.extend(other.clauses);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }

    /// Largest variable id mentioned by any clause (0 when empty).
    pub fn max_var(&self) -> u64 {
        self.clauses
            .iter()
            .flat_map(|c| c.iter())
            .map(|l| l.var())
            .max()
            .unwrap_or(0)
    }

    /// Forwards every clause, in order, to `sink`.
    pub fn forward_to<S: ClauseSink + ?Sized>(&self, sink: &mut S) {
        for clause in &self.clauses {
            sink.add_clause(clause);
        }
    }

    /// Evaluates the conjunction under a total assignment given as a
    /// function from positive literal (variable) to value.
    pub fn is_satisfied_by(&self, value_of: impl Fn(Literal) -> bool) -> bool {
        self.clauses.iter().all(|clause| {
            clause.iter().any(|&lit| {
                let positive = if lit.is_positive() { lit } else { !lit };
                value_of(positive) == lit.is_positive()
            })
        })
    }
}

impl From<Vec<Clause>> for ClauseSet {
    fn from(clauses: Vec<Clause>) -> Self {
        ClauseSet { clauses }
    }
}

impl<'a> IntoIterator for &'a ClauseSet {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl ClauseSink for ClauseSet {
    fn add_clause(&mut self, clause: &[Literal]) {
        self.clauses.push(clause.to_vec());
    }
}

impl<'a> ClauseSink for varisat::Solver<'a> {
    fn add_clause(&mut self, clause: &[Literal]) {
        let lits: Vec<varisat::Lit> = clause.iter().map(|l| l.to_varisat()).collect();
        varisat::ExtendFormula::add_clause(self, &lits);
    }
}

impl std::fmt::Display for ClauseSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for clause in &self.clauses {
            let lits: Vec<String> = clause.iter().map(|l| l.to_string()).collect();
            writeln!(f, "[{}]", lits.join(", "))?;
        }
        Ok(())
    }
}

/// Writes `clauses` in DIMACS CNF format.
///
/// `var_count` is the header's variable count; it is raised to the largest
/// variable actually used if it is smaller.
pub fn write_dimacs<W: Write>(out: &mut W, clauses: &ClauseSet, var_count: u64) -> io::Result<()> {
    let var_count = std::cmp::max(var_count, clauses.max_var());
    writeln!(out, "p cnf {} {}", var_count, clauses.len())?;
    for clause in clauses {
        for lit in clause {
            write!(out, "{} ", lit)?;
        }
        writeln!(out, "0")?;
    }
    Ok(())
}

/// Complete formula: the reserved-constant constraints followed by whatever
/// gate clauses are added.
#[derive(Debug, Clone)]
pub struct Formula {
    clauses: ClauseSet,
}

impl Formula {
    pub fn new() -> Self {
        Formula {
            clauses: ClauseSet::from(reserved_constant_clauses()),
        }
    }

    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    pub fn into_clause_set(self) -> ClauseSet {
        self.clauses
    }

    /// Solves the formula with varisat under the given assumptions.
    ///
    /// Returns the model (as DIMACS-signed literals) when satisfiable and
    /// `None` when unsatisfiable.
    pub fn solve(
        &self,
        assumptions: &[Literal],
    ) -> Result<Option<Vec<Literal>>, varisat::solver::SolverError> {
        let mut solver = varisat::Solver::new();
        self.clauses.forward_to(&mut solver);
        let assumed: Vec<varisat::Lit> = assumptions.iter().map(|l| l.to_varisat()).collect();
        solver.assume(&assumed);
        if !solver.solve()? {
            return Ok(None);
        }
        let model = solver
            .model()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|lit| Literal::new(lit.to_dimacs() as i64))
            .collect();
        Ok(Some(model))
    }
}

impl Default for Formula {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseSink for Formula {
    fn add_clause(&mut self, clause: &[Literal]) {
        self.clauses.add_clause(clause);
    }
}
