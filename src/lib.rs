// SPDX-License-Identifier: Apache-2.0

//! Compiles standard-cell gate instances into CNF clauses for fault-injection
//! analysis.
//!
//! Per gate instance the caller supplies the cell name, the output pin, and a
//! `PinMap` from pin names to SAT literals. The `DispatchTable` picks the
//! encoder for that `(cell, output pin)` signature, the pins are validated
//! into a typed `SymbolTable`, and the encoder's clauses go to a
//! `ClauseSink` (an in-memory `ClauseSet`, a varisat solver, or a DIMACS
//! writer).

pub mod cell_formula;
pub mod cnf;
pub mod compile;
pub mod descriptor;
pub mod dispatch;
pub mod encoders;
pub mod error;
pub mod literal;
pub mod pins;
pub mod test_utils;
pub mod validate;

pub use cnf::{ClauseSet, ClauseSink};
pub use compile::{GateInstance, compile_gate, compile_gates, encode_gate};
pub use dispatch::DispatchTable;
pub use error::CompileError;
pub use literal::{Literal, ONE, ZERO};
pub use pins::PinMap;
