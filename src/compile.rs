// SPDX-License-Identifier: Apache-2.0

//! Compiler entry points: one gate instance in, its clause block out.
//!
//! A gate is looked up in the `DispatchTable`, its pins are validated, and
//! the encoder's clauses are forwarded to a `ClauseSink`. A gate's clauses
//! are only forwarded once the whole block has been produced, so a failing
//! gate never leaves a partial block in the sink.

use serde::{Deserialize, Serialize};

use crate::cnf::{ClauseSet, ClauseSink};
use crate::dispatch::DispatchTable;
use crate::error::CompileError;
use crate::pins::PinMap;

/// One gate instance as handed over by the circuit-graph side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInstance {
    /// Instance name, used for diagnostics.
    pub name: String,
    pub cell: String,
    /// Output pin this instance's `node_name` literal stands for.
    pub output_pin: String,
    pub pins: PinMap,
}

impl GateInstance {
    pub fn new(name: &str, cell: &str, output_pin: &str, pins: PinMap) -> Self {
        GateInstance {
            name: name.to_string(),
            cell: cell.to_string(),
            output_pin: output_pin.to_string(),
            pins,
        }
    }
}

/// Produces the clause block for `gate` without forwarding it anywhere.
pub fn encode_gate(table: &DispatchTable, gate: &GateInstance) -> Result<ClauseSet, CompileError> {
    let result = table
        .lookup(&gate.cell, &gate.output_pin)
        .and_then(|encoder| encoder.encode(&gate.name, &gate.cell, &gate.pins));
    match &result {
        Ok(clauses) => log::debug!(
            "gate '{}' ({}/{}): {} clauses",
            gate.name,
            gate.cell,
            gate.output_pin,
            clauses.len()
        ),
        Err(e) => log::error!(
            "failed to compile gate '{}' (cell '{}', output pin '{}', pins {:?}): {}",
            gate.name,
            gate.cell,
            gate.output_pin,
            gate.pins,
            e
        ),
    }
    result
}

/// Compiles `gate` and forwards its clauses to `sink` in emission order.
///
/// Returns the number of clauses forwarded.
pub fn compile_gate<S: ClauseSink + ?Sized>(
    table: &DispatchTable,
    gate: &GateInstance,
    sink: &mut S,
) -> Result<usize, CompileError> {
    let clauses = encode_gate(table, gate)?;
    clauses.forward_to(sink);
    Ok(clauses.len())
}

/// Outcome of compiling a batch of gates.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Gates whose clauses were forwarded.
    pub compiled: usize,
    /// Total clauses forwarded.
    pub clauses: usize,
    /// Failed gates, by instance name, in input order.
    pub failures: Vec<(String, CompileError)>,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, gate: &GateInstance, result: Result<usize, CompileError>) {
        match result {
            Ok(n) => {
                self.compiled += 1;
                self.clauses += n;
            }
            Err(e) => self.failures.push((gate.name.clone(), e)),
        }
    }
}

/// Compiles every gate in order, forwarding successful blocks to `sink`.
///
/// A failing gate is recorded and skipped; it does not stop the rest of the
/// batch. Whether the batch as a whole is acceptable is the caller's call.
pub fn compile_gates<S: ClauseSink + ?Sized>(
    table: &DispatchTable,
    gates: &[GateInstance],
    sink: &mut S,
) -> CompileReport {
    let mut report = CompileReport::default();
    for gate in gates {
        report.record(gate, compile_gate(table, gate, sink));
    }
    log::info!(
        "compiled {}/{} gates into {} clauses",
        report.compiled,
        gates.len(),
        report.clauses
    );
    report
}

/// Encodes all gates on `thread_count` scoped worker threads (all available
/// CPUs when `None`).
///
/// Result `i` belongs to `gates[i]`, so the output is identical to encoding
/// the gates sequentially.
pub fn encode_gates_parallel(
    table: &DispatchTable,
    gates: &[GateInstance],
    thread_count: Option<usize>,
) -> Vec<Result<ClauseSet, CompileError>> {
    if gates.is_empty() {
        return Vec::new();
    }
    let thread_count = thread_count
        .unwrap_or_else(num_cpus::get)
        .clamp(1, gates.len());
    let chunk_size = gates.len().div_ceil(thread_count);
    log::debug!(
        "encoding {} gates on {} threads ({} per chunk)",
        gates.len(),
        thread_count,
        chunk_size
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = gates
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|gate| encode_gate(table, gate))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

/// Parallel counterpart of `compile_gates`: encodes on worker threads, then
/// forwards blocks to `sink` in gate order.
pub fn compile_gates_parallel<S: ClauseSink + ?Sized>(
    table: &DispatchTable,
    gates: &[GateInstance],
    thread_count: Option<usize>,
    sink: &mut S,
) -> CompileReport {
    let mut report = CompileReport::default();
    for (gate, result) in gates
        .iter()
        .zip(encode_gates_parallel(table, gates, thread_count))
    {
        let forwarded = result.map(|clauses| {
            clauses.forward_to(sink);
            clauses.len()
        });
        report.record(gate, forwarded);
    }
    report
}
