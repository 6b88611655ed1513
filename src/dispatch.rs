// SPDX-License-Identifier: Apache-2.0

//! Registry from `(cell name, output pin)` to the encoder for that signature.
//!
//! The table is built once, from the built-in synthetic gates plus every
//! output pin of every cell in a `CellDescriptor`, and is immutable
//! afterwards. It is `Send + Sync` and meant to be shared by reference across
//! compilations.

use std::collections::HashMap;

use anyhow::{Result, anyhow};

use crate::cell_formula::{FormulaShape, Term, parse_formula};
use crate::cnf::ClauseSet;
use crate::descriptor::{CellDescriptor, RegisterOutput};
use crate::encoders::{
    MAX_TRUTH_TABLE_INPUTS, encode_and, encode_and_monitor, encode_buffer, encode_constant,
    encode_inverter, encode_or, encode_or_monitor, encode_register, encode_truth_table,
    encode_xnor, encode_xor,
};
use crate::error::CompileError;
use crate::literal::{Literal, ONE, ZERO};
use crate::pins::{NODE_NAME, PinMap, PinTypeClass, SymbolTable};
use crate::validate::{Renaming, validate, validate_fixed_arity};

/// Output pin of the single-output built-in gates.
pub const BUILTIN_OUTPUT_PIN: &str = "O";

/// Accepted data-pin names of register gates, in order of preference.
pub const REGISTER_DATA_ALIASES: [&str; 2] = ["D", "d"];

/// Prefix of the named inputs of the reduction monitors (`A1`, `A2`, ...).
pub const MONITOR_INPUT_PREFIX: char = 'A';

/// Encoder selected for one dispatch signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEncoder {
    /// Input/output ports and probe nodes: one positional input, buffered.
    Boundary,
    /// Two positional inputs; `negated` selects XNOR.
    Xor { negated: bool },
    /// One positional input bound to `ONE` or `ZERO`.
    ConstantSource,
    /// AND reduction over `A1..AN` whose output is forced true.
    AndMonitor,
    /// OR reduction over `A1..AN`.
    OrMonitor,
    /// Flip-flop output, looked up by data-pin alias without validation.
    Register { inverting: bool },
    /// Physical library cell output described by a Liberty function.
    Library(LibraryCell),
}

/// One output pin of a library cell, with its function already classified
/// and its identifiers canonically renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCell {
    input_type: PinTypeClass,
    renaming: Renaming,
    shape: FormulaShape,
    function: Term,
}

impl LibraryCell {
    /// Fails for formulas that need a truth table wider than
    /// `MAX_TRUTH_TABLE_INPUTS`.
    pub fn new(input_type: PinTypeClass, renaming: Renaming, function: &Term) -> Result<Self> {
        let function = function.rename_inputs(renaming);
        let shape = function.classify();
        let width = function.inputs().len();
        if shape == FormulaShape::General && width > MAX_TRUTH_TABLE_INPUTS {
            return Err(anyhow!(
                "function has {} inputs; at most {} are supported",
                width,
                MAX_TRUTH_TABLE_INPUTS
            ));
        }
        Ok(LibraryCell {
            input_type,
            renaming,
            shape,
            function,
        })
    }

    pub fn shape(&self) -> &FormulaShape {
        &self.shape
    }

    fn encode(&self, gate: &str, pins: &PinMap) -> Result<ClauseSet, CompileError> {
        let table = validate(gate, pins, &self.input_type, self.renaming)?;
        let out = table.node();
        let lookup = |names: &[String]| -> Result<Vec<Literal>, CompileError> {
            names
                .iter()
                .map(|name| {
                    table.named(name).ok_or_else(|| CompileError::MissingInput {
                        gate: gate.to_string(),
                        type_class: self.input_type.name().to_string(),
                        missing: vec![name.clone()],
                        pins: pins.clone(),
                    })
                })
                .collect()
        };
        let clauses = match &self.shape {
            FormulaShape::Constant(value) => encode_constant(if *value { ONE } else { ZERO }, out),
            FormulaShape::Buffer(name) => encode_buffer(lookup(std::slice::from_ref(name))?[0], out),
            FormulaShape::Inverter(name) => {
                encode_inverter(lookup(std::slice::from_ref(name))?[0], out)
            }
            FormulaShape::And { inputs, negated } => {
                encode_and(&lookup(inputs.as_slice())?, if *negated { !out } else { out })
            }
            FormulaShape::Or { inputs, negated } => {
                encode_or(&lookup(inputs.as_slice())?, if *negated { !out } else { out })
            }
            FormulaShape::Xor { a, b, negated } => {
                let ab = lookup(&[a.clone(), b.clone()][..])?;
                if *negated {
                    encode_xnor(ab[0], ab[1], out)
                } else {
                    encode_xor(ab[0], ab[1], out)
                }
            }
            FormulaShape::General => {
                let names = self.function.inputs();
                let lits = lookup(names.as_slice())?;
                let inputs: Vec<(String, Literal)> = names.into_iter().zip(lits).collect();
                encode_truth_table(&self.function, &inputs, out)
            }
        };
        Ok(clauses)
    }
}

impl CellEncoder {
    /// Validates `pins` for this encoder and emits the gate's clauses.
    ///
    /// `gate` names the instance for error reporting; `cell` is its cell
    /// name.
    pub fn encode(&self, gate: &str, cell: &str, pins: &PinMap) -> Result<ClauseSet, CompileError> {
        match self {
            CellEncoder::Boundary => {
                let table = validate_fixed_arity(gate, pins, 1)?;
                Ok(encode_buffer(positional(&table, 0), table.node()))
            }
            CellEncoder::Xor { negated } => {
                let table = validate_fixed_arity(gate, pins, 2)?;
                let (a, b) = (positional(&table, 0), positional(&table, 1));
                Ok(if *negated {
                    encode_xnor(a, b, table.node())
                } else {
                    encode_xor(a, b, table.node())
                })
            }
            CellEncoder::ConstantSource => {
                let table = validate_fixed_arity(gate, pins, 1)?;
                let selector = positional(&table, 0);
                if selector != ONE && selector != ZERO {
                    return Err(CompileError::NonConstantSelector {
                        gate: gate.to_string(),
                        literal: selector,
                    });
                }
                Ok(encode_constant(selector, table.node()))
            }
            CellEncoder::AndMonitor => {
                let (inputs, out) = monitor_inputs(gate, cell, pins)?;
                Ok(encode_and_monitor(&inputs, out))
            }
            CellEncoder::OrMonitor => {
                let (inputs, out) = monitor_inputs(gate, cell, pins)?;
                Ok(encode_or_monitor(&inputs, out))
            }
            CellEncoder::Register { inverting } => {
                let data = REGISTER_DATA_ALIASES.iter().find_map(|alias| pins.get(*alias));
                match (data, pins.get(NODE_NAME)) {
                    (Some(d), Some(q)) => Ok(encode_register(*d, *q, *inverting)),
                    (data, node) => {
                        let mut missing = Vec::new();
                        if data.is_none() {
                            missing.push(REGISTER_DATA_ALIASES[0].to_string());
                        }
                        if node.is_none() {
                            missing.push(NODE_NAME.to_string());
                        }
                        Err(CompileError::MissingInput {
                            gate: gate.to_string(),
                            type_class: "register".to_string(),
                            missing,
                            pins: pins.clone(),
                        })
                    }
                }
            }
            CellEncoder::Library(lib_cell) => lib_cell.encode(gate, pins),
        }
    }
}

// Positional validation guarantees indices below the validated arity exist.
fn positional(table: &SymbolTable, index: usize) -> Literal {
    table.input_literals()[index]
}

/// Validates a reduction monitor's pins against `A1..AN`, with N taken from
/// the number of supplied inputs, and returns the inputs in index order plus
/// the output literal.
fn monitor_inputs(
    gate: &str,
    cell: &str,
    pins: &PinMap,
) -> Result<(Vec<Literal>, Literal), CompileError> {
    let arity = pins.keys().filter(|k| k.as_str() != NODE_NAME).count();
    if arity == 0 {
        return Err(CompileError::UnsupportedArity {
            gate: gate.to_string(),
            cell: cell.to_string(),
            arity,
        });
    }
    let class = PinTypeClass::numbered(MONITOR_INPUT_PREFIX, arity);
    let table = validate(gate, pins, &class, Renaming::for_cell(cell))?;
    let mut inputs = Vec::with_capacity(arity);
    for i in 1..=arity {
        let name = format!("{}{}", MONITOR_INPUT_PREFIX, i);
        let lit = table
            .named(&name)
            .ok_or_else(|| CompileError::MissingInput {
                gate: gate.to_string(),
                type_class: class.name().to_string(),
                missing: vec![name.clone()],
                pins: pins.clone(),
            })?;
        inputs.push(lit);
    }
    Ok((inputs, table.node()))
}

/// Immutable `(cell, output pin)` to encoder registry.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    encoders: HashMap<(String, String), CellEncoder>,
}

impl DispatchTable {
    /// Table containing only the built-in synthetic gates.
    pub fn builtin() -> Self {
        let mut encoders = HashMap::new();
        let mut add = |cell: &str, pin: &str, encoder: CellEncoder| {
            encoders.insert((cell.to_string(), pin.to_string()), encoder);
        };
        for boundary in ["input", "output", "in_node", "out_node"] {
            add(boundary, BUILTIN_OUTPUT_PIN, CellEncoder::Boundary);
        }
        add("xor", BUILTIN_OUTPUT_PIN, CellEncoder::Xor { negated: false });
        add("xnor", BUILTIN_OUTPUT_PIN, CellEncoder::Xor { negated: true });
        add("input_formula", BUILTIN_OUTPUT_PIN, CellEncoder::ConstantSource);
        add("and", BUILTIN_OUTPUT_PIN, CellEncoder::AndMonitor);
        add("or", BUILTIN_OUTPUT_PIN, CellEncoder::OrMonitor);
        add("register", "Q", CellEncoder::Register { inverting: false });
        add("register", "QN", CellEncoder::Register { inverting: true });
        DispatchTable { encoders }
    }

    /// Built-in gates plus one entry per output pin of every descriptor cell.
    pub fn from_descriptor(descriptor: &CellDescriptor) -> Result<Self> {
        let mut table = Self::builtin();
        for (cell_name, cell) in &descriptor.cells {
            let input_type = descriptor.pin_type(&cell.input_type).ok_or_else(|| {
                anyhow!(
                    "cell '{}' refers to unknown input pin type '{}'",
                    cell_name,
                    cell.input_type
                )
            })?;
            let renaming = Renaming::for_cell(cell_name);
            for output in &cell.outputs {
                let key = (cell_name.clone(), output.clone());
                if table.encoders.contains_key(&key) {
                    return Err(anyhow!(
                        "cell '{}' output pin '{}' collides with an existing dispatch entry",
                        cell_name,
                        output
                    ));
                }
                let function = cell.functions.get(output).ok_or_else(|| {
                    anyhow!(
                        "cell '{}' output pin '{}' has no function",
                        cell_name,
                        output
                    )
                })?;
                let encoder = match descriptor.register_output(function) {
                    Some(RegisterOutput::Identity) => CellEncoder::Register { inverting: false },
                    Some(RegisterOutput::Inverted) => CellEncoder::Register { inverting: true },
                    None => {
                        let term = parse_formula(function).map_err(|e| {
                            anyhow!(
                                "cell '{}' output pin '{}' function '{}': {}",
                                cell_name,
                                output,
                                function,
                                e
                            )
                        })?;
                        let lib_cell = LibraryCell::new(input_type.clone(), renaming, &term)
                            .map_err(|e| {
                                anyhow!("cell '{}' output pin '{}': {}", cell_name, output, e)
                            })?;
                        CellEncoder::Library(lib_cell)
                    }
                };
                log::debug!("dispatch: {}/{} -> {:?}", cell_name, output, encoder);
                table.encoders.insert(key, encoder);
            }
        }
        log::info!("dispatch table built with {} signatures", table.encoders.len());
        Ok(table)
    }

    pub fn lookup(&self, cell: &str, pin: &str) -> Result<&CellEncoder, CompileError> {
        self.encoders
            .get(&(cell.to_string(), pin.to_string()))
            .ok_or_else(|| CompileError::UnknownCell {
                cell: cell.to_string(),
                pin: pin.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// All registered signatures, sorted.
    pub fn signatures(&self) -> Vec<(&str, &str)> {
        let mut v: Vec<(&str, &str)> = self
            .encoders
            .keys()
            .map(|(c, p)| (c.as_str(), p.as_str()))
            .collect();
        v.sort();
        v
    }
}
