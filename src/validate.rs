// SPDX-License-Identifier: Apache-2.0

//! Pin validation: turns a caller-supplied `PinMap` into a `SymbolTable`.
//!
//! Two validators exist:
//!
//! - `validate` for gates with named pins. Pin names are first canonically
//!   renamed (unless the cell is in the exemption set) and the result must
//!   cover the pin-type class.
//! - `validate_fixed_arity` for positional gates. The number of input pins
//!   must match exactly; pins become `input_0..input_{k-1}` in map order.

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::literal::Literal;
use crate::pins::{NODE_NAME, PinMap, PinSymbol, PinTypeClass, SymbolTable};

/// Character used in select/enable pin names (`S`, `SE`, ...).
pub const SELECT_CHAR: char = 'S';
/// Replacement for `SELECT_CHAR`.
pub const SELECT_REPLACEMENT: char = 'L';
/// Character used in generic pseudo-input pin names (`I`, `SI`, ...).
pub const PSEUDO_INPUT_CHAR: char = 'I';
/// Replacement for `PSEUDO_INPUT_CHAR`.
pub const PSEUDO_INPUT_REPLACEMENT: char = 'J';

/// Cells whose pin names are never renamed.
pub const RENAME_EXEMPT_CELLS: &[&str] = &[
    "input",
    "output",
    "in_node",
    "out_node",
    "xor",
    "xnor",
    "input_formula",
];

/// Whether pin names are canonically renamed before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renaming {
    Canonical,
    Verbatim,
}

impl Renaming {
    pub fn for_cell(cell: &str) -> Self {
        if RENAME_EXEMPT_CELLS.contains(&cell) {
            Renaming::Verbatim
        } else {
            Renaming::Canonical
        }
    }

    pub fn apply(self, pin: &str) -> String {
        match self {
            Renaming::Verbatim => pin.to_string(),
            Renaming::Canonical => canonical_pin_name(pin),
        }
    }
}

/// Replaces the two characters that collide with reserved identifiers of the
/// formula layer. `node_name` is passed through.
pub fn canonical_pin_name(pin: &str) -> String {
    if pin == NODE_NAME {
        return pin.to_string();
    }
    pin.chars()
        .map(|c| match c {
            SELECT_CHAR => SELECT_REPLACEMENT,
            PSEUDO_INPUT_CHAR => PSEUDO_INPUT_REPLACEMENT,
            other => other,
        })
        .collect()
}

/// Validates a named-pin gate against `class`.
///
/// All supplied input pins end up in the symbol table (under their renamed
/// names); pins beyond the class are allowed.
pub fn validate(
    gate: &str,
    pins: &PinMap,
    class: &PinTypeClass,
    renaming: Renaming,
) -> Result<SymbolTable, CompileError> {
    let mut renamed: BTreeMap<String, Literal> = BTreeMap::new();
    let mut sources: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, lit) in pins {
        let canonical = renaming.apply(name);
        sources
            .entry(canonical.clone())
            .or_default()
            .push(name.clone());
        renamed.insert(canonical, *lit);
    }
    if let Some((canonical, supplied)) = sources.into_iter().find(|(_, v)| v.len() > 1) {
        return Err(CompileError::PinCollision {
            gate: gate.to_string(),
            canonical,
            supplied,
            pins: pins.clone(),
        });
    }

    // Missing pins are reported as the class spells them.
    let missing: Vec<String> = class
        .required()
        .iter()
        .filter(|p| !renamed.contains_key(&renaming.apply(p)))
        .cloned()
        .collect();
    let node = match renamed.get(NODE_NAME) {
        Some(node) if missing.is_empty() => *node,
        _ => {
            let mut missing = missing;
            if !renamed.contains_key(NODE_NAME) && !missing.iter().any(|m| m == NODE_NAME) {
                missing.push(NODE_NAME.to_string());
            }
            return Err(CompileError::MissingInput {
                gate: gate.to_string(),
                type_class: class.name().to_string(),
                missing,
                pins: pins.clone(),
            });
        }
    };

    let inputs = renamed
        .into_iter()
        .filter(|(name, _)| name != NODE_NAME)
        .map(|(name, lit)| (PinSymbol::Named(name), lit))
        .collect();
    Ok(SymbolTable::new(node, inputs))
}

/// Validates a positional gate that must have exactly `expected` input pins
/// besides `node_name`.
pub fn validate_fixed_arity(
    gate: &str,
    pins: &PinMap,
    expected: usize,
) -> Result<SymbolTable, CompileError> {
    let Some(node) = pins.get(NODE_NAME).copied() else {
        return Err(CompileError::MissingInput {
            gate: gate.to_string(),
            type_class: format!("{}-input", expected),
            missing: vec![NODE_NAME.to_string()],
            pins: pins.clone(),
        });
    };
    let actual = pins.len() - 1;
    if actual != expected {
        return Err(CompileError::ArityMismatch {
            gate: gate.to_string(),
            expected,
            actual,
        });
    }
    let inputs = pins
        .iter()
        .filter(|(name, _)| name.as_str() != NODE_NAME)
        .enumerate()
        .map(|(i, (_, lit))| (PinSymbol::Positional(i), *lit))
        .collect();
    Ok(SymbolTable::new(node, inputs))
}
