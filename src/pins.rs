// SPDX-License-Identifier: Apache-2.0

//! Pin maps handed in per gate instance, pin-type classes, and the typed
//! symbol table the validator produces from them.

use std::collections::{BTreeMap, BTreeSet};

use crate::literal::Literal;

/// Name of the pin that carries the gate's output identity.
pub const NODE_NAME: &str = "node_name";

/// Pin name to literal for one gate instance.
///
/// A `BTreeMap` so that iteration order (and therefore positional renaming)
/// is deterministic regardless of how the caller built the map.
pub type PinMap = BTreeMap<String, Literal>;

/// Shape of a gate's input interface: the pin names that must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinTypeClass {
    name: String,
    required: BTreeSet<String>,
}

impl PinTypeClass {
    pub fn new<I, S>(name: &str, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PinTypeClass {
            name: name.to_string(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Class for `count` inputs named `{prefix}1..{prefix}{count}` plus
    /// `node_name`, e.g. `numbered('A', 3)` is the class `A3` with pins
    /// `A1, A2, A3, node_name`.
    pub fn numbered(prefix: char, count: usize) -> Self {
        let mut required: BTreeSet<String> = (1..=count).map(|i| format!("{prefix}{i}")).collect();
        required.insert(NODE_NAME.to_string());
        PinTypeClass {
            name: format!("{prefix}{count}"),
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Required pins other than `node_name`.
    pub fn input_pins(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .map(|s| s.as_str())
            .filter(|s| *s != NODE_NAME)
    }
}

impl std::fmt::Display for PinTypeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pins: Vec<&str> = self.required.iter().map(|s| s.as_str()).collect();
        write!(f, "{} {{{}}}", self.name, pins.join(", "))
    }
}

/// Role of a validated input pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinSymbol {
    /// `input_<index>` of a positional gate.
    Positional(usize),
    /// A named pin, after canonical renaming.
    Named(String),
}

impl std::fmt::Display for PinSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinSymbol::Positional(i) => write!(f, "input_{}", i),
            PinSymbol::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Validated pins of one gate instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    node: Literal,
    inputs: BTreeMap<PinSymbol, Literal>,
}

impl SymbolTable {
    pub(crate) fn new(node: Literal, inputs: BTreeMap<PinSymbol, Literal>) -> Self {
        SymbolTable { node, inputs }
    }

    /// The output identity literal (`node_name`).
    pub fn node(&self) -> Literal {
        self.node
    }

    pub fn get(&self, symbol: &PinSymbol) -> Option<Literal> {
        self.inputs.get(symbol).copied()
    }

    pub fn named(&self, name: &str) -> Option<Literal> {
        self.get(&PinSymbol::Named(name.to_string()))
    }

    pub fn positional(&self, index: usize) -> Option<Literal> {
        self.get(&PinSymbol::Positional(index))
    }

    /// Number of input pins (not counting `node_name`).
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&PinSymbol, Literal)> {
        self.inputs.iter().map(|(k, v)| (k, *v))
    }

    /// Input literals in symbol order. For positional tables this is
    /// `input_0, input_1, ...`.
    pub fn input_literals(&self) -> Vec<Literal> {
        self.inputs.values().copied().collect()
    }
}
