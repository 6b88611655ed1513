// SPDX-License-Identifier: Apache-2.0

//! Errors for compiling a single gate instance.
//!
//! Every variant carries enough of the gate's identity and pin state to be
//! logged and acted on by the caller; none of them are retryable.

use crate::literal::Literal;
use crate::pins::PinMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// No encoder is registered for the `(cell, output pin)` signature.
    UnknownCell { cell: String, pin: String },
    /// The supplied pins (after renaming) do not cover the type class.
    MissingInput {
        gate: String,
        type_class: String,
        missing: Vec<String>,
        pins: PinMap,
    },
    /// Two supplied pins map to the same name after canonical renaming.
    PinCollision {
        gate: String,
        canonical: String,
        supplied: Vec<String>,
        pins: PinMap,
    },
    /// A positional gate received the wrong number of input pins.
    ArityMismatch {
        gate: String,
        expected: usize,
        actual: usize,
    },
    /// A reduction monitor was invoked with an input count it cannot encode.
    UnsupportedArity {
        gate: String,
        cell: String,
        arity: usize,
    },
    /// A constant source's selector is not bound to `ONE` or `ZERO`.
    NonConstantSelector { gate: String, literal: Literal },
}

fn format_pins(pins: &PinMap) -> String {
    let entries: Vec<String> = pins.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{{}}}", entries.join(", "))
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UnknownCell { cell, pin } => write!(
                f,
                "no CNF encoder for cell '{}' with output pin '{}'",
                cell, pin
            ),
            CompileError::MissingInput {
                gate,
                type_class,
                missing,
                pins,
            } => write!(
                f,
                "gate '{}' is missing input(s) [{}] required by pin type '{}'; supplied pins: {}",
                gate,
                missing.join(", "),
                type_class,
                format_pins(pins)
            ),
            CompileError::PinCollision {
                gate,
                canonical,
                supplied,
                pins,
            } => write!(
                f,
                "gate '{}' pins [{}] all rename to '{}'; supplied pins: {}",
                gate,
                supplied.join(", "),
                canonical,
                format_pins(pins)
            ),
            CompileError::ArityMismatch {
                gate,
                expected,
                actual,
            } => write!(
                f,
                "gate '{}' expects exactly {} input pin(s) but {} were supplied",
                gate, expected, actual
            ),
            CompileError::UnsupportedArity { gate, cell, arity } => write!(
                f,
                "gate '{}' of cell '{}' has unsupported input count {}",
                gate, cell, arity
            ),
            CompileError::NonConstantSelector { gate, literal } => write!(
                f,
                "constant source '{}' selector is bound to {} rather than a reserved constant",
                gate, literal
            ),
        }
    }
}

impl std::error::Error for CompileError {}
