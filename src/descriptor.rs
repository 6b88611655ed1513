// SPDX-License-Identifier: Apache-2.0

//! Cell-library descriptor: the read-only table, derived from a Liberty
//! library, that maps each physical cell to its pin-type classes, its output
//! pins, and each output pin's boolean function.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::cell_formula::parse_formula;
use crate::pins::{NODE_NAME, PinTypeClass};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEntry {
    /// Name of the pin-type class describing the cell's inputs.
    pub input_type: String,
    /// Name of the pin-type class describing the cell's outputs.
    pub output_type: String,
    /// Output pin names; each one is a separate dispatch signature.
    pub outputs: Vec<String>,
    /// Liberty `function` of each output pin.
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
}

/// Output-pin functions that identify flip-flop outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFormulas {
    /// Functions of identity outputs (`Q = D`).
    #[serde(default = "default_identity_formulas")]
    pub identity: Vec<String>,
    /// Functions of inverted outputs (`QN = !D`).
    #[serde(default = "default_inverted_formulas")]
    pub inverted: Vec<String>,
}

fn default_identity_formulas() -> Vec<String> {
    vec!["IQ".to_string()]
}

fn default_inverted_formulas() -> Vec<String> {
    vec!["IQN".to_string()]
}

impl Default for RegisterFormulas {
    fn default() -> Self {
        RegisterFormulas {
            identity: default_identity_formulas(),
            inverted: default_inverted_formulas(),
        }
    }
}

/// How a register output relates to its data input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutput {
    Identity,
    Inverted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDescriptor {
    pub pin_types: BTreeMap<String, Vec<String>>,
    pub cells: BTreeMap<String, CellEntry>,
    #[serde(default)]
    pub registers: RegisterFormulas,
}

impl CellDescriptor {
    /// Decodes and checks a descriptor from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let descriptor: CellDescriptor =
            serde_json::from_str(text).context("decoding cell descriptor JSON")?;
        descriptor.check()?;
        Ok(descriptor)
    }

    pub fn cell(&self, name: &str) -> Option<&CellEntry> {
        self.cells.get(name)
    }

    pub fn pin_type(&self, name: &str) -> Option<PinTypeClass> {
        self.pin_types
            .get(name)
            .map(|pins| PinTypeClass::new(name, pins.iter().map(|s| s.as_str())))
    }

    /// Classifies an output-pin function as a register output, if it is one.
    pub fn register_output(&self, function: &str) -> Option<RegisterOutput> {
        let function = function.trim();
        if self.registers.identity.iter().any(|f| f == function) {
            Some(RegisterOutput::Identity)
        } else if self.registers.inverted.iter().any(|f| f == function) {
            Some(RegisterOutput::Inverted)
        } else {
            None
        }
    }

    /// Checks internal consistency:
    ///
    /// - every pin type includes `node_name`;
    /// - every cell refers to a known input pin type;
    /// - every output pin has a parseable function whose inputs are pins of
    ///   the cell's input type (register state functions excepted);
    /// - the identity and inverted register formula sets do not overlap.
    pub fn check(&self) -> Result<()> {
        let identity: HashSet<&String> = self.registers.identity.iter().collect();
        let overlap: Vec<String> = self
            .registers
            .inverted
            .iter()
            .filter(|f| identity.contains(f))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(anyhow!(format!(
                "register formula classification has overlap between identity and inverted sets: {}",
                overlap.join(", ")
            )));
        }

        for (type_name, pins) in &self.pin_types {
            if !pins.iter().any(|p| p == NODE_NAME) {
                return Err(anyhow!(
                    "pin type '{}' does not include '{}'",
                    type_name,
                    NODE_NAME
                ));
            }
        }

        for (cell_name, cell) in &self.cells {
            let input_pins = self.pin_types.get(&cell.input_type).ok_or_else(|| {
                anyhow!(
                    "cell '{}' refers to unknown input pin type '{}'",
                    cell_name,
                    cell.input_type
                )
            })?;
            if cell.outputs.is_empty() {
                return Err(anyhow!("cell '{}' has no output pins", cell_name));
            }
            for output in &cell.outputs {
                let function = cell.functions.get(output).ok_or_else(|| {
                    anyhow!(
                        "cell '{}' output pin '{}' has no function",
                        cell_name,
                        output
                    )
                })?;
                if self.register_output(function).is_some() {
                    continue;
                }
                let term = parse_formula(function).map_err(|e| {
                    anyhow!(
                        "cell '{}' output pin '{}' function '{}': {}",
                        cell_name,
                        output,
                        function,
                        e
                    )
                })?;
                for input in term.inputs() {
                    if !input_pins.contains(&input) {
                        return Err(anyhow!(
                            "cell '{}' output pin '{}' function uses '{}' which is not in pin type '{}'",
                            cell_name,
                            output,
                            input,
                            cell.input_type
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Loads a descriptor from a JSON file.
pub fn load_descriptor_from_path(path: &Path) -> Result<CellDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading cell descriptor '{}'", path.display()))?;
    let descriptor = CellDescriptor::from_json_str(&text)
        .with_context(|| format!("loading cell descriptor '{}'", path.display()))?;
    log::info!(
        "loaded cell descriptor '{}': {} cells, {} pin types",
        path.display(),
        descriptor.cells.len(),
        descriptor.pin_types.len()
    );
    Ok(descriptor)
}
