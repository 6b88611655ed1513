// SPDX-License-Identifier: Apache-2.0

//! Helpers shared by unit and integration tests.

use crate::cnf::ClauseSet;
use crate::descriptor::CellDescriptor;
use crate::literal::{Literal, ONE, ZERO};
use crate::pins::PinMap;

/// Small Nangate45-flavored cell library in descriptor form.
pub const TEST_DESCRIPTOR_JSON: &str = r#"{
  "pin_types": {
    "A": ["A", "node_name"],
    "A2": ["A1", "A2", "node_name"],
    "A3": ["A1", "A2", "A3", "node_name"],
    "A4": ["A1", "A2", "A3", "A4", "node_name"],
    "AB": ["A", "B", "node_name"],
    "AB1B2": ["A", "B1", "B2", "node_name"],
    "ABS": ["A", "B", "S", "node_name"],
    "ABCI": ["A", "B", "CI", "node_name"],
    "CONST": ["node_name"],
    "DCK": ["D", "CK", "node_name"],
    "DSESICK": ["D", "SE", "SI", "CK", "node_name"]
  },
  "cells": {
    "INV_X1": { "input_type": "A", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "!A" } },
    "BUF_X1": { "input_type": "A", "output_type": "Z", "outputs": ["Z"], "functions": { "Z": "A" } },
    "AND2_X1": { "input_type": "A2", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "(A1 & A2)" } },
    "AND3_X1": { "input_type": "A3", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "(A1 & A2 & A3)" } },
    "NAND2_X1": { "input_type": "A2", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "!(A1 & A2)" } },
    "NOR3_X1": { "input_type": "A3", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "!(A1 | A2 | A3)" } },
    "OR4_X1": { "input_type": "A4", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "(A1 | A2 | A3 | A4)" } },
    "XOR2_X1": { "input_type": "AB", "output_type": "Z", "outputs": ["Z"], "functions": { "Z": "(A ^ B)" } },
    "XNOR2_X1": { "input_type": "AB", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "!(A ^ B)" } },
    "AOI21_X1": { "input_type": "AB1B2", "output_type": "ZN", "outputs": ["ZN"], "functions": { "ZN": "!(A | (B1 & B2))" } },
    "MUX2_X1": { "input_type": "ABS", "output_type": "Z", "outputs": ["Z"], "functions": { "Z": "((S & B) | (A & !S))" } },
    "FA_X1": { "input_type": "ABCI", "output_type": "COS", "outputs": ["CO", "S"], "functions": { "CO": "((A & B) | (CI & (A | B)))", "S": "(A ^ B ^ CI)" } },
    "LOGIC0_X1": { "input_type": "CONST", "output_type": "Z", "outputs": ["Z"], "functions": { "Z": "0" } },
    "LOGIC1_X1": { "input_type": "CONST", "output_type": "Z", "outputs": ["Z"], "functions": { "Z": "1" } },
    "DFF_X1": { "input_type": "DCK", "output_type": "QQN", "outputs": ["Q", "QN"], "functions": { "Q": "IQ", "QN": "IQN" } },
    "SDFF_X1": { "input_type": "DSESICK", "output_type": "QQN", "outputs": ["Q", "QN"], "functions": { "Q": "IQ", "QN": "IQN" } }
  }
}"#;

pub fn make_test_descriptor() -> CellDescriptor {
    CellDescriptor::from_json_str(TEST_DESCRIPTOR_JSON).expect("test descriptor should load")
}

pub fn lit(v: i64) -> Literal {
    Literal::new(v).expect("test literal must be nonzero")
}

pub fn pin_map(entries: &[(&str, i64)]) -> PinMap {
    entries
        .iter()
        .map(|(name, v)| (name.to_string(), lit(*v)))
        .collect()
}

/// Exhaustively checks that `clauses` define `out` as `f(inputs)`: for every
/// assignment to `inputs`, the clauses are satisfied with `out = f(inputs)`
/// and violated with `out = !f(inputs)`.
///
/// `inputs` and `out` must be positive literals over distinct variables. The
/// reserved constants are evaluated at their fixed values; any other variable
/// in `clauses` is a test bug.
pub fn assert_defines(
    clauses: &ClauseSet,
    inputs: &[Literal],
    out: Literal,
    f: impl Fn(&[bool]) -> bool,
) {
    assert!(out.is_positive() && inputs.iter().all(|l| l.is_positive()));
    let n = inputs.len();
    for m in 0u64..(1u64 << n) {
        let values: Vec<bool> = (0..n).map(|i| (m >> i) & 1 == 1).collect();
        let expected = f(&values);
        for out_value in [false, true] {
            let value_of = |var: Literal| -> bool {
                if var == out {
                    out_value
                } else if let Some(i) = inputs.iter().position(|l| *l == var) {
                    values[i]
                } else if var == ONE {
                    true
                } else if var == ZERO {
                    false
                } else {
                    panic!("unexpected variable {} in clauses:\n{}", var, clauses)
                }
            };
            let satisfied = clauses.is_satisfied_by(value_of);
            assert_eq!(
                satisfied,
                out_value == expected,
                "inputs={:?} out={} expected out={}\nclauses:\n{}",
                values,
                out_value,
                expected,
                clauses
            );
        }
    }
}
