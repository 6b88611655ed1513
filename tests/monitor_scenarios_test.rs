// SPDX-License-Identifier: Apache-2.0

//! End-to-end checks of the reduction monitors, constant sources and dispatch
//! failures through the public compiler entry point, with varisat as the
//! clause sink where satisfiability matters.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use test_case::test_case;
use xlsynth_faultcnf::cnf::{ClauseSet, Formula};
use xlsynth_faultcnf::compile::{GateInstance, compile_gate};
use xlsynth_faultcnf::dispatch::DispatchTable;
use xlsynth_faultcnf::error::CompileError;
use xlsynth_faultcnf::literal::{Literal, ONE};
use xlsynth_faultcnf::test_utils::{lit, pin_map};

fn monitor_gate(cell: &str, inputs: &[i64], out: i64) -> GateInstance {
    let mut pins: Vec<(String, i64)> = inputs
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("A{}", i + 1), *v))
        .collect();
    pins.push(("node_name".to_string(), out));
    let pins = pins.iter().map(|(k, v)| (k.clone(), lit(*v))).collect();
    GateInstance::new("mon", cell, "O", pins)
}

fn as_sets(clauses: &ClauseSet) -> BTreeSet<BTreeSet<i64>> {
    clauses
        .iter()
        .map(|c| c.iter().map(|l| l.to_dimacs()).collect())
        .collect()
}

#[test]
fn test_three_input_and_monitor_clauses() {
    let _ = env_logger::builder().is_test(true).try_init();
    let table = DispatchTable::builtin();
    let gate = GateInstance::new(
        "mon",
        "and",
        "O",
        pin_map(&[("A1", 10), ("A2", 11), ("A3", 12), ("node_name", 13)]),
    );
    let mut sink = ClauseSet::new();
    let n = compile_gate(&table, &gate, &mut sink).unwrap();
    assert_eq!(n, 5);
    let expected: BTreeSet<BTreeSet<i64>> = [
        vec![10, -13],
        vec![11, -13],
        vec![12, -13],
        vec![13, -10, -11, -12],
        vec![13],
    ]
    .into_iter()
    .map(|c| c.into_iter().collect())
    .collect();
    assert_eq!(as_sets(&sink), expected);
}

#[test]
fn test_unknown_cell_fails_dispatch() {
    let table = DispatchTable::builtin();
    let gate = GateInstance::new("u0", "FOO42", "Z", pin_map(&[("A", 3), ("node_name", 4)]));
    let mut sink = ClauseSet::new();
    assert_eq!(
        compile_gate(&table, &gate, &mut sink),
        Err(CompileError::UnknownCell {
            cell: "FOO42".to_string(),
            pin: "Z".to_string()
        })
    );
    assert_eq!(sink.len(), 0);
}

#[test]
fn test_constant_source_bound_to_one() {
    let table = DispatchTable::builtin();
    let out = lit(5);
    let pins = [("I1".to_string(), ONE), ("node_name".to_string(), out)]
        .into_iter()
        .collect();
    let gate = GateInstance::new("tie", "input_formula", "O", pins);
    let mut sink = ClauseSet::new();
    compile_gate(&table, &gate, &mut sink).unwrap();
    assert_eq!(sink.into_clauses(), vec![vec![!ONE, out], vec![ONE, !out]]);
}

#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
#[test_case(7)]
fn test_and_monitor_forces_output(n: usize) {
    let table = DispatchTable::builtin();
    let inputs: Vec<i64> = (0..n as i64).map(|i| 10 + i).collect();
    let out = 100;
    let mut formula = Formula::new();
    compile_gate(&table, &monitor_gate("and", &inputs, out), &mut formula).unwrap();

    // Monitor output can never be false.
    assert_eq!(formula.solve(&[!lit(out)]).unwrap(), None);
    // Forcing true implies every input is true.
    let model = formula.solve(&[]).unwrap().expect("satisfiable");
    for i in &inputs {
        assert!(model.contains(&lit(*i)), "input {} should be true", i);
    }
    // Any false input makes the whole thing unsatisfiable.
    assert_eq!(formula.solve(&[!lit(inputs[0])]).unwrap(), None);
}

#[test_case(1)]
#[test_case(2)]
#[test_case(5)]
fn test_or_monitor_leaves_output_free(n: usize) {
    let table = DispatchTable::builtin();
    let inputs: Vec<i64> = (0..n as i64).map(|i| 10 + i).collect();
    let out = 100;
    let mut formula = Formula::new();
    compile_gate(&table, &monitor_gate("or", &inputs, out), &mut formula).unwrap();

    assert!(formula.solve(&[!lit(out)]).unwrap().is_some());
    assert!(formula.solve(&[lit(out)]).unwrap().is_some());

    // All inputs false forces the output false, and vice versa.
    let all_false: Vec<Literal> = inputs.iter().map(|i| !lit(*i)).collect();
    let mut with_out = all_false.clone();
    with_out.push(lit(out));
    assert_eq!(formula.solve(&with_out).unwrap(), None);
    let mut one_true = all_false;
    one_true[n - 1] = lit(inputs[n - 1]);
    one_true.push(!lit(out));
    assert_eq!(formula.solve(&one_true).unwrap(), None);
}

#[test]
fn test_xor_models() {
    let table = DispatchTable::builtin();
    for (cell, parity) in [("xor", true), ("xnor", false)] {
        let gate = GateInstance::new(
            "x",
            cell,
            "O",
            pin_map(&[("I1", 10), ("I2", 11), ("node_name", 12)]),
        );
        let mut formula = Formula::new();
        compile_gate(&table, &gate, &mut formula).unwrap();
        let mut models = 0;
        for bits in 0..8 {
            let value = |i: usize| (bits >> i) & 1 == 1;
            let assumptions: Vec<Literal> = (0..3)
                .map(|i| if value(i) { lit(10 + i as i64) } else { !lit(10 + i as i64) })
                .collect();
            let sat = formula.solve(&assumptions).unwrap().is_some();
            let consistent = value(2) == ((value(0) ^ value(1)) == parity);
            assert_eq!(sat, consistent, "{} bits={:03b}", cell, bits);
            if sat {
                models += 1;
            }
        }
        assert_eq!(models, 4);
    }
}
