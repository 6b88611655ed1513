// SPDX-License-Identifier: Apache-2.0

//! Tseitin-style clause emission for each gate family.
//!
//! Every function here is pure: it takes already-validated literals and
//! returns the clause block that makes `out` equivalent to the gate's
//! function of its inputs. The N-ary encoders are total for N >= 1; with
//! N = 1 they reduce to the buffer encoding without special casing.

use crate::cell_formula::Term;
use crate::cnf::ClauseSet;
use crate::literal::Literal;

/// Widest general formula encoded through its truth table.
pub const MAX_TRUTH_TABLE_INPUTS: usize = 10;

// out <-> in:
// (!in | out) & (in | !out)
pub fn encode_buffer(input: Literal, out: Literal) -> ClauseSet {
    ClauseSet::from(vec![vec![!input, out], vec![input, !out]])
}

// out <-> !in:
// (!in | !out) & (in | out)
pub fn encode_inverter(input: Literal, out: Literal) -> ClauseSet {
    ClauseSet::from(vec![vec![!input, !out], vec![input, out]])
}

/// `out <-> a_1 & ... & a_N`.
///
/// One clause `(a_i | !out)` per input, then `(out | !a_1 | ... | !a_N)`.
pub fn encode_and(inputs: &[Literal], out: Literal) -> ClauseSet {
    let mut clauses = ClauseSet::new();
    for &a in inputs {
        clauses.push(vec![a, !out]);
    }
    let mut last = Vec::with_capacity(inputs.len() + 1);
    last.push(out);
    last.extend(inputs.iter().map(|&a| !a));
    clauses.push(last);
    clauses
}

/// `out <-> a_1 | ... | a_N`.
///
/// One clause `(!a_i | out)` per input, then `(a_1 | ... | a_N | !out)`.
pub fn encode_or(inputs: &[Literal], out: Literal) -> ClauseSet {
    let mut clauses = ClauseSet::new();
    for &a in inputs {
        clauses.push(vec![!a, out]);
    }
    let mut last = Vec::with_capacity(inputs.len() + 1);
    last.extend(inputs.iter().copied());
    last.push(!out);
    clauses.push(last);
    clauses
}

// out <-> a ^ b:
// (!a | !b | !out) & (a | b | !out) & (a | !b | out) & (!a | b | out)
pub fn encode_xor(a: Literal, b: Literal, out: Literal) -> ClauseSet {
    ClauseSet::from(vec![
        vec![!a, !b, !out],
        vec![a, b, !out],
        vec![a, !b, out],
        vec![!a, b, out],
    ])
}

// out <-> !(a ^ b):
// (!a | !b | out) & (a | b | out) & (a | !b | !out) & (!a | b | !out)
pub fn encode_xnor(a: Literal, b: Literal, out: Literal) -> ClauseSet {
    ClauseSet::from(vec![
        vec![!a, !b, out],
        vec![a, b, out],
        vec![a, !b, !out],
        vec![!a, b, !out],
    ])
}

/// `out <-> selector` where the selector is one of the reserved constant
/// literals. The caller is responsible for checking that it is.
pub fn encode_constant(selector: Literal, out: Literal) -> ClauseSet {
    encode_buffer(selector, out)
}

/// Flip-flops are treated as a combinational pass-through: `q <-> d`, or
/// `q <-> !d` for the inverting output.
pub fn encode_register(d: Literal, q: Literal, inverting: bool) -> ClauseSet {
    if inverting {
        encode_inverter(d, q)
    } else {
        encode_buffer(d, q)
    }
}

/// AND-reduction monitor: the AND encoding plus the unit clause `[out]`,
/// which makes the monitor a hard constraint rather than a definition.
pub fn encode_and_monitor(inputs: &[Literal], out: Literal) -> ClauseSet {
    let mut clauses = encode_and(inputs, out);
    clauses.push(vec![out]);
    clauses
}

/// OR-reduction monitor: the OR encoding; `out` stays free.
pub fn encode_or_monitor(inputs: &[Literal], out: Literal) -> ClauseSet {
    encode_or(inputs, out)
}

/// Exact encoding of an arbitrary formula from its truth table.
///
/// `inputs` pairs each formula identifier with its literal. For every input
/// assignment `m` one clause is emitted stating `inputs == m -> out == f(m)`,
/// so the block has `2^k` clauses of `k + 1` literals. Assignment `m` sets
/// input `i` to bit `i` of `m`.
pub fn encode_truth_table(term: &Term, inputs: &[(String, Literal)], out: Literal) -> ClauseSet {
    assert!(
        inputs.len() <= MAX_TRUTH_TABLE_INPUTS,
        "truth table encoding requested for {} inputs",
        inputs.len()
    );
    let mut clauses = ClauseSet::new();
    for m in 0u32..(1u32 << inputs.len()) {
        let bit = |i: usize| (m >> i) & 1 == 1;
        let value = term.eval(&|name: &str| {
            inputs
                .iter()
                .position(|(n, _)| n == name)
                .map(bit)
                .unwrap_or(false)
        });
        let mut clause: Vec<Literal> = inputs
            .iter()
            .enumerate()
            .map(|(i, (_, lit))| if bit(i) { !*lit } else { *lit })
            .collect();
        clause.push(if value { out } else { !out });
        clauses.push(clause);
    }
    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_formula::parse_formula;
    use crate::literal::{ONE, ZERO};
    use crate::test_utils::{assert_defines, lit};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn lits(vs: &[i64]) -> Vec<Literal> {
        vs.iter().map(|&v| lit(v)).collect()
    }

    #[test]
    fn test_buffer_and_inverter_clauses() {
        assert_eq!(
            encode_buffer(lit(3), lit(4)).into_clauses(),
            vec![lits(&[-3, 4]), lits(&[3, -4])]
        );
        assert_eq!(
            encode_inverter(lit(3), lit(4)).into_clauses(),
            vec![lits(&[-3, -4]), lits(&[3, 4])]
        );
        assert_defines(&encode_buffer(lit(3), lit(4)), &lits(&[3]), lit(4), |v| v[0]);
        assert_defines(&encode_inverter(lit(3), lit(4)), &lits(&[3]), lit(4), |v| !v[0]);
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    #[test_case(4)]
    #[test_case(6)]
    #[test_case(9)]
    fn test_and_defines_conjunction(n: usize) {
        let inputs: Vec<Literal> = (0..n).map(|i| lit(10 + i as i64)).collect();
        let out = lit(100);
        let clauses = encode_and(&inputs, out);
        assert_eq!(clauses.len(), n + 1);
        assert_defines(&clauses, &inputs, out, |v| v.iter().all(|&b| b));
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    #[test_case(4)]
    #[test_case(6)]
    #[test_case(9)]
    fn test_or_defines_disjunction(n: usize) {
        let inputs: Vec<Literal> = (0..n).map(|i| lit(10 + i as i64)).collect();
        let out = lit(100);
        let clauses = encode_or(&inputs, out);
        assert_eq!(clauses.len(), n + 1);
        assert_defines(&clauses, &inputs, out, |v| v.iter().any(|&b| b));
    }

    #[test]
    fn test_single_input_and_or_reduce_to_buffer() {
        assert_eq!(
            encode_and(&[lit(5)], lit(6)).into_clauses(),
            vec![lits(&[5, -6]), lits(&[6, -5])]
        );
        assert_eq!(
            encode_or(&[lit(5)], lit(6)).into_clauses(),
            vec![lits(&[-5, 6]), lits(&[5, -6])]
        );
    }

    #[test]
    fn test_and_with_negated_output_is_nand() {
        let inputs = lits(&[10, 11]);
        assert_defines(&encode_and(&inputs, !lit(12)), &inputs, lit(12), |v| {
            !(v[0] && v[1])
        });
    }

    #[test]
    fn test_xor_xnor() {
        let ab = lits(&[10, 11]);
        let xor = encode_xor(ab[0], ab[1], lit(12));
        let xnor = encode_xnor(ab[0], ab[1], lit(12));
        assert_eq!(xor.len(), 4);
        assert_eq!(xnor.len(), 4);
        assert_defines(&xor, &ab, lit(12), |v| v[0] ^ v[1]);
        assert_defines(&xnor, &ab, lit(12), |v| !(v[0] ^ v[1]));
    }

    #[test]
    fn test_constant_source_bound_to_one() {
        assert_eq!(
            encode_constant(ONE, lit(7)).into_clauses(),
            vec![vec![!ONE, lit(7)], vec![ONE, !lit(7)]]
        );
        assert_eq!(
            encode_constant(ZERO, lit(7)).into_clauses(),
            vec![vec![!ZERO, lit(7)], vec![ZERO, !lit(7)]]
        );
    }

    #[test]
    fn test_register_variants() {
        assert_eq!(encode_register(lit(3), lit(4), false), encode_buffer(lit(3), lit(4)));
        assert_eq!(encode_register(lit(3), lit(4), true), encode_inverter(lit(3), lit(4)));
    }

    #[test]
    fn test_and_monitor_adds_unit_clause() {
        let clauses = encode_and_monitor(&lits(&[10, 11, 12]), lit(13));
        assert_eq!(
            clauses.into_clauses(),
            vec![
                lits(&[10, -13]),
                lits(&[11, -13]),
                lits(&[12, -13]),
                lits(&[13, -10, -11, -12]),
                lits(&[13]),
            ]
        );
        assert_eq!(
            encode_or_monitor(&lits(&[10, 11]), lit(13)),
            encode_or(&lits(&[10, 11]), lit(13))
        );
    }

    #[test]
    fn test_truth_table_matches_formula() {
        let term = parse_formula("!(A | (B1 & B2))").unwrap();
        let inputs = vec![
            ("A".to_string(), lit(10)),
            ("B1".to_string(), lit(11)),
            ("B2".to_string(), lit(12)),
        ];
        let clauses = encode_truth_table(&term, &inputs, lit(13));
        assert_eq!(clauses.len(), 8);
        assert_defines(&clauses, &lits(&[10, 11, 12]), lit(13), |v| {
            !(v[0] || (v[1] && v[2]))
        });
    }

    #[test]
    fn test_truth_table_mux() {
        let term = parse_formula("((S & B) | (A & !S))").unwrap();
        let inputs = vec![
            ("A".to_string(), lit(10)),
            ("B".to_string(), lit(11)),
            ("S".to_string(), lit(12)),
        ];
        let clauses = encode_truth_table(&term, &inputs, lit(13));
        assert_defines(&clauses, &lits(&[10, 11, 12]), lit(13), |v| {
            if v[2] { v[1] } else { v[0] }
        });
    }
}
