// SPDX-License-Identifier: Apache-2.0

//! Signed SAT literals in DIMACS convention.
//!
//! The magnitude of a `Literal` is the variable id and the sign is its
//! polarity. Variable `0` does not exist. Variables `1` and `2` are reserved
//! for the boolean constants: `ONE` is constrained true and `ZERO` is
//! constrained false by `reserved_constant_clauses`, which must be part of any
//! formula the per-gate clauses are added to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Literal(i64);

/// Reserved literal for the constant `true`.
pub const ONE: Literal = Literal(1);

/// Reserved literal for the constant `false`.
pub const ZERO: Literal = Literal(2);

/// First variable id available to callers that allocate their own literals.
pub const FIRST_FREE_VAR: i64 = 3;

/// Largest variable id a `Literal` may refer to: the number of variables
/// varisat can represent.
pub fn max_var() -> u64 {
    varisat::Var::max_count() as u64
}

impl Literal {
    /// Returns `None` for `0`, which is not a valid DIMACS literal, and for
    /// any value whose variable id exceeds `max_var()`.
    pub fn new(value: i64) -> Option<Self> {
        if value == 0 || value.unsigned_abs() > max_var() {
            None
        } else {
            Some(Literal(value))
        }
    }

    pub fn to_dimacs(self) -> i64 {
        self.0
    }

    pub fn var(self) -> u64 {
        self.0.unsigned_abs()
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether this literal refers to one of the reserved constant variables
    /// (in either polarity).
    pub fn is_reserved(self) -> bool {
        self.var() == ONE.var() || self.var() == ZERO.var()
    }

    /// Returns the constant value this literal denotes, if it is a reserved
    /// literal.
    pub fn constant_value(self) -> Option<bool> {
        match self {
            l if l == ONE || l == !ZERO => Some(true),
            l if l == ZERO || l == !ONE => Some(false),
            _ => None,
        }
    }

    pub fn to_varisat(self) -> varisat::Lit {
        varisat::Lit::from_dimacs(self.0 as isize)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal(-self.0)
    }
}

impl TryFrom<i64> for Literal {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Literal::new(value).ok_or_else(|| {
            if value == 0 {
                "0 is not a valid literal".to_string()
            } else {
                format!(
                    "literal {} exceeds the maximum variable id {}",
                    value,
                    max_var()
                )
            }
        })
    }
}

impl From<Literal> for i64 {
    fn from(lit: Literal) -> i64 {
        lit.0
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two unit clauses fixing the reserved constants: `[ONE]` and `[-ZERO]`.
pub fn reserved_constant_clauses() -> Vec<Vec<Literal>> {
    vec![vec![ONE], vec![!ZERO]]
}

/// Hands out fresh positive literals, skipping the reserved variables.
///
/// The circuit-graph side normally owns variable allocation; this is the
/// minimal version used by the CLI and by tests.
#[derive(Debug, Clone)]
pub struct LiteralAllocator {
    next: i64,
}

impl LiteralAllocator {
    pub fn new() -> Self {
        LiteralAllocator {
            next: FIRST_FREE_VAR,
        }
    }

    /// Returns `None` once the variable space is exhausted.
    pub fn fresh(&mut self) -> Option<Literal> {
        let lit = Literal::new(self.next)?;
        self.next += 1;
        Some(lit)
    }

    /// Number of variables in use so far, reserved ones included.
    pub fn var_count(&self) -> u64 {
        (self.next - 1) as u64
    }
}

impl Default for LiteralAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_literal() {
        assert!(Literal::new(0).is_none());
        assert!(Literal::try_from(0i64).is_err());
        assert_eq!(Literal::try_from(-7i64).unwrap().to_dimacs(), -7);
    }

    #[test]
    fn test_negation_flips_polarity_only() {
        let l = Literal::new(42).unwrap();
        assert_eq!((!l).to_dimacs(), -42);
        assert_eq!((!l).var(), 42);
        assert_eq!(!!l, l);
        assert!(!(!l).is_positive());
    }

    #[test]
    fn test_constant_values() {
        assert_eq!(ONE.constant_value(), Some(true));
        assert_eq!(ZERO.constant_value(), Some(false));
        assert_eq!((!ONE).constant_value(), Some(false));
        assert_eq!((!ZERO).constant_value(), Some(true));
        assert_eq!(Literal::new(5).unwrap().constant_value(), None);
        assert!((!ZERO).is_reserved());
    }

    #[test]
    fn test_allocator_skips_reserved_vars() {
        let mut alloc = LiteralAllocator::new();
        let a = alloc.fresh().unwrap();
        let b = alloc.fresh().unwrap();
        assert!(!a.is_reserved());
        assert_eq!(a.to_dimacs(), FIRST_FREE_VAR);
        assert_eq!(b.to_dimacs(), FIRST_FREE_VAR + 1);
        assert_eq!(alloc.var_count(), 4);
    }

    #[test]
    fn test_serde_rejects_zero() {
        let l: Literal = serde_json::from_str("-5").unwrap();
        assert_eq!(l.to_dimacs(), -5);
        assert_eq!(serde_json::to_string(&l).unwrap(), "-5");
        assert!(serde_json::from_str::<Literal>("0").is_err());
    }

    #[test]
    fn test_magnitude_bounded_by_varisat() {
        let bound = max_var() as i64;
        assert_eq!(Literal::new(bound).unwrap().to_varisat().to_dimacs(), bound as isize);
        assert_eq!(Literal::new(-bound).unwrap().var(), bound as u64);
        assert!(Literal::new(bound + 1).is_none());
        assert!(Literal::new(-(bound + 1)).is_none());
        assert!(Literal::new(i64::MIN).is_none());
        assert!(Literal::new(i64::MAX).is_none());
        let err = Literal::try_from(5_000_000_000i64).unwrap_err();
        assert!(err.contains("exceeds"), "{}", err);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Literal>("-9223372036854775808").is_err());
        assert!(serde_json::from_str::<Literal>("5000000000").is_err());
    }

    #[test]
    fn test_to_varisat_preserves_sign() {
        let l = Literal::new(-9).unwrap();
        assert_eq!(l.to_varisat().to_dimacs(), -9);
    }
}
