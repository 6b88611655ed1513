// SPDX-License-Identifier: Apache-2.0

//! Boolean formula AST and parser for Liberty cell functions, plus the
//! classification that maps a formula onto one of the generic gate families.

use std::collections::BTreeSet;

use crate::validate::Renaming;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Input(String),
    And(Box<Term>, Box<Term>),
    Or(Box<Term>, Box<Term>),
    Xor(Box<Term>, Box<Term>),
    Negate(Box<Term>),
    Constant(bool),
}

/// Gate family a formula reduces to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaShape {
    Constant(bool),
    Buffer(String),
    Inverter(String),
    /// `negated` is the NAND form.
    And { inputs: Vec<String>, negated: bool },
    /// `negated` is the NOR form.
    Or { inputs: Vec<String>, negated: bool },
    /// `negated` is the XNOR form.
    Xor { a: String, b: String, negated: bool },
    /// Anything else; encoded from its truth table.
    General,
}

impl Term {
    /// Distinct input names in the formula, sorted.
    pub fn inputs(&self) -> Vec<String> {
        let mut v = BTreeSet::new();
        self.collect_inputs(&mut v);
        v.into_iter().collect()
    }

    fn collect_inputs(&self, v: &mut BTreeSet<String>) {
        match self {
            Term::Input(s) => {
                v.insert(s.clone());
            }
            Term::And(a, b) | Term::Or(a, b) | Term::Xor(a, b) => {
                a.collect_inputs(v);
                b.collect_inputs(v);
            }
            Term::Negate(t) => t.collect_inputs(v),
            Term::Constant(_) => {}
        }
    }

    /// Evaluates the formula with input values supplied by `value_of`.
    pub fn eval(&self, value_of: &impl Fn(&str) -> bool) -> bool {
        match self {
            Term::Input(name) => value_of(name),
            Term::And(a, b) => a.eval(value_of) && b.eval(value_of),
            Term::Or(a, b) => a.eval(value_of) || b.eval(value_of),
            Term::Xor(a, b) => a.eval(value_of) ^ b.eval(value_of),
            Term::Negate(t) => !t.eval(value_of),
            Term::Constant(c) => *c,
        }
    }

    /// Returns a copy with every input renamed under `renaming`, so that
    /// formula identifiers line up with validated pin names.
    pub fn rename_inputs(&self, renaming: Renaming) -> Term {
        match self {
            Term::Input(name) => Term::Input(renaming.apply(name)),
            Term::And(a, b) => Term::And(
                Box::new(a.rename_inputs(renaming)),
                Box::new(b.rename_inputs(renaming)),
            ),
            Term::Or(a, b) => Term::Or(
                Box::new(a.rename_inputs(renaming)),
                Box::new(b.rename_inputs(renaming)),
            ),
            Term::Xor(a, b) => Term::Xor(
                Box::new(a.rename_inputs(renaming)),
                Box::new(b.rename_inputs(renaming)),
            ),
            Term::Negate(t) => Term::Negate(Box::new(t.rename_inputs(renaming))),
            Term::Constant(c) => Term::Constant(*c),
        }
    }

    pub fn classify(&self) -> FormulaShape {
        match self {
            Term::Constant(c) => FormulaShape::Constant(*c),
            Term::Input(name) => FormulaShape::Buffer(name.clone()),
            Term::Negate(inner) => match inner.as_ref() {
                Term::Constant(c) => FormulaShape::Constant(!*c),
                Term::Input(name) => FormulaShape::Inverter(name.clone()),
                Term::Negate(t) => t.classify(),
                Term::Xor(a, b) => match (a.as_ref(), b.as_ref()) {
                    (Term::Input(a), Term::Input(b)) if a != b => FormulaShape::Xor {
                        a: a.clone(),
                        b: b.clone(),
                        negated: true,
                    },
                    _ => FormulaShape::General,
                },
                Term::And(..) | Term::Or(..) => match inner.classify() {
                    FormulaShape::And { inputs, negated } => FormulaShape::And {
                        inputs,
                        negated: !negated,
                    },
                    FormulaShape::Or { inputs, negated } => FormulaShape::Or {
                        inputs,
                        negated: !negated,
                    },
                    _ => FormulaShape::General,
                },
            },
            Term::Xor(a, b) => match (a.as_ref(), b.as_ref()) {
                (Term::Input(a), Term::Input(b)) if a != b => FormulaShape::Xor {
                    a: a.clone(),
                    b: b.clone(),
                    negated: false,
                },
                _ => FormulaShape::General,
            },
            Term::And(..) => {
                let mut leaves = Vec::new();
                self.flatten_and(&mut leaves);
                match leaf_polarity(&leaves) {
                    // a & b & c
                    Some((inputs, false)) => FormulaShape::And {
                        inputs,
                        negated: false,
                    },
                    // !a & !b & !c == !(a | b | c)
                    Some((inputs, true)) => FormulaShape::Or {
                        inputs,
                        negated: true,
                    },
                    None => FormulaShape::General,
                }
            }
            Term::Or(..) => {
                let mut leaves = Vec::new();
                self.flatten_or(&mut leaves);
                match leaf_polarity(&leaves) {
                    Some((inputs, false)) => FormulaShape::Or {
                        inputs,
                        negated: false,
                    },
                    Some((inputs, true)) => FormulaShape::And {
                        inputs,
                        negated: true,
                    },
                    None => FormulaShape::General,
                }
            }
        }
    }

    fn flatten_and<'a>(&'a self, out: &mut Vec<&'a Term>) {
        match self {
            Term::And(a, b) => {
                a.flatten_and(out);
                b.flatten_and(out);
            }
            other => out.push(other),
        }
    }

    fn flatten_or<'a>(&'a self, out: &mut Vec<&'a Term>) {
        match self {
            Term::Or(a, b) => {
                a.flatten_or(out);
                b.flatten_or(out);
            }
            other => out.push(other),
        }
    }
}

/// If every leaf is a distinct input and all leaves share one polarity,
/// returns the input names and whether they are negated.
fn leaf_polarity(leaves: &[&Term]) -> Option<(Vec<String>, bool)> {
    let mut names = Vec::with_capacity(leaves.len());
    let mut polarity: Option<bool> = None;
    for leaf in leaves {
        let (name, negated) = match leaf {
            Term::Input(name) => (name, false),
            Term::Negate(inner) => match inner.as_ref() {
                Term::Input(name) => (name, true),
                _ => return None,
            },
            _ => return None,
        };
        if *polarity.get_or_insert(negated) != negated || names.contains(name) {
            return None;
        }
        names.push(name.clone());
    }
    polarity.map(|negated| (names, negated))
}

/// Parse a Liberty boolean formula string into a Term AST.
pub fn parse_formula(s: &str) -> Result<Term, String> {
    let tokens = tokenize(s)?;
    let (term, rest) = parse_expr(&tokens)?;
    if !rest.is_empty() {
        return Err(format!("Unexpected tokens at end: {:?}", rest));
    }
    Ok(term)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    LParen,
    RParen,
    And,
    Or,
    Xor,
    Not,
    PostNot,
    Const(bool),
}

fn tokenize(s: &str) -> Result<Vec<Tok>, String> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' | '"' => {
                chars.next();
            }
            '(' => {
                tokens.push(Tok::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Tok::RParen);
                chars.next();
            }
            '*' | '&' => {
                tokens.push(Tok::And);
                chars.next();
            }
            '+' | '|' => {
                tokens.push(Tok::Or);
                chars.next();
            }
            '^' => {
                tokens.push(Tok::Xor);
                chars.next();
            }
            '!' => {
                tokens.push(Tok::Not);
                chars.next();
            }
            '\'' => {
                tokens.push(Tok::PostNot);
                chars.next();
            }
            '1' => {
                tokens.push(Tok::Const(true));
                chars.next();
            }
            '0' => {
                tokens.push(Tok::Const(false));
                chars.next();
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_ascii_alphanumeric() || c2 == '_' {
                        ident.push(c2);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Ident(ident));
            }
            _ => return Err(format!("Unexpected character in formula: '{}'", c)),
        }
    }
    Ok(tokens)
}

// Recursive descent parser, lowest precedence first: | then & then ^ then
// unary negation.
fn parse_expr(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    parse_or(tokens)
}

fn parse_or(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    let (mut lhs, mut rest) = parse_and(tokens)?;
    while let Some(Tok::Or) = rest.first() {
        rest = &rest[1..];
        let (rhs, rest2) = parse_and(rest)?;
        lhs = Term::Or(Box::new(lhs), Box::new(rhs));
        rest = rest2;
    }
    Ok((lhs, rest))
}

fn parse_and(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    let (mut lhs, mut rest) = parse_xor(tokens)?;
    while let Some(Tok::And) = rest.first() {
        rest = &rest[1..];
        let (rhs, rest2) = parse_xor(rest)?;
        lhs = Term::And(Box::new(lhs), Box::new(rhs));
        rest = rest2;
    }
    Ok((lhs, rest))
}

fn parse_xor(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    let (mut lhs, mut rest) = parse_not(tokens)?;
    while let Some(Tok::Xor) = rest.first() {
        rest = &rest[1..];
        let (rhs, rest2) = parse_not(rest)?;
        lhs = Term::Xor(Box::new(lhs), Box::new(rhs));
        rest = rest2;
    }
    Ok((lhs, rest))
}

fn parse_not(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    if let Some(Tok::Not) = tokens.first() {
        let (expr, rest) = parse_not(&tokens[1..])?;
        Ok((Term::Negate(Box::new(expr)), rest))
    } else {
        let (mut expr, mut rest) = parse_atom(tokens)?;
        while let Some(Tok::PostNot) = rest.first() {
            expr = Term::Negate(Box::new(expr));
            rest = &rest[1..];
        }
        Ok((expr, rest))
    }
}

fn parse_atom(tokens: &[Tok]) -> Result<(Term, &[Tok]), String> {
    match tokens.first() {
        Some(Tok::Ident(s)) => Ok((Term::Input(s.clone()), &tokens[1..])),
        Some(Tok::Const(b)) => Ok((Term::Constant(*b), &tokens[1..])),
        Some(Tok::LParen) => {
            let (expr, rest) = parse_expr(&tokens[1..])?;
            match rest.first() {
                Some(Tok::RParen) => Ok((expr, &rest[1..])),
                _ => Err("Expected ')'".to_string()),
            }
        }
        Some(tok) => Err(format!("Unexpected token: {:?}", tok)),
        None => Err("Unexpected end of input".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(s: &str) -> Box<Term> {
        Box::new(Term::Input(s.to_string()))
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple_and() {
        assert_eq!(
            parse_formula("(A & B)").unwrap(),
            Term::And(input("A"), input("B"))
        );
        assert_eq!(
            parse_formula("(A * B)").unwrap(),
            Term::And(input("A"), input("B"))
        );
    }

    #[test]
    fn test_parse_simple_or() {
        assert_eq!(
            parse_formula("(A | B)").unwrap(),
            Term::Or(input("A"), input("B"))
        );
    }

    #[test]
    fn test_parse_xor_binds_tighter_than_and() {
        assert_eq!(
            parse_formula("A & B ^ C").unwrap(),
            Term::And(input("A"), Box::new(Term::Xor(input("B"), input("C"))))
        );
    }

    #[test]
    fn test_parse_postfix_negation() {
        assert_eq!(
            parse_formula("A'").unwrap(),
            Term::Negate(input("A"))
        );
        assert_eq!(
            parse_formula("(A & B)'").unwrap(),
            Term::Negate(Box::new(Term::And(input("A"), input("B"))))
        );
    }

    #[test]
    fn test_parse_nested() {
        let t = parse_formula("(!(A * (B + C)))").unwrap();
        assert_eq!(
            t,
            Term::Negate(Box::new(Term::And(
                input("A"),
                Box::new(Term::Or(input("B"), input("C")))
            )))
        );
    }

    #[test]
    fn test_parse_constants_and_errors() {
        assert_eq!(parse_formula("1").unwrap(), Term::Constant(true));
        assert_eq!(parse_formula("0").unwrap(), Term::Constant(false));
        assert!(parse_formula("(A * )").is_err());
        assert!(parse_formula("(A ^ )").is_err());
        assert!(parse_formula("(!)").is_err());
        assert!(parse_formula("").is_err());
        assert!(parse_formula("A $ B").is_err());
    }

    #[test]
    fn test_inputs_are_distinct_and_sorted() {
        let t = parse_formula("((S & B) | (A & !S))").unwrap();
        assert_eq!(t.inputs(), names(&["A", "B", "S"]));
    }

    #[test]
    fn test_eval_mux() {
        let t = parse_formula("((S & B) | (A & !S))").unwrap();
        assert!(t.eval(&|n: &str| n == "B" || n == "S"));
        assert!(!t.eval(&|n: &str| n == "A" || n == "S"));
        assert!(t.eval(&|n: &str| n == "A"));
    }

    #[test]
    fn test_rename_inputs() {
        let t = parse_formula("((S & B) | (A & !S))").unwrap();
        let renamed = t.rename_inputs(Renaming::Canonical);
        assert_eq!(renamed.inputs(), names(&["A", "B", "L"]));
        assert_eq!(t.rename_inputs(Renaming::Verbatim), t);
    }

    #[test]
    fn test_classify_families() {
        let shape = |s: &str| parse_formula(s).unwrap().classify();
        assert_eq!(shape("A"), FormulaShape::Buffer("A".to_string()));
        assert_eq!(shape("!A"), FormulaShape::Inverter("A".to_string()));
        assert_eq!(shape("!!A"), FormulaShape::Buffer("A".to_string()));
        assert_eq!(shape("0"), FormulaShape::Constant(false));
        assert_eq!(shape("!0"), FormulaShape::Constant(true));
        assert_eq!(
            shape("(A1 & A2 & A3)"),
            FormulaShape::And {
                inputs: names(&["A1", "A2", "A3"]),
                negated: false
            }
        );
        assert_eq!(
            shape("!(A1 & A2)"),
            FormulaShape::And {
                inputs: names(&["A1", "A2"]),
                negated: true
            }
        );
        assert_eq!(
            shape("!(A1 | A2 | A3 | A4)"),
            FormulaShape::Or {
                inputs: names(&["A1", "A2", "A3", "A4"]),
                negated: true
            }
        );
        assert_eq!(
            shape("(!A1 | !A2)"),
            FormulaShape::And {
                inputs: names(&["A1", "A2"]),
                negated: true
            }
        );
        assert_eq!(
            shape("(!A1 & !A2)"),
            FormulaShape::Or {
                inputs: names(&["A1", "A2"]),
                negated: true
            }
        );
        assert_eq!(
            shape("(A ^ B)"),
            FormulaShape::Xor {
                a: "A".to_string(),
                b: "B".to_string(),
                negated: false
            }
        );
        assert_eq!(
            shape("!(A ^ B)"),
            FormulaShape::Xor {
                a: "A".to_string(),
                b: "B".to_string(),
                negated: true
            }
        );
    }

    #[test]
    fn test_classify_general() {
        let shape = |s: &str| parse_formula(s).unwrap().classify();
        assert_eq!(shape("!(A | (B1 & B2))"), FormulaShape::General);
        assert_eq!(shape("((S & B) | (A & !S))"), FormulaShape::General);
        assert_eq!(shape("(A & !B)"), FormulaShape::General);
        assert_eq!(shape("(A & A)"), FormulaShape::General);
        assert_eq!(shape("(A ^ A)"), FormulaShape::General);
    }
}
