//! Right-hand side model terms

use crate::formula::error::{FormulaError, FormulaResult};
use std::fmt;

#[derive(Debug, Clone)]
pub enum Term {
    Variable(String),
    /// Elementwise product of two or more variables, written `a:b`
    Interaction(Vec<String>),
    Function { name: String, args: Vec<Term> },
    /// Numeric literal; only valid as a function argument such as a `poly` degree
    Literal(String),
}

impl Term {
    pub fn variable(name: &str) -> Self {
        Term::Variable(name.to_string())
    }

    pub fn function(name: &str, args: Vec<Term>) -> Self {
        Term::Function {
            name: name.to_string(),
            args,
        }
    }

    pub fn literal(text: &str) -> Self {
        Term::Literal(text.to_string())
    }

    /// A main effect for one variable, an interaction for several
    pub fn from_variables(mut variables: Vec<String>) -> Self {
        if variables.len() == 1 {
            Term::Variable(variables.remove(0))
        } else {
            Term::Interaction(variables)
        }
    }

    /// Variables multiplied together by this term.
    ///
    /// Function terms cannot take part in an interaction.
    pub fn interaction_variables(&self) -> FormulaResult<Vec<String>> {
        match self {
            Term::Variable(name) => Ok(vec![name.clone()]),
            Term::Interaction(variables) => Ok(variables.clone()),
            Term::Function { .. } | Term::Literal(_) => Err(FormulaError::InvalidTerm {
                term: self.to_string(),
            }),
        }
    }

    /// Append every data column the term reads to `out`, skipping repeats
    pub fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Term::Variable(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Term::Interaction(variables) => {
                for name in variables {
                    if !out.contains(name) {
                        out.push(name.clone());
                    }
                }
            }
            Term::Function { args, .. } => args.iter().for_each(|arg| arg.collect_variables(out)),
            Term::Literal(_) => {}
        }
    }
}

/// Interactions compare as variable sets: `a:b` and `b:a` are one term
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Variable(a), Term::Variable(b)) | (Term::Literal(a), Term::Literal(b)) => a == b,
            (Term::Interaction(a), Term::Interaction(b)) => {
                a.len() == b.len() && a.iter().all(|v| b.contains(v))
            }
            (
                Term::Function { name: n1, args: a1 },
                Term::Function { name: n2, args: a2 },
            ) => n1 == n2 && a1 == a2,
            _ => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) | Term::Literal(name) => f.write_str(name),
            Term::Interaction(variables) => f.write_str(&variables.join(":")),
            Term::Function { name, args } => {
                let args: Vec<String> = args.iter().map(Term::to_string).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
        }
    }
}
