//! Wilkinson-style formula parsing and design matrix construction
//!
//! `y ~ x1 + x2` names the response on the left of `~` and the model terms
//! on the right. [`FormulaParser`] documents the grammar; [`Formula::design`]
//! turns a parsed formula into a [`Design`] matrix.

use std::str::FromStr;

pub mod error;
mod design;
mod parser;
mod term;


pub use design::{Design, INTERCEPT, LevelMap};
pub use error::{FormulaError, FormulaResult};
pub use parser::FormulaParser;
pub use term::Term;

/// A parsed model formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Left of `~`; required for fitting
    pub response: Option<String>,
    /// Right-hand side terms after crossing and removal, without repeats
    pub terms: Vec<Term>,
    pub has_intercept: bool,
    /// Input text with outer whitespace trimmed
    pub original: String,
}

impl Formula {
    pub fn parse(formula: &str) -> FormulaResult<Self> {
        FormulaParser::parse(formula)
    }

    /// Data columns the formula reads, response first, in order of appearance
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = self.response.iter().cloned().collect();
        for term in &self.terms {
            term.collect_variables(&mut vars);
        }
        vars
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Formula::parse(s)
    }
}

/// Canonical form: `y ~ a + b + a:b`, with `0 + ...` when the intercept is off
impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rhs: Vec<String> = Vec::with_capacity(self.terms.len() + 1);
        if !self.has_intercept {
            rhs.push("0".to_string());
        } else if self.terms.is_empty() {
            rhs.push("1".to_string());
        }
        rhs.extend(self.terms.iter().map(Term::to_string));

        match &self.response {
            Some(response) => write!(f, "{} ~ {}", response, rhs.join(" + ")),
            None => write!(f, "~ {}", rhs.join(" + ")),
        }
    }
}
