//! Formula parser
//!
//! ```text
//! formula := [ident] '~' sum
//! sum     := ['-'] part (('+' | '-') part)*
//! part    := '0' | '1' | product
//! product := colon ('*' colon)*
//! colon   := factor (':' factor)*
//! factor  := ident | ident '(' arg (',' arg)* ')' | '(' sum ')'
//! arg     := number | ident | ident '(' ... ')'
//! ```
//!
//! `a*b` expands to `a + b + a:b`, `(a + b):c` to `a:c + b:c`, and `- term`
//! removes a term added earlier. `0`, `+ 0` and `- 1` drop the intercept.
//! An empty right-hand side is intercept-only.

use std::fmt;

use crate::formula::error::{FormulaError, FormulaResult};
use crate::formula::{Formula, Term};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Tilde,
    Plus,
    Minus,
    Star,
    Colon,
    Comma,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) => write!(f, "'{}'", s),
            Token::Tilde => f.write_str("'~'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::Open => f.write_str("'('"),
            Token::Close => f.write_str("')'"),
        }
    }
}

/// Split formula text into tokens tagged with their column
fn tokenize(input: &str) -> FormulaResult<Vec<(usize, Token)>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        i += 1;

        let token = match c {
            c if c.is_whitespace() => continue,
            '~' => Token::Tilde,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::Open,
            ')' => Token::Close,
            c if c.is_alphabetic() => {
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.')) {
                    i += 1;
                }
                Token::Ident(chars[start..i].iter().collect())
            }
            c if c.is_ascii_digit() => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                if text.parse::<f64>().is_err() {
                    return Err(FormulaError::syntax(start, format!("invalid number '{}'", text)));
                }
                Token::Number(text)
            }
            other => {
                return Err(FormulaError::syntax(
                    start,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        tokens.push((start, token));
    }

    Ok(tokens)
}

/// Terms of a sum plus an explicit intercept choice, if one was written
struct Sum {
    terms: Vec<Term>,
    intercept: Option<bool>,
}

/// Recursive-descent parser over the token stream
pub struct FormulaParser {
    tokens: Vec<(usize, Token)>,
    next: usize,
    end: usize,
}

impl FormulaParser {
    /// Parse formula text
    pub fn parse(formula: &str) -> FormulaResult<Formula> {
        if formula.trim().is_empty() {
            return Err(FormulaError::syntax(0, "empty formula"));
        }

        let mut parser = FormulaParser {
            tokens: tokenize(formula)?,
            next: 0,
            end: formula.chars().count(),
        };

        let response = match parser.peek().cloned() {
            Some(Token::Ident(name)) => {
                parser.next += 1;
                Some(name)
            }
            _ => None,
        };
        if !parser.eat(&Token::Tilde) {
            return Err(parser.unexpected("'~' after the response"));
        }

        let sum = parser.sum(false)?;
        if parser.peek().is_some() {
            return Err(parser.unexpected("'+', '-' or the end of the formula"));
        }

        Ok(Formula {
            response,
            terms: sum.terms,
            has_intercept: sum.intercept.unwrap_or(true),
            original: formula.trim().to_string(),
        })
    }

    fn sum(&mut self, nested: bool) -> FormulaResult<Sum> {
        let mut sum = Sum {
            terms: Vec::new(),
            intercept: None,
        };

        match self.peek() {
            None if !nested => return Ok(sum),
            Some(Token::Close) if nested => {
                return Err(FormulaError::syntax(self.column(), "empty parentheses"));
            }
            _ => {}
        }

        let mut adding = !self.eat(&Token::Minus);
        loop {
            match self.peek().cloned() {
                None | Some(Token::Plus) | Some(Token::Minus) => {
                    return Err(self.unexpected("a term"));
                }
                Some(Token::Number(text)) => {
                    sum.intercept = Some(match (adding, text.as_str()) {
                        (true, "1") | (false, "0") => true,
                        (true, "0") | (false, "1") => false,
                        _ => {
                            return Err(FormulaError::syntax(
                                self.column(),
                                format!("unexpected numeric literal '{}'; only 0 or 1 may stand alone", text),
                            ));
                        }
                    });
                    self.next += 1;
                }
                Some(_) => {
                    let group = self.product()?;
                    if adding {
                        group.into_iter().for_each(|t| push_unique(&mut sum.terms, t));
                    } else {
                        sum.terms.retain(|t| !group.contains(t));
                    }
                }
            }

            if self.eat(&Token::Plus) {
                adding = true;
            } else if self.eat(&Token::Minus) {
                adding = false;
            } else {
                return Ok(sum);
            }
        }
    }

    /// `a*b*c`: each factor, then its crossings with everything before it
    fn product(&mut self) -> FormulaResult<Vec<Term>> {
        let mut terms = self.colon()?;
        while self.eat(&Token::Star) {
            let right = self.colon()?;
            let crossed = self.interact(&terms, &right)?;
            right.into_iter().chain(crossed).for_each(|t| push_unique(&mut terms, t));
        }
        Ok(terms)
    }

    fn colon(&mut self) -> FormulaResult<Vec<Term>> {
        let mut terms = self.factor()?;
        while self.eat(&Token::Colon) {
            let right = self.factor()?;
            terms = self.interact(&terms, &right)?;
        }
        Ok(terms)
    }

    fn interact(&self, left: &[Term], right: &[Term]) -> FormulaResult<Vec<Term>> {
        let variables_of = |term: &Term| {
            term.interaction_variables().map_err(|_| {
                FormulaError::syntax(
                    self.column(),
                    format!("only variables can be interacted, found '{}'", term),
                )
            })
        };

        let mut out = Vec::new();
        for a in left {
            for b in right {
                let mut variables = variables_of(a)?;
                for var in variables_of(b)? {
                    if !variables.contains(&var) {
                        variables.push(var);
                    }
                }
                push_unique(&mut out, Term::from_variables(variables));
            }
        }
        Ok(out)
    }

    fn factor(&mut self) -> FormulaResult<Vec<Term>> {
        match self.peek().cloned() {
            Some(Token::Open) => {
                let open = self.column();
                self.next += 1;
                let inner = self.sum(true)?;
                if inner.intercept.is_some() {
                    return Err(FormulaError::syntax(
                        open,
                        "0 and 1 are not allowed inside parentheses",
                    ));
                }
                if !self.eat(&Token::Close) {
                    return Err(self.unexpected("')'"));
                }
                Ok(inner.terms)
            }
            Some(Token::Ident(name)) => {
                self.next += 1;
                Ok(vec![self.call_or_variable(name)?])
            }
            Some(Token::Number(text)) => Err(FormulaError::syntax(
                self.column(),
                format!("numeric literal '{}' is only allowed as a function argument", text),
            )),
            _ => Err(self.unexpected("a variable, a function call or '('")),
        }
    }

    /// After an identifier: a function call if `(` follows, else a variable
    fn call_or_variable(&mut self, name: String) -> FormulaResult<Term> {
        if !self.eat(&Token::Open) {
            return Ok(Term::Variable(name));
        }
        if self.peek() == Some(&Token::Close) {
            return Err(FormulaError::syntax(
                self.column(),
                format!("{}() needs at least one argument", name),
            ));
        }

        let mut args = Vec::new();
        loop {
            let arg = match self.peek().cloned() {
                Some(Token::Number(text)) => {
                    self.next += 1;
                    Term::Literal(text)
                }
                Some(Token::Ident(inner)) => {
                    self.next += 1;
                    self.call_or_variable(inner)?
                }
                _ => return Err(self.unexpected(&format!("an argument of {}()", name))),
            };
            args.push(arg);

            if self.eat(&Token::Close) {
                return Ok(Term::Function { name, args });
            }
            if !self.eat(&Token::Comma) {
                return Err(self.unexpected("',' or ')'"));
            }
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.next).map(|(_, token)| token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.next += 1;
            true
        } else {
            false
        }
    }

    /// Column of the next token, or the end of input
    fn column(&self) -> usize {
        self.tokens.get(self.next).map_or(self.end, |(col, _)| *col)
    }

    fn unexpected(&self, expected: &str) -> FormulaError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), Token::to_string);
        FormulaError::syntax(self.column(), format!("expected {}, found {}", expected, found))
    }
}

fn push_unique(terms: &mut Vec<Term>, term: Term) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}
