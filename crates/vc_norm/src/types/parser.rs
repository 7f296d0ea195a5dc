//! A recursive-descent parser for type expressions.
//!
//! ```text
//! union        := intersection ('|' intersection)*
//! intersection := atomic ('&' atomic)*
//! atomic       := NAME? ('<' union (',' union)* '>'?)? ('{' ... '}')? ('[' ']')*
//! ```
//!
//! Shapes (`{...}`) are skipped. A missing name stands for `mixed`.
//! The parser never fails: trailing or malformed tokens are consumed
//! and the best-effort prefix is returned.

use alloc::string::String;
use alloc::vec::Vec;

/// A union of intersections.
pub type Union = Vec<Intersection>;

/// An intersection of atoms.
pub type Intersection = Vec<Atom>;

/// A named type with its generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub name: String,
    pub generics: Vec<Union>,
}

impl Atom {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    #[inline]
    pub fn with_generics(name: impl Into<String>, generics: Vec<Union>) -> Self {
        Self {
            name: name.into(),
            generics,
        }
    }
}

const META_TOKENS: [char; 9] = ['&', '|', '{', '}', '<', '>', ',', '[', ']'];

/// Parses a type expression.
///
/// # Examples
///
/// ```
/// use vc_norm::types::parser::{parse, Atom};
///
/// let union = parse("list<int>|null");
/// assert_eq!(union.len(), 2);
/// assert_eq!(union[0][0].name, "list");
/// assert_eq!(union[0][0].generics, [vec![vec![Atom::new("int")]]]);
/// assert_eq!(union[1][0], Atom::new("null"));
/// ```
pub fn parse(expression: &str) -> Union {
    let mut state = State {
        tokens: tokenize(expression),
        position: 0,
    };
    state.union()
}

/// Splits on meta tokens, keeping them, and drops empty pieces.
fn tokenize(expression: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (index, c) in expression.char_indices() {
        if META_TOKENS.contains(&c) {
            if start < index {
                tokens.push(&expression[start..index]);
            }
            tokens.push(&expression[index..index + c.len_utf8()]);
            start = index + c.len_utf8();
        }
    }
    if start < expression.len() {
        tokens.push(&expression[start..]);
    }
    tokens
}

struct State<'a> {
    tokens: Vec<&'a str>,
    position: usize,
}

impl<'a> State<'a> {
    #[inline]
    fn has_more(&self) -> bool {
        self.position < self.tokens.len()
    }

    fn is_symbol(&self) -> bool {
        self.tokens
            .get(self.position)
            .is_some_and(|token| !is_meta(token))
    }

    fn consume(&mut self, expected: &str) -> bool {
        if self.tokens.get(self.position) == Some(&expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position).copied();
        self.position += 1;
        token
    }

    fn union(&mut self) -> Union {
        let mut types = Vec::new();
        loop {
            types.push(self.intersection());
            if !self.consume("|") {
                return types;
            }
        }
    }

    fn intersection(&mut self) -> Intersection {
        let mut types = Vec::new();
        loop {
            types.push(self.atomic());
            if !self.consume("&") {
                return types;
            }
        }
    }

    fn atomic(&mut self) -> Atom {
        let mut name = if self.is_symbol() {
            self.next().map(str::trim).unwrap_or_default().into()
        } else {
            String::from("mixed")
        };

        let mut generics = Vec::new();
        if self.consume("<") {
            loop {
                generics.push(self.union());
                if !self.consume(",") {
                    break;
                }
            }
            self.consume(">");
        }

        if self.consume("{") {
            let mut depth = 1;
            while self.has_more() && depth > 0 {
                if self.consume("{") {
                    depth += 1;
                } else if self.consume("}") {
                    depth -= 1;
                } else {
                    self.next();
                }
            }
        }

        while self.consume("[") && self.consume("]") {
            name.push_str("[]");
        }

        Atom::with_generics(name, generics)
    }
}

#[inline]
fn is_meta(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if META_TOKENS.contains(&c))
}
