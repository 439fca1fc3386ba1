//! A backtracking regular-expression engine with pattern-driven
//! tokenization.
//!
//! Patterns compile once into an immutable node tree and can then be
//! matched against any number of texts, concurrently if desired. Matching
//! threads an explicit continuation through the tree, which is what lets
//! greedy, lazy and possessive quantifiers retry repetition counts
//! against the rest of the pattern. A [`Lexer`] composes two patterns
//! into a token splitter that classifies each token by the alternation
//! branch that matched it.
//!
//! # Example
//!
//! ```rust
//! use retrace::compile;
//!
//! let pattern = compile(r"(\w+)@(\w+)").unwrap();
//!
//! let mut m = pattern.matches("mail me: ada@lovelace");
//! assert!(m.accepted());
//! assert_eq!(m.matched().as_deref(), Some("ada@lovelace"));
//! assert_eq!(m.group_str(1).as_deref(), Some("ada"));
//! assert_eq!(m.group_str(2).as_deref(), Some("lovelace"));
//!
//! // No further match in this text.
//! assert!(!m.next());
//! ```

pub mod lexer;
pub mod pattern;

pub use lexer::{Lexer, Token, Tokens};
pub use pattern::{ClassSet, MatchResult, Pattern, PatternError, Span, compile};
