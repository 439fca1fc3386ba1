//! Pattern compiler and backtracking matching engine.
//!
//! A pattern string compiles once into an immutable node tree; matching
//! threads an explicit continuation through the tree so quantifiers can
//! retry repetition counts against whatever follows them.
//!
//! # Pattern syntax
//!
//! | Token             | Meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `x`               | Literal character                              |
//! | `.`               | Any character except newline                   |
//! | `^`               | Start of text (first element of a branch only) |
//! | `$`               | End of text                                    |
//! | `[abx-z]`         | Character class with ranges                    |
//! | `[^...]`          | Negated character class                        |
//! | `\d \D \w \W \s \S` | Builtin classes and their complements        |
//! | `\n \r \t \f \a \e` | Control characters                           |
//! | `\xHH` `\x{H...}` | Hex-coded bytes                                |
//! | `\nnn` `\o{n...}` | Octal-coded bytes                              |
//! | `\c`              | Any other escape: the literal `c`              |
//! | `(...)`           | Capturing group                                |
//! | `(?:...)`         | Non-capturing group                            |
//! | `X\|Y`            | Alternation, first viable branch wins          |
//! | `* + ?`           | Zero-or-more, one-or-more, optional            |
//! | `{m} {m,} {m,n}`  | Counted repetition                             |
//! | `...?`            | Lazy variant of the preceding quantifier       |
//! | `...+`            | Possessive variant of the preceding quantifier |

pub mod ast;
pub mod char_class;
pub mod find;
pub mod matcher;
pub mod parser;
pub mod scan;
pub mod token;

pub use ast::{Node, Pattern, Policy};
pub use char_class::ClassSet;
pub use find::MatchResult;
pub use matcher::Span;
pub use parser::{PatternError, compile};
