//! Token-slice scanners shared by the parser: balanced-delimiter
//! extraction and top-level alternation splitting.

use super::parser::PatternError;
use super::token::Tok;

/// Split `tokens`, whose first element must be `Char(open)`, at the
/// matching `Char(close)`. Returns the enclosed tokens and the remainder
/// after the close.
///
/// Only `Char` tokens participate in nesting: an escaped delimiter, or
/// one buried inside a brace token, never opens or closes.
pub(crate) fn extract_delimited<'a>(
    tokens: &'a [Tok],
    open: char,
    close: char,
) -> Result<(&'a [Tok], &'a [Tok]), PatternError> {
    debug_assert_eq!(tokens.first(), Some(&Tok::Char(open)));
    let mut depth = 0usize;
    for (idx, tok) in tokens.iter().enumerate() {
        match tok {
            Tok::Char(c) if *c == open => depth += 1,
            Tok::Char(c) if *c == close => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&tokens[1..idx], &tokens[idx + 1..]));
                }
            }
            _ => {}
        }
    }
    Err(PatternError::UnbalancedDelimiter(open))
}

/// Split a delimiter-balanced token slice into its top-level `|`
/// alternatives, in declaration order.
///
/// Group bodies are skipped by depth counting; class bodies are skipped
/// whole, since `(`, `)` and `|` are plain members inside `[...]`.
pub(crate) fn split_branches(tokens: &[Tok]) -> Vec<&[Tok]> {
    let mut branches = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut idx = 0usize;
    while idx < tokens.len() {
        match &tokens[idx] {
            Tok::Char('[') => {
                if let Ok((inner, _)) = extract_delimited(&tokens[idx..], '[', ']') {
                    idx += inner.len() + 2;
                    continue;
                }
                // Unbalanced class: let the parser report it.
            }
            Tok::Char('(') => depth += 1,
            Tok::Char(')') => depth = depth.saturating_sub(1),
            Tok::Char('|') if depth == 0 => {
                branches.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
        idx += 1;
    }
    branches.push(&tokens[start..]);
    branches
}
