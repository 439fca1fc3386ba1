//! Recursive descent tree builder for pattern strings.
//!
//! Parsing is left to right, one token (or token run) at a time, appending
//! to the last-built node: quantifier suffixes apply to whatever was built
//! most recently, so the builder never has to re-derive the tree.

use itertools::Itertools;
use phf::{Map, phf_map};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{Node, Pattern, Policy, UNBOUNDED};
use super::char_class::ClassSet;
use super::scan::{extract_delimited, split_branches};
use super::token::{Tok, tokenize};

/// Errors that can occur while compiling a pattern string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    UnbalancedDelimiter(char),
    UnexpectedEnd,
    InvalidNumber,
    InvalidRange(char, char),
    InvalidQuantifierRange(usize, usize),
    DanglingQuantifier,
    MisplacedAnchor,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedDelimiter(c) => write!(f, "Unbalanced {c:?} in pattern"),
            Self::UnexpectedEnd => write!(f, "Unexpected end of pattern"),
            Self::InvalidNumber => write!(f, "Invalid number in pattern"),
            Self::InvalidRange(lo, hi) => write!(f, "Invalid class range {lo:?}-{hi:?}"),
            Self::InvalidQuantifierRange(min, max) => {
                write!(f, "Invalid repetition range {{{min},{max}}}")
            }
            Self::DanglingQuantifier => write!(f, "Quantifier with nothing to repeat"),
            Self::MisplacedAnchor => write!(f, "'^' is only valid at the start of a branch"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Control-character escapes.
const CONTROL_ESCAPES: Map<char, char> = phf_map! {
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
    'f' => '\u{0c}',
    'a' => '\u{07}',
    'e' => '\u{1b}',
};

/// Compile a pattern string into a [`Pattern`].
pub fn compile(pattern: &str) -> Result<Pattern, PatternError> {
    let tokens = tokenize(pattern);
    let mut groups = Groups::new();
    let root = parse_alternation(&tokens, &mut groups)?;
    Ok(Pattern::new(root, groups.count()))
}

/// Capture index allocator: slot 0 is the whole match, explicit groups
/// take 1, 2, ... depth first in parse order.
struct Groups {
    next: usize,
}

impl Groups {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn allocate(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }

    fn count(&self) -> usize {
        self.next
    }
}

fn parse_alternation(tokens: &[Tok], groups: &mut Groups) -> Result<Node, PatternError> {
    let branches = split_branches(tokens);
    if branches.len() == 1 {
        return parse_branch(branches[0], groups);
    }
    let mut nodes = Vec::with_capacity(branches.len());
    for branch in branches {
        nodes.push(parse_branch(branch, groups)?);
    }
    Ok(Node::Alt(nodes))
}

fn parse_branch(tokens: &[Tok], groups: &mut Groups) -> Result<Node, PatternError> {
    let mut branch = Branch {
        rest: tokens,
        groups,
        nodes: Vec::new(),
        run: false,
    };
    while !branch.rest.is_empty() {
        branch.step()?;
    }
    let mut nodes = branch.nodes;
    Ok(if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        Node::Seq(nodes)
    })
}

/// Builder state for one alternation branch.
struct Branch<'t, 'g> {
    rest: &'t [Tok],
    groups: &'g mut Groups,
    nodes: Vec<Node>,
    /// True while the last node is a literal coalesced from individual
    /// character tokens; a quantifier must then split off its final
    /// character rather than repeat the whole run.
    run: bool,
}

impl<'t> Branch<'t, '_> {
    fn step(&mut self) -> Result<(), PatternError> {
        let Some(tok) = self.rest.first().cloned() else {
            return Ok(());
        };
        let cur = self.rest;
        match tok {
            Tok::Char('(') => {
                let (interior, rest) = extract_delimited(cur, '(', ')')?;
                self.rest = rest;
                self.push_group(interior)
            }
            Tok::Char('[') => {
                let (interior, rest) = extract_delimited(cur, '[', ']')?;
                self.rest = rest;
                self.push_class(interior)
            }
            Tok::Char(c @ (')' | ']' | '}')) => Err(PatternError::UnbalancedDelimiter(c)),
            Tok::Char('^') => {
                self.rest = &cur[1..];
                if !self.nodes.is_empty() {
                    return Err(PatternError::MisplacedAnchor);
                }
                self.nodes.push(Node::LineStart);
                Ok(())
            }
            Tok::Char('$') => {
                self.rest = &cur[1..];
                self.nodes.push(Node::LineEnd);
                self.run = false;
                Ok(())
            }
            Tok::Char('.') => {
                self.rest = &cur[1..];
                self.push_class_set(ClassSet::dot());
                Ok(())
            }
            Tok::Char(q @ ('*' | '+' | '?')) => {
                self.rest = &cur[1..];
                let policy = self.take_suffix();
                let (min, max) = match q {
                    '*' => (0, UNBOUNDED),
                    '+' => (1, UNBOUNDED),
                    _ => (0, 1),
                };
                self.wrap_repeat(min, max, policy)
            }
            Tok::Brace { body, suffix } => {
                self.rest = &cur[1..];
                self.quantifier_brace(&body, suffix)
            }
            Tok::Char(c) => {
                self.rest = &cur[1..];
                self.push_literal_char(c);
                Ok(())
            }
            Tok::Esc(e) => {
                self.rest = &cur[1..];
                self.push_escape(e)
            }
        }
    }

    // --- Node pushers ---

    fn push_literal_char(&mut self, ch: char) {
        if self.run
            && let Some(Node::Literal(chars)) = self.nodes.last_mut()
        {
            chars.push(ch);
            return;
        }
        self.nodes.push(Node::Literal(vec![ch]));
        self.run = true;
    }

    fn push_class_set(&mut self, set: ClassSet) {
        self.nodes.push(Node::Class(set));
        self.run = false;
    }

    fn push_group(&mut self, interior: &[Tok]) -> Result<(), PatternError> {
        match interior {
            // `(?:` opens a non-capturing group.
            [Tok::Char('?'), Tok::Char(':'), body @ ..] => {
                let node = parse_alternation(body, self.groups)?;
                self.nodes.push(node);
            }
            _ => {
                // The index is taken before the interior is parsed, so
                // numbering is depth first in parse order.
                let index = self.groups.allocate();
                let body = parse_alternation(interior, self.groups)?;
                self.nodes.push(Node::Group {
                    index,
                    body: Box::new(body),
                });
            }
        }
        self.run = false;
        Ok(())
    }

    // --- Quantifiers ---

    /// A `?` or `+` token directly after a quantifier selects its policy.
    fn take_suffix(&mut self) -> Policy {
        match self.rest.first() {
            Some(Tok::Char('?')) => {
                self.rest = &self.rest[1..];
                Policy::Lazy
            }
            Some(Tok::Char('+')) => {
                self.rest = &self.rest[1..];
                Policy::Possessive
            }
            _ => Policy::Greedy,
        }
    }

    fn quantifier_brace(&mut self, body: &str, suffix: Option<char>) -> Result<(), PatternError> {
        let (min, max) = parse_repeat_bounds(body)?;
        if min > max {
            return Err(PatternError::InvalidQuantifierRange(min, max));
        }
        let policy = match suffix {
            Some('?') => Policy::Lazy,
            Some('+') => Policy::Possessive,
            _ => Policy::Greedy,
        };
        self.wrap_repeat(min, max, policy)
    }

    /// Wrap the most recently built node in a repetition.
    fn wrap_repeat(&mut self, min: usize, max: usize, policy: Policy) -> Result<(), PatternError> {
        let body = match self.nodes.pop() {
            None => return Err(PatternError::DanglingQuantifier),
            Some(Node::Literal(mut chars)) if self.run && chars.len() > 1 => {
                // `ab*` repeats only the final character of a coalesced
                // run.
                let last = chars[chars.len() - 1];
                chars.truncate(chars.len() - 1);
                self.nodes.push(Node::Literal(chars));
                Node::Literal(vec![last])
            }
            Some(node) => node,
        };
        self.nodes.push(Node::Repeat {
            body: Box::new(body),
            min,
            max,
            policy,
        });
        self.run = false;
        Ok(())
    }

    // --- Escapes ---

    fn push_escape(&mut self, esc: char) -> Result<(), PatternError> {
        match esc {
            'd' => self.push_class_set(ClassSet::digit()),
            'D' => self.push_class_set(ClassSet::digit().complement()),
            'w' => self.push_class_set(ClassSet::word()),
            'W' => self.push_class_set(ClassSet::word().complement()),
            's' => self.push_class_set(ClassSet::space()),
            'S' => self.push_class_set(ClassSet::space().complement()),
            'x' => return self.push_hex(),
            'o' => return self.push_octal(),
            '0'..='7' => return self.push_octal_digits(esc),
            _ => match CONTROL_ESCAPES.get(&esc) {
                Some(&ctrl) => self.push_literal_char(ctrl),
                None => self.push_literal_char(esc),
            },
        }
        Ok(())
    }

    /// `\xHH` or `\x{H...}`.
    fn push_hex(&mut self) -> Result<(), PatternError> {
        if let Some(Tok::Brace { body, suffix }) = self.rest.first() {
            let suffix = *suffix;
            let decoded = decode_hex_run(body)?;
            self.rest = &self.rest[1..];
            self.nodes.push(Node::Literal(decoded));
            self.run = false;
            return self.apply_brace_suffix(suffix);
        }
        let hi = self.take_hex_digit()?;
        let lo = self.take_hex_digit()?;
        self.push_literal_char(char::from((hi * 16 + lo) as u8));
        Ok(())
    }

    /// `\o{n...}`; a bare `\o` is a literal `o`.
    fn push_octal(&mut self) -> Result<(), PatternError> {
        if let Some(Tok::Brace { body, suffix }) = self.rest.first() {
            let suffix = *suffix;
            let decoded = decode_octal_run(body)?;
            self.rest = &self.rest[1..];
            self.nodes.push(Node::Literal(decoded));
            self.run = false;
            return self.apply_brace_suffix(suffix);
        }
        self.push_literal_char('o');
        Ok(())
    }

    /// `\nnn`: up to three octal digits, one byte.
    fn push_octal_digits(&mut self, first: char) -> Result<(), PatternError> {
        let mut value = first as u32 - '0' as u32;
        for _ in 0..2 {
            let Some(Tok::Char(c)) = self.rest.first() else {
                break;
            };
            let Some(d) = c.to_digit(8) else { break };
            value = value * 8 + d;
            self.rest = &self.rest[1..];
        }
        if value > 0xFF {
            return Err(PatternError::InvalidNumber);
        }
        self.push_literal_char(char::from(value as u8));
        Ok(())
    }

    fn take_hex_digit(&mut self) -> Result<u32, PatternError> {
        match self.rest.first() {
            Some(Tok::Char(c)) => match c.to_digit(16) {
                Some(d) => {
                    self.rest = &self.rest[1..];
                    Ok(d)
                }
                None => Err(PatternError::InvalidNumber),
            },
            Some(_) => Err(PatternError::InvalidNumber),
            None => Err(PatternError::UnexpectedEnd),
        }
    }

    /// A `?` or `+` captured into a hex/octal brace token is an ordinary
    /// quantifier on the decoded literal, not a policy marker; a policy
    /// suffix may still follow as the next token.
    fn apply_brace_suffix(&mut self, suffix: Option<char>) -> Result<(), PatternError> {
        let (min, max) = match suffix {
            None => return Ok(()),
            Some('+') => (1, UNBOUNDED),
            // `?` is the only other captured suffix.
            Some(_) => (0, 1),
        };
        let policy = self.take_suffix();
        self.wrap_repeat(min, max, policy)
    }

    // --- Character classes ---

    fn push_class(&mut self, interior: &[Tok]) -> Result<(), PatternError> {
        let mut toks = interior;
        let mut negated = false;
        if let Some(Tok::Char('^')) = toks.first() {
            negated = true;
            toks = &toks[1..];
        }
        let mut set = ClassSet::new();
        while !toks.is_empty() {
            let (atom, rest) = class_atom(toks)?;
            toks = rest;
            match atom {
                ClassAtom::Ch(lo) => {
                    if let [Tok::Char('-'), more @ ..] = toks
                        && !more.is_empty()
                    {
                        let (end_atom, rest2) = class_atom(more)?;
                        toks = rest2;
                        match end_atom {
                            ClassAtom::Ch(hi) => {
                                if hi < lo {
                                    return Err(PatternError::InvalidRange(lo, hi));
                                }
                                set.insert(lo, hi);
                            }
                            ClassAtom::Set(s) => {
                                // A set cannot end a range: all three
                                // pieces are plain members.
                                set.insert(lo, lo);
                                set.insert('-', '-');
                                set = set.union(&s);
                            }
                        }
                    } else {
                        set.insert(lo, lo);
                    }
                }
                ClassAtom::Set(s) => set = set.union(&s),
            }
        }
        if negated {
            set = set.complement();
        }
        self.push_class_set(set);
        Ok(())
    }
}

/// One member of a character class: a single character (usable as a range
/// endpoint) or a whole embedded set.
enum ClassAtom {
    Ch(char),
    Set(ClassSet),
}

fn class_atom(toks: &[Tok]) -> Result<(ClassAtom, &[Tok]), PatternError> {
    match toks {
        [] => Err(PatternError::UnexpectedEnd),
        [Tok::Char(c), rest @ ..] => Ok((ClassAtom::Ch(*c), rest)),
        [Tok::Brace { body, suffix }, rest @ ..] => {
            // Inside a class the brace pieces are all plain members.
            let mut set = ClassSet::single('{');
            set.insert('}', '}');
            for ch in body.chars() {
                set.insert(ch, ch);
            }
            if let Some(s) = suffix {
                set.insert(*s, *s);
            }
            Ok((ClassAtom::Set(set), rest))
        }
        [Tok::Esc(e), rest @ ..] => class_escape(*e, rest),
    }
}

fn class_escape(esc: char, rest: &[Tok]) -> Result<(ClassAtom, &[Tok]), PatternError> {
    match esc {
        'd' => Ok((ClassAtom::Set(ClassSet::digit()), rest)),
        'D' => Ok((ClassAtom::Set(ClassSet::digit().complement()), rest)),
        'w' => Ok((ClassAtom::Set(ClassSet::word()), rest)),
        'W' => Ok((ClassAtom::Set(ClassSet::word().complement()), rest)),
        's' => Ok((ClassAtom::Set(ClassSet::space()), rest)),
        'S' => Ok((ClassAtom::Set(ClassSet::space().complement()), rest)),
        'x' => match rest {
            [Tok::Brace { body, .. }, rest2 @ ..] => {
                Ok((bytes_atom(decode_hex_run(body)?), rest2))
            }
            [Tok::Char(h), Tok::Char(l), rest2 @ ..] => match (h.to_digit(16), l.to_digit(16)) {
                (Some(hi), Some(lo)) => {
                    Ok((ClassAtom::Ch(char::from((hi * 16 + lo) as u8)), rest2))
                }
                _ => Err(PatternError::InvalidNumber),
            },
            _ => Err(PatternError::InvalidNumber),
        },
        'o' => match rest {
            [Tok::Brace { body, .. }, rest2 @ ..] => {
                Ok((bytes_atom(decode_octal_run(body)?), rest2))
            }
            _ => Ok((ClassAtom::Ch('o'), rest)),
        },
        '0'..='7' => {
            let mut value = esc as u32 - '0' as u32;
            let mut rest2 = rest;
            for _ in 0..2 {
                let Some(Tok::Char(c)) = rest2.first() else {
                    break;
                };
                let Some(d) = c.to_digit(8) else { break };
                value = value * 8 + d;
                rest2 = &rest2[1..];
            }
            if value > 0xFF {
                return Err(PatternError::InvalidNumber);
            }
            Ok((ClassAtom::Ch(char::from(value as u8)), rest2))
        }
        _ => match CONTROL_ESCAPES.get(&esc) {
            Some(&ctrl) => Ok((ClassAtom::Ch(ctrl), rest)),
            None => Ok((ClassAtom::Ch(esc), rest)),
        },
    }
}

fn bytes_atom(decoded: Vec<char>) -> ClassAtom {
    match decoded.as_slice() {
        [one] => ClassAtom::Ch(*one),
        _ => {
            let mut set = ClassSet::new();
            for &ch in &decoded {
                set.insert(ch, ch);
            }
            ClassAtom::Set(set)
        }
    }
}

// --- Numeric decoding ---

/// Decode the body of `\x{H...}` into bytes; an odd digit count gives the
/// first byte a single digit.
fn decode_hex_run(body: &str) -> Result<Vec<char>, PatternError> {
    let digits = numeric_digits(body, 16)?;
    let mut out = Vec::new();
    let mut i = 0;
    if digits.len() % 2 == 1 {
        out.push(char::from(digits[0] as u8));
        i = 1;
    }
    while i < digits.len() {
        out.push(char::from((digits[i] * 16 + digits[i + 1]) as u8));
        i += 2;
    }
    Ok(out)
}

/// Decode the body of `\o{n...}` into bytes, three digits per byte with a
/// shorter leading group.
fn decode_octal_run(body: &str) -> Result<Vec<char>, PatternError> {
    let digits = numeric_digits(body, 8)?;
    let mut out = Vec::new();
    let mut i = digits.len() % 3;
    if i != 0 {
        let mut value = 0;
        for &d in &digits[..i] {
            value = value * 8 + d;
        }
        out.push(char::from(value as u8));
    }
    while i < digits.len() {
        let value = digits[i] * 64 + digits[i + 1] * 8 + digits[i + 2];
        if value > 0xFF {
            return Err(PatternError::InvalidNumber);
        }
        out.push(char::from(value as u8));
        i += 3;
    }
    Ok(out)
}

fn numeric_digits(body: &str, radix: u32) -> Result<Vec<u32>, PatternError> {
    if body.is_empty() {
        return Err(PatternError::InvalidNumber);
    }
    let mut digits = Vec::with_capacity(body.len());
    for ch in body.chars() {
        match ch.to_digit(radix) {
            Some(d) => digits.push(d),
            None => return Err(PatternError::InvalidNumber),
        }
    }
    Ok(digits)
}

/// Parse `m`, `m,` or `m,n` from a quantifier brace body.
fn parse_repeat_bounds(body: &str) -> Result<(usize, usize), PatternError> {
    let mut chars = body.chars().peekable();
    let min = parse_decimal(&mut chars)?;
    match chars.next() {
        None => Ok((min, min)),
        Some(',') => {
            if chars.peek().is_none() {
                return Ok((min, UNBOUNDED));
            }
            let max = parse_decimal(&mut chars)?;
            if chars.next().is_some() {
                return Err(PatternError::InvalidNumber);
            }
            Ok((min, max))
        }
        Some(_) => Err(PatternError::InvalidNumber),
    }
}

fn parse_decimal(chars: &mut Peekable<Chars>) -> Result<usize, PatternError> {
    let digits: String = chars.peeking_take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(PatternError::InvalidNumber);
    }
    digits.parse().map_err(|_| PatternError::InvalidNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(s: &str) -> Pattern {
        compile(s).expect("compile should succeed")
    }

    fn compile_err(s: &str) -> PatternError {
        compile(s).expect_err("compile should fail")
    }

    fn lit_text(node: &Node) -> String {
        match node {
            Node::Literal(chars) => chars.iter().collect(),
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    // --- Literals ---

    #[test]
    fn plain_run_coalesces_into_one_literal() {
        let p = compile_ok("abc");
        assert_eq!(lit_text(&p.root), "abc");
    }

    #[test]
    fn escaped_meta_joins_the_run() {
        let p = compile_ok(r"a\.b");
        assert_eq!(lit_text(&p.root), "a.b");
    }

    #[test]
    fn control_escapes_decode() {
        let p = compile_ok(r"a\tb\n");
        assert_eq!(lit_text(&p.root), "a\tb\n");
    }

    #[test]
    fn unknown_escape_is_its_char() {
        let p = compile_ok(r"\q");
        assert_eq!(lit_text(&p.root), "q");
    }

    #[test]
    fn empty_pattern_is_empty_sequence() {
        let p = compile_ok("");
        match &p.root {
            Node::Seq(children) => assert!(children.is_empty()),
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    // --- Hex and octal ---

    #[test]
    fn hex_pair_decodes_and_coalesces() {
        let p = compile_ok(r"a\x42c");
        assert_eq!(lit_text(&p.root), "aBc");
    }

    #[test]
    fn hex_brace_decodes_byte_pairs() {
        let p = compile_ok(r"\x{414243}");
        assert_eq!(lit_text(&p.root), "ABC");
    }

    #[test]
    fn hex_brace_odd_count_takes_short_first_byte() {
        let p = compile_ok(r"\x{A}");
        assert_eq!(lit_text(&p.root), "\n");
    }

    #[test]
    fn octal_digits_decode() {
        let p = compile_ok(r"\101");
        assert_eq!(lit_text(&p.root), "A");
    }

    #[test]
    fn octal_brace_decodes_triples() {
        let p = compile_ok(r"\o{101102}");
        assert_eq!(lit_text(&p.root), "AB");
    }

    #[test]
    fn hex_brace_suffix_is_a_quantifier() {
        // The tokenizer captured the `?` into the brace token; it must
        // come back out as an ordinary optional.
        let p = compile_ok(r"\x{41}?");
        match &p.root {
            Node::Repeat {
                body,
                min: 0,
                max: 1,
                policy: Policy::Greedy,
            } => assert_eq!(lit_text(body), "A"),
            other => panic!("expected Repeat, got {other:?}"),
        }
    }

    #[test]
    fn bad_hex_digit_is_an_error() {
        assert_eq!(compile_err(r"\xZ1"), PatternError::InvalidNumber);
        assert_eq!(compile_err(r"\x{4G}"), PatternError::InvalidNumber);
    }

    #[test]
    fn octal_overflow_is_an_error() {
        assert_eq!(compile_err(r"\777"), PatternError::InvalidNumber);
    }

    #[test]
    fn eight_and_nine_are_literals() {
        // Not octal digits, so `\8` falls through to "any other escape".
        let p = compile_ok(r"\8\9");
        assert_eq!(lit_text(&p.root), "89");
    }

    // --- Dot and builtin classes ---

    #[test]
    fn dot_is_any_but_newline() {
        let p = compile_ok(".");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('a'));
                assert!(!set.contains('\n'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn digit_escape_is_a_class() {
        let p = compile_ok(r"\d");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('7'));
                assert!(!set.contains('a'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn negated_builtin_is_the_complement() {
        let p = compile_ok(r"\D");
        match &p.root {
            Node::Class(set) => {
                assert!(!set.contains('7'));
                assert!(set.contains('a'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    // --- Character classes ---

    #[test]
    fn class_with_singles_and_range() {
        let p = compile_ok("[ax-z]");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('a'));
                assert!(set.contains('y'));
                assert!(!set.contains('b'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn negated_class() {
        let p = compile_ok("[^a-f]");
        match &p.root {
            Node::Class(set) => {
                assert!(!set.contains('c'));
                assert!(set.contains('g'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn leading_or_trailing_dash_is_literal() {
        let p = compile_ok("[-a]");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('-'));
                assert!(set.contains('a'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
        let p = compile_ok("[a-]");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('-'));
                assert!(set.contains('a'));
                assert!(!set.contains('b'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn class_embeds_builtin_escapes() {
        let p = compile_ok(r"[\d_]");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('5'));
                assert!(set.contains('_'));
                assert!(!set.contains('a'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn class_range_with_escaped_endpoints() {
        let p = compile_ok(r"[\x41-\x43]");
        match &p.root {
            Node::Class(set) => {
                assert!(set.contains('B'));
                assert!(!set.contains('D'));
            }
            other => panic!("expected Class, got {other:?}"),
        }
    }

    #[test]
    fn inverted_range_is_an_error() {
        assert_eq!(compile_err("[z-a]"), PatternError::InvalidRange('z', 'a'));
    }

    #[test]
    fn unclosed_class_is_an_error() {
        assert_eq!(
            compile_err("[ab"),
            PatternError::UnbalancedDelimiter('[')
        );
    }

    // --- Groups ---

    #[test]
    fn group_numbering_is_depth_first_preorder() {
        let p = compile_ok("a(a(b))cd");
        assert_eq!(p.group_count(), 3);
        match &p.root {
            Node::Seq(children) => {
                assert_eq!(children.len(), 3);
                assert_eq!(lit_text(&children[0]), "a");
                match &children[1] {
                    Node::Group { index: 1, body } => match body.as_ref() {
                        Node::Seq(inner) => match &inner[1] {
                            Node::Group { index: 2, body } => {
                                assert_eq!(lit_text(body), "b");
                            }
                            other => panic!("expected inner Group, got {other:?}"),
                        },
                        other => panic!("expected Seq body, got {other:?}"),
                    },
                    other => panic!("expected Group, got {other:?}"),
                }
                assert_eq!(lit_text(&children[2]), "cd");
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn sibling_groups_number_left_to_right() {
        let p = compile_ok("(a)(b)");
        assert_eq!(p.group_count(), 3);
        match &p.root {
            Node::Seq(children) => {
                assert!(matches!(&children[0], Node::Group { index: 1, .. }));
                assert!(matches!(&children[1], Node::Group { index: 2, .. }));
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn non_capturing_group_takes_no_index() {
        let p = compile_ok("(?:a)(b)");
        assert_eq!(p.group_count(), 2);
        match &p.root {
            Node::Seq(children) => {
                assert!(matches!(&children[1], Node::Group { index: 1, .. }));
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn group_with_alternation() {
        let p = compile_ok("(a|b)");
        match &p.root {
            Node::Group { index: 1, body } => match body.as_ref() {
                Node::Alt(branches) => assert_eq!(branches.len(), 2),
                other => panic!("expected Alt body, got {other:?}"),
            },
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_group_is_an_error() {
        assert_eq!(compile_err("(ab"), PatternError::UnbalancedDelimiter('('));
    }

    #[test]
    fn stray_close_is_an_error() {
        assert_eq!(compile_err("ab)"), PatternError::UnbalancedDelimiter(')'));
    }

    // --- Alternation ---

    #[test]
    fn top_level_alternation() {
        let p = compile_ok("ab|cd|ef");
        match &p.root {
            Node::Alt(branches) => {
                assert_eq!(branches.len(), 3);
                assert_eq!(lit_text(&branches[0]), "ab");
                assert_eq!(lit_text(&branches[2]), "ef");
            }
            other => panic!("expected Alt, got {other:?}"),
        }
    }

    #[test]
    fn empty_branch_is_allowed() {
        let p = compile_ok("a|");
        match &p.root {
            Node::Alt(branches) => {
                assert_eq!(branches.len(), 2);
                assert!(matches!(&branches[1], Node::Seq(c) if c.is_empty()));
            }
            other => panic!("expected Alt, got {other:?}"),
        }
    }

    // --- Anchors ---

    #[test]
    fn anchors_parse_at_branch_edges() {
        let p = compile_ok("^ab$");
        match &p.root {
            Node::Seq(children) => {
                assert!(matches!(children[0], Node::LineStart));
                assert!(matches!(children[2], Node::LineEnd));
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn caret_is_legal_at_each_branch_start() {
        let p = compile_ok("^a|^b");
        match &p.root {
            Node::Alt(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected Alt, got {other:?}"),
        }
    }

    #[test]
    fn misplaced_caret_is_an_error() {
        assert_eq!(compile_err("a^b"), PatternError::MisplacedAnchor);
    }

    // --- Quantifiers ---

    #[test]
    fn star_plus_question_bounds() {
        for (pat, min, max) in [("a*", 0, UNBOUNDED), ("a+", 1, UNBOUNDED), ("a?", 0, 1)] {
            let p = compile_ok(pat);
            match &p.root {
                Node::Repeat {
                    min: m,
                    max: x,
                    policy: Policy::Greedy,
                    ..
                } => {
                    assert_eq!((*m, *x), (min, max), "bounds for {pat}");
                }
                other => panic!("expected Repeat for {pat}, got {other:?}"),
            }
        }
    }

    #[test]
    fn brace_bounds() {
        for (pat, min, max) in [
            ("a{3}", 3, 3),
            ("a{2,}", 2, UNBOUNDED),
            ("a{2,5}", 2, 5),
        ] {
            let p = compile_ok(pat);
            match &p.root {
                Node::Repeat {
                    min: m, max: x, ..
                } => assert_eq!((*m, *x), (min, max), "bounds for {pat}"),
                other => panic!("expected Repeat for {pat}, got {other:?}"),
            }
        }
    }

    #[test]
    fn policy_suffixes() {
        for (pat, policy) in [
            ("a*", Policy::Greedy),
            ("a*?", Policy::Lazy),
            ("a*+", Policy::Possessive),
            ("a{2,5}?", Policy::Lazy),
            ("a{2,5}+", Policy::Possessive),
        ] {
            let p = compile_ok(pat);
            match &p.root {
                Node::Repeat { policy: got, .. } => {
                    assert_eq!(*got, policy, "policy for {pat}");
                }
                other => panic!("expected Repeat for {pat}, got {other:?}"),
            }
        }
    }

    #[test]
    fn quantifier_splits_a_coalesced_literal() {
        let p = compile_ok("ab*");
        match &p.root {
            Node::Seq(children) => {
                assert_eq!(lit_text(&children[0]), "a");
                match &children[1] {
                    Node::Repeat { body, .. } => assert_eq!(lit_text(body), "b"),
                    other => panic!("expected Repeat, got {other:?}"),
                }
            }
            other => panic!("expected Seq, got {other:?}"),
        }
    }

    #[test]
    fn quantifier_wraps_a_whole_group() {
        let p = compile_ok("(ab)+");
        match &p.root {
            Node::Repeat { body, .. } => {
                assert!(matches!(body.as_ref(), Node::Group { index: 1, .. }));
            }
            other => panic!("expected Repeat, got {other:?}"),
        }
    }

    #[test]
    fn nested_quantifiers_stack() {
        let p = compile_ok("a?*");
        match &p.root {
            Node::Repeat { body, .. } => {
                assert!(matches!(body.as_ref(), Node::Repeat { .. }));
            }
            other => panic!("expected Repeat, got {other:?}"),
        }
    }

    #[test]
    fn dangling_quantifier_is_an_error() {
        assert_eq!(compile_err("*a"), PatternError::DanglingQuantifier);
        assert_eq!(compile_err("{2}a"), PatternError::DanglingQuantifier);
    }

    #[test]
    fn inverted_brace_bounds_are_an_error() {
        assert_eq!(
            compile_err("a{5,2}"),
            PatternError::InvalidQuantifierRange(5, 2)
        );
    }

    #[test]
    fn non_numeric_brace_is_an_error() {
        assert_eq!(compile_err("a{x}"), PatternError::InvalidNumber);
        assert_eq!(compile_err("a{1,x}"), PatternError::InvalidNumber);
    }

    #[test]
    fn unclosed_brace_is_a_literal_but_stray_close_is_not() {
        // `{2` demotes to literal text at the tokenizer...
        let p = compile_ok("a{2");
        assert_eq!(lit_text(&p.root), "a{2");
        // ...while a bare `}` is a close with no opener.
        assert_eq!(compile_err("a}"), PatternError::UnbalancedDelimiter('}'));
    }
}
