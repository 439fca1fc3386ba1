//! Continuation-passing execution of a compiled pattern tree.
//!
//! Every node matches against a [`State`] plus a continuation: the thing
//! that must *also* succeed for the node's own match to count. Quantifiers
//! retry repetition counts against the continuation in policy order, which
//! is the whole of backtracking — a node never retries blindly; its caller
//! restores a snapshot and tries the next choice.

use std::cell::Cell;

use super::ast::{Node, Policy};

/// A capture span: character offsets into the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// The mutable cursor/capture bundle threaded through one match attempt.
/// Cloned before every speculative choice so a failed branch can be
/// discarded without corrupting the caller's state.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) pos: usize,
    pub(crate) caps: Vec<Option<Span>>,
}

impl State {
    pub(crate) fn at(pos: usize, slots: usize) -> Self {
        Self {
            pos,
            caps: vec![None; slots],
        }
    }
}

/// What must additionally succeed for a node's match to count.
pub(crate) type Cont<'a> = &'a dyn Fn(&mut State) -> bool;

/// One match attempt: the text plus step accounting shared by every
/// speculative branch of the search.
pub(crate) struct Engine<'t> {
    text: &'t [char],
    steps: Cell<usize>,
    limit: Option<usize>,
    over_budget: Cell<bool>,
}

impl<'t> Engine<'t> {
    pub(crate) fn new(text: &'t [char], limit: Option<usize>) -> Self {
        Self {
            text,
            steps: Cell::new(0),
            limit,
            over_budget: Cell::new(false),
        }
    }

    /// True once the step budget was exceeded; the attempt that tripped it
    /// reported rejection.
    pub(crate) fn over_budget(&self) -> bool {
        self.over_budget.get()
    }

    /// Node visits performed so far.
    pub(crate) fn steps_taken(&self) -> usize {
        self.steps.get()
    }

    fn step(&self) -> bool {
        let n = self.steps.get() + 1;
        self.steps.set(n);
        match self.limit {
            Some(limit) if n > limit => {
                self.over_budget.set(true);
                false
            }
            _ => true,
        }
    }

    // ─── Node dispatch ──────────────────────────────────────────────────────

    pub(crate) fn match_node(&self, node: &Node, st: &mut State, k: Cont) -> bool {
        if !self.step() {
            return false;
        }
        match node {
            Node::Literal(chars) => {
                let end = st.pos + chars.len();
                if end <= self.text.len() && self.text[st.pos..end] == chars[..] {
                    st.pos = end;
                    k(st)
                } else {
                    false
                }
            }
            Node::Class(set) => match self.text.get(st.pos) {
                Some(&ch) if set.contains(ch) => {
                    st.pos += 1;
                    k(st)
                }
                _ => false,
            },
            Node::LineStart => st.pos == 0 && k(st),
            Node::LineEnd => st.pos == self.text.len() && k(st),
            Node::Seq(children) => self.match_seq(children, st, k),
            Node::Alt(branches) => {
                for branch in branches {
                    let snap = st.clone();
                    if self.match_node(branch, st, k) {
                        return true;
                    }
                    *st = snap;
                }
                false
            }
            Node::Group { index, body } => {
                let index = *index;
                let start = st.pos;
                self.match_node(body, st, &|st: &mut State| {
                    // The slot is written only when the continuation also
                    // succeeds; a failed attempt leaves it as it was.
                    let saved = st.caps[index];
                    st.caps[index] = Some(Span {
                        start,
                        end: st.pos,
                    });
                    if k(st) {
                        true
                    } else {
                        st.caps[index] = saved;
                        false
                    }
                })
            }
            Node::Repeat {
                body,
                min,
                max,
                policy,
            } => match policy {
                Policy::Greedy => self.match_greedy(body, *min, *max, st, k),
                Policy::Lazy => self.match_lazy(body, *min, *max, st, k),
                Policy::Possessive => self.match_possessive(body, *min, *max, st, k),
            },
        }
    }

    /// Each child's continuation is the rest of the sequence, then the
    /// outer continuation.
    fn match_seq(&self, nodes: &[Node], st: &mut State, k: Cont) -> bool {
        match nodes.split_first() {
            None => k(st),
            Some((first, rest)) => {
                self.match_node(first, st, &|st: &mut State| self.match_seq(rest, st, k))
            }
        }
    }

    // ─── Repetition policies ────────────────────────────────────────────────
    //
    // Each repetition of the body is committed as it is matched (the body
    // runs with the trivial continuation); the retry dimension of a
    // quantifier is the repetition count alone.

    /// Expand to as many repetitions as possible, then retry the
    /// continuation one count at a time, never dropping below `min`.
    fn match_greedy(&self, body: &Node, min: usize, max: usize, st: &mut State, k: Cont) -> bool {
        let mut states = vec![st.clone()];
        // A body that consumes nothing ends the expansion: the remaining
        // counts are all satisfiable in place.
        let mut padded = false;
        while states.len() - 1 < max {
            let mut next = states[states.len() - 1].clone();
            let before = next.pos;
            if !self.match_node(body, &mut next, &|_: &mut State| true) {
                break;
            }
            let moved = next.pos != before;
            states.push(next);
            if !moved {
                padded = true;
                break;
            }
        }
        let reps = states.len() - 1;
        for i in (0..=reps).rev() {
            if i < min && !(padded && i == reps) {
                break;
            }
            let mut candidate = states[i].clone();
            if k(&mut candidate) {
                *st = candidate;
                return true;
            }
        }
        false
    }

    /// Match the required minimum, then try the continuation before each
    /// further repetition. Below `min` a body failure is fatal.
    fn match_lazy(&self, body: &Node, min: usize, max: usize, st: &mut State, k: Cont) -> bool {
        let mut cur = st.clone();
        let mut reps = 0;
        while reps < min {
            let before = cur.pos;
            if !self.match_node(body, &mut cur, &|_: &mut State| true) {
                return false;
            }
            if cur.pos == before {
                // Zero-width: the rest of the minimum is satisfiable in
                // place.
                reps = min;
                break;
            }
            reps += 1;
        }
        loop {
            let mut candidate = cur.clone();
            if k(&mut candidate) {
                *st = candidate;
                return true;
            }
            if reps >= max {
                return false;
            }
            let before = cur.pos;
            if !self.match_node(body, &mut cur, &|_: &mut State| true) {
                return false;
            }
            if cur.pos == before {
                // No progress, and the continuation already failed here.
                return false;
            }
            reps += 1;
        }
    }

    /// Expand to as many repetitions as possible and invoke the
    /// continuation exactly once: counts are never given back.
    fn match_possessive(
        &self,
        body: &Node,
        min: usize,
        max: usize,
        st: &mut State,
        k: Cont,
    ) -> bool {
        let mut cur = st.clone();
        let mut reps = 0;
        while reps < max {
            let before = cur.pos;
            let snap = cur.clone();
            if !self.match_node(body, &mut cur, &|_: &mut State| true) {
                cur = snap;
                break;
            }
            if cur.pos == before {
                reps = reps.max(min);
                break;
            }
            reps += 1;
        }
        if reps < min {
            return false;
        }
        if k(&mut cur) {
            *st = cur;
            true
        } else {
            false
        }
    }
}
