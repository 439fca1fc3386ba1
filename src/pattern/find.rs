//! Match results: the leftmost match of a pattern in a text, plus
//! iteration over the following non-overlapping matches.

use super::ast::Pattern;
use super::matcher::{Engine, Span, State};

impl Pattern {
    /// Search `text` for the leftmost match. The returned result reports
    /// acceptance, the matched span and captures, and can advance to the
    /// next non-overlapping match with [`MatchResult::next`].
    pub fn matches(&self, text: &str) -> MatchResult<'_> {
        self.matches_with_limit(text, None)
    }

    /// Like [`Pattern::matches`], with a step budget shared by every
    /// attempt of the search. Exceeding it rejects and exhausts the
    /// result, with [`MatchResult::hit_step_limit`] set.
    pub fn matches_with_limit(&self, text: &str, limit: Option<usize>) -> MatchResult<'_> {
        let mut result = MatchResult {
            pattern: self,
            text: text.chars().collect(),
            caps: vec![None; self.group_count()],
            start: 0,
            end: 0,
            accepted: false,
            exhausted: false,
            limit,
            steps_used: 0,
            over_budget: false,
        };
        result.search_from(0);
        result
    }

    /// Test whether a match begins exactly at `start`: one anchored
    /// attempt, no scanning. A rejected result is already exhausted; an
    /// accepted one iterates on with [`MatchResult::next`] as usual.
    pub fn matches_at(&self, text: &str, start: usize) -> MatchResult<'_> {
        let mut result = MatchResult {
            pattern: self,
            text: text.chars().collect(),
            caps: vec![None; self.group_count()],
            start,
            end: start,
            accepted: false,
            exhausted: false,
            limit: None,
            steps_used: 0,
            over_budget: false,
        };
        if start > result.text.len() {
            result.exhausted = true;
            return result;
        }
        let (outcome, taken, _) = self.run_at(&result.text, start, None);
        result.steps_used = taken;
        match outcome {
            Some((end, caps)) => {
                result.end = end;
                result.caps = caps;
                result.accepted = true;
            }
            None => result.exhausted = true,
        }
        result
    }

    /// One attempt anchored at `start`: the match end and capture table on
    /// acceptance, the steps consumed, and whether the budget tripped.
    pub(crate) fn run_at(
        &self,
        text: &[char],
        start: usize,
        limit: Option<usize>,
    ) -> (Option<(usize, Vec<Option<Span>>)>, usize, bool) {
        let engine = Engine::new(text, limit);
        let mut st = State::at(start, self.group_count());
        let accepted = engine.match_node(&self.root, &mut st, &|_: &mut State| true);
        let outcome = if accepted {
            st.caps[0] = Some(Span {
                start,
                end: st.pos,
            });
            Some((st.pos, st.caps))
        } else {
            None
        };
        (outcome, engine.steps_taken(), engine.over_budget())
    }
}

/// The outcome of a search, advanceable to later matches.
///
/// Once a search rejects, the result is permanently exhausted: every
/// further [`next`](MatchResult::next) call rejects as well.
pub struct MatchResult<'p> {
    pattern: &'p Pattern,
    text: Vec<char>,
    caps: Vec<Option<Span>>,
    start: usize,
    end: usize,
    accepted: bool,
    exhausted: bool,
    limit: Option<usize>,
    steps_used: usize,
    over_budget: bool,
}

impl MatchResult<'_> {
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Start of the whole match. Meaningful only while accepted.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End of the whole match. Meaningful only while accepted.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The capture span for `index` (0 is the whole match), when that
    /// group took part in the match.
    pub fn group(&self, index: usize) -> Option<Span> {
        self.caps.get(index).copied().flatten()
    }

    /// The captured text for `index`.
    pub fn group_str(&self, index: usize) -> Option<String> {
        self.group(index)
            .map(|span| self.text[span.start..span.end].iter().collect())
    }

    /// The whole matched text.
    pub fn matched(&self) -> Option<String> {
        self.group_str(0)
    }

    /// True once the step budget was exceeded during any attempt.
    pub fn hit_step_limit(&self) -> bool {
        self.over_budget
    }

    /// Advance to the next non-overlapping match: retry from the previous
    /// end (one further after an empty match, so iteration terminates).
    pub fn next(&mut self) -> bool {
        if self.exhausted || !self.accepted {
            return false;
        }
        let from = if self.end == self.start {
            self.end + 1
        } else {
            self.end
        };
        self.search_from(from)
    }

    /// Attempt at each position from `from` on, skipping starts whose
    /// character cannot begin a match, until acceptance or the start
    /// cursor passes the end of the text.
    fn search_from(&mut self, from: usize) -> bool {
        let len = self.text.len();
        let mut pos = from;
        while pos <= len {
            if !self.pattern.can_match_empty()
                && let Some(&ch) = self.text.get(pos)
                && !self.pattern.first_set().contains(ch)
            {
                pos += 1;
                continue;
            }
            let remaining = self.limit.map(|l| l.saturating_sub(self.steps_used));
            let (outcome, taken, over) = self.pattern.run_at(&self.text, pos, remaining);
            self.steps_used += taken;
            if over {
                self.over_budget = true;
                break;
            }
            if let Some((end, caps)) = outcome {
                self.start = pos;
                self.end = end;
                self.caps = caps;
                self.accepted = true;
                return true;
            }
            pos += 1;
        }
        self.accepted = false;
        self.exhausted = true;
        self.caps.fill(None);
        false
    }
}
