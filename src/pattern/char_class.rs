//! Character sets for class nodes and first-set computation.
//!
//! A [`ClassSet`] stores its members as sorted, disjoint, non-adjacent
//! `(lo, hi)` ranges of `char`, so membership is a binary search and the
//! set algebra (union, intersection, difference, complement) runs on
//! range endpoints rather than individual characters.

/// A set of characters, kept as normalized inclusive ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    ranges: Vec<(char, char)>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn single(ch: char) -> Self {
        Self {
            ranges: vec![(ch, ch)],
        }
    }

    /// A contiguous range. `lo` must not exceed `hi`; the parser validates
    /// range order before building a set.
    pub fn range(lo: char, hi: char) -> Self {
        debug_assert!(lo <= hi);
        Self {
            ranges: vec![(lo, hi)],
        }
    }

    // --- Builtin classes ---

    /// `\d` — ASCII decimal digits.
    pub fn digit() -> Self {
        Self::range('0', '9')
    }

    /// `\w` — ASCII letters, digits and underscore.
    pub fn word() -> Self {
        let mut set = Self::range('0', '9');
        set.insert('A', 'Z');
        set.insert('_', '_');
        set.insert('a', 'z');
        set
    }

    /// `\s` — ASCII whitespace (space, tab, newline, vertical tab, form
    /// feed, carriage return).
    pub fn space() -> Self {
        let mut set = Self::range('\t', '\r');
        set.insert(' ', ' ');
        set
    }

    /// `.` — every character except newline.
    pub fn dot() -> Self {
        Self::single('\n').complement()
    }

    // --- Set algebra ---

    /// Add a range, merging with existing ranges where possible.
    pub fn insert(&mut self, lo: char, hi: char) {
        debug_assert!(lo <= hi);
        self.ranges.push((lo, hi));
        self.normalize();
    }

    pub fn union(&self, other: &ClassSet) -> ClassSet {
        let mut out = self.clone();
        out.ranges.extend_from_slice(&other.ranges);
        out.normalize();
        out
    }

    pub fn intersect(&self, other: &ClassSet) -> ClassSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (alo, ahi) = self.ranges[i];
            let (blo, bhi) = other.ranges[j];
            let lo = alo.max(blo);
            let hi = ahi.min(bhi);
            if lo <= hi {
                out.push((lo, hi));
            }
            if ahi < bhi {
                i += 1;
            } else {
                j += 1;
            }
        }
        ClassSet { ranges: out }
    }

    pub fn difference(&self, other: &ClassSet) -> ClassSet {
        self.intersect(&other.complement())
    }

    /// Every character not in this set.
    pub fn complement(&self) -> ClassSet {
        let mut out = Vec::new();
        let mut next_lo = Some('\0');
        for &(lo, hi) in &self.ranges {
            if let Some(nl) = next_lo
                && nl < lo
                && let Some(p) = prev_char(lo)
            {
                out.push((nl, p));
            }
            next_lo = next_char(hi);
        }
        if let Some(nl) = next_lo {
            out.push((nl, char::MAX));
        }
        ClassSet { ranges: out }
    }

    // --- Queries ---

    pub fn contains(&self, ch: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if ch < lo {
                    std::cmp::Ordering::Greater
                } else if ch > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// True when the two sets share no character.
    pub fn is_disjoint(&self, other: &ClassSet) -> bool {
        self.intersect(other).is_empty()
    }

    /// Sort and merge overlapping or adjacent ranges.
    fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            if let Some(last) = merged.last_mut()
                && contiguous(last.1, lo)
            {
                if hi > last.1 {
                    last.1 = hi;
                }
            } else {
                merged.push((lo, hi));
            }
        }
        self.ranges = merged;
    }
}

/// True when no representable character falls strictly between `hi` and
/// `lo`, so `(_, hi)` and `(lo, _)` can merge into one range.
fn contiguous(hi: char, lo: char) -> bool {
    match next_char(hi) {
        Some(n) => lo <= n,
        None => true, // hi == char::MAX
    }
}

/// The next scalar value after `ch`, skipping the surrogate gap.
fn next_char(ch: char) -> Option<char> {
    let v = ch as u32;
    let next = if v == 0xD7FF { 0xE000 } else { v + 1 };
    char::from_u32(next)
}

/// The scalar value before `ch`, skipping the surrogate gap.
fn prev_char(ch: char) -> Option<char> {
    let v = ch as u32;
    if v == 0 {
        return None;
    }
    let prev = if v == 0xE000 { 0xD7FF } else { v - 1 };
    char::from_u32(prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Membership ---

    #[test]
    fn single_contains_only_itself() {
        let set = ClassSet::single('x');
        assert!(set.contains('x'));
        assert!(!set.contains('y'));
    }

    #[test]
    fn range_membership() {
        let set = ClassSet::range('a', 'f');
        assert!(set.contains('a'));
        assert!(set.contains('c'));
        assert!(set.contains('f'));
        assert!(!set.contains('g'));
        assert!(!set.contains('A'));
    }

    #[test]
    fn empty_set_contains_nothing() {
        assert!(!ClassSet::new().contains('a'));
        assert!(ClassSet::new().is_empty());
    }

    // --- Normalization ---

    #[test]
    fn overlapping_ranges_merge() {
        let mut set = ClassSet::range('a', 'h');
        set.insert('e', 'm');
        assert_eq!(set.ranges, vec![('a', 'm')]);
    }

    #[test]
    fn adjacent_ranges_merge() {
        let mut set = ClassSet::range('a', 'c');
        set.insert('d', 'f');
        assert_eq!(set.ranges, vec![('a', 'f')]);
    }

    #[test]
    fn distinct_ranges_stay_separate() {
        let mut set = ClassSet::range('a', 'c');
        set.insert('x', 'z');
        assert_eq!(set.ranges, vec![('a', 'c'), ('x', 'z')]);
    }

    // --- Algebra ---

    #[test]
    fn union_covers_both() {
        let set = ClassSet::digit().union(&ClassSet::range('a', 'f'));
        assert!(set.contains('5'));
        assert!(set.contains('b'));
        assert!(!set.contains('g'));
    }

    #[test]
    fn intersect_keeps_overlap() {
        let set = ClassSet::range('a', 'm').intersect(&ClassSet::range('h', 'z'));
        assert_eq!(set.ranges, vec![('h', 'm')]);
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let set = ClassSet::range('a', 'c').intersect(&ClassSet::range('x', 'z'));
        assert!(set.is_empty());
    }

    #[test]
    fn difference_removes_members() {
        let set = ClassSet::range('a', 'f').difference(&ClassSet::single('c'));
        assert!(set.contains('b'));
        assert!(!set.contains('c'));
        assert!(set.contains('d'));
    }

    #[test]
    fn complement_flips_membership() {
        let set = ClassSet::range('a', 'f').complement();
        assert!(!set.contains('c'));
        assert!(set.contains('g'));
        assert!(set.contains('\0'));
        assert!(set.contains(char::MAX));
    }

    #[test]
    fn complement_round_trip() {
        let set = ClassSet::word();
        assert_eq!(set.complement().complement(), set);
    }

    #[test]
    fn complement_of_empty_is_everything() {
        let all = ClassSet::new().complement();
        assert!(all.contains('\0'));
        assert!(all.contains('a'));
        assert!(all.contains(char::MAX));
    }

    #[test]
    fn disjointness() {
        assert!(ClassSet::digit().is_disjoint(&ClassSet::range('a', 'z')));
        assert!(!ClassSet::word().is_disjoint(&ClassSet::digit()));
    }

    // --- Builtins ---

    #[test]
    fn digit_class() {
        let d = ClassSet::digit();
        assert!(d.contains('0') && d.contains('9'));
        assert!(!d.contains('a'));
    }

    #[test]
    fn word_class() {
        let w = ClassSet::word();
        for ch in ['a', 'z', 'A', 'Z', '0', '9', '_'] {
            assert!(w.contains(ch), "expected word char: {ch}");
        }
        assert!(!w.contains('-'));
        assert!(!w.contains(' '));
    }

    #[test]
    fn space_class() {
        let s = ClassSet::space();
        for ch in [' ', '\t', '\n', '\r', '\x0b', '\x0c'] {
            assert!(s.contains(ch), "expected space char: {ch:?}");
        }
        assert!(!s.contains('a'));
    }

    #[test]
    fn dot_excludes_newline_only() {
        let dot = ClassSet::dot();
        assert!(dot.contains('a'));
        assert!(dot.contains(' '));
        assert!(dot.contains('\t'));
        assert!(!dot.contains('\n'));
    }
}
