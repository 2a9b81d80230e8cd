//! SkipSet — Line Remapping for Collapsed Source Lines
//!
//! S3/S4 collapse multi-line strings and backslash/paren continuations
//! into single logical lines. `SkipSet` records which *original* line
//! numbers were folded away so later diagnostics (which only see
//! bracketed-text line numbers) can be remapped back to the line the
//! user actually wrote. See spec 4.7 and the "Skip-map exactness"
//! invariant in spec 8.

use std::collections::BTreeSet;

/// Sorted set of original-source line numbers collapsed by
/// preprocessing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<u32>);

impl SkipSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn add(&mut self, line: u32) {
        self.0.insert(line);
    }

    pub fn contains(&self, line: u32) -> bool {
        self.0.contains(&line)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Map a line number in the bracketed/parsed text back to the
    /// original source line: `original_line(L) = L + |{s in skip_set : s <= L}|`.
    pub fn original_line(&self, parsed_line: u32) -> u32 {
        let collapsed_before = self.0.range(..=parsed_line).count() as u32;
        parsed_line + collapsed_before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_skip_set_is_identity() {
        let skips = SkipSet::new();
        for line in 0..50 {
            assert_eq!(skips.original_line(line), line);
        }
    }

    #[test]
    fn remaps_past_collapsed_lines() {
        let mut skips = SkipSet::new();
        skips.add(2);
        skips.add(3);
        // Lines at/after the first collapse shift by the number of
        // collapses at-or-before them.
        assert_eq!(skips.original_line(1), 1);
        assert_eq!(skips.original_line(2), 3);
        assert_eq!(skips.original_line(3), 5);
        assert_eq!(skips.original_line(4), 6);
    }

    proptest! {
        #[test]
        fn original_line_is_strictly_increasing(skips in proptest::collection::vec(0u32..200, 0..30)) {
            let mut set = SkipSet::new();
            for s in skips {
                set.add(s);
            }
            let mut prev = None;
            for l in 0..220u32 {
                let mapped = set.original_line(l);
                if let Some(p) = prev {
                    prop_assert!(mapped > p);
                }
                prev = Some(mapped);
            }
        }
    }
}
