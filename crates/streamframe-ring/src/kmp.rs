//! Knuth-Morris-Pratt matching over split (wrapped) byte regions.

/// A search pattern with its precomputed KMP failure table.
///
/// Building the table is linear in the pattern length; keep one per delimiter
/// and reuse it across searches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KmpPattern {
    pattern: Vec<u8>,
    lps: Vec<usize>,
}

impl KmpPattern {
    /// Precompute the failure table for `pattern`.
    pub fn new(pattern: impl Into<Vec<u8>>) -> Self {
        let pattern = pattern.into();
        let lps = failure_table(&pattern);
        Self { pattern, lps }
    }

    /// The raw pattern bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    /// Pattern length in bytes.
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// True for the empty pattern, which never matches.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Longest-proper-prefix-that-is-also-suffix table.
    pub fn failure_table(&self) -> &[usize] {
        &self.lps
    }

    /// Find the first match in the logical sequence `first ++ second`.
    ///
    /// Returns the offset of the match start relative to the beginning of
    /// `first`. The two slices are never joined; a match may straddle them.
    pub fn find_in_segments(&self, first: &[u8], second: &[u8]) -> Option<usize> {
        let m = self.pattern.len();
        if m == 0 || first.len() + second.len() < m {
            return None;
        }

        let mut matched = 0usize;
        for (i, &byte) in first.iter().chain(second).enumerate() {
            while matched > 0 && byte != self.pattern[matched] {
                matched = self.lps[matched - 1];
            }
            if byte == self.pattern[matched] {
                matched += 1;
                if matched == m {
                    return Some(i + 1 - m);
                }
            }
        }
        None
    }
}

impl From<&[u8]> for KmpPattern {
    fn from(pattern: &[u8]) -> Self {
        Self::new(pattern)
    }
}

fn failure_table(pattern: &[u8]) -> Vec<usize> {
    let mut lps = vec![0usize; pattern.len()];
    let mut len = 0usize;
    let mut i = 1usize;

    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len != 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_table_for_repetitive_pattern() {
        assert_eq!(KmpPattern::new(*b"AABAACAABAA").failure_table(), &[
            0, 1, 0, 1, 2, 0, 1, 2, 3, 4, 5
        ]);
        assert_eq!(KmpPattern::new(*b"abcd").failure_table(), &[0, 0, 0, 0]);
    }

    #[test]
    fn finds_within_single_segment() {
        let p = KmpPattern::new(*b"\r\n");
        assert_eq!(p.find_in_segments(b"abc\r\ndef", &[]), Some(3));
        assert_eq!(p.find_in_segments(b"abc\rdef", &[]), None);
    }

    #[test]
    fn finds_across_segment_boundary() {
        let p = KmpPattern::new(*b"END");
        assert_eq!(p.find_in_segments(b"xxE", b"NDyy"), Some(2));
        assert_eq!(p.find_in_segments(b"", b"abcEND"), Some(3));
    }

    #[test]
    fn backtracks_after_partial_match() {
        let p = KmpPattern::new(*b"aab");
        assert_eq!(p.find_in_segments(b"aaa", b"ab"), Some(2));
    }

    #[test]
    fn empty_or_oversized_pattern_never_matches() {
        assert_eq!(KmpPattern::default().find_in_segments(b"abc", b""), None);
        assert_eq!(KmpPattern::new(*b"abcd").find_in_segments(b"ab", b"c"), None);
    }
}
