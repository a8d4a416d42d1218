//! Approximate substring matching for a single field value.
//!
//! Exact occurrences are found first. Without one, the best approximate
//! occurrence is found with a semi-global edit distance (the pattern must be
//! consumed entirely, the text may be entered and left anywhere), and the
//! characters the alignment matched are marked.
//!
//! The distance pass keeps a single DP row. The full table is only built for
//! the short window that can hold the best alignment, so memory stays
//! proportional to the pattern however long the field is.

use crate::search::MatchRange;

/// Outcome of matching a pattern against one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueHit {
    /// `errors / pattern_len`, 0 for an exact occurrence.
    pub score: f64,
    pub ranges: Vec<MatchRange>,
}

/// Lowercase character by character, keeping one char per input char so
/// indices into the folded text are indices into the original.
#[must_use]
pub fn fold_case(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Match a folded pattern against a folded value.
///
/// Returns `None` when the value is shorter than `min_len`, the score exceeds
/// `threshold`, or no marked run reaches `min_len` characters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn match_value(pattern: &[char], text: &[char], threshold: f64, min_len: usize) -> Option<ValueHit> {
    let min_len = min_len.max(1);
    if pattern.is_empty() || text.len() < min_len {
        return None;
    }

    let mut mask = vec![false; text.len()];
    let score = if mark_exact(pattern, text, &mut mask) {
        0.0
    } else {
        let (end, errors) = best_end(pattern, text);
        let score = errors as f64 / pattern.len() as f64;
        if score > threshold {
            return None;
        }

        // An alignment with `errors` edits spans at most this many chars.
        let start = end.saturating_sub(pattern.len() + errors);
        let window = &text[start..end];
        EditMatrix::compute(pattern, window).mark_alignment(
            pattern,
            window,
            window.len(),
            &mut mask[start..end],
        );
        score
    };

    if score > threshold {
        return None;
    }

    let ranges = mask_to_ranges(&mask, min_len);
    if ranges.is_empty() {
        return None;
    }
    Some(ValueHit { score, ranges })
}

/// Mark every non-overlapping exact occurrence, scanning left to right.
fn mark_exact(pattern: &[char], text: &[char], mask: &mut [bool]) -> bool {
    let m = pattern.len();
    let mut found = false;
    let mut i = 0;
    while i + m <= text.len() {
        if text[i..i + m] == *pattern {
            mask[i..i + m].fill(true);
            found = true;
            i += m;
        } else {
            i += 1;
        }
    }
    found
}

/// Leftmost end column with the fewest errors, as `(end, errors)`.
///
/// Sellers' recurrence, one text char at a time over a row indexed by
/// pattern position. Row 0 stays zero so a match may start anywhere.
fn best_end(pattern: &[char], text: &[char]) -> (usize, usize) {
    let m = pattern.len();
    let mut dp: Vec<usize> = (0..=m).collect();
    let mut best = (0, m);

    for (j, &tc) in text.iter().enumerate() {
        let mut prev = dp[0];
        for i in 1..=m {
            let temp = dp[i];
            let cost = usize::from(pattern[i - 1] != tc);
            dp[i] = (dp[i] + 1).min(dp[i - 1] + 1).min(prev + cost);
            prev = temp;
        }
        if dp[m] < best.1 {
            best = (j + 1, dp[m]);
        }
    }
    best
}

/// Full DP table for semi-global edit distance over a short window.
///
/// Row 0 is all zeros so a match may start anywhere in the window.
struct EditMatrix {
    cols: usize,
    rows: usize,
    cells: Vec<usize>,
}

impl EditMatrix {
    fn compute(pattern: &[char], text: &[char]) -> Self {
        let rows = pattern.len() + 1;
        let cols = text.len() + 1;
        let mut cells = vec![0; rows * cols];

        for i in 1..rows {
            cells[i * cols] = i;
            for j in 1..cols {
                let cost = usize::from(pattern[i - 1] != text[j - 1]);
                let diagonal = cells[(i - 1) * cols + j - 1] + cost;
                let skip_pattern = cells[(i - 1) * cols + j] + 1;
                let skip_text = cells[i * cols + j - 1] + 1;
                cells[i * cols + j] = diagonal.min(skip_pattern).min(skip_text);
            }
        }

        Self { cols, rows, cells }
    }

    fn at(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }

    /// Walk back from `(last row, end)` marking text chars the pattern hit.
    fn mark_alignment(&self, pattern: &[char], text: &[char], end: usize, mask: &mut [bool]) {
        let (mut i, mut j) = (self.rows - 1, end);
        while i > 0 && j > 0 {
            let here = self.at(i, j);
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            if here == self.at(i - 1, j - 1) + cost {
                if cost == 0 {
                    mask[j - 1] = true;
                }
                i -= 1;
                j -= 1;
            } else if here == self.at(i - 1, j) + 1 {
                i -= 1;
            } else {
                j -= 1;
            }
        }
    }
}

/// Runs of marked characters as inclusive ranges, dropping short runs.
#[must_use]
pub fn mask_to_ranges(mask: &[bool], min_len: usize) -> Vec<MatchRange> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &marked) in mask.iter().enumerate() {
        match (marked, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    ranges.push(MatchRange::new(s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start
        && mask.len() - s >= min_len
    {
        ranges.push(MatchRange::new(s, mask.len() - 1));
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(pattern: &str, text: &str, threshold: f64) -> Option<ValueHit> {
        match_value(&fold_case(pattern), &fold_case(text), threshold, 2)
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let hit = hit("next", "Intro to Next.js", 0.3).unwrap();
        assert!(hit.score.abs() < f64::EPSILON);
        assert_eq!(hit.ranges, vec![MatchRange::new(9, 12)]);
    }

    #[test]
    fn every_exact_occurrence_is_marked() {
        let hit = hit("go", "go and go", 0.0).unwrap();
        assert_eq!(hit.ranges, vec![MatchRange::new(0, 1), MatchRange::new(7, 8)]);
    }

    #[test]
    fn one_typo_is_tolerated() {
        let hit = hit("basiks", "rust basics", 0.3).unwrap();
        assert!((hit.score - 1.0 / 6.0).abs() < 1e-12);
        // "basi" matched, the trailing "s" run is too short to count
        assert_eq!(hit.ranges, vec![MatchRange::new(5, 8)]);
    }

    #[test]
    fn threshold_zero_requires_exact() {
        assert!(hit("basiks", "rust basics", 0.0).is_none());
        assert!(hit("basics", "rust basics", 0.0).is_some());
    }

    #[test]
    fn dissimilar_text_rejected() {
        assert!(hit("next", "rust basics", 0.3).is_none());
        assert!(hit("next", "react", 0.3).is_none());
    }

    #[test]
    fn short_values_never_match() {
        assert!(match_value(&fold_case("a"), &fold_case("a"), 1.0, 2).is_none());
        assert!(match_value(&fold_case("ab"), &fold_case("ab"), 1.0, 2).is_some());
    }

    #[test]
    fn best_end_is_leftmost_minimum() {
        assert_eq!(best_end(&fold_case("basiks"), &fold_case("rust basics")), (11, 1));
        assert_eq!(best_end(&fold_case("ab"), &fold_case("xxabxxab")), (4, 0));
        assert_eq!(best_end(&fold_case("abc"), &[]), (0, 3));
    }

    #[test]
    fn typo_deep_in_long_text_marks_absolute_positions() {
        let padding = "lorem ipsum ".repeat(2000);
        let text = format!("{padding}garbage colection");
        let offset = padding.chars().count() + "garbage ".len();

        let hit = hit("collection", &text, 0.3).unwrap();
        assert!((hit.score - 0.1).abs() < 1e-12);
        assert_eq!(hit.ranges.first().map(|r| r.start), Some(offset));
        assert_eq!(hit.ranges.last().map(|r| r.end), Some(offset + 8));
    }

    #[test]
    fn unicode_indices_are_char_based() {
        let hit = hit("café", "Le Café noir", 0.0).unwrap();
        assert_eq!(hit.ranges, vec![MatchRange::new(3, 6)]);
    }

    #[test]
    fn mask_runs() {
        let mask = [true, true, false, true, false, true, true, true];
        assert_eq!(
            mask_to_ranges(&mask, 2),
            vec![MatchRange::new(0, 1), MatchRange::new(5, 7)]
        );
        assert_eq!(mask_to_ranges(&mask, 1).len(), 3);
        assert!(mask_to_ranges(&[false, false], 1).is_empty());
    }
}
