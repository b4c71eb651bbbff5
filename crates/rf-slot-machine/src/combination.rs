//! Combination resolver
//!
//! Turns a stopped symbol row into a scored outcome. The row is first split
//! into contiguous runs, then three rewrite passes run in a fixed order:
//!
//! 1. wildcards (`question`) join their neighbours,
//! 2. breakers (`cross`) cut their neighbours down to a single symbol,
//! 3. adjacent runs of the same non-special family merge.
//!
//! The largest resulting range wins if it covers at least half the reels.
//! A range's symbol is always the row symbol at its `begin`.

use serde::{Deserialize, Serialize};

use crate::config::PayoutConfig;
use crate::symbols::{REEL_COUNT, Symbol, SymbolFamily, SymbolRow};

/// Smallest range that pays: a majority of the reels
const MIN_WINNING_SIZE: usize = REEL_COUNT.div_ceil(2);

/// Contiguous span of row indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub begin: usize,
    pub size: usize,
}

impl Range {
    pub const fn new(begin: usize, size: usize) -> Self {
        Self { begin, size }
    }

    /// One past the last index
    #[inline]
    pub fn end(&self) -> usize {
        self.begin + self.size
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.begin && index < self.end()
    }

    /// Indices covered, left to right
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.begin..self.end()
    }
}

/// Outcome of one finished spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationResult {
    /// Largest range after all rewrite passes
    pub range: Range,
    /// Score, 0 for a non-win
    pub points: u32,
    /// Dominant symbol was `respin`
    pub free_spin: bool,
    /// Symbol the points were paid for; `None` for a non-win
    pub dominant: Option<Symbol>,
}

impl CombinationResult {
    pub fn is_win(&self) -> bool {
        self.points > 0
    }
}

/// Run-length encode a row into ranges
pub fn continuous_ranges(symbols: &[Symbol]) -> Vec<Range> {
    assert!(!symbols.is_empty(), "cannot split an empty row");

    let mut ranges = vec![Range::new(0, 1)];
    for i in 1..symbols.len() {
        if symbols[i] == symbols[i - 1] {
            if let Some(last) = ranges.last_mut() {
                last.size += 1;
            }
        } else {
            ranges.push(Range::new(i, 1));
        }
    }
    ranges
}

/// Longest run of identical symbols, first wins ties
///
/// `begin` is relative to the slice.
pub fn max_equal_range(symbols: &[Symbol]) -> Range {
    let mut best = Range::default();
    for range in continuous_ranges(symbols) {
        if range.size > best.size {
            best = range;
        }
    }
    best
}

/// A row being resolved
#[derive(Debug, Clone)]
pub struct Combination<'a> {
    row: SymbolRow,
    ranges: Vec<Range>,
    payout: &'a PayoutConfig,
}

impl<'a> Combination<'a> {
    pub fn new(row: SymbolRow, payout: &'a PayoutConfig) -> Self {
        Self {
            row,
            ranges: continuous_ranges(&row),
            payout,
        }
    }

    pub fn row(&self) -> &SymbolRow {
        &self.row
    }

    /// Current ranges, left to right
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    #[inline]
    fn symbol(&self, range: Range) -> Symbol {
        self.row[range.begin]
    }

    /// Wildcard pass
    ///
    /// First, `X ? X` collapses into one `X` range. Then each remaining
    /// wildcard range joins its strictly larger neighbour (its only
    /// neighbour at the edges) unless that neighbour is shorter than the
    /// wildcard run itself.
    pub fn apply_questions(&mut self) {
        if self.ranges.len() <= 1 {
            return;
        }

        let mut i = 1;
        while i + 1 < self.ranges.len() {
            let middle = self.symbol(self.ranges[i]);
            let left = self.symbol(self.ranges[i - 1]);
            let right = self.symbol(self.ranges[i + 1]);

            if middle.is_wildcard() && left == right {
                let absorbed = self.ranges[i].size + self.ranges[i + 1].size;
                self.ranges[i - 1].size += absorbed;
                self.ranges.drain(i..i + 2);
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.ranges.len() && self.ranges.len() > 1 {
            let current = self.ranges[i];
            if !self.symbol(current).is_wildcard() {
                i += 1;
                continue;
            }

            let last = self.ranges.len() - 1;
            let target = if i == 0 {
                Some(i + 1)
            } else if i == last {
                Some(i - 1)
            } else {
                let (left, right) = (self.ranges[i - 1].size, self.ranges[i + 1].size);
                match left.cmp(&right) {
                    std::cmp::Ordering::Less => Some(i + 1),
                    std::cmp::Ordering::Greater => Some(i - 1),
                    std::cmp::Ordering::Equal => None,
                }
            };

            let Some(target) = target.filter(|&t| self.ranges[t].size >= current.size) else {
                // Wildcards dominate, or the neighbours tie
                i += 1;
                continue;
            };

            let merged = &mut self.ranges[target];
            merged.size += current.size;
            merged.begin = merged.begin.min(current.begin);
            // Index `i` now holds the next range, or a right neighbour that
            // starts on the wildcard and gets re-examined
            self.ranges.remove(i);
        }
    }

    /// Breaker pass: every `cross` range cuts both neighbours to size 1
    pub fn apply_crosses(&mut self) {
        for i in 0..self.ranges.len() {
            if !self.symbol(self.ranges[i]).is_breaker() {
                continue;
            }
            if i > 0 {
                self.ranges[i - 1].size = 1;
            }
            if i + 1 < self.ranges.len() {
                self.ranges[i + 1].size = 1;
            }
        }
    }

    /// Family pass: pairwise, left absorbs right
    ///
    /// The pair is compared on the symbols either side of their shared
    /// boundary. A `cross` range right outside the pair blocks the merge.
    pub fn apply_family_symbols(&mut self) {
        let mut i = 1;
        while i < self.ranges.len() {
            let current = self.ranges[i];
            let family = self.row[current.begin].family();
            let boundary_family = self.row[current.begin - 1].family();

            let mergeable = family == boundary_family && family != SymbolFamily::Special;
            let left_broken = i > 1 && self.symbol(self.ranges[i - 2]).is_breaker();
            let right_broken =
                i + 1 < self.ranges.len() && self.symbol(self.ranges[i + 1]).is_breaker();

            if mergeable && !left_broken && !right_broken {
                self.ranges[i - 1].size += current.size;
                self.ranges.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Run every pass and score the dominant range
    pub fn result(mut self) -> CombinationResult {
        self.apply_questions();
        self.apply_crosses();
        self.apply_family_symbols();

        let mut combo = self.ranges[0];
        for range in &self.ranges[1..] {
            if range.size > combo.size {
                combo = *range;
            }
        }

        if combo.size < MIN_WINNING_SIZE {
            return CombinationResult {
                range: combo,
                points: 0,
                free_spin: false,
                dominant: None,
            };
        }

        let window = &self.row[combo.begin..combo.end()];
        let mut equal = max_equal_range(window);
        let mut dominant = window[equal.begin];

        if dominant.is_wildcard() && equal.size < combo.size {
            let equal_begin = combo.begin + equal.begin;
            let equal_end = equal_begin + equal.size;

            let in_middle = equal_begin > combo.begin && equal_end < combo.end();
            if in_middle && self.row[equal_begin - 1] == self.row[equal_end] {
                dominant = self.row[equal_begin - 1];
            } else if equal_end < combo.end() {
                dominant = self.row[equal_end];
                equal.begin += equal.size;
            } else {
                // Wildcards close the range; pay for what they follow
                dominant = self.row[equal_begin - 1];
            }
        }

        let payout = self.payout;
        let equal_size = equal.size as u32;
        let rest_size = (combo.size - equal.size) as u32;
        let points = payout
            .big_multiplier
            .saturating_pow(equal_size)
            .saturating_mul(payout.small_multiplier.saturating_pow(rest_size))
            .saturating_mul(payout.base_value(dominant));

        CombinationResult {
            range: combo,
            points,
            free_spin: dominant.triggers_respin(),
            dominant: Some(dominant),
        }
    }
}

/// Resolve a row in one call
pub fn evaluate(row: SymbolRow, payout: &PayoutConfig) -> CombinationResult {
    let result = Combination::new(row, payout).result();
    log::debug!(
        "Combination {:?}: range {}+{}, {} points{}",
        row,
        result.range.begin,
        result.range.size,
        result.points,
        if result.free_spin { ", free spin" } else { "" }
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::*;

    fn resolve(row: SymbolRow) -> CombinationResult {
        evaluate(row, &PayoutConfig::default())
    }

    fn after_questions(row: SymbolRow) -> Vec<Range> {
        let payout = PayoutConfig::default();
        let mut combination = Combination::new(row, &payout);
        combination.apply_questions();
        combination.ranges().to_vec()
    }

    #[test]
    fn test_continuous_ranges() {
        assert_eq!(continuous_ranges(&[Apple; 5]), vec![Range::new(0, 5)]);
        assert_eq!(continuous_ranges(&[Corn; 3]), vec![Range::new(0, 3)]);
        assert_eq!(
            continuous_ranges(&[Apple, Apple, Cross, Heart, Heart]),
            vec![Range::new(0, 2), Range::new(2, 1), Range::new(3, 2)]
        );
    }

    #[test]
    #[should_panic]
    fn test_continuous_ranges_rejects_empty_row() {
        continuous_ranges(&[]);
    }

    #[test]
    fn test_max_equal_range_first_wins_ties() {
        assert_eq!(max_equal_range(&[Apple, Apple, Corn, Corn, Grape]), Range::new(0, 2));
        assert_eq!(max_equal_range(&[Apple, Corn, Corn, Corn, Grape]), Range::new(1, 3));
    }

    #[test]
    fn test_questions_between_equal_symbols_merge() {
        assert_eq!(
            after_questions([Seven, Question, Question, Question, Seven]),
            vec![Range::new(0, 5)]
        );
        assert_eq!(
            after_questions([Heart, Question, Heart, Corn, Grape]),
            vec![Range::new(0, 3), Range::new(3, 1), Range::new(4, 1)]
        );
    }

    #[test]
    fn test_question_joins_larger_neighbour() {
        assert_eq!(
            after_questions([Apple, Apple, Question, Heart, Corn]),
            vec![Range::new(0, 3), Range::new(3, 1), Range::new(4, 1)]
        );
        assert_eq!(
            after_questions([Seven, Question, Heart, Heart, Heart]),
            vec![Range::new(0, 1), Range::new(1, 4)]
        );
    }

    #[test]
    fn test_question_tie_stays_unmerged() {
        assert_eq!(
            after_questions([Apple, Apple, Question, Heart, Heart]),
            vec![Range::new(0, 2), Range::new(2, 1), Range::new(3, 2)]
        );
    }

    #[test]
    fn test_edge_question_needs_big_enough_neighbour() {
        // Leading wildcard joins the run to its right
        assert_eq!(
            after_questions([Question, Topaz, Topaz, Corn, Heart]).first(),
            Some(&Range::new(0, 3))
        );
        // Three wildcards never join a single symbol
        assert_eq!(
            after_questions([Question, Question, Question, Topaz, Heart]),
            vec![Range::new(0, 3), Range::new(3, 1), Range::new(4, 1)]
        );
    }

    #[test]
    fn test_single_range_row() {
        let result = resolve([Heart; 5]);
        assert_eq!(result.range, Range::new(0, 5));
        assert_eq!(result.points, 16 * 5u32.pow(5));
        assert_eq!(result.dominant, Some(Heart));
        assert!(!result.free_spin);
    }

    #[test]
    fn test_sevens_around_questions() {
        let result = resolve([Seven, Question, Question, Question, Seven]);
        assert_eq!(result.range, Range::new(0, 5));
        assert_eq!(result.dominant, Some(Seven));
        // Equal run is the three wildcards: 5^3 · 2^2
        assert_eq!(result.points, 32 * 125 * 4);
    }

    #[test]
    fn test_cross_breaks_combination() {
        let result = resolve([Apple, Apple, Cross, Apple, Apple]);
        assert_eq!(result.points, 0);
        assert_eq!(result.dominant, None);
        assert!(!result.free_spin);
    }

    #[test]
    fn test_family_merge_around_carrots() {
        let result = resolve([Apple, Carrot, Carrot, Carrot, Grape]);
        assert_eq!(result.range, Range::new(0, 5));
        assert_eq!(result.dominant, Some(Carrot));
        assert_eq!(result.points, 8 * 125 * 4);
    }

    #[test]
    fn test_special_family_never_merges() {
        let result = resolve([Seven, Respin, Seven, Respin, Seven]);
        assert_eq!(result.points, 0);
    }

    #[test]
    fn test_cross_blocks_only_adjacent_pair() {
        // cross | heart | club diamond spade: the heart/club pair is blocked,
        // club/diamond/spade still merge
        let payout = PayoutConfig::default();
        let mut combination = Combination::new([Cross, Heart, Club, Diamond, Spade], &payout);
        combination.apply_questions();
        combination.apply_crosses();
        combination.apply_family_symbols();
        assert_eq!(
            combination.ranges(),
            &[Range::new(0, 1), Range::new(1, 1), Range::new(2, 3)]
        );

        let result = resolve([Cross, Heart, Club, Diamond, Spade]);
        assert_eq!(result.range, Range::new(2, 3));
        assert_eq!(result.dominant, Some(Club));
        assert_eq!(result.points, 16 * 5 * 4);
    }

    #[test]
    fn test_respin_triggers_free_spin() {
        let result = resolve([Respin; 5]);
        assert!(result.free_spin);
        assert_eq!(result.points, 12 * 5u32.pow(5));

        let result = resolve([Respin, Respin, Respin, Apple, Heart]);
        assert!(result.free_spin);
        assert_eq!(result.range, Range::new(0, 3));
    }

    #[test]
    fn test_leading_questions_pay_for_following_symbol() {
        // ??X X X: wildcards join the larger run to their right
        let result = resolve([Question, Question, Emerald, Emerald, Emerald]);
        assert_eq!(result.range, Range::new(0, 5));
        assert_eq!(result.dominant, Some(Emerald));
        assert_eq!(result.points, 24 * 125 * 4);
    }

    #[test]
    fn test_trailing_questions_pay_for_preceding_symbol() {
        let result = resolve([Corn, Diamond, Diamond, Question, Question]);
        assert_eq!(result.range, Range::new(1, 4));
        assert_eq!(result.dominant, Some(Diamond));
        // Equal run is the two diamonds (first wins the tie with the wildcards)
        assert_eq!(result.points, 16 * 25 * 4);
    }

    #[test]
    fn test_weak_range_is_not_a_win() {
        let result = resolve([Apple, Heart, Topaz, Seven, Cross]);
        assert_eq!(result.points, 0);
        assert!(result.range.size < 3);
    }
}
