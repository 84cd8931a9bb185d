//! Fuzzy subsequence scorer
//!
//! Finds the highest scoring alignment of the query as a subsequence of the
//! text. The recurrence tracks, for every query position `i` and text
//! position `j`:
//!
//! - `D[i][j]`: best score with query char `i` matched exactly at `j`
//! - `M[i][j]`: best score with query chars `..=i` matched within `..=j`
//!
//! Only the previous and current text columns of `D`/`M` are kept. The
//! decisions needed to recover positions take one byte per cell and are
//! held for one segment of text columns at a time: the forward pass
//! checkpoints both columns at every segment start, and the backward walk
//! replays a segment from its checkpoint when it crosses into it. Texts
//! that fit in one segment are never replayed. Memory per candidate is
//! bounded by the segment buffer plus one checkpoint per segment, and all
//! buffers live in a [`FuzzyScratch`] reused across candidates.

use super::{chars_eq, Scorer};
use crate::config::ScoreWeights;
use crate::types::Match;

/// Sentinel for "no alignment"; far enough from `i64::MIN` that adding
/// penalties cannot wrap.
pub const SCORE_MIN: i64 = i64::MIN / 4;

/// Lowest score a valid alignment can reach
const SCORE_FLOOR: i64 = SCORE_MIN + 1;

/// Decision bytes held per segment
const TRACE_CELLS: usize = 1 << 16;

const D_VALID: u8 = 0b001;
const M_FROM_D: u8 = 0b010;
const D_CONSECUTIVE: u8 = 0b100;

/// Reusable buffers for [`FuzzyScorer::score_with`]
#[derive(Debug, Clone, Default)]
pub struct FuzzyScratch {
    bonus: Vec<i64>,
    d_prev: Vec<i64>,
    m_prev: Vec<i64>,
    d_cur: Vec<i64>,
    m_cur: Vec<i64>,
    trace: Vec<u8>,
    checkpoints: Vec<i64>,
}

impl FuzzyScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, n: usize, width: usize) {
        for column in [
            &mut self.d_prev,
            &mut self.m_prev,
            &mut self.d_cur,
            &mut self.m_cur,
        ] {
            column.clear();
            column.resize(n, SCORE_MIN);
        }
        self.trace.clear();
        self.trace.resize(width * n, 0);
        self.checkpoints.clear();
    }

    /// Advance the DP by text column `j`, recording decisions in `slot`.
    fn step(
        &mut self,
        w: &ScoreWeights,
        needle: &[char],
        (j, h): (usize, char),
        case_sensitive: bool,
        slot: usize,
    ) {
        let n = needle.len();
        let bonus = self.bonus[j];
        let cells = &mut self.trace[slot * n..(slot + 1) * n];
        cells.fill(0);

        for (i, &q) in needle.iter().enumerate() {
            let gap = if i == n - 1 { w.gap_trailing } else { w.gap_inner };
            let carried = add(self.m_prev[i], gap);

            let mut d = SCORE_MIN;
            if chars_eq(q, h, case_sensitive) {
                let matched = if q == h {
                    w.match_base.saturating_add(w.bonus_exact_case)
                } else {
                    w.match_base
                };
                if i == 0 {
                    d = (j as i64)
                        .saturating_mul(w.gap_leading)
                        .saturating_add(bonus)
                        .saturating_add(matched)
                        .max(SCORE_FLOOR);
                } else if j > 0 {
                    let via_gap = add(self.m_prev[i - 1], bonus.saturating_add(matched));
                    let via_run = add(
                        self.d_prev[i - 1],
                        w.bonus_consecutive.saturating_add(matched),
                    );
                    if via_run > SCORE_MIN && via_run >= via_gap {
                        d = via_run;
                        cells[i] |= D_CONSECUTIVE;
                    } else {
                        d = via_gap;
                    }
                }
            }

            self.d_cur[i] = d;
            if d > SCORE_MIN {
                cells[i] |= D_VALID;
                if d >= carried {
                    cells[i] |= M_FROM_D;
                    self.m_cur[i] = d;
                    continue;
                }
            }
            self.m_cur[i] = carried;
        }

        std::mem::swap(&mut self.d_prev, &mut self.d_cur);
        std::mem::swap(&mut self.m_prev, &mut self.m_cur);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyScorer<'a> {
    weights: &'a ScoreWeights,
}

impl<'a> FuzzyScorer<'a> {
    pub fn new(weights: &'a ScoreWeights) -> Self {
        Self { weights }
    }

    /// Bonus for matching `current` when it directly follows `previous`.
    fn boundary_bonus(&self, previous: char, current: char) -> i64 {
        if !current.is_alphanumeric() {
            return 0;
        }
        match previous {
            '/' => self.weights.bonus_slash,
            ' ' | '_' | '-' => self.weights.bonus_word,
            '.' => self.weights.bonus_dot,
            p if p.is_lowercase() && current.is_uppercase() => self.weights.bonus_camel,
            _ => 0,
        }
    }

    fn fill_bonuses(&self, haystack: &[char], bonus: &mut Vec<i64>) {
        bonus.clear();
        // The first char is scored as if preceded by a path separator
        let mut previous = '/';
        bonus.extend(haystack.iter().map(|&c| {
            let value = self.boundary_bonus(previous, c);
            previous = c;
            value
        }));
    }

    /// Score using caller-owned buffers.
    pub fn score_with(
        &self,
        scratch: &mut FuzzyScratch,
        needle: &[char],
        haystack: &[char],
        case_sensitive: bool,
    ) -> Option<Match> {
        self.align(scratch, needle, haystack, case_sensitive, TRACE_CELLS)
    }

    fn align(
        &self,
        scratch: &mut FuzzyScratch,
        needle: &[char],
        haystack: &[char],
        case_sensitive: bool,
        trace_cells: usize,
    ) -> Option<Match> {
        let n = needle.len();
        let m = haystack.len();

        if n == 0 {
            return Some(Match {
                score: self.weights.neutral,
                positions: Vec::new(),
            });
        }
        if m < n || !is_subsequence(needle, haystack, case_sensitive) {
            return None;
        }

        // Long queries would leave segments too narrow; keep the number of
        // checkpoints near the square root of the text length
        let width = (trace_cells / n)
            .max((m as f64).sqrt().ceil() as usize)
            .clamp(1, m);

        self.fill_bonuses(haystack, &mut scratch.bonus);
        scratch.reset(n, width);

        for (j, &h) in haystack.iter().enumerate() {
            let slot = j % width;
            if slot == 0 {
                scratch.checkpoints.extend_from_slice(&scratch.d_prev);
                scratch.checkpoints.extend_from_slice(&scratch.m_prev);
            }
            scratch.step(self.weights, needle, (j, h), case_sensitive, slot);
        }

        let score = scratch.m_prev[n - 1];
        if score <= SCORE_MIN {
            return None;
        }

        // Walk back from the bottom-right cell
        let mut positions = vec![0usize; n];
        let mut match_required = false;
        let mut loaded = (m - 1) / width;
        let mut j = m;
        for i in (0..n).rev() {
            loop {
                if j == 0 {
                    return None;
                }
                j -= 1;
                let segment = j / width;
                if segment != loaded {
                    self.replay(scratch, needle, haystack, case_sensitive, segment, width);
                    loaded = segment;
                }
                let cell = scratch.trace[(j - segment * width) * n + i];
                if cell & D_VALID != 0 && (match_required || cell & M_FROM_D != 0) {
                    positions[i] = j;
                    match_required = cell & D_CONSECUTIVE != 0;
                    break;
                }
            }
        }

        Some(Match { score, positions })
    }

    /// Recompute the decisions of one segment from its checkpoint.
    fn replay(
        &self,
        scratch: &mut FuzzyScratch,
        needle: &[char],
        haystack: &[char],
        case_sensitive: bool,
        segment: usize,
        width: usize,
    ) {
        let n = needle.len();
        let base = segment * 2 * n;
        scratch
            .d_prev
            .copy_from_slice(&scratch.checkpoints[base..base + n]);
        scratch
            .m_prev
            .copy_from_slice(&scratch.checkpoints[base + n..base + 2 * n]);

        let start = segment * width;
        let end = (start + width).min(haystack.len());
        for j in start..end {
            scratch.step(self.weights, needle, (j, haystack[j]), case_sensitive, j - start);
        }
    }
}

fn is_subsequence(needle: &[char], haystack: &[char], case_sensitive: bool) -> bool {
    let mut rest = haystack.iter();
    needle
        .iter()
        .all(|&n| rest.any(|&h| chars_eq(n, h, case_sensitive)))
}

/// Extend a score; "no alignment" stays put and valid scores never sink
/// into the sentinel range.
#[inline]
fn add(score: i64, delta: i64) -> i64 {
    if score <= SCORE_MIN {
        SCORE_MIN
    } else {
        score.saturating_add(delta).max(SCORE_FLOOR)
    }
}

impl Scorer for FuzzyScorer<'_> {
    fn score(&self, needle: &[char], haystack: &[char], case_sensitive: bool) -> Option<Match> {
        self.score_with(&mut FuzzyScratch::new(), needle, haystack, case_sensitive)
    }
}
