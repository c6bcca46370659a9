//! In-buffer find.
//!
//! Linear scan over UTF-16 code units starting at the host's selection.
//! The scan stops at the buffer boundary: there is no wraparound, running
//! off either end yields `MatchResult::NotFound`.

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// How `match_case == false` compares code units.
///
/// `Ascii` folds `A-Z` only. `Unicode` also folds any BMP code unit whose
/// lowercase mapping is a single BMP char (`'\u{C9}'` == `'\u{E9}'`);
/// mappings that expand (`'\u{130}'`) and surrogate halves compare ordinally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFold {
    #[default]
    Ascii,
    Unicode,
}

impl CaseFold {
    pub fn fold(self, unit: u16) -> u16 {
        match self {
            CaseFold::Ascii => fold_ascii(unit),
            CaseFold::Unicode => fold_simple(unit),
        }
    }
}

fn fold_ascii(unit: u16) -> u16 {
    if (u16::from(b'A')..=u16::from(b'Z')).contains(&unit) {
        unit + 0x20
    } else {
        unit
    }
}

fn fold_simple(unit: u16) -> u16 {
    if unit < 0x80 {
        return fold_ascii(unit);
    }
    let Some(c) = char::from_u32(u32::from(unit)) else {
        return unit;
    };
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => u16::try_from(u32::from(l)).unwrap_or(unit),
        _ => unit,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: Vec<u16>,
    pub match_case: bool,
    pub direction: SearchDirection,
    pub case_fold: CaseFold,
}

impl SearchQuery {
    pub fn new(pattern: &str, match_case: bool, direction: SearchDirection) -> Self {
        Self {
            pattern: pattern.encode_utf16().collect(),
            match_case,
            direction,
            case_fold: CaseFold::default(),
        }
    }

    pub fn forward(pattern: &str, match_case: bool) -> Self {
        Self::new(pattern, match_case, SearchDirection::Forward)
    }

    pub fn backward(pattern: &str, match_case: bool) -> Self {
        Self::new(pattern, match_case, SearchDirection::Backward)
    }

    pub fn with_case_fold(mut self, case_fold: CaseFold) -> Self {
        self.case_fold = case_fold;
        self
    }

    fn matches_at(&self, haystack: &[u16], at: usize) -> bool {
        let window = &haystack[at..at + self.pattern.len()];
        if self.match_case {
            window == self.pattern.as_slice()
        } else {
            window
                .iter()
                .zip(&self.pattern)
                .all(|(&h, &p)| h == p || self.case_fold.fold(h) == self.case_fold.fold(p))
        }
    }
}

/// Highlighted range in the host's text view, in code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchCursor {
    pub selection_start: usize,
    pub selection_end: usize,
}

impl SearchCursor {
    pub fn new(selection_start: usize, selection_end: usize) -> Self {
        Self {
            selection_start,
            selection_end,
        }
    }

    pub fn caret(at: usize) -> Self {
        Self::new(at, at)
    }

    /// Cursor with the match selected, ready for the next find.
    pub fn after_match(start: usize, length: usize) -> Self {
        Self::new(start, start + length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Found { start: usize, length: usize },
    NotFound,
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }

    pub fn range(&self) -> Option<Range<usize>> {
        match *self {
            MatchResult::Found { start, length } => Some(start..start + length),
            MatchResult::NotFound => None,
        }
    }

    pub fn cursor(&self) -> Option<SearchCursor> {
        match *self {
            MatchResult::Found { start, length } => Some(SearchCursor::after_match(start, length)),
            MatchResult::NotFound => None,
        }
    }
}

/// Finds the next occurrence of `query.pattern` relative to `cursor`.
///
/// Forward tries start offsets `selection_end..=len - plen`. Backward tries
/// offsets strictly before `selection_start`, nearest first, down to 0.
pub fn find(haystack: &[u16], query: &SearchQuery, cursor: SearchCursor) -> MatchResult {
    let plen = query.pattern.len();
    if plen == 0 || plen > haystack.len() {
        return MatchResult::NotFound;
    }
    let last = haystack.len() - plen;

    let hit = match query.direction {
        SearchDirection::Forward => {
            let from = cursor.selection_end.min(haystack.len());
            (from..=last).find(|&at| query.matches_at(haystack, at))
        }
        SearchDirection::Backward => {
            let start = cursor.selection_start.min(haystack.len());
            if start == 0 {
                None
            } else {
                let from = (start - 1).min(last);
                (0..=from).rev().find(|&at| query.matches_at(haystack, at))
            }
        }
    };

    match hit {
        Some(start) => {
            tracing::debug!(start, length = plen, "text found");
            MatchResult::Found { start, length: plen }
        }
        None => {
            tracing::debug!(?cursor, direction = ?query.direction, "text not found");
            MatchResult::NotFound
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
