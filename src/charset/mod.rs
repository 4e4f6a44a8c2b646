//! Character sets as sorted, non-overlapping ranges of Unicode code points,
//! with the set algebra the constant folder evaluates: union, difference,
//! intersection and complement against the full scalar range.

use crate::ustring::write_codepoint;
use crate::{CharRange, CharSet, MAX_UNICODE};
use std::fmt::{Debug, Display, Formatter, Write};

#[cfg(test)]
mod __tests__;

impl CharRange {
    /// Create a new closed range. Reversed bounds are swapped.
    pub fn new(start: u32, end: u32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A range covering the single given code point.
    pub fn point(c: u32) -> Self {
        Self { start: c, end: c }
    }

    pub fn contains(&self, c: u32) -> bool {
        self.start <= c && c <= self.end
    }

    /// Number of code points covered by the range.
    pub fn size(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }
}

impl CharSet {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// A set containing the single given code point.
    pub fn point(c: u32) -> Self {
        Self {
            ranges: vec![CharRange::point(c)],
        }
    }

    /// Build a set from arbitrary ranges; overlapping and adjacent ranges are merged.
    pub fn from_ranges(ranges: Vec<CharRange>) -> Self {
        let mut set = Self { ranges };
        set.normalize();
        set
    }

    /// The full Unicode scalar set `[0, MAX_UNICODE]`, the meaning of the any-set `\U`.
    pub fn universe() -> Self {
        Self {
            ranges: vec![CharRange::new(0, MAX_UNICODE)],
        }
    }

    pub fn is_universe(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].start == 0 && self.ranges[0].end == MAX_UNICODE
    }

    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of code points in the set.
    pub fn size(&self) -> u64 {
        self.ranges.iter().map(|r| r.size()).sum()
    }

    pub fn contains(&self, c: u32) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if c < r.start {
                    std::cmp::Ordering::Greater
                } else if c > r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn add_range(&mut self, range: CharRange) {
        self.ranges.push(range);
        self.normalize();
    }

    pub fn union(&self, other: &CharSet) -> CharSet {
        let mut ranges = Vec::with_capacity(self.ranges.len() + other.ranges.len());
        ranges.extend_from_slice(&self.ranges);
        ranges.extend_from_slice(&other.ranges);
        CharSet::from_ranges(ranges)
    }

    pub fn intersection(&self, other: &CharSet) -> CharSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let start = self.ranges[i].start.max(other.ranges[j].start);
            let end = self.ranges[i].end.min(other.ranges[j].end);
            if start <= end {
                out.push(CharRange { start, end });
            }
            if self.ranges[i].end < other.ranges[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
        CharSet { ranges: out }
    }

    pub fn difference(&self, other: &CharSet) -> CharSet {
        let mut out = Vec::new();
        let mut j = 0;
        for r in &self.ranges {
            let mut start = r.start;
            while j < other.ranges.len() && other.ranges[j].end < start {
                j += 1;
            }
            let mut k = j;
            let mut exhausted = false;
            while k < other.ranges.len() && other.ranges[k].start <= r.end {
                let cut = other.ranges[k];
                if cut.start > start {
                    out.push(CharRange::new(start, cut.start - 1));
                }
                if cut.end >= r.end {
                    exhausted = true;
                    break;
                }
                start = cut.end + 1;
                k += 1;
            }
            if !exhausted && start <= r.end {
                out.push(CharRange::new(start, r.end));
            }
        }
        CharSet { ranges: out }
    }

    /// Complement against the full Unicode scalar set.
    /// Ranges above [MAX_UNICODE] (the augment sentinel) do not participate.
    pub fn complement(&self) -> CharSet {
        let mut out = Vec::new();
        let mut next: u32 = 0;
        for r in &self.ranges {
            if r.start > MAX_UNICODE {
                break;
            }
            if r.start > next {
                out.push(CharRange::new(next, r.start - 1));
            }
            match r.end.checked_add(1) {
                Some(n) => next = n,
                None => return CharSet { ranges: out },
            }
            if next > MAX_UNICODE {
                return CharSet { ranges: out };
            }
        }
        out.push(CharRange::new(next, MAX_UNICODE));
        CharSet { ranges: out }
    }

    fn normalize(&mut self) {
        self.ranges.sort_by_key(|r| r.start);
        let mut merged: Vec<CharRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if r.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(r.end);
                }
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
    }
}

impl Display for CharSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('[')?;
        for r in &self.ranges {
            if r.start == r.end {
                write_member(f, r.start)?;
            } else {
                write_member(f, r.start)?;
                f.write_char('-')?;
                write_member(f, r.end)?;
            }
        }
        f.write_char(']')
    }
}

impl Debug for CharSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "charset{}", self)
    }
}

// Members that collide with the literal syntax are backslash escaped so the
// rendering stays reparseable.
fn write_member(f: &mut Formatter<'_>, c: u32) -> std::fmt::Result {
    match c {
        0x2D | 0x5C | 0x5D => {
            f.write_char('\\')?;
            f.write_char(c as u8 as char)
        }
        _ => write_codepoint(f, c),
    }
}
