//! The RNGLR reduction record consumed by the parse table generator.

use crate::{Reduction, SymbolLookup, UStr};
use std::fmt::Debug;

impl Reduction {
    /// Create a new reduction marker for the parse table.
    pub fn new(head_idx: u64, length: u64) -> Self {
        Self { head_idx, length }
    }

    pub fn head_idx(&self) -> u64 {
        self.head_idx
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Render the reduction as `R(HeadName, length)`, resolving the head
    /// through the symbol table. An unknown index falls back to the raw index.
    pub fn str<S: SymbolLookup + ?Sized>(&self, symbols: &S) -> String {
        match symbols.get_symbol(self.head_idx) {
            Some(name) => format!("R({}, {})", name, self.length),
            None => format!("R({}, {})", self.head_idx, self.length),
        }
    }

    /// The printed width of [str](Reduction::str), used to align columns in
    /// parse table dumps.
    pub fn strlen<S: SymbolLookup + ?Sized>(&self, symbols: &S) -> usize {
        self.str(symbols).chars().count()
    }
}

impl Debug for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reduction{{head_idx: {}, length: {}}}",
            self.head_idx, self.length
        )
    }
}

impl SymbolLookup for Vec<UStr> {
    fn get_symbol(&self, idx: u64) -> Option<&UStr> {
        self.get(idx as usize)
    }
}
