// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-width bit sets used as dataflow lattice values.
//!
//! A [`BitSet`] has a fixed universe `[0, len)` chosen at construction (the number of numbered
//! facts). Indices outside the universe are never members: `insert` ignores them and `contains`
//! reports `false`.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// A fixed-universe set of small integers, stored as 64-bit words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Creates an empty set over the universe `[0, len)`.
    #[must_use]
    pub fn new_empty(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            bits: vec![0; words],
            len,
        }
    }

    /// Creates a set over `[0, len)` containing the given indices.
    #[must_use]
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut s = Self::new_empty(len);
        for i in indices {
            s.insert(i);
        }
        s
    }

    /// Size of the universe this set ranges over.
    #[must_use]
    #[inline]
    pub fn universe(&self) -> usize {
        self.len
    }

    /// Returns `true` if `idx` is a member.
    #[must_use]
    pub fn contains(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let w = idx / 64;
        let b = idx % 64;
        (self.bits[w] >> b) & 1 == 1
    }

    /// Adds `idx`. Returns `true` if it was not already present.
    pub fn insert(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let w = idx / 64;
        let b = idx % 64;
        let was = (self.bits[w] >> b) & 1 == 1;
        self.bits[w] |= 1_u64 << b;
        !was
    }

    /// Removes `idx`. Returns `true` if it was present.
    pub fn remove(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let w = idx / 64;
        let b = idx % 64;
        let was = (self.bits[w] >> b) & 1 == 1;
        self.bits[w] &= !(1_u64 << b);
        was
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// In-place union. Returns `true` if `self` grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            let next = *a | *b;
            changed |= next != *a;
            *a = next;
        }
        changed
    }

    /// In-place difference (`self \ other`).
    pub fn subtract_with(&mut self, other: &Self) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a &= !*b;
        }
    }

    /// Returns `true` if every member of `self` is a member of `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        let mut theirs = other.bits.iter();
        self.bits
            .iter()
            .all(|&a| (a & !theirs.next().copied().unwrap_or(0)) == 0)
    }

    /// Iterates members in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            bits: &self.bits,
            word_idx: 0,
            word: self.bits.first().copied().unwrap_or(0),
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the members of a [`BitSet`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    bits: &'a [u64],
    word_idx: usize,
    word: u64,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.word != 0 {
                let tz = self.word.trailing_zeros() as usize;
                // Clear the lowest set bit.
                self.word &= self.word - 1;
                return Some(self.word_idx * 64 + tz);
            }
            self.word_idx += 1;
            self.word = *self.bits.get(self.word_idx)?;
        }
    }
}
