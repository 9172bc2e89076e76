//! Additively shared multiplication triples.

use crate::ring::Ring;

/// A party's additive shares of multiplication triples over a ring.
///
/// Row `i` holds the shares `(a_i, b_i, c_i)`; summed across both parties
/// the rows satisfy `a * b = c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triple<R: Ring> {
    ring: R,
    a: Vec<R::Element>,
    b: Vec<R::Element>,
    c: Vec<R::Element>,
}

impl<R: Ring> Triple<R> {
    /// Creates an empty share batch over `ring`.
    pub fn empty(ring: R) -> Self {
        Self {
            ring,
            a: Vec::new(),
            b: Vec::new(),
            c: Vec::new(),
        }
    }

    /// Creates a share batch from its columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns have different lengths.
    pub fn new(ring: R, a: Vec<R::Element>, b: Vec<R::Element>, c: Vec<R::Element>) -> Self {
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), c.len());
        Self { ring, a, b, c }
    }

    /// Returns the ring the shares live in.
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Returns the number of triples.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Returns the `a` shares.
    pub fn a(&self) -> &[R::Element] {
        &self.a
    }

    /// Returns the `b` shares.
    pub fn b(&self) -> &[R::Element] {
        &self.b
    }

    /// Returns the `c` shares.
    pub fn c(&self) -> &[R::Element] {
        &self.c
    }

    /// Appends another batch over the same ring.
    ///
    /// # Panics
    ///
    /// Panics if the rings differ.
    pub fn merge(&mut self, other: Self) {
        assert_eq!(self.ring, other.ring, "cannot merge shares across rings");
        self.a.extend(other.a);
        self.b.extend(other.b);
        self.c.extend(other.c);
    }

    /// Consumes the batch, returning its columns.
    pub fn into_columns(self) -> (Vec<R::Element>, Vec<R::Element>, Vec<R::Element>) {
        (self.a, self.b, self.c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Zl64;

    #[test]
    fn test_triple_merge() {
        let ring = Zl64::new(16);
        let mut acc = Triple::empty(ring);
        acc.merge(Triple::new(ring, vec![1], vec![2], vec![3]));
        acc.merge(Triple::new(ring, vec![4, 5], vec![6, 7], vec![8, 9]));

        assert_eq!(acc.len(), 3);
        assert_eq!(acc.a(), &[1, 4, 5]);
        assert_eq!(acc.c(), &[3, 8, 9]);
    }

    #[test]
    #[should_panic]
    fn test_triple_merge_ring_mismatch() {
        let mut acc = Triple::empty(Zl64::new(16));
        acc.merge(Triple::new(Zl64::new(8), vec![], vec![], vec![]));
    }
}
