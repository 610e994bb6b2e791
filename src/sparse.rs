//! Sparse gradient vectors used by the direct differentiator.
//!
//! Entries are kept sorted by index, so `add` is a linear merge.

/// A vector storing only `(index, value)` pairs; absent indices are zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// The empty (all-zero) vector.
    pub fn new() -> Self {
        SparseVector {
            entries: Vec::new(),
        }
    }

    /// A vector with a single non-zero component.
    pub fn unit(index: usize, value: f64) -> Self {
        SparseVector {
            entries: vec![(index, value)],
        }
    }

    /// Stored `(index, value)` pairs in increasing index order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Component at `index` (zero if not stored).
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Merge-sum of two vectors, `O(k₁ + k₂)`.
    pub fn add(a: &SparseVector, b: &SparseVector) -> SparseVector {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }

        let (x, y) = (&a.entries, &b.entries);
        let mut entries = Vec::with_capacity(x.len() + y.len());
        let (mut i, mut j) = (0, 0);
        while i < x.len() && j < y.len() {
            let (xi, xv) = x[i];
            let (yj, yv) = y[j];
            if xi < yj {
                entries.push((xi, xv));
                i += 1;
            } else if yj < xi {
                entries.push((yj, yv));
                j += 1;
            } else {
                entries.push((xi, xv + yv));
                i += 1;
                j += 1;
            }
        }
        entries.extend_from_slice(&x[i..]);
        entries.extend_from_slice(&y[j..]);
        SparseVector { entries }
    }

    /// Every component multiplied by `factor`.
    pub fn scale(v: &SparseVector, factor: f64) -> SparseVector {
        SparseVector {
            entries: v.entries.iter().map(|&(i, x)| (i, x * factor)).collect(),
        }
    }

    /// Dense copy of length `len`. Indices `>= len` are dropped.
    pub fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut dense = vec![0.0; len];
        for &(i, v) in &self.entries {
            if i < len {
                dense[i] = v;
            }
        }
        dense
    }
}
