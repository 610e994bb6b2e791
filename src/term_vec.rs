//! Column vectors of terms, for geometric objectives over points.

use std::ops::{Add, Index, Mul, Neg, Sub};

use crate::builder;
use crate::error::{Error, Result};
use crate::term::Term;

/// A non-empty column vector whose components are terms.
#[derive(Clone, Debug)]
pub struct TermVec {
    terms: Vec<Term>,
}

impl TermVec {
    /// Build a vector from its components. Fails if there are none.
    pub fn new<I>(terms: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let terms: Vec<Term> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(Error::InvalidTerm("a term vector needs at least one component"));
        }
        Ok(TermVec { terms })
    }

    /// Three-component vector.
    pub fn xyz(x: impl Into<Term>, y: impl Into<Term>, z: impl Into<Term>) -> Self {
        TermVec {
            terms: vec![x.into(), y.into(), z.into()],
        }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    pub fn get(&self, index: usize) -> Option<&Term> {
        self.terms.get(index)
    }

    pub fn x(&self) -> &Term {
        &self.terms[0]
    }

    /// Panics if the vector has fewer than two components.
    pub fn y(&self) -> &Term {
        &self.terms[1]
    }

    /// Panics if the vector has fewer than three components.
    pub fn z(&self) -> &Term {
        &self.terms[2]
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// `Σ tᵢ²` as a single sum of squares.
    pub fn norm_squared(&self) -> Term {
        builder::sum(self.terms.iter().map(|t| builder::power(t, 2)))
    }

    /// `Σ aᵢ·bᵢ`.
    pub fn inner_product(&self, other: &TermVec) -> Result<Term> {
        self.check_dimension(other)?;
        Ok(self.dot(other))
    }

    fn dot(&self, other: &TermVec) -> Term {
        builder::sum(
            self.terms
                .iter()
                .zip(other.terms.iter())
                .map(|(a, b)| a * b),
        )
    }

    /// 3D cross product `self × other`.
    pub fn cross_product(&self, other: &TermVec) -> Result<TermVec> {
        if self.dimension() != 3 || other.dimension() != 3 {
            return Err(Error::DimensionMismatch {
                expected: 3,
                actual: if self.dimension() != 3 {
                    self.dimension()
                } else {
                    other.dimension()
                },
            });
        }
        let (a, b) = (self, other);
        Ok(TermVec::xyz(
            a.y() * b.z() - a.z() * b.y(),
            a.z() * b.x() - a.x() * b.z(),
            a.x() * b.y() - a.y() * b.x(),
        ))
    }

    /// Multiply every component by `scalar` (the scalar node is shared).
    pub fn scale(&self, scalar: impl Into<Term>) -> TermVec {
        let scalar = scalar.into();
        self.map(|t| &scalar * t)
    }

    /// Component-wise sum.
    pub fn try_add(&self, other: &TermVec) -> Result<TermVec> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Component-wise difference.
    pub fn try_sub(&self, other: &TermVec) -> Result<TermVec> {
        self.zip_with(other, |a, b| a - b)
    }

    fn map(&self, f: impl Fn(&Term) -> Term) -> TermVec {
        TermVec {
            terms: self.terms.iter().map(f).collect(),
        }
    }

    fn zip_with(&self, other: &TermVec, f: impl Fn(&Term, &Term) -> Term) -> Result<TermVec> {
        self.check_dimension(other)?;
        Ok(self.zip_unchecked(other, f))
    }

    fn zip_unchecked(&self, other: &TermVec, f: impl Fn(&Term, &Term) -> Term) -> TermVec {
        TermVec {
            terms: self
                .terms
                .iter()
                .zip(other.terms.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    fn check_dimension(&self, other: &TermVec) -> Result<()> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }
        Ok(())
    }
}

impl Index<usize> for TermVec {
    type Output = Term;

    fn index(&self, index: usize) -> &Term {
        &self.terms[index]
    }
}

// Operator forms panic on a dimension mismatch, like slice indexing; use the
// `try_*` / `inner_product` methods to get an error instead.

impl Add for &TermVec {
    type Output = TermVec;
    fn add(self, rhs: &TermVec) -> TermVec {
        assert_eq!(self.dimension(), rhs.dimension(), "dimension mismatch");
        self.zip_unchecked(rhs, |a, b| a + b)
    }
}

impl Sub for &TermVec {
    type Output = TermVec;
    fn sub(self, rhs: &TermVec) -> TermVec {
        assert_eq!(self.dimension(), rhs.dimension(), "dimension mismatch");
        self.zip_unchecked(rhs, |a, b| a - b)
    }
}

impl Neg for &TermVec {
    type Output = TermVec;
    fn neg(self) -> TermVec {
        self.map(|t| -t)
    }
}

/// Inner product.
impl Mul for &TermVec {
    type Output = Term;
    fn mul(self, rhs: &TermVec) -> Term {
        assert_eq!(self.dimension(), rhs.dimension(), "dimension mismatch");
        self.dot(rhs)
    }
}

/// Scaling by a term.
impl Mul<&Term> for &TermVec {
    type Output = TermVec;
    fn mul(self, rhs: &Term) -> TermVec {
        self.scale(rhs)
    }
}
