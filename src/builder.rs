//! Convenience constructors for assembling objective functions.
//!
//! Degenerate inputs collapse to a simpler term instead of failing: the sum of
//! one term is the term itself, the sum of none is zero.

use crate::error::Result;
use crate::term::{Inequality, Node, Term};

/// A constant term. `0.0` yields the lightweight [`Term::zero`] leaf.
pub fn constant(value: f64) -> Term {
    if value == 0.0 {
        Term::zero()
    } else {
        Term::constant(value)
    }
}

/// The zero leaf.
pub fn zero() -> Term {
    Term::zero()
}

/// `base ^ exponent`.
pub fn power(base: impl Into<Term>, exponent: i32) -> Term {
    Term::int_power(base, exponent)
}

/// Sum of any number of terms, flattened into a single n-ary node.
///
/// No terms gives zero; a single term is returned unchanged.
pub fn sum<I>(terms: I) -> Term
where
    I: IntoIterator,
    I::Item: Into<Term>,
{
    let mut terms: Vec<Term> = terms.into_iter().map(Into::into).collect();
    match terms.len() {
        0 => Term::zero(),
        1 => terms.swap_remove(0),
        _ => Term::from_node(Node::Sum(terms)),
    }
}

/// `e ^ arg`.
pub fn exp(arg: impl Into<Term>) -> Term {
    Term::exp(arg)
}

/// `ln(arg)`.
pub fn log(arg: impl Into<Term>) -> Term {
    Term::log(arg)
}

/// Piecewise term from `(condition, value)` pieces, evaluated left to right.
///
/// Fails on an empty list; there is no sensible value for it.
pub fn piecewise<I>(pieces: I) -> Result<Term>
where
    I: IntoIterator<Item = (Inequality, Term)>,
{
    Term::piecewise(pieces.into_iter().collect())
}
