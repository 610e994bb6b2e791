//! Arithmetic operators that build new term nodes.
//!
//! Operands are never simplified or merged: `x - y` becomes
//! `Sum(x, Product(-1, y))` and `x / y` becomes `Product(x, IntPower(y, -1))`.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::term::{Node, Term, Variable};

fn add_terms(left: Term, right: Term) -> Term {
    Term::from_node(Node::Sum(vec![left, right]))
}

fn sub_terms(left: Term, right: Term) -> Term {
    add_terms(left, negate(right))
}

fn mul_terms(left: Term, right: Term) -> Term {
    Term::product(left, right)
}

fn div_terms(left: Term, right: Term) -> Term {
    Term::product(left, Term::int_power(right, -1))
}

fn negate(term: Term) -> Term {
    Term::product(Term::constant(-1.0), term)
}

// ──────────────────────────────────────────────
//  Term-like left operands
// ──────────────────────────────────────────────

macro_rules! impl_term_ops {
    ($($lhs:ty),*) => {$(
        impl<R: Into<Term>> Add<R> for $lhs {
            type Output = Term;
            #[inline]
            fn add(self, rhs: R) -> Term {
                add_terms(self.into(), rhs.into())
            }
        }

        impl<R: Into<Term>> Sub<R> for $lhs {
            type Output = Term;
            #[inline]
            fn sub(self, rhs: R) -> Term {
                sub_terms(self.into(), rhs.into())
            }
        }

        impl<R: Into<Term>> Mul<R> for $lhs {
            type Output = Term;
            #[inline]
            fn mul(self, rhs: R) -> Term {
                mul_terms(self.into(), rhs.into())
            }
        }

        impl<R: Into<Term>> Div<R> for $lhs {
            type Output = Term;
            #[inline]
            fn div(self, rhs: R) -> Term {
                div_terms(self.into(), rhs.into())
            }
        }

        impl Neg for $lhs {
            type Output = Term;
            #[inline]
            fn neg(self) -> Term {
                negate(self.into())
            }
        }
    )*};
}

impl_term_ops!(Term, &Term, Variable, &Variable);

// ──────────────────────────────────────────────
//  f64 left operands
// ──────────────────────────────────────────────

macro_rules! impl_scalar_lhs_ops {
    ($($rhs:ty),*) => {$(
        impl Add<$rhs> for f64 {
            type Output = Term;
            #[inline]
            fn add(self, rhs: $rhs) -> Term {
                add_terms(self.into(), rhs.into())
            }
        }

        impl Sub<$rhs> for f64 {
            type Output = Term;
            #[inline]
            fn sub(self, rhs: $rhs) -> Term {
                sub_terms(self.into(), rhs.into())
            }
        }

        impl Mul<$rhs> for f64 {
            type Output = Term;
            #[inline]
            fn mul(self, rhs: $rhs) -> Term {
                mul_terms(self.into(), rhs.into())
            }
        }

        impl Div<$rhs> for f64 {
            type Output = Term;
            #[inline]
            fn div(self, rhs: $rhs) -> Term {
                div_terms(self.into(), rhs.into())
            }
        }
    )*};
}

impl_scalar_lhs_ops!(Term, &Term, Variable, &Variable);
