//! Direct (uncompiled) gradient computation.
//!
//! Walks the term tree once, combining sparse child gradients with the local
//! chain-rule factor of each node. Node values are memoized per node identity
//! in an [`EvaluationCache`], so shared sub-terms are valued once no matter
//! how many parents reference them.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::evaluator::{bind, checked_ln};
use crate::sparse::SparseVector;
use crate::term::{Inequality, Node, NodeId, Term, Variable};

/// Lazily computed value of every node reachable from a root, keyed by node
/// identity.
///
/// Unlike [`evaluate`](crate::evaluate) this supports piecewise terms: only
/// the conditions up to the first satisfied one, and that piece's value, are
/// computed.
pub struct EvaluationCache<'a> {
    values: &'a HashMap<Variable, f64>,
    memo: HashMap<NodeId, f64>,
}

impl<'a> EvaluationCache<'a> {
    pub fn new(values: &'a HashMap<Variable, f64>) -> Self {
        EvaluationCache {
            values,
            memo: HashMap::new(),
        }
    }

    /// Value of `term`, computed once per node.
    ///
    /// The cache is keyed by node identity, so `term` and everything it
    /// reaches must outlive the cache; borrowing the root for the cache's
    /// lifetime guarantees that.
    pub fn value(&mut self, term: &Term) -> Result<f64> {
        if let Some(&v) = self.memo.get(&term.id()) {
            return Ok(v);
        }

        let v = match term.node() {
            Node::Constant(v) => *v,
            Node::Zero => 0.0,
            Node::Variable(_) => self
                .values
                .get(&term.id())
                .copied()
                .ok_or(Error::MissingVariableValue)?,
            Node::IntPower { base, exponent } => self.value(base)?.powi(*exponent),
            Node::Product { left, right } => self.value(left)? * self.value(right)?,
            Node::Sum(terms) => {
                let mut total = 0.0;
                for t in terms {
                    total += self.value(t)?;
                }
                total
            }
            Node::Log(arg) => checked_ln(self.value(arg)?)?,
            Node::Exp(arg) => self.value(arg)?.exp(),
            Node::Piecewise(pieces) => {
                let k = self.selected_piece(pieces)?;
                self.value(&pieces[k].1)?
            }
        };

        self.memo.insert(term.id(), v);
        Ok(v)
    }

    /// Index of the first piece whose condition holds.
    pub fn selected_piece(&mut self, pieces: &[(Inequality, Term)]) -> Result<usize> {
        for (k, (cond, _)) in pieces.iter().enumerate() {
            if Inequality::holds(self.value(cond.term())?) {
                return Ok(k);
            }
        }
        Err(Error::NoPieceSatisfied)
    }

    /// Number of memoized nodes.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }
}

/// Gradient of `term` with respect to `variables`, at `values[i]` for
/// `variables[i]`.
///
/// Fails on mismatched lengths, duplicate variables, a variable in the term
/// that is not listed, a non-positive `Log` argument, or a piecewise term with
/// no satisfied piece. Piece boundaries are not treated specially: the
/// gradient is that of the selected piece.
///
/// ```
/// use termdiff::{differentiate, Variable};
///
/// let x = Variable::new();
/// let y = Variable::new();
/// let f = &x * &y;
/// let g = differentiate(&f, &[x, y], &[3.0, -4.0]).unwrap();
/// assert_eq!(g, vec![-4.0, 3.0]);
/// ```
pub fn differentiate(term: &Term, variables: &[Variable], values: &[f64]) -> Result<Vec<f64>> {
    let bound = bind(variables, values)?;
    let index_of: HashMap<NodeId, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id(), i))
        .collect();

    let mut diff = DirectDifferentiator {
        index_of: &index_of,
        cache: EvaluationCache::new(&bound),
    };
    let gradient = diff.gradient(term)?;
    Ok(gradient.to_dense(variables.len()))
}

/// Like [`differentiate`] with `(variable, value)` pairs.
pub fn differentiate_pairs(term: &Term, pairs: &[(Variable, f64)]) -> Result<Vec<f64>> {
    let (variables, values): (Vec<Variable>, Vec<f64>) = pairs.iter().cloned().unzip();
    differentiate(term, &variables, &values)
}

struct DirectDifferentiator<'a> {
    index_of: &'a HashMap<NodeId, usize>,
    cache: EvaluationCache<'a>,
}

impl DirectDifferentiator<'_> {
    fn gradient(&mut self, term: &Term) -> Result<SparseVector> {
        match term.node() {
            Node::Constant(_) | Node::Zero => Ok(SparseVector::new()),
            Node::Variable(_) => {
                let index = self
                    .index_of
                    .get(&term.id())
                    .copied()
                    .ok_or(Error::MissingVariableValue)?;
                Ok(SparseVector::unit(index, 1.0))
            }
            Node::IntPower { base, exponent } => {
                // n·f^(n-1)·∇f
                let n = *exponent;
                if n == 0 {
                    return Ok(SparseVector::new());
                }
                let base_value = self.cache.value(base)?;
                let base_grad = self.gradient(base)?;
                let factor = f64::from(n) * base_value.powi(n - 1);
                Ok(SparseVector::scale(&base_grad, factor))
            }
            Node::Product { left, right } => {
                // g·∇f + f·∇g
                let left_grad = self.gradient(left)?;
                let right_grad = self.gradient(right)?;
                let left_value = self.cache.value(left)?;
                let right_value = self.cache.value(right)?;
                Ok(SparseVector::add(
                    &SparseVector::scale(&left_grad, right_value),
                    &SparseVector::scale(&right_grad, left_value),
                ))
            }
            Node::Sum(terms) => {
                let mut total = SparseVector::new();
                for t in terms {
                    let grad = self.gradient(t)?;
                    total = SparseVector::add(&total, &grad);
                }
                Ok(total)
            }
            Node::Log(arg) => {
                let arg_value = self.cache.value(arg)?;
                if arg_value <= 0.0 || arg_value.is_nan() {
                    return Err(Error::NonPositiveLogarithmArgument(arg_value));
                }
                let arg_grad = self.gradient(arg)?;
                Ok(SparseVector::scale(&arg_grad, 1.0 / arg_value))
            }
            Node::Exp(arg) => {
                let value = self.cache.value(term)?;
                let arg_grad = self.gradient(arg)?;
                Ok(SparseVector::scale(&arg_grad, value))
            }
            Node::Piecewise(pieces) => {
                let k = self.cache.selected_piece(pieces)?;
                self.gradient(&pieces[k].1)
            }
        }
    }
}
