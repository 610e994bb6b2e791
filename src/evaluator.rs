//! Direct tree-walking evaluation.
//!
//! Meant for terms that are evaluated once. Shared sub-terms are evaluated
//! once per reference; compile the term with
//! [`CompiledDifferentiator`](crate::CompiledDifferentiator) when it is
//! evaluated repeatedly.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::term::{Node, Term, Variable};

/// Evaluate `term` with the given variable values.
///
/// Fails with [`Error::MissingVariableValue`] if a variable in the term has
/// no value, with [`Error::NonPositiveLogarithmArgument`] if a `Log` argument
/// is not positive, and with [`Error::NotSupported`] on piecewise terms.
///
/// ```
/// use std::collections::HashMap;
/// use termdiff::{evaluate, Variable};
///
/// let x = Variable::new();
/// let f = 3.0 * &x + 1.0;
/// let values = HashMap::from([(x, 2.0)]);
/// assert_eq!(evaluate(&f, &values).unwrap(), 7.0);
/// ```
pub fn evaluate(term: &Term, values: &HashMap<Variable, f64>) -> Result<f64> {
    match term.node() {
        Node::Constant(v) => Ok(*v),
        Node::Zero => Ok(0.0),
        Node::Variable(_) => values
            .get(&term.id())
            .copied()
            .ok_or(Error::MissingVariableValue),
        Node::IntPower { base, exponent } => Ok(evaluate(base, values)?.powi(*exponent)),
        Node::Product { left, right } => Ok(evaluate(left, values)? * evaluate(right, values)?),
        Node::Sum(terms) => {
            let mut total = 0.0;
            for t in terms {
                total += evaluate(t, values)?;
            }
            Ok(total)
        }
        Node::Log(arg) => checked_ln(evaluate(arg, values)?),
        Node::Exp(arg) => Ok(evaluate(arg, values)?.exp()),
        Node::Piecewise(_) => Err(Error::NotSupported(
            "piecewise terms need the differentiator or a compiled tape",
        )),
    }
}

/// Evaluate `term` at `values[i]` for `variables[i]`.
pub fn evaluate_at(term: &Term, variables: &[Variable], values: &[f64]) -> Result<f64> {
    evaluate(term, &bind(variables, values)?)
}

/// Build a variable → value map from parallel slices.
pub(crate) fn bind(variables: &[Variable], values: &[f64]) -> Result<HashMap<Variable, f64>> {
    if variables.len() != values.len() {
        return Err(Error::DimensionMismatch {
            expected: variables.len(),
            actual: values.len(),
        });
    }
    let mut map = HashMap::with_capacity(variables.len());
    for (i, (var, &value)) in variables.iter().zip(values.iter()).enumerate() {
        if map.insert(var.clone(), value).is_some() {
            let first = variables[..i].iter().position(|v| v == var).unwrap_or(i);
            return Err(Error::DuplicateVariable { first, second: i });
        }
    }
    Ok(map)
}

/// `ln(a)`, rejecting non-positive and NaN arguments.
#[inline]
pub(crate) fn checked_ln(a: f64) -> Result<f64> {
    if a > 0.0 {
        Ok(a.ln())
    } else {
        Err(Error::NonPositiveLogarithmArgument(a))
    }
}
