//! Operation codes for the compiled tape.
//!
//! Each tape element carries one opcode. [`eval_forward`] computes an
//! element's value from its operands; [`local_partial`] gives the derivative
//! of an element with respect to one of its operand slots.

use num_traits::Float;

use crate::error::{Error, Result};

/// Elementary operations on the tape.
///
/// Operand layout per opcode:
/// - `Input`, `Const`: no operands.
/// - `Powi`, `Ln`, `Exp`: one operand. The `Powi` exponent is stored beside
///   the operands, not as one.
/// - `Mul`: `[left, right]`.
/// - `Sum`: one operand per summand, in order.
/// - `Piecewise`: `[cond_0, value_0, cond_1, value_1, ...]`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Input variable (leaf).
    Input,
    /// Constant (leaf). `Zero` terms compile to a `Const` holding zero.
    Const,
    /// Integer power.
    Powi,
    Mul,
    Sum,
    Ln,
    Exp,
    Piecewise,
}

impl OpCode {
    /// `true` for leaves, whose values are never recomputed by a sweep.
    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(self, OpCode::Input | OpCode::Const)
    }
}

/// Evaluate one non-leaf element.
///
/// `operands` are tape indices into `values`; every operand must already hold
/// its value for this point. Leaves (`Input`, `Const`) are rejected.
#[inline]
pub fn eval_forward<T: Float>(
    op: OpCode,
    operands: &[u32],
    values: &[T],
    exponent: i32,
) -> Result<T> {
    let arg = |k: usize| values[operands[k] as usize];
    match op {
        OpCode::Input | OpCode::Const => Err(Error::NotSupported(
            "leaf elements hold their value and are not evaluated",
        )),
        OpCode::Powi => Ok(arg(0).powi(exponent)),
        OpCode::Mul => Ok(arg(0) * arg(1)),
        OpCode::Sum => Ok(operands
            .iter()
            .fold(T::zero(), |acc, &j| acc + values[j as usize])),
        OpCode::Ln => checked_ln(arg(0)),
        OpCode::Exp => Ok(arg(0).exp()),
        OpCode::Piecewise => {
            let k = selected_piece(operands, values)?;
            Ok(values[operands[2 * k + 1] as usize])
        }
    }
}

/// Derivative of an element with respect to its operand in slot `arg_position`.
///
/// `result` is the element's own forward value.
#[inline]
pub fn local_partial<T: Float>(
    op: OpCode,
    operands: &[u32],
    values: &[T],
    exponent: i32,
    result: T,
    arg_position: usize,
) -> Result<T> {
    let arg = |k: usize| values[operands[k] as usize];
    match op {
        OpCode::Input | OpCode::Const => Ok(T::zero()),
        OpCode::Powi => {
            // d/da a^n = n * a^(n-1)
            if exponent == 0 {
                return Ok(T::zero());
            }
            let n = T::from(exponent).unwrap_or_else(T::nan);
            Ok(n * arg(0).powi(exponent - 1))
        }
        // The other factor; for `s * s` both slots contribute, giving 2s.
        OpCode::Mul => Ok(arg(1 - arg_position)),
        OpCode::Sum => Ok(T::one()),
        OpCode::Ln => {
            let a = arg(0);
            if a > T::zero() {
                Ok(a.recip())
            } else {
                Err(non_positive_log(a))
            }
        }
        OpCode::Exp => Ok(result),
        OpCode::Piecewise => {
            let k = selected_piece(operands, values)?;
            if arg_position == 2 * k + 1 {
                Ok(T::one())
            } else {
                Ok(T::zero())
            }
        }
    }
}

/// Index of the first piece whose condition value is `<= 0`.
#[inline]
pub fn selected_piece<T: Float>(operands: &[u32], values: &[T]) -> Result<usize> {
    operands
        .chunks_exact(2)
        .position(|pair| values[pair[0] as usize] <= T::zero())
        .ok_or(Error::NoPieceSatisfied)
}

#[inline]
fn checked_ln<T: Float>(a: T) -> Result<T> {
    if a > T::zero() {
        Ok(a.ln())
    } else {
        Err(non_positive_log(a))
    }
}

#[cold]
fn non_positive_log<T: Float>(a: T) -> Error {
    Error::NonPositiveLogarithmArgument(a.to_f64().unwrap_or(f64::NAN))
}
