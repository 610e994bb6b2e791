//! Compile-once, evaluate-many differentiator.

use crate::error::{Error, Result};
use crate::float::Float;
use crate::tape::{Tape, TapeBuffers};
use crate::term::{Term, Variable};

/// A scalar function of a fixed list of variables that can be evaluated and
/// differentiated at arbitrary points.
///
/// This is the surface optimizers consume.
pub trait CompiledTerm<F: Float> {
    /// Number of variables.
    fn dimension(&self) -> usize;

    /// The variables, in input order.
    fn variables(&self) -> &[Variable];

    /// Function value at `point`.
    fn evaluate(&mut self, point: &[F]) -> Result<F>;

    /// `(gradient, value)` at `point`.
    fn differentiate(&mut self, point: &[F]) -> Result<(Vec<F>, F)>;
}

/// Reverse-mode differentiator over a tape compiled once at construction.
///
/// Calls take `&mut self` because the tape's value and adjoint arrays are
/// rewritten in place. To evaluate from several threads, either give each
/// worker its own instance (clone is cheap relative to compiling) or share one
/// instance by reference and use [`evaluate_into`](Self::evaluate_into) /
/// [`differentiate_into`](Self::differentiate_into) with per-worker
/// [`TapeBuffers`].
///
/// ```
/// use termdiff::{CompiledDifferentiator, Variable};
///
/// let x = Variable::new();
/// let y = Variable::new();
/// let f = &x * &x + 3.0 * &y;
/// let mut diff: CompiledDifferentiator = CompiledDifferentiator::new(&f, &[x, y]).unwrap();
///
/// let (grad, value) = diff.differentiate(&[2.0, 1.0]).unwrap();
/// assert_eq!(value, 7.0);
/// assert_eq!(grad, vec![4.0, 3.0]);
/// ```
#[derive(Clone, Debug)]
pub struct CompiledDifferentiator<F: Float = f64> {
    tape: Tape<F>,
    variables: Vec<Variable>,
}

impl<F: Float> CompiledDifferentiator<F> {
    /// Compile `function` against `variables`.
    ///
    /// Fails if `variables` is empty or lists a variable twice, if `function`
    /// uses a variable that is not listed, or if a constant cannot be
    /// represented in `F`.
    pub fn new(function: &Term, variables: &[Variable]) -> Result<Self> {
        if variables.is_empty() {
            return Err(Error::NoVariables);
        }
        let tape = Tape::compile(function, variables)?;
        Ok(CompiledDifferentiator {
            tape,
            variables: variables.to_vec(),
        })
    }

    /// Number of variables.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    /// The variables, in input order.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The compiled tape.
    #[inline]
    pub fn tape(&self) -> &Tape<F> {
        &self.tape
    }

    /// Function value at `point`.
    pub fn evaluate(&mut self, point: &[F]) -> Result<F> {
        self.tape.forward(point)
    }

    /// `(gradient, value)` at `point`.
    pub fn differentiate(&mut self, point: &[F]) -> Result<(Vec<F>, F)> {
        let mut gradient = Vec::with_capacity(self.dimension());
        let value = self.tape.gradient_with_buf(point, &mut gradient)?;
        Ok((gradient, value))
    }

    /// Like [`differentiate`](Self::differentiate) but writes the gradient
    /// into a caller-provided buffer, avoiding allocation on repeated calls.
    pub fn differentiate_with_buf(&mut self, point: &[F], gradient: &mut Vec<F>) -> Result<F> {
        self.tape.gradient_with_buf(point, gradient)
    }

    /// Scratch buffers for the `&self` entry points.
    pub fn buffers(&self) -> TapeBuffers<F> {
        self.tape.buffers()
    }

    /// Function value at `point`, sweeping into `buffers` instead of the tape.
    pub fn evaluate_into(&self, point: &[F], buffers: &mut TapeBuffers<F>) -> Result<F> {
        self.tape.forward_into(point, buffers)
    }

    /// Gradient and value at `point`, sweeping into `buffers` instead of the
    /// tape. The gradient is written into `gradient`.
    pub fn differentiate_into(
        &self,
        point: &[F],
        buffers: &mut TapeBuffers<F>,
        gradient: &mut Vec<F>,
    ) -> Result<F> {
        let value = self.tape.forward_into(point, buffers)?;
        self.tape.reverse_into(buffers)?;
        gradient.clear();
        gradient.extend_from_slice(&buffers.derivatives()[..self.dimension()]);
        Ok(value)
    }

    /// `(gradient, value)` at every point, computed in parallel with rayon.
    #[cfg(feature = "parallel")]
    pub fn differentiate_batch_par(&self, points: &[&[F]]) -> Result<Vec<(Vec<F>, F)>> {
        self.tape.gradient_batch_par(points)
    }
}

impl<F: Float> CompiledTerm<F> for CompiledDifferentiator<F> {
    fn dimension(&self) -> usize {
        CompiledDifferentiator::dimension(self)
    }

    fn variables(&self) -> &[Variable] {
        CompiledDifferentiator::variables(self)
    }

    fn evaluate(&mut self, point: &[F]) -> Result<F> {
        CompiledDifferentiator::evaluate(self, point)
    }

    fn differentiate(&mut self, point: &[F]) -> Result<(Vec<F>, F)> {
        CompiledDifferentiator::differentiate(self, point)
    }
}
