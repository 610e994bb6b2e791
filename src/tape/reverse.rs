use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode;

use super::{Tape, TapeBuffers};

impl<F: Float> Tape<F> {
    /// Reverse sweep over the values of the last [`forward`](Self::forward).
    ///
    /// Seeds the output adjoint with one and walks the tape backwards; each
    /// element's adjoint is the sum over all its consumers of
    /// `∂consumer/∂slot · adjoint(consumer)`. Overwrites `derivatives` in
    /// place.
    pub fn reverse(&mut self) -> Result<()> {
        let mut derivatives = std::mem::take(&mut self.derivatives);
        let result = self.reverse_sweep_core(&self.values, &self.faults, &mut derivatives);
        self.derivatives = derivatives;
        result
    }

    /// Reverse sweep over buffers filled by [`forward_into`](Self::forward_into).
    ///
    /// Fails if `buffers` were not sized for this tape.
    pub fn reverse_into(&self, buffers: &mut TapeBuffers<F>) -> Result<()> {
        let TapeBuffers {
            values,
            faults,
            derivatives,
        } = buffers;
        if values.len() != self.len() || faults.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        derivatives.resize(self.len(), F::zero());
        self.reverse_sweep_core(values, faults, derivatives)
    }

    /// Forward + reverse: gradient at `inputs`, written into `gradient`.
    ///
    /// Returns the output value. `gradient` is resized to the input count and
    /// reused across calls.
    pub fn gradient_with_buf(&mut self, inputs: &[F], gradient: &mut Vec<F>) -> Result<F> {
        let value = self.forward(inputs)?;
        self.reverse()?;
        gradient.clear();
        gradient.extend_from_slice(&self.derivatives[..self.num_inputs()]);
        Ok(value)
    }

    /// Core reverse loop shared by the in-place and buffered sweeps.
    ///
    /// Every consumer of element `i` has a larger index, so its adjoint is
    /// final by the time `i` is visited. Contributions are accumulated, never
    /// overwritten: a node with several consumers, or used twice by one
    /// consumer, receives the sum.
    ///
    /// Faulted consumers lie in unselected pieces and carry no adjoint, so
    /// they are skipped rather than multiplying zero by NaN.
    fn reverse_sweep_core(
        &self,
        values: &[F],
        faults: &[Option<u32>],
        derivatives: &mut [F],
    ) -> Result<()> {
        let out = self.output_index();
        if let Some(origin) = faults[out] {
            return Err(self.fault_error(origin as usize, values));
        }
        derivatives[out] = F::one();

        for i in (0..out).rev() {
            let mut adjoint = F::zero();
            for conn in self.input_of(i) {
                let c = conn.consumer as usize;
                if faults[c].is_some() {
                    continue;
                }
                let partial = opcode::local_partial(
                    self.opcodes[c],
                    self.operands(c),
                    values,
                    self.exponents[c],
                    values[c],
                    conn.arg_position as usize,
                )?;
                adjoint = adjoint + partial * derivatives[c];
            }
            derivatives[i] = adjoint;
        }
        Ok(())
    }
}
