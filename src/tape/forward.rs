use crate::error::{Error, Result};
use crate::float::Float;
use crate::opcode::{self, OpCode};

use super::{Tape, TapeBuffers};

impl<F: Float> Tape<F> {
    /// Re-evaluate the tape at new inputs (forward sweep).
    ///
    /// Overwrites `values` in place without allocating. Returns the output value.
    pub fn forward(&mut self, inputs: &[F]) -> Result<F> {
        let mut values = std::mem::take(&mut self.values);
        let mut faults = std::mem::take(&mut self.faults);
        let result = self.forward_sweep_core(inputs, &mut values, &mut faults);
        self.values = values;
        self.faults = faults;
        result
    }

    /// Forward sweep into caller-owned buffers; the tape itself is untouched.
    ///
    /// This lets one tape be evaluated at different inputs concurrently, one
    /// [`TapeBuffers`] per thread. Constants are reloaded from the tape on
    /// every call, so buffers obtained from another tape are safe to pass.
    pub fn forward_into(&self, inputs: &[F], buffers: &mut TapeBuffers<F>) -> Result<F> {
        if buffers.values.len() != self.len() || buffers.faults.len() != self.len() {
            *buffers = self.buffers();
        } else {
            for (i, &op) in self.opcodes.iter().enumerate() {
                if op == OpCode::Const {
                    buffers.values[i] = self.values[i];
                }
            }
        }
        let TapeBuffers { values, faults, .. } = buffers;
        self.forward_sweep_core(inputs, values, faults)
    }

    /// Core forward loop shared by the in-place and buffered sweeps.
    ///
    /// `values` must already hold the constants (they are never rewritten).
    /// A failing element is recorded in `faults` instead of aborting the
    /// sweep; the error is raised only if it reaches the output.
    fn forward_sweep_core(
        &self,
        inputs: &[F],
        values: &mut [F],
        faults: &mut [Option<u32>],
    ) -> Result<F> {
        self.check_inputs(inputs)?;

        values[..inputs.len()].copy_from_slice(inputs);

        for i in self.num_inputs()..self.len() {
            let op = self.opcodes[i];
            if op.is_leaf() {
                continue;
            }
            let operands = self.operands(i);
            let inherited = match op {
                OpCode::Piecewise => piecewise_fault(operands, values, faults),
                _ => operands.iter().find_map(|&j| faults[j as usize]),
            };
            if inherited.is_some() {
                faults[i] = inherited;
                values[i] = F::nan();
                continue;
            }
            match opcode::eval_forward(op, operands, values, self.exponents[i]) {
                Ok(v) => {
                    values[i] = v;
                    faults[i] = None;
                }
                Err(_) => {
                    values[i] = F::nan();
                    faults[i] = Some(i as u32);
                }
            }
        }

        let out = self.output_index();
        match faults[out] {
            None => Ok(values[out]),
            Some(origin) => Err(self.fault_error(origin as usize, values)),
        }
    }

    /// Re-run the failing element to recover its error. Its operands are
    /// clean, so the values it saw are still in place.
    pub(super) fn fault_error(&self, origin: usize, values: &[F]) -> Error {
        match opcode::eval_forward(
            self.opcodes[origin],
            self.operands(origin),
            values,
            self.exponents[origin],
        ) {
            Err(e) => e,
            Ok(_) => Error::InvalidTerm("faulted element evaluated cleanly"),
        }
    }

    pub(super) fn check_inputs(&self, inputs: &[F]) -> Result<()> {
        if inputs.len() != self.num_inputs() {
            return Err(Error::DimensionMismatch {
                expected: self.num_inputs(),
                actual: inputs.len(),
            });
        }
        Ok(())
    }
}

/// Fault of a piecewise element: the first faulted condition examined before
/// a piece is selected, else the fault of the selected value. `None` when no
/// piece holds; the element's own evaluation then reports that.
fn piecewise_fault<F: Float>(
    operands: &[u32],
    values: &[F],
    faults: &[Option<u32>],
) -> Option<u32> {
    for pair in operands.chunks_exact(2) {
        let (cond, value) = (pair[0] as usize, pair[1] as usize);
        if faults[cond].is_some() {
            return faults[cond];
        }
        if values[cond] <= F::zero() {
            return faults[value];
        }
    }
    None
}
