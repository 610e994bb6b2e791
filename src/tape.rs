//! Compiled tape (Wengert list) for repeated evaluation and reverse-mode
//! differentiation of one term.
//!
//! The tape is a struct of arrays indexed by tape position. Positions
//! `0..num_inputs` are the input variables in the order they were given;
//! every element's operands sit at strictly smaller positions; the last
//! element is the output. Each term node maps to exactly one position, no
//! matter how many parents reference it.
//!
//! Topology is fixed at compile time. Sweeps only overwrite the `values`,
//! `faults` and `derivatives` arrays, so a tape is single-writer: use
//! [`TapeBuffers`] with the `_into` methods to evaluate one tape from several
//! threads.
//!
//! A forward sweep never stops at the first failing element. The element is
//! marked faulted (value NaN) and the mark flows to its consumers, except
//! that a `Piecewise` element only inherits faults from the conditions it
//! examines and the piece it selects. The sweep fails only if the output is
//! faulted, so an undefined value in an unselected piece is harmless.

use crate::float::Float;
use crate::opcode::OpCode;

// Submodules: each adds impl blocks to Tape<F>
mod compile;
mod forward;
mod reverse;

#[cfg(feature = "parallel")]
mod parallel;

/// One use of a tape element as an operand of a later element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Tape index of the consuming element.
    pub consumer: u32,
    /// Which operand slot of the consumer this element fills.
    pub arg_position: u32,
}

/// A compiled, topologically ordered tape.
#[derive(Clone, Debug)]
pub struct Tape<F: Float> {
    pub(crate) opcodes: Vec<OpCode>,
    /// Operands of element `i` are `args[arg_offsets[i]..arg_offsets[i + 1]]`.
    pub(crate) arg_offsets: Vec<u32>,
    pub(crate) args: Vec<u32>,
    /// `Powi` exponent per element (zero for every other opcode).
    pub(crate) exponents: Vec<i32>,
    /// Consumers of element `i` are `input_of[input_of_offsets[i]..input_of_offsets[i + 1]]`.
    pub(crate) input_of_offsets: Vec<u32>,
    pub(crate) input_of: Vec<Connection>,
    pub(crate) values: Vec<F>,
    /// Tape index of the element whose evaluation failed, if element `i`
    /// depends on one through selected pieces.
    pub(crate) faults: Vec<Option<u32>>,
    pub(crate) derivatives: Vec<F>,
    pub(crate) num_inputs: u32,
}

/// Caller-owned scratch space for sweeping a shared tape.
///
/// Obtain one per worker with [`Tape::buffers`].
#[derive(Clone, Debug)]
pub struct TapeBuffers<F> {
    pub(crate) values: Vec<F>,
    pub(crate) faults: Vec<Option<u32>>,
    pub(crate) derivatives: Vec<F>,
}

impl<F: Float> TapeBuffers<F> {
    /// Forward values from the last sweep into these buffers.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Adjoints from the last reverse sweep into these buffers.
    pub fn derivatives(&self) -> &[F] {
        &self.derivatives
    }
}

impl<F: Float> Tape<F> {
    /// Number of tape elements (inputs, constants and operations).
    #[inline]
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// `true` if the tape has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Number of input variables.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs as usize
    }

    /// Index of the output element (the last one).
    #[inline]
    pub fn output_index(&self) -> usize {
        self.opcodes.len() - 1
    }

    /// Output value from the last forward sweep.
    #[inline]
    pub fn output_value(&self) -> F {
        self.values[self.output_index()]
    }

    #[inline]
    pub fn opcode(&self, i: usize) -> OpCode {
        self.opcodes[i]
    }

    /// Operand tape indices of element `i`, in argument-position order.
    #[inline]
    pub fn operands(&self, i: usize) -> &[u32] {
        &self.args[self.arg_offsets[i] as usize..self.arg_offsets[i + 1] as usize]
    }

    /// `Powi` exponent of element `i` (zero for other opcodes).
    #[inline]
    pub fn exponent(&self, i: usize) -> i32 {
        self.exponents[i]
    }

    /// Every place element `i` is used as an operand.
    #[inline]
    pub fn input_of(&self, i: usize) -> &[Connection] {
        &self.input_of[self.input_of_offsets[i] as usize..self.input_of_offsets[i + 1] as usize]
    }

    /// Forward values from the last in-place sweep.
    #[inline]
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Adjoints from the last in-place reverse sweep.
    #[inline]
    pub fn derivatives(&self) -> &[F] {
        &self.derivatives
    }

    /// Fresh scratch buffers sized for this tape, with constants preloaded.
    pub fn buffers(&self) -> TapeBuffers<F> {
        TapeBuffers {
            values: self.values.clone(),
            faults: vec![None; self.len()],
            derivatives: vec![F::zero(); self.len()],
        }
    }

    /// `true` if element `i` was faulted by the last in-place sweep.
    #[inline]
    pub fn is_faulted(&self, i: usize) -> bool {
        self.faults[i].is_some()
    }
}
