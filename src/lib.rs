//! Automatic differentiation of scalar expression graphs.
//!
//! Build a [`Term`] graph from [`Variable`]s, constants and the operators in
//! [`ops`] / [`builder`], then either
//!
//! - evaluate or differentiate it once with [`evaluate`] / [`differentiate`]
//!   (tree walk, no setup cost), or
//! - compile it into a [`CompiledDifferentiator`] and call
//!   [`evaluate`](CompiledDifferentiator::evaluate) /
//!   [`differentiate`](CompiledDifferentiator::differentiate) at many points
//!   (one forward and one reverse sweep over a flat tape per call).
//!
//! Both paths compute the same gradients; shared sub-terms contribute once per
//! use.

pub mod builder;
pub mod compiled;
pub mod differentiator;
pub mod error;
pub mod evaluator;
pub mod float;
pub mod opcode;
pub mod ops;
pub mod sparse;
pub mod tape;
pub mod term;
pub mod term_vec;

pub use compiled::{CompiledDifferentiator, CompiledTerm};
pub use differentiator::{differentiate, differentiate_pairs, EvaluationCache};
pub use error::{Error, Result};
pub use evaluator::{evaluate, evaluate_at};
pub use float::Float;
pub use sparse::SparseVector;
pub use tape::{Connection, Tape, TapeBuffers};
pub use term::{Inequality, Node, NodeId, Term, Variable};
pub use term_vec::TermVec;

/// Compiled differentiator over `f64`.
pub type CompiledDifferentiator64 = CompiledDifferentiator<f64>;
/// Compiled differentiator over `f32`.
pub type CompiledDifferentiator32 = CompiledDifferentiator<f32>;
