use thiserror::Error;

/// Errors raised while building, evaluating or differentiating terms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A variable reached during evaluation has no value bound to it.
    #[error("a variable has no value")]
    MissingVariableValue,

    /// The compiled function references a variable that is not in the
    /// variable list it was compiled against.
    #[error("term references a variable outside the variable list (at tape index {index})")]
    UnboundVariable { index: usize },

    /// The same variable appears twice in a variable list.
    #[error("variable listed twice (positions {first} and {second})")]
    DuplicateVariable { first: usize, second: usize },

    /// An empty variable list was supplied.
    #[error("at least one variable is required")]
    NoVariables,

    /// Input length does not match the number of variables.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `Log` applied to a non-positive (or NaN) value.
    #[error("logarithm has non-positive argument {0}")]
    NonPositiveLogarithmArgument(f64),

    /// No condition of a piecewise term holds.
    #[error("no piece of the piecewise term is satisfied")]
    NoPieceSatisfied,

    /// The requested operation is not available for this term kind.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// A structural invariant of a term constructor was violated.
    #[error("invalid term: {0}")]
    InvalidTerm(&'static str),

    /// The graph has more nodes than a tape can index.
    #[error("graph too large to compile ({0} nodes)")]
    GraphTooLarge(usize),

    /// A constant cannot be represented in the tape's float type.
    #[error("constant {0} is not representable in the tape float type")]
    UnrepresentableConstant(f64),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
