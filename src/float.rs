use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FromPrimitive};

/// Marker trait for the floating-point types a compiled tape can run in
/// (`f32`, `f64`).
///
/// Terms always store `f64` constants; they are converted into `F` once,
/// when the tape is compiled.
pub trait Float:
    NumFloat + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}
