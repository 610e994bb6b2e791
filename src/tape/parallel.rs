use rayon::prelude::*;

use crate::error::Result;
use crate::float::Float;

impl<F: Float> super::Tape<F> {
    /// Gradient and value at many points, evaluated in parallel.
    ///
    /// Takes `&self`: each rayon worker sweeps into its own
    /// [`TapeBuffers`](super::TapeBuffers), so the tape is only read.
    /// Results are in the order of `points`; if any point fails, one of the
    /// failures is returned.
    pub fn gradient_batch_par(&self, points: &[&[F]]) -> Result<Vec<(Vec<F>, F)>> {
        let n = self.num_inputs();
        points
            .par_iter()
            .map_init(
                || self.buffers(),
                |buffers, x| -> Result<(Vec<F>, F)> {
                    let value = self.forward_into(x, buffers)?;
                    self.reverse_into(buffers)?;
                    Ok((buffers.derivatives()[..n].to_vec(), value))
                },
            )
            .collect()
    }
}
