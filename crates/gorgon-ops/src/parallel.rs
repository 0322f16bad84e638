//! Row iteration, parallel with Rayon when the `parallel` feature is on.
//!
//! The converter and the resampler work on independent rows; this module
//! is the single place that decides how those rows are scheduled.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for the first `rows` chunks of `row_len` items.
///
/// The last chunk may be shorter than `row_len` when `data` ends early.
pub(crate) fn for_each_row<T, F>(data: &mut [T], row_len: usize, rows: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 || rows == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(row_len)
        .take(rows)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    data.chunks_mut(row_len)
        .take(rows)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Number of worker threads rows are spread over.
pub fn current_num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}
