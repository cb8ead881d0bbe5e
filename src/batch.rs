// Batch mapping strategy: sequential for small batches, a fixed worker
// pool above a size threshold. Injected into the engine instead of being a
// global so callers control the parallelism degree.

use anyhow::{Context, Result};
use rayon::prelude::*;

/// Maps a function over a batch of records, order-preserving.
///
/// Batches below `threshold` run sequentially; parallel dispatch costs more
/// than it buys there. At or above it, work is spread over a dedicated
/// rayon pool with a caller-fixed number of workers.
pub struct BatchMapper {
    threshold: usize,
    pool: rayon::ThreadPool,
}

impl BatchMapper {
    /// `jobs = None` sizes the pool to the machine.
    pub fn new(threshold: usize, jobs: Option<usize>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.unwrap_or(0))
            .build()
            .context("Failed to build worker pool")?;
        Ok(BatchMapper { threshold, pool })
    }

    pub fn map<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        if items.len() >= self.threshold {
            self.pool.install(|| items.par_iter().map(|item| f(item)).collect())
        } else {
            items.iter().map(|item| f(item)).collect()
        }
    }

    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync + Send,
    {
        if items.len() >= self.threshold {
            self.pool.install(|| items.par_iter_mut().for_each(|item| f(item)));
        } else {
            items.iter_mut().for_each(|item| f(item));
        }
    }
}
