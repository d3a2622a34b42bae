//! Transient worker pools for the data-parallel kernels.
//!
//! Every kernel call receives a worker count, spins up a pool of exactly
//! that many threads, partitions its outermost loop into contiguous
//! static chunks, and joins the pool before returning. Nothing outlives
//! the call; a worker count of one gives a strictly serial kernel.

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Build a pool of exactly `workers` threads (at least one).
pub fn worker_pool(workers: usize) -> ThreadPool {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .expect("failed to spawn worker pool")
}

/// Contiguous chunk length that splits `n` outer iterations into at most
/// `workers` pieces.
pub fn chunk_len(n: usize, workers: usize) -> usize {
    n.div_ceil(workers.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_covers_all_iterations() {
        assert_eq!(chunk_len(10, 4), 3);
        assert_eq!(chunk_len(10, 1), 10);
        assert_eq!(chunk_len(0, 4), 1);
        assert_eq!(chunk_len(7, 0), 7);
    }

    #[test]
    fn pool_has_requested_width() {
        let pool = worker_pool(3);
        assert_eq!(pool.current_num_threads(), 3);
        assert_eq!(worker_pool(0).current_num_threads(), 1);
    }
}
