use std::env;
use std::sync::OnceLock;

/// A wrapper around the Rayon thread pool used to decode batches of messages.
///
/// If the pool could not be created, work runs directly on the calling
/// thread.
pub struct ThreadPool {
    /// The wrapped thread pool, or None if we failed to construct one.
    pool: Option<rayon::ThreadPool>,
}

impl ThreadPool {
    /// Run a function in the thread pool.
    ///
    /// This corresponds to [`rayon::ThreadPool::install`]. Parallel iterators
    /// used within `op` execute on this pool's threads.
    pub fn run<R: Send, Op: FnOnce() -> R + Send>(&self, op: Op) -> R {
        if let Some(pool) = self.pool.as_ref() {
            pool.install(op)
        } else {
            op()
        }
    }

    /// Create a thread pool with a given number of threads.
    pub fn with_num_threads(num_threads: usize) -> ThreadPool {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("protoscan-{}", index))
            .build();

        ThreadPool { pool: pool.ok() }
    }

    /// Return the number of threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map(|pool| pool.current_num_threads())
            .unwrap_or(1)
    }
}

/// Parse a thread count from the value of `PROTOSCAN_NUM_THREADS`.
///
/// Returns `None` if the value is not a number. Otherwise the count is clamped
/// to between 1 and the logical core count.
fn parse_thread_count(value: &str, logical_cpus: usize) -> Option<usize> {
    let requested: usize = value.trim().parse().ok()?;
    Some(requested.clamp(1, logical_cpus.max(1)))
}

/// Return the [Rayon][rayon] thread pool which is used to decode batches.
///
/// Decoding is CPU-bound, so by default the pool has one thread per physical
/// core. This can be overridden by setting the `PROTOSCAN_NUM_THREADS`
/// environment variable to a number between 1 and the logical core count. The
/// variable is read once, when the pool is first used.
///
/// [rayon]: https://github.com/rayon-rs/rayon
pub fn thread_pool() -> &'static ThreadPool {
    static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();
    THREAD_POOL.get_or_init(|| {
        let physical_cpus = num_cpus::get_physical().max(1);

        let num_threads = env::var("PROTOSCAN_NUM_THREADS")
            .ok()
            .and_then(|val| parse_thread_count(&val, num_cpus::get()))
            .unwrap_or(physical_cpus);

        tracing::debug!(num_threads, "creating decode thread pool");
        ThreadPool::with_num_threads(num_threads)
    })
}
