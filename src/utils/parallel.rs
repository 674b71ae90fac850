use log::{debug, error};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParallelError {
    #[error("Thread error: {0}")]
    ThreadError(String),

    #[error("Invalid thread count: {0}")]
    InvalidThreadCount(usize),
}

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            threads: num_cpus::get(),
        }
    }
}

impl ParallelConfig {
    /// A configuration with `requested` workers, capped at the CPU count.
    pub fn capped(requested: usize) -> Self {
        let cpus = num_cpus::get();
        if requested > cpus {
            debug!("Scaling {} workers down to {} CPUs", requested, cpus);
        }
        ParallelConfig {
            threads: requested.min(cpus),
        }
    }
}

/// Runs independent jobs on a dedicated thread pool.
pub struct ParallelExecutor {
    /// Thread pool
    pool: rayon::ThreadPool,

    /// Configuration
    config: ParallelConfig,
}

impl ParallelExecutor {
    /// Create a new parallel executor
    pub fn new(config: Option<ParallelConfig>) -> Result<Self, ParallelError> {
        let config = config.unwrap_or_default();
        if config.threads == 0 {
            return Err(ParallelError::InvalidThreadCount(0));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| {
                ParallelError::ThreadError(format!("Failed to build thread pool: {}", e))
            })?;

        Ok(ParallelExecutor { pool, config })
    }

    pub fn threads(&self) -> usize {
        self.config.threads
    }

    /// Runs `processor` on every item. A failing item does not stop the
    /// others; results come back in input order.
    pub fn execute<T, U, F, E>(&self, items: &[T], processor: F) -> Vec<Result<U, E>>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> Result<U, E> + Send + Sync,
        E: Send + std::fmt::Display,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = processor(item);
                    if let Err(e) = &result {
                        error!("Error during parallel processing: {}", e);
                    }
                    result
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_keeps_order_and_failures() {
        let executor = ParallelExecutor::new(Some(ParallelConfig { threads: 2 })).unwrap();
        let items: Vec<i32> = (0..10).collect();
        let results = executor.execute(&items, |&x| {
            if x == 3 {
                Err(format!("item {} failed", x))
            } else {
                Ok(x * 2)
            }
        });
        assert_eq!(results.len(), 10);
        assert_eq!(results[4].as_ref().unwrap(), &8);
        assert!(results[3].is_err());
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 9);
    }

    #[test]
    fn test_capped_config() {
        let config = ParallelConfig::capped(usize::MAX);
        assert_eq!(config.threads, num_cpus::get());
        assert!(ParallelExecutor::new(Some(ParallelConfig { threads: 0 })).is_err());
    }
}
