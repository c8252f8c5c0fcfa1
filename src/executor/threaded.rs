//! Multi-threaded CPU engine
//!
//! Each launch becomes a rayon parallel iterator over the iteration domain,
//! executed on a pool owned by the executor so that kernel launches do not
//! compete with the global rayon pool of the host application.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::{Backend, ExecutorConfig};
use crate::error::Result;
use crate::executor::{catch_fault, Executor};
use crate::profiler::ProfilerHook;

/// Runs invocations on a private rayon pool, one task per index
pub struct ThreadedExecutor {
    pool: ThreadPool,
    n_threads: usize,
    block_size: usize,
    profiler: Arc<dyn ProfilerHook>,
}

impl ThreadedExecutor {
    /// Build the worker pool described by `config`
    pub fn new(config: &ExecutorConfig, profiler: Arc<dyn ProfilerHook>) -> Result<Self> {
        config.validate_for(Backend::Threaded)?;

        let n_threads = config.system_params.n_threads;
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("sparsity-cpu-{}", i))
            .build()?;

        Ok(Self {
            pool,
            n_threads,
            block_size: config.block_size,
            profiler,
        })
    }
}

impl Executor for ThreadedExecutor {
    fn backend(&self) -> Backend {
        Backend::Threaded
    }

    fn num_workers(&self) -> usize {
        self.n_threads
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn profiler(&self) -> &dyn ProfilerHook {
        self.profiler.as_ref()
    }

    fn parallel_for(
        &self,
        kernel: &'static str,
        size: usize,
        body: &(dyn Fn(usize) + Sync),
    ) -> Result<()> {
        catch_fault(self.name(), kernel, || {
            self.pool
                .install(|| (0..size).into_par_iter().for_each(|idx| body(idx)))
        })
    }
}
