//! Sequential reference engine

use std::sync::Arc;

use crate::config::{Backend, DEFAULT_BLOCK_SIZE};
use crate::error::Result;
use crate::executor::{catch_fault, Executor};
use crate::profiler::{NoopProfiler, ProfilerHook};

/// Runs every invocation in index order on the calling thread
///
/// This is the baseline the parallel engines are checked against.
pub struct ReferenceExecutor {
    profiler: Arc<dyn ProfilerHook>,
}

impl ReferenceExecutor {
    /// Create a reference executor without profiling
    pub fn new() -> Self {
        Self::with_profiler(Arc::new(NoopProfiler))
    }

    /// Create a reference executor reporting to `profiler`
    pub fn with_profiler(profiler: Arc<dyn ProfilerHook>) -> Self {
        Self { profiler }
    }
}

impl Default for ReferenceExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ReferenceExecutor {
    fn backend(&self) -> Backend {
        Backend::Reference
    }

    fn num_workers(&self) -> usize {
        1
    }

    fn block_size(&self) -> usize {
        DEFAULT_BLOCK_SIZE
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
            for idx in 0..size {
                body(idx);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_runs_in_order() {
        let exec = ReferenceExecutor::new();
        let seen = Mutex::new(Vec::new());
        exec.parallel_for("order", 5, &|i| seen.lock().unwrap().push(i))
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_2d_row_major_order() {
        let exec = ReferenceExecutor::new();
        let seen = Mutex::new(Vec::new());
        exec.parallel_for_2d("order_2d", 2, 3, &|r, c| seen.lock().unwrap().push((r, c)))
            .unwrap();
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn test_empty_domain() {
        let exec = ReferenceExecutor::new();
        exec.parallel_for("empty", 0, &|_| panic!("must not run"))
            .unwrap();
        exec.parallel_for_2d("empty_2d", 4, 0, &|_, _| panic!("must not run"))
            .unwrap();
    }
}
