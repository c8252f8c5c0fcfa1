//! Massively parallel accelerator model
//!
//! Launches are mapped onto a grid the way a GPU launch would be: the domain
//! is covered by `ceil(size / block_size)` blocks of `block_size` lanes each,
//! lane `t` of block `b` handles global index `b * block_size + t`, and lanes
//! past the end of the domain are masked off. Blocks are independent and are
//! scheduled onto `num_multiprocessors` workers in no particular order; lanes
//! of a block run back to back on the worker that owns the block.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::{Backend, DeviceProperties, ExecutorConfig};
use crate::error::Result;
use crate::executor::{catch_fault, Executor};
use crate::profiler::ProfilerHook;

/// Grid dimensions of one launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGrid {
    /// Number of blocks in the grid
    pub num_blocks: usize,
    /// Lanes per block
    pub block_size: usize,
}

impl LaunchGrid {
    /// Smallest grid covering `size` indices with blocks of `block_size` lanes
    pub fn covering(size: usize, block_size: usize) -> Self {
        Self {
            num_blocks: size.div_ceil(block_size),
            block_size,
        }
    }

    /// Total number of lanes, including masked ones
    pub fn num_lanes(&self) -> usize {
        self.num_blocks * self.block_size
    }
}

/// Runs invocations as blocks of lanes on a simulated accelerator
pub struct DeviceExecutor {
    pool: ThreadPool,
    block_size: usize,
    properties: DeviceProperties,
    profiler: Arc<dyn ProfilerHook>,
}

impl DeviceExecutor {
    /// Bring up the device model described by `config`
    ///
    /// The device rules of [`ExecutorConfig::validate`] are applied whatever
    /// backend `config` names.
    pub fn new(config: &ExecutorConfig, profiler: Arc<dyn ProfilerHook>) -> Result<Self> {
        config.validate_for(Backend::Device)?;

        let properties = config.device.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(properties.num_multiprocessors)
            .thread_name(|i| format!("sparsity-sm-{}", i))
            .build()?;

        Ok(Self {
            pool,
            block_size: config.block_size,
            properties,
            profiler,
        })
    }

    /// Properties of the modelled device
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Grid a launch over `size` indices is mapped onto
    pub fn grid_for(&self, size: usize) -> LaunchGrid {
        LaunchGrid::covering(size, self.block_size)
    }
}

impl Executor for DeviceExecutor {
    fn backend(&self) -> Backend {
        Backend::Device
    }

    fn num_workers(&self) -> usize {
        self.properties.num_multiprocessors
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
        let grid = self.grid_for(size);
        log::trace!(
            "kernel '{}' grid: {} blocks x {} lanes",
            kernel,
            grid.num_blocks,
            grid.block_size
        );

        catch_fault(self.name(), kernel, || {
            self.pool.install(|| {
                (0..grid.num_blocks).into_par_iter().for_each(|block_idx| {
                    let base = block_idx * grid.block_size;
                    for lane in 0..grid.block_size {
                        let idx = base + lane;
                        if idx < size {
                            body(idx);
                        }
                    }
                })
            })
        })
    }
}
