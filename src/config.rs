//! Configuration and backend selection for executors

use std::sync::Arc;

use crate::error::{KernelError, Result};
use crate::executor::{DeviceExecutor, Executor, ReferenceExecutor, ThreadedExecutor};
use crate::profiler::{LogProfiler, ProfilerHook};

/// Default number of lanes per block (device model) or elements per scan block
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// The parallel backend a kernel launch executes on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Sequential in-order loop on the calling thread
    Reference,
    /// Multi-threaded CPU execution over a rayon pool
    Threaded,
    /// Massively parallel accelerator model: a grid of fixed-size blocks
    Device,
}

impl Backend {
    /// Every backend, in order of increasing parallelism
    pub const ALL: [Backend; 3] = [Backend::Reference, Backend::Threaded, Backend::Device];

    /// Human-readable backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Reference => "reference",
            Backend::Threaded => "threaded",
            Backend::Device => "device",
        }
    }

    /// Parse a backend name as accepted by `SPARSITY_BACKEND`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" | "sequential" => Some(Backend::Reference),
            "threaded" | "omp" | "cpu" => Some(Backend::Threaded),
            "device" | "gpu" => Some(Backend::Device),
            _ => None,
        }
    }
}

/// Host parameters for the CPU backends
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Number of worker threads
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

/// Properties of the modelled accelerator
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    /// Number of blocks that can run at once
    pub num_multiprocessors: usize,
    /// Lanes per warp; block sizes must be a multiple of this
    pub warp_size: usize,
    /// Upper bound on lanes per block
    pub max_block_size: usize,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self {
            num_multiprocessors: num_cpus::get(),
            warp_size: 32,
            max_block_size: 1024,
        }
    }
}

/// Configuration for building an executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Which backend to execute on
    pub backend: Backend,

    /// Host parameters for the CPU backends
    pub system_params: SystemParameters,

    /// Lanes per block on the device, elements per block in CPU scans
    pub block_size: usize,

    /// Accelerator model parameters
    pub device: DeviceProperties,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::for_backend(Backend::Threaded)
    }
}

impl ExecutorConfig {
    /// Create a default config for a specific backend
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            system_params: SystemParameters::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            device: DeviceProperties::default(),
        }
    }

    /// Build a config from `SPARSITY_BACKEND` and `SPARSITY_THREADS`
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let backend = std::env::var("SPARSITY_BACKEND")
            .ok()
            .and_then(|name| Backend::parse(&name))
            .unwrap_or(Backend::Threaded);

        let config = Self::for_backend(backend);
        match std::env::var("SPARSITY_THREADS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            Some(n) => config.with_threads(n),
            None => config,
        }
    }

    /// Set the block size
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the number of workers: CPU threads, and blocks resident at once on the device
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.system_params.n_threads = n_threads;
        self.device.num_multiprocessors = n_threads;
        self
    }

    /// Check the configuration against the selected backend
    pub fn validate(&self) -> Result<()> {
        self.validate_for(self.backend)
    }

    /// Check the configuration against `backend`, whatever `self.backend` says
    pub(crate) fn validate_for(&self, backend: Backend) -> Result<()> {
        if self.block_size == 0 {
            return Err(KernelError::invalid_config("block_size", "must be non-zero"));
        }

        match backend {
            Backend::Reference => {}
            Backend::Threaded => {
                if self.system_params.n_threads == 0 {
                    return Err(KernelError::invalid_config("n_threads", "must be non-zero"));
                }
            }
            Backend::Device => {
                let device = &self.device;
                if device.num_multiprocessors == 0 {
                    return Err(KernelError::invalid_config(
                        "num_multiprocessors",
                        "must be non-zero",
                    ));
                }
                if device.warp_size == 0 {
                    return Err(KernelError::invalid_config("warp_size", "must be non-zero"));
                }
                if self.block_size > device.max_block_size {
                    return Err(KernelError::invalid_config(
                        "block_size",
                        format!(
                            "{} exceeds the device limit of {}",
                            self.block_size, device.max_block_size
                        ),
                    ));
                }
                if self.block_size % device.warp_size != 0 {
                    return Err(KernelError::invalid_config(
                        "block_size",
                        format!(
                            "{} is not a multiple of the warp size {}",
                            self.block_size, device.warp_size
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Create an executor for the configured backend, reporting to [`LogProfiler`]
pub fn create_executor(config: &ExecutorConfig) -> Result<Arc<dyn Executor>> {
    create_executor_with_profiler(config, Arc::new(LogProfiler))
}

/// Create an executor for the configured backend with an injected profiler hook
pub fn create_executor_with_profiler(
    config: &ExecutorConfig,
    profiler: Arc<dyn ProfilerHook>,
) -> Result<Arc<dyn Executor>> {
    config.validate()?;

    let executor: Arc<dyn Executor> = match config.backend {
        Backend::Reference => Arc::new(ReferenceExecutor::with_profiler(profiler)),
        Backend::Threaded => Arc::new(ThreadedExecutor::new(config, profiler)?),
        Backend::Device => Arc::new(DeviceExecutor::new(config, profiler)?),
    };

    log::debug!(
        "created {} executor with {} workers",
        executor.name(),
        executor.num_workers()
    );
    Ok(executor)
}
