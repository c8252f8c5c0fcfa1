//! Profiler hooks for named scopes
//!
//! A [`ProfilerHook`] receives begin/end events for every operation, kernel
//! launch, and internal pass. One hook is chosen when an executor is built
//! and handed to it; call sites reach it through
//! [`Executor::profiler`](crate::executor::Executor::profiler) rather than
//! through any global registry. Vendor profilers plug in by implementing the
//! trait.

use std::fmt;

/// Category attached to a profiling event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// A user-facing pipeline such as a pattern conversion
    Operation,
    /// A single kernel launch
    Kernel,
    /// A pass inside a primitive (scan phases and similar)
    Internal,
}

impl EventCategory {
    /// Short lowercase label for log output
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Operation => "operation",
            EventCategory::Kernel => "kernel",
            EventCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of begin/end events for named scopes
///
/// Events for one scope are always properly nested: every `begin` is followed
/// by exactly one `end` with the same name and category, also when the scope
/// is left by an error.
pub trait ProfilerHook: Send + Sync {
    /// A scope named `name` was entered
    fn begin(&self, name: &str, category: EventCategory);

    /// A scope named `name` was left
    fn end(&self, name: &str, category: EventCategory);
}

/// Hook that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProfiler;

impl ProfilerHook for NoopProfiler {
    fn begin(&self, _name: &str, _category: EventCategory) {}

    fn end(&self, _name: &str, _category: EventCategory) {}
}

/// Hook that forwards events to the `log` facade at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProfiler;

impl ProfilerHook for LogProfiler {
    fn begin(&self, name: &str, category: EventCategory) {
        log::trace!(target: "sparsity_kernels::profile", "begin {} [{}]", name, category);
    }

    fn end(&self, name: &str, category: EventCategory) {
        log::trace!(target: "sparsity_kernels::profile", "end {} [{}]", name, category);
    }
}

/// RAII guard around one profiled scope
///
/// Calls [`ProfilerHook::begin`] on construction and [`ProfilerHook::end`]
/// when dropped.
pub struct ProfilingScope<'a> {
    hook: &'a dyn ProfilerHook,
    name: &'a str,
    category: EventCategory,
}

impl<'a> ProfilingScope<'a> {
    /// Enter a scope
    pub fn new(hook: &'a dyn ProfilerHook, name: &'a str, category: EventCategory) -> Self {
        hook.begin(name, category);
        Self {
            hook,
            name,
            category,
        }
    }
}

impl Drop for ProfilingScope<'_> {
    fn drop(&mut self) {
        self.hook.end(self.name, self.category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ProfilerHook for Recorder {
        fn begin(&self, name: &str, category: EventCategory) {
            self.0.lock().unwrap().push(format!("+{}:{}", name, category));
        }

        fn end(&self, name: &str, category: EventCategory) {
            self.0.lock().unwrap().push(format!("-{}:{}", name, category));
        }
    }

    #[test]
    fn test_scope_nesting() {
        let recorder = Recorder::default();
        {
            let _outer = ProfilingScope::new(&recorder, "outer", EventCategory::Operation);
            let _inner = ProfilingScope::new(&recorder, "inner", EventCategory::Kernel);
        }

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                "+outer:operation",
                "+inner:kernel",
                "-inner:kernel",
                "-outer:operation",
            ]
        );
    }

    #[test]
    fn test_noop_and_log_accept_events() {
        let _a = ProfilingScope::new(&NoopProfiler, "noop", EventCategory::Internal);
        let _b = ProfilingScope::new(&LogProfiler, "log", EventCategory::Internal);
    }
}
