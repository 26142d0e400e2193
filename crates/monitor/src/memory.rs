//! Best-effort memory usage sampling.
//!
//! Hosts without heap introspection report `None` rather than a made-up
//! number, and consumers label the field as unavailable.

use serde::{Deserialize, Serialize};

/// A point-in-time memory reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Bytes in use by the application
    pub used_bytes: u64,
    /// Bytes the application may use
    pub total_bytes: u64,
    /// Hard ceiling, when the host exposes one
    pub limit_bytes: Option<u64>,
}

impl MemoryUsage {
    /// Create a reading without a limit.
    pub fn new(used_bytes: u64, total_bytes: u64) -> Self {
        Self {
            used_bytes,
            total_bytes,
            limit_bytes: None,
        }
    }

    /// Set the hard ceiling.
    pub fn with_limit(mut self, limit_bytes: u64) -> Self {
        self.limit_bytes = Some(limit_bytes);
        self
    }

    /// Fraction of the available memory in use, or `None` when the total is unknown.
    pub fn usage_ratio(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        Some(self.used_bytes as f64 / self.total_bytes as f64)
    }

    /// Format bytes as a human-readable string (e.g., "12.5 MB").
    pub fn format_bytes(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * KB;
        const GB: u64 = 1024 * MB;
        match bytes {
            b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
            b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
            b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
            b => format!("{} B", b),
        }
    }
}

/// Host capability for reading memory usage.
pub trait HeapProbe: Send + Sync + std::fmt::Debug {
    /// Take a reading, or `None` when the host cannot provide one.
    fn sample(&self) -> Option<MemoryUsage>;
}

/// Probe for hosts with no memory introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeapProbe;

impl HeapProbe for NoHeapProbe {
    fn sample(&self) -> Option<MemoryUsage> {
        None
    }
}

/// Probe that always reports the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeapProbe(pub MemoryUsage);

impl HeapProbe for FixedHeapProbe {
    fn sample(&self) -> Option<MemoryUsage> {
        Some(self.0)
    }
}

#[cfg(feature = "host-memory")]
pub use system::SystemHeapProbe;

#[cfg(feature = "host-memory")]
mod system {
    use super::{HeapProbe, MemoryUsage};
    use std::sync::Mutex;
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

    /// Reads this process's resident memory through `sysinfo`.
    ///
    /// Usage is measured against the container memory limit when one is
    /// set, otherwise against the host's physical memory.
    #[derive(Debug)]
    pub struct SystemHeapProbe {
        pid: Option<Pid>,
        system: Mutex<System>,
    }

    impl SystemHeapProbe {
        /// Create a probe for the current process.
        pub fn new() -> Self {
            let pid = sysinfo::get_current_pid().ok();
            if pid.is_none() {
                tracing::debug!(target: "monitor::memory", "current pid unavailable");
            }
            Self {
                pid,
                system: Mutex::new(System::new()),
            }
        }
    }

    impl Default for SystemHeapProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HeapProbe for SystemHeapProbe {
        fn sample(&self) -> Option<MemoryUsage> {
            let pid = self.pid?;
            let mut system = self.system.lock().ok()?;
            system.refresh_memory();
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::nothing().with_memory(),
            );

            let resident = system.process(pid)?.memory();
            let limit = system.cgroup_limits().map(|limits| limits.total_memory);
            let usage = process_usage(resident, system.total_memory(), limit);
            if usage.is_none() {
                tracing::debug!(target: "monitor::memory", "host reported no memory total");
            }
            usage
        }
    }

    /// Resident bytes against the tightest known ceiling.
    pub(super) fn process_usage(
        resident_bytes: u64,
        host_total_bytes: u64,
        limit_bytes: Option<u64>,
    ) -> Option<MemoryUsage> {
        match limit_bytes.filter(|limit| *limit > 0 && *limit < host_total_bytes) {
            Some(limit) => Some(MemoryUsage::new(resident_bytes, limit).with_limit(limit)),
            None if host_total_bytes > 0 => Some(MemoryUsage::new(resident_bytes, host_total_bytes)),
            None => None,
        }
    }
}
