//! Host and process statistics.
//!
//! [`HostStats`] is a plain value so the report can be rendered from
//! fabricated numbers in tests; [`HostStats::collect`] fills it from the
//! running process.

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::alloc;

/// One reading of the host and the current process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostStats {
    /// `None` when the hostname cannot be read.
    pub hostname: Option<String>,
    pub time: DateTime<Utc>,
    pub os: String,
    pub arch: String,
    pub version: String,
    pub pid: u32,
    /// Logical CPUs.
    pub cpus: usize,
    /// Alive tokio tasks.
    pub tasks: usize,
    /// Heap bytes currently allocated.
    pub allocated: u64,
    /// Heap bytes allocated since start, freed or not.
    pub total_allocated: u64,
    /// Resident memory of the process as reported by the OS.
    pub resident: u64,
}

impl HostStats {
    /// Reads the current process.
    ///
    /// `allocated` and `total_allocated` stay at zero unless
    /// [`TrackingAllocator`](crate::alloc::TrackingAllocator) is installed as
    /// the global allocator. `tasks` is zero outside a tokio runtime.
    pub fn collect() -> Self {
        let pid = std::process::id();
        Self {
            hostname: System::host_name(),
            time: Utc::now(),
            os: std::env::consts::OS.to_owned(),
            arch: std::env::consts::ARCH.to_owned(),
            version: concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_owned(),
            pid,
            cpus: num_cpus::get(),
            tasks: alive_tasks(),
            allocated: alloc::allocated(),
            total_allocated: alloc::total_allocated(),
            resident: resident_memory(pid),
        }
    }
}

fn alive_tasks() -> usize {
    tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_alive_tasks())
        .unwrap_or(0)
}

fn resident_memory(pid: u32) -> u64 {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::new().with_memory(),
    );
    sys.process(pid).map_or(0, |p| p.memory())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_process_identity() {
        let stats = HostStats::collect();
        assert_eq!(stats.pid, std::process::id());
        assert_eq!(stats.os, std::env::consts::OS);
        assert!(stats.cpus >= 1);
        assert!(stats.version.starts_with("routedump "));
        assert_eq!(stats.tasks, 0);
    }

    #[tokio::test]
    async fn counts_tasks_inside_runtime() {
        let handle = tokio::spawn(std::future::pending::<()>());
        let stats = HostStats::collect();
        assert!(stats.tasks >= 1);
        handle.abort();
    }
}
