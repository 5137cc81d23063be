#[cfg(feature = "cli")]
use std::path::Path;
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct RunStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub files: usize,
    pub bytes_written: u64,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
#[derive(Default)]
struct Counters {
    peak_memory_mb: u64,
    files: usize,
    bytes_written: u64,
}

/// Tracks process resources and downloaded volume over a run.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    counters: Mutex<Counters>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let mut system = System::new();
        if enabled {
            if let Some(pid) = pid {
                system.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&[pid]),
                    true,
                    ProcessRefreshKind::everything(),
                );
            }
        }

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
            counters: Mutex::new(Counters::default()),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<RunStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut counters = self.counters.lock().ok()?;
        counters.peak_memory_mb = counters.peak_memory_mb.max(memory_mb);

        Some(RunStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: counters.peak_memory_mb,
            files: counters.files,
            bytes_written: counters.bytes_written,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// Counts a stored file and logs the current resource usage.
    pub fn record_file(&self, date: &str, path: &Path) {
        if !self.enabled {
            return;
        }
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if let Ok(mut counters) = self.counters.lock() {
            counters.files += 1;
            counters.bytes_written += size;
        }

        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - {} bytes, CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                date,
                size,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Files: {}, Bytes: {}, Total Time: {:?}, Peak Memory: {}MB",
                stats.files,
                stats.bytes_written,
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置時不收集資源資訊
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record_file(&self, _date: &str, _path: &std::path::Path) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
