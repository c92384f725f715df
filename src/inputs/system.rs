//! Host load, CPU count, uptime and user count.

use crate::core::{PromflatError, Result, SampleList, TagSet};
use crate::inputs::{samples_from_fields, Input, ToFields};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System, Users};

const INPUT_NAME: &str = "system";

/// Raw host counters, one call per statistic.
///
/// Calls may block on the OS; the input runs them on the blocking pool.
pub trait HostProbe: Send + Sync {
    /// 1, 5 and 15 minute load averages
    fn load_average(&self) -> Option<(f64, f64, f64)>;
    /// Number of logical CPUs
    fn cpu_count(&self) -> Option<usize>;
    /// Seconds since boot
    fn uptime(&self) -> Option<u64>;
    /// Number of logged-in users
    fn user_count(&self) -> Option<usize>;
}

/// Probe backed by `sysinfo`
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProbe;

impl HostProbe for SysinfoProbe {
    fn load_average(&self) -> Option<(f64, f64, f64)> {
        let load = System::load_average();
        Some((load.one, load.five, load.fifteen))
    }

    fn cpu_count(&self) -> Option<usize> {
        let sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
        Some(sys.cpus().len())
    }

    fn uptime(&self) -> Option<u64> {
        // sysinfo reports 0 when the value cannot be read
        match System::uptime() {
            0 => None,
            secs => Some(secs),
        }
    }

    fn user_count(&self) -> Option<usize> {
        Some(Users::new_with_refreshed_list().list().len())
    }
}

/// One gather of host statistics
#[derive(Debug, Clone, PartialEq)]
pub struct HostStats {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub n_cpus: usize,
    /// Load divided by the CPU count, `None` when the count is zero
    pub load_norm_1: Option<f64>,
    pub load_norm_5: Option<f64>,
    pub load_norm_15: Option<f64>,
    pub uptime: Option<u64>,
    pub n_users: Option<usize>,
}

impl HostStats {
    pub fn new((load1, load5, load15): (f64, f64, f64), n_cpus: usize) -> Self {
        Self {
            load1,
            load5,
            load15,
            n_cpus,
            load_norm_1: Self::normalized(load1, n_cpus),
            load_norm_5: Self::normalized(load5, n_cpus),
            load_norm_15: Self::normalized(load15, n_cpus),
            uptime: None,
            n_users: None,
        }
    }

    /// Per-CPU load, skipped rather than infinite when there are no CPUs
    pub fn normalized(load: f64, n_cpus: usize) -> Option<f64> {
        if n_cpus == 0 {
            return None;
        }
        Some(load / n_cpus as f64)
    }
}

impl ToFields for HostStats {
    fn fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("load1", self.load1),
            ("load5", self.load5),
            ("load15", self.load15),
            ("n_cpus", self.n_cpus as f64),
        ];
        for (name, value) in [
            ("load_norm_1", self.load_norm_1),
            ("load_norm_5", self.load_norm_5),
            ("load_norm_15", self.load_norm_15),
        ] {
            if let Some(value) = value {
                fields.push((name, value));
            }
        }
        if let Some(uptime) = self.uptime {
            fields.push(("uptime", uptime as f64));
        }
        if let Some(users) = self.n_users {
            fields.push(("n_users", users as f64));
        }
        fields
    }
}

/// Input gathering [`HostStats`]
pub struct SystemInput {
    interval: Duration,
    collect_user_number: bool,
    probe: Arc<dyn HostProbe>,
}

impl SystemInput {
    pub fn new(interval: Duration, collect_user_number: bool, probe: Box<dyn HostProbe>) -> Self {
        Self {
            interval,
            collect_user_number,
            probe: Arc::from(probe),
        }
    }

    /// Read the host once. `None` when load or CPU count are unavailable.
    pub fn read_stats(&self) -> Option<HostStats> {
        read_host(self.probe.as_ref(), self.collect_user_number)
    }
}

fn read_host(probe: &dyn HostProbe, collect_user_number: bool) -> Option<HostStats> {
    let Some(load) = probe.load_average() else {
        tracing::error!("failed to gather system load");
        return None;
    };
    let Some(n_cpus) = probe.cpu_count() else {
        tracing::error!("failed to gather cpu number");
        return None;
    };
    if n_cpus == 0 {
        tracing::warn!("cpu number reported as 0, skipping normalized load");
    }

    let mut stats = HostStats::new(load, n_cpus);

    stats.uptime = probe.uptime();
    if stats.uptime.is_none() {
        tracing::error!("failed to get host uptime");
    }

    if collect_user_number {
        stats.n_users = probe.user_count();
        if stats.n_users.is_none() {
            tracing::warn!("failed to read os users");
        }
    }

    Some(stats)
}

#[async_trait]
impl Input for SystemInput {
    fn name(&self) -> &str {
        INPUT_NAME
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn gather(&self, samples: &SampleList) -> Result<()> {
        let probe = Arc::clone(&self.probe);
        let collect_user_number = self.collect_user_number;
        let stats =
            tokio::task::spawn_blocking(move || read_host(probe.as_ref(), collect_user_number))
                .await
                .map_err(|e| PromflatError::gather(INPUT_NAME, e.to_string()))?;

        if let Some(stats) = stats {
            for sample in samples_from_fields(INPUT_NAME, &stats, &TagSet::new()) {
                samples.push_back(sample);
            }
        }
        Ok(())
    }
}
