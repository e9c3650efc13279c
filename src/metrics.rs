//! Prometheus recorder for a batch run. There is no scrape endpoint; the
//! rendered exposition text is written next to the other artifacts.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;

pub const METRICS_ARTIFACT: &str = "metrics.prom";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the current snapshot to `<dir>/metrics.prom`.
    pub fn write_snapshot(&self, dir: &Path) -> Result<()> {
        let path = dir.join(METRICS_ARTIFACT);
        fs::write(&path, self.render()).with_context(|| format!("writing {}", path.display()))
    }
}
