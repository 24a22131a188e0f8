use anyhow::Result;
use std::path::Path;
use tracing::debug;

use pixi_runner_core::flows::{add_packages, add_pypi_packages};
use pixi_runner_core::registry::PypiIndex;

use super::Session;
use crate::host::TerminalHost;

pub async fn add_package_command(session: &Session, dir: Option<&Path>, pypi: bool) -> Result<()> {
    let host = TerminalHost::stdio();
    let registry = session.registry();
    let ctx = session.flow_context(&host, &registry);
    let target = dir.map(|dir| session.absolute(dir));

    let command = if pypi {
        let index = PypiIndex::new(session.config.resolved_cache_dir());
        let count = index.load().await?;
        debug!("Loaded {} PyPI project names", count);
        add_pypi_packages(ctx, &index, target.as_deref()).await
    } else {
        add_packages(ctx, target.as_deref()).await
    };

    if command.is_none() {
        debug!("No packages added");
    }
    Ok(())
}
