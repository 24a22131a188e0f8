use anyhow::Result;
use std::path::Path;
use tracing::debug;

use pixi_runner_core::flows::add_channels;

use super::Session;
use crate::host::TerminalHost;

pub async fn add_channel_command(session: &Session, dir: Option<&Path>) -> Result<()> {
    let host = TerminalHost::stdio();
    let registry = session.registry();
    let mut selections = session.selections();
    let ctx = session.flow_context(&host, &registry);

    let target = dir.map(|dir| session.absolute(dir));
    if add_channels(ctx, &mut selections, target.as_deref()).await.is_none() {
        debug!("No channels added");
    }
    Ok(())
}
