use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use pixi_runner_core::flows::InitFlow;

use super::Session;
use crate::host::TerminalHost;

pub async fn init_command(session: &Session, dir: Option<PathBuf>) -> Result<()> {
    let host = TerminalHost::stdio();
    let registry = session.registry();
    let mut selections = session.selections();
    let ctx = session.flow_context(&host, &registry);

    let target = dir.map(|dir| session.absolute(&dir));
    match InitFlow::new(ctx, &mut selections).run(target).await {
        Some(command) => debug!("Ran {}", command.to_shell_command()),
        None => debug!("Init cancelled"),
    }
    Ok(())
}
