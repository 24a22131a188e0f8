use anyhow::Result;

use super::Session;
use crate::display::{ProjectSummary, format_project};

pub async fn discover_command(session: &Session, json: bool) -> Result<()> {
    let workspace = session.workspace().await?;
    let projects = workspace.projects().await;

    if json {
        let summaries: Vec<ProjectSummary> = projects.iter().map(ProjectSummary::from).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("❌ No pixi projects found");
    }
    for project in &projects {
        println!("{}", format_project(project));
    }

    let rejected = workspace.rejected_count();
    if rejected > 0 {
        println!("\n{rejected} manifest(s) skipped: not pixi projects");
    }
    let ignored = workspace.ignored_count();
    if ignored > 0 {
        println!("{ignored} path(s) excluded by ignore rules");
    }
    Ok(())
}
