use anyhow::Result;

use pixi_runner_core::views::task_tree;

use super::Session;
use crate::display::task_rows;

pub async fn tasks_command(session: &Session, json: bool, tree: bool) -> Result<()> {
    let workspace = session.workspace().await?;
    let tasks = workspace.tasks().await;

    if json {
        if tree {
            println!("{}", serde_json::to_string_pretty(&task_tree(&tasks))?);
        } else {
            println!("{}", serde_json::to_string_pretty(tasks.as_slice())?);
        }
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No pixi tasks found");
        return Ok(());
    }

    if tree {
        for node in task_tree(&tasks) {
            print!("{}", node.render());
        }
    } else {
        for row in task_rows(&tasks) {
            println!("{row}");
        }
    }
    Ok(())
}
