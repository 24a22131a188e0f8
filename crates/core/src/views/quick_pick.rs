use crate::host::{QuickPick, QuickPickItem, prepare_items};
use crate::tasks::PixiTask;

/// One section per project, each task labelled with its name and described
/// by its environment tag and summary.
pub fn task_quick_pick(tasks: &[PixiTask]) -> QuickPick {
    let mut sections: Vec<(String, Vec<QuickPickItem>)> = Vec::new();

    for task in tasks {
        let project = &task.definition.project;
        let item = QuickPickItem::new(&task.label).with_description(format!("{} {}", task.source, task.summary()));
        match sections.iter_mut().find(|(title, _)| title == project) {
            Some((_, items)) => items.push(item),
            None => sections.push((project.clone(), vec![item])),
        }
    }

    QuickPick::new("Run Pixi Task", prepare_items(sections)).placeholder("Select a task to run")
}

/// The task behind a picked row. Rows are matched by position among the
/// selectable items since labels repeat across environments.
pub fn task_from_pick<'a>(tasks: &'a [PixiTask], pick: &QuickPick, index: usize) -> Option<&'a PixiTask> {
    let item = pick.choices().nth(index)?;
    let mut candidates = pick.choices().take(index).filter(|i| i.label == item.label).count();
    let project_order = project_order(tasks);

    // tasks appear in the picker grouped by project, in first-seen order
    let mut ordered: Vec<&PixiTask> = tasks.iter().collect();
    ordered.sort_by_key(|t| project_order.iter().position(|p| *p == t.definition.project));

    ordered.into_iter().find(|task| {
        if task.label != item.label {
            return false;
        }
        if candidates == 0 {
            return true;
        }
        candidates -= 1;
        false
    })
}

fn project_order(tasks: &[PixiTask]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for task in tasks {
        if !order.contains(&task.definition.project) {
            order.push(task.definition.project.clone());
        }
    }
    order
}
