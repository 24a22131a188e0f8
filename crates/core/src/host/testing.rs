use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{Host, InputBox, Level, QuickPick};
use crate::tool::ShellCommand;

/// Host that answers prompts from queues and records everything shown.
/// An exhausted queue behaves like a dismissed prompt.
#[derive(Default)]
pub(crate) struct ScriptedHost {
    picks: Mutex<VecDeque<Option<Vec<String>>>>,
    inputs: Mutex<VecDeque<Option<String>>>,
    folders: Mutex<VecDeque<Option<PathBuf>>>,
    answers: Mutex<VecDeque<Option<String>>>,
    pub confirmations: Mutex<Vec<String>>,
    pub shown_picks: Mutex<Vec<QuickPick>>,
    pub notifications: Mutex<Vec<(Level, String)>>,
    pub commands: Mutex<Vec<ShellCommand>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pick(self, labels: &[&str]) -> Self {
        self.picks
            .lock()
            .unwrap()
            .push_back(Some(labels.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn cancel_pick(self) -> Self {
        self.picks.lock().unwrap().push_back(None);
        self
    }

    pub fn input(self, value: &str) -> Self {
        self.inputs.lock().unwrap().push_back(Some(value.to_string()));
        self
    }

    pub fn answer(self, choice: &str) -> Self {
        self.answers.lock().unwrap().push_back(Some(choice.to_string()));
        self
    }

    pub fn folder(self, path: PathBuf) -> Self {
        self.folders.lock().unwrap().push_back(Some(path));
        self
    }

    pub fn pick_titled(&self, title: &str) -> QuickPick {
        self.shown_picks
            .lock()
            .unwrap()
            .iter()
            .find(|pick| pick.title.starts_with(title))
            .cloned()
            .unwrap_or_else(|| panic!("no picker titled {title:?}"))
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl Host for ScriptedHost {
    async fn quick_pick(&self, pick: QuickPick) -> Option<Vec<String>> {
        self.shown_picks.lock().unwrap().push(pick);
        self.picks.lock().unwrap().pop_front().flatten()
    }

    async fn input_box(&self, _input: InputBox) -> Option<String> {
        self.inputs.lock().unwrap().pop_front().flatten()
    }

    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String> {
        self.confirmations.lock().unwrap().push(message.to_string());
        let answer = self.answers.lock().unwrap().pop_front().flatten()?;
        choices.iter().find(|c| **c == answer).map(|c| c.to_string())
    }

    async fn pick_folder(&self, _label: &str) -> Option<PathBuf> {
        self.folders.lock().unwrap().pop_front().flatten()
    }

    async fn notify(&self, level: Level, message: &str) {
        self.notifications.lock().unwrap().push((level, message.to_string()));
    }

    async fn run_in_terminal(&self, command: ShellCommand) {
        self.commands.lock().unwrap().push(command);
    }
}
