//! Capabilities the engine needs from whatever front-end hosts it

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tool::ShellCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Item,
    /// A non-selectable section heading
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickPickItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: ItemKind,
}

impl QuickPickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn separator(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            kind: ItemKind::Separator,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.kind == ItemKind::Separator
    }
}

/// A picker request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickPick {
    pub title: String,
    pub placeholder: String,
    pub items: Vec<QuickPickItem>,
    pub can_select_many: bool,
    /// Labels selected when the picker opens
    pub selected: Vec<String>,
    /// Initial filter text
    pub value: Option<String>,
}

impl QuickPick {
    pub fn new(title: impl Into<String>, items: Vec<QuickPickItem>) -> Self {
        Self {
            title: title.into(),
            items,
            ..Default::default()
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn many(mut self) -> Self {
        self.can_select_many = true;
        self
    }

    pub fn selected(mut self, labels: Vec<String>) -> Self {
        self.selected = labels;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Labels a user could actually choose
    pub fn choices(&self) -> impl Iterator<Item = &QuickPickItem> {
        self.items.iter().filter(|item| !item.is_separator())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBox {
    pub title: String,
    pub placeholder: String,
    pub value: Option<String>,
}

impl InputBox {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            placeholder: placeholder.into(),
            value: None,
        }
    }
}

/// Everything the flows ask of the user interface.
///
/// `None` from a prompt means the user dismissed it.
#[async_trait]
pub trait Host: Send + Sync {
    /// Labels of the accepted items
    async fn quick_pick(&self, pick: QuickPick) -> Option<Vec<String>>;

    async fn input_box(&self, input: InputBox) -> Option<String>;

    /// The chosen entry of `choices`
    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String>;

    async fn pick_folder(&self, label: &str) -> Option<PathBuf>;

    async fn notify(&self, level: Level, message: &str);

    async fn run_in_terminal(&self, command: ShellCommand);
}

/// Flatten titled sections into one list, each headed by a separator.
/// Empty sections still get their heading.
pub fn prepare_items<S, I>(sections: I) -> Vec<QuickPickItem>
where
    S: Into<String>,
    I: IntoIterator<Item = (S, Vec<QuickPickItem>)>,
{
    let mut items = Vec::new();
    for (title, section) in sections {
        items.push(QuickPickItem::separator(title));
        items.extend(section);
    }
    items
}


#[cfg(test)]
pub(crate) mod testing;
