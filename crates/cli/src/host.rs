//! Line-based [`Host`] for running the interactive flows in a terminal

use async_trait::async_trait;
use std::io::{self, BufRead, BufReader, Stdin, Stderr, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use pixi_runner_core::ShellCommand;
use pixi_runner_core::host::{Host, InputBox, Level, QuickPick};

struct Io<R, W> {
    input: R,
    output: W,
}

/// Prompts are written to `output` and answered line by line from `input`.
///
/// Pickers list their choices with numbers; a multi-select accepts a comma
/// separated list. An empty answer keeps the preselected choices and `q` or
/// end of input dismisses the prompt.
pub struct TerminalHost<R, W> {
    io: Mutex<Io<R, W>>,
}

impl TerminalHost<BufReader<Stdin>, Stderr> {
    /// Reads stdin and prompts on stderr, leaving stdout to command output
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new(Io { input, output }),
        }
    }

    /// Give back the writer, mostly so tests can inspect what was shown
    pub fn into_output(self) -> W {
        self.io.into_inner().unwrap_or_else(PoisonError::into_inner).output
    }

    fn lock(&self) -> MutexGuard<'_, Io<R, W>> {
        self.io.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Positions of the accepted entries among `pick.choices()`
    pub fn pick_indices(&self, pick: &QuickPick) -> Option<Vec<usize>> {
        let mut io = self.lock();
        let choices: Vec<_> = pick.choices().collect();
        if choices.is_empty() {
            let _ = writeln!(io.output, "{}: nothing to choose from", pick.title);
            return None;
        }

        let preselected: Vec<usize> = choices
            .iter()
            .enumerate()
            .filter(|(_, item)| pick.selected.contains(&item.label))
            .map(|(index, _)| index)
            .collect();

        let _ = writeln!(io.output, "{}", pick.title);
        let mut number = 0;
        for item in &pick.items {
            if item.is_separator() {
                let _ = writeln!(io.output, "  -- {} --", item.label);
                continue;
            }
            let mark = if preselected.contains(&number) { '*' } else { ' ' };
            number += 1;
            match &item.description {
                Some(description) => {
                    let _ = writeln!(io.output, "  {mark}{number:>3}) {}  {}", item.label, description);
                }
                None => {
                    let _ = writeln!(io.output, "  {mark}{number:>3}) {}", item.label);
                }
            }
        }

        let prompt = if pick.can_select_many {
            "Numbers, comma separated"
        } else {
            "Number"
        };
        let hint = if pick.placeholder.is_empty() {
            String::new()
        } else {
            format!(" ({})", pick.placeholder)
        };

        loop {
            let answer = read_answer(&mut *io, &format!("{prompt}{hint}: "))?;
            if answer.is_empty() {
                if preselected.is_empty() && !pick.can_select_many {
                    return None;
                }
                return Some(preselected);
            }
            match parse_selection(&answer, choices.len(), pick.can_select_many) {
                Some(indices) => return Some(indices),
                None => {
                    let _ = writeln!(io.output, "Invalid selection '{answer}'");
                }
            }
        }
    }

    fn write_line(&self, line: &str) {
        let mut io = self.lock();
        let _ = writeln!(io.output, "{line}");
        let _ = io.output.flush();
    }
}

/// Prompt and read one trimmed line; `None` on end of input or `q`
fn read_answer<R: BufRead, W: Write>(io: &mut Io<R, W>, prompt: &str) -> Option<String> {
    let _ = write!(io.output, "{prompt}");
    let _ = io.output.flush();

    let mut line = String::new();
    match io.input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => {
            let answer = line.trim().to_string();
            if answer == "q" { None } else { Some(answer) }
        }
        Err(e) => {
            warn!("Failed to read from terminal: {}", e);
            None
        }
    }
}

/// One-based numbers to zero-based indices, rejecting anything out of range
fn parse_selection(answer: &str, len: usize, many: bool) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let number: usize = part.parse().ok()?;
        if number == 0 || number > len {
            return None;
        }
        if !indices.contains(&(number - 1)) {
            indices.push(number - 1);
        }
    }
    if indices.is_empty() || (!many && indices.len() > 1) {
        return None;
    }
    Some(indices)
}

#[async_trait]
impl<R: BufRead + Send, W: Write + Send> Host for TerminalHost<R, W> {
    async fn quick_pick(&self, pick: QuickPick) -> Option<Vec<String>> {
        let indices = self.pick_indices(&pick)?;
        let choices: Vec<_> = pick.choices().collect();
        Some(indices.into_iter().map(|i| choices[i].label.clone()).collect())
    }

    async fn input_box(&self, input: InputBox) -> Option<String> {
        let mut io = self.lock();
        let mut prompt = input.title.clone();
        if !input.placeholder.is_empty() {
            prompt.push_str(&format!(" ({})", input.placeholder));
        }
        if let Some(value) = &input.value {
            prompt.push_str(&format!(" [{value}]"));
        }
        prompt.push_str(": ");

        let answer = read_answer(&mut *io, &prompt)?;
        match (&input.value, answer.is_empty()) {
            (Some(value), true) => Some(value.clone()),
            _ => Some(answer),
        }
    }

    async fn confirm(&self, message: &str, choices: &[&str]) -> Option<String> {
        let mut io = self.lock();
        let options = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("{}) {}", i + 1, choice))
            .collect::<Vec<_>>()
            .join("  ");
        let answer = read_answer(&mut *io, &format!("{message}\n  {options}: "))?;

        if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(&answer)) {
            return Some(choice.to_string());
        }
        let index = parse_selection(&answer, choices.len(), false)?;
        Some(choices[index[0]].to_string())
    }

    async fn pick_folder(&self, label: &str) -> Option<PathBuf> {
        let mut io = self.lock();
        let answer = read_answer(&mut *io, &format!("{label} (directory): "))?;
        if answer.is_empty() {
            None
        } else {
            Some(PathBuf::from(answer))
        }
    }

    async fn notify(&self, level: Level, message: &str) {
        let prefix = match level {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        self.write_line(&format!("{prefix}: {message}"));
    }

    async fn run_in_terminal(&self, command: ShellCommand) {
        let shell_cmd = command.to_shell_command();
        self.write_line(&format!("> {shell_cmd}"));
        if let Some(dir) = &command.working_dir {
            debug!("Working directory: {}", dir.display());
        }

        match command.execute().await {
            Ok(status) if status.success() => {}
            Ok(status) => self.write_line(&format!("error: `{shell_cmd}` exited with {status}")),
            Err(e) => self.write_line(&format!("error: {e}")),
        }
    }
}
