//! Interactive session
//!
//! Connects the console signals to a small command shell: history
//! navigation, command-name completion and a handful of built-in commands.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use console_core::{Console, EditAction, Signal};

/// Built-in commands and their help text
pub const COMMANDS: &[(&str, &str)] = &[
    ("clear", "Clear the scrollback"),
    ("echo", "Print the rest of the line"),
    ("help", "List available commands"),
    ("history", "List previous commands"),
];

/// Bounded list of submitted commands with a browsing position
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    limit: usize,
    /// Entry being shown, `None` while editing a fresh line
    position: Option<usize>,
    /// Line that was being edited before browsing started
    draft: String,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
            position: None,
            draft: String::new(),
        }
    }

    /// Remember a submitted command and stop browsing
    pub fn push(&mut self, command: &str) {
        self.position = None;
        self.draft.clear();
        if command.trim().is_empty() || self.entries.back().is_some_and(|last| last == command) {
            return;
        }
        self.entries.push_back(command.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Step back; `current` is kept as the draft when browsing starts
    pub fn older(&mut self, current: &str) -> Option<&str> {
        let position = match self.position {
            None if self.entries.is_empty() => return None,
            None => {
                self.draft = current.to_string();
                self.entries.len() - 1
            }
            Some(position) => position.saturating_sub(1),
        };
        self.position = Some(position);
        self.entries.get(position).map(String::as_str)
    }

    /// Step forward, returning to the draft after the newest entry
    pub fn newer(&mut self) -> Option<&str> {
        let position = self.position?;
        if position + 1 < self.entries.len() {
            self.position = Some(position + 1);
            self.entries.get(position + 1).map(String::as_str)
        } else {
            self.position = None;
            Some(&self.draft)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Result of completing a prefix against a word list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<'a> {
    NoMatch,
    Unique(&'a str),
    /// Several candidates; `common` is their longest shared prefix
    Ambiguous { common: String, matches: Vec<&'a str> },
}

/// Complete `prefix` against `candidates`
pub fn complete<'a>(prefix: &str, candidates: impl IntoIterator<Item = &'a str>) -> Completion<'a> {
    let matches: Vec<&str> = candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(prefix))
        .collect();

    match matches.len() {
        0 => Completion::NoMatch,
        1 => Completion::Unique(matches[0]),
        _ => {
            let first = matches[0];
            let common = matches[1..].iter().fold(first.len(), |common, candidate| {
                first
                    .bytes()
                    .zip(candidate.bytes())
                    .take(common)
                    .take_while(|(a, b)| a == b)
                    .count()
            });
            Completion::Ambiguous {
                common: first[..common].to_string(),
                matches,
            }
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    history: History,
    /// Commands submitted but not yet run
    pending: Vec<String>,
}

/// Command shell driven by console signals
#[derive(Debug, Clone)]
pub struct Session {
    state: Rc<RefCell<SessionState>>,
}

impl Session {
    /// Connect the session's handlers to `console`
    pub fn attach(console: &mut Console, history_size: usize) -> Self {
        let state = Rc::new(RefCell::new(SessionState {
            history: History::new(history_size),
            pending: Vec::new(),
        }));

        // Commands run after the console has echoed the line
        let activate = Rc::clone(&state);
        console.connect(Signal::Activate, move |_, input| {
            log::info!("Activate: {}", input);
            activate.borrow_mut().pending.push(input.to_string());
        });

        console.connect(Signal::Complete, |console, input| {
            log::info!("Complete: {}", input);
            complete_command(console, input);
        });

        let prev = Rc::clone(&state);
        console.connect(Signal::HistoryPrev, move |console, input| {
            let mut state = prev.borrow_mut();
            if let Some(entry) = state.history.older(input) {
                log::info!("History prev: {}", entry);
                set_input(console, entry);
            }
        });

        let next = Rc::clone(&state);
        console.connect(Signal::HistoryNext, move |console, _| {
            let mut state = next.borrow_mut();
            if let Some(entry) = state.history.newer() {
                log::info!("History next: {}", entry);
                set_input(console, entry);
            }
        });

        Self { state }
    }

    /// Apply an action and run any command it submitted
    pub fn handle(&self, console: &mut Console, action: EditAction) {
        console.process(action);
        self.run_pending(console);
    }

    /// Type `line` and submit it
    pub fn submit(&self, console: &mut Console, line: &str) {
        for c in line.chars() {
            self.handle(console, EditAction::Type(c));
        }
        self.handle(console, EditAction::Enter);
    }

    fn run_pending(&self, console: &mut Console) {
        let pending = std::mem::take(&mut self.state.borrow_mut().pending);
        for command in pending {
            self.state.borrow_mut().history.push(&command);
            self.execute(console, &command);
        }
    }

    fn execute(&self, console: &mut Console, line: &str) {
        let line = line.trim();
        let (name, args) = line.split_once(' ').unwrap_or((line, ""));
        match name {
            "" => {}
            "help" => {
                for (command, help) in COMMANDS {
                    console.print(&format!("  {:<8} {}\n", command, help));
                }
            }
            "clear" => console.clear_scrollback(),
            "echo" => console.print(&format!("{}\n", args)),
            "history" => {
                let state = self.state.borrow();
                for (i, entry) in state.history.entries().enumerate() {
                    console.print(&format!("{:>4}  {}\n", i + 1, entry));
                }
            }
            other => {
                log::debug!("Unknown command {:?}", other);
                console.print(&format!("Unknown command: {}\n", other));
            }
        }
    }
}

fn set_input(console: &mut Console, text: &str) {
    if let Err(e) = console.set_input(text) {
        log::warn!("Cannot set input: {}", e);
    }
}

fn complete_command(console: &mut Console, input: &str) {
    if input.contains(' ') {
        return;
    }
    match complete(input, COMMANDS.iter().map(|(name, _)| *name)) {
        Completion::NoMatch => {}
        Completion::Unique(name) => set_input(console, &format!("{} ", name)),
        Completion::Ambiguous { common, matches } => {
            if common.len() > input.len() {
                set_input(console, &common);
            } else {
                console.print(&format!("{}\n", matches.join("  ")));
            }
        }
    }
}
