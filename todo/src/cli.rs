//! Line-oriented commands for the interactive binary.

use crate::error::TodoError;
use crate::selectors;
use crate::types::{Filter, TodoAction, TodoId, TodoPatch, TodoState};
use std::fmt::Write as _;
use std::str::FromStr;

/// Help text listing every command
pub const HELP: &str = "\
commands:
  add <title>            create a todo
  toggle <id>            flip completed
  edit <id> <title>      change the title
  rm <id>                remove a todo
  all                    complete all, or reopen all if every todo is done
  clear                  remove completed todos
  filter all|active|completed
  list                   show visible todos
  help                   show this text
  quit                   exit";

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create a todo
    Add(String),
    /// Flip the completed flag of a todo
    Toggle(TodoId),
    /// Change the title of a todo
    Edit(TodoId, String),
    /// Remove a todo
    Remove(TodoId),
    /// Toggle every todo
    ToggleAll,
    /// Drop completed todos
    ClearCompleted,
    /// Change the visibility filter
    Filter(Filter),
    /// Print the visible todos
    List,
    /// Print [`HELP`]
    Help,
    /// Exit
    Quit,
}

impl FromStr for Command {
    type Err = TodoError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let id = |command: &'static str| {
            rest.split_whitespace()
                .next()
                .map(TodoId::from)
                .ok_or(TodoError::MissingArgument {
                    command,
                    argument: "id",
                })
        };

        match name {
            "add" => Ok(Self::Add(rest.to_string())),
            "toggle" => Ok(Self::Toggle(id("toggle")?)),
            "edit" => {
                let id = id("edit")?;
                let title = rest
                    .split_once(char::is_whitespace)
                    .map_or("", |(_, title)| title.trim());
                Ok(Self::Edit(id, title.to_string()))
            }
            "rm" => Ok(Self::Remove(id("rm")?)),
            "all" => Ok(Self::ToggleAll),
            "clear" => Ok(Self::ClearCompleted),
            "filter" => Ok(Self::Filter(rest.parse()?)),
            "list" | "ls" | "" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(TodoError::UnknownCommand(other.to_string())),
        }
    }
}

impl Command {
    /// The action this command dispatches against `state`
    ///
    /// Returns `None` for commands that only read (`list`, `help`, `quit`)
    /// and for `toggle` on an id that is not in the list.
    #[must_use]
    pub fn to_action(&self, state: &TodoState) -> Option<TodoAction> {
        match self {
            Self::Add(title) => Some(TodoAction::Create {
                title: title.clone(),
            }),
            Self::Toggle(id) => state.get(id).map(|todo| TodoAction::Update {
                values: TodoPatch::new(id.clone()).with_completed(!todo.completed),
            }),
            Self::Edit(id, title) => Some(TodoAction::Update {
                values: TodoPatch::new(id.clone()).with_title(title.clone()),
            }),
            Self::Remove(id) => Some(TodoAction::Remove { id: id.clone() }),
            Self::ToggleAll => Some(TodoAction::CompleteAll),
            Self::ClearCompleted => Some(TodoAction::ClearCompleted),
            Self::Filter(filter) => Some(TodoAction::SetFilter { filter: *filter }),
            Self::List | Self::Help | Self::Quit => None,
        }
    }
}

/// Render the visible todos followed by the footer line
#[must_use]
pub fn render(state: &TodoState) -> String {
    let mut out = String::new();
    for todo in selectors::select_visible(state) {
        let mark = if todo.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] {:<10} {}", todo.id, todo.title);
    }

    let remaining = selectors::remaining_count(&state.todos);
    let _ = write!(
        out,
        "{remaining} {} left ({})",
        if remaining == 1 { "item" } else { "items" },
        state.filter
    );
    out
}
