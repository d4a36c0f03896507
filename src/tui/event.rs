use crossterm::event::{KeyEvent, MouseEvent};

use crate::exhaustive_match;

/// Events flowing through the finder's event loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Quit the application
    Quit,
    /// An error occurred in the terminal backend
    Error(String),
    /// Timer tick, drives the debounce timer and the spinner
    Heartbeat,
    /// Render the UI
    Render,
    /// A key was pressed
    Key(KeyEvent),
    /// Text was pasted (bracketed paste)
    Paste(String),
    /// A mouse event occurred
    Mouse(MouseEvent),
    /// The terminal window gained focus
    FocusGained,
    /// The terminal window lost focus
    FocusLost,
    /// The terminal was resized
    Resize,
    /// An action was triggered
    Action(Action),
}

/// Commands the dropdown understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Quit the host
    Abort,
    /// Insert a character at the caret
    AddChar(char),
    /// Move the caret one character left
    BackwardChar,
    /// Delete the character before the caret
    BackwardDeleteChar,
    /// Move the caret to the start of the query
    BeginningOfLine,
    /// Open the highlighted result
    Commit,
    /// Delete the character under the caret
    DeleteChar,
    /// Hide the dropdown and drop focus
    Dismiss,
    /// Move the highlight down by N rows
    Down(u16),
    /// Move the caret to the end of the query
    EndOfLine,
    /// Give the input focus
    Focus,
    /// Move the caret one character right
    ForwardChar,
    /// Do nothing
    Ignore,
    /// Delete from the caret to the end of the query
    KillLine,
    /// Replace the query
    SetQuery(String),
    /// Delete from the start of the query to the caret
    UnixLineDiscard,
    /// Delete the whitespace-delimited word before the caret
    UnixWordRubout,
    /// Move the highlight up by N rows
    Up(u16),
}

/// Parses an action string such as `down`, `up(3)` or `set-query:rust`
pub fn parse_action(raw_action: &str) -> Option<Action> {
    let (action, arg) = match raw_action.split_once([':', '(', ')']) {
        None => (raw_action, None),
        Some((act, "")) => (act, None),
        Some((act, a)) => (act, Some(a.trim_end_matches(')').to_string())),
    };
    debug!("parse_action: action={action}, arg={arg:?}");

    let count = |arg: Option<String>| arg.and_then(|s| s.parse().ok()).unwrap_or(1);

    exhaustive_match! {
        action => Option<Action>;
        {
            "abort" => Some(Abort),
            "add-char" => Some(AddChar(arg.and_then(|s| s.chars().next()).unwrap_or_default())),
            "backward-char" => Some(BackwardChar),
            "backward-delete-char" => Some(BackwardDeleteChar),
            "beginning-of-line" => Some(BeginningOfLine),
            "commit" | "accept" => Some(Commit),
            "delete-char" => Some(DeleteChar),
            "dismiss" | "cancel" => Some(Dismiss),
            "down" => Some(Down(count(arg))),
            "end-of-line" => Some(EndOfLine),
            "focus" => Some(Focus),
            "forward-char" => Some(ForwardChar),
            "ignore" => Some(Ignore),
            "kill-line" => Some(KillLine),
            "set-query" => Some(SetQuery(arg.unwrap_or_default())),
            "unix-line-discard" => Some(UnixLineDiscard),
            "unix-word-rubout" => Some(UnixWordRubout),
            "up" => Some(Up(count(arg))),
        }
        default _ => None
    }
}
