//! Terminal UI: the widget's state machine, its widgets and the terminal handle.

use std::num::ParseIntError;

pub use app::{App, AppView, DropdownView};
pub use backend::Tui;
pub use event::{Action, Event};
use thiserror::Error;
pub use widget::SearchWidget;

mod app;
mod backend;
/// Event handling and action definitions
pub mod event;
mod input;
mod item_list;
/// Widget trait
pub mod widget;

/// Height of the finder: a row count or a share of the terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    /// Percentage of the terminal height (0-100)
    Percent(u16),
    /// Number of rows
    Fixed(u16),
}

/// Invalid `--height` value
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeParseError {
    /// Not a number
    #[error("invalid height {0:?}: {1}")]
    ParseError(String, ParseIntError),
    /// More than 100%
    #[error("invalid height percentage {0}, expected at most 100")]
    InvalidPercent(u16),
}

impl TryFrom<&str> for Size {
    type Error = SizeParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let parse = |digits: &str| {
            digits
                .parse::<u16>()
                .map_err(|e| SizeParseError::ParseError(value.to_string(), e))
        };
        match trimmed.strip_suffix('%') {
            Some(digits) => match parse(digits)? {
                p if p > 100 => Err(SizeParseError::InvalidPercent(p)),
                p => Ok(Self::Percent(p)),
            },
            None => parse(trimmed).map(Self::Fixed),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::Percent(40)
    }
}
