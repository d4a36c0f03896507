use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::sync::Arc;

use crate::options::SearchOptions;
use crate::theme::ColorTheme;

/// Trait for the finder's TUI widgets
pub trait SearchWidget: Sized {
    /// Create a widget from options and theme
    fn from_options(options: &SearchOptions, theme: Arc<ColorTheme>) -> Self;

    /// Render the widget to the buffer
    fn render(&mut self, area: Rect, buf: &mut Buffer);
}
