use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};
use unicode_display_width::width as display_width;

use crate::tui::widget::SearchWidget;
use crate::{SearchOptions, theme::ColorTheme};

const SPINNER_DURATION: u32 = 200;
const SPINNERS_UNICODE: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// The search field: prompt, editable query and a status on the right
pub struct Input {
    pub prompt: String,
    value: String,
    /// Byte offset of the caret, always on a char boundary
    cursor: usize,
    pub theme: Arc<ColorTheme>,
    /// Start of the current loading phase, `None` when idle
    pub spinner_start: Option<Instant>,
    /// Right-aligned status (result count)
    pub status: String,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            prompt: String::from("> "),
            value: String::default(),
            cursor: 0,
            theme: Arc::new(ColorTheme::default()),
            spinner_start: None,
            status: String::default(),
        }
    }
}

impl Input {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the whole query and moves the caret to its end
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.value.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor..].chars().next().map(|c| self.cursor + c.len_utf8())
    }

    /// Deletes the character before the caret
    pub fn delete_backward(&mut self) -> Option<char> {
        let pos = self.prev_boundary()?;
        self.cursor = pos;
        Some(self.value.remove(pos))
    }

    /// Deletes the character under the caret
    pub fn delete_forward(&mut self) -> Option<char> {
        self.next_boundary()?;
        Some(self.value.remove(self.cursor))
    }

    pub fn move_backward(&mut self) {
        if let Some(pos) = self.prev_boundary() {
            self.cursor = pos;
        }
    }

    pub fn move_forward(&mut self) {
        if let Some(pos) = self.next_boundary() {
            self.cursor = pos;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn kill_line(&mut self) -> String {
        self.value.split_off(self.cursor)
    }

    pub fn delete_to_beginning(&mut self) -> String {
        let deleted: String = self.value.drain(..self.cursor).collect();
        self.cursor = 0;
        deleted
    }

    /// Unix word rubout: deletes back to the previous whitespace
    pub fn delete_backward_to_whitespace(&mut self) -> String {
        let head = &self.value[..self.cursor];
        let trimmed = head.trim_end_matches(char::is_whitespace);
        let start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let deleted: String = self.value.drain(start..self.cursor).collect();
        self.cursor = start;
        deleted
    }

    /// Display column of the caret, prompt included
    pub fn cursor_pos(&self) -> u16 {
        let width = display_width(&self.prompt) + display_width(&self.value[..self.cursor]);
        u16::try_from(width).unwrap_or(u16::MAX)
    }

    fn spinner(&self) -> Option<char> {
        let start = self.spinner_start?;
        let elapsed = start.elapsed().as_millis();
        let index = ((elapsed / (SPINNER_DURATION as u128)) % (SPINNERS_UNICODE.len() as u128)) as usize;
        Some(SPINNERS_UNICODE[index])
    }
}

impl SearchWidget for Input {
    fn from_options(options: &SearchOptions, theme: Arc<ColorTheme>) -> Self {
        let mut res = Self {
            prompt: options.prompt.clone(),
            theme,
            ..Default::default()
        };
        res.set_value(options.query.as_deref().unwrap_or_default());
        res
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(&self.prompt, self.theme.prompt),
            Span::styled(&self.value, self.theme.query),
        ];
        let mut right = String::new();
        if let Some(spinner) = self.spinner() {
            right.push(spinner);
            if !self.status.is_empty() {
                right.push(' ');
            }
        }
        right.push_str(&self.status);

        if !right.is_empty() {
            let used = display_width(&self.prompt) + display_width(&self.value) + display_width(&right);
            let padding = (area.width as u64).saturating_sub(used).max(1);
            spans.push(Span::raw(" ".repeat(usize::try_from(padding).unwrap_or(1))));
            spans.push(Span::styled(right, self.theme.info));
        }

        Paragraph::new(Line::from(spans))
            .style(self.theme.normal)
            .render(area, buf);
    }
}

impl Deref for Input {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(value: &str) -> Input {
        let mut input = Input::default();
        input.set_value(value);
        input
    }

    #[test]
    fn editing_respects_char_boundaries() {
        let mut input = input("café");
        assert_eq!(input.delete_backward(), Some('é'));
        input.insert('ë');
        assert_eq!(input.value(), "cafë");
        input.move_backward();
        input.move_backward();
        assert_eq!(input.delete_forward(), Some('f'));
        assert_eq!(input.value(), "caë");
        input.move_to_start();
        assert_eq!(input.delete_backward(), None);
        input.move_to_end();
        assert_eq!(input.delete_forward(), None);
    }

    #[test]
    fn line_kills() {
        let mut input = input("octo cat");
        input.move_to_start();
        for _ in 0..4 {
            input.move_forward();
        }
        assert_eq!(input.kill_line(), " cat");
        assert_eq!(input.value(), "octo");

        let mut input = self::input("octo cat");
        input.move_backward();
        assert_eq!(input.delete_to_beginning(), "octo ca");
        assert_eq!(input.value(), "t");
    }

    #[test]
    fn word_rubout() {
        let mut input = input("rust lang  ");
        assert_eq!(input.delete_backward_to_whitespace(), "lang  ");
        assert_eq!(input.value(), "rust ");
        assert_eq!(input.delete_backward_to_whitespace(), "rust ");
        assert_eq!(input.value(), "");
    }

    #[test]
    fn cursor_column_includes_prompt() {
        let mut input = input("日本");
        assert_eq!(input.cursor_pos(), 2 + 4);
        input.move_backward();
        assert_eq!(input.cursor_pos(), 2 + 2);
    }
}
