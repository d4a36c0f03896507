use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::widgets::{Clear, List, ListItem, Paragraph, Widget};

use crate::{
    SearchOptions,
    search::{RepositoryResult, SearchResult, UserResult},
    theme::ColorTheme,
    tui::widget::SearchWidget,
};

/// Widget for the dropdown below the input
///
/// Shows either the result rows or a single message line (hint, loading,
/// error, empty state). The viewport only scrolls through [`ResultList::ensure_visible`].
pub struct ResultList {
    pub(crate) items: Vec<SearchResult>,
    /// Highlighted row, mirrored from the app before rendering
    pub(crate) current: Option<usize>,
    pub(crate) offset: usize,
    pub(crate) height: u16,
    pub(crate) message: Option<Line<'static>>,
    pub(crate) theme: Arc<ColorTheme>,
    selector_icon: String,
}

impl Default for ResultList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            offset: 0,
            height: 0,
            message: None,
            theme: Arc::new(ColorTheme::default()),
            selector_icon: String::from("> "),
        }
    }
}

impl ResultList {
    /// Replaces the rows, scrolling back to the top when they changed
    pub fn set_items(&mut self, items: &[SearchResult]) {
        if self.items != items {
            self.items = items.to_vec();
            self.offset = 0;
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Scrolls by the minimum amount that makes `index` visible
    pub fn ensure_visible(&mut self, index: usize) {
        let height = self.height as usize;
        if index < self.offset {
            self.offset = index;
        } else if height > 0 && index >= self.offset + height {
            self.offset = index + 1 - height;
        }
        trace!("ensure_visible({index}): offset {}", self.offset);
    }

    /// Row index under the given line of the list area
    pub fn row_at(&self, line: u16) -> Option<usize> {
        if self.message.is_some() || line >= self.height {
            return None;
        }
        let index = self.offset + line as usize;
        (index < self.items.len()).then_some(index)
    }

    fn row<'a>(&'a self, item: &'a SearchResult) -> Vec<Span<'a>> {
        match item {
            SearchResult::User(user) => user_row(user, &self.theme),
            SearchResult::Repository(repo) => repository_row(repo, &self.theme),
        }
    }
}

fn user_row<'a>(user: &'a UserResult, theme: &ColorTheme) -> Vec<Span<'a>> {
    vec![Span::styled(format!("@{}", user.name), theme.normal)]
}

fn repository_row<'a>(repo: &'a RepositoryResult, theme: &ColorTheme) -> Vec<Span<'a>> {
    let mut spans = vec![];
    if let Some(owner) = &repo.owner {
        spans.push(Span::styled(format!("{owner}/"), theme.normal));
    }
    spans.push(Span::styled(repo.name.as_str(), theme.normal));
    spans.push(Span::styled(format!("  ★ {}  ⑂ {}", repo.stars, repo.forks), theme.meta));
    if let Some(language) = &repo.language {
        spans.push(Span::styled(format!("  {language}"), theme.meta));
    }
    if let Some(description) = &repo.description {
        spans.push(Span::styled(format!("  {description}"), theme.description));
    }
    spans
}

impl SearchWidget for ResultList {
    fn from_options(_options: &SearchOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.height = area.height;
        Widget::render(Clear, area, buf);

        if let Some(message) = &self.message {
            Paragraph::new(message.clone())
                .style(self.theme.normal)
                .render(area, buf);
            return;
        }

        let max_offset = self.items.len().saturating_sub(area.height as usize);
        self.offset = self.offset.min(max_offset);

        let this = &*self;
        let blank = " ".repeat(this.selector_icon.chars().count());
        let list = List::new(
            this.items
                .iter()
                .enumerate()
                .skip(this.offset)
                .take(area.height as usize)
                .map(|(idx, item)| {
                    let is_current = this.current == Some(idx);
                    let mut spans = Vec::with_capacity(6);
                    spans.push(if is_current {
                        Span::styled(this.selector_icon.as_str(), this.theme.cursor)
                    } else {
                        Span::raw(blank.clone())
                    });
                    spans.extend(this.row(item));
                    let line = Line::from(spans);
                    if is_current {
                        ListItem::new(line.patch_style(this.theme.current))
                    } else {
                        ListItem::new(line)
                    }
                })
                .collect::<Vec<ListItem>>(),
        )
        .style(this.theme.normal);

        Widget::render(list, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                UserResult {
                    id: format!("user-{i}"),
                    name: format!("user{i}"),
                    url: format!("https://github.com/user{i}"),
                    avatar: None,
                }
                .into()
            })
            .collect()
    }

    fn list(n: usize, height: u16) -> ResultList {
        let mut list = ResultList::default();
        list.set_items(&users(n));
        list.height = height;
        list
    }

    #[test]
    fn ensure_visible_scrolls_to_nearest_edge() {
        let mut list = list(20, 5);
        list.ensure_visible(3);
        assert_eq!(list.offset, 0);
        list.ensure_visible(7);
        assert_eq!(list.offset, 3);
        list.ensure_visible(5);
        assert_eq!(list.offset, 3);
        list.ensure_visible(1);
        assert_eq!(list.offset, 1);
    }

    #[test]
    fn row_at_accounts_for_offset() {
        let mut list = list(8, 5);
        assert_eq!(list.row_at(0), Some(0));
        list.ensure_visible(7);
        assert_eq!(list.row_at(0), Some(3));
        assert_eq!(list.row_at(4), Some(7));
        assert_eq!(list.row_at(5), None);
    }

    #[test]
    fn new_items_reset_scroll() {
        let mut list = list(20, 5);
        list.ensure_visible(10);
        list.set_items(&users(20));
        assert_eq!(list.offset, 6);
        list.set_items(&users(4));
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn renders_rows_with_pointer() {
        let mut list = list(3, 3);
        list.current = Some(1);
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);
        let line = |y: u16| {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        };
        assert_eq!(line(0), "  @user0");
        assert_eq!(line(1), "> @user1");
    }

    #[test]
    fn repository_row_layout() {
        let theme = ColorTheme::default();
        let repo = RepositoryResult {
            id: "repo-1".into(),
            name: "hello".into(),
            url: "https://github.com/octo/hello".into(),
            owner: Some("octo".into()),
            description: Some("Hi".into()),
            stars: 12,
            forks: 3,
            language: None,
            ..Default::default()
        };
        let text: String = repository_row(&repo, &theme).iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "octo/hello  ★ 12  ⑂ 3  Hi");
    }
}
