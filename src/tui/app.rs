use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::prelude::Backend;
use ratatui::text::Line;
use ratatui::widgets::{Clear, Widget};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

use crate::binds::KeyMap;
use crate::debounce::Debouncer;
use crate::opener::Opener;
use crate::query::{FetchOutcome, OrchestratorOptions, QueryOrchestrator, spawn_fetch};
use crate::search::{RemoteSearchError, SearchGateway, SearchResult};
use crate::theme::ColorTheme;
use crate::tui::widget::SearchWidget;
use crate::{SearchOptions, options::DEFAULT_FALLBACK_ERROR};

use super::Event;
use super::Tui;
use super::event::Action;
use super::input::Input;
use super::item_list::ResultList;

/// What the dropdown below the input currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownView {
    /// The widget is not focused
    Hidden,
    /// The settled query is below the minimum length
    TooShort,
    /// Waiting for the first answer of the current query
    Searching,
    /// Result rows, possibly stale while a refresh is in flight
    Results,
    /// The message of the failure
    Error(String),
    /// Both searches succeeded without rows
    NoResults(String),
}

/// Read-only state for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView<'a> {
    /// Merged rows of the settled query
    pub results: &'a [SearchResult],
    /// Highlighted row, `None` when nothing is highlighted
    pub selected_index: Option<usize>,
    /// Whether the widget has input focus
    pub focused: bool,
    /// Whether a call for the settled query is in flight
    pub is_fetching: bool,
    /// Failure of the settled query
    pub error: Option<&'a RemoteSearchError>,
    /// The query the results belong to
    pub debounced_query: &'a str,
    /// Derived dropdown content
    pub dropdown: DropdownView,
}

/// The search-as-you-type widget's state machine
///
/// Raw input is debounced into a settled query, which is handed to the
/// [`QueryOrchestrator`]. Fetches run as tokio tasks and report back through
/// [`App::next_outcome`] / [`App::apply_outcome`].
#[derive(derive_more::Debug)]
pub struct App {
    #[debug(skip)]
    pub(crate) input: Input,
    #[debug(skip)]
    pub(crate) item_list: ResultList,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    /// Key bindings
    pub keymap: KeyMap,
    /// Whether the host should quit
    pub should_quit: bool,
    /// Terminal cursor position (x, y)
    pub cursor_pos: (u16, u16),
    /// URLs opened so far, in commit order
    pub opened: Vec<String>,

    debouncer: Debouncer,
    #[debug("{:?}", orchestrator.query())]
    orchestrator: QueryOrchestrator,
    #[debug(skip)]
    gateway: Arc<dyn SearchGateway>,
    #[debug(skip)]
    opener: Box<dyn Opener>,
    #[debug(skip)]
    outcome_tx: UnboundedSender<FetchOutcome>,
    #[debug(skip)]
    outcome_rx: UnboundedReceiver<FetchOutcome>,
    cancel: CancellationToken,

    focused: bool,
    selected_index: Option<usize>,
    was_fetching: bool,
    min_query_length: usize,
    fallback_error: String,

    input_area: Rect,
    list_area: Rect,
    dropdown_area: Rect,
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [input_area, list_area] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
        let dropdown = self.dropdown_view();

        self.input.status = match dropdown {
            DropdownView::Results => format!("{}/{}", self.selected_index.map_or(0, |i| i + 1), self.rows().len()),
            _ => String::new(),
        };
        self.input.render(input_area, buf);

        self.item_list.current = self.selected_index;
        self.item_list.message = match &dropdown {
            DropdownView::Hidden | DropdownView::Results => None,
            DropdownView::TooShort => Some(Line::styled(
                format!("Type at least {} characters to search", self.min_query_length),
                self.theme.info,
            )),
            DropdownView::Searching => Some(Line::styled("Searching…", self.theme.info)),
            DropdownView::Error(message) => Some(Line::styled(message.clone(), self.theme.error)),
            DropdownView::NoResults(query) => Some(Line::styled(
                format!("No results found for \"{query}\""),
                self.theme.info,
            )),
        };

        let used = match dropdown {
            DropdownView::Hidden => {
                self.item_list.height = list_area.height;
                Widget::render(Clear, list_area, buf);
                0
            }
            DropdownView::Results => {
                self.item_list.render(list_area, buf);
                self.item_list.count().min(list_area.height as usize) as u16
            }
            _ => {
                self.item_list.render(list_area, buf);
                1.min(list_area.height)
            }
        };

        self.input_area = input_area;
        self.list_area = list_area;
        self.dropdown_area = Rect { height: used, ..list_area };
        self.cursor_pos = (input_area.x + self.input.cursor_pos(), input_area.y);
    }
}

impl App {
    /// Creates the widget, unfocused, with the options' initial query pending
    pub fn from_options(
        options: &SearchOptions,
        theme: Arc<ColorTheme>,
        gateway: Arc<dyn SearchGateway>,
        opener: Box<dyn Opener>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        let delay = Duration::from_millis(options.debounce_ms);
        let initial = options.query.as_deref().unwrap_or_default();
        let fallback_error = if options.fallback_error.trim().is_empty() {
            String::from(DEFAULT_FALLBACK_ERROR)
        } else {
            options.fallback_error.clone()
        };

        Self {
            input: Input::from_options(options, theme.clone()),
            item_list: ResultList::from_options(options, theme.clone()),
            theme,
            keymap: options.keymap.clone(),
            should_quit: false,
            cursor_pos: (0, 0),
            opened: Vec::new(),
            debouncer: Debouncer::with_initial(delay, initial),
            orchestrator: QueryOrchestrator::new(OrchestratorOptions::from(options)),
            gateway,
            opener,
            outcome_tx,
            outcome_rx,
            cancel: CancellationToken::new(),
            focused: false,
            selected_index: None,
            was_fetching: false,
            min_query_length: options.min_query_length,
            fallback_error,
            input_area: Rect::default(),
            list_area: Rect::default(),
            dropdown_area: Rect::default(),
        }
    }

    //------------------------------------------------------------------------------
    // Reads

    /// Snapshot for the presentation layer
    pub fn view(&self) -> AppView<'_> {
        let snapshot = self.orchestrator.snapshot();
        AppView {
            results: snapshot.rows(),
            selected_index: self.selected_index,
            focused: self.focused,
            is_fetching: snapshot.is_fetching,
            error: snapshot.error.as_ref(),
            debounced_query: self.orchestrator.query(),
            dropdown: self.dropdown_view(),
        }
    }

    /// Derives what the dropdown shows from focus and the settled query's status
    pub fn dropdown_view(&self) -> DropdownView {
        let snapshot = self.orchestrator.snapshot();
        if !self.focused {
            DropdownView::Hidden
        } else if self.orchestrator.query_too_short() {
            DropdownView::TooShort
        } else if let Some(err) = &snapshot.error {
            DropdownView::Error(err.user_message(&self.fallback_error).to_string())
        } else if !snapshot.rows().is_empty() {
            DropdownView::Results
        } else if snapshot.results.is_some() && !snapshot.is_fetching {
            DropdownView::NoResults(self.orchestrator.query().to_string())
        } else {
            DropdownView::Searching
        }
    }

    /// The query as typed
    pub fn query(&self) -> &str {
        self.input.value()
    }

    /// The settled query
    pub fn debounced_query(&self) -> &str {
        self.orchestrator.query()
    }

    /// Whether the widget has input focus
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Highlighted row
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// The orchestrator, for inspection
    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.orchestrator
    }

    fn rows(&self) -> &[SearchResult] {
        self.orchestrator.snapshot().rows()
    }

    fn accepts_commands(&self) -> bool {
        self.focused && !self.rows().is_empty() && !self.orchestrator.snapshot().is_fetching
    }

    //------------------------------------------------------------------------------
    // Host handlers

    /// Replaces the raw query; the settled query follows after the debounce delay
    pub fn on_query_change(&mut self, text: &str) {
        self.input.set_value(text);
        self.query_changed();
    }

    /// Maps a key through the keymap and applies the resulting actions
    ///
    /// Returns the events the host has to process (e.g. [`Event::Quit`]).
    pub fn on_key(&mut self, key: &KeyEvent) -> Vec<Event> {
        debug!("key event: {key:?}");
        let actions = match self.keymap.get(key) {
            Some(actions) => actions.clone(),
            None => match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char(c)) => vec![Action::AddChar(c)],
                (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                    vec![Action::AddChar(c.to_uppercase().next().unwrap_or(c))]
                }
                _ => vec![],
            },
        };
        actions.iter().flat_map(|act| self.handle_action(act)).collect()
    }

    /// Focuses the widget; never fetches by itself
    pub fn on_focus(&mut self) {
        if !self.focused {
            trace!("focus gained");
        }
        self.focused = true;
    }

    /// Highlights the row under the pointer
    pub fn on_result_hover(&mut self, index: usize) {
        if self.focused && index < self.rows().len() {
            self.selected_index = Some(index);
        }
    }

    /// Commits the row that was clicked
    pub fn on_result_commit(&mut self, index: usize) {
        if !self.focused {
            return;
        }
        if let Some(url) = self.rows().get(index).map(|r| r.url().to_string()) {
            self.commit(url);
        }
    }

    /// A pointer press outside the widget: back to idle, whatever is in flight
    pub fn on_click_outside(&mut self) {
        self.blur();
    }

    /// Settles the debounced query once its deadline passed and issues the calls it needs
    pub fn tick(&mut self, now: Instant) {
        self.debouncer.poll(now);
        if self.debouncer.settled() == self.orchestrator.query() {
            return;
        }
        let query = self.debouncer.settled().to_string();
        trace!("settled query: {query:?}");
        self.selected_index = None;
        for request in self.orchestrator.run_query(&query, now) {
            debug!("spawning {:?} for {:?}", request.operation, request.query);
            spawn_fetch(
                self.gateway.clone(),
                request,
                self.outcome_tx.clone(),
                self.cancel.child_token(),
            );
        }
        self.sync();
    }

    /// Folds a completed fetch into the state
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if self.orchestrator.complete(outcome, Instant::now()) {
            self.sync();
        }
    }

    /// Waits for the next completed fetch
    pub async fn next_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.recv().await
    }

    //------------------------------------------------------------------------------
    // Internals

    fn query_changed(&mut self) {
        self.on_focus();
        self.debouncer.on_input(self.input.value(), Instant::now());
    }

    fn blur(&mut self) {
        if self.focused {
            trace!("focus lost");
        }
        self.focused = false;
        self.selected_index = None;
    }

    fn commit(&mut self, url: String) {
        if url.is_empty() {
            warn!("highlighted result has no url, nothing to open");
        } else {
            debug!("commit {url}");
            if let Err(e) = self.opener.open(&url) {
                warn!("failed to open {url}: {e}");
            }
            self.opened.push(url);
        }
        self.blur();
    }

    /// Mirrors the snapshot into the widgets and resets the highlight once fetching ends
    fn sync(&mut self) {
        let fetching = self.orchestrator.snapshot().is_fetching;
        if self.was_fetching && !fetching {
            self.selected_index = None;
        }
        self.was_fetching = fetching;
        self.input.spinner_start = match (fetching, self.input.spinner_start) {
            (true, Some(start)) => Some(start),
            (true, None) => Some(Instant::now()),
            (false, _) => None,
        };
        let rows = self.orchestrator.snapshot().rows().to_vec();
        self.item_list.set_items(&rows);
    }

    fn move_down(&mut self, n: u16) {
        let last = self.rows().len() - 1;
        let n = n.max(1) as usize;
        let next = match self.selected_index {
            None => n - 1,
            Some(i) => i.saturating_add(n),
        }
        .min(last);
        self.select_by_keyboard(next);
    }

    fn move_up(&mut self, n: u16) {
        let next = match self.selected_index {
            None => 0,
            Some(i) => i.saturating_sub(n.max(1) as usize),
        };
        self.select_by_keyboard(next);
    }

    fn select_by_keyboard(&mut self, index: usize) {
        self.selected_index = Some(index);
        self.item_list.ensure_visible(index);
    }

    /// Applies one action, returning follow-up events for the host
    pub fn handle_action(&mut self, act: &Action) -> Vec<Event> {
        use Action::*;
        match act {
            Abort => {
                self.should_quit = true;
                return vec![Event::Quit];
            }
            AddChar(c) => {
                if !c.is_control() {
                    self.input.insert(*c);
                    self.query_changed();
                }
            }
            BackwardChar => self.input.move_backward(),
            BackwardDeleteChar => {
                if self.input.delete_backward().is_some() {
                    self.query_changed();
                }
            }
            BeginningOfLine => self.input.move_to_start(),
            Commit => {
                if self.accepts_commands()
                    && let Some(url) = self
                        .selected_index
                        .and_then(|i| self.rows().get(i))
                        .map(|r| r.url().to_string())
                {
                    self.commit(url);
                }
            }
            DeleteChar => {
                if self.input.delete_forward().is_some() {
                    self.query_changed();
                }
            }
            Dismiss => self.blur(),
            Down(n) => {
                if self.accepts_commands() {
                    self.move_down(*n);
                }
            }
            EndOfLine => self.input.move_to_end(),
            Focus => self.on_focus(),
            ForwardChar => self.input.move_forward(),
            Ignore => (),
            KillLine => {
                if !self.input.kill_line().is_empty() {
                    self.query_changed();
                }
            }
            SetQuery(query) => {
                self.input.set_value(query);
                self.query_changed();
            }
            UnixLineDiscard => {
                if !self.input.delete_to_beginning().is_empty() {
                    self.query_changed();
                }
            }
            UnixWordRubout => {
                if !self.input.delete_backward_to_whitespace().is_empty() {
                    self.query_changed();
                }
            }
            Up(n) => {
                if self.accepts_commands() {
                    self.move_up(*n);
                }
            }
        }
        Vec::new()
    }

    fn handle_paste(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if !text.is_empty() {
            self.input.insert_str(&text);
            self.query_changed();
        }
    }

    /// Handles a terminal mouse event against the last rendered layout
    pub fn handle_mouse(&mut self, mouse_event: &MouseEvent) -> Vec<Event> {
        let pos = Position {
            x: mouse_event.column,
            y: mouse_event.row,
        };
        let row_under = |app: &App| {
            app.dropdown_area
                .contains(pos)
                .then(|| app.item_list.row_at(pos.y - app.list_area.y))
                .flatten()
        };

        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.input_area.contains(pos) {
                    self.on_focus();
                } else if self.dropdown_area.contains(pos) {
                    if let Some(row) = row_under(self) {
                        self.on_result_commit(row);
                    }
                } else {
                    self.on_click_outside();
                }
            }
            MouseEventKind::Down(_) => {
                if !self.input_area.contains(pos) && !self.dropdown_area.contains(pos) {
                    self.on_click_outside();
                }
            }
            MouseEventKind::Moved => {
                if let Some(row) = row_under(self) {
                    self.on_result_hover(row);
                }
            }
            MouseEventKind::ScrollUp if self.list_area.contains(pos) => return self.handle_action(&Action::Up(1)),
            MouseEventKind::ScrollDown if self.list_area.contains(pos) => {
                return self.handle_action(&Action::Down(1));
            }
            _ => (),
        }
        Vec::new()
    }

    /// Handles one event of the terminal loop
    pub fn handle_event<B: Backend>(&mut self, tui: &mut Tui<B>, event: &Event) -> Result<()>
    where
        B::Error: Send + Sync + 'static,
    {
        let follow_up = match event {
            Event::Render | Event::Resize => {
                tui.draw(|f| {
                    f.render_widget(&mut *self, f.area());
                    if self.focused {
                        f.set_cursor_position(self.cursor_pos);
                    }
                })?;
                Vec::new()
            }
            Event::Heartbeat => {
                self.tick(Instant::now());
                Vec::new()
            }
            Event::Quit => {
                tui.exit()?;
                self.should_quit = true;
                Vec::new()
            }
            Event::Error(msg) => {
                tui.exit()?;
                bail!(msg.to_owned());
            }
            Event::Key(key) => self.on_key(key),
            Event::Paste(text) => {
                self.handle_paste(text);
                Vec::new()
            }
            Event::Mouse(mouse_event) => self.handle_mouse(mouse_event),
            Event::FocusGained => {
                trace!("terminal focus gained");
                Vec::new()
            }
            Event::FocusLost => {
                self.on_click_outside();
                Vec::new()
            }
            Event::Action(act) => self.handle_action(act),
        };
        for evt in follow_up {
            tui.event_tx.send(evt)?;
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
