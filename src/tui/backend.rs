use std::ops::{Deref, DerefMut};
use std::sync::Once;

use color_eyre::eyre::{Result, eyre};
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste, EnableFocusChange,
    EnableMouseCapture, KeyEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{self, cursor};
use futures::{FutureExt as _, StreamExt as _};
use ratatui::prelude::Backend;
use ratatui::{TerminalOptions, Viewport};
use tokio::sync::mpsc::unbounded_channel;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{Event, Size};

/// Heartbeats per second; bounds how late a settled query is noticed
const TICK_RATE: f64 = 20.;
/// Renders per second while idle, keeps the spinner moving
const FRAME_RATE: f64 = 10.;
static PANIC_HOOK_SET: Once = Once::new();

/// Terminal handle of the finder
pub struct Tui<B: Backend = ratatui::backend::CrosstermBackend<std::io::Stderr>> {
    /// The ratatui terminal instance
    pub terminal: ratatui::Terminal<B>,
    /// Background task handle for event polling
    pub task: Option<JoinHandle<()>>,
    /// Receiver for TUI events
    pub event_rx: UnboundedReceiver<Event>,
    /// Sender for TUI events
    pub event_tx: UnboundedSender<Event>,
    cancellation_token: CancellationToken,
    /// Alternate screen instead of an inline viewport
    pub is_fullscreen: bool,
    pub mouse: bool,
}

impl<B: Backend> Tui<B> {
    /// Creates a new TUI with the specified backend and height
    pub fn new_with_height(backend: B, height: Size, mouse: bool) -> Result<Self> {
        let event_channel = unbounded_channel();

        let term_height = backend.size().map_err(backend_error)?.height;
        let lines = match height {
            Size::Percent(100) => None,
            Size::Fixed(lines) => Some(lines.min(term_height)),
            Size::Percent(p) => Some(term_height * p / 100),
        };
        let viewport = match lines {
            Some(lines) => Viewport::Inline(lines.max(2)),
            None => Viewport::Fullscreen,
        };

        set_panic_hook();
        Ok(Self {
            terminal: ratatui::Terminal::with_options(backend, TerminalOptions { viewport }).map_err(backend_error)?,
            task: None,
            event_rx: event_channel.1,
            event_tx: event_channel.0,
            cancellation_token: CancellationToken::default(),
            is_fullscreen: lines.is_none(),
            mouse,
        })
    }

    /// Enters the TUI by enabling raw mode and starting event handling
    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stderr(), EnableFocusChange, EnableBracketedPaste)?;
        if self.mouse {
            crossterm::execute!(std::io::stderr(), EnableMouseCapture)?;
        }
        if self.is_fullscreen {
            crossterm::execute!(std::io::stderr(), EnterAlternateScreen)?;
        }
        self.start();
        Ok(())
    }

    /// Exits the TUI by stopping event handling and disabling raw mode
    pub fn exit(&mut self) -> Result<()> {
        self.cancellation_token.cancel();
        if crossterm::terminal::is_raw_mode_enabled()? {
            // The inline viewport is wiped so the shell prompt comes back where it was
            if !self.is_fullscreen {
                self.terminal.clear().map_err(backend_error)?;
                let area = self.get_frame().area();
                self.set_cursor_position(ratatui::layout::Position { x: area.x, y: area.y })
                    .map_err(backend_error)?;
            }
            self.flush().map_err(backend_error)?;
            crossterm::execute!(
                std::io::stderr(),
                DisableMouseCapture,
                DisableFocusChange,
                DisableBracketedPaste,
                cursor::Show
            )?;
            if self.is_fullscreen {
                crossterm::execute!(std::io::stderr(), LeaveAlternateScreen)?;
            }
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Spawns the pump forwarding terminal input, heartbeats and render requests
    fn start(&mut self) {
        let tick_delay = std::time::Duration::from_secs_f64(1.0 / TICK_RATE);
        let render_delay = std::time::Duration::from_secs_f64(1.0 / FRAME_RATE);
        let tx = self.event_tx.clone();
        if let Some(task) = self.task.take() {
            self.cancellation_token.cancel();
            task.abort();
            self.cancellation_token = CancellationToken::default();
        }
        let token = self.cancellation_token.clone();
        self.task = Some(tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            let mut render_interval = tokio::time::interval(render_delay);
            loop {
                let tick_delay = tick_interval.tick();
                let render_delay = render_interval.tick();
                let crossterm_event = reader.next().fuse();
                tokio::select! {
                    _ = token.cancelled() => {
                        break;
                    }
                    maybe_event = crossterm_event => {
                        let event = match maybe_event {
                            Some(Ok(crossterm::event::Event::Key(key))) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            Some(Ok(crossterm::event::Event::Mouse(mouse))) => Some(Event::Mouse(mouse)),
                            Some(Ok(crossterm::event::Event::FocusGained)) => Some(Event::FocusGained),
                            Some(Ok(crossterm::event::Event::FocusLost)) => Some(Event::FocusLost),
                            Some(Ok(crossterm::event::Event::Paste(text))) => Some(Event::Paste(text)),
                            Some(Ok(crossterm::event::Event::Resize(_, _))) => Some(Event::Resize),
                            Some(Err(e)) => Some(Event::Error(e.to_string())),
                            None | Some(Ok(_)) => None,
                        };
                        if let Some(event) = event {
                            _ = tx.send(event);
                        }
                    },
                    _ = tick_delay => {
                        _ = tx.send(Event::Heartbeat);
                    },
                    _ = render_delay => {
                        _ = tx.send(Event::Render);
                    },
                }
            }
        }));
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }
}

impl<B: Backend> Deref for Tui<B> {
    type Target = ratatui::Terminal<B>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl<B: Backend> DerefMut for Tui<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl<B: Backend> Drop for Tui<B> {
    fn drop(&mut self) {
        if let Some(t) = self.task.take() {
            t.abort();
        }
        if let Err(e) = self.exit() {
            warn!("failed to restore the terminal: {e}");
        }
    }
}

fn backend_error(e: impl std::fmt::Display) -> color_eyre::Report {
    eyre!("terminal backend error: {e}")
}

fn set_panic_hook() {
    PANIC_HOOK_SET.call_once(|| {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            ratatui::restore();
            hook(panic_info);
        }));
    });
}
