//! Module containing the finder's entry point
use std::io::Stderr;
use std::sync::Arc;

use color_eyre::eyre::{self, OptionExt, Result};
use tokio::{runtime::Handle, select, task::block_in_place};

use crate::opener::{Opener, SystemOpener};
use crate::search::{GitHubGateway, SearchGateway};
use crate::theme::ColorTheme;
use crate::tui::{App, Size, Tui};
use crate::SearchOptions;

/// What the finder leaves behind once the user quits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderOutput {
    /// The query as typed when quitting
    pub query: String,
    /// URLs opened during the session, in commit order
    pub opened: Vec<String>,
}

/// Hosts the search widget in a terminal
pub struct Finder<Backend = ratatui::backend::CrosstermBackend<Stderr>>
where
    Backend: ratatui::backend::Backend,
    Backend::Error: Send + Sync + 'static,
{
    app: App,
    tui: Option<Tui<Backend>>,
    height: Size,
    mouse: bool,
}

impl Finder {
    /// Runs the finder against the GitHub API until the user quits
    ///
    /// Uses the current tokio runtime when there is one (it must be multi-threaded),
    /// otherwise starts its own.
    pub fn run_with(options: SearchOptions) -> Result<FinderOutput> {
        trace!("running finder");
        let gateway = Arc::new(GitHubGateway::from_options(&options)?);
        let mut finder = Self::init(&options, gateway, Box::new(SystemOpener))?;
        finder.init_tui()?;

        let task = async {
            finder.enter()?;
            finder.run().await?;
            eyre::Ok(())
        };
        if let Ok(handle) = Handle::try_current() {
            block_in_place(|| handle.block_on(task))?;
        } else {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(task)?;
        }

        let output = finder.output();
        debug!("output: {output:?}");
        Ok(output)
    }

    /// Initialize the TUI with the default crossterm backend, but do not enter it yet
    pub fn init_tui(&mut self) -> Result<()> {
        let backend = ratatui::backend::CrosstermBackend::new(std::io::stderr());
        self.tui = Some(Tui::new_with_height(backend, self.height, self.mouse)?);
        Ok(())
    }
}

impl<Backend: ratatui::backend::Backend + 'static> Finder<Backend>
where
    Backend::Error: Send + Sync + 'static,
{
    /// Initialize the finder, without starting anything yet
    pub fn init(options: &SearchOptions, gateway: Arc<dyn SearchGateway>, opener: Box<dyn Opener>) -> Result<Self> {
        let height = Size::try_from(options.height.as_str())?;
        let theme = Arc::new(ColorTheme::init_from_options(options));
        let app = App::from_options(options, theme, gateway, opener);
        Ok(Self {
            app,
            tui: None,
            height,
            mouse: !options.no_mouse,
        })
    }

    /// Initialize the TUI with a caller-provided instance
    ///
    /// Use this instead of [`init_tui()`](Finder::init_tui) when you need a
    /// non-default backend (e.g. `TestBackend`).
    pub fn init_tui_with(&mut self, tui: Tui<Backend>) {
        self.tui = Some(tui);
    }

    /// Returns a shared reference to the application state.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Returns a mutable reference to the application state.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Returns a mutable reference to the TUI, if initialized
    pub fn tui_mut(&mut self) -> Result<&mut Tui<Backend>> {
        self.tui.as_mut().ok_or_eyre("TUI is not initialized")
    }

    /// Borrows the application state and the TUI at the same time
    ///
    /// Needed to feed events to [`App::handle_event`] outside of [`run()`](Finder::run).
    pub fn app_and_tui(&mut self) -> Result<(&mut App, &mut Tui<Backend>)> {
        let tui = self.tui.as_mut().ok_or_eyre("TUI is not initialized")?;
        Ok((&mut self.app, tui))
    }

    /// Enter the TUI and focus the input
    pub fn enter(&mut self) -> Result<()> {
        debug!("Entering TUI");
        self.tui
            .as_mut()
            .ok_or_eyre("TUI needs to be initialized using Finder::init_tui before entering")?
            .enter()?;
        self.app.on_focus();
        Ok(())
    }

    /// Process a single event loop iteration.
    ///
    /// Waits for the next terminal event or fetch completion and applies it.
    /// Returns `Ok(true)` once the finder should quit.
    pub async fn tick(&mut self) -> Result<bool> {
        let tui = self
            .tui
            .as_mut()
            .ok_or_eyre("TUI should be initialized before the event loop can start")?;
        select! {
            event = tui.next() => {
                let evt = event.ok_or_eyre("Could not acquire next event")?;
                self.app.handle_event(tui, &evt)?;
            }
            Some(outcome) = self.app.next_outcome() => {
                self.app.apply_outcome(outcome);
            }
        }
        Ok(self.app.should_quit)
    }

    /// Run the event loop on the current task until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        trace!("Starting event loop");
        loop {
            if self.tick().await? {
                break Ok(());
            }
        }
    }

    /// Capture `self` and extract the output
    /// This will restore the terminal
    pub fn output(mut self) -> FinderOutput {
        if let Some(mut tui) = self.tui.take()
            && let Err(e) = tui.exit()
        {
            warn!("failed to restore the terminal: {e}");
        }
        FinderOutput {
            query: self.app.query().to_string(),
            opened: std::mem::take(&mut self.app.opened),
        }
    }
}
