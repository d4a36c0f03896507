#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use futures::FutureExt as _;
use futures::future::BoxFuture;
use ghsearch::prelude::*;
use ratatui::backend::TestBackend;

/// Far enough in the future for any pending query to have settled
pub const PAST_DEBOUNCE: Duration = Duration::from_millis(1000);

//------------------------------------------------------------------------------
// Fixtures

pub fn user(login: &str) -> UserResult {
    UserResult {
        id: format!("user-{login}"),
        name: login.to_string(),
        url: format!("https://github.com/{login}"),
        avatar: Some(format!("https://avatars.example/{login}")),
    }
}

pub fn repo(owner: &str, name: &str) -> RepositoryResult {
    RepositoryResult {
        id: format!("repo-{owner}-{name}"),
        name: name.to_string(),
        url: format!("https://github.com/{owner}/{name}"),
        owner: Some(owner.to_string()),
        owner_avatar: None,
        description: None,
        stars: 0,
        forks: 0,
        language: None,
    }
}

pub fn names(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(SearchResult::name).collect()
}

//------------------------------------------------------------------------------
// Mock gateway

#[derive(Default)]
struct MockState {
    accounts: Mutex<HashMap<String, GatewayResult<UserResult>>>,
    repositories: Mutex<HashMap<String, GatewayResult<RepositoryResult>>>,
    calls: Mutex<Vec<(Operation, String)>>,
    account_calls: AtomicUsize,
    repository_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// In-memory gateway answering from canned per-query responses
///
/// Unknown queries answer with an empty list. Every call is recorded.
#[derive(Default, Clone)]
pub struct MockGateway {
    state: Arc<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(self, query: &str, rows: Vec<UserResult>) -> Self {
        self.state.accounts.lock().unwrap().insert(query.to_string(), Ok(rows));
        self
    }

    pub fn repositories(self, query: &str, rows: Vec<RepositoryResult>) -> Self {
        self.state.repositories.lock().unwrap().insert(query.to_string(), Ok(rows));
        self
    }

    pub fn fail_accounts(self, query: &str, err: RemoteSearchError) -> Self {
        self.state.accounts.lock().unwrap().insert(query.to_string(), Err(err));
        self
    }

    pub fn fail_repositories(self, query: &str, err: RemoteSearchError) -> Self {
        self.state.repositories.lock().unwrap().insert(query.to_string(), Err(err));
        self
    }

    /// Every call sleeps this long before answering
    pub fn delay(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn account_calls(&self) -> usize {
        self.state.account_calls.load(Ordering::SeqCst)
    }

    pub fn repository_calls(&self) -> usize {
        self.state.repository_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.account_calls() + self.repository_calls()
    }

    /// Number of calls issued for `query`, both operations together
    pub fn calls_for(&self, query: &str) -> usize {
        self.state.calls.lock().unwrap().iter().filter(|(_, q)| q == query).count()
    }

    fn record(&self, operation: Operation, query: &str) -> Option<Duration> {
        match operation {
            Operation::Accounts => self.state.account_calls.fetch_add(1, Ordering::SeqCst),
            Operation::Repositories => self.state.repository_calls.fetch_add(1, Ordering::SeqCst),
        };
        self.state.calls.lock().unwrap().push((operation, query.to_string()));
        *self.state.delay.lock().unwrap()
    }
}

impl SearchGateway for MockGateway {
    fn search_accounts<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<UserResult>> {
        let delay = self.record(Operation::Accounts, query);
        let answer = self.state.accounts.lock().unwrap().get(query).cloned();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            answer.unwrap_or_else(|| Ok(Vec::new()))
        }
        .boxed()
    }

    fn search_repositories<'a>(&'a self, query: &'a str) -> BoxFuture<'a, GatewayResult<RepositoryResult>> {
        let delay = self.record(Operation::Repositories, query);
        let answer = self.state.repositories.lock().unwrap().get(query).cloned();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            answer.unwrap_or_else(|| Ok(Vec::new()))
        }
        .boxed()
    }
}

//------------------------------------------------------------------------------
// Recording opener

/// Records opened URLs instead of launching a browser
#[derive(Default, Clone)]
pub struct RecordingOpener {
    urls: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Opener for RecordingOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

//------------------------------------------------------------------------------
// Harness

/// Drives a [`Finder<TestBackend>`] synchronously
///
/// Events go through the TUI channel and `App::handle_event`, like in the real
/// event loop. Fetches run on a current-thread runtime, so they only make
/// progress while the harness waits for them.
pub struct TestHarness {
    pub finder: Finder<TestBackend>,
    pub runtime: tokio::runtime::Runtime,
    pub gateway: MockGateway,
    pub opener: RecordingOpener,
}

impl TestHarness {
    pub fn new(gateway: MockGateway) -> Result<Self> {
        Self::with_options(SearchOptions::default(), gateway, 60, 12)
    }

    pub fn with_options(options: SearchOptions, gateway: MockGateway, width: u16, height: u16) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let opener = RecordingOpener::default();
        let mut finder = Finder::init(&options.build(), Arc::new(gateway.clone()), Box::new(opener.clone()))?;
        let tui = Tui::new_with_height(TestBackend::new(width, height), Size::Percent(100), false)?;
        finder.init_tui_with(tui);
        Ok(Self {
            finder,
            runtime,
            gateway,
            opener,
        })
    }

    pub fn app(&self) -> &App {
        self.finder.app()
    }

    /// Processes every queued TUI event, including the ones queued while processing
    pub fn tick(&mut self) -> Result<()> {
        let _guard = self.runtime.enter();
        loop {
            let mut events = Vec::new();
            while let Ok(event) = self.finder.tui_mut()?.event_rx.try_recv() {
                events.push(event);
            }
            if events.is_empty() {
                break;
            }
            for event in events {
                let (app, tui) = self.finder.app_and_tui()?;
                app.handle_event(tui, &event)?;
            }
        }
        Ok(())
    }

    pub fn send(&mut self, event: Event) -> Result<()> {
        self.finder.tui_mut()?.event_tx.send(event)?;
        self.tick()
    }

    pub fn key(&mut self, code: KeyCode) -> Result<()> {
        self.send(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    pub fn ctrl(&mut self, c: char) -> Result<()> {
        self.send(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)))
    }

    pub fn type_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.key(KeyCode::Char(c))?;
        }
        Ok(())
    }

    /// Lets the debounce delay pass without waiting for the calls it issues
    pub fn settle_only(&mut self) {
        let _guard = self.runtime.enter();
        self.finder.app_mut().tick(Instant::now() + PAST_DEBOUNCE);
    }

    /// Lets the debounce delay pass and waits until the settled query stopped fetching
    pub fn settle(&mut self) -> Result<()> {
        self.settle_only();
        self.wait_for_fetches()
    }

    /// Types `text` into an empty input and settles it
    pub fn search(&mut self, text: &str) -> Result<()> {
        self.ctrl('u')?;
        self.type_str(text)?;
        self.settle()
    }

    pub fn wait_for_fetches(&mut self) -> Result<()> {
        while self.finder.app().view().is_fetching {
            let app = self.finder.app_mut();
            let outcome = self
                .runtime
                .block_on(async { tokio::time::timeout(Duration::from_secs(5), app.next_outcome()).await })?
                .ok_or_else(|| eyre!("outcome channel closed"))?;
            app.apply_outcome(outcome);
        }
        Ok(())
    }

    /// Renders a frame and returns the screen, one trimmed line per row
    pub fn render(&mut self) -> Result<String> {
        self.send(Event::Render)?;
        let buf = self.finder.tui_mut()?.backend().buffer().clone();
        let area = buf.area;
        let lines: Vec<String> = (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();
        Ok(lines.join("\n").trim_end().to_string())
    }
}
