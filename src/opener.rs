//! The commit side effect: opening a result's URL outside the widget.

use std::io;

/// Opens a URL in an external context
pub trait Opener: Send {
    /// Opens `url`; failures are reported, never retried
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Uses the platform's default handler (browser for `https://` URLs)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        debug!("opening {url}");
        open::that_detached(url)
    }
}
