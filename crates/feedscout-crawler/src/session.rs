use std::thread;
use std::time::Duration;

use thiserror::Error;

/// A browsing session driving a single view.
///
/// Authentication and cookie handling belong to the implementor, the crawler
/// only ever sees an already usable session.
pub trait Session {
    type Element: Element;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    fn current_location(&self) -> Result<String, SessionError>;

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError>;

    /// Current scrollable height of the view.
    fn scroll_extent(&mut self) -> Result<u64, SessionError>;

    /// Polls until at least one element matches `selector`.
    ///
    /// Returns [`SessionError::Timeout`] when nothing shows up in time.
    fn wait_for_elements(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, SessionError>;

    fn go_back(&mut self) -> Result<(), SessionError>;

    /// Lets lazily loaded content render.
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration)
    }
}

pub trait Element: Sized {
    fn find_child(&self, selector: &str) -> Result<Option<Self>, SessionError>;

    fn text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },

    #[error("Element not found: `{0}`")]
    NotFound(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Couldn't navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No previous view to go back to")]
    NoHistory,

    #[error("Session backend error: {0}")]
    Backend(String),
}

impl SessionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Restores the previous view when dropped, whatever happened in between.
pub struct ReturnGuard<'a, S: Session> {
    session: &'a mut S,
    pause: Duration,
}

impl<'a, S: Session> ReturnGuard<'a, S> {
    pub fn new(session: &'a mut S, pause: Duration) -> Self {
        Self { session, pause }
    }

    pub fn session(&mut self) -> &mut S {
        &mut *self.session
    }
}

impl<S: Session> Drop for ReturnGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.go_back() {
            log::error!("Couldn't navigate back to the previous view: {e}");
        }
        self.session.pause(self.pause);
    }
}
