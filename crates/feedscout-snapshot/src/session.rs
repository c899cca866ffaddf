use std::collections::HashMap;
use std::time::Duration;

use feedscout_crawler::{Session, SessionError};
use sws_scraper::Html;

use crate::element::{parse_selector, HtmlElement};

const BLANK: &str = "about:blank";

#[derive(Debug)]
struct Frame {
    html: Html,
    extent: u64,
}

#[derive(Debug)]
struct Page {
    frames: Vec<Frame>,
    lands_on: Option<String>,
}

#[derive(Debug, Clone)]
struct View {
    url: String,
    frame: usize,
}

/// Replays captured pages as if they were rendered by a browser.
///
/// Each page is a list of frames, frame `n` being the page after `n` scrolls.
/// Waiting never blocks: elements are either in the current frame or not.
#[derive(Debug, Default)]
pub struct SnapshotSession {
    pages: HashMap<String, Page>,
    current: Option<View>,
    history: Vec<View>,
}

impl SnapshotSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page<I, T>(&mut self, url: &str, frames: I, lands_on: Option<String>)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let frames = frames
            .into_iter()
            .map(|source| Frame {
                html: Html::parse_document(source.as_ref()),
                extent: source.as_ref().len() as u64,
            })
            .collect();
        self.pages.insert(url.to_string(), Page { frames, lands_on });
    }

    pub fn with_page<I, T>(mut self, url: &str, frames: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.add_page(url, frames, None);
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn frame(&self) -> Option<&Frame> {
        let view = self.current.as_ref()?;
        self.pages.get(&view.url)?.frames.get(view.frame)
    }
}

impl Session for SnapshotSession {
    type Element = HtmlElement;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        log::debug!("Opening snapshot of {url}");
        if let Some(view) = self.current.take() {
            self.history.push(view);
        }
        // Like a browser error page, an unknown url still becomes the current view
        self.current = Some(View {
            url: url.to_string(),
            frame: 0,
        });
        if self.pages.contains_key(url) {
            Ok(())
        } else {
            Err(SessionError::Navigation {
                url: url.to_string(),
                reason: "no snapshot captured".into(),
            })
        }
    }

    fn current_location(&self) -> Result<String, SessionError> {
        let Some(view) = &self.current else {
            return Ok(BLANK.to_string());
        };
        let landed = self
            .pages
            .get(&view.url)
            .and_then(|page| page.lands_on.clone());
        Ok(landed.unwrap_or_else(|| view.url.clone()))
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        if let Some(view) = self.current.as_mut() {
            if let Some(page) = self.pages.get(&view.url) {
                view.frame = (view.frame + 1).min(page.frames.len().saturating_sub(1));
            }
        }
        Ok(())
    }

    fn scroll_extent(&mut self) -> Result<u64, SessionError> {
        Ok(self.frame().map(|f| f.extent).unwrap_or(0))
    }

    fn wait_for_elements(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<HtmlElement>, SessionError> {
        let parsed = parse_selector(selector)?;
        let elements: Vec<_> = self
            .frame()
            .map(|f| f.html.select(parsed).map(HtmlElement).collect())
            .unwrap_or_default();
        if elements.is_empty() {
            return Err(SessionError::Timeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        Ok(elements)
    }

    fn go_back(&mut self) -> Result<(), SessionError> {
        let previous = self.history.pop().ok_or(SessionError::NoHistory)?;
        self.current = Some(previous);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        log::trace!("Skipping {duration:?} pause");
    }
}
