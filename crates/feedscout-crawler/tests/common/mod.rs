#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use feedscout_crawler::{search_url, CrawlerConfig, Element, FeedSelectors, Session, SessionError};

pub const SEARCH_URL: &str = "https://twitter.com/search";

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, FakeElement>,
}

impl FakeElement {
    fn text(text: &str) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn attr(name: &str, value: &str) -> Self {
        Self {
            attrs: [(name.to_string(), value.to_string())].into(),
            ..Default::default()
        }
    }
}

impl Element for FakeElement {
    fn find_child(&self, selector: &str) -> Result<Option<Self>, SessionError> {
        Ok(self.children.get(selector).cloned())
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attrs.get(name).cloned()
    }
}

/// A rendered post authored by `@<user>`, with permalink `/<user>/status/<id>`.
pub fn post(user: &str, id: u64, replies: &str) -> FakeElement {
    let s = FeedSelectors::default();
    let mut permalink = FakeElement::attr("href", &format!("/{user}/status/{id}"));
    permalink
        .children
        .insert(s.time.clone(), FakeElement::attr("datetime", "2024-05-01T12:00:00.000Z"));
    FakeElement {
        children: [
            (s.author, FakeElement::text(&format!("@{user}"))),
            (s.permalink, permalink),
            (s.text, FakeElement::text(&format!("post {id} by {user}"))),
            (s.replies, FakeElement::text(replies)),
            (s.reposts, FakeElement::text("0")),
            (s.likes, FakeElement::text("1")),
        ]
        .into(),
        ..Default::default()
    }
}

/// A post whose author label lacks the handle prefix.
pub fn anonymous_post(id: u64) -> FakeElement {
    let mut element = post("ghost", id, "0");
    element.children.insert(
        FeedSelectors::default().author,
        FakeElement::text("Ghost Writer"),
    );
    element
}

pub fn post_url(user: &str, id: u64) -> String {
    format!("https://twitter.com/{user}/status/{id}")
}

pub fn keyword_url(keyword: &str) -> String {
    search_url(SEARCH_URL, keyword).unwrap()
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    /// Elements visible after n scrolls, the last frame repeats forever
    pub frames: Vec<Vec<FakeElement>>,
    pub lands_on: Option<String>,
    pub fail_scroll: bool,
}

impl FakePage {
    pub fn new(frames: Vec<Vec<FakeElement>>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct View {
    url: String,
    frame: usize,
}

/// In-memory session recording everything the crawler asks for.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    pages: HashMap<String, FakePage>,
    current: Option<View>,
    history: Vec<View>,
    pub navigations: Vec<String>,
    pub backs: usize,
    pub scrolls: usize,
    pub measures: usize,
    pub waits: Vec<String>,
    pub paused: Duration,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Opens `url` as if the crawler had navigated there itself.
    pub fn opened_on(mut self, url: &str) -> Self {
        self.current = Some(View {
            url: url.to_string(),
            frame: 0,
        });
        self
    }

    pub fn location(&self) -> Option<&str> {
        self.current.as_ref().map(|v| v.url.as_str())
    }

    pub fn thread_visits(&self) -> HashSet<String> {
        self.navigations
            .iter()
            .filter(|url| !url.starts_with(SEARCH_URL))
            .cloned()
            .collect()
    }

    fn view(&self) -> Option<(&View, &FakePage)> {
        let view = self.current.as_ref()?;
        Some((view, self.pages.get(&view.url)?))
    }
}

impl Session for ScriptedSession {
    type Element = FakeElement;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.navigations.push(url.to_string());
        if let Some(view) = self.current.take() {
            self.history.push(view);
        }
        self.current = Some(View {
            url: url.to_string(),
            frame: 0,
        });
        if self.pages.contains_key(url) {
            Ok(())
        } else {
            Err(SessionError::Navigation {
                url: url.to_string(),
                reason: "page not found".into(),
            })
        }
    }

    fn current_location(&self) -> Result<String, SessionError> {
        let view = self.current.as_ref().ok_or(SessionError::NoHistory)?;
        let landed = self
            .pages
            .get(&view.url)
            .and_then(|page| page.lands_on.clone());
        Ok(landed.unwrap_or_else(|| view.url.clone()))
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.scrolls += 1;
        let view = self.current.as_mut().ok_or(SessionError::NoHistory)?;
        let page = self.pages.get(&view.url).ok_or(SessionError::NoHistory)?;
        if page.fail_scroll {
            return Err(SessionError::Backend("scroll script crashed".into()));
        }
        view.frame = (view.frame + 1).min(page.frames.len().saturating_sub(1));
        Ok(())
    }

    fn scroll_extent(&mut self) -> Result<u64, SessionError> {
        self.measures += 1;
        Ok(self
            .view()
            .map(|(view, page)| {
                if page.frames.is_empty() {
                    0
                } else {
                    (view.frame as u64 + 1) * 1000
                }
            })
            .unwrap_or(0))
    }

    fn wait_for_elements(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<FakeElement>, SessionError> {
        self.waits.push(selector.to_string());
        let elements = self
            .view()
            .and_then(|(view, page)| page.frames.get(view.frame).cloned())
            .unwrap_or_default();
        if elements.is_empty() {
            Err(SessionError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        } else {
            Ok(elements)
        }
    }

    fn go_back(&mut self) -> Result<(), SessionError> {
        self.backs += 1;
        self.current = Some(self.history.pop().ok_or(SessionError::NoHistory)?);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.paused += duration;
    }
}

pub fn config() -> CrawlerConfig {
    CrawlerConfig {
        search_url: SEARCH_URL.into(),
        base_url: "https://twitter.com".into(),
        ..CrawlerConfig::default().without_delays()
    }
}
