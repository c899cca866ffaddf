use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Consecutive scrolls without any growth of the view before giving up.
pub const STAGNATION_LIMIT: usize = 3;

/// Upper bound on scrolls performed inside a single reply thread.
pub const MAX_THREAD_SCROLLS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Per keyword time budget, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: f32,

    #[serde(default = "default_page_load_pause")]
    pub page_load_pause: f32,

    #[serde(default = "default_scroll_pause")]
    pub scroll_pause: f32,

    #[serde(default = "default_back_pause")]
    pub back_pause: f32,

    #[serde(default = "default_feed_wait")]
    pub feed_wait: f32,

    #[serde(default = "default_thread_wait")]
    pub thread_wait: f32,

    #[serde(default = "default_fetch_replies")]
    pub fetch_replies: bool,

    #[serde(default = "default_on_keyword_error")]
    pub on_keyword_error: OnError,

    #[serde(default = "default_handle_prefix")]
    pub handle_prefix: String,

    #[serde(default)]
    pub selectors: FeedSelectors,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            base_url: default_base_url(),
            target_count: default_target_count(),
            timeout: default_timeout(),
            page_load_pause: default_page_load_pause(),
            scroll_pause: default_scroll_pause(),
            back_pause: default_back_pause(),
            feed_wait: default_feed_wait(),
            thread_wait: default_thread_wait(),
            fetch_replies: default_fetch_replies(),
            on_keyword_error: default_on_keyword_error(),
            handle_prefix: default_handle_prefix(),
            selectors: FeedSelectors::default(),
        }
    }
}

impl CrawlerConfig {
    /// Same configuration with every pause and wait set to zero.
    pub fn without_delays(mut self) -> Self {
        self.page_load_pause = 0.;
        self.scroll_pause = 0.;
        self.back_pause = 0.;
        self.feed_wait = 0.;
        self.thread_wait = 0.;
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        secs(self.timeout)
    }

    pub(crate) fn page_load_pause(&self) -> Duration {
        secs(self.page_load_pause)
    }

    pub(crate) fn scroll_pause(&self) -> Duration {
        secs(self.scroll_pause)
    }

    pub(crate) fn back_pause(&self) -> Duration {
        secs(self.back_pause)
    }

    pub(crate) fn feed_wait(&self) -> Duration {
        secs(self.feed_wait)
    }

    pub(crate) fn thread_wait(&self) -> Duration {
        secs(self.thread_wait)
    }
}

/// Negative and NaN values are zero, values too large for a `Duration` saturate.
fn secs(s: f32) -> Duration {
    match Duration::try_from_secs_f32(s) {
        Ok(d) => d,
        Err(_) if s > 0. => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

fn default_search_url() -> String {
    String::from("https://twitter.com/search")
}

fn default_base_url() -> String {
    String::from("https://twitter.com")
}

fn default_target_count() -> usize {
    100
}

fn default_timeout() -> f32 {
    300.
}

fn default_page_load_pause() -> f32 {
    3.
}

fn default_scroll_pause() -> f32 {
    2.
}

fn default_back_pause() -> f32 {
    2.
}

fn default_feed_wait() -> f32 {
    10.
}

fn default_thread_wait() -> f32 {
    5.
}

fn default_fetch_replies() -> bool {
    true
}

fn default_on_keyword_error() -> OnError {
    OnError::SkipAndLog
}

fn default_handle_prefix() -> String {
    String::from("@")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OnError {
    Fail,
    SkipAndLog,
}

/// CSS locations of the parts of a rendered post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedSelectors {
    pub post: String,
    /// Posts of a thread view, the first cell holds the root post itself
    pub reply: String,
    pub author: String,
    /// Anchor wrapping the timestamp node
    pub permalink: String,
    pub time: String,
    pub text: String,
    pub replies: String,
    pub reposts: String,
    pub likes: String,
}

impl Default for FeedSelectors {
    fn default() -> Self {
        Self {
            post: r#"article[data-testid="tweet"]"#.into(),
            reply: r#"[data-testid="cellInnerDiv"] ~ [data-testid="cellInnerDiv"] article[data-testid="tweet"]"#.into(),
            author: r#"[data-testid="User-Name"] div.css-175oi2r.r-1ez5h0i div.r-1wbh5a2 span"#.into(),
            permalink: r#"[data-testid="User-Name"] div.css-175oi2r.r-18u37iz.r-1q142lx a[role="link"]"#.into(),
            time: "time[datetime]".into(),
            text: r#"[data-testid="tweetText"]"#.into(),
            replies: r#"[data-testid="reply"]"#.into(),
            reposts: r#"[data-testid="retweet"]"#.into(),
            likes: r#"[data-testid="like"]"#.into(),
        }
    }
}
