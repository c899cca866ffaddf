use anyhow::Result;

use crate::config::{CrawlerConfig, MAX_THREAD_SCROLLS};
use crate::extractor::{same_post, FeedExtractor};
use crate::ledger::DedupLedger;
use crate::paginator::ScrollTracker;
use crate::post::PostRecord;
use crate::session::{ReturnGuard, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescentStatus {
    Completed,
    /// The detail view showed another location than the requested post
    Mismatch { location: String },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ThreadOutcome {
    pub replies: Vec<PostRecord>,
    pub status: DescentStatus,
}

/// Opens the reply thread of a post, collects unseen replies and comes back.
pub struct ThreadDescender<'a> {
    config: &'a CrawlerConfig,
    extractor: &'a FeedExtractor,
}

impl<'a> ThreadDescender<'a> {
    pub fn new(config: &'a CrawlerConfig, extractor: &'a FeedExtractor) -> Self {
        Self { config, extractor }
    }

    /// The session is always sent back to the view it was on, even on failure.
    pub fn descend<S: Session>(
        &self,
        session: &mut S,
        ledger: &mut DedupLedger,
        parent_url: &str,
        keyword: &str,
    ) -> ThreadOutcome {
        let mut guard = ReturnGuard::new(session, self.config.back_pause());
        let mut replies = vec![];
        let status = match self.collect(guard.session(), ledger, parent_url, keyword, &mut replies)
        {
            Ok(status) => status,
            Err(e) => {
                log::error!("Couldn't read thread of {parent_url}: {e:#}");
                DescentStatus::Failed(format!("{e:#}"))
            }
        };
        log::debug!("Found {} new replies to {parent_url}", replies.len());
        ThreadOutcome { replies, status }
    }

    fn collect<S: Session>(
        &self,
        session: &mut S,
        ledger: &mut DedupLedger,
        parent_url: &str,
        keyword: &str,
        replies: &mut Vec<PostRecord>,
    ) -> Result<DescentStatus> {
        session.navigate(parent_url)?;
        session.pause(self.config.page_load_pause());

        let location = session.current_location()?;
        if !same_post(parent_url, &location) {
            log::warn!("Expected thread of {parent_url} but landed on {location}");
            return Ok(DescentStatus::Mismatch { location });
        }

        let mut tracker = ScrollTracker::default();
        for _ in 0..MAX_THREAD_SCROLLS {
            if tracker.observe(session.scroll_extent()?) {
                break;
            }

            let elements = match session
                .wait_for_elements(&self.extractor.selectors().reply, self.config.thread_wait())
            {
                Ok(elements) => elements,
                Err(e) if e.is_timeout() => break,
                Err(e) => return Err(e.into()),
            };

            for element in &elements {
                let Some(reply) = self.extractor.extract(element) else {
                    continue;
                };
                if reply.url == parent_url || !ledger.insert_reply(&reply.url) {
                    continue;
                }
                replies.push(reply.with_keyword(keyword).in_reply_to(parent_url));
            }

            session.scroll_to_bottom()?;
            session.pause(self.config.scroll_pause());
        }

        Ok(DescentStatus::Completed)
    }
}
