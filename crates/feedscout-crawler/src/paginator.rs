use std::fmt;
use std::time::Instant;

use anyhow::Result;

use crate::config::{CrawlerConfig, STAGNATION_LIMIT};
use crate::extractor::FeedExtractor;
use crate::ledger::DedupLedger;
use crate::post::PostRecord;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    Timeout,
    /// The view stopped growing after repeated scrolls
    Stagnant,
    /// The view never rendered any post
    NoPosts,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::TargetReached => "target reached",
            Self::Timeout => "timeout",
            Self::Stagnant => "stagnant",
            Self::NoPosts => "no posts rendered",
        };
        f.write_str(reason)
    }
}

/// Counts consecutive measurements of an unchanged scroll extent.
#[derive(Debug, Default)]
pub(crate) struct ScrollTracker {
    last_extent: u64,
    stagnation_count: usize,
}

impl ScrollTracker {
    /// Returns `true` once the extent has not moved [`STAGNATION_LIMIT`] times in a row.
    pub(crate) fn observe(&mut self, extent: u64) -> bool {
        if extent == self.last_extent {
            self.stagnation_count += 1;
        } else {
            self.stagnation_count = 0;
        }
        self.last_extent = extent;
        self.stagnation_count >= STAGNATION_LIMIT
    }
}

/// Scrolls a feed view and collects the posts it has not seen yet.
pub struct Paginator<'a> {
    config: &'a CrawlerConfig,
    extractor: &'a FeedExtractor,
}

impl<'a> Paginator<'a> {
    pub fn new(config: &'a CrawlerConfig, extractor: &'a FeedExtractor) -> Self {
        Self { config, extractor }
    }

    /// Appends new top-level posts of the current view to `records`.
    ///
    /// Posts gathered before a session error stay in `records` and in the ledger.
    pub fn paginate<S: Session>(
        &self,
        session: &mut S,
        ledger: &mut DedupLedger,
        keyword: &str,
        records: &mut Vec<PostRecord>,
    ) -> Result<StopReason> {
        let started = Instant::now();
        let timeout = self.config.timeout();
        let first = records.len();
        let mut tracker = ScrollTracker::default();

        let reason = loop {
            let extent = session.scroll_extent()?;
            if tracker.observe(extent) {
                break StopReason::Stagnant;
            }
            if records.len() - first >= self.config.target_count {
                break StopReason::TargetReached;
            }
            if started.elapsed() >= timeout {
                break StopReason::Timeout;
            }

            let elements = match session
                .wait_for_elements(&self.extractor.selectors().post, self.config.feed_wait())
            {
                Ok(elements) => elements,
                Err(e) if e.is_timeout() => {
                    log::warn!("No posts rendered for {keyword}: {e}");
                    break StopReason::NoPosts;
                }
                Err(e) => return Err(e.into()),
            };

            for element in &elements {
                let Some(record) = self.extractor.extract(element) else {
                    continue;
                };
                if ledger.insert_post(&record.url) {
                    log::debug!("New post {}", record.url);
                    records.push(record.with_keyword(keyword));
                }
            }

            session.scroll_to_bottom()?;
            session.pause(self.config.scroll_pause());
        };

        log::info!(
            "Stopped paginating {keyword} ({reason}) with {} new posts",
            records.len() - first
        );
        Ok(reason)
    }
}
