use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{CrawlerConfig, OnError};
use crate::extractor::FeedExtractor;
use crate::ledger::DedupLedger;
use crate::paginator::Paginator;
use crate::post::PostRecord;
use crate::session::Session;
use crate::thread::ThreadDescender;

pub const NO_NEW_POSTS: &str = "no new posts found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSuccess {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFailure {
    pub keyword: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub successes: Vec<KeywordSuccess>,
    pub failures: Vec<KeywordFailure>,
}

impl CampaignReport {
    pub fn log_summary(&self) {
        for KeywordSuccess { keyword, count } in &self.successes {
            log::info!("{keyword}: {count} new posts");
        }
        for KeywordFailure { keyword, reason } in &self.failures {
            log::warn!("{keyword}: {reason}");
        }
        log::info!(
            "Campaign done, {} keywords succeeded and {} failed",
            self.successes.len(),
            self.failures.len()
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampaignOutput {
    /// Keyword matches, each one followed by its new replies
    pub posts: Vec<PostRecord>,
    pub report: CampaignReport,
    /// Why the run stopped early, keywords after the failing one were not crawled
    pub aborted: Option<String>,
}

/// Crawls the latest posts of each keyword, one after the other.
pub struct CampaignRunner<S> {
    config: CrawlerConfig,
    extractor: FeedExtractor,
    session: S,
    ledger: DedupLedger,
}

impl<S: Session> CampaignRunner<S> {
    pub fn new(config: CrawlerConfig, session: S, ledger: DedupLedger) -> Result<Self> {
        let extractor = FeedExtractor::new(&config)?;
        Ok(Self {
            config,
            extractor,
            session,
            ledger,
        })
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_parts(self) -> (S, DedupLedger) {
        (self.session, self.ledger)
    }

    /// Crawls `keywords` in order.
    ///
    /// With [`OnError::Fail`] the first failing keyword stops the run, what was
    /// collected until then is still returned.
    pub fn run(&mut self, keywords: &[String]) -> CampaignOutput {
        let mut output = CampaignOutput::default();

        for keyword in keywords {
            log::info!("Searching for: {keyword}");
            let before = self.ledger.post_count();
            let res = self.crawl_keyword(keyword, &mut output.posts);
            let growth = self.ledger.post_count() - before;

            match res {
                Ok(()) if growth > 0 => output.report.successes.push(KeywordSuccess {
                    keyword: keyword.clone(),
                    count: growth,
                }),
                Ok(()) => output.report.failures.push(KeywordFailure {
                    keyword: keyword.clone(),
                    reason: NO_NEW_POSTS.to_string(),
                }),
                Err(e) => {
                    log::error!("Keyword {keyword} failed: {e:#}");
                    output.report.failures.push(KeywordFailure {
                        keyword: keyword.clone(),
                        reason: format!("{e:#}"),
                    });
                    if let OnError::Fail = self.config.on_keyword_error {
                        output.aborted = Some(format!("Keyword {keyword} failed: {e:#}"));
                        break;
                    }
                }
            }
        }

        output
    }

    /// Appends the new posts of `keyword`, with their replies, to `posts`.
    pub fn crawl_keyword(&mut self, keyword: &str, posts: &mut Vec<PostRecord>) -> Result<()> {
        let url = search_url(&self.config.search_url, keyword)?;
        log::debug!("Searching url: {url}");
        self.session.navigate(&url)?;
        self.session.pause(self.config.page_load_pause());

        let mut found = vec![];
        let paginator = Paginator::new(&self.config, &self.extractor);
        let res = paginator.paginate(&mut self.session, &mut self.ledger, keyword, &mut found);

        let descender = ThreadDescender::new(&self.config, &self.extractor);
        for post in found {
            let parent_url = post.url.clone();
            let descend = res.is_ok() && self.config.fetch_replies && post.engagement.has_replies();
            posts.push(post);
            if descend {
                let thread =
                    descender.descend(&mut self.session, &mut self.ledger, &parent_url, keyword);
                posts.extend(thread.replies);
            }
        }

        res.map(|_| ())
    }
}

/// Latest posts matching `keyword`.
pub fn search_url(base: &str, keyword: &str) -> Result<String> {
    let url = Url::parse_with_params(
        base,
        &[("q", keyword), ("src", "typed_query"), ("f", "live")],
    )
    .with_context(|| format!("Invalid search url {base}"))?;
    Ok(url.into())
}
