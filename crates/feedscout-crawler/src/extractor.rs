use anyhow::{anyhow, bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use url::Url;

use crate::config::{CrawlerConfig, FeedSelectors};
use crate::post::{Engagement, PostRecord};
use crate::session::Element;

/// Turns rendered post elements into [`PostRecord`]s.
#[derive(Debug, Clone)]
pub struct FeedExtractor {
    selectors: FeedSelectors,
    handle_prefix: String,
    base_url: Url,
}

impl FeedExtractor {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base url {}", config.base_url))?;
        Ok(Self {
            selectors: config.selectors.clone(),
            handle_prefix: config.handle_prefix.clone(),
            base_url,
        })
    }

    pub fn selectors(&self) -> &FeedSelectors {
        &self.selectors
    }

    /// Extracts one post, logging and discarding it when a required part is missing.
    pub fn extract<E: Element>(&self, element: &E) -> Option<PostRecord> {
        match self.extract_record(element) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping post: {e:#}");
                None
            }
        }
    }

    pub fn extract_record<E: Element>(&self, element: &E) -> Result<PostRecord> {
        let author = self.author(element)?;
        let permalink = element
            .find_child(&self.selectors.permalink)?
            .ok_or_else(|| anyhow!("Missing permalink for post by {author}"))?;
        let url = self.post_url(&permalink)?;
        let published_at = self.published_at(element, &permalink);
        let engagement = self.engagement(element).or_zeroed();
        let text = match element.find_child(&self.selectors.text) {
            Ok(Some(text)) => text.text(),
            Ok(None) => String::new(),
            Err(e) => {
                log::debug!("No text for {url}: {e}");
                String::new()
            }
        };

        Ok(PostRecord {
            author,
            text,
            url,
            published_at,
            collected_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            engagement,
            keyword: String::new(),
            reply_to: None,
        })
    }

    fn author<E: Element>(&self, element: &E) -> Result<String> {
        let author = element
            .find_child(&self.selectors.author)?
            .map(|e| e.text().trim().to_string())
            .ok_or_else(|| anyhow!("Missing author"))?;
        if !author.contains(self.handle_prefix.as_str()) {
            bail!("Invalid author handle {author:?}");
        }
        Ok(author)
    }

    fn post_url<E: Element>(&self, permalink: &E) -> Result<String> {
        let href = permalink
            .attribute("href")
            .filter(|href| !href.trim().is_empty())
            .ok_or_else(|| anyhow!("Permalink without href"))?;
        canonical_url(&self.base_url, href.trim())
    }

    fn published_at<E: Element>(&self, element: &E, permalink: &E) -> Option<String> {
        let time = match permalink.find_child(&self.selectors.time) {
            Ok(Some(time)) => Some(time),
            _ => element.find_child(&self.selectors.time).ok().flatten(),
        };
        time.and_then(|t| t.attribute("datetime"))
    }

    fn engagement<E: Element>(&self, element: &E) -> Engagement {
        let metric = |selector: &str| match element.find_child(selector) {
            Ok(found) => found.map(|e| e.text().trim().to_string()),
            Err(e) => {
                log::debug!("Skipping metric: {e}");
                None
            }
        };
        Engagement {
            replies: metric(&self.selectors.replies),
            retweets: metric(&self.selectors.reposts),
            likes: metric(&self.selectors.likes),
        }
    }
}

/// Absolute form of a permalink, without query nor fragment.
pub fn canonical_url(base: &Url, href: &str) -> Result<String> {
    let mut url = base
        .join(href)
        .with_context(|| format!("Invalid post url {href}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Unexpected post url {url}");
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

/// Whether two post urls designate the same post, ignoring host aliases and case.
pub fn same_post(expected: &str, location: &str) -> bool {
    fn path(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .map(|u| u.path().trim_end_matches('/').to_lowercase())
    }
    match (path(expected), path(location)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}
