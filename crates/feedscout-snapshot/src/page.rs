use std::collections::HashSet;

use anyhow::Result;
use feedscout_crawler::{FeedExtractor, PostRecord};
use sws_scraper::Html;

use crate::element::{parse_selector, HtmlElement};

/// Extracts every post of a single captured page, in document order.
pub fn posts_in_document(html: &str, extractor: &FeedExtractor) -> Result<Vec<PostRecord>> {
    let document = Html::parse_document(html);
    let selector = parse_selector(&extractor.selectors().post)?;

    let mut seen = HashSet::new();
    let posts = document
        .select(selector)
        .filter_map(|el| extractor.extract(&HtmlElement(el)))
        .filter(|post| seen.insert(post.url.clone()))
        .collect();
    Ok(posts)
}
