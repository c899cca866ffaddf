mod campaign;
mod config;
mod extractor;
mod keywords;
mod ledger;
mod paginator;
mod post;
mod session;
mod thread;

pub use campaign::{
    search_url, CampaignOutput, CampaignReport, CampaignRunner, KeywordFailure, KeywordSuccess,
    NO_NEW_POSTS,
};
pub use config::{CrawlerConfig, FeedSelectors, OnError, MAX_THREAD_SCROLLS, STAGNATION_LIMIT};
pub use extractor::{canonical_url, same_post, FeedExtractor};
pub use keywords::{load_keywords, parse_keywords};
pub use ledger::{DedupLedger, OUTPUT_PREFIX};
pub use paginator::{Paginator, StopReason};
pub use post::{Engagement, PostRecord};
pub use session::{Element, ReturnGuard, Session, SessionError};
pub use thread::{DescentStatus, ThreadDescender, ThreadOutcome};

pub use anyhow;
