use serde::{Deserialize, Serialize};

/// A captured post, either a keyword match or a reply found in its thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Author handle, including the platform's handle prefix
    #[serde(rename = "username")]
    pub author: String,
    pub text: String,
    /// Canonical absolute permalink, also the dedup key
    #[serde(rename = "tweet_url")]
    pub url: String,
    /// Publish time as given by the platform
    #[serde(rename = "timestamp")]
    pub published_at: Option<String>,
    #[serde(rename = "collection_time")]
    pub collected_at: String,
    #[serde(default)]
    pub engagement: Engagement,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl PostRecord {
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = keyword.to_string();
        self
    }

    pub fn in_reply_to(mut self, parent_url: &str) -> Self {
        self.reply_to = Some(parent_url.to_string());
        self
    }
}

/// Displayed engagement counts, kept verbatim (e.g. `"1.2K"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "reposts")]
    pub retweets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
}

impl Engagement {
    pub fn zeroed() -> Self {
        Self {
            replies: Some("0".into()),
            retweets: Some("0".into()),
            likes: Some("0".into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_none() && self.retweets.is_none() && self.likes.is_none()
    }

    /// Fills in zero counts when no metric could be read at all.
    pub fn or_zeroed(self) -> Self {
        if self.is_empty() {
            Self::zeroed()
        } else {
            self
        }
    }

    /// The platform renders zero replies as an empty label or `0`.
    pub fn has_replies(&self) -> bool {
        match self.replies.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(count) => count.chars().any(|c| c.is_ascii_digit() && c != '0'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replies(count: &str) -> Engagement {
        Engagement {
            replies: Some(count.into()),
            ..Default::default()
        }
    }

    #[test]
    fn reply_counts() {
        assert!(!Engagement::default().has_replies());
        assert!(!replies("").has_replies());
        assert!(!replies("0").has_replies());
        assert!(!replies(" 0 ").has_replies());
        assert!(replies("3").has_replies());
        assert!(replies("10").has_replies());
        assert!(replies("1.2K").has_replies());
    }

    #[test]
    fn zero_defaults_only_when_empty() {
        assert_eq!(Engagement::default().or_zeroed(), Engagement::zeroed());
        let partial = Engagement {
            likes: Some("7".into()),
            ..Default::default()
        };
        assert_eq!(partial.clone().or_zeroed(), partial);
    }

    #[test]
    fn serialized_field_names() {
        let record = PostRecord {
            author: "@alice".into(),
            text: "hello".into(),
            url: "https://twitter.com/alice/status/1".into(),
            published_at: Some("2024-01-01T00:00:00.000Z".into()),
            collected_at: "2024-01-02T00:00:00+00:00".into(),
            engagement: Engagement::zeroed(),
            keyword: "alpha".into(),
            reply_to: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["username"], "@alice");
        assert_eq!(value["tweet_url"], "https://twitter.com/alice/status/1");
        assert_eq!(value["engagement"]["retweets"], "0");
        assert!(value["reply_to"].is_null());
    }
}
