use std::collections::HashSet;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name prefix of saved posts, other files of the output directory are ignored.
pub const OUTPUT_PREFIX: &str = "posts_";

/// Urls of every post collected so far, split between keyword matches and replies.
///
/// Grows monotonically during a run, the two sets never share a url.
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    posts: HashSet<String>,
    replies: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct SeenPost {
    #[serde(rename = "tweet_url", alias = "url")]
    url: String,
    #[serde(default)]
    reply_to: Option<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a ledger from every previous `posts_*` output found in `dir`.
    ///
    /// A missing directory is a first run. Unparsable files are skipped.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut ledger = Self::new();

        match fs_err::metadata(dir) {
            Ok(meta) if meta.is_dir() => (),
            Ok(_) => anyhow::bail!("Output location {} is not a directory", dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No previous output in {}", dir.display());
                return Ok(ledger);
            }
            Err(e) => return Err(e.into()),
        }
        // Surfaces permission errors before globbing silently skips them
        fs_err::read_dir(dir)?;

        for ext in ["json", "csv"] {
            let pattern = dir.join(format!("{OUTPUT_PREFIX}*.{ext}"));
            let pattern = pattern.to_string_lossy();
            for path in glob::glob(&pattern)? {
                let path = match path {
                    Ok(path) => path,
                    Err(e) => {
                        log::warn!("Skipping unreadable output: {e}");
                        continue;
                    }
                };
                let seen = match ext {
                    "json" => read_json(&path),
                    _ => read_csv(&path),
                };
                match seen {
                    Ok(seen) => {
                        log::debug!("Seeding {} posts from {}", seen.len(), path.display());
                        seen.into_iter().for_each(|p| ledger.record_seen(p));
                    }
                    Err(e) => log::warn!("Skipping output {}: {e:#}", path.display()),
                }
            }
        }

        log::info!(
            "Ledger seeded with {} posts and {} replies from {}",
            ledger.post_count(),
            ledger.reply_count(),
            dir.display()
        );
        Ok(ledger)
    }

    fn record_seen(&mut self, seen: SeenPost) {
        match seen.reply_to.filter(|parent| !parent.is_empty()) {
            Some(_) => self.insert_reply(&seen.url),
            None => self.insert_post(&seen.url),
        };
    }

    pub fn contains_post(&self, url: &str) -> bool {
        self.posts.contains(url)
    }

    pub fn contains_reply(&self, url: &str) -> bool {
        self.replies.contains(url)
    }

    /// Records a keyword match, returns `false` when the url is already known.
    pub fn insert_post(&mut self, url: &str) -> bool {
        !self.replies.contains(url) && self.posts.insert(url.to_string())
    }

    /// Records a reply, returns `false` when the url is already known.
    pub fn insert_reply(&mut self, url: &str) -> bool {
        !self.posts.contains(url) && self.replies.insert(url.to_string())
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

fn read_json(path: &Path) -> Result<Vec<SeenPost>> {
    let file = fs_err::File::open(path)?;
    let seen = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Invalid post list in {}", path.display()))?;
    Ok(seen)
}

fn read_csv(path: &Path) -> Result<Vec<SeenPost>> {
    let file = fs_err::File::open(path)?;
    csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<SeenPost>, _>>()
        .with_context(|| format!("Invalid post table in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn sets_stay_disjoint() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.insert_post("a"));
        assert!(!ledger.insert_post("a"));
        assert!(!ledger.insert_reply("a"));
        assert!(ledger.insert_reply("b"));
        assert!(!ledger.insert_post("b"));
        assert_eq!(ledger.post_count(), 1);
        assert_eq!(ledger.reply_count(), 1);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = DedupLedger::load(dir.path().join("nope")).unwrap();
        assert_eq!(ledger.post_count(), 0);
    }

    #[test]
    fn file_instead_of_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("posts.json");
        fs::write(&file, "[]").unwrap();
        assert!(DedupLedger::load(&file).is_err());
    }

    #[test]
    fn seeds_from_json_and_csv_skipping_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("posts_1.json"),
            r#"[
                {"username": "@a", "text": "", "tweet_url": "https://twitter.com/a/status/1",
                 "timestamp": null, "collection_time": "", "engagement": {}, "keyword": "k",
                 "reply_to": null},
                {"tweet_url": "https://twitter.com/b/status/2",
                 "reply_to": "https://twitter.com/a/status/1"}
            ]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("posts_2.csv"),
            "keyword,username,tweet_url,reply_to,tweet_text,timestamp,replies,retweets,likes\n\
             k,@c,https://twitter.com/c/status/3,,hi,,0,0,0\n\
             k,@d,https://twitter.com/d/status/4,https://twitter.com/c/status/3,yo,,0,0,0\n",
        )
        .unwrap();
        fs::write(dir.path().join("posts_broken.json"), "{ not json").unwrap();
        fs::write(
            dir.path().join("report_1.json"),
            r#"{"successes": [], "failures": []}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("export.json"),
            r#"[{"tweet_url": "https://twitter.com/e/status/5"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let ledger = DedupLedger::load(dir.path()).unwrap();
        assert_eq!(ledger.post_count(), 2);
        assert_eq!(ledger.reply_count(), 2);
        assert!(ledger.contains_post("https://twitter.com/a/status/1"));
        assert!(ledger.contains_post("https://twitter.com/c/status/3"));
        assert!(ledger.contains_reply("https://twitter.com/b/status/2"));
        assert!(ledger.contains_reply("https://twitter.com/d/status/4"));
        assert!(!ledger.contains_post("https://twitter.com/e/status/5"));
    }
}
