use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use feedscout_crawler::{CampaignReport, PostRecord, OUTPUT_PREFIX};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Csv => &["csv"],
            Self::Both => &["json", "csv"],
        }
    }
}

/// Writes the files of one run, all sharing the same timestamp.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    stamp: String,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    keyword: &'a str,
    username: &'a str,
    tweet_url: &'a str,
    reply_to: Option<&'a str>,
    tweet_text: &'a str,
    timestamp: Option<&'a str>,
    replies: Option<&'a str>,
    retweets: Option<&'a str>,
    likes: Option<&'a str>,
}

impl<'a> From<&'a PostRecord> for CsvRow<'a> {
    fn from(post: &'a PostRecord) -> Self {
        Self {
            keyword: &post.keyword,
            username: &post.author,
            tweet_url: &post.url,
            reply_to: post.reply_to.as_deref(),
            tweet_text: &post.text,
            timestamp: post.published_at.as_deref(),
            replies: post.engagement.replies.as_deref(),
            retweets: post.engagement.retweets.as_deref(),
            likes: post.engagement.likes.as_deref(),
        }
    }
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_stamp(dir, stamp)
    }

    pub fn with_stamp<P: AsRef<Path>>(dir: P, stamp: String) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            stamp,
        }
    }

    fn path(&self, prefix: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{prefix}{}.{ext}", self.stamp))
    }

    /// Returns the written files, none when there is nothing to write.
    pub fn write_posts(&self, posts: &[PostRecord], format: OutputFormat) -> Result<Vec<PathBuf>> {
        if posts.is_empty() {
            log::warn!("No posts collected, nothing written");
            return Ok(vec![]);
        }
        fs_err::create_dir_all(&self.dir)?;

        let mut written = vec![];
        for ext in format.extensions() {
            let path = self.path(OUTPUT_PREFIX, ext);
            match *ext {
                "json" => write_json(&path, posts)?,
                _ => write_csv(&path, posts)?,
            }
            log::info!("Saved {} posts to {}", posts.len(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn write_report(&self, report: &CampaignReport) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.dir)?;
        let path = self.path("report_", "json");
        write_json(&path, report)?;
        Ok(path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut file = fs_err::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    Ok(())
}

fn write_csv(path: &Path, posts: &[PostRecord]) -> Result<()> {
    let file = fs_err::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for post in posts {
        wtr.serialize(CsvRow::from(post))?;
    }
    wtr.flush()?;
    Ok(())
}
