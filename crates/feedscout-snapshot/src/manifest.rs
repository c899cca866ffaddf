use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use feedscout_crawler::search_url;
use serde::Deserialize;

use crate::SnapshotSession;

/// Describes a set of captured pages, frame paths being relative to the manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotManifest {
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Exact url of the page.
    #[serde(default)]
    pub url: Option<String>,
    /// Search keyword, standing for its live search url.
    #[serde(default)]
    pub keyword: Option<String>,
    pub frames: Vec<PathBuf>,
    /// Location reported once the page is open, when it differs from `url`.
    #[serde(default)]
    pub lands_on: Option<String>,
}

impl PageEntry {
    fn resolve_url(&self, search: &str) -> Result<String> {
        match (&self.url, &self.keyword) {
            (Some(url), None) => Ok(url.clone()),
            (None, Some(keyword)) => search_url(search, keyword),
            _ => bail!("Snapshot page needs exactly one of `url` or `keyword`"),
        }
    }
}

impl SnapshotManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = fs_err::File::open(path.as_ref())?;
        let manifest = serde_yaml::from_reader(reader)
            .with_context(|| format!("Invalid snapshot manifest {}", path.as_ref().display()))?;
        Ok(manifest)
    }
}

impl SnapshotSession {
    /// Loads every page of the manifest, keyword pages being keyed by `search_url`.
    pub fn from_manifest<P: AsRef<Path>>(path: P, search: &str) -> Result<Self> {
        let path = path.as_ref();
        let manifest = SnapshotManifest::from_path(path)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));

        let mut session = SnapshotSession::new();
        for (i, page) in manifest.pages.iter().enumerate() {
            let url = page
                .resolve_url(search)
                .with_context(|| format!("Page #{i} of {}", path.display()))?;
            let frames = page
                .frames
                .iter()
                .map(|frame| fs_err::read_to_string(root.join(frame)))
                .collect::<Result<Vec<_>, _>>()?;
            log::debug!("Loaded {} frame(s) for {url}", frames.len());
            session.add_page(&url, frames, page.lands_on.clone());
        }
        Ok(session)
    }
}
