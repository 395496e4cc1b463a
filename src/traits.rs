//! Traits and interfaces shared by the site scrapers

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::fetch::PageFetcher;
use crate::models::ScrapeSummary;

/// Trait for site-specific scrapers.
///
/// Each implementation owns one vendor site: it fetches the listing
/// page, walks the detail pages, downloads the assets it knows about
/// and writes its rows under `<out_root>/<name>/`.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    /// Short name used on the command line and as the output directory.
    fn name(&self) -> &'static str;

    /// Base URL prefixed onto relative hrefs.
    fn base_url(&self) -> &'static str;

    /// Scrape the whole site.
    ///
    /// # Returns
    /// * `Result<ScrapeSummary>` - counts of rows and assets written
    async fn run(&self, fetcher: &PageFetcher, out_root: &Path) -> Result<ScrapeSummary>;
}

/// Prefix `href` with `base` unless it is already absolute.
pub fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}
