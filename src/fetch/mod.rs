//! Shared HTTP plumbing for the site scrapers

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use reqwest::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;

/// Delay between successive page fetches on the same site.
pub const PAGE_DELAY: Duration = Duration::from_millis(500);

/// HTTP client shared by every site scraper.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    /// GET a page and return its body as text.
    pub async fn get_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch {}: {}",
                url,
                response.status()
            ));
        }

        Ok(response.text().await?)
    }

    /// GET a JSON endpoint with query parameters and decode the body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to fetch {}: {}",
                url,
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    /// Download a binary asset. The server-suggested filename is taken
    /// from the `Content-Disposition` header when one is present.
    pub async fn fetch_asset(&self, url: &str) -> Result<Asset> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to download {}: {}",
                url,
                response.status()
            ));
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename);

        let bytes = response.bytes().await?.to_vec();

        Ok(Asset { bytes, filename })
    }
}

/// A downloaded binary body plus the filename the server suggested.
pub struct Asset {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

/// Pull `name.ext` out of `attachment; filename="name.ext"`.
fn disposition_filename(header: &str) -> Option<String> {
    let start = header.find("filename=\"")? + "filename=\"".len();
    let rest = &header[start..];
    let end = rest.find('"')?;
    if end == 0 {
        None
    } else {
        Some(rest[..end].to_string())
    }
}

impl Clone for PageFetcher {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_extracts_quoted_name() {
        let header = r#"attachment; filename="Installation Guide.pdf""#;
        assert_eq!(
            disposition_filename(header).as_deref(),
            Some("Installation Guide.pdf")
        );
    }

    #[test]
    fn disposition_filename_handles_missing_or_empty() {
        assert_eq!(disposition_filename("attachment"), None);
        assert_eq!(disposition_filename(r#"attachment; filename="""#), None);
    }
}
