//! Site-specific scraper implementations

pub mod bolon;
pub mod fletco;
pub mod lano;
pub mod tapibel;
pub mod visidarbi;

pub use bolon::BolonScraper;
pub use fletco::FletcoScraper;
pub use lano::LanoScraper;
pub use tapibel::TapibelScraper;
pub use visidarbi::VisidarbiScraper;

use scraper::ElementRef;

/// Collected, trimmed text of an element.
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Last path segment of a URL, used as the local filename.
pub(crate) fn last_url_segment(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_of_asset_urls() {
        assert_eq!(last_url_segment("https://x.com/a/b/plain.jpg"), "plain.jpg");
        assert_eq!(last_url_segment("/files/datasheet.pdf"), "datasheet.pdf");
        assert_eq!(last_url_segment("plain.jpg"), "plain.jpg");
    }
}
