//! Data models for harvested products and job listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product row destined for a per-product `product_data.csv`.
///
/// Column sets differ between sites, and on some sites between products
/// (optional availability sections), so the record keeps an ordered list
/// of columns rather than fixed fields.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    fields: Vec<(String, String)>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            fields: vec![("product_name".to_string(), name.into())],
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(column, _)| column.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }
}

/// A job listing scraped from the job board.
///
/// Every field except the title is optional on the listing page; absent
/// fields stay `None` and become NULL columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub added: Option<String>,
    pub salary: Option<String>,
    pub company: Option<String>,
    pub due_date: Option<String>,
    pub source: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Per-site outcome counters, merged into the run total.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapeSummary {
    /// Rows written (CSV files or database inserts).
    pub items: usize,
    /// Binary files saved (images, documents).
    pub assets: usize,
}

impl ScrapeSummary {
    pub fn merge(&mut self, other: Self) {
        self.items += other.items;
        self.assets += other.assets;
    }
}
