//! On-disk layout and delimited output for harvested products

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::models::ProductRecord;

/// Replace the characters product names carry that are unsafe in a
/// directory name.
pub fn sanitize_name(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

/// Directory layout for one product: the product folder plus its fixed
/// subdirectories. Creation is idempotent.
pub struct ProductDirs {
    pub root: PathBuf,
    pub images: PathBuf,
    pub docs: PathBuf,
}

impl ProductDirs {
    pub fn create(site_root: &Path, product_name: &str) -> Result<Self> {
        let root = site_root.join(sanitize_name(product_name));
        let images = root.join("images");
        let docs = root.join("doc_files");

        for dir in [&root, &images, &docs] {
            fs::create_dir_all(dir)?;
        }

        Ok(Self { root, images, docs })
    }

    /// Colour-swatch directory, created on first use. Only some sites
    /// publish per-colour variants.
    pub fn colours(&self) -> Result<PathBuf> {
        let dir = self.root.join("available_colours");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Write `product_data.csv` into the product directory: one header row,
/// one data row. Re-runs overwrite the previous file.
pub fn write_product_csv(dir: &Path, record: &ProductRecord) -> Result<()> {
    let path = dir.join("product_data.csv");
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record(record.columns())?;
    writer.write_record(record.values())?;
    writer.flush()?;

    Ok(())
}

/// Write a downloaded asset to disk, creating parent directories.
pub fn save_asset(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// True when the directory is missing or holds no entries. Used by the
/// shared document folders that are filled once per run corpus.
pub fn dir_is_empty(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_spaces_and_slashes() {
        assert_eq!(sanitize_name("Artisan Plank"), "Artisan_Plank");
        assert_eq!(sanitize_name("Wool/Sisal Mix"), "Wool_Sisal_Mix");
        assert_eq!(sanitize_name("Plain"), "Plain");
    }

    #[test]
    fn product_dirs_create_expected_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = ProductDirs::create(tmp.path(), "Artisan Plank").unwrap();

        assert!(dirs.root.ends_with("Artisan_Plank"));
        assert!(dirs.images.is_dir());
        assert!(dirs.docs.is_dir());
        assert!(!dirs.root.join("available_colours").exists());

        let colours = dirs.colours().unwrap();
        assert!(colours.is_dir());

        // Creating the same product again must not fail.
        ProductDirs::create(tmp.path(), "Artisan Plank").unwrap();
    }

    #[test]
    fn product_csv_has_header_and_one_row() {
        let tmp = tempfile::tempdir().unwrap();
        let mut record = ProductRecord::new("Plain");
        record.push("description", "A carpet.");

        write_product_csv(tmp.path(), &record).unwrap();

        let written = fs::read_to_string(tmp.path().join("product_data.csv")).unwrap();
        assert_eq!(written, "product_name,description\nPlain,A carpet.\n");
    }

    #[test]
    fn save_asset_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("images").join("swatch.jpg");

        save_asset(&path, b"jpeg bytes").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn empty_and_missing_dirs_count_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(dir_is_empty(&tmp.path().join("missing")));
        assert!(dir_is_empty(tmp.path()));

        fs::write(tmp.path().join("file.pdf"), b"x").unwrap();
        assert!(!dir_is_empty(tmp.path()));
    }
}
