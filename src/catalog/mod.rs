//! The set of videos known to a run.
//!
//! The catalog is built once per run by scanning the working directory and
//! any extra patterns given on the command line. Every recording is reduced
//! to one [`Item`] per key; when several files share a key, the most
//! processed one wins.

mod classifier;

pub use classifier::Classifier;

use gool_common::paths::{remove_superseded, WorkDirs};
use gool_common::{Error, Item, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Videos of one run, ordered by key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<String, Item>,
}

/// Result of a scan: the catalog plus the files that were skipped.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub catalog: Catalog,
    pub errors: Vec<Error>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, merging it with an existing item of the same key.
    ///
    /// The more processed file wins. With `cleanup` the losing file is
    /// deleted. Between equal statuses the later file wins.
    pub fn insert(&mut self, item: Item, cleanup: bool) {
        match self.items.entry(item.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if item.status < existing.status {
                    tracing::debug!(
                        "{:?} superseded by {:?}",
                        item.path,
                        existing.path
                    );
                    if cleanup && !same_file(&item.path, &existing.path) {
                        remove_superseded(&item.path);
                    }
                    return;
                }

                tracing::debug!("{:?} supersedes {:?}", item.path, existing.path);
                if cleanup && !same_file(&item.path, &existing.path) {
                    remove_superseded(&existing.path);
                }
                *existing = item;
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    /// Replace the stored item with the same key.
    pub fn update(&mut self, item: Item) {
        self.items.insert(item.key.clone(), item);
    }

    /// All items, ordered by key.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Scan the working directory plus `extra_patterns` and build the catalog.
///
/// Files that aren't OTR recordings are skipped and reported in
/// [`ScanReport::errors`]. Fails with [`Error::NoLocations`] only if none
/// of the locations could be read.
pub fn build(dirs: &WorkDirs, extra_patterns: &[String], cleanup: bool) -> Result<ScanReport> {
    let classifier =
        Classifier::new().map_err(|e| Error::config(format!("recording name pattern: {e}")))?;

    let mut patterns = dirs.scan_patterns();
    patterns.extend(extra_patterns.iter().cloned());

    let mut report = ScanReport::default();
    let mut readable = 0usize;

    for pattern in &patterns {
        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Invalid pattern '{}': {}", pattern, e);
                continue;
            }
        };
        if !location_exists(pattern) {
            tracing::debug!("Location of '{}' does not exist", pattern);
            continue;
        }
        readable += 1;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Cannot read {:?}: {}", e.path(), e.error());
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            // One spelling per file, whatever pattern reached it
            let path = std::fs::canonicalize(&path)
                .or_else(|_| std::path::absolute(&path))
                .unwrap_or(path);

            match classifier.classify(&path) {
                Ok(item) => report.catalog.insert(item, cleanup),
                Err(e) => {
                    tracing::debug!("Skipping: {}", e);
                    report.errors.push(e);
                }
            }
        }
    }

    if readable == 0 {
        return Err(Error::NoLocations);
    }

    tracing::info!(
        "Found {} videos, skipped {} files",
        report.catalog.len(),
        report.errors.len()
    );
    Ok(report)
}

/// Whether two paths name the same file, following `..` and symlinks.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether the fixed directory part of a glob pattern exists.
fn location_exists(pattern: &str) -> bool {
    let is_wildcard = |s: &str| s.contains(['*', '?', '[']);

    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut wildcard = false;
    for component in path.components() {
        if let Component::Normal(part) = component {
            if is_wildcard(&part.to_string_lossy()) {
                wildcard = true;
                break;
            }
        }
        base.push(component);
    }

    if !wildcard {
        base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    }
    if base.as_os_str().is_empty() {
        return true;
    }
    base.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gool_common::VideoStatus;

    const KEY: &str = "Doku_21.01.01_20-15_arte_60_TVOON_DE.mpg.HQ";

    fn item(status: VideoStatus, path: &str) -> Item {
        Item::new(KEY, status, path, ".avi")
    }

    #[test]
    fn test_more_advanced_status_wins_in_either_order() {
        let mut catalog = Catalog::new();
        catalog.insert(item(VideoStatus::Decoded, "/a"), false);
        catalog.insert(item(VideoStatus::Raw, "/b"), false);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(KEY).unwrap().status, VideoStatus::Decoded);
        assert_eq!(catalog.get(KEY).unwrap().path, Path::new("/a"));

        catalog.insert(item(VideoStatus::Cut, "/c"), false);
        assert_eq!(catalog.get(KEY).unwrap().status, VideoStatus::Cut);
    }

    #[test]
    fn test_equal_status_later_path_wins() {
        let mut catalog = Catalog::new();
        catalog.insert(item(VideoStatus::Decoded, "/first"), false);
        catalog.insert(item(VideoStatus::Decoded, "/second"), false);
        assert_eq!(catalog.get(KEY).unwrap().path, Path::new("/second"));
    }

    #[test]
    fn test_location_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_string_lossy().into_owned();
        assert!(location_exists(&format!("{dir}/*")));
        assert!(location_exists(&format!("{dir}/*.otrkey")));
        assert!(location_exists(&format!("{dir}/single.avi")));
        assert!(!location_exists(&format!("{dir}/missing/*")));
        assert!(location_exists("*.avi"));
    }

    #[test]
    fn test_same_file_through_parent_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a").join("video.avi");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::create_dir_all(tmp.path().join("b")).unwrap();
        std::fs::write(&file, b"x").unwrap();

        let alias = tmp.path().join("b").join("..").join("a").join("video.avi");
        assert!(same_file(&file, &alias));
        assert!(!same_file(&file, &tmp.path().join("a").join("other.avi")));
    }

    #[test]
    fn test_equal_status_alias_is_not_deleted() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join(format!("{KEY}.avi"));
        std::fs::write(&file, b"x").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let alias = tmp.path().join("sub").join("..").join(format!("{KEY}.avi"));

        let mut catalog = Catalog::new();
        catalog.insert(Item::new(KEY, VideoStatus::Decoded, &file, ".avi"), true);
        catalog.insert(Item::new(KEY, VideoStatus::Decoded, &alias, ".avi"), true);

        assert_eq!(catalog.len(), 1);
        assert!(file.exists());
    }

    #[test]
    fn test_update_replaces_item() {
        let mut catalog = Catalog::new();
        catalog.insert(item(VideoStatus::Raw, "/a"), false);
        let mut updated = item(VideoStatus::Decoded, "/b");
        updated.result = gool_common::ItemResult::Ok;
        catalog.update(updated.clone());
        assert_eq!(catalog.get(KEY), Some(&updated));
    }
}
