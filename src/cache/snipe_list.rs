//! File-backed snipe allow-list
//!
//! One base58 authority per line. Blank lines and `#` comments are ignored.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Membership check against the operator's allow-list
pub trait SnipeAllowList: Send + Sync {
    fn contains(&self, authority: &Pubkey) -> bool;
}

/// Allow-list loaded from a text file
pub struct SnipeListCache {
    path: PathBuf,
    entries: RwLock<HashSet<Pubkey>>,
}

impl SnipeListCache {
    /// Load the list from `path`
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self {
            path: path.into(),
            entries: RwLock::new(HashSet::new()),
        };
        cache.reload()?;
        Ok(cache)
    }

    /// Re-read the file, replacing the current entries
    pub fn reload(&self) -> Result<usize> {
        let contents = std::fs::read_to_string(&self.path)?;
        let entries = parse_entries(&contents, &self.path);
        let count = entries.len();

        let mut guard = self
            .entries
            .write()
            .map_err(|_| Error::Internal("Snipe list lock poisoned".to_string()))?;
        *guard = entries;

        debug!("Loaded {} snipe list entries from {}", count, self.path.display());
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload the file every `interval` until `cancel` fires
    pub fn spawn_refresh(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Snipe list refresh stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = cache.reload() {
                            warn!("Snipe list reload failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}

impl SnipeAllowList for SnipeListCache {
    fn contains(&self, authority: &Pubkey) -> bool {
        self.entries
            .read()
            .map(|set| set.contains(authority))
            .unwrap_or(false)
    }
}

/// A fixed set; the runner uses an empty one when the list is disabled
impl SnipeAllowList for HashSet<Pubkey> {
    fn contains(&self, authority: &Pubkey) -> bool {
        HashSet::contains(self, authority)
    }
}

fn parse_entries(contents: &str, path: &Path) -> HashSet<Pubkey> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Pubkey::from_str(line) {
            Ok(key) => Some(key),
            Err(_) => {
                warn!("Skipping invalid snipe list entry in {}: {}", path.display(), line);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_and_contains() {
        let listed = Pubkey::new_unique();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# operators").unwrap();
        writeln!(file, "{}", listed).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not-a-key").unwrap();

        let cache = SnipeListCache::load(file.path()).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&listed));
        assert!(!cache.contains(&Pubkey::new_unique()));
    }

    #[test]
    fn test_reload_replaces_entries() {
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", first).unwrap();

        let cache = SnipeListCache::load(file.path()).unwrap();
        assert!(cache.contains(&first));

        std::fs::write(file.path(), format!("{}\n", second)).unwrap();
        assert_eq!(cache.reload().unwrap(), 1);
        assert!(!cache.contains(&first));
        assert!(cache.contains(&second));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(SnipeListCache::load("/nonexistent/snipe-list.txt").is_err());
    }
}
