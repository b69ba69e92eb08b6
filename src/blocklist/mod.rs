//! The active set of blocklist keywords.
//!
//! Keywords are substrings, not exact identifiers: an app is blocked when its
//! identifier contains any keyword. `replace` swaps the whole list at once, so
//! a reader holding a [`BlocklistSnapshot`] sees either the old list or the
//! new one in full.

use crate::models::AppIdentifier;
use crate::validation::validate_keyword;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Immutable view of the keywords, in insertion order of the last `replace`.
pub type BlocklistSnapshot = Arc<[AppIdentifier]>;

/// Outcome of a `replace` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlocklistUpdate {
    /// Keywords now active.
    pub installed: usize,
    /// Entries dropped as empty or too long.
    pub rejected: usize,
    /// Entries dropped because an earlier entry normalized to the same keyword.
    pub duplicates: usize,
    /// Non-string entries dropped while decoding a JSON payload.
    pub malformed: usize,
}

/// Shared handle to the active keyword list. Cloning shares the same list.
#[derive(Debug, Clone)]
pub struct Blocklist {
    active: Arc<RwLock<BlocklistSnapshot>>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new()
    }
}

impl Blocklist {
    pub fn new() -> Self {
        Self {
            active: Arc::new(RwLock::new(Arc::from(Vec::new()))),
        }
    }

    /// Replace the active keywords wholesale.
    pub fn replace<I, S>(&self, keywords: I) -> BlocklistUpdate
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut update = BlocklistUpdate::default();
        let mut seen = HashSet::new();
        let mut next = Vec::new();

        for raw in keywords {
            let Ok(keyword) = validate_keyword(raw.as_ref()) else {
                update.rejected += 1;
                continue;
            };
            let keyword = AppIdentifier::new(keyword);
            if seen.insert(keyword.clone()) {
                next.push(keyword);
            } else {
                update.duplicates += 1;
            }
        }
        update.installed = next.len();

        let next: BlocklistSnapshot = Arc::from(next);
        {
            let mut active = match self.active.write() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    warn!("Blocklist: lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            *active = Arc::clone(&next);
        }

        if update.rejected > 0 {
            warn!("Blocklist: rejected {} empty or oversized keyword(s)", update.rejected);
        }
        info!("Blocked list updated: {:?}", keywords_for_log(&next));

        update
    }

    /// Consistent view for one resolution cycle.
    pub fn snapshot(&self) -> BlocklistSnapshot {
        let active = match self.active.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Blocklist: lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        Arc::clone(&active)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

fn keywords_for_log(keywords: &[AppIdentifier]) -> Vec<&str> {
    keywords.iter().map(AppIdentifier::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn as_strs(snapshot: &BlocklistSnapshot) -> Vec<&str> {
        snapshot.iter().map(AppIdentifier::as_str).collect()
    }

    #[test]
    fn test_new_blocklist_is_empty() {
        let blocklist = Blocklist::new();
        assert!(blocklist.is_empty());
        assert_eq!(blocklist.len(), 0);
    }

    #[test]
    fn test_replace_normalizes_and_dedupes_in_order() {
        let blocklist = Blocklist::new();
        let update = blocklist.replace(["Instagram", "tiktok", "INSTAGRAM", "reddit"]);

        assert_eq!(
            update,
            BlocklistUpdate { installed: 3, rejected: 0, duplicates: 1, malformed: 0 }
        );
        assert_eq!(as_strs(&blocklist.snapshot()), vec!["instagram", "tiktok", "reddit"]);
    }

    #[test]
    fn test_replace_is_wholesale_not_merge() {
        let blocklist = Blocklist::new();
        blocklist.replace(["instagram", "tiktok"]);
        blocklist.replace(["youtube"]);

        assert_eq!(as_strs(&blocklist.snapshot()), vec!["youtube"]);

        blocklist.replace(Vec::<String>::new());
        assert!(blocklist.is_empty());
    }

    #[test]
    fn test_replace_rejects_empty_keywords() {
        let blocklist = Blocklist::new();
        let update = blocklist.replace(["", "  ", "youtube"]);

        assert_eq!(update.installed, 1);
        assert_eq!(update.rejected, 2);
        assert_eq!(as_strs(&blocklist.snapshot()), vec!["youtube"]);
    }

    #[test]
    fn test_snapshot_survives_later_replace() {
        let blocklist = Blocklist::new();
        blocklist.replace(["instagram"]);
        let before = blocklist.snapshot();

        blocklist.replace(["tiktok"]);

        assert_eq!(as_strs(&before), vec!["instagram"]);
        assert_eq!(as_strs(&blocklist.snapshot()), vec!["tiktok"]);
    }

    #[test]
    fn test_clones_share_the_same_list() {
        let blocklist = Blocklist::new();
        let handle = blocklist.clone();
        handle.replace(["reddit"]);
        assert_eq!(as_strs(&blocklist.snapshot()), vec!["reddit"]);
    }

    #[test]
    fn test_concurrent_replace_never_tears() {
        let old = ["a", "b", "c", "d"];
        let new = ["w", "x", "y"];

        let blocklist = Blocklist::new();
        blocklist.replace(old);

        let writer = {
            let blocklist = blocklist.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    if i % 2 == 0 {
                        blocklist.replace(new);
                    } else {
                        blocklist.replace(old);
                    }
                }
            })
        };

        for _ in 0..2_000 {
            let snapshot = blocklist.snapshot();
            let seen = as_strs(&snapshot);
            assert!(
                seen == old.to_vec() || seen == new.to_vec(),
                "torn snapshot: {seen:?}"
            );
        }

        writer.join().unwrap();
    }
}
