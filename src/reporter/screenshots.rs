//! Screenshot lookup
//!
//! The reporter asks whether a capture exists only at the instant a test is
//! finalized. Captures registered later are not attached.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::models::TestId;

/// Point-in-time view of captured screenshots
pub trait ScreenshotSource {
    fn has_captured_for(&self, test: TestId) -> bool;

    fn path_for(&self, test: TestId) -> Option<PathBuf>;
}

/// Shared registry written by lanes and read by the reporter
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct ScreenshotRegistry {
    captures: Arc<RwLock<HashMap<TestId, PathBuf>>>,
}

impl ScreenshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a capture; the first path registered for a test wins
    pub fn register(&self, test: TestId, path: impl Into<PathBuf>) {
        let mut captures = self.captures.write().unwrap_or_else(|e| e.into_inner());
        captures.entry(test).or_insert_with(|| path.into());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.captures.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ScreenshotSource for ScreenshotRegistry {
    fn has_captured_for(&self, test: TestId) -> bool {
        self.captures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&test)
    }

    fn path_for(&self, test: TestId) -> Option<PathBuf> {
        self.captures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&test)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_shared_between_clones() {
        let registry = ScreenshotRegistry::new();
        let writer = registry.clone();

        assert!(!registry.has_captured_for(TestId(0)));
        writer.register(TestId(0), "shots/0.png");
        writer.register(TestId(0), "shots/0-again.png");

        assert!(registry.has_captured_for(TestId(0)));
        assert_eq!(registry.path_for(TestId(0)), Some(PathBuf::from("shots/0.png")));
        assert_eq!(registry.len(), 1);
    }
}
