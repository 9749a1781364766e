// Executable path overrides - logical command name -> concrete executable

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex-guarded table redirecting command names to executable paths
///
/// Shared by `Arc` between a runner and whoever configures it, so tests can
/// substitute doubles for real binaries without touching call sites.
#[derive(Debug, Default)]
pub struct ExecutableOverrides {
    entries: Mutex<HashMap<String, String>>,
}

impl ExecutableOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, name: impl Into<String>, path: impl Into<String>) {
        self.entries().insert(name.into(), path.into());
    }

    pub fn clear(&self, name: &str) {
        self.entries().remove(name);
    }

    pub fn clear_all(&self) {
        self.entries().clear();
    }

    /// Resolved path, or `name` unchanged when no override exists
    pub fn get(&self, name: &str) -> String {
        self.entries()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// Point-in-time copy of the table
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries().clone()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExecutableOverrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let entries = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_override_round_trip() {
        let overrides = ExecutableOverrides::new();
        assert!(!overrides.has("git"));
        assert_eq!(overrides.get("git"), "git");

        overrides.set("git", "/opt/fake/git");
        assert!(overrides.has("git"));
        assert_eq!(overrides.get("git"), "/opt/fake/git");

        overrides.clear("git");
        assert!(!overrides.has("git"));
        assert_eq!(overrides.get("git"), "git");
    }

    #[test]
    fn test_clear_all_and_snapshot() {
        let overrides: ExecutableOverrides =
            [("git", "/bin/true"), ("docker", "/bin/false")].into_iter().collect();

        let snapshot = overrides.snapshot();
        overrides.clear_all();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("docker").map(String::as_str), Some("/bin/false"));
        assert!(overrides.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let overrides = Arc::new(ExecutableOverrides::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let overrides = Arc::clone(&overrides);
                std::thread::spawn(move || overrides.set(format!("tool{}", i), format!("/bin/tool{}", i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(overrides.snapshot().len(), 8);
        assert_eq!(overrides.get("tool3"), "/bin/tool3");
    }
}
