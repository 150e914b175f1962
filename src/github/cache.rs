//! NF-013: On-disk cache for recipe listings — load, save (atomic),
//! explicit expiry.

use super::api::RecipeListing;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// A cached listing with its fetch time and time-to-live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedListing {
    pub fetched_at: u64,
    pub ttl_seconds: u64,
    pub recipes: Vec<RecipeListing>,
}

/// Expiry state of a cached listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
    pub is_valid: bool,
    pub expires_at: u64,
    pub age_seconds: u64,
}

impl CachedListing {
    pub fn new(recipes: Vec<RecipeListing>, now: u64) -> Self {
        Self {
            fetched_at: now,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            recipes,
        }
    }

    pub fn info(&self, now: u64) -> CacheInfo {
        let expires_at = self.fetched_at.saturating_add(self.ttl_seconds);
        CacheInfo {
            is_valid: now < expires_at,
            expires_at,
            age_seconds: now.saturating_sub(self.fetched_at),
        }
    }
}

/// Seconds since the epoch.
pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Derive the cache file path for a repository.
pub fn cache_file_path(cache_dir: &Path, owner: &str, repo: &str, branch: &str) -> PathBuf {
    let branch = branch.replace('/', "-");
    cache_dir.join(format!("{}-{}-{}.json", owner, repo, branch))
}

/// Load a cached listing. Returns None if the file doesn't exist.
pub fn load(
    cache_dir: &Path,
    owner: &str,
    repo: &str,
    branch: &str,
) -> Result<Option<CachedListing>, String> {
    let path = cache_file_path(cache_dir, owner, repo, branch);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let cached: CachedListing = serde_json::from_str(&content)
        .map_err(|e| format!("invalid cache file {}: {}", path.display(), e))?;
    Ok(Some(cached))
}

/// Save a cached listing atomically (write to temp, then rename).
pub fn save(
    cache_dir: &Path,
    owner: &str,
    repo: &str,
    branch: &str,
    cached: &CachedListing,
) -> Result<(), String> {
    let path = cache_file_path(cache_dir, owner, repo, branch);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create cache dir {}: {}", parent.display(), e))?;
    }

    let json =
        serde_json::to_string_pretty(cached).map_err(|e| format!("serialize error: {}", e))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, &path).map_err(|e| {
        format!(
            "cannot rename {} -> {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;

    Ok(())
}

/// Remove a cached listing. Returns whether anything was removed.
pub fn clear(cache_dir: &Path, owner: &str, repo: &str, branch: &str) -> Result<bool, String> {
    let path = cache_file_path(cache_dir, owner, repo, branch);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path).map_err(|e| format!("cannot remove {}: {}", path.display(), e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str) -> RecipeListing {
        RecipeListing {
            name: name.to_string(),
            path: format!("recipes/{}", name),
            sha: "abc".to_string(),
            commit: None,
        }
    }

    #[test]
    fn test_nf013_cache_file_path() {
        let p = cache_file_path(Path::new("/cache"), "neurodesk", "neurocontainers", "main");
        assert_eq!(
            p,
            PathBuf::from("/cache/neurodesk-neurocontainers-main.json")
        );
    }

    #[test]
    fn test_nf013_branch_slashes_flattened() {
        let p = cache_file_path(Path::new("/cache"), "o", "r", "feature/x");
        assert_eq!(p, PathBuf::from("/cache/o-r-feature-x.json"));
    }

    #[test]
    fn test_nf013_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedListing::new(vec![listing("qsmxt")], 1000);
        save(dir.path(), "o", "r", "b", &cached).unwrap();

        let loaded = load(dir.path(), "o", "r", "b").unwrap().unwrap();
        assert_eq!(loaded, cached);
    }

    #[test]
    fn test_nf013_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path(), "o", "r", "b").unwrap().is_none());
    }

    #[test]
    fn test_nf013_load_corrupt_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_file_path(dir.path(), "o", "r", "b");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(dir.path(), "o", "r", "b").is_err());
    }

    #[test]
    fn test_nf013_atomic_write_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedListing::new(vec![], 0);
        save(dir.path(), "o", "r", "b", &cached).unwrap();
        let tmp = cache_file_path(dir.path(), "o", "r", "b").with_extension("json.tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_nf013_expiry_window() {
        let cached = CachedListing::new(vec![], 1000);

        let fresh = cached.info(1000);
        assert!(fresh.is_valid);
        assert_eq!(fresh.expires_at, 1000 + DEFAULT_TTL_SECONDS);
        assert_eq!(fresh.age_seconds, 0);

        let almost = cached.info(1000 + DEFAULT_TTL_SECONDS - 1);
        assert!(almost.is_valid);

        let expired = cached.info(1000 + DEFAULT_TTL_SECONDS);
        assert!(!expired.is_valid);
        assert_eq!(expired.age_seconds, DEFAULT_TTL_SECONDS);
    }

    #[test]
    fn test_nf013_clear() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!clear(dir.path(), "o", "r", "b").unwrap());

        let cached = CachedListing::new(vec![listing("x")], 0);
        save(dir.path(), "o", "r", "b", &cached).unwrap();
        assert!(clear(dir.path(), "o", "r", "b").unwrap());
        assert!(load(dir.path(), "o", "r", "b").unwrap().is_none());
    }
}
