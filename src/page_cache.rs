use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "fbref_explorer";
const CACHE_FILE: &str = "page_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PageCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: i64,
}

/// Time-boxed store of fetched page bodies keyed by URL. Backed by a JSON file
/// when a path is given, memory only otherwise.
pub struct PageCache {
    ttl: Duration,
    path: Option<PathBuf>,
    state: Mutex<Option<PageCacheFile>>,
}

impl PageCache {
    pub fn new(ttl: Duration, path: Option<PathBuf>) -> Self {
        Self {
            ttl,
            path,
            state: Mutex::new(None),
        }
    }

    /// Cache file under the user cache directory.
    pub fn on_disk(ttl: Duration) -> Self {
        Self::new(ttl, cache_path())
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let mut guard = self.state.lock().ok()?;
        let cache = guard.get_or_insert_with(|| self.load());
        let entry = cache.entries.get(url)?;
        let age = Utc::now().timestamp().saturating_sub(entry.fetched_at);
        if age < 0 || age as u64 >= self.ttl.as_secs() {
            debug!("page cache stale for {url} ({age}s)");
            return None;
        }
        debug!("page cache hit for {url}");
        Some(entry.body.clone())
    }

    pub fn put(&self, url: &str, body: &str) {
        let Ok(mut guard) = self.state.lock() else {
            return;
        };
        let cache = guard.get_or_insert_with(|| self.load());
        cache.version = CACHE_VERSION;
        let now = Utc::now().timestamp();
        let ttl = self.ttl.as_secs() as i64;
        cache.entries.retain(|_, e| now - e.fetched_at < ttl);
        cache.entries.insert(
            url.to_string(),
            CacheEntry {
                body: body.to_string(),
                fetched_at: now,
            },
        );
        if let Err(err) = self.save(cache) {
            debug!("page cache not saved: {err:#}");
        }
    }

    fn load(&self) -> PageCacheFile {
        let Some(path) = self.path.as_ref() else {
            return PageCacheFile::default();
        };
        let Ok(raw) = fs::read_to_string(path) else {
            return PageCacheFile::default();
        };
        let cache = serde_json::from_str::<PageCacheFile>(&raw).unwrap_or_default();
        if cache.version != CACHE_VERSION {
            return PageCacheFile::default();
        }
        cache
    }

    fn save(&self, cache: &PageCacheFile) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(cache).context("serialize page cache")?;
        fs::write(&tmp, json).context("write page cache")?;
        fs::rename(&tmp, path).context("swap page cache")?;
        Ok(())
    }
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}
