//! Decoded template cache
//!
//! Keeps decoded scenes keyed by file path so restarting a session does not
//! decode the template again. An entry is only reused while the file's
//! modification time matches the one it was decoded from.

use super::LoadedScene;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Lookups that found an entry for a file changed since it was decoded
    pub stale: u64,
    pub total_vertices: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f32 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f32 / lookups as f32
    }
}

struct Slot {
    scene: LoadedScene,
    modified: Option<SystemTime>,
    last_used: u64,
}

/// Least-recently-used cache of decoded scenes
pub struct MeshCache {
    slots: HashMap<PathBuf, Slot>,
    capacity: usize,
    tick: u64,
    hits: u64,
    misses: u64,
    stale: u64,
}

impl MeshCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
            hits: 0,
            misses: 0,
            stale: 0,
        }
    }

    /// Look up `path` as decoded at `modified`
    ///
    /// A slot decoded from a different modification time is dropped and the
    /// lookup counts as a miss.
    pub fn get(&mut self, path: &Path, modified: Option<SystemTime>) -> Option<&LoadedScene> {
        self.tick += 1;

        let fresh = match self.slots.get(path) {
            Some(slot) => slot.modified == modified,
            None => {
                self.misses += 1;
                return None;
            }
        };
        if !fresh {
            tracing::debug!("{} changed on disk, decoding again", path.display());
            self.slots.remove(path);
            self.stale += 1;
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        let tick = self.tick;
        self.slots.get_mut(path).map(|slot| {
            slot.last_used = tick;
            &slot.scene
        })
    }

    pub fn insert(&mut self, path: PathBuf, modified: Option<SystemTime>, scene: LoadedScene) {
        self.tick += 1;

        if !self.slots.contains_key(&path) {
            while self.slots.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        self.slots.insert(
            path,
            Slot {
                scene,
                modified,
                last_used: self.tick,
            },
        );
    }

    /// Drop every entry and reset the counters
    pub fn clear(&mut self) {
        self.slots.clear();
        self.tick = 0;
        self.hits = 0;
        self.misses = 0;
        self.stale = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.slots.len(),
            hits: self.hits,
            misses: self.misses,
            stale: self.stale,
            total_vertices: self.slots.values().map(|s| s.scene.total_vertices()).sum(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.slots.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(path, _)| path.clone());

        match oldest {
            Some(path) => {
                tracing::trace!("evicting {} from template cache", path.display());
                self.slots.remove(&path);
                true
            }
            None => false,
        }
    }
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn p(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    #[test]
    fn test_least_recently_used_goes_first() {
        let mut cache = MeshCache::new(2);
        cache.insert(p("chair.glb"), None, LoadedScene::new("chair"));
        cache.insert(p("lamp.glb"), None, LoadedScene::new("lamp"));

        cache.get(&p("chair.glb"), None);
        cache.insert(p("plant.obj"), None, LoadedScene::new("plant"));

        assert!(cache.contains(&p("chair.glb")));
        assert!(!cache.contains(&p("lamp.glb")));
        assert!(cache.contains(&p("plant.obj")));
    }

    #[test]
    fn test_replacing_an_entry_keeps_others() {
        let mut cache = MeshCache::new(2);
        cache.insert(p("chair.glb"), None, LoadedScene::new("chair"));
        cache.insert(p("lamp.glb"), None, LoadedScene::new("lamp"));
        cache.insert(p("lamp.glb"), None, LoadedScene::new("lamp v2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&p("lamp.glb"), None).unwrap().name, "lamp v2");
    }

    #[test]
    fn test_changed_file_is_a_miss() {
        let decoded = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let edited = decoded + Duration::from_secs(5);

        let mut cache = MeshCache::default();
        cache.insert(p("chair.glb"), Some(decoded), LoadedScene::new("chair"));

        assert!(cache.get(&p("chair.glb"), Some(decoded)).is_some());
        assert!(cache.get(&p("chair.glb"), Some(edited)).is_none());
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stale, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-6);
    }
}
