use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Process-local store with the same command semantics as the networked one.
///
/// Expired entries are dropped lazily when touched. Single-key commands run
/// under the shard lock, so `get_del` has exactly one winner per key.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: DashMap<String, Entry>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.value().is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, e| !e.is_live(now));
    }
}

// Scan cursors are positions in hash order, so deleting keys between steps
// does not shift the keys that are still to come. Never zero.
fn scan_position(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish() | 1
}

/// Redis-style glob with `*` and `?`.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    let p = pattern.as_bytes();
    let k = key.as_bytes();
    let (mut pi, mut ki) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        match p.get(pi) {
            Some(b'*') => {
                star = Some((pi, ki));
                pi += 1;
            }
            Some(&c) if c == b'?' || c == k[ki] => {
                pi += 1;
                ki += 1;
            }
            _ => match star {
                Some((sp, sk)) => {
                    pi = sp + 1;
                    ki = sk + 1;
                    star = Some((sp, sk + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == b'*')
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        if ttl_secs == 0 {
            return Err(StoreError::Rejected("invalid expire time in 'set' command".into()));
        }
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        match self.entries.entry(key.to_owned()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(Entry {
                    value: value.to_owned(),
                    expires_at: None,
                });
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry {
                    value: value.to_owned(),
                    expires_at: None,
                });
            }
        }
        Ok(true)
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_owned()).or_insert(Entry {
            value: "0".to_owned(),
            expires_at: None,
        });
        if !entry.is_live(now) {
            *entry = Entry {
                value: "0".to_owned(),
                expires_at: None,
            };
        }
        let next = entry
            .value
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                StoreError::Rejected("value is not an integer or out of range".into())
            })?;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .map(|e| e.is_live(now).then(|| e.value.clone()));
        match found {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                self.purge(key, now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn del(&self, keys: &[String]) -> Result<u64, StoreError> {
        let now = Instant::now();
        let deleted = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .filter(|(_, e)| e.is_live(now))
            .count();
        Ok(deleted as u64)
    }

    async fn get_del(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, e)| e.is_live(now))
            .map(|(_, e)| e.value))
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>), StoreError> {
        let now = Instant::now();
        let mut matching: Vec<(u64, String)> = self
            .entries
            .iter()
            .filter(|e| e.value().is_live(now) && glob_match(pattern, e.key()))
            .map(|e| (scan_position(e.key()), e.key().clone()))
            .filter(|(pos, _)| *pos >= cursor)
            .collect();
        matching.sort();

        let count = count.max(1);
        let next = matching.get(count).map(|(pos, _)| *pos).unwrap_or(0);
        let batch = matching.into_iter().take(count).map(|(_, key)| key).collect();
        Ok((next, batch))
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = Instant::now();
        Ok(self.entries.get(key).and_then(|e| match e.expires_at {
            Some(at) if at > now => Some((at - now).as_secs_f64().ceil() as u64),
            _ => None,
        }))
    }
}
