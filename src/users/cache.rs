use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::plans::model::DietPlan;
use crate::users::repo::UserRecord;

/// Denormalized user projection held in the process-local cache: the
/// directory record minus credentials, plus an embedded snapshot of the
/// referenced diet plan (absent when the user has none).
#[derive(Debug, Clone, Serialize)]
pub struct CachedUser {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub diet_plan: Option<DietPlan>,
}

impl CachedUser {
    pub fn from_record(record: UserRecord, diet_plan: Option<DietPlan>) -> Self {
        CachedUser {
            id: record.id,
            email: record.email,
            username: record.username,
            created_at: record.created_at,
            diet_plan,
        }
    }
}

struct CacheEntry {
    snapshot: CachedUser,
    stored_at: Instant,
}

impl CacheEntry {
    fn fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// TTL-bound user-snapshot cache. Entries expire a fixed window after
/// insertion regardless of invalidation activity; a periodic sweeper
/// removes the carcasses. Per-key replace is atomic via the underlying
/// map; no cross-key atomicity is provided or needed. Concurrent misses on
/// one key may both fetch and both write equivalent snapshots.
pub struct UserCache {
    entries: DashMap<Uuid, CacheEntry>,
    ttl: Duration,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, user_id: Uuid) -> Option<CachedUser> {
        {
            let entry = self.entries.get(&user_id)?;
            if entry.fresh(self.ttl) {
                return Some(entry.snapshot.clone());
            }
        }
        self.entries.remove(&user_id);
        None
    }

    pub fn insert(&self, snapshot: CachedUser) {
        self.entries.insert(
            snapshot.id,
            CacheEntry {
                snapshot,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }

    /// Replaces the embedded diet-plan snapshot of an existing fresh
    /// entry. Users with no live entry are left alone; the cache is
    /// populated lazily on the next profile read, never backfilled here.
    pub fn set_plan(&self, user_id: Uuid, plan: Option<DietPlan>) -> bool {
        match self.entries.get_mut(&user_id) {
            Some(mut entry) if entry.fresh(self.ttl) => {
                entry.snapshot.diet_plan = plan;
                true
            }
            _ => false,
        }
    }

    /// Drops expired entries; returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.fresh(self.ttl));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn spawn_sweeper(cache: Arc<UserCache>, period: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        loop {
            tick.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                debug!(removed, remaining = cache.len(), "user cache sweep");
            }
        }
    });
}
