//! Fixed-capacity session registry (component D).
//!
//! The original implementation is a fixed C array of ten slots searched
//! linearly by UUID. The rewrite keeps the capacity bound and index
//! stability (design note: "indexed arena") but adds a `playback_uuid ->
//! index` map alongside the slot array so lookups don't need a linear scan.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::RegistryError;
use crate::session::Session;

pub const CAPACITY: usize = 10;

struct Slots {
    sessions: Vec<Option<Arc<Session>>>,
    by_uuid: HashMap<String, usize>,
    current: Option<usize>,
}

impl Slots {
    fn new(capacity: usize) -> Self {
        Self {
            sessions: vec![None; capacity],
            by_uuid: HashMap::new(),
            current: None,
        }
    }
}

/// Shared, lock-guarded slot table. Lock order is registry-then-session:
/// callers must drop the registry guard before locking a returned
/// session's own mutex.
pub struct SessionRegistry {
    capacity: usize,
    min_video_duration_seconds: f32,
    slots: Mutex<Slots>,
}

impl SessionRegistry {
    pub fn new(capacity: usize, min_video_duration_seconds: f32) -> Self {
        Self {
            capacity,
            min_video_duration_seconds,
            slots: Mutex::new(Slots::new(capacity)),
        }
    }

    pub async fn get_by_uuid(&self, playback_uuid: &str) -> Option<Arc<Session>> {
        let slots = self.slots.lock().await;
        let index = *slots.by_uuid.get(playback_uuid)?;
        slots.sessions[index].clone()
    }

    /// Prune advertisements (stored duration below the configured
    /// threshold), then insert `session` into the first empty slot
    /// (`new_index`). If that insertion fills every slot, evict the slot at
    /// `(new_index + 1) % capacity` immediately afterwards so a spare slot
    /// is always available for the next `insert_new` — mirrors the original
    /// implementation's proactive "ensure that space will always be
    /// available for adding future playlists" step, not a reactive/LRU
    /// eviction.
    pub async fn insert_new(&self, session: Arc<Session>) -> Result<usize, RegistryError> {
        self.prune_advertisements().await;

        let mut slots = self.slots.lock().await;
        let new_index = slots
            .sessions
            .iter()
            .position(|s| s.is_none())
            .ok_or(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            })?;

        slots.by_uuid.insert(session.playback_uuid().to_string(), new_index);
        slots.sessions[new_index] = Some(session);
        slots.current = Some(new_index);

        let occupied = slots.sessions.iter().filter(|s| s.is_some()).count();
        if occupied == self.capacity {
            let evict_at = (new_index + 1) % self.capacity;
            if let Some(evicted) = slots.sessions[evict_at].take() {
                tracing::info!(
                    playback_uuid = evicted.playback_uuid(),
                    "evicting slot {} at capacity (wrap-around after insertion at {})",
                    evict_at,
                    new_index
                );
                slots.by_uuid.remove(evicted.playback_uuid());
            }
        }

        Ok(new_index)
    }

    async fn prune_advertisements(&self) {
        let mut evicted = Vec::new();
        {
            let slots = self.slots.lock().await;
            for (index, slot) in slots.sessions.iter().enumerate() {
                if let Some(session) = slot {
                    if slots.current != Some(index)
                        && session.stored_duration_seconds().await < self.min_video_duration_seconds
                    {
                        evicted.push(index);
                    }
                }
            }
        }
        if evicted.is_empty() {
            return;
        }
        let mut slots = self.slots.lock().await;
        for index in evicted {
            if let Some(session) = slots.sessions[index].take() {
                tracing::info!(
                    playback_uuid = session.playback_uuid(),
                    "pruning advertisement slot {}",
                    index
                );
                slots.by_uuid.remove(session.playback_uuid());
            }
        }
    }

    pub async fn remove(&self, index: usize) {
        let mut slots = self.slots.lock().await;
        if let Some(session) = slots.sessions[index].take() {
            slots.by_uuid.remove(session.playback_uuid());
        }
        if slots.current == Some(index) {
            slots.current = None;
        }
    }

    pub async fn set_current(&self, index: usize) {
        self.slots.lock().await.current = Some(index);
    }

    pub async fn clear_current_if(&self, index: usize) {
        let mut slots = self.slots.lock().await;
        if slots.current == Some(index) {
            slots.current = None;
        }
    }

    pub async fn current(&self) -> Option<usize> {
        self.slots.lock().await.current
    }

    pub async fn index_of(&self, playback_uuid: &str) -> Option<usize> {
        self.slots.lock().await.by_uuid.get(playback_uuid).copied()
    }

    pub async fn get_by_index(&self, index: usize) -> Option<Arc<Session>> {
        self.slots.lock().await.sessions.get(index).cloned().flatten()
    }

    /// Scan for the session whose mutable `apple_session_id` currently
    /// matches `apple_session_id`. Used by `/action`, which (unlike `/play`)
    /// has no `playback_uuid` in its `unhandledURLResponse` schema and so
    /// must correlate by the header every forward request carries instead.
    pub async fn find_by_apple_session_id(&self, apple_session_id: &str) -> Option<Arc<Session>> {
        let sessions: Vec<Arc<Session>> = {
            let slots = self.slots.lock().await;
            slots.sessions.iter().filter_map(|s| s.clone()).collect()
        };
        for session in sessions {
            if session.apple_session_id().await == apple_session_id {
                return Some(session);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::LoggingPlayer;

    fn uuid(tag: char) -> String {
        tag.to_string().repeat(36)
    }

    fn player() -> Arc<dyn crate::player::PlayerCallbacks> {
        Arc::new(LoggingPlayer)
    }

    #[tokio::test]
    async fn insert_and_lookup_round_trips() {
        let registry = SessionRegistry::new(CAPACITY, 90.0);
        let session = Arc::new(Session::new(uuid('a'), 7100, "en".to_string(), player()).unwrap());
        let index = registry.insert_new(session.clone()).await.unwrap();
        assert_eq!(index, 0);
        let found = registry.get_by_uuid(&uuid('a')).await.unwrap();
        assert_eq!(found.playback_uuid(), session.playback_uuid());
        assert_eq!(registry.current().await, Some(0));
    }

    #[tokio::test]
    async fn never_exceeds_capacity() {
        let registry = SessionRegistry::new(CAPACITY, 90.0);
        for i in 0..(CAPACITY as u8 + 5) {
            let uuid_str = format!("{:036}", i);
            let session = Arc::new(Session::new(uuid_str, 7100, "en".to_string(), player()).unwrap());
            registry.insert_new(session).await.unwrap();
        }
        let slots = registry.slots.lock().await;
        assert_eq!(slots.sessions.len(), CAPACITY);
        assert!(slots.sessions.iter().filter(|s| s.is_some()).count() <= CAPACITY);
    }

    #[tokio::test]
    async fn fills_table_then_evicts_at_new_index_plus_one() {
        // Capacity 3, advertisement threshold 0.0 so the freshly constructed
        // (zero-duration) sessions below aren't pruned as ads before the
        // proactive eviction this test targets gets to run: slots 0,1,2
        // fill on the third insert, which must immediately evict
        // (2 + 1) % 3 == slot 0.
        let registry = SessionRegistry::new(3, 0.0);
        for tag in ['a', 'b', 'c'] {
            let session = Arc::new(Session::new(uuid(tag), 7100, "en".to_string(), player()).unwrap());
            registry.insert_new(session).await.unwrap();
        }

        assert!(registry.get_by_uuid(&uuid('a')).await.is_none());
        assert!(registry.get_by_uuid(&uuid('b')).await.is_some());
        assert!(registry.get_by_uuid(&uuid('c')).await.is_some());

        let slots = registry.slots.lock().await;
        assert!(slots.sessions[0].is_none());
        assert_eq!(slots.sessions.iter().filter(|s| s.is_some()).count(), 2);
    }

    #[tokio::test]
    async fn remove_clears_current_only_if_matching() {
        let registry = SessionRegistry::new(CAPACITY, 90.0);
        let session = Arc::new(Session::new(uuid('c'), 7100, "en".to_string(), player()).unwrap());
        registry.insert_new(session).await.unwrap();
        registry.remove(0).await;
        assert_eq!(registry.current().await, None);
        assert!(registry.get_by_uuid(&uuid('c')).await.is_none());
    }
}
