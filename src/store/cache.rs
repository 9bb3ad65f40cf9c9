use ahash::AHashMap;
use parking_lot::Mutex;

/// Last-seen source responses, keyed by connection and endpoint mapping.
pub trait CacheStore: Send + Sync {
    fn get(&self, connection_id: &str, mapping_id: &str) -> Option<Vec<u8>>;

    fn put(&self, connection_id: &str, mapping_id: &str, response: Vec<u8>);

    /// Drops every entry of a connection and returns how many were removed.
    fn purge(&self, connection_id: &str) -> usize;
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<AHashMap<(String, String), Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, connection_id: &str, mapping_id: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .get(&(connection_id.to_string(), mapping_id.to_string()))
            .cloned()
    }

    fn put(&self, connection_id: &str, mapping_id: &str, response: Vec<u8>) {
        self.entries
            .lock()
            .insert((connection_id.to_string(), mapping_id.to_string()), response);
    }

    fn purge(&self, connection_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(connection, _), _| connection != connection_id);
        before - entries.len()
    }
}
