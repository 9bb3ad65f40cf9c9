use crate::application::Application;
use crate::connection::Connection;
use crate::error::StoreError;
use ahash::AHashMap;
use parking_lot::RwLock;

/// Read/replace access to connection and application documents.
pub trait ConfigStore: Send + Sync {
    fn connection(&self, id: &str) -> Result<Connection, StoreError>;

    /// Replaces the stored document with the same id.
    fn update_connection(&self, connection: &Connection) -> Result<(), StoreError>;

    fn application(&self, id: &str) -> Result<Application, StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    connections: RwLock<AHashMap<String, Connection>>,
    applications: RwLock<AHashMap<String, Application>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(self, connection: Connection) -> Self {
        self.connections
            .write()
            .insert(connection.id.clone(), connection);
        self
    }

    pub fn with_application(self, application: Application) -> Self {
        self.applications
            .write()
            .insert(application.id.clone(), application);
        self
    }

    pub fn insert_connection(&self, connection: Connection) {
        self.connections
            .write()
            .insert(connection.id.clone(), connection);
    }
}

impl ConfigStore for MemoryStore {
    fn connection(&self, id: &str) -> Result<Connection, StoreError> {
        self.connections
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ConnectionNotFound(id.to_string()))
    }

    fn update_connection(&self, connection: &Connection) -> Result<(), StoreError> {
        let mut connections = self.connections.write();
        match connections.get_mut(&connection.id) {
            Some(slot) => {
                *slot = connection.clone();
                Ok(())
            }
            None => Err(StoreError::ConnectionNotFound(connection.id.clone())),
        }
    }

    fn application(&self, id: &str) -> Result<Application, StoreError> {
        self.applications
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ApplicationNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_requires_existing_document() {
        let store = MemoryStore::new();
        let mut connection = Connection::new("c1", "demo");
        assert!(store.update_connection(&connection).is_err());

        store.insert_connection(connection.clone());
        connection.name = "renamed".into();
        store.update_connection(&connection).unwrap();
        assert_eq!(store.connection("c1").unwrap().name, "renamed");
        assert_eq!(
            store.application("nope"),
            Err(StoreError::ApplicationNotFound("nope".into()))
        );
    }
}
