//! In-memory record collections used by local mode. All operations are
//! synchronous; `create` appends, `update` replaces in place, and `delete`
//! removes by identity.

pub mod fixtures;

use thiserror::Error;

use crate::models::{Client, Project};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a record with id {0} already exists")]
    DuplicateIdentity(String),
    #[error("no record with id {0}")]
    UnknownIdentity(String),
}

/// Anything with an immutable string identity.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct Collection<T: Identified> {
    items: Vec<T>,
}

impl<T: Identified> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Append a new record. Reusing an existing identity is an error and
    /// leaves the collection untouched.
    pub fn create(&mut self, item: T) -> Result<(), StoreError> {
        if self.get(item.id()).is_some() {
            return Err(StoreError::DuplicateIdentity(item.id().to_string()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Replace the record with the same identity, keeping its position.
    /// Updating an identity that is not present is an error.
    pub fn update(&mut self, item: T) -> Result<(), StoreError> {
        match self.items.iter().position(|i| i.id() == item.id()) {
            Some(index) => {
                self.items[index] = item;
                Ok(())
            }
            None => Err(StoreError::UnknownIdentity(item.id().to_string())),
        }
    }

    /// Remove the record with this identity. Deleting an identity that is
    /// not present is a no-op.
    pub fn delete(&mut self, id: &str) {
        self.items.retain(|item| item.id() != id);
    }
}

/// The local-mode dataset: fixture-seeded collections plus a counter for
/// assigning identities to records created client-side.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pub clients: Collection<Client>,
    pub projects: Collection<Project>,
    next_id: u64,
}

impl LocalStore {
    pub fn seeded() -> Self {
        Self {
            clients: Collection::new(fixtures::clients()),
            projects: Collection::new(fixtures::projects()),
            // Fixture ids run "1".."4"; generated ids continue after them.
            next_id: 100,
        }
    }

    pub fn allocate_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientStatus;

    fn collection() -> Collection<Client> {
        Collection::new(fixtures::clients())
    }

    fn new_client(id: &str) -> Client {
        let mut client = fixtures::clients().remove(0);
        client.id = id.to_string();
        client
    }

    #[test]
    fn create_appends_at_the_end() {
        let mut clients = collection();
        clients.create(new_client("9")).unwrap();
        assert_eq!(clients.items().last().unwrap().id, "9");
    }

    #[test]
    fn create_rejects_duplicate_identity() {
        let mut clients = collection();
        let err = clients.create(new_client("1")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateIdentity("1".to_string()));
        assert_eq!(clients.len(), 3);
    }

    #[test]
    fn create_then_delete_restores_the_collection() {
        let mut clients = collection();
        let before: Vec<String> = clients.items().iter().map(|c| c.id.clone()).collect();
        clients.create(new_client("9")).unwrap();
        clients.delete("9");
        let after: Vec<String> = clients.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn update_preserves_position_and_is_idempotent() {
        let mut clients = collection();
        let mut changed = clients.get("2").cloned().unwrap();
        changed.status = ClientStatus::Inactive;

        clients.update(changed.clone()).unwrap();
        let once: Vec<String> = clients.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(once, vec!["1", "2", "3"]);
        assert_eq!(clients.get("2").unwrap().status, ClientStatus::Inactive);

        clients.update(changed).unwrap();
        let twice: Vec<String> = clients.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn update_rejects_unknown_identity() {
        let mut clients = collection();
        let err = clients.update(new_client("404")).unwrap_err();
        assert_eq!(err, StoreError::UnknownIdentity("404".to_string()));
    }

    #[test]
    fn delete_of_missing_identity_is_a_noop() {
        let mut clients = collection();
        clients.delete("404");
        assert_eq!(clients.len(), 3);
    }

    #[test]
    fn allocated_ids_do_not_collide_with_fixtures() {
        let mut store = LocalStore::seeded();
        let id = store.allocate_id();
        assert!(store.clients.get(&id).is_none());
        assert!(store.projects.get(&id).is_none());
        assert_ne!(id, store.allocate_id());
    }
}
