//! Provenance ledger of seeded entities.
//!
//! # Responsibility
//! - Record the uuid and type of every entity the seeder creates.
//! - Feed teardown with the exact set of entities to remove.
//!
//! # Invariants
//! - Entries are merged, never overwritten: an existing uuid keeps its tag.
//! - The ledger is stored as one JSON object (`uuid -> type tag`) under a
//!   single state key, read and written back on every change.
//! - An emptied ledger removes its state key.

use crate::model::entity::EntityType;
use crate::repo::entity_repo::RepoError;
use crate::repo::state_repo::StateStore;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// State key holding the ledger.
pub const LEDGER_STATE_KEY: &str = "demo_umami_content_uuids";

pub type LedgerEntries = BTreeMap<Uuid, EntityType>;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug)]
pub enum LedgerError {
    State(RepoError),
    Corrupt(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(err) => write!(f, "ledger state access failed: {err}"),
            Self::Corrupt(err) => write!(f, "ledger state is not a uuid map: {err}"),
            Self::Encode(err) => write!(f, "ledger could not be encoded: {err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(err) => Some(err),
            Self::Corrupt(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        Self::State(value)
    }
}

/// Ledger bound to a state store.
pub struct ContentLedger<S: StateStore> {
    state: S,
    key: String,
}

impl<S: StateStore> ContentLedger<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            key: LEDGER_STATE_KEY.to_string(),
        }
    }

    /// Reads all entries; a missing key is an empty ledger.
    pub fn entries(&self) -> LedgerResult<LedgerEntries> {
        match self.state.get(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(LedgerError::Corrupt),
            None => Ok(LedgerEntries::new()),
        }
    }

    /// Merges `created` into the stored ledger.
    pub fn record<I>(&self, created: I) -> LedgerResult<()>
    where
        I: IntoIterator<Item = (Uuid, EntityType)>,
    {
        let mut entries = self.entries()?;
        let before = entries.len();
        for (uuid, entity_type) in created {
            entries.entry(uuid).or_insert(entity_type);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.write(&entries)
    }

    /// Entries grouped by type, in teardown order.
    pub fn grouped(&self) -> LedgerResult<BTreeMap<EntityType, Vec<Uuid>>> {
        let mut groups: BTreeMap<EntityType, Vec<Uuid>> = BTreeMap::new();
        for (uuid, entity_type) in self.entries()? {
            groups.entry(entity_type).or_default().push(uuid);
        }
        Ok(groups)
    }

    /// Entry count per type.
    pub fn counts(&self) -> LedgerResult<BTreeMap<EntityType, usize>> {
        Ok(self
            .grouped()?
            .into_iter()
            .map(|(entity_type, uuids)| (entity_type, uuids.len()))
            .collect())
    }

    /// Removes the given uuids from the ledger.
    pub fn forget(&self, uuids: &[Uuid]) -> LedgerResult<()> {
        let mut entries = self.entries()?;
        for uuid in uuids {
            entries.remove(uuid);
        }
        self.write(&entries)
    }

    pub fn clear(&self) -> LedgerResult<()> {
        self.state.delete(&self.key)?;
        Ok(())
    }

    fn write(&self, entries: &LedgerEntries) -> LedgerResult<()> {
        if entries.is_empty() {
            return self.clear();
        }
        let encoded = serde_json::to_string(entries).map_err(LedgerError::Encode)?;
        self.state.set(&self.key, &encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentLedger, LedgerError};
    use crate::model::entity::EntityType;
    use crate::repo::entity_repo::RepoResult;
    use crate::repo::state_repo::StateStore;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryState {
        values: RefCell<HashMap<String, String>>,
    }

    impl StateStore for &MemoryState {
        fn get(&self, key: &str) -> RepoResult<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> RepoResult<()> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> RepoResult<()> {
            self.values.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn record_merges_and_keeps_first_tag() {
        let state = MemoryState::default();
        let ledger = ContentLedger::new(&state);
        let uuid = Uuid::new_v4();

        ledger.record([(uuid, EntityType::Node)]).unwrap();
        ledger.record([(uuid, EntityType::User)]).unwrap();
        ledger
            .record([(Uuid::new_v4(), EntityType::File)])
            .unwrap();

        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[&uuid], EntityType::Node);
    }

    #[test]
    fn ledger_is_stored_as_uuid_to_tag_object() {
        let state = MemoryState::default();
        let ledger = ContentLedger::new(&state);
        let uuid = Uuid::parse_str("4c7d58a3-a45d-412d-9068-259c57e40541").unwrap();
        ledger.record([(uuid, EntityType::BlockContent)]).unwrap();

        let raw = state.values.borrow()["demo_umami_content_uuids"].clone();
        assert_eq!(
            raw,
            r#"{"4c7d58a3-a45d-412d-9068-259c57e40541":"block_content"}"#
        );
    }

    #[test]
    fn forgetting_everything_removes_the_key() {
        let state = MemoryState::default();
        let ledger = ContentLedger::new(&state);
        let uuid = Uuid::new_v4();
        ledger.record([(uuid, EntityType::TaxonomyTerm)]).unwrap();

        ledger.forget(&[uuid]).unwrap();
        assert!(state.values.borrow().is_empty());
        assert!(ledger.entries().unwrap().is_empty());
    }

    #[test]
    fn grouped_follows_teardown_order() {
        let state = MemoryState::default();
        let ledger = ContentLedger::new(&state);
        ledger
            .record([
                (Uuid::new_v4(), EntityType::User),
                (Uuid::new_v4(), EntityType::Node),
                (Uuid::new_v4(), EntityType::Node),
            ])
            .unwrap();

        let groups = ledger.grouped().unwrap();
        let order: Vec<_> = groups.keys().copied().collect();
        assert_eq!(order, vec![EntityType::Node, EntityType::User]);
        assert_eq!(groups[&EntityType::Node].len(), 2);
    }

    #[test]
    fn corrupt_state_is_reported() {
        let state = MemoryState::default();
        state
            .values
            .borrow_mut()
            .insert("demo_umami_content_uuids".to_string(), "[1,2]".to_string());
        let ledger = ContentLedger::new(&state);
        assert!(matches!(ledger.entries(), Err(LedgerError::Corrupt(_))));
    }
}
