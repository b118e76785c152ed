//! Entity envelope shared by every seeded record.
//!
//! # Responsibility
//! - Give each record a storage identity (`id`) and a stable `uuid`.
//! - Expose the lookup columns (`bundle`, `label`) and canonical paths the
//!   storage layer indexes.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another entity.
//! - `id` is `None` until the entity has been saved.

use crate::model::block_content::BlockContent;
use crate::model::file::ManagedFile;
use crate::model::node::Node;
use crate::model::term::Term;
use crate::model::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage-assigned numeric identifier.
pub type EntityId = i64;

/// Record-type tag.
///
/// Variant order is the teardown order: dependents go before the records
/// they reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    BlockContent,
    Node,
    TaxonomyTerm,
    File,
    User,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::BlockContent,
        EntityType::Node,
        EntityType::TaxonomyTerm,
        EntityType::File,
        EntityType::User,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockContent => "block_content",
            Self::Node => "node",
            Self::TaxonomyTerm => "taxonomy_term",
            Self::File => "file",
            Self::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == value)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field values of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPayload {
    Node(Node),
    User(User),
    TaxonomyTerm(Term),
    File(ManagedFile),
    BlockContent(BlockContent),
}

/// Persistable record: identity plus typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: Option<EntityId>,
    pub uuid: Uuid,
    pub payload: EntityPayload,
}

impl Entity {
    /// Creates an unsaved entity with a generated uuid.
    pub fn new(payload: impl Into<EntityPayload>) -> Self {
        Self::with_uuid(Uuid::new_v4(), payload)
    }

    /// Creates an unsaved entity whose uuid is fixed by the caller.
    ///
    /// Used for records that other configuration refers to by uuid.
    pub fn with_uuid(uuid: Uuid, payload: impl Into<EntityPayload>) -> Self {
        Self {
            id: None,
            uuid,
            payload: payload.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match &self.payload {
            EntityPayload::Node(_) => EntityType::Node,
            EntityPayload::User(_) => EntityType::User,
            EntityPayload::TaxonomyTerm(_) => EntityType::TaxonomyTerm,
            EntityPayload::File(_) => EntityType::File,
            EntityPayload::BlockContent(_) => EntityType::BlockContent,
        }
    }

    /// Human-facing label: title, name, filename or block description.
    pub fn label(&self) -> &str {
        match &self.payload {
            EntityPayload::Node(node) => &node.title,
            EntityPayload::User(user) => &user.name,
            EntityPayload::TaxonomyTerm(term) => &term.name,
            EntityPayload::File(file) => &file.filename,
            EntityPayload::BlockContent(block) => &block.info,
        }
    }

    /// Sub-type used for filtering, e.g. node bundle or term vocabulary.
    pub fn bundle(&self) -> &str {
        match &self.payload {
            EntityPayload::Node(node) => node.bundle.as_str(),
            EntityPayload::User(_) => "user",
            EntityPayload::TaxonomyTerm(term) => &term.vid,
            EntityPayload::File(_) => "file",
            EntityPayload::BlockContent(block) => &block.bundle,
        }
    }

    /// URL alias requested for this entity, if any.
    pub fn path_alias(&self) -> Option<&str> {
        match &self.payload {
            EntityPayload::Node(node) => node.path_alias.as_deref(),
            EntityPayload::TaxonomyTerm(term) => term.path_alias.as_deref(),
            _ => None,
        }
    }

    /// System path such as `/node/3`; `None` before the first save.
    pub fn internal_path(&self) -> Option<String> {
        let id = self.id?;
        let prefix = match self.entity_type() {
            EntityType::Node => "/node",
            EntityType::TaxonomyTerm => "/taxonomy/term",
            EntityType::User => "/user",
            EntityType::File | EntityType::BlockContent => return None,
        };
        Some(format!("{prefix}/{id}"))
    }
}

impl From<Node> for EntityPayload {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<User> for EntityPayload {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<Term> for EntityPayload {
    fn from(value: Term) -> Self {
        Self::TaxonomyTerm(value)
    }
}

impl From<ManagedFile> for EntityPayload {
    fn from(value: ManagedFile) -> Self {
        Self::File(value)
    }
}

impl From<BlockContent> for EntityPayload {
    fn from(value: BlockContent) -> Self {
        Self::BlockContent(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, EntityType};
    use crate::model::node::{Node, NodeBundle};
    use crate::model::term::Term;

    #[test]
    fn entity_type_tags_round_trip_through_parse() {
        for entity_type in EntityType::ALL {
            assert_eq!(EntityType::parse(entity_type.as_str()), Some(entity_type));
        }
        assert_eq!(EntityType::parse("comment"), None);
    }

    #[test]
    fn teardown_order_puts_dependents_first() {
        let mut types = vec![EntityType::User, EntityType::File, EntityType::Node];
        types.sort();
        assert_eq!(
            types,
            vec![EntityType::Node, EntityType::File, EntityType::User]
        );
    }

    #[test]
    fn internal_path_requires_saved_id() {
        let mut entity = Entity::new(Node::new(NodeBundle::Page, "About"));
        assert_eq!(entity.internal_path(), None);
        entity.id = Some(7);
        assert_eq!(entity.internal_path().as_deref(), Some("/node/7"));

        let mut term = Entity::new(Term::new("Cake", "tags"));
        term.id = Some(3);
        assert_eq!(term.internal_path().as_deref(), Some("/taxonomy/term/3"));
        assert_eq!(term.bundle(), "tags");
    }
}
