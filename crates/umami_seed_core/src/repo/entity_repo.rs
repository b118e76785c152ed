//! Entity storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/load/delete over the canonical `entities` table.
//! - Keep path aliases in step with the entities that own them.
//!
//! # Invariants
//! - Saving an entity with an alias writes entity and alias in one
//!   transaction.
//! - Read paths reject payloads that do not decode for their entity type.
//! - Deleting an entity removes its aliases (`ON DELETE CASCADE`).

use crate::db::DbError;
use crate::model::entity::{Entity, EntityId, EntityPayload, EntityType};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ENTITY_SELECT_SQL: &str = "SELECT
    id,
    uuid,
    entity_type,
    data
FROM entities";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity, alias and state persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityType, EntityId),
    InvalidData(String),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity_type, id) => write!(f, "{entity_type} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid entity data: {message}"),
            Self::Serialization(err) => write!(f, "entity payload serialization failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound(..) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Property filter for `load_by_properties`.
///
/// Set fields are combined with AND; unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
    /// Exact label match (node title, user name, term name, ...).
    pub label: Option<String>,
    /// Exact bundle match (node type, vocabulary id, ...).
    pub bundle: Option<String>,
    /// Restricts results to these uuids. `Some(vec![])` matches nothing.
    pub uuids: Option<Vec<Uuid>>,
}

impl EntityQuery {
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn by_uuids(uuids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            uuids: Some(uuids.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn in_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }
}

/// Entity storage capabilities consumed by the seeder.
pub trait EntityStorage {
    /// Inserts a new entity (assigning `id`) or updates an existing one.
    fn save(&self, entity: &mut Entity) -> RepoResult<EntityId>;
    /// Loads one entity of the given type by id.
    fn load(&self, entity_type: EntityType, id: EntityId) -> RepoResult<Option<Entity>>;
    /// Loads entities of one type matching every set property, ordered by id.
    fn load_by_properties(
        &self,
        entity_type: EntityType,
        query: &EntityQuery,
    ) -> RepoResult<Vec<Entity>>;
    /// Deletes the given entities of one type and returns how many rows went.
    fn delete(&self, entity_type: EntityType, entities: &[Entity]) -> RepoResult<usize>;
}

/// SQLite-backed entity storage.
pub struct SqliteEntityStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityStorage for SqliteEntityStorage<'_> {
    fn save(&self, entity: &mut Entity) -> RepoResult<EntityId> {
        let entity_type = entity.entity_type();
        let data = encode_payload(&entity.payload)?;
        let tx = self.conn.unchecked_transaction()?;

        let id = match entity.id {
            None => {
                tx.execute(
                    "INSERT INTO entities (uuid, entity_type, bundle, label, data)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        entity.uuid.to_string(),
                        entity_type.as_str(),
                        entity.bundle(),
                        entity.label(),
                        data,
                    ],
                )?;
                tx.last_insert_rowid()
            }
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE entities
                     SET
                        bundle = ?1,
                        label = ?2,
                        data = ?3,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?4
                       AND entity_type = ?5;",
                    params![entity.bundle(), entity.label(), data, id, entity_type.as_str()],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(entity_type, id));
                }
                tx.execute("DELETE FROM path_alias WHERE entity_id = ?1;", [id])?;
                id
            }
        };
        entity.id = Some(id);

        if let (Some(alias), Some(path)) = (entity.path_alias(), entity.internal_path()) {
            tx.execute(
                "INSERT INTO path_alias (path, alias, entity_id) VALUES (?1, ?2, ?3);",
                params![path, alias, id],
            )?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn load(&self, entity_type: EntityType, id: EntityId) -> RepoResult<Option<Entity>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE id = ?1
               AND entity_type = ?2;"
        ))?;
        let mut rows = stmt.query(params![id, entity_type.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entity_row(row)?));
        }
        Ok(None)
    }

    fn load_by_properties(
        &self,
        entity_type: EntityType,
        query: &EntityQuery,
    ) -> RepoResult<Vec<Entity>> {
        let mut sql = format!("{ENTITY_SELECT_SQL} WHERE entity_type = ?");
        let mut bind_values = vec![Value::Text(entity_type.as_str().to_string())];

        if let Some(label) = query.label.as_ref() {
            sql.push_str(" AND label = ?");
            bind_values.push(Value::Text(label.clone()));
        }

        if let Some(bundle) = query.bundle.as_ref() {
            sql.push_str(" AND bundle = ?");
            bind_values.push(Value::Text(bundle.clone()));
        }

        if let Some(uuids) = query.uuids.as_ref() {
            if uuids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; uuids.len()].join(", ");
            sql.push_str(&format!(" AND uuid IN ({placeholders})"));
            bind_values.extend(uuids.iter().map(|uuid| Value::Text(uuid.to_string())));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(parse_entity_row(row)?);
        }
        Ok(entities)
    }

    fn delete(&self, entity_type: EntityType, entities: &[Entity]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut deleted = 0;
        for entity in entities {
            if entity.entity_type() != entity_type {
                return Err(RepoError::InvalidData(format!(
                    "cannot delete {} `{}` through {entity_type} storage",
                    entity.entity_type(),
                    entity.uuid
                )));
            }
            deleted += tx.execute(
                "DELETE FROM entities WHERE uuid = ?1 AND entity_type = ?2;",
                params![entity.uuid.to_string(), entity_type.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(deleted)
    }
}

fn encode_payload(payload: &EntityPayload) -> RepoResult<String> {
    let encoded = match payload {
        EntityPayload::Node(node) => serde_json::to_string(node)?,
        EntityPayload::User(user) => serde_json::to_string(user)?,
        EntityPayload::TaxonomyTerm(term) => serde_json::to_string(term)?,
        EntityPayload::File(file) => serde_json::to_string(file)?,
        EntityPayload::BlockContent(block) => serde_json::to_string(block)?,
    };
    Ok(encoded)
}

fn decode_payload(entity_type: EntityType, data: &str) -> RepoResult<EntityPayload> {
    let payload = match entity_type {
        EntityType::Node => EntityPayload::Node(serde_json::from_str(data)?),
        EntityType::User => EntityPayload::User(serde_json::from_str(data)?),
        EntityType::TaxonomyTerm => EntityPayload::TaxonomyTerm(serde_json::from_str(data)?),
        EntityType::File => EntityPayload::File(serde_json::from_str(data)?),
        EntityType::BlockContent => EntityPayload::BlockContent(serde_json::from_str(data)?),
    };
    Ok(payload)
}

fn parse_entity_row(row: &Row<'_>) -> RepoResult<Entity> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in entities.uuid"))
    })?;

    let type_text: String = row.get("entity_type")?;
    let entity_type = EntityType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entity type `{type_text}` in entities.entity_type"
        ))
    })?;

    let data: String = row.get("data")?;
    let payload = decode_payload(entity_type, &data).map_err(|err| {
        RepoError::InvalidData(format!(
            "undecodable {entity_type} payload for `{uuid_text}`: {err}"
        ))
    })?;

    Ok(Entity {
        id: Some(row.get("id")?),
        uuid,
        payload,
    })
}
